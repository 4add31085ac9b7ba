//! Core module containing the order model, its storage codec and repository

pub mod codec;
pub mod error;
pub mod extractors;
pub mod order;
pub mod query;
pub mod service;
pub mod store;

pub use error::{OrderError, OrderResult, StorageError, ValidationError};
pub use extractors::JsonBody;
pub use order::{ApprovalStatus, Order, StatusChange, StatusTransition};
pub use query::{ListQuery, OrderFilters, SortOrder};
pub use service::OrderRepository;
pub use store::HashStore;
