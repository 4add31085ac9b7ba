//! Typed error handling for the order API
//!
//! Every fallible operation in the crate returns [`OrderResult`]. The error
//! type knows its HTTP status and renders the uniform error body used by all
//! handlers.
//!
//! # Error Categories
//!
//! - [`ValidationError`]: bad input (missing required fields, unknown fields, bad JSON)
//! - [`StorageError`]: failures from the key-value store
//! - [`ConfigError`]: configuration parsing and validation
//!
//! # Response body
//!
//! ```json
//! { "success": false, "message": "...", "errors": { "orderNumber": "..." } }
//! ```
//!
//! `errors` is only present for field-level validation failures. `stack` is
//! only present when the router was built for the development environment
//! (see [`expose_error_details`]).

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use std::collections::BTreeMap;

/// The main error type for order operations
#[derive(Debug, thiserror::Error)]
pub enum OrderError {
    /// Input validation errors
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// No record stored under the order number
    #[error("Order not found: {order_number}")]
    NotFound { order_number: String },

    /// Create against an existing key while duplicate rejection is enabled
    #[error("Order '{order_number}' already exists")]
    AlreadyExists { order_number: String },

    /// Key-value store errors
    #[error("Database Error: {0}")]
    Storage(#[from] StorageError),

    /// Configuration errors
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// Anything else
    #[error("Internal error: {0}")]
    Internal(String),
}

impl OrderError {
    pub fn not_found(order_number: impl Into<String>) -> Self {
        OrderError::NotFound {
            order_number: order_number.into(),
        }
    }

    /// Get the HTTP status code for this error
    pub fn status_code(&self) -> StatusCode {
        match self {
            OrderError::Validation(_) => StatusCode::BAD_REQUEST,
            OrderError::NotFound { .. } => StatusCode::NOT_FOUND,
            OrderError::AlreadyExists { .. } => StatusCode::CONFLICT,
            OrderError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OrderError::Config(_) => StatusCode::INTERNAL_SERVER_ERROR,
            OrderError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    /// Convert to an error response body (without the debug stack)
    pub fn to_response(&self) -> ErrorResponse {
        let (message, errors) = match self {
            OrderError::Validation(ValidationError::FieldErrors(fields)) => (
                "Validation Error".to_string(),
                Some(
                    fields
                        .iter()
                        .map(|e| (e.field.clone(), e.message.clone()))
                        .collect(),
                ),
            ),
            other => (other.to_string(), None),
        };

        ErrorResponse {
            success: false,
            message,
            errors,
            stack: None,
        }
    }
}

/// Error response structure for HTTP responses
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    pub success: bool,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub errors: Option<BTreeMap<String, String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub stack: Option<String>,
}

/// Full error body (stack included), carried in the response extensions so
/// [`expose_error_details`] can swap it in.
#[derive(Debug, Clone)]
struct ErrorTrace(ErrorResponse);

impl IntoResponse for OrderError {
    fn into_response(self) -> Response {
        let status = self.status_code();
        if status.is_server_error() {
            tracing::error!(error = ?self, "request failed");
        } else {
            tracing::warn!(error = %self, "request rejected");
        }

        let body = self.to_response();
        let traced = ErrorResponse {
            stack: Some(format!("{:#?}", self)),
            ..body.clone()
        };

        let mut response = (status, Json(body)).into_response();
        response.extensions_mut().insert(ErrorTrace(traced));
        response
    }
}

/// Response mapper that re-renders error bodies with their debug stack.
///
/// Installed by the REST exposure only in the development environment.
pub async fn expose_error_details(response: Response) -> Response {
    match response.extensions().get::<ErrorTrace>().cloned() {
        Some(ErrorTrace(body)) => (response.status(), Json(body)).into_response(),
        None => response,
    }
}

// =============================================================================
// Validation Errors
// =============================================================================

/// Errors related to input validation
#[derive(Debug, thiserror::Error)]
pub enum ValidationError {
    /// Field-level failures reported by a validator
    #[error("Validation errors: {}", format_fields(.0))]
    FieldErrors(Vec<FieldValidationError>),

    /// Body is not valid JSON, or has the wrong shape
    #[error("Invalid JSON: {message}")]
    InvalidJson { message: String },

    /// Field is not part of the order schema
    #[error("Unknown field '{field}'")]
    UnknownField { field: String },

    /// Field cannot be changed once the order exists
    #[error("Field '{field}' cannot be modified")]
    ImmutableField { field: String },
}

/// A single field validation error
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct FieldValidationError {
    pub field: String,
    pub message: String,
}

fn format_fields(errors: &[FieldValidationError]) -> String {
    errors
        .iter()
        .map(|e| format!("{}: {}", e.field, e.message))
        .collect::<Vec<_>>()
        .join(", ")
}

impl From<validator::ValidationErrors> for ValidationError {
    fn from(errors: validator::ValidationErrors) -> Self {
        let mut fields: Vec<FieldValidationError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, errs)| {
                let field = wire_name(&field.to_string());
                errs.iter().map(move |e| FieldValidationError {
                    field: field.clone(),
                    message: e
                        .message
                        .as_ref()
                        .map(|m| m.to_string())
                        .unwrap_or_else(|| format!("{} is invalid", field)),
                })
            })
            .collect();
        fields.sort_by(|a, b| a.field.cmp(&b.field));
        ValidationError::FieldErrors(fields)
    }
}

/// snake_case struct field → camelCase wire name
fn wire_name(field: &str) -> String {
    let mut out = String::with_capacity(field.len());
    let mut upper = false;
    for c in field.chars() {
        if c == '_' {
            upper = true;
        } else if upper {
            out.extend(c.to_uppercase());
            upper = false;
        } else {
            out.push(c);
        }
    }
    out
}

// =============================================================================
// Storage Errors
// =============================================================================

/// Errors related to the key-value store
#[derive(Debug, thiserror::Error)]
pub enum StorageError {
    /// Could not reach the store
    #[error("failed to connect to {backend}: {message}")]
    Connection { backend: String, message: String },

    /// Command failed
    #[error("{backend} command error: {message}")]
    Query { backend: String, message: String },

    /// Stored data cannot be turned back into an order
    #[error("data integrity error: {message}")]
    Integrity { message: String },

    /// Store was never opened, or has been closed
    #[error("storage backend '{backend}' is not open")]
    Unavailable { backend: String },
}

// =============================================================================
// Config Errors
// =============================================================================

/// Errors related to configuration
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Failed to parse config{}: {message}", .file.as_ref().map(|f| format!(" file '{}'", f)).unwrap_or_default())]
    Parse {
        file: Option<String>,
        message: String,
    },

    #[error("Invalid value '{value}' for '{field}': {message}")]
    InvalidValue {
        field: String,
        value: String,
        message: String,
    },

    #[error("Configuration file not found: {path}")]
    FileNotFound { path: String },
}

// =============================================================================
// Conversions from external errors
// =============================================================================

impl From<serde_json::Error> for OrderError {
    fn from(err: serde_json::Error) -> Self {
        OrderError::Validation(ValidationError::InvalidJson {
            message: err.to_string(),
        })
    }
}

impl From<validator::ValidationErrors> for OrderError {
    fn from(errors: validator::ValidationErrors) -> Self {
        OrderError::Validation(errors.into())
    }
}

impl From<anyhow::Error> for OrderError {
    fn from(err: anyhow::Error) -> Self {
        OrderError::Internal(format!("{:#}", err))
    }
}

/// A specialized Result type for order operations
pub type OrderResult<T> = Result<T, OrderError>;
