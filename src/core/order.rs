//! The order entity

use serde::{Deserialize, Serialize};
use serde_json::Value;
use validator::Validate;

/// Approval workflow state of an order
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ApprovalStatus {
    #[default]
    Pending,
    Approved,
    Rejected,
}

impl ApprovalStatus {
    pub const ALL: &'static [&'static str] = &["pending", "approved", "rejected"];

    pub fn as_str(&self) -> &'static str {
        match self {
            ApprovalStatus::Pending => "pending",
            ApprovalStatus::Approved => "approved",
            ApprovalStatus::Rejected => "rejected",
        }
    }
}

/// One entry of the status history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    /// Epoch milliseconds
    pub date: i64,
    pub status: String,
}

/// An order record
///
/// Field names on the wire (and in the stored hash) are camelCase. Every
/// field except the two required ones is nullable; nulls are never written
/// to the store. Nested documents are kept as opaque JSON values.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize, Validate)]
#[serde(rename_all = "camelCase", default)]
pub struct Order {
    // Identity & status
    #[validate(length(min = 1, message = "orderNumber is required"))]
    pub order_number: String,
    #[validate(length(min = 1, message = "orderStatus is required"))]
    pub order_status: String,
    pub approval_status: ApprovalStatus,
    pub status_changes: Option<Vec<StatusChange>>,

    // Timestamps (epoch millis)
    pub order_date: Option<i64>,
    pub packed_date: Option<i64>,
    pub ship_date: Option<i64>,
    pub delivery_prediction: Option<i64>,
    pub ready_to_print_date: Option<i64>,
    pub files_due_by: Option<i64>,
    pub order_approved_date: Option<i64>,
    pub cut_date: Option<i64>,
    pub last_modified: Option<i64>,
    pub order_batched_date: Option<i64>,
    pub print_date: Option<i64>,

    // Money and measures
    pub total: Option<f64>,
    pub sub_total: Option<f64>,
    pub tax: Option<f64>,
    pub time_spent: Option<f64>,

    // Nested documents
    pub shipping_address: Option<Value>,
    pub line_items: Option<Value>,
    pub order_flag: Option<Value>,
    pub account_flag: Option<Value>,
    pub discounts: Option<Value>,
    pub deals_on_order: Option<Value>,
    pub shipping_service: Option<Value>,
    #[serde(alias = "onTheWayPridiction")]
    pub on_the_way_prediction: Option<Value>,
    #[serde(alias = "shippingPridiction")]
    pub shipping_prediction: Option<Value>,
    pub payment_info: Option<Value>,

    // Misc scalars
    pub customer_email: Option<String>,
    pub tracking_number: Option<String>,
    pub shipped_carrier: Option<String>,
    pub packed_by: Option<String>,
    pub packed_image: Option<String>,
    pub first_order: Option<bool>,
    pub on_batch: Option<bool>,
    #[serde(rename = "fb_pixel_id")]
    pub fb_pixel_id: Option<String>,
}

impl Order {
    /// Minimal order with the two required fields set
    pub fn new(order_number: impl Into<String>, order_status: impl Into<String>) -> Self {
        Self {
            order_number: order_number.into(),
            order_status: order_status.into(),
            ..Default::default()
        }
    }

    /// Store key for an order number
    pub fn key_for(order_number: &str) -> String {
        format!("{}{}", ORDER_KEY_PREFIX, order_number)
    }

    pub fn key(&self) -> String {
        Self::key_for(&self.order_number)
    }
}

/// Prefix of every order hash key
pub const ORDER_KEY_PREFIX: &str = "order:";

/// Pattern matching every order hash key
pub const ORDER_KEY_PATTERN: &str = "order:*";

/// Body of a status transition request
#[derive(Debug, Clone, Deserialize, Validate)]
pub struct StatusTransition {
    #[serde(default)]
    #[validate(length(min = 1, message = "status is required"))]
    pub status: String,
}
