//! Listing filters and ordering
//!
//! Listing is a full scan: every order is loaded and the predicates below
//! run in memory. Cost is O(total orders) per call whatever the selectivity.

use crate::core::order::Order;
use serde::Deserialize;
use std::cmp::Ordering;

/// Query string of `GET /api/orders`
///
/// # Example
/// ```text
/// GET /api/orders?approvalStatus=approved
/// GET /api/orders?search=abc&sort=Newest
/// ```
#[derive(Debug, Clone, Deserialize, Default)]
#[serde(rename_all = "camelCase")]
pub struct ListQuery {
    /// Exact match on `approvalStatus`
    pub approval_status: Option<String>,

    /// `Newest` or `Oldest`; anything else keeps store order
    pub sort: Option<String>,

    /// Case-insensitive substring of `orderNumber`
    pub search: Option<String>,
}

impl ListQuery {
    pub fn filters(&self) -> OrderFilters {
        OrderFilters {
            approval_status: non_empty(&self.approval_status),
            search: non_empty(&self.search),
        }
    }

    pub fn sort_order(&self) -> SortOrder {
        self.sort.as_deref().map(SortOrder::parse).unwrap_or_default()
    }
}

fn non_empty(value: &Option<String>) -> Option<String> {
    value.as_ref().filter(|v| !v.is_empty()).cloned()
}

/// Predicates applied to the scanned orders
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OrderFilters {
    pub approval_status: Option<String>,
    pub search: Option<String>,
}

impl OrderFilters {
    pub fn approval_status(mut self, status: impl Into<String>) -> Self {
        self.approval_status = Some(status.into());
        self
    }

    pub fn search(mut self, needle: impl Into<String>) -> Self {
        self.search = Some(needle.into());
        self
    }

    pub fn matches(&self, order: &Order) -> bool {
        let status_ok = self
            .approval_status
            .as_deref()
            .is_none_or(|status| order.approval_status.as_str() == status);
        let search_ok = self.search.as_deref().is_none_or(|needle| {
            order
                .order_number
                .to_lowercase()
                .contains(&needle.to_lowercase())
        });
        status_ok && search_ok
    }

    pub fn apply(&self, orders: Vec<Order>) -> Vec<Order> {
        orders.into_iter().filter(|o| self.matches(o)).collect()
    }
}

/// Ordering of a listing by `orderDate`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortOrder {
    Newest,
    Oldest,
    /// Keep the order the store returned
    #[default]
    Unsorted,
}

impl SortOrder {
    pub fn parse(value: &str) -> Self {
        match value {
            "Newest" => SortOrder::Newest,
            "Oldest" => SortOrder::Oldest,
            _ => SortOrder::Unsorted,
        }
    }

    /// Stable sort; orders without `orderDate` go last either way.
    pub fn apply(&self, mut orders: Vec<Order>) -> Vec<Order> {
        let descending = match self {
            SortOrder::Newest => true,
            SortOrder::Oldest => false,
            SortOrder::Unsorted => return orders,
        };
        orders.sort_by(|a, b| match (a.order_date, b.order_date) {
            (Some(x), Some(y)) if descending => y.cmp(&x),
            (Some(x), Some(y)) => x.cmp(&y),
            (Some(_), None) => Ordering::Less,
            (None, Some(_)) => Ordering::Greater,
            (None, None) => Ordering::Equal,
        });
        orders
    }
}
