//! Order repository
//!
//! All order operations go through [`OrderRepository`], which turns orders
//! into flat hashes with the codec and talks to whatever [`HashStore`] it was
//! given.
//!
//! Read-modify-write operations (`update`, `update_status`) are not atomic:
//! two concurrent writers on the same order can interleave and the later
//! write wins for every field it sets, including the status history.

use crate::config::OrdersConfig;
use crate::core::codec;
use crate::core::error::{OrderError, OrderResult, StorageError, ValidationError};
use crate::core::order::{ORDER_KEY_PATTERN, Order, StatusChange};
use crate::core::query::OrderFilters;
use crate::core::store::HashStore;
use chrono::Utc;
use futures::stream::{self, StreamExt, TryStreamExt};
use serde_json::{Map, Value};
use std::sync::Arc;
use validator::Validate;

/// Status that stamps `packedDate`
pub const PACKED_STATUS: &str = "packed";

/// Repository of orders stored as hashes
#[derive(Clone)]
pub struct OrderRepository {
    store: Arc<dyn HashStore>,
    options: OrdersConfig,
}

impl OrderRepository {
    pub fn new(store: Arc<dyn HashStore>, options: OrdersConfig) -> Self {
        Self { store, options }
    }

    pub fn store(&self) -> &Arc<dyn HashStore> {
        &self.store
    }

    /// Create an order.
    ///
    /// An existing order with the same number is replaced, unless
    /// `reject_duplicates` is set.
    pub async fn create(&self, order: Order) -> OrderResult<Order> {
        order.validate()?;

        if self.options.reject_duplicates
            && self.find_by_order_number(&order.order_number).await?.is_some()
        {
            return Err(OrderError::AlreadyExists {
                order_number: order.order_number,
            });
        }

        self.save_at(&order.key(), &order).await?;
        tracing::info!(order_number = %order.order_number, "order created");
        Ok(order)
    }

    /// Merge `updates` into a stored order.
    ///
    /// Only fields of the order schema are accepted; `null` clears a field,
    /// omitted fields keep their value, and `orderNumber` cannot change.
    pub async fn update(&self, order_number: &str, updates: Map<String, Value>) -> OrderResult<Order> {
        let existing = self
            .find_by_order_number(order_number)
            .await?
            .ok_or_else(|| OrderError::not_found(order_number))?;

        let order = merge_updates(existing, updates)?;
        self.save_at(&Order::key_for(order_number), &order).await?;
        tracing::info!(order_number = %order.order_number, "order updated");
        Ok(order)
    }

    pub async fn find_by_order_number(&self, order_number: &str) -> OrderResult<Option<Order>> {
        let hash = self.store.hgetall(&Order::key_for(order_number)).await?;
        codec::decode_order(hash)
    }

    /// Load every order and keep those matching `filters`.
    ///
    /// Keys are fetched with at most `scan_concurrency` requests in flight;
    /// results keep the store's key order. Orders that vanished between the
    /// key listing and the fetch are skipped, as are records too damaged to
    /// decode.
    pub async fn find_by_filters(&self, filters: &OrderFilters) -> OrderResult<Vec<Order>> {
        let keys = self.store.keys(ORDER_KEY_PATTERN).await?;
        tracing::debug!(keys = keys.len(), ?filters, "scanning orders");

        let hashes: Vec<_> = stream::iter(keys.into_iter().map(|key| {
            let store = self.store.clone();
            async move { store.hgetall(&key).await.map(|hash| (key, hash)) }
        }))
        .buffered(self.options.scan_concurrency.max(1))
        .try_collect()
        .await?;

        let mut orders = Vec::with_capacity(hashes.len());
        for (key, hash) in hashes {
            match codec::decode_order(hash) {
                Ok(Some(order)) => orders.push(order),
                Ok(None) => {}
                Err(e) => tracing::warn!(%key, error = %e, "skipping undecodable order"),
            }
        }

        Ok(filters.apply(orders))
    }

    /// Record a status transition on `order` and persist it.
    ///
    /// Appends `{date: now, status}` to the history, sets `orderStatus`, and
    /// stamps `packedDate` when the new status is `packed`. The caller's copy
    /// is the base of the write, so a stale copy overwrites newer history.
    pub async fn update_status(&self, order: Order, new_status: &str) -> OrderResult<Order> {
        let key = order.key();
        self.record_status(&key, order, new_status).await
    }

    /// Look up an order and apply [`update_status`](Self::update_status).
    pub async fn transition_status(&self, order_number: &str, new_status: &str) -> OrderResult<Order> {
        let order = self
            .find_by_order_number(order_number)
            .await?
            .ok_or_else(|| OrderError::not_found(order_number))?;
        self.record_status(&Order::key_for(order_number), order, new_status)
            .await
    }

    async fn record_status(&self, key: &str, mut order: Order, new_status: &str) -> OrderResult<Order> {
        let now = Utc::now().timestamp_millis();

        let history = order.status_changes.get_or_insert_with(|| {
            tracing::debug!(order_number = %order.order_number, "starting empty status history");
            Vec::new()
        });
        history.push(StatusChange {
            date: now,
            status: new_status.to_string(),
        });
        order.order_status = new_status.to_string();
        if new_status == PACKED_STATUS {
            order.packed_date = Some(now);
        }

        self.save_at(key, &order).await?;
        tracing::info!(order_number = %order.order_number, status = new_status, "order status changed");
        Ok(order)
    }

    /// Write `order` under `key`, removing fields that are now null
    async fn save_at(&self, key: &str, order: &Order) -> OrderResult<()> {
        let encoded = codec::encode_order(order)?;
        self.store.hset(key, &encoded.fields).await?;
        if !encoded.absent.is_empty() {
            self.store.hdel(key, &encoded.absent).await?;
        }
        Ok(())
    }
}

fn merge_updates(existing: Order, updates: Map<String, Value>) -> OrderResult<Order> {
    let Value::Object(mut merged) = serde_json::to_value(&existing).map_err(|e| {
        StorageError::Integrity {
            message: e.to_string(),
        }
    })?
    else {
        return Err(OrderError::Internal("order did not serialize to an object".to_string()));
    };

    for (name, value) in updates {
        let name = codec::canonical_name(&name).to_string();
        let spec = codec::field_spec(&name).ok_or_else(|| ValidationError::UnknownField {
            field: name.clone(),
        })?;
        if !spec.mutable {
            if value.as_str() == Some(existing.order_number.as_str()) {
                continue;
            }
            return Err(ValidationError::ImmutableField { field: name }.into());
        }
        merged.insert(name, value);
    }

    let order: Order = serde_json::from_value(Value::Object(merged))?;
    order.validate()?;
    Ok(order)
}
