//! HTTP handlers for order operations

use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use chrono::Utc;
use serde_json::{Map, Value, json};
use std::sync::Arc;
use validator::Validate;

use crate::core::error::{OrderError, OrderResult};
use crate::core::extractors::JsonBody;
use crate::core::order::{Order, StatusTransition};
use crate::core::query::ListQuery;
use crate::server::host::ServerHost;

type HostState = State<Arc<ServerHost>>;

pub async fn root() -> Json<Value> {
    Json(json!({ "status": "working" }))
}

/// GET /health
///
/// 503 `DOWN` once the store has been closed.
pub async fn health_check(State(host): HostState) -> (StatusCode, Json<Value>) {
    let (code, status) = if host.is_ready() {
        (StatusCode::OK, "UP")
    } else {
        (StatusCode::SERVICE_UNAVAILABLE, "DOWN")
    };
    (
        code,
        Json(json!({
            "status": status,
            "timestamp": Utc::now().to_rfc3339(),
        })),
    )
}

/// POST /api/orders
pub async fn create_order(
    State(host): HostState,
    JsonBody(order): JsonBody<Order>,
) -> OrderResult<(StatusCode, Json<Order>)> {
    let order = host.repository.create(order).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

/// GET /api/orders
///
/// Filters run over a full scan, then the optional sort is applied.
pub async fn list_orders(
    State(host): HostState,
    Query(query): Query<ListQuery>,
) -> OrderResult<Json<Vec<Order>>> {
    let orders = host.repository.find_by_filters(&query.filters()).await?;
    Ok(Json(query.sort_order().apply(orders)))
}

/// GET /api/orders/{orderNumber}
pub async fn get_order(
    State(host): HostState,
    Path(order_number): Path<String>,
) -> OrderResult<Json<Order>> {
    let order = host
        .repository
        .find_by_order_number(&order_number)
        .await?
        .ok_or_else(|| OrderError::not_found(&order_number))?;
    Ok(Json(order))
}

/// PUT /api/orders/{orderNumber}
pub async fn update_order(
    State(host): HostState,
    Path(order_number): Path<String>,
    JsonBody(updates): JsonBody<Map<String, Value>>,
) -> OrderResult<Json<Order>> {
    let order = host.repository.update(&order_number, updates).await?;
    Ok(Json(order))
}

/// PUT /api/orders/{orderNumber}/status
pub async fn update_order_status(
    State(host): HostState,
    Path(order_number): Path<String>,
    JsonBody(transition): JsonBody<StatusTransition>,
) -> OrderResult<Json<Order>> {
    transition.validate()?;
    let order = host
        .repository
        .transition_status(&order_number, &transition.status)
        .await?;
    Ok(Json(order))
}
