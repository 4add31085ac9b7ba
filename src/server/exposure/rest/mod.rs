//! REST API exposure
//!
//! Consumes a `ServerHost` and produces an Axum `Router`:
//!
//! | Method | Path                               | Handler            |
//! |--------|------------------------------------|--------------------|
//! | GET    | `/`                                | liveness banner    |
//! | GET    | `/health`                          | health check       |
//! | POST   | `/api/orders`                      | create             |
//! | GET    | `/api/orders`                      | list               |
//! | GET    | `/api/orders/{orderNumber}`        | fetch one          |
//! | PUT    | `/api/orders/{orderNumber}`        | partial update     |
//! | PUT    | `/api/orders/{orderNumber}/status` | status transition  |
//!
//! Anything else answers 404 `{"error": "Route not found"}`.

pub mod handlers;

use super::super::host::ServerHost;
use crate::core::error::expose_error_details;
use anyhow::Result;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, put};
use axum::{Json, Router, middleware};
use serde_json::json;
use std::sync::Arc;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

/// REST API exposure implementation
pub struct RestExposure;

impl RestExposure {
    /// Build the REST router from a host
    ///
    /// Error bodies include a `stack` only when the host's environment is
    /// development.
    pub fn build_router(host: Arc<ServerHost>) -> Result<Router> {
        let development = host.config.environment.is_development();

        let mut app = Self::health_routes()
            .merge(Self::order_routes())
            .fallback(Self::route_not_found)
            .with_state(host);

        if development {
            app = app.layer(middleware::map_response(expose_error_details));
        }

        Ok(app.layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(CorsLayer::permissive()),
        ))
    }

    fn health_routes() -> Router<Arc<ServerHost>> {
        Router::new()
            .route("/", get(handlers::root))
            .route("/health", get(handlers::health_check))
    }

    fn order_routes() -> Router<Arc<ServerHost>> {
        Router::new()
            .route(
                "/api/orders",
                get(handlers::list_orders).post(handlers::create_order),
            )
            .route(
                "/api/orders/{order_number}",
                get(handlers::get_order).put(handlers::update_order),
            )
            .route(
                "/api/orders/{order_number}/status",
                put(handlers::update_order_status),
            )
    }

    async fn route_not_found() -> impl IntoResponse {
        (
            StatusCode::NOT_FOUND,
            Json(json!({ "error": "Route not found" })),
        )
    }
}
