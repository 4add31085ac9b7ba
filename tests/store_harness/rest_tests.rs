//! REST integration test macro for store backends.
//!
//! The `order_api_tests!` macro generates HTTP-level tests that drive a
//! store through full round-trips:
//! JSON → HTTP request → handler → repository → HashStore → HTTP response.
//!
//! # Generated Tests
//!
//! ## CRUD
//! - `test_rest_create`: POST 201 with the stored order echoed back
//! - `test_rest_get`: GET 200, and 404 for unknown numbers
//! - `test_rest_update`: PUT merges fields and clears explicit nulls
//! - `test_rest_status_transition`: PUT .../status appends history, stamps packedDate
//!
//! ## Listing
//! - `test_rest_list_filter`: approvalStatus and search
//! - `test_rest_list_sort`: Newest / Oldest / unsorted
//!
//! ## Validation
//! - `test_rest_create_missing_fields`: 400 with a field map
//! - `test_rest_update_unknown_field`: 400, record untouched

/// Generate a REST integration suite for a store backend.
///
/// `$factory` must evaluate to a fresh, empty store implementing
/// `HashStore + 'static`.
macro_rules! order_api_tests {
    ($factory:expr) => {
        mod order_api_tests {
            use super::*;
            use axum::http::StatusCode;
            use axum_test::TestServer;
            use order_hash_api::core::order::ApprovalStatus;
            use serde_json::{Value, json};
            use std::sync::Arc;

            async fn make_server() -> TestServer {
                test_server(Arc::new($factory))
            }

            fn numbers(body: &Value) -> Vec<String> {
                body.as_array()
                    .unwrap()
                    .iter()
                    .map(|o| o["orderNumber"].as_str().unwrap().to_string())
                    .collect()
            }

            // ==============================================================
            // CRUD
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create() {
                let server = make_server().await;

                let response = server
                    .post("/api/orders")
                    .json(&json!({
                        "orderNumber": "W-100",
                        "orderStatus": "new",
                        "total": 59.9,
                        "lineItems": [{"sku": "MUG-01", "qty": 1}],
                        "shippingAddress": {"zip": "10115"}
                    }))
                    .await;

                response.assert_status(StatusCode::CREATED);
                let body: Value = response.json();
                assert_eq!(body["orderNumber"], "W-100");
                assert_eq!(body["approvalStatus"], "pending");
                assert_eq!(body["total"], 59.9);
                assert_eq!(body["lineItems"][0]["sku"], "MUG-01");
                assert!(body["trackingNumber"].is_null());
            }

            #[tokio::test]
            async fn test_rest_get() {
                let server = make_server().await;
                server
                    .post("/api/orders")
                    .json(&serde_json::to_value(full_order("W-200")).unwrap())
                    .await
                    .assert_status(StatusCode::CREATED);

                let response = server.get("/api/orders/W-200").await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["customerEmail"], "ada@example.com");
                assert_eq!(body["paymentInfo"]["last4"], "4242");
                assert_eq!(body["statusChanges"][0]["status"], "new");

                let response = server.get("/api/orders/W-404").await;
                response.assert_status(StatusCode::NOT_FOUND);
                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert_eq!(body["message"], "Order not found: W-404");
            }

            #[tokio::test]
            async fn test_rest_update() {
                let server = make_server().await;
                server
                    .post("/api/orders")
                    .json(&serde_json::to_value(full_order("W-300")).unwrap())
                    .await;

                let response = server
                    .put("/api/orders/W-300")
                    .json(&json!({
                        "orderStatus": "shipped",
                        "shippedCarrier": "UPS",
                        "trackingNumber": null
                    }))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["orderStatus"], "shipped");
                assert_eq!(body["shippedCarrier"], "UPS");
                assert!(body["trackingNumber"].is_null());
                assert_eq!(body["customerEmail"], "ada@example.com");

                let stored: Value = server.get("/api/orders/W-300").await.json();
                assert_eq!(stored, body);

                server
                    .put("/api/orders/W-missing")
                    .json(&json!({"orderStatus": "shipped"}))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            #[tokio::test]
            async fn test_rest_status_transition() {
                let server = make_server().await;
                server
                    .post("/api/orders")
                    .json(&json!({"orderNumber": "W-400", "orderStatus": "new"}))
                    .await;
                let before = chrono::Utc::now().timestamp_millis();

                let response = server
                    .put("/api/orders/W-400/status")
                    .json(&json!({"status": "packed"}))
                    .await;
                response.assert_status_ok();
                let body: Value = response.json();
                assert_eq!(body["orderStatus"], "packed");
                assert!(body["packedDate"].as_i64().unwrap() >= before);
                let history = body["statusChanges"].as_array().unwrap();
                assert_eq!(history.len(), 1);
                assert_eq!(history[0]["status"], "packed");

                server
                    .put("/api/orders/W-400/status")
                    .json(&json!({"status": ""}))
                    .await
                    .assert_status(StatusCode::BAD_REQUEST);
                server
                    .put("/api/orders/W-missing/status")
                    .json(&json!({"status": "packed"}))
                    .await
                    .assert_status(StatusCode::NOT_FOUND);
            }

            // ==============================================================
            // Listing
            // ==============================================================

            #[tokio::test]
            async fn test_rest_list_filter() {
                let server = make_server().await;
                let body: Value = server.get("/api/orders").await.json();
                assert_eq!(body, json!([]));

                for (number, status) in [
                    ("order-ABC-1", ApprovalStatus::Approved),
                    ("xyzabc99", ApprovalStatus::Pending),
                    ("order-xyz", ApprovalStatus::Approved),
                ] {
                    server
                        .post("/api/orders")
                        .json(&serde_json::to_value(dated_order(number, status, None)).unwrap())
                        .await
                        .assert_status(StatusCode::CREATED);
                }

                let mut approved = numbers(
                    &server
                        .get("/api/orders")
                        .add_query_param("approvalStatus", "approved")
                        .await
                        .json(),
                );
                approved.sort();
                assert_eq!(approved, vec!["order-ABC-1", "order-xyz"]);

                let mut found =
                    numbers(&server.get("/api/orders?search=ABC").await.json());
                found.sort();
                assert_eq!(found, vec!["order-ABC-1", "xyzabc99"]);

                let both = numbers(
                    &server
                        .get("/api/orders?search=abc&approvalStatus=approved")
                        .await
                        .json(),
                );
                assert_eq!(both, vec!["order-ABC-1"]);
            }

            #[tokio::test]
            async fn test_rest_list_sort() {
                let server = make_server().await;
                for (number, date) in [("S-1", 100), ("S-2", 300), ("S-3", 200)] {
                    server
                        .post("/api/orders")
                        .json(
                            &serde_json::to_value(dated_order(
                                number,
                                ApprovalStatus::Pending,
                                Some(date),
                            ))
                            .unwrap(),
                        )
                        .await;
                }

                let newest = numbers(&server.get("/api/orders?sort=Newest").await.json());
                assert_eq!(newest, vec!["S-2", "S-3", "S-1"]);

                let oldest = numbers(&server.get("/api/orders?sort=Oldest").await.json());
                assert_eq!(oldest, vec!["S-1", "S-3", "S-2"]);

                let mut unsorted = numbers(&server.get("/api/orders").await.json());
                unsorted.sort();
                assert_eq!(unsorted, vec!["S-1", "S-2", "S-3"]);
            }

            // ==============================================================
            // Validation
            // ==============================================================

            #[tokio::test]
            async fn test_rest_create_missing_fields() {
                let server = make_server().await;

                let response = server
                    .post("/api/orders")
                    .json(&json!({"total": 10}))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);
                let body: Value = response.json();
                assert_eq!(body["success"], false);
                assert_eq!(body["message"], "Validation Error");
                assert!(body["errors"]["orderNumber"].is_string());
                assert!(body["errors"]["orderStatus"].is_string());

                let listed: Value = server.get("/api/orders").await.json();
                assert_eq!(listed, json!([]));
            }

            #[tokio::test]
            async fn test_rest_update_unknown_field() {
                let server = make_server().await;
                server
                    .post("/api/orders")
                    .json(&json!({"orderNumber": "W-500", "orderStatus": "new"}))
                    .await;

                let response = server
                    .put("/api/orders/W-500")
                    .json(&json!({"orderStatus": "hacked", "isAdmin": true}))
                    .await;
                response.assert_status(StatusCode::BAD_REQUEST);

                let stored: Value = server.get("/api/orders/W-500").await.json();
                assert_eq!(stored["orderStatus"], "new");
            }
        }
    };
}
