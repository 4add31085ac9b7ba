//! Macro-generated test suite for the `HashStore` contract.
//!
//! # Generated Tests
//!
//! ## Hash commands
//! - `test_hset_and_hgetall`: fields written then read back, later writes win
//! - `test_hgetall_missing_key`: absent key gives an empty map
//! - `test_hdel_fields`: removed fields disappear, others stay
//! - `test_hdel_missing_key`: no error
//! - `test_keys_pattern`: only matching keys are listed
//! - `test_close`: calls fail once the store is closed
//!
//! ## Repository over the backend
//! - `test_order_round_trip`: every field kind survives the hash encoding
//! - `test_zero_field_key_is_none`: an empty hash reads as no order
//! - `test_record_without_number_is_corrupt`: no phantom `order:` record
//! - `test_nulls_are_not_stored`: cleared fields are removed from the hash
//! - `test_filters_skip_foreign_keys`: keys outside `order:*` are ignored
//! - `test_concurrent_creates`: parallel creates from spawned tasks

/// Generate a `HashStore` conformance suite.
///
/// `$factory` must evaluate to a fresh, empty store implementing
/// `HashStore + 'static`. It is re-evaluated for each test.
macro_rules! hash_store_tests {
    ($factory:expr) => {
        mod hash_store_contract_tests {
            use super::*;
            use order_hash_api::config::OrdersConfig;
            use order_hash_api::core::error::{OrderError, StorageError};
            use order_hash_api::core::order::{ApprovalStatus, Order};
            use order_hash_api::core::query::OrderFilters;
            use order_hash_api::core::service::OrderRepository;
            use order_hash_api::core::store::HashStore;
            use serde_json::{Map, Value, json};
            use std::sync::Arc;

            async fn store() -> Arc<dyn HashStore> {
                Arc::new($factory)
            }

            async fn repository() -> OrderRepository {
                OrderRepository::new(store().await, OrdersConfig::default())
            }

            // ==================================================================
            // Hash commands
            // ==================================================================

            #[tokio::test]
            async fn test_hset_and_hgetall() {
                let store = store().await;
                store
                    .hset("order:h1", &pairs(&[("a", "1"), ("b", "{\"x\":2}")]))
                    .await
                    .unwrap();
                store.hset("order:h1", &pairs(&[("a", "9")])).await.unwrap();

                let hash = store.hgetall("order:h1").await.unwrap();
                assert_eq!(hash.len(), 2);
                assert_eq!(hash["a"], "9");
                assert_eq!(hash["b"], "{\"x\":2}");
            }

            #[tokio::test]
            async fn test_hgetall_missing_key() {
                let store = store().await;
                assert!(store.hgetall("order:missing").await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_hdel_fields() {
                let store = store().await;
                store
                    .hset("order:h2", &pairs(&[("a", "1"), ("b", "2"), ("c", "3")]))
                    .await
                    .unwrap();
                store
                    .hdel("order:h2", &["a".to_string(), "c".to_string()])
                    .await
                    .unwrap();

                let hash = store.hgetall("order:h2").await.unwrap();
                assert_eq!(hash.len(), 1);
                assert_eq!(hash["b"], "2");
            }

            #[tokio::test]
            async fn test_hdel_missing_key() {
                let store = store().await;
                store.hdel("order:nope", &["a".to_string()]).await.unwrap();
            }

            #[tokio::test]
            async fn test_keys_pattern() {
                let store = store().await;
                for key in ["order:1", "order:2", "session:1"] {
                    store.hset(key, &pairs(&[("f", "v")])).await.unwrap();
                }

                let keys = sorted(store.keys("order:*").await.unwrap());
                assert_eq!(keys, vec!["order:1", "order:2"]);
                assert!(store.keys("invoice:*").await.unwrap().is_empty());
            }

            #[tokio::test]
            async fn test_close() {
                let store = store().await;
                assert!(store.is_open());
                store.close().await.unwrap();
                assert!(!store.is_open());

                let err = store.hgetall("order:1").await.unwrap_err();
                assert!(matches!(err, StorageError::Unavailable { .. }));
            }

            // ==================================================================
            // Repository over the backend
            // ==================================================================

            #[tokio::test]
            async fn test_order_round_trip() {
                let repo = repository().await;
                let order = full_order("RT-1");
                repo.create(order.clone()).await.unwrap();

                let found = repo.find_by_order_number("RT-1").await.unwrap().unwrap();
                assert_eq!(found, order);
                assert_eq!(found.line_items, order.line_items);
                assert_eq!(found.shipping_address.as_ref().unwrap()["zip"], "SW1Y 4JH");
            }

            #[tokio::test]
            async fn test_zero_field_key_is_none() {
                let repo = repository().await;
                assert!(repo.find_by_order_number("ghost").await.unwrap().is_none());
            }

            #[tokio::test]
            async fn test_record_without_number_is_corrupt() {
                let repo = repository().await;
                repo.store()
                    .hset("order:X", &pairs(&[("orderStatus", "new")]))
                    .await
                    .unwrap();

                let err = repo.find_by_order_number("X").await.unwrap_err();
                assert!(matches!(
                    err,
                    OrderError::Storage(StorageError::Integrity { .. })
                ));
                assert!(repo.transition_status("X", "packed").await.is_err());
                assert_eq!(sorted(repo.store().keys("*").await.unwrap()), vec!["order:X"]);
            }

            #[tokio::test]
            async fn test_nulls_are_not_stored() {
                let repo = repository().await;
                repo.create(full_order("N-1")).await.unwrap();

                let mut updates = Map::new();
                updates.insert("trackingNumber".to_string(), Value::Null);
                updates.insert("lineItems".to_string(), json!(null));
                repo.update("N-1", updates).await.unwrap();

                let hash = repo.store().hgetall("order:N-1").await.unwrap();
                assert!(!hash.contains_key("trackingNumber"));
                assert!(!hash.contains_key("lineItems"));
                assert_eq!(hash["orderNumber"], "N-1");
            }

            #[tokio::test]
            async fn test_filters_skip_foreign_keys() {
                let repo = repository().await;
                repo.create(dated_order("F-1", ApprovalStatus::Approved, Some(1)))
                    .await
                    .unwrap();
                repo.store()
                    .hset("session:1", &pairs(&[("approvalStatus", "approved")]))
                    .await
                    .unwrap();

                let found = repo
                    .find_by_filters(&OrderFilters::default().approval_status("approved"))
                    .await
                    .unwrap();
                assert_eq!(found.len(), 1);
                assert_eq!(found[0].order_number, "F-1");
            }

            #[tokio::test]
            async fn test_concurrent_creates() {
                let repo = repository().await;
                let mut handles = Vec::new();
                for i in 0..10 {
                    let repo = repo.clone();
                    handles.push(tokio::spawn(async move {
                        repo.create(Order::new(format!("C-{}", i), "new")).await
                    }));
                }
                for handle in handles {
                    handle.await.unwrap().unwrap();
                }

                let all = repo.find_by_filters(&OrderFilters::default()).await.unwrap();
                assert_eq!(all.len(), 10);
            }

            #[tokio::test]
            async fn test_closed_store_surfaces_as_storage_error() {
                let repo = repository().await;
                repo.store().close().await.unwrap();
                let err = repo.create(Order::new("X-1", "new")).await.unwrap_err();
                assert!(matches!(err, OrderError::Storage(_)));
            }
        }
    };
}
