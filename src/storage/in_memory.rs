//! In-memory implementation of HashStore for testing and development

use crate::core::error::StorageError;
use crate::core::store::HashStore;
use async_trait::async_trait;
use regex::Regex;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, RwLock};

const BACKEND: &str = "memory";

type Hashes = BTreeMap<String, BTreeMap<String, String>>;

/// In-memory hash store
///
/// Keys are kept sorted, so `keys` returns them in lexical order. Uses RwLock
/// for thread-safe access; clones share the same data.
#[derive(Clone)]
pub struct InMemoryHashStore {
    hashes: Arc<RwLock<Hashes>>,
    open: Arc<AtomicBool>,
}

impl InMemoryHashStore {
    pub fn new() -> Self {
        Self {
            hashes: Arc::new(RwLock::new(BTreeMap::new())),
            open: Arc::new(AtomicBool::new(true)),
        }
    }

    fn ensure_open(&self) -> Result<(), StorageError> {
        if self.is_open() {
            Ok(())
        } else {
            Err(StorageError::Unavailable {
                backend: BACKEND.to_string(),
            })
        }
    }

    fn lock_error(e: impl std::fmt::Display) -> StorageError {
        StorageError::Query {
            backend: BACKEND.to_string(),
            message: format!("Failed to acquire lock: {}", e),
        }
    }
}

impl Default for InMemoryHashStore {
    fn default() -> Self {
        Self::new()
    }
}

/// Translate a KEYS-style glob (`*`, `?`) into an anchored regex
fn glob_to_regex(pattern: &str) -> Result<Regex, StorageError> {
    let mut re = String::with_capacity(pattern.len() + 8);
    re.push('^');
    for c in pattern.chars() {
        match c {
            '*' => re.push_str(".*"),
            '?' => re.push('.'),
            other => re.push_str(&regex::escape(&other.to_string())),
        }
    }
    re.push('$');

    Regex::new(&re).map_err(|e| StorageError::Query {
        backend: BACKEND.to_string(),
        message: format!("invalid key pattern '{}': {}", pattern, e),
    })
}

#[async_trait]
impl HashStore for InMemoryHashStore {
    fn backend(&self) -> &'static str {
        BACKEND
    }

    async fn hset(&self, key: &str, fields: &[(String, String)]) -> Result<(), StorageError> {
        self.ensure_open()?;
        let mut hashes = self.hashes.write().map_err(Self::lock_error)?;

        let hash = hashes.entry(key.to_string()).or_default();
        for (field, value) in fields {
            hash.insert(field.clone(), value.clone());
        }

        Ok(())
    }

    async fn hgetall(&self, key: &str) -> Result<HashMap<String, String>, StorageError> {
        self.ensure_open()?;
        let hashes = self.hashes.read().map_err(Self::lock_error)?;

        Ok(hashes
            .get(key)
            .map(|hash| hash.iter().map(|(k, v)| (k.clone(), v.clone())).collect())
            .unwrap_or_default())
    }

    async fn hdel(&self, key: &str, fields: &[String]) -> Result<(), StorageError> {
        self.ensure_open()?;
        let mut hashes = self.hashes.write().map_err(Self::lock_error)?;

        let emptied = match hashes.get_mut(key) {
            Some(hash) => {
                for field in fields {
                    hash.remove(field);
                }
                hash.is_empty()
            }
            None => false,
        };
        // Redis drops a hash once its last field is gone
        if emptied {
            hashes.remove(key);
        }

        Ok(())
    }

    async fn keys(&self, pattern: &str) -> Result<Vec<String>, StorageError> {
        self.ensure_open()?;
        let matcher = glob_to_regex(pattern)?;
        let hashes = self.hashes.read().map_err(Self::lock_error)?;

        Ok(hashes
            .keys()
            .filter(|key| matcher.is_match(key))
            .cloned()
            .collect())
    }

    async fn close(&self) -> Result<(), StorageError> {
        self.open.store(false, Ordering::SeqCst);
        tracing::debug!("in-memory store closed");
        Ok(())
    }

    fn is_open(&self) -> bool {
        self.open.load(Ordering::SeqCst)
    }
}
