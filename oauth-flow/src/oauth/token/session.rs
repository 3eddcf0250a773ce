//! Session-backed key-value store for access tokens and pending flow state.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::Value;
use tokio::sync::Mutex;

use crate::error::Error;

/// Trait for the per-user session storage the flow writes into.
///
/// Values are JSON so that any session layer able to hold serialized data
/// (cookies, `tower-sessions`, a cache) can back the flow. Consistency across
/// concurrent requests is the session layer's concern.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Read the value stored under `key`.
    async fn get(&self, key: &str) -> Result<Option<Value>, Error>;

    /// Store `value` under `key`, replacing any previous value.
    async fn set(&self, key: &str, value: Value) -> Result<(), Error>;

    /// Remove the value stored under `key`, if any.
    async fn remove(&self, key: &str) -> Result<(), Error>;

    /// Whether a value is stored under `key`.
    async fn has(&self, key: &str) -> Result<bool, Error> {
        Ok(self.get(key).await?.is_some())
    }
}

/// Session key of the access token for `provider`.
pub fn access_token_key(provider: &str) -> String {
    format!("oauth_token_{}", provider)
}

/// Session key of the pending OAuth1 request token for `provider`.
pub fn request_token_key(provider: &str) -> String {
    format!("oauth_request_token_{}", provider)
}

/// Session key of the OAuth1 flow state issued alongside `request_token`.
pub fn state_key(request_token: &str) -> String {
    format!("{}_state", request_token)
}

/// In-process session store.
///
/// Clones share the same underlying map.
#[derive(Debug, Clone, Default)]
pub struct MemorySession {
    values: Arc<Mutex<HashMap<String, Value>>>,
}

impl MemorySession {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of stored entries.
    pub async fn len(&self) -> usize {
        self.values.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.values.lock().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for MemorySession {
    async fn get(&self, key: &str) -> Result<Option<Value>, Error> {
        let map = self.values.lock().await;
        Ok(map.get(key).cloned())
    }

    async fn set(&self, key: &str, value: Value) -> Result<(), Error> {
        let mut map = self.values.lock().await;
        map.insert(key.to_string(), value);
        Ok(())
    }

    async fn remove(&self, key: &str) -> Result<(), Error> {
        let mut map = self.values.lock().await;
        map.remove(key);
        Ok(())
    }
}
