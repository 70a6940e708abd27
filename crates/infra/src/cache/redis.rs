//! Redis-backed cache (enabled with the `redis` feature).

use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;

use crate::store::StoreError;

use super::Cache;

pub struct RedisCache {
    client: redis::Client,
    key_prefix: String,
}

impl RedisCache {
    pub fn new(redis_url: &str, key_prefix: impl Into<String>) -> Result<Self, StoreError> {
        let client = redis::Client::open(redis_url)
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        Ok(Self {
            client,
            key_prefix: key_prefix.into(),
        })
    }

    fn prefixed(&self, key: &str) -> String {
        format!("{}{}", self.key_prefix, key)
    }
}

#[async_trait]
impl Cache for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<String>, StoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        conn.get(self.prefixed(key))
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }

    async fn set(&self, key: &str, value: &str, ttl: Duration) -> Result<(), StoreError> {
        let mut conn = self
            .client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))?;
        conn.set_ex(self.prefixed(key), value, ttl.as_secs())
            .await
            .map_err(|e| StoreError::Unavailable(e.to_string()))
    }
}
