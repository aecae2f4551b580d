use std::time::Duration;

use async_trait::async_trait;
use redis::AsyncCommands;
use tracing::debug;

use crate::cache::{CacheError, CacheStore};

/// Redis-backed cache store. Values are JSON strings under plain keys;
/// TTL is enforced server-side with SET EX.
#[derive(Clone)]
pub struct RedisCache {
    client: redis::Client,
}

impl RedisCache {
    pub fn new(connection_string: &str) -> Result<Self, CacheError> {
        let client = redis::Client::open(connection_string)
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(Self { client })
    }

    async fn connection(&self) -> Result<redis::aio::MultiplexedConnection, CacheError> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))
    }
}

#[async_trait]
impl CacheStore for RedisCache {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, CacheError> {
        let mut conn = self.connection().await?;
        let raw: Option<String> = conn
            .get(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        match raw {
            Some(payload) => {
                let value = serde_json::from_str(&payload)
                    .map_err(|e| CacheError::Backend(format!("corrupt cache value: {e}")))?;
                Ok(Some(value))
            }
            None => Ok(None),
        }
    }

    async fn set(
        &self,
        key: &str,
        value: serde_json::Value,
        ttl: Duration,
    ) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        conn.set_ex::<_, _, ()>(key, value.to_string(), ttl.as_secs())
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        debug!(key, ttl_seconds = ttl.as_secs(), "cache set");
        Ok(())
    }

    async fn delete(&self, key: &str) -> Result<(), CacheError> {
        let mut conn = self.connection().await?;
        conn.del::<_, ()>(key)
            .await
            .map_err(|e| CacheError::Backend(e.to_string()))?;
        Ok(())
    }
}
