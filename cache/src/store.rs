use std::time::{Duration, Instant};

use async_trait::async_trait;
use common::error::Res;
use dashmap::DashMap;
use redis::AsyncCommands;

/// String key-value storage with per-entry expiry.
#[async_trait]
pub trait KvStore: Send + Sync {
    async fn get(&self, key: &str) -> Res<Option<String>>;
    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Res<()>;
}

/// Redis-backed store, shared by every server instance.
pub struct RedisStore {
    pool: deadpool_redis::Pool,
}

impl RedisStore {
    pub fn new(pool: deadpool_redis::Pool) -> Self {
        RedisStore { pool }
    }
}

#[async_trait]
impl KvStore for RedisStore {
    async fn get(&self, key: &str) -> Res<Option<String>> {
        let mut conn = self.pool.get().await?;
        let value: Option<String> = conn.get(key).await?;
        Ok(value)
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Res<()> {
        let mut conn = self.pool.get().await?;
        let _: () = conn.set_ex(key, value, ttl.as_secs().max(1)).await?;
        Ok(())
    }
}

/// Process-local store for single-instance deployments and tests.
#[derive(Default)]
pub struct MemoryStore {
    entries: DashMap<String, (String, Instant)>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl KvStore for MemoryStore {
    async fn get(&self, key: &str) -> Res<Option<String>> {
        let now = Instant::now();
        // drop the read guard before removing
        let hit = self.entries.get(key).map(|entry| {
            let (value, expires_at) = entry.value();
            (*expires_at > now).then(|| value.clone())
        });

        match hit {
            Some(Some(value)) => Ok(Some(value)),
            Some(None) => {
                self.entries.remove_if(key, |_, (_, expires_at)| *expires_at <= now);
                Ok(None)
            }
            None => Ok(None),
        }
    }

    async fn set_ex(&self, key: &str, value: &str, ttl: Duration) -> Res<()> {
        self.entries
            .insert(key.to_string(), (value.to_string(), Instant::now() + ttl));
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn memory_store_round_trips_until_expiry() {
        let store = MemoryStore::new();
        store.set_ex("author:A1", "payload", Duration::from_millis(50)).await.unwrap();
        assert_eq!(store.get("author:A1").await.unwrap().as_deref(), Some("payload"));

        tokio::time::sleep(Duration::from_millis(80)).await;
        assert_eq!(store.get("author:A1").await.unwrap(), None);
        assert!(store.entries.is_empty());
    }

    #[tokio::test]
    async fn overwrite_replaces_value_and_ttl() {
        let store = MemoryStore::new();
        store.set_ex("k", "old", Duration::from_millis(10)).await.unwrap();
        store.set_ex("k", "new", Duration::from_secs(60)).await.unwrap();
        tokio::time::sleep(Duration::from_millis(30)).await;
        assert_eq!(store.get("k").await.unwrap().as_deref(), Some("new"));
    }
}
