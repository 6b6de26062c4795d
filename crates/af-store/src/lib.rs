use async_trait::async_trait;
use redis::AsyncCommands;
use redis::aio::ConnectionManager;
use std::collections::HashMap;
use std::fmt;
use std::time::{Duration, Instant};
use thiserror::Error;
use tokio::sync::RwLock;

/// Every backend failure surfaces as this one error; callers treat the store
/// as an opaque collaborator and never branch on backend detail.
#[derive(Debug, Error)]
#[error("store unavailable: {reason}")]
pub struct StoreUnavailable {
    reason: String,
}

impl StoreUnavailable {
    pub fn new(reason: impl fmt::Display) -> Self {
        Self {
            reason: reason.to_string(),
        }
    }
}

pub type StoreResult<T> = Result<T, StoreUnavailable>;

/// External key-value store with per-key expiry. Nonces and rate-limit
/// counters are the only shared state in the auth core, and both live here.
#[async_trait]
pub trait TtlStore: Send + Sync {
    /// Writes `value` under `key`, overwriting any prior value, expiring after `ttl`.
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()>;

    /// Returns the value for `key`, or `None` if absent or expired.
    async fn get(&self, key: &str) -> StoreResult<Option<String>>;

    async fn del(&self, key: &str) -> StoreResult<()>;

    /// Increments the integer counter at `key` (creating it at 1) and returns
    /// the post-increment value. Does not touch the key's expiry.
    async fn incr(&self, key: &str) -> StoreResult<i64>;

    /// Sets the expiry of an existing key. A no-op if the key is absent.
    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()>;

    /// Remaining time-to-live, or `None` if the key is absent or has no expiry.
    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>>;
}

struct Entry {
    value: String,
    expires_at: Option<Instant>,
}

impl Entry {
    fn expired(&self) -> bool {
        self.expires_at.is_some_and(|deadline| deadline <= Instant::now())
    }
}

/// In-process implementation used by unit tests and local runs without Redis.
/// Expired entries are pruned lazily on access.
#[derive(Default)]
pub struct MemoryTtlStore {
    entries: RwLock<HashMap<String, Entry>>,
}

impl MemoryTtlStore {
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl TtlStore for MemoryTtlStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut guard = self.entries.write().await;
        guard.insert(
            key.to_owned(),
            Entry {
                value: value.to_owned(),
                expires_at: Some(Instant::now() + ttl),
            },
        );
        Ok(())
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut guard = self.entries.write().await;
        match guard.get(key) {
            Some(entry) if entry.expired() => {
                guard.remove(key);
                Ok(None)
            }
            Some(entry) => Ok(Some(entry.value.clone())),
            None => Ok(None),
        }
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        let mut guard = self.entries.write().await;
        guard.remove(key);
        Ok(())
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut guard = self.entries.write().await;
        if guard.get(key).is_some_and(Entry::expired) {
            guard.remove(key);
        }
        match guard.get_mut(key) {
            Some(entry) => {
                let current: i64 = entry
                    .value
                    .parse()
                    .map_err(|_| StoreUnavailable::new("counter value is not an integer"))?;
                let next = current + 1;
                entry.value = next.to_string();
                Ok(next)
            }
            None => {
                guard.insert(
                    key.to_owned(),
                    Entry {
                        value: "1".to_owned(),
                        expires_at: None,
                    },
                );
                Ok(1)
            }
        }
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        let mut guard = self.entries.write().await;
        if let Some(entry) = guard.get_mut(key) {
            entry.expires_at = Some(Instant::now() + ttl);
        }
        Ok(())
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        let guard = self.entries.read().await;
        let Some(entry) = guard.get(key) else {
            return Ok(None);
        };
        if entry.expired() {
            return Ok(None);
        }
        Ok(entry
            .expires_at
            .map(|deadline| deadline.saturating_duration_since(Instant::now())))
    }
}

/// Production backend over a shared Redis/Valkey connection.
#[derive(Clone)]
pub struct RedisTtlStore {
    manager: ConnectionManager,
}

impl RedisTtlStore {
    pub async fn connect(url: &str) -> StoreResult<Self> {
        let client = redis::Client::open(url).map_err(StoreUnavailable::new)?;
        let manager = ConnectionManager::new(client)
            .await
            .map_err(StoreUnavailable::new)?;
        Ok(Self { manager })
    }
}

#[async_trait]
impl TtlStore for RedisTtlStore {
    async fn set(&self, key: &str, value: &str, ttl: Duration) -> StoreResult<()> {
        let mut connection = self.manager.clone();
        connection
            .set_ex::<_, _, ()>(key, value, ttl.as_secs())
            .await
            .map_err(StoreUnavailable::new)
    }

    async fn get(&self, key: &str) -> StoreResult<Option<String>> {
        let mut connection = self.manager.clone();
        connection.get(key).await.map_err(StoreUnavailable::new)
    }

    async fn del(&self, key: &str) -> StoreResult<()> {
        let mut connection = self.manager.clone();
        connection
            .del::<_, ()>(key)
            .await
            .map_err(StoreUnavailable::new)
    }

    async fn incr(&self, key: &str) -> StoreResult<i64> {
        let mut connection = self.manager.clone();
        connection.incr(key, 1).await.map_err(StoreUnavailable::new)
    }

    async fn expire(&self, key: &str, ttl: Duration) -> StoreResult<()> {
        let mut connection = self.manager.clone();
        connection
            .expire::<_, ()>(key, ttl.as_secs() as i64)
            .await
            .map_err(StoreUnavailable::new)
    }

    async fn ttl(&self, key: &str) -> StoreResult<Option<Duration>> {
        let mut connection = self.manager.clone();
        let seconds: i64 = connection.ttl(key).await.map_err(StoreUnavailable::new)?;
        // Redis returns -2 for a missing key and -1 for a key without expiry.
        if seconds < 0 {
            return Ok(None);
        }
        Ok(Some(Duration::from_secs(seconds as u64)))
    }
}
