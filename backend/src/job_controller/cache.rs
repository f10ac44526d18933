use std::time::Duration;

use common::jobs::JobRecord;
use moka::sync::Cache;
use thiserror::Error;

/// Error surfaced by a cache backend. The moka implementation never produces
/// one, but the trait keeps the failure path explicit for backends that can
/// lose connectivity.
#[derive(Debug, Error)]
pub enum CacheError {
    #[error("cache backend error: {0}")]
    Backend(String),
}

/// TTL key-value cache holding job records.
///
/// The handle is passed into `JobStore` explicitly; nothing in this crate
/// reaches a cache through ambient state. Expiry is the backend's concern,
/// configured at construction.
pub trait JobCache: Send + Sync {
    fn get(&self, key: &str) -> Result<Option<JobRecord>, CacheError>;
    fn set(&self, key: &str, record: JobRecord) -> Result<(), CacheError>;
    fn remove(&self, key: &str) -> Result<(), CacheError>;
}

/// Production cache: moka with a fixed time-to-live and bounded capacity.
pub struct MokaJobCache {
    inner: Cache<String, JobRecord>,
}

impl MokaJobCache {
    pub fn new(capacity: u64, ttl: Duration) -> Self {
        let inner = Cache::builder()
            .max_capacity(capacity)
            .time_to_live(ttl)
            .build();
        Self { inner }
    }
}

impl JobCache for MokaJobCache {
    fn get(&self, key: &str) -> Result<Option<JobRecord>, CacheError> {
        Ok(self.inner.get(key))
    }

    fn set(&self, key: &str, record: JobRecord) -> Result<(), CacheError> {
        self.inner.insert(key.to_string(), record);
        Ok(())
    }

    fn remove(&self, key: &str) -> Result<(), CacheError> {
        self.inner.invalidate(key);
        Ok(())
    }
}
