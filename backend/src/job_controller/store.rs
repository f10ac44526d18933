use std::sync::Arc;

use common::jobs::JobRecord;
use log::warn;

use super::cache::{CacheError, JobCache};

/// Record-level facade over the job cache.
///
/// Writes and reads propagate backend errors to the caller, which treats
/// them as failed transitions. Removal is best-effort: a record that cannot
/// be dropped simply lingers until the cache TTL reclaims it.
#[derive(Clone)]
pub struct JobStore {
    cache: Arc<dyn JobCache>,
}

impl JobStore {
    pub fn new(cache: Arc<dyn JobCache>) -> Self {
        Self { cache }
    }

    pub fn set(&self, job_id: &str, record: JobRecord) -> Result<(), CacheError> {
        self.cache.set(job_id, record)
    }

    /// Returns the stored record, or `None` for absent ids. A structurally
    /// invalid (blank) id is absent by definition and never reaches the
    /// backend.
    pub fn get(&self, job_id: &str) -> Result<Option<JobRecord>, CacheError> {
        if job_id.trim().is_empty() {
            return Ok(None);
        }
        self.cache.get(job_id)
    }

    /// Drops the record if present. A no-op for unknown ids; backend errors
    /// are logged and swallowed.
    pub fn remove(&self, job_id: &str) {
        if let Err(e) = self.cache.remove(job_id) {
            warn!("failed to drop job record {}: {}", job_id, e);
        }
    }
}
