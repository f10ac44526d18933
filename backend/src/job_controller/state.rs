//! Shared job-tracking state and the central updater task.
//!
//! Background operations never write to the store themselves; they push
//! `JobUpdate` messages into an MPSC channel and a single long-running task
//! applies them. That keeps every status write after job creation on one
//! code path and decouples workers from the cache handle.

use log::error;
use tokio::sync::mpsc;

use common::jobs::JobRecord;

use super::store::JobStore;

/// Clonable handle shared across the Actix application as `web::Data`.
#[derive(Clone)]
pub struct JobsState {
    /// Record store, read directly by the status and download endpoints.
    pub store: JobStore,
    /// Sender used by the lifecycle driver to publish status changes.
    pub tx: mpsc::Sender<JobUpdate>,
}

/// A full replacement record for one job. Last write wins.
#[derive(Debug)]
pub struct JobUpdate {
    pub(crate) job_id: String,
    pub(crate) record: JobRecord,
}

/// Applies queued updates to the store. Spawned once from `main`.
///
/// A write that the cache backend rejects is logged and dropped; the record
/// keeps its previous status until the TTL reclaims it, which a polling
/// client observes as a job that never progressed.
pub async fn start_job_updater(state: JobsState, mut rx: mpsc::Receiver<JobUpdate>) {
    while let Some(update) = rx.recv().await {
        if let Err(e) = state.store.set(&update.job_id, update.record) {
            error!("failed to persist status for job {}: {}", update.job_id, e);
        }
    }
}
