//! The job lifecycle driver.
//!
//! `start_job` is the single entry point behind every report and bulk-upload
//! flow in this service. It owns the lifecycle contract:
//!
//! 1. generate a fresh job id;
//! 2. write the `Pending` record synchronously, before any task is spawned,
//!    so a poll issued right after the response already finds the job;
//! 3. run the operation on a spawned task — the caller gets the id back and
//!    nothing else, the outcome is only ever observable through the store;
//! 4. write exactly one terminal record when the operation settles.
//!
//! Two submissions with identical parameters produce two independent jobs;
//! there is no fingerprinting or deduplication. An operation that never
//! settles leaves its record non-terminal until the cache TTL reclaims it —
//! there is no driver-level timeout.

use std::future::Future;

use log::error;
use uuid::Uuid;

use common::jobs::{JobRecord, OperationKind};

use super::cache::CacheError;
use super::state::{JobUpdate, JobsState};

/// What a background operation settles with.
#[derive(Debug)]
pub enum JobOutcome {
    /// The tracking API located or produced an artifact under this storage
    /// name; the job becomes `Ready` and the download endpoint streams it.
    Artifact { filename: String },
    /// The operation finished with nothing to stream; the job becomes
    /// `Completed`.
    Done,
}

/// Schedules `operation` and returns the new job id.
///
/// `final_filename` is invoked on the success path only, and its result is
/// stored as the user-facing download filename. Errors from `operation` are
/// logged here; only the message itself is persisted into the record.
pub async fn start_job<Op, Fut, Name>(
    state: &JobsState,
    kind: OperationKind,
    final_filename: Name,
    operation: Op,
) -> Result<String, CacheError>
where
    Op: FnOnce() -> Fut + Send + 'static,
    Fut: Future<Output = Result<JobOutcome, String>> + Send + 'static,
    Name: FnOnce() -> Option<String> + Send + 'static,
{
    let job_id = Uuid::new_v4().to_string();
    state.store.set(&job_id, JobRecord::pending(kind.clone()))?;

    let tx = state.tx.clone();
    let id = job_id.clone();
    tokio::spawn(async move {
        let _ = tx
            .send(JobUpdate {
                job_id: id.clone(),
                record: JobRecord::processing(kind.clone()),
            })
            .await;

        let record = match operation().await {
            Ok(JobOutcome::Artifact { filename }) => {
                match validate_artifact(&kind, &filename) {
                    Ok(()) => JobRecord::ready(kind.clone(), filename, final_filename()),
                    Err(reason) => {
                        error!("job {} produced an unusable artifact: {}", id, reason);
                        JobRecord::failed(kind.clone(), reason)
                    }
                }
            }
            Ok(JobOutcome::Done) => JobRecord::completed(kind.clone()),
            Err(message) => {
                error!("job {} failed: {}", id, message);
                JobRecord::failed(kind.clone(), message)
            }
        };

        let _ = tx.send(JobUpdate { job_id: id, record }).await;
    });

    Ok(job_id)
}

/// An artifact descriptor is only usable if it names a file with the
/// extension the operation kind expects.
fn validate_artifact(kind: &OperationKind, filename: &str) -> Result<(), String> {
    let expected = match kind.artifact_extension() {
        Some(ext) => ext,
        None => return Err("operation does not produce a downloadable artifact".to_string()),
    };
    if filename.trim().is_empty() {
        return Err("tracking API returned an empty artifact name".to_string());
    }
    if !filename.ends_with(expected) {
        return Err(format!(
            "unexpected artifact '{}', expected a {} file",
            filename, expected
        ));
    }
    Ok(())
}
