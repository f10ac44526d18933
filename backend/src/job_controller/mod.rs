//! Tracks long-running background jobs through a TTL-backed status store.
//!
//! Every report generation and bulk upload in this service follows the same
//! protocol: a handler schedules a job and immediately returns its id, the
//! browser polls `/api/jobs/status/{job_id}`, and once the job is terminal
//! the artifact (if any) is streamed from the download endpoint.
//!
//! The pieces:
//! - `cache`: the `JobCache` abstraction over a TTL key-value cache, plus the
//!   production moka-backed implementation.
//! - `store`: `JobStore`, the narrow record-level facade used everywhere else.
//! - `state`: `JobsState`, the clonable handle injected into the Actix app,
//!   and the updater task that serializes background status writes.
//! - `driver`: `start_job`, the one parametrized lifecycle driver.

pub mod cache;
pub mod driver;
pub mod state;
pub mod store;
