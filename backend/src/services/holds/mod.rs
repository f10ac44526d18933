//! Bulk hold management.
//!
//! `POST /api/holds/bulk` accepts a multipart upload — a `json` metadata
//! field (scheme and hold category) followed by a `file` field carrying a
//! CSV of FRNs — and schedules a background job that validates every row
//! and persists the accepted batch to blob storage for the payment backend
//! to process. The response is a `job_id`; clients poll it through
//! `GET /api/jobs/status/{job_id}` like any report job.

use actix_web::Scope;
use actix_web::web::{post, scope};

mod upload;
mod validate;

const API_PATH: &str = "/api/holds";

/// Configures and returns the Actix scope for hold routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/bulk", post().to(upload::process))
}
