//! Report generation endpoints.
//!
//! Every report in the catalogue runs through the same three-step flow:
//!
//! - `POST /api/reports/start`: validates the filter parameters, schedules a
//!   background job that asks the payment tracking API for the dataset, and
//!   immediately returns a `job_id`.
//! - `GET /api/jobs/status/{job_id}` (registered by `services::jobs`): polled
//!   by the browser until the job is terminal.
//! - `GET /api/reports/download/{job_id}`: once the job is ready, renders the
//!   stored artifact as CSV or PDF and streams it as an attachment, dropping
//!   the job record on the way out.
//!
//! What varies between reports — the tracking path, the filename, the column
//! set, the output format — lives in `catalogue`.

use actix_web::Scope;
use actix_web::web::{get, post, scope};

pub mod catalogue;
pub mod csv;
mod download;
mod pdf;
mod start;

const API_PATH: &str = "/api/reports";

/// Configures and returns the Actix scope for the report routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH)
        // Route to start a new report generation job.
        .route("/start", post().to(start::process))
        // Route to stream a finished report.
        .route("/download/{job_id}", get().to(download::process))
}
