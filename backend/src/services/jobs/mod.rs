//! Job status polling, shared by every report and upload flow.

use actix_web::Scope;
use actix_web::web::{get, scope};

mod get_status;

const API_PATH: &str = "/api/jobs";

/// Configures and returns the Actix scope for job status routes.
pub fn configure_routes() -> Scope {
    scope(API_PATH).route("/status/{job_id}", get().to(get_status::process))
}
