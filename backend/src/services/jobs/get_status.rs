use actix_web::{HttpResponse, Responder, web};
use log::error;

use common::jobs::StatusResponse;

use crate::job_controller::state::JobsState;

pub(crate) async fn process(
    job_id: web::Path<String>,
    state: web::Data<JobsState>,
) -> impl Responder {
    get_job_status(&job_id.into_inner(), &state)
}

fn get_job_status(job_id: &str, state: &JobsState) -> HttpResponse {
    match state.store.get(job_id) {
        Ok(Some(record)) => HttpResponse::Ok().json(StatusResponse::from(&record.status)),
        Ok(None) => HttpResponse::Ok().json(StatusResponse::not_found()),
        Err(e) => {
            error!("status lookup for job {} failed: {}", job_id, e);
            // A cache outage and a failed job look the same to the poller.
            HttpResponse::Ok().json(StatusResponse::lookup_failed())
        }
    }
}
