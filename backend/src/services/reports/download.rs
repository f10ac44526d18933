use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use log::error;
use serde_json::Value;

use common::jobs::OperationKind;
use common::model::report::OutputFormat;

use crate::clients::storage::BlobStore;
use crate::job_controller::state::JobsState;

use super::{csv, pdf};

/// The Actix web handler for `GET /api/reports/download/{job_id}`.
pub(crate) async fn process(
    job_id: web::Path<String>,
    state: web::Data<JobsState>,
    storage: web::Data<dyn BlobStore>,
) -> impl Responder {
    download_report(&job_id.into_inner(), &state, storage.into_inner()).await
}

/// Streams the generated report once the job is ready.
///
/// Anything short of a success record answers `202 Accepted` and the client
/// keeps polling. A generation failure after the job already reported ready
/// answers `500` so the client is not left polling forever. After a
/// successful read the record is dropped; a repeat download observes an
/// absent record and polls as not ready.
async fn download_report(
    job_id: &str,
    state: &JobsState,
    storage: Arc<dyn BlobStore>,
) -> HttpResponse {
    let record = match state.store.get(job_id) {
        Ok(Some(record)) => record,
        Ok(None) => return not_ready(),
        Err(e) => {
            error!("download lookup for job {} failed: {}", job_id, e);
            return HttpResponse::InternalServerError().body("job lookup failed");
        }
    };

    if !record.status.is_success() {
        return not_ready();
    }

    let report = match record.kind {
        OperationKind::Report(report) => report,
        OperationKind::BulkHold => {
            return HttpResponse::NotFound().body("this job has no downloadable artifact");
        }
    };

    let returned = match record.returned_filename.as_deref() {
        Some(name) => name,
        None => {
            error!("job {} is ready but names no artifact", job_id);
            return HttpResponse::InternalServerError().body("report generation failed");
        }
    };

    let bytes = match storage.fetch_by_name(returned).await {
        Ok(bytes) => bytes,
        Err(e) => {
            error!("failed to fetch artifact {} for job {}: {}", returned, job_id, e);
            return HttpResponse::InternalServerError().body("report generation failed");
        }
    };

    let rows = match artifact_rows(&bytes) {
        Ok(rows) => rows,
        Err(reason) => {
            error!("artifact {} for job {} is unusable: {}", returned, job_id, reason);
            return HttpResponse::InternalServerError().body("report generation failed");
        }
    };

    let rendered = match report.output() {
        OutputFormat::Csv => csv::render_csv(report, &rows),
        OutputFormat::Pdf => pdf::render_pdf(report, &rows),
    };
    let body = match rendered {
        Ok(body) => body,
        Err(reason) => {
            error!("rendering {} for job {} failed: {}", report.slug(), job_id, reason);
            return HttpResponse::InternalServerError().body("report generation failed");
        }
    };

    let filename = record
        .report_filename
        .clone()
        .unwrap_or_else(|| default_filename(report));

    state.store.remove(job_id);

    let mime = mime_guess::from_path(&filename).first_or_octet_stream();
    HttpResponse::Ok()
        .content_type(mime.as_ref())
        .append_header((
            "Content-Disposition",
            format!("attachment; filename=\"{}\"", filename),
        ))
        .body(body)
}

fn not_ready() -> HttpResponse {
    HttpResponse::Accepted().body("Report not ready")
}

fn default_filename(report: common::model::report::ReportKind) -> String {
    let extension = match report.output() {
        OutputFormat::Csv => "csv",
        OutputFormat::Pdf => "pdf",
    };
    format!("{}.{}", report.slug(), extension)
}

/// The artifact is either a bare JSON array of rows or an object wrapping
/// them under `data`.
fn artifact_rows(bytes: &[u8]) -> Result<Vec<Value>, String> {
    let value: Value =
        serde_json::from_slice(bytes).map_err(|e| format!("artifact is not valid JSON: {}", e))?;
    match value {
        Value::Array(rows) => Ok(rows),
        Value::Object(mut object) => match object.remove("data") {
            Some(Value::Array(rows)) => Ok(rows),
            _ => Err("artifact carries no row data".to_string()),
        },
        _ => Err("artifact carries no row data".to_string()),
    }
}
