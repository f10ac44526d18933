use std::sync::Arc;

use actix_web::{HttpResponse, Responder, web};
use log::error;

use common::jobs::OperationKind;
use common::model::report::ReportKind;
use common::requests::{JobStartedResponse, StartReportRequest};

use crate::clients::storage::BlobStore;
use crate::clients::tracking::{TrackingClient, TrackingResponse};
use crate::job_controller::cache::CacheError;
use crate::job_controller::driver::{JobOutcome, start_job};
use crate::job_controller::state::JobsState;

use super::catalogue;

/// The Actix web handler for `POST /api/reports/start`.
///
/// Validates the request filters, schedules the background fetch and
/// immediately returns a `job_id` for the client to poll.
pub(crate) async fn process(
    state: web::Data<JobsState>,
    tracking: web::Data<dyn TrackingClient>,
    storage: web::Data<dyn BlobStore>,
    payload: web::Json<StartReportRequest>,
) -> impl Responder {
    let request = payload.into_inner();
    if let Err(reason) = catalogue::validate_params(&request.params) {
        return HttpResponse::BadRequest().body(reason);
    }
    match schedule_report_job(&state, tracking.into_inner(), storage.into_inner(), request).await {
        Ok(job_id) => HttpResponse::Ok().json(JobStartedResponse { job_id }),
        Err(e) => HttpResponse::InternalServerError().body(e.to_string()),
    }
}

async fn schedule_report_job(
    state: &JobsState,
    tracking: Arc<dyn TrackingClient>,
    storage: Arc<dyn BlobStore>,
    request: StartReportRequest,
) -> Result<String, CacheError> {
    let report = request.report;
    let params = request.params;
    let path = catalogue::tracking_path(report, &params);

    start_job(
        state,
        OperationKind::Report(report),
        move || Some(catalogue::report_filename(report, &params)),
        move || fetch_report_data(tracking, storage, report, path),
    )
    .await
}

/// The background operation: ask the tracking API for the dataset and end up
/// with a named artifact in blob storage either way.
async fn fetch_report_data(
    tracking: Arc<dyn TrackingClient>,
    storage: Arc<dyn BlobStore>,
    report: ReportKind,
    path: String,
) -> Result<JobOutcome, String> {
    let response = tracking.fetch(&path).await.map_err(|e| {
        error!("tracking fetch for {} failed: {}", report.slug(), e);
        "report data could not be fetched".to_string()
    })?;

    match response {
        TrackingResponse::File { file } => Ok(JobOutcome::Artifact { filename: file }),
        TrackingResponse::Payload(payload) => {
            // Inline datasets are persisted under a job-scoped name so the
            // download path is the same for both response shapes.
            let name = format!("reports/{}-{}.json", report.slug(), uuid::Uuid::new_v4());
            let bytes = serde_json::to_vec(&payload)
                .map_err(|e| format!("failed to serialize dataset: {}", e))?;
            storage.save(&name, bytes).await.map_err(|e| {
                error!(
                    "failed to store inline dataset for {}: {}",
                    report.slug(),
                    e
                );
                "report data could not be stored".to_string()
            })?;
            Ok(JobOutcome::Artifact { filename: name })
        }
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use actix_web::{App, test};
    use async_trait::async_trait;
    use serde_json::json;
    use tokio::sync::mpsc;

    use common::jobs::{JobRecord, JobStatus};

    use crate::clients::storage::StorageError;
    use crate::clients::tracking::TrackingError;
    use crate::job_controller::cache::MokaJobCache;
    use crate::job_controller::state::start_job_updater;
    use crate::job_controller::store::JobStore;

    use super::*;

    struct StubTracking {
        response: TrackingResponse,
    }

    #[async_trait]
    impl TrackingClient for StubTracking {
        async fn fetch(&self, _path: &str) -> Result<TrackingResponse, TrackingError> {
            Ok(self.response.clone())
        }
    }

    struct MemoryBlobStore {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryBlobStore {
        fn new() -> Self {
            Self {
                blobs: Mutex::new(HashMap::new()),
            }
        }
    }

    #[async_trait]
    impl BlobStore for MemoryBlobStore {
        async fn fetch_by_name(&self, name: &str) -> Result<Vec<u8>, StorageError> {
            self.blobs
                .lock()
                .unwrap()
                .get(name)
                .cloned()
                .ok_or_else(|| StorageError::NotFound(name.to_string()))
        }

        async fn save(&self, name: &str, data: Vec<u8>) -> Result<(), StorageError> {
            self.blobs.lock().unwrap().insert(name.to_string(), data);
            Ok(())
        }
    }

    fn test_state() -> JobsState {
        let cache = Arc::new(MokaJobCache::new(64, Duration::from_secs(60)));
        let (tx, rx) = mpsc::channel(32);
        let state = JobsState {
            store: JobStore::new(cache),
            tx,
        };
        tokio::spawn(start_job_updater(state.clone(), rx));
        state
    }

    async fn wait_for_terminal(state: &JobsState, job_id: &str) -> JobRecord {
        for _ in 0..200 {
            if let Some(record) = state.store.get(job_id).unwrap() {
                if record.status.is_terminal() {
                    return record;
                }
            }
            tokio::time::sleep(Duration::from_millis(5)).await;
        }
        panic!("job {} never reached a terminal status", job_id);
    }

    #[actix_web::test]
    async fn starting_a_report_creates_a_job_that_becomes_ready() {
        let state = test_state();
        let tracking: Arc<dyn TrackingClient> = Arc::new(StubTracking {
            response: TrackingResponse::File {
                file: "reports/summary.json".to_string(),
            },
        });
        let storage: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .app_data(web::Data::from(tracking))
                .app_data(web::Data::from(storage))
                .service(crate::services::reports::configure_routes()),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/api/reports/start")
            .set_json(json!({
                "report": "transaction-summary",
                "schemeId": "SFI",
                "year": 2024,
            }))
            .to_request();
        let response: JobStartedResponse = test::call_and_read_body_json(&app, request).await;
        assert!(!response.job_id.is_empty());

        let terminal = wait_for_terminal(&state, &response.job_id).await;
        assert_eq!(terminal.status, JobStatus::Ready);
        assert_eq!(
            terminal.returned_filename.as_deref(),
            Some("reports/summary.json")
        );
        assert_eq!(
            terminal.report_filename.as_deref(),
            Some("transaction-summary-SFI-2024.csv")
        );
    }

    #[actix_web::test]
    async fn inline_payload_is_persisted_and_becomes_the_artifact() {
        let state = test_state();
        let tracking: Arc<dyn TrackingClient> = Arc::new(StubTracking {
            response: TrackingResponse::Payload(json!([{"frn": "1234567890"}])),
        });
        let storage = Arc::new(MemoryBlobStore::new());

        let job_id = schedule_report_job(
            &state,
            tracking,
            storage.clone(),
            StartReportRequest {
                report: ReportKind::HoldsSummary,
                params: Default::default(),
            },
        )
        .await
        .unwrap();

        let terminal = wait_for_terminal(&state, &job_id).await;
        assert_eq!(terminal.status, JobStatus::Ready);

        let name = terminal.returned_filename.unwrap();
        assert!(name.starts_with("reports/holds-summary-"));
        assert!(name.ends_with(".json"));
        let stored = storage.fetch_by_name(&name).await.unwrap();
        assert_eq!(stored, br#"[{"frn":"1234567890"}]"#);
    }

    #[actix_web::test]
    async fn invalid_filters_are_rejected_before_any_job_exists() {
        let state = test_state();
        let tracking: Arc<dyn TrackingClient> = Arc::new(StubTracking {
            response: TrackingResponse::Payload(json!([])),
        });
        let storage: Arc<dyn BlobStore> = Arc::new(MemoryBlobStore::new());

        let app = test::init_service(
            App::new()
                .app_data(web::Data::new(state.clone()))
                .app_data(web::Data::from(tracking))
                .app_data(web::Data::from(storage))
                .service(crate::services::reports::configure_routes()),
        )
        .await;

        let request = test::TestRequest::post()
            .uri("/api/reports/start")
            .set_json(json!({"report": "transaction-summary", "frn": "12345"}))
            .to_request();
        let response = test::call_service(&app, request).await;
        assert_eq!(response.status(), actix_web::http::StatusCode::BAD_REQUEST);
    }
}
