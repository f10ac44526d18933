use std::sync::Arc;

use actix_multipart::Multipart;
use actix_web::{HttpResponse, Responder, web};
use futures_util::StreamExt;
use log::{error, info};
use md5::Context;
use serde_json::from_slice;

use common::jobs::OperationKind;
use common::model::hold::BulkHoldRequest;
use common::requests::JobStartedResponse;

use crate::clients::storage::BlobStore;
use crate::job_controller::driver::{JobOutcome, start_job};
use crate::job_controller::state::JobsState;

use super::validate;

/// HTTP handler wrapper that converts the internal result to an `HttpResponse`.
///
/// - On success: returns `200 OK` with the scheduled job id.
/// - On failure: returns `400 Bad Request` with the error message.
pub(crate) async fn process(
    payload: Multipart,
    state: web::Data<JobsState>,
    storage: web::Data<dyn BlobStore>,
) -> impl Responder {
    match upload_bulk_holds(payload, &state, storage.into_inner()).await {
        Ok(job_id) => HttpResponse::Ok().json(JobStartedResponse { job_id }),
        Err(e) => HttpResponse::BadRequest().body(format!("Error: {}", e)),
    }
}

/// Accepts a bulk hold batch: a `json` metadata part followed by a CSV of
/// FRNs. The upload is hashed while it streams in, the header is checked up
/// front, and the row-level validation runs as a background job the client
/// polls like any other.
async fn upload_bulk_holds(
    mut payload: Multipart,
    state: &JobsState,
    storage: Arc<dyn BlobStore>,
) -> Result<String, Box<dyn std::error::Error>> {
    let mut request: Option<BulkHoldRequest> = None;
    let mut file_bytes: Option<Vec<u8>> = None;
    let mut md5_hasher = Context::new();

    while let Some(item) = payload.next().await {
        let mut field = item?;
        let field_name = field
            .content_disposition()
            .and_then(|cd| cd.get_name().map(|n| n.to_string()));

        match field_name.as_deref() {
            Some("json") => {
                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    bytes.extend_from_slice(&chunk?);
                }
                let meta: BulkHoldRequest = from_slice(&bytes)?;
                // The scheme id ends up in the artifact name.
                if meta.scheme_id.is_empty()
                    || !meta
                        .scheme_id
                        .chars()
                        .all(|c| c.is_ascii_alphanumeric() || c == '-')
                {
                    return Err("invalid scheme id".into());
                }
                request = Some(meta);
            }

            Some("file") => {
                if request.is_none() {
                    return Err("hold metadata must be sent before the file".into());
                }
                let filename = field
                    .content_disposition()
                    .and_then(|cd| cd.get_filename().map(|f| f.to_string()))
                    .unwrap_or_default();
                if !filename.ends_with(".csv") {
                    return Err("the file must end with .csv".into());
                }

                let mut bytes = Vec::new();
                while let Some(chunk) = field.next().await {
                    let chunk = chunk?;
                    md5_hasher.consume(&chunk);
                    bytes.extend_from_slice(&chunk);
                }
                file_bytes = Some(bytes);
            }

            _ => {}
        }
    }

    let request = request.ok_or("missing hold metadata")?;
    let bytes = file_bytes.ok_or("missing file")?;
    let body = String::from_utf8(bytes).map_err(|_| "CSV is not valid UTF-8")?;

    // Reject an unusable header before a job is even created.
    let header = body.lines().next().ok_or("CSV file is empty")?;
    validate::validate_header(header)?;

    let digest = format!("{:x}", md5_hasher.finalize());
    let artifact_name = format!(
        "bulk-holds/{}-{}-{}.csv",
        request.scheme_id, request.hold_category_id, digest
    );

    let job_id = start_job(
        state,
        OperationKind::BulkHold,
        || None,
        move || run_bulk_hold(storage, request, artifact_name, body),
    )
    .await?;
    Ok(job_id)
}

/// The background operation: validate every row, then persist the accepted
/// batch for the payment backend to pick up.
async fn run_bulk_hold(
    storage: Arc<dyn BlobStore>,
    request: BulkHoldRequest,
    artifact_name: String,
    body: String,
) -> Result<JobOutcome, String> {
    // The row scan is CPU-bound; keep it off the async runtime.
    let handle = tokio::task::spawn_blocking(move || {
        let accepted = validate::validate_rows(&body)?;
        Ok::<(String, usize), String>((body, accepted))
    });
    let (body, accepted) = handle
        .await
        .map_err(|e| format!("task join error: {}", e))??;

    storage
        .save(&artifact_name, body.into_bytes())
        .await
        .map_err(|e| {
            error!("failed to store bulk hold batch {}: {}", artifact_name, e);
            "bulk hold batch could not be stored".to_string()
        })?;

    info!(
        "accepted bulk hold batch of {} rows for scheme {} (category {})",
        accepted, request.scheme_id, request.hold_category_id
    );
    Ok(JobOutcome::Done)
}

#[cfg(test)]
mod tests {
    use std::collections::HashMap;
    use std::sync::Mutex;
    use std::time::Duration;

    use actix_web::{App, http::StatusCode, test};
    use async_trait::async_trait;
    use tokio::sync::mpsc;

    use common::jobs::{JobRecord, JobStatus};

    use crate::clients::storage::StorageError;
    use crate::job_controller::cache::MokaJobCache;
    use crate::job_controller::state::start_job_updater;
    use crate::job_controller::store::JobStore;

    use super::*;

    struct MemoryBlobStore {
        blobs: Mutex<HashMap<String, Vec<u8>>>,
    }

    impl MemoryBlobStore {
        fn new() -> Self {
            Self {
                blobs: Mutex::new(HashMap::new()),
            }
        }

        fn names(&self) -> Vec<String> {
            self.blobs.lock().unwrap().keys().cloned().collect()
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

    const BOUNDARY: &str = "----batch-boundary";

    fn multipart_body(json: &str, file: &str) -> Vec<u8> {
        format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"json\"\r\n\r\n\
             {json}\r\n\
             --{b}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"holds.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             {file}\r\n\
             --{b}--\r\n",
            b = BOUNDARY,
            json = json,
            file = file
        )
        .into_bytes()
    }

    macro_rules! build_app {
        ($state:expr, $storage:expr) => {
            test::init_service(
                App::new()
                    .app_data(web::Data::new($state.clone()))
                    .app_data(web::Data::from($storage as Arc<dyn BlobStore>))
                    .service(crate::services::holds::configure_routes()),
            )
            .await
        };
    }

    fn upload_request(body: Vec<u8>) -> test::TestRequest {
        test::TestRequest::post()
            .uri("/api/holds/bulk")
            .insert_header((
                "Content-Type",
                format!("multipart/form-data; boundary={}", BOUNDARY),
            ))
            .set_payload(body)
    }

    #[actix_web::test]
    async fn valid_batch_completes_and_is_persisted() {
        let state = test_state();
        let storage = Arc::new(MemoryBlobStore::new());
        let app = build_app!(state, storage.clone());

        let body = multipart_body(
            r#"{"schemeId":"SFI","holdCategoryId":3}"#,
            "frn\r\n1234567890\r\n9876543210\r\n",
        );
        let response: JobStartedResponse =
            test::call_and_read_body_json(&app, upload_request(body).to_request()).await;

        let terminal = wait_for_terminal(&state, &response.job_id).await;
        assert_eq!(terminal.status, JobStatus::Completed);

        let names = storage.names();
        assert_eq!(names.len(), 1);
        assert!(names[0].starts_with("bulk-holds/SFI-3-"));
        assert!(names[0].ends_with(".csv"));
    }

    #[actix_web::test]
    async fn invalid_row_fails_the_job_with_its_line() {
        let state = test_state();
        let storage = Arc::new(MemoryBlobStore::new());
        let app = build_app!(state, storage.clone());

        let body = multipart_body(
            r#"{"schemeId":"SFI","holdCategoryId":3}"#,
            "frn\r\n1234567890\r\n12345\r\n",
        );
        let response: JobStartedResponse =
            test::call_and_read_body_json(&app, upload_request(body).to_request()).await;

        let terminal = wait_for_terminal(&state, &response.job_id).await;
        assert_eq!(
            terminal.status,
            JobStatus::Failed("invalid FRN at line 3".to_string())
        );
        // Nothing is persisted for a rejected batch.
        assert!(storage.names().is_empty());
    }

    #[actix_web::test]
    async fn wrong_header_is_rejected_before_any_job_exists() {
        let state = test_state();
        let storage = Arc::new(MemoryBlobStore::new());
        let app = build_app!(state, storage);

        let body = multipart_body(
            r#"{"schemeId":"SFI","holdCategoryId":3}"#,
            "sbi\r\n1234567890\r\n",
        );
        let response = test::call_service(&app, upload_request(body).to_request()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }

    #[actix_web::test]
    async fn metadata_must_precede_the_file() {
        let state = test_state();
        let storage = Arc::new(MemoryBlobStore::new());
        let app = build_app!(state, storage);

        let body = format!(
            "--{b}\r\n\
             Content-Disposition: form-data; name=\"file\"; filename=\"holds.csv\"\r\n\
             Content-Type: text/csv\r\n\r\n\
             frn\r\n1234567890\r\n\r\n\
             --{b}--\r\n",
            b = BOUNDARY
        )
        .into_bytes();
        let response = test::call_service(&app, upload_request(body).to_request()).await;
        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    }
}
