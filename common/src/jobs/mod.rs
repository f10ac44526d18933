use serde::{Deserialize, Serialize};

use crate::model::report::ReportKind;

/// Lifecycle status of a background job.
///
/// A job moves from `Pending` through `Processing` to exactly one terminal
/// status. `NotFound` is never stored; the status endpoint synthesizes it
/// when no record exists for a polled id.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum JobStatus {
    Pending,
    Processing,
    /// The artifact has been located and is ready to stream.
    Ready,
    /// The job finished with nothing left to stream.
    Completed,
    Failed(String),
    NotFound,
}

impl JobStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            JobStatus::Pending => "pending",
            JobStatus::Processing => "processing",
            JobStatus::Ready => "ready",
            JobStatus::Completed => "completed",
            JobStatus::Failed(_) => "failed",
            JobStatus::NotFound => "not-found",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            JobStatus::Ready | JobStatus::Completed | JobStatus::Failed(_)
        )
    }

    pub fn is_success(&self) -> bool {
        matches!(self, JobStatus::Ready | JobStatus::Completed)
    }

    pub fn message(&self) -> Option<&str> {
        match self {
            JobStatus::Failed(msg) => Some(msg),
            _ => None,
        }
    }
}

/// Which operation produced a job. Picks the mapper at download time.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum OperationKind {
    Report(ReportKind),
    BulkHold,
}

impl OperationKind {
    /// Expected extension of the artifact descriptor the operation returns,
    /// or `None` for operations that produce no downloadable artifact.
    pub fn artifact_extension(&self) -> Option<&'static str> {
        match self {
            OperationKind::Report(_) => Some(".json"),
            OperationKind::BulkHold => None,
        }
    }
}

/// The single persistent entity of the job protocol, stored per job id in
/// the TTL cache. The filenames are populated only on the success path.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobRecord {
    pub status: JobStatus,
    pub kind: OperationKind,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub returned_filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_filename: Option<String>,
}

impl JobRecord {
    pub fn pending(kind: OperationKind) -> Self {
        Self {
            status: JobStatus::Pending,
            kind,
            returned_filename: None,
            report_filename: None,
        }
    }

    pub fn processing(kind: OperationKind) -> Self {
        Self {
            status: JobStatus::Processing,
            kind,
            returned_filename: None,
            report_filename: None,
        }
    }

    pub fn ready(
        kind: OperationKind,
        returned_filename: String,
        report_filename: Option<String>,
    ) -> Self {
        Self {
            status: JobStatus::Ready,
            kind,
            returned_filename: Some(returned_filename),
            report_filename,
        }
    }

    pub fn completed(kind: OperationKind) -> Self {
        Self {
            status: JobStatus::Completed,
            kind,
            returned_filename: None,
            report_filename: None,
        }
    }

    pub fn failed(kind: OperationKind, message: String) -> Self {
        Self {
            status: JobStatus::Failed(message),
            kind,
            returned_filename: None,
            report_filename: None,
        }
    }
}

/// Body of the status endpoint: `{"status": "...", "message": "..."}`.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StatusResponse {
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl StatusResponse {
    pub fn not_found() -> Self {
        Self {
            status: JobStatus::NotFound.as_str().to_string(),
            message: None,
        }
    }

    /// Reported when the status lookup itself fails. A polling client cannot
    /// distinguish this from a genuine job failure; that is a documented
    /// limitation of the protocol.
    pub fn lookup_failed() -> Self {
        Self {
            status: "failed".to_string(),
            message: None,
        }
    }
}

impl From<&JobStatus> for StatusResponse {
    fn from(status: &JobStatus) -> Self {
        Self {
            status: status.as_str().to_string(),
            message: status.message().map(|m| m.to_string()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::report::ReportKind;

    #[test]
    fn terminal_statuses() {
        assert!(!JobStatus::Pending.is_terminal());
        assert!(!JobStatus::Processing.is_terminal());
        assert!(JobStatus::Ready.is_terminal());
        assert!(JobStatus::Completed.is_terminal());
        assert!(JobStatus::Failed("boom".to_string()).is_terminal());
    }

    #[test]
    fn success_statuses() {
        assert!(JobStatus::Ready.is_success());
        assert!(JobStatus::Completed.is_success());
        assert!(!JobStatus::Failed("boom".to_string()).is_success());
        assert!(!JobStatus::Pending.is_success());
    }

    #[test]
    fn status_response_carries_failure_message() {
        let status = JobStatus::Failed("upstream timeout".to_string());
        let response = StatusResponse::from(&status);
        assert_eq!(response.status, "failed");
        assert_eq!(response.message.as_deref(), Some("upstream timeout"));
    }

    #[test]
    fn status_response_omits_message_when_absent() {
        let response = StatusResponse::from(&JobStatus::Ready);
        let json = serde_json::to_string(&response).unwrap();
        assert_eq!(json, r#"{"status":"ready"}"#);
    }

    #[test]
    fn artifact_extension_per_kind() {
        let report = OperationKind::Report(ReportKind::TransactionSummary);
        assert_eq!(report.artifact_extension(), Some(".json"));
        assert_eq!(OperationKind::BulkHold.artifact_extension(), None);
    }

    #[test]
    fn pending_record_has_no_filenames() {
        let record = JobRecord::pending(OperationKind::BulkHold);
        assert_eq!(record.status, JobStatus::Pending);
        assert!(record.returned_filename.is_none());
        assert!(record.report_filename.is_none());
    }
}
