use serde::{Deserialize, Serialize};

use crate::model::report::{ReportKind, ReportParams};

/// Request payload for starting a report job.
/// Names the report and carries its filter parameters.
#[derive(Clone, Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StartReportRequest {
    pub report: ReportKind,
    #[serde(flatten)]
    pub params: ReportParams,
}

/// Response to a successfully scheduled job: the id to poll with.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct JobStartedResponse {
    pub job_id: String,
}
