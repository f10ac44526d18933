use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// The report catalogue. Every variant maps to one tracking-API dataset and
/// one generated download; all of them run through the same start/status/
/// download triple.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ReportKind {
    TransactionSummary,
    RequestStatuses,
    SuppressedRequests,
    ApArListing,
    HoldsSummary,
    ClosureSummary,
    RemittanceAdvice,
}

/// Output format of the generated download.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum OutputFormat {
    Csv,
    Pdf,
}

impl ReportKind {
    /// Stable identifier used in tracking-API paths and filenames.
    pub fn slug(&self) -> &'static str {
        match self {
            ReportKind::TransactionSummary => "transaction-summary",
            ReportKind::RequestStatuses => "request-statuses",
            ReportKind::SuppressedRequests => "suppressed-requests",
            ReportKind::ApArListing => "ap-ar-listing",
            ReportKind::HoldsSummary => "holds-summary",
            ReportKind::ClosureSummary => "closure-summary",
            ReportKind::RemittanceAdvice => "remittance-advice",
        }
    }

    pub fn output(&self) -> OutputFormat {
        match self {
            ReportKind::RemittanceAdvice => OutputFormat::Pdf,
            _ => OutputFormat::Csv,
        }
    }
}

/// Filter parameters accepted by every report. All optional; the start
/// handler validates whichever are present.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ReportParams {
    pub scheme_id: Option<String>,
    pub year: Option<u16>,
    pub frn: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
}
