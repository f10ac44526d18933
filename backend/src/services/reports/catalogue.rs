//! The report catalogue: for each `ReportKind`, the tracking-API path, the
//! user-facing download filename and the generated column set. Everything a
//! report flow varies in lives here; the start/status/download handlers are
//! shared by all of them.

use common::model::report::{OutputFormat, ReportKind, ReportParams};
use regex::Regex;

/// Tracking-API path for a report, with the request filters as a query
/// string. Parameters have been validated before this is called, so plain
/// string assembly is safe.
pub fn tracking_path(kind: ReportKind, params: &ReportParams) -> String {
    let mut pairs: Vec<(&str, String)> = Vec::new();
    if let Some(scheme_id) = &params.scheme_id {
        pairs.push(("schemeId", scheme_id.clone()));
    }
    if let Some(year) = params.year {
        pairs.push(("year", year.to_string()));
    }
    if let Some(frn) = &params.frn {
        pairs.push(("frn", frn.clone()));
    }
    if let Some(date) = params.start_date {
        pairs.push(("startDate", date.format("%Y-%m-%d").to_string()));
    }
    if let Some(date) = params.end_date {
        pairs.push(("endDate", date.format("%Y-%m-%d").to_string()));
    }

    let mut path = format!("/{}", kind.slug());
    for (i, (key, value)) in pairs.iter().enumerate() {
        path.push(if i == 0 { '?' } else { '&' });
        path.push_str(key);
        path.push('=');
        path.push_str(value);
    }
    path
}

/// Final filename presented on download, stamped with whichever filters were
/// supplied: `transaction-summary-SFI-2024.csv`.
pub fn report_filename(kind: ReportKind, params: &ReportParams) -> String {
    let mut stem = kind.slug().to_string();
    if let Some(scheme_id) = &params.scheme_id {
        stem.push('-');
        stem.push_str(scheme_id);
    }
    if let Some(year) = params.year {
        stem.push('-');
        stem.push_str(&year.to_string());
    }
    if let Some(frn) = &params.frn {
        stem.push('-');
        stem.push_str(frn);
    }
    let extension = match kind.output() {
        OutputFormat::Csv => "csv",
        OutputFormat::Pdf => "pdf",
    };
    format!("{}.{}", stem, extension)
}

/// Column set of the generated report, in output order. Keys match the
/// camelCase fields of the tracking-API artifact rows.
pub fn columns(kind: ReportKind) -> &'static [&'static str] {
    match kind {
        ReportKind::TransactionSummary => &[
            "frn",
            "schemeId",
            "marketingYear",
            "invoiceNumber",
            "paymentRequestNumber",
            "value",
            "status",
            "lastUpdated",
        ],
        ReportKind::RequestStatuses => &[
            "frn",
            "schemeId",
            "invoiceNumber",
            "paymentRequestNumber",
            "status",
            "lastUpdated",
        ],
        ReportKind::SuppressedRequests => &[
            "frn",
            "schemeId",
            "invoiceNumber",
            "value",
            "suppressedValue",
            "suppressedDate",
        ],
        ReportKind::ApArListing => &[
            "frn",
            "schemeId",
            "ledger",
            "invoiceNumber",
            "reference",
            "value",
            "dueDate",
        ],
        ReportKind::HoldsSummary => &[
            "frn",
            "schemeId",
            "holdCategory",
            "dateAdded",
            "addedBy",
        ],
        ReportKind::ClosureSummary => &["frn", "schemeId", "agreementNumber", "closureDate"],
        ReportKind::RemittanceAdvice => &["frn", "invoiceNumber", "reference", "value", "settled"],
    }
}

/// Validates user-supplied filters before a job is created. Filters are also
/// what ends up in the tracking query string and the download filename, so
/// nothing unvalidated passes through.
pub fn validate_params(params: &ReportParams) -> Result<(), String> {
    if let Some(scheme_id) = &params.scheme_id {
        if scheme_id.is_empty()
            || !scheme_id
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-')
        {
            return Err("scheme id must be alphanumeric".to_string());
        }
    }
    if let Some(year) = params.year {
        if !(1993..=2099).contains(&year) {
            return Err(format!("year {} is out of range", year));
        }
    }
    if let Some(frn) = &params.frn {
        let frn_re = Regex::new(r"^\d{10}$").map_err(|e| format!("regex error: {}", e))?;
        if !frn_re.is_match(frn) {
            return Err("FRN must be a 10-digit number".to_string());
        }
    }
    if let (Some(start), Some(end)) = (params.start_date, params.end_date) {
        if start > end {
            return Err("start date is after end date".to_string());
        }
    }
    Ok(())
}
