use common::model::report::ReportKind;
use serde_json::Value;

use super::catalogue;

/// Serializes artifact rows as CSV with the report's column set. Missing
/// fields become empty cells rather than failing the whole report.
pub fn render_csv(kind: ReportKind, rows: &[Value]) -> Result<Vec<u8>, String> {
    let columns = catalogue::columns(kind);
    let mut writer = csv::Writer::from_writer(Vec::new());
    writer
        .write_record(columns)
        .map_err(|e| format!("failed to write CSV header: {}", e))?;

    for row in rows {
        let record: Vec<String> = columns.iter().map(|column| cell(row, column)).collect();
        writer
            .write_record(&record)
            .map_err(|e| format!("failed to write CSV row: {}", e))?;
    }

    writer
        .into_inner()
        .map_err(|e| format!("failed to flush CSV output: {}", e))
}

/// One cell value. Strings come through verbatim; numbers and booleans are
/// rendered; null and absent fields are empty.
pub(crate) fn cell(row: &Value, column: &str) -> String {
    match row.get(column) {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
