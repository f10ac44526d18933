use rayon::prelude::*;
use regex::Regex;

/// The batch header must be a single `frn` column.
pub(crate) fn validate_header(header: &str) -> Result<(), String> {
    let cell = normalize_cell(header);
    if cell.eq_ignore_ascii_case("frn") {
        Ok(())
    } else {
        Err(format!(
            "unexpected CSV header '{}', expected 'frn'",
            cell
        ))
    }
}

fn normalize_cell(cell: &str) -> String {
    let s = cell.trim();
    let s = s
        .strip_prefix('"')
        .and_then(|s| s.strip_suffix('"'))
        .unwrap_or(s);
    s.trim().to_string()
}

/// Validates a whole uploaded batch and returns the number of accepted rows.
/// Blank lines are ignored; every remaining row must be a 10-digit FRN.
pub(crate) fn validate_rows(body: &str) -> Result<usize, String> {
    let mut lines = body.lines();
    let header = lines.next().ok_or_else(|| "CSV file is empty".to_string())?;
    validate_header(header)?;

    let rows: Vec<(usize, String)> = lines
        .enumerate()
        .map(|(idx, line)| (idx, line.to_string()))
        .filter(|(_, line)| !line.trim().is_empty())
        .collect();
    if rows.is_empty() {
        return Err("CSV file has no data rows".to_string());
    }

    let frn_re = Regex::new(r"^\d{10}$").map_err(|e| format!("regex error: {}", e))?;
    if let Some(line) = find_invalid_row(&rows, &frn_re) {
        return Err(format!("invalid FRN at line {}", line));
    }
    Ok(rows.len())
}

fn find_invalid_row(rows: &[(usize, String)], frn_re: &Regex) -> Option<usize> {
    rows.par_iter().find_map_any(|(idx, line)| {
        let cell = normalize_cell(line);
        if frn_re.is_match(&cell) {
            None
        } else {
            Some(idx + 2) // +2: header line + 1-based numbering
        }
    })
}
