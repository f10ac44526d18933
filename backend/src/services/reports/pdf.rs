use common::model::report::ReportKind;
use genpdf::Document;
use genpdf::elements::{Break, Paragraph};
use genpdf::style::{Style, StyledString};
use serde_json::Value;

use super::catalogue;
use super::csv::cell;

/// Renders a PDF report: a bold title followed by one line per artifact row.
pub fn render_pdf(kind: ReportKind, rows: &[Value]) -> Result<Vec<u8>, String> {
    let title = document_title(kind);
    let mut doc = configure_document(&title)?;

    doc.push(Paragraph::new(StyledString::new(
        title.clone(),
        Style::new().bold(),
    )));
    doc.push(Break::new(1));

    if rows.is_empty() {
        doc.push(Paragraph::new("No entries for the selected filters."));
    }
    for row in rows {
        doc.push(Paragraph::new(row_line(kind, row)));
    }

    let mut out = Vec::new();
    doc.render(&mut out)
        .map_err(|e| format!("PDF rendering failed: {}", e))?;
    Ok(out)
}

fn document_title(kind: ReportKind) -> String {
    let mut title = kind.slug().replace('-', " ");
    if let Some(first) = title.get_mut(0..1) {
        first.make_ascii_uppercase();
    }
    title
}

fn row_line(kind: ReportKind, row: &Value) -> String {
    catalogue::columns(kind)
        .iter()
        .map(|column| {
            let value = cell(row, column);
            if value.is_empty() {
                format!("{}: -", column)
            } else {
                format!("{}: {}", column, value)
            }
        })
        .collect::<Vec<_>>()
        .join("   ")
}

/// Try Arial first if the deployment added it under ./fonts, otherwise fall
/// back to LiberationSans in the same directory.
fn load_font() -> Result<genpdf::fonts::FontFamily<genpdf::fonts::FontData>, String> {
    if let Ok(family) = genpdf::fonts::from_files("./fonts", "Arial", None) {
        return Ok(family);
    }
    genpdf::fonts::from_files("./fonts", "LiberationSans", None)
        .map_err(|e| format!("failed to load PDF fonts: {}", e))
}

fn configure_document(title: &str) -> Result<Document, String> {
    let font_family = load_font()?;
    let mut doc = Document::new(font_family);
    doc.set_title(title);
    doc.set_font_size(10);

    let mut decorator = genpdf::SimplePageDecorator::new();
    decorator.set_margins(10);
    doc.set_page_decorator(decorator);
    Ok(doc)
}
