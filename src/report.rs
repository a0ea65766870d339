//! # Limits Report
//!
//! Renders the rate-limit table as plain text or a markdown table, with
//! optional model or category filtering.

use crate::error::LimitsError;
use crate::limits::RateLimitTable;
use crate::models::ModelQuota;
use crate::utils::format_count;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportFormat {
    Text,
    Markdown,
}

/// Render quota rows for the requested selection.
///
/// A model filter takes precedence over a category filter; unknown names in
/// either surface as [`LimitsError`].
pub fn render_report(
    table: &RateLimitTable,
    format: ReportFormat,
    model: Option<&str>,
    category: Option<&str>,
) -> Result<String, LimitsError> {
    let rows: Vec<&ModelQuota> = match (model, category) {
        (Some(m), _) => vec![table.lookup(m)?],
        (None, Some(c)) => table.by_category(c)?,
        (None, None) => table.iter().collect(),
    };
    Ok(match format {
        ReportFormat::Text => render_text(&rows),
        ReportFormat::Markdown => render_markdown(&rows),
    })
}

/// One category name per line, in table order
pub fn render_category_list(table: &RateLimitTable) -> String {
    let mut out = String::new();
    for name in table.categories() {
        out.push_str(name);
        out.push('\n');
    }
    out
}

fn render_text(rows: &[&ModelQuota]) -> String {
    let header = ["MODEL", "CATEGORY", "RPM", "TPM", "RPD"];
    let cells: Vec<[String; 5]> = rows.iter().map(|q| row_cells(q)).collect();

    let mut widths = header.map(str::len);
    for row in &cells {
        for (w, cell) in widths.iter_mut().zip(row.iter()) {
            *w = (*w).max(cell.len());
        }
    }

    let mut out = String::new();
    let emit = |out: &mut String, cols: [&str; 5]| {
        for (i, col) in cols.iter().enumerate() {
            if i > 0 {
                out.push_str("  ");
            }
            let w = widths[i];
            out.push_str(&format!("{col:<w$}"));
        }
        while out.ends_with(' ') {
            out.pop();
        }
        out.push('\n');
    };

    emit(&mut out, header);
    for row in &cells {
        emit(
            &mut out,
            [
                row[0].as_str(),
                row[1].as_str(),
                row[2].as_str(),
                row[3].as_str(),
                row[4].as_str(),
            ],
        );
    }
    out
}

fn render_markdown(rows: &[&ModelQuota]) -> String {
    let mut out = String::new();
    out.push_str("| Model | Category | RPM | TPM | RPD |\n");
    out.push_str("|-------|----------|----:|----:|----:|\n");
    for q in rows {
        let [model, category, rpm, tpm, rpd] = row_cells(q);
        out.push_str(&format!(
            "| {model} | {category} | {rpm} | {tpm} | {rpd} |\n"
        ));
    }
    out
}

fn row_cells(q: &ModelQuota) -> [String; 5] {
    [
        q.model.clone(),
        q.category.as_str().to_string(),
        q.requests_per_minute.to_string(),
        format_count(q.tokens_per_minute),
        q.requests_per_day.to_string(),
    ]
}
