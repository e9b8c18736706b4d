//! Parser for the fixed-field `company.idx` listing.

use serde::Serialize;

/// One filing row from a company-format index listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyRecord {
    /// Form type, e.g. `10-K` or `10-K/A`.
    pub form_type: String,
    /// Filer name as listed (the leading fields of the line).
    pub company_name: String,
    /// Central Index Key of the filer.
    pub cik: String,
    /// Date filed, `YYYY-MM-DD`.
    pub date_filed: String,
    /// Relative path of the submission file under the archive root.
    pub file_path: String,
}

/// Filing rows in `text` whose form type contains `filing_type`.
///
/// A line qualifies when it splits into at least four whitespace-separated
/// fields, its fourth-from-last field contains `filing_type` (substring
/// match, so `10-K` also matches `10-K/A`), and `line_filter` — when given —
/// occurs case-insensitively anywhere in the raw line. Header and malformed
/// lines never qualify; they are skipped, not errors.
///
/// The trailing four fields are form type, CIK, date filed and file path;
/// everything before them is the company name.
pub fn parse_index<'a>(
    text: &'a str,
    filing_type: &'a str,
    line_filter: Option<&'a str>,
) -> impl Iterator<Item = CompanyRecord> + 'a {
    let filter = line_filter.map(str::to_uppercase);
    text.lines().filter_map(move |line| {
        if line.trim().is_empty() {
            return None;
        }
        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() < 4 {
            return None;
        }
        if !fields[fields.len() - 4].contains(filing_type) {
            return None;
        }
        if let Some(filter) = &filter
            && !line.to_uppercase().contains(filter)
        {
            return None;
        }
        Some(record_from_fields(&fields))
    })
}

fn record_from_fields(fields: &[&str]) -> CompanyRecord {
    let n = fields.len();
    CompanyRecord {
        form_type: fields[n - 4].to_string(),
        company_name: fields[..n - 4].join(" "),
        cik: fields[n - 3].to_string(),
        date_filed: fields[n - 2].to_string(),
        file_path: fields[n - 1].to_string(),
    }
}
