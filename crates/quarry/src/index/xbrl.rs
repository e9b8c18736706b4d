//! Parser for the pipe-delimited `xbrl.idx` listing.

use serde::Serialize;

/// Dashed line introducing the data section of an xbrl listing.
const DATA_SEPARATOR: &str = "--------------------";

/// One filing row from an xbrl-format index listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct XbrlRecord {
    /// Central Index Key of the filer.
    pub cik: String,
    /// Company name as listed.
    pub company: String,
    /// Form type, e.g. `10-Q`.
    pub form_type: String,
    /// Date filed, `YYYY-MM-DD`.
    pub date_filed: String,
    /// Directory part of the listed file name.
    pub path: String,
    /// File part of the listed file name.
    pub filename: String,
}

impl XbrlRecord {
    /// Name of the XBRL zip bundle embedded in this record's submission.
    pub fn bundle_name(&self) -> String {
        crate::submission::bundle_name(&self.filename)
    }
}

/// Filing rows in `text` matching `filing_type` and `company_pattern`.
///
/// Everything up to and including the dashed separator line is header and is
/// never parsed as data, even when pipe-delimited. Data lines carry exactly
/// five `|`-delimited fields (`CIK|Company Name|Form Type|Date Filed|
/// Filename`); a row qualifies when `filing_type` occurs in the form-type
/// field and `company_pattern` — when given — occurs case-insensitively in
/// the company field. The file name is split on its last `/` into directory
/// and file parts.
pub fn parse_index<'a>(
    text: &'a str,
    filing_type: &'a str,
    company_pattern: Option<&'a str>,
) -> impl Iterator<Item = XbrlRecord> + 'a {
    let pattern = company_pattern.map(str::to_uppercase);
    let mut in_data = false;
    text.lines().filter_map(move |line| {
        if !in_data {
            if line.starts_with(DATA_SEPARATOR) {
                in_data = true;
            }
            return None;
        }
        let fields: Vec<&str> = line.split('|').collect();
        let [cik, company, form_type, date_filed, full_path] = fields[..] else {
            return None;
        };
        if !form_type.contains(filing_type) {
            return None;
        }
        if let Some(pattern) = &pattern
            && !company.to_uppercase().contains(pattern)
        {
            return None;
        }
        let (path, filename) = full_path.rsplit_once('/').unwrap_or(("", full_path));
        Some(XbrlRecord {
            cik: cik.to_string(),
            company: company.to_string(),
            form_type: form_type.to_string(),
            date_filed: date_filed.to_string(),
            path: path.to_string(),
            filename: filename.to_string(),
        })
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const LISTING: &str = "\
XBRL Index -- 2016 Q2
Fields: CIK|Company Name|Form Type|Date Filed|Filename
--------------------------------------------------------------------------------
0000123456|ACME CORP|10-Q|2016-05-10|edgar/data/123456/0000123456-16-000099.txt
0000654321|UMBRELLA HOLDINGS|8-K|2016-05-11|edgar/data/654321/0000654321-16-000004.txt
";

    #[test]
    fn data_line_decomposes_into_six_fields() {
        let records: Vec<_> = parse_index(LISTING, "10-Q", Some("acme")).collect();
        assert_eq!(records.len(), 1);
        let record = &records[0];
        assert_eq!(record.cik, "0000123456");
        assert_eq!(record.company, "ACME CORP");
        assert_eq!(record.form_type, "10-Q");
        assert_eq!(record.date_filed, "2016-05-10");
        assert_eq!(record.path, "edgar/data/123456");
        assert_eq!(record.filename, "0000123456-16-000099.txt");
    }

    #[test]
    fn company_pattern_is_case_insensitive() {
        assert_eq!(parse_index(LISTING, "10-Q", Some("AcMe")).count(), 1);
        assert_eq!(parse_index(LISTING, "10-Q", Some("umbrella")).count(), 0);
    }

    #[test]
    fn filing_type_filters_rows() {
        let forms: Vec<_> = parse_index(LISTING, "8-K", None)
            .map(|r| r.company)
            .collect();
        assert_eq!(forms, ["UMBRELLA HOLDINGS"]);
    }

    #[test]
    fn lines_before_separator_are_never_data() {
        let text = "\
0000999999|EARLY BIRD INC|10-Q|2016-01-01|edgar/data/999999/early.txt
--------------------------------------------------------------------------------
0000123456|ACME CORP|10-Q|2016-05-10|edgar/data/123456/0000123456-16-000099.txt
";
        let records: Vec<_> = parse_index(text, "10-Q", None).collect();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].cik, "0000123456");
    }

    #[test]
    fn wrong_field_count_is_skipped() {
        let text = "\
--------------------------------------------------------------------------------
0000123456|ACME CORP|10-Q|2016-05-10
0000123456|ACME CORP|10-Q|2016-05-10|edgar/a.txt|extra
";
        assert_eq!(parse_index(text, "10-Q", None).count(), 0);
    }

    #[test]
    fn bundle_name_replaces_extension() {
        let record = parse_index(LISTING, "10-Q", Some("acme")).next().unwrap();
        assert_eq!(record.bundle_name(), "0000123456-16-000099-xbrl.zip");
    }
}
