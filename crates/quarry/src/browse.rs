//! Scraping of the browse-edgar web interface.
//!
//! Company metadata and per-filing document tables are only served as HTML;
//! this module is the thin DOM-traversal layer over those pages. It is
//! deliberately dumb: select elements, read their text, no interpretation.

use crate::error::{QuarryError, Result};
use scraper::{ElementRef, Html, Selector};
use serde::Serialize;
use std::collections::HashMap;
use std::time::Duration;

/// Web host serving browse-edgar and archived filing pages.
pub const SEC_URL: &str = "https://www.sec.gov";

const BROWSE_URL: &str = "https://www.sec.gov/cgi-bin/browse-edgar";

/// The SEC requires identifying contact information in the User-Agent.
const USER_AGENT: &str = "quarry/0.1 (quarry@quarrydata.dev)";

fn selector(css: &str) -> Result<Selector> {
    Selector::parse(css).map_err(|e| QuarryError::Scrape(format!("bad selector `{css}`: {e}")))
}

fn element_text(element: ElementRef<'_>) -> String {
    element.text().collect::<String>().trim().to_string()
}

/// Company name and CIK as resolved by the getcompany search.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CompanyMatch {
    /// Registrant name.
    pub name: String,
    /// Central Index Key.
    pub cik: String,
}

/// One row of the filings table on a getcompany page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilingPointer {
    /// Form type.
    pub form_type: String,
    /// Href of the filing's document index page.
    pub documents_path: String,
    /// Description column.
    pub description: String,
    /// Date filed.
    pub date_filed: String,
}

/// One row of a document table on a filing's index page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DocumentRow {
    /// Document description.
    pub description: String,
    /// Href of the document.
    pub href: String,
    /// Document type column.
    pub doc_type: String,
}

/// Parsed filing index page.
#[derive(Debug, Clone, Default, Serialize)]
pub struct FilingDetails {
    /// Labelled header fields (filing date, accession number, ...).
    pub fields: HashMap<String, String>,
    /// Rows of the "Document Format Files" table.
    pub doc_files: Vec<DocumentRow>,
    /// Rows of the "Data Files" table.
    pub data_files: Vec<DocumentRow>,
    /// Link to the interactive-data viewer, when offered.
    pub interactive_url: Option<String>,
}

/// Blocking client for browse-edgar pages.
#[derive(Debug)]
pub struct BrowseClient {
    http: reqwest::blocking::Client,
}

impl BrowseClient {
    /// Client with the required User-Agent and a request timeout.
    pub fn new() -> Result<Self> {
        let http = reqwest::blocking::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(Duration::from_secs(30))
            .build()?;
        Ok(Self { http })
    }

    fn get_text(&self, url: &str) -> Result<String> {
        Ok(self.http.get(url).send()?.error_for_status()?.text()?)
    }

    /// Resolve a ticker or CIK to the registrant's name and CIK.
    pub fn company_search(&self, ticker: &str) -> Result<CompanyMatch> {
        let url = format!("{BROWSE_URL}?CIK={ticker}&owner=exclude&action=getcompany&Find=Search");
        let html = Html::parse_document(&self.get_text(&url)?);
        parse_company_match(&html)
    }

    /// Filing rows for a company, newest first, up to `count` entries.
    pub fn filing_pointers(
        &self,
        cik: &str,
        filing_type: &str,
        count: usize,
    ) -> Result<Vec<FilingPointer>> {
        let url = format!(
            "{BROWSE_URL}?action=getcompany&CIK={cik}&type={filing_type}&dateb=&owner=exclude&count={count}"
        );
        let html = Html::parse_document(&self.get_text(&url)?);
        parse_filing_pointers(&html)
    }

    /// Document tables and header fields of one filing's index page.
    ///
    /// `location` is the site-relative href taken from a
    /// [`FilingPointer::documents_path`].
    pub fn filing_details(&self, location: &str) -> Result<FilingDetails> {
        let url = format!("{SEC_URL}{location}");
        let html = Html::parse_document(&self.get_text(&url)?);
        parse_filing_details(&html)
    }
}

fn parse_company_match(html: &Html) -> Result<CompanyMatch> {
    let span = html
        .select(&selector("span.companyName")?)
        .next()
        .ok_or_else(|| QuarryError::Scrape("no companyName element on search page".into()))?;
    // The span holds the name as bare text, followed by the "CIK#: ..." link.
    let name = span.text().next().unwrap_or("").trim().to_string();
    let link = span
        .select(&selector("a")?)
        .next()
        .ok_or_else(|| QuarryError::Scrape("companyName element carries no CIK link".into()))?;
    let cik = element_text(link)
        .split_whitespace()
        .next()
        .unwrap_or("")
        .to_string();
    if name.is_empty() || cik.is_empty() {
        return Err(QuarryError::Scrape(
            "could not read company name and CIK".into(),
        ));
    }
    Ok(CompanyMatch { name, cik })
}

fn parse_filing_pointers(html: &Html) -> Result<Vec<FilingPointer>> {
    let table = html
        .select(&selector("table.tableFile2")?)
        .next()
        .ok_or_else(|| QuarryError::Scrape("no filings table on getcompany page".into()))?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;
    let link_sel = selector("a")?;

    let mut pointers = Vec::new();
    // First row is the column header.
    for row in table.select(&row_sel).skip(1) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
        if cells.len() < 4 {
            continue;
        }
        let documents_path = cells[1]
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or("")
            .to_string();
        pointers.push(FilingPointer {
            form_type: element_text(cells[0]),
            documents_path,
            description: element_text(cells[2]),
            date_filed: element_text(cells[3]),
        });
    }
    Ok(pointers)
}

fn parse_filing_details(html: &Html) -> Result<FilingDetails> {
    let mut details = FilingDetails::default();

    let link_sel = selector("a")?;
    details.interactive_url = html
        .select(&selector("div#seriesDiv")?)
        .next()
        .and_then(|div| div.select(&link_sel).next())
        .and_then(|a| a.value().attr("href").map(str::to_string));

    // Label/value pairs come interleaved: an `infoHead` div names the field,
    // the following div carries the value.
    let group_sel = selector("div.formGrouping")?;
    let div_sel = selector("div")?;
    let mut head = String::new();
    for group in html.select(&group_sel) {
        for row in group.select(&div_sel) {
            if row.value().classes().any(|class| class == "infoHead") {
                head = element_text(row);
            } else if !head.is_empty() {
                details.fields.insert(head.clone(), element_text(row));
            }
        }
    }

    details.doc_files = parse_document_table(html, "Document Format Files")?;
    details.data_files = parse_document_table(html, "Data Files")?;
    Ok(details)
}

fn parse_document_table(html: &Html, summary: &str) -> Result<Vec<DocumentRow>> {
    let table_sel = selector(&format!(r#"table[summary="{summary}"]"#))?;
    let row_sel = selector("tr")?;
    let cell_sel = selector("td")?;
    let link_sel = selector("a")?;

    let mut rows = Vec::new();
    let Some(table) = html.select(&table_sel).next() else {
        return Ok(rows);
    };
    for row in table.select(&row_sel) {
        let cells: Vec<ElementRef<'_>> = row.select(&cell_sel).collect();
        if cells.len() < 4 {
            continue;
        }
        let href = cells[2]
            .select(&link_sel)
            .next()
            .and_then(|a| a.value().attr("href"))
            .unwrap_or("")
            .to_string();
        rows.push(DocumentRow {
            description: element_text(cells[1]),
            href,
            doc_type: element_text(cells[3]),
        });
    }
    Ok(rows)
}
