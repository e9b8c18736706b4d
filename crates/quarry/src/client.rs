//! Client for the quarterly full-index archives.
//!
//! [`ArchiveClient`] resolves index archives on the EDGAR FTP host, routes
//! every retrieval through an optional download cache, and exposes the
//! decoded listings as lazy per-quarter text blocks or as filtered
//! filing-record streams.

use crate::cache::{ResourceCache, ResourceKey};
use crate::error::{QuarryError, Result};
use crate::ftp;
use crate::index::{CompanyRecord, IndexKind, XbrlRecord, company, xbrl};
use crate::quarters::{QuarterKey, QuarterRange, quarter_range};
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Client for quarterly full-index archives.
#[derive(Debug)]
pub struct ArchiveClient {
    server: String,
    cache: Option<ResourceCache>,
    refresh: bool,
}

impl ArchiveClient {
    /// Client against the default host, with caching disabled.
    pub fn new() -> Self {
        Self {
            server: ftp::DEFAULT_SERVER.to_string(),
            cache: None,
            refresh: false,
        }
    }

    /// Use a different archive host.
    pub fn with_server(mut self, server: impl Into<String>) -> Self {
        self.server = server.into();
        self
    }

    /// Route retrievals through `cache`.
    pub fn with_cache(mut self, cache: ResourceCache) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Bypass cached entries and overwrite them with fresh fetches.
    pub fn with_refresh(mut self, refresh: bool) -> Self {
        self.refresh = refresh;
        self
    }

    /// Remote directory holding one quarter's index archives.
    pub fn quarter_path(quarter: QuarterKey) -> String {
        format!("edgar/full-index/{}/QTR{}", quarter.year, quarter.quarter)
    }

    /// Fetch one resource, through the cache when one is configured.
    pub fn fetch_resource(&self, path: &str, filename: &str) -> Result<Vec<u8>> {
        match &self.cache {
            Some(cache) => {
                let key = ResourceKey::new(&self.server, path, filename);
                cache.get_or_fetch(&key, self.refresh, || {
                    ftp::retrieve(&self.server, path, filename)
                })
            }
            None => ftp::retrieve(&self.server, path, filename),
        }
    }

    /// The decoded `.idx` listing for one quarter.
    pub fn load_quarter(&self, quarter: QuarterKey, kind: IndexKind) -> Result<String> {
        let path = Self::quarter_path(quarter);
        let archive = format!("{}.zip", kind.archive_name());
        let bytes = self.fetch_resource(&path, &archive)?;
        read_index_entry(&bytes, quarter, kind)
    }

    /// Lazy stream of decoded index listings, one per quarter from `start`
    /// through `end` inclusive, in chronological order.
    ///
    /// The stream halts after yielding its first error, so an archive
    /// missing mid-range ends the run rather than being skipped.
    pub fn load_index(&self, start: QuarterKey, end: QuarterKey, kind: IndexKind) -> IndexStream<'_> {
        IndexStream {
            client: self,
            kind,
            quarters: quarter_range(start, end),
            failed: false,
        }
    }

    /// Company-format filing records between `start` and `end` whose form
    /// type contains `filing_type` and whose raw line matches `line_filter`
    /// case-insensitively, when one is given.
    pub fn company_filings<'a>(
        &'a self,
        start: QuarterKey,
        end: QuarterKey,
        filing_type: &'a str,
        line_filter: Option<&'a str>,
    ) -> impl Iterator<Item = Result<CompanyRecord>> + 'a {
        self.load_index(start, end, IndexKind::Company)
            .flat_map(move |block| match block {
                Ok(text) => company::parse_index(&text, filing_type, line_filter)
                    .map(Ok)
                    .collect::<Vec<_>>(),
                Err(err) => vec![Err(err)],
            })
    }

    /// Xbrl-format filing records between `start` and `end` whose form type
    /// contains `filing_type` and whose company name matches
    /// `company_pattern` case-insensitively, when one is given.
    pub fn xbrl_filings<'a>(
        &'a self,
        start: QuarterKey,
        end: QuarterKey,
        filing_type: &'a str,
        company_pattern: Option<&'a str>,
    ) -> impl Iterator<Item = Result<XbrlRecord>> + 'a {
        self.load_index(start, end, IndexKind::Xbrl)
            .flat_map(move |block| match block {
                Ok(text) => xbrl::parse_index(&text, filing_type, company_pattern)
                    .map(Ok)
                    .collect::<Vec<_>>(),
                Err(err) => vec![Err(err)],
            })
    }

    /// Raw SGML text of the submission at `path`/`filename`, retrieved
    /// through the same cache-or-fetch path and decoded lossily.
    pub fn fetch_submission_at(&self, path: &str, filename: &str) -> Result<String> {
        let bytes = self.fetch_resource(path, filename)?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    /// Raw SGML text of the submission referenced by an xbrl index record.
    pub fn fetch_submission(&self, record: &XbrlRecord) -> Result<String> {
        self.fetch_submission_at(&record.path, &record.filename)
    }
}

impl Default for ArchiveClient {
    fn default() -> Self {
        Self::new()
    }
}

fn read_index_entry(bytes: &[u8], quarter: QuarterKey, kind: IndexKind) -> Result<String> {
    let unavailable = |reason: String| QuarryError::IndexUnavailable { quarter, reason };
    let mut archive =
        ZipArchive::new(Cursor::new(bytes)).map_err(|e| unavailable(e.to_string()))?;
    let mut entry = archive
        .by_name(&format!("{}.idx", kind.archive_name()))
        .map_err(|e| unavailable(e.to_string()))?;
    let mut raw = Vec::with_capacity(entry.size() as usize);
    entry
        .read_to_end(&mut raw)
        .map_err(|e| unavailable(e.to_string()))?;
    // Replacement decoding: stray bytes in a listing must not be fatal.
    Ok(String::from_utf8_lossy(&raw).into_owned())
}

/// Lazy, halting stream of per-quarter index listings.
#[derive(Debug)]
pub struct IndexStream<'a> {
    client: &'a ArchiveClient,
    kind: IndexKind,
    quarters: QuarterRange,
    failed: bool,
}

impl Iterator for IndexStream<'_> {
    type Item = Result<String>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.failed {
            return None;
        }
        let quarter = self.quarters.next()?;
        match self.client.load_quarter(quarter, self.kind) {
            Ok(text) => Some(Ok(text)),
            Err(err) => {
                self.failed = true;
                Some(Err(err))
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use zip::ZipWriter;
    use zip::write::SimpleFileOptions;

    fn index_archive(entry: &str, listing: &str) -> Vec<u8> {
        let mut writer = ZipWriter::new(Cursor::new(Vec::new()));
        writer
            .start_file(entry, SimpleFileOptions::default())
            .unwrap();
        writer.write_all(listing.as_bytes()).unwrap();
        writer.finish().unwrap().into_inner()
    }

    fn seed(cache: &ResourceCache, quarter: QuarterKey, kind: IndexKind, listing: &str) {
        let key = ResourceKey::new(
            ftp::DEFAULT_SERVER,
            ArchiveClient::quarter_path(quarter),
            format!("{}.zip", kind.archive_name()),
        );
        let entry = format!("{}.idx", kind.archive_name());
        cache.store(&key, &index_archive(&entry, listing)).unwrap();
    }

    #[test]
    fn quarter_path_layout() {
        assert_eq!(
            ArchiveClient::quarter_path(QuarterKey::new(2016, 3)),
            "edgar/full-index/2016/QTR3"
        );
    }

    #[test]
    fn loads_listing_from_seeded_cache() {
        let cache = ResourceCache::in_memory().unwrap();
        let quarter = QuarterKey::new(2015, 1);
        seed(&cache, quarter, IndexKind::Company, "one line\n");
        let client = ArchiveClient::new().with_cache(cache);
        let text = client.load_quarter(quarter, IndexKind::Company).unwrap();
        assert_eq!(text, "one line\n");
    }

    #[test]
    fn missing_listing_entry_is_index_unavailable() {
        let cache = ResourceCache::in_memory().unwrap();
        let quarter = QuarterKey::new(2015, 1);
        let key = ResourceKey::new(
            ftp::DEFAULT_SERVER,
            ArchiveClient::quarter_path(quarter),
            "company.zip",
        );
        // A valid zip whose only entry has the wrong name.
        cache
            .store(&key, &index_archive("unrelated.idx", "text"))
            .unwrap();
        let client = ArchiveClient::new().with_cache(cache);
        let err = client
            .load_quarter(quarter, IndexKind::Company)
            .unwrap_err();
        assert!(
            matches!(&err, QuarryError::IndexUnavailable { quarter: q, .. } if *q == quarter)
        );
    }

    #[test]
    fn stream_halts_after_first_unavailable_quarter() {
        let cache = ResourceCache::in_memory().unwrap();
        let q1 = QuarterKey::new(2015, 1);
        let q2 = QuarterKey::new(2015, 2);
        seed(&cache, q1, IndexKind::Company, "first quarter\n");
        let bad_key = ResourceKey::new(
            ftp::DEFAULT_SERVER,
            ArchiveClient::quarter_path(q2),
            "company.zip",
        );
        cache.store(&bad_key, b"not a zip archive").unwrap();

        let client = ArchiveClient::new().with_cache(cache);
        let blocks: Vec<_> = client
            .load_index(q1, QuarterKey::new(2015, 4), IndexKind::Company)
            .collect();

        // Q3 and Q4 are never visited: two items, then the stream ends.
        assert_eq!(blocks.len(), 2);
        assert!(blocks[0].is_ok());
        assert!(
            matches!(&blocks[1], Err(QuarryError::IndexUnavailable { quarter, .. }) if *quarter == q2)
        );
    }
}
