//! Decoding of XBRL bundles embedded in SGML submissions.
//!
//! A full-text submission is a line-oriented SGML container; binary
//! attachments ride inside it as uuencoded blocks bracketed by a
//! `<FILENAME>…` tag and a `begin` preamble. [`BundleScanner`] walks the
//! submission line by line, and [`extract_bundle`] opens the recovered
//! bytes as the zip archive they are.

mod uu;

use crate::error::Result;
use std::io::{Cursor, Read};
use zip::ZipArchive;

/// Scanner state; one submission line is consumed per transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    /// Looking for the `<FILENAME>` marker of the expected bundle.
    Scanning,
    /// Marker seen; waiting for the `begin` preamble.
    FoundMarker,
    /// Inside the encoded block; lines are decoded and accumulated.
    InBody,
    /// Block terminated; nothing further is consumed.
    Done,
}

/// Line-scanning state machine recovering one uuencoded attachment.
#[derive(Debug)]
pub struct BundleScanner {
    marker: String,
    state: ScanState,
    buffer: Vec<u8>,
}

impl BundleScanner {
    /// Scanner for the attachment named `expected_name`.
    pub fn new(expected_name: &str) -> Self {
        Self {
            marker: format!("<FILENAME>{expected_name}"),
            state: ScanState::Scanning,
            buffer: Vec::new(),
        }
    }

    /// Consume one submission line.
    pub fn push_line(&mut self, line: &str) -> Result<()> {
        match self.state {
            ScanState::Scanning => {
                if line == self.marker {
                    self.state = ScanState::FoundMarker;
                }
            }
            ScanState::FoundMarker => {
                if line.starts_with("begin ") {
                    self.state = ScanState::InBody;
                } else if line.trim().is_empty() {
                    // Marker without a body: abandoned, keep scanning.
                    self.state = ScanState::Scanning;
                }
            }
            ScanState::InBody => {
                if line.trim().is_empty() || line == "end" {
                    // Blank terminator, or the uuencode trailer.
                    self.state = ScanState::Done;
                } else {
                    let payload = uu::decode_line(line)?;
                    self.buffer.extend_from_slice(&payload);
                }
            }
            ScanState::Done => {}
        }
        Ok(())
    }

    /// Whether a complete block has been recovered.
    pub const fn is_complete(&self) -> bool {
        matches!(self.state, ScanState::Done)
    }

    /// Bytes recovered so far.
    pub fn into_bytes(self) -> Vec<u8> {
        self.buffer
    }
}

/// The decoded inner archive of one submission.
#[derive(Debug)]
pub struct SubmissionBundle {
    data: Vec<u8>,
    entries: Vec<String>,
}

impl SubmissionBundle {
    fn open(data: Vec<u8>) -> Result<Self> {
        let archive = ZipArchive::new(Cursor::new(&data))?;
        let entries = archive.file_names().map(str::to_string).collect();
        Ok(Self { data, entries })
    }

    /// Names of the contained files, in archive order.
    pub fn entry_names(&self) -> &[String] {
        &self.entries
    }

    /// Raw bytes of the recovered zip archive.
    pub fn as_bytes(&self) -> &[u8] {
        &self.data
    }

    /// Read one contained file by name.
    pub fn read_entry(&self, name: &str) -> Result<Vec<u8>> {
        let mut archive = ZipArchive::new(Cursor::new(&self.data))?;
        let mut entry = archive.by_name(name)?;
        let mut out = Vec::with_capacity(entry.size() as usize);
        entry.read_to_end(&mut out)?;
        Ok(out)
    }
}

/// Expected name of the XBRL bundle embedded in a submission: the submission
/// file name with its extension replaced by `-xbrl.zip`.
pub fn bundle_name(submission_filename: &str) -> String {
    let stem = submission_filename
        .rsplit_once('.')
        .map_or(submission_filename, |(stem, _)| stem);
    format!("{stem}-xbrl.zip")
}

/// Recover the attachment named `expected_name` from submission `text`.
///
/// Returns `Ok(None)` when no complete block is found — the marker never
/// appears, or the body never terminates before the input ends. Malformed
/// encoded lines abort the decode with
/// [`QuarryError::MalformedEncoding`](crate::QuarryError::MalformedEncoding).
pub fn extract_bundle(text: &str, expected_name: &str) -> Result<Option<SubmissionBundle>> {
    let mut scanner = BundleScanner::new(expected_name);
    for line in text.lines() {
        scanner.push_line(line)?;
        if scanner.is_complete() {
            break;
        }
    }
    if !scanner.is_complete() {
        return Ok(None);
    }
    SubmissionBundle::open(scanner.into_bytes()).map(Some)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::QuarryError;

    fn scanner() -> BundleScanner {
        BundleScanner::new("0000123456-16-000099-xbrl.zip")
    }

    #[test]
    fn scanning_ignores_everything_but_the_marker() {
        let mut scanner = scanner();
        scanner.push_line("<SEC-DOCUMENT>0000123456-16-000099.txt").unwrap();
        scanner.push_line("<FILENAME>some-other-file.zip").unwrap();
        scanner.push_line("begin 644 some-other-file.zip").unwrap();
        assert_eq!(scanner.state, ScanState::Scanning);
    }

    #[test]
    fn marker_must_match_exactly() {
        let mut scanner = scanner();
        scanner
            .push_line("<FILENAME>0000123456-16-000099-xbrl.zip ")
            .unwrap();
        assert_eq!(scanner.state, ScanState::Scanning);
        scanner
            .push_line("<FILENAME>0000123456-16-000099-xbrl.zip")
            .unwrap();
        assert_eq!(scanner.state, ScanState::FoundMarker);
    }

    #[test]
    fn preamble_lines_before_begin_are_ignored() {
        let mut scanner = scanner();
        scanner
            .push_line("<FILENAME>0000123456-16-000099-xbrl.zip")
            .unwrap();
        scanner.push_line("<DESCRIPTION>XBRL archive").unwrap();
        scanner.push_line("<TEXT>").unwrap();
        assert_eq!(scanner.state, ScanState::FoundMarker);
        scanner
            .push_line("begin 644 0000123456-16-000099-xbrl.zip")
            .unwrap();
        assert_eq!(scanner.state, ScanState::InBody);
    }

    #[test]
    fn blank_line_before_begin_abandons_the_marker() {
        let mut scanner = scanner();
        scanner
            .push_line("<FILENAME>0000123456-16-000099-xbrl.zip")
            .unwrap();
        scanner.push_line("").unwrap();
        assert_eq!(scanner.state, ScanState::Scanning);
    }

    #[test]
    fn body_accumulates_until_blank_line() {
        let mut scanner = scanner();
        scanner
            .push_line("<FILENAME>0000123456-16-000099-xbrl.zip")
            .unwrap();
        scanner.push_line("begin 644 0000123456-16-000099-xbrl.zip").unwrap();
        scanner.push_line(&uu::encode_line(b"Cat")).unwrap();
        scanner.push_line(&uu::encode_line(b"dog")).unwrap();
        scanner.push_line("").unwrap();
        assert!(scanner.is_complete());
        assert_eq!(scanner.into_bytes(), b"Catdog");
    }

    #[test]
    fn end_trailer_completes_the_body() {
        let mut scanner = scanner();
        scanner
            .push_line("<FILENAME>0000123456-16-000099-xbrl.zip")
            .unwrap();
        scanner.push_line("begin 644 0000123456-16-000099-xbrl.zip").unwrap();
        scanner.push_line(&uu::encode_line(b"Cat")).unwrap();
        scanner.push_line("`").unwrap();
        scanner.push_line("end").unwrap();
        assert!(scanner.is_complete());
        assert_eq!(scanner.into_bytes(), b"Cat");
    }

    #[test]
    fn malformed_body_line_is_an_error() {
        let mut scanner = scanner();
        scanner
            .push_line("<FILENAME>0000123456-16-000099-xbrl.zip")
            .unwrap();
        scanner.push_line("begin 644 0000123456-16-000099-xbrl.zip").unwrap();
        let err = scanner.push_line("~~~~~").unwrap_err();
        assert!(matches!(err, QuarryError::MalformedEncoding(_)));
    }

    #[test]
    fn done_state_absorbs_further_lines() {
        let mut scanner = scanner();
        scanner
            .push_line("<FILENAME>0000123456-16-000099-xbrl.zip")
            .unwrap();
        scanner.push_line("begin 644 0000123456-16-000099-xbrl.zip").unwrap();
        scanner.push_line("").unwrap();
        scanner.push_line("~~~~~").unwrap();
        assert!(scanner.is_complete());
    }

    #[test]
    fn bundle_name_replaces_extension() {
        assert_eq!(
            bundle_name("0000123456-16-000099.txt"),
            "0000123456-16-000099-xbrl.zip"
        );
        assert_eq!(bundle_name("no-extension"), "no-extension-xbrl.zip");
    }

    #[test]
    fn unterminated_body_yields_no_bundle() {
        let text = "<FILENAME>0000123456-16-000099-xbrl.zip\nbegin 644 x\n#0V%T\n";
        let result = extract_bundle(text, "0000123456-16-000099-xbrl.zip").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn absent_marker_yields_no_bundle() {
        let text = "<FILENAME>other.zip\nbegin 644 other.zip\n#0V%T\n\n";
        let result = extract_bundle(text, "0000123456-16-000099-xbrl.zip").unwrap();
        assert!(result.is_none());
    }
}
