//! Error types for archive retrieval and decoding.

use crate::quarters::QuarterKey;
use thiserror::Error;

/// Result type for quarry operations.
pub type Result<T> = std::result::Result<T, QuarryError>;

/// Errors that can occur while retrieving or decoding archive data.
#[derive(Debug, Error)]
pub enum QuarryError {
    /// Remote retrieval failed: connection, authentication, missing
    /// resource or interrupted transfer.
    #[error("fetch failed: {0}")]
    Fetch(#[from] suppaftp::FtpError),

    /// A stored cache entry exists but cannot be read back. The entry has
    /// been evicted; retrying will re-fetch.
    #[error("cache entry unreadable (evicted): {location}")]
    CacheCorrupted {
        /// Storage key of the evicted entry.
        location: String,
    },

    /// Cache database error.
    #[error("cache database error: {0}")]
    Database(#[from] rusqlite::Error),

    /// A quarter's index archive could not be opened or is missing its
    /// listing entry. Halts the surrounding quarter stream.
    #[error("index unavailable for {quarter}: {reason}")]
    IndexUnavailable {
        /// Quarter whose archive was unusable.
        quarter: QuarterKey,
        /// Underlying archive failure.
        reason: String,
    },

    /// A uuencoded body line could not be decoded. Aborts the current
    /// bundle decode only.
    #[error("malformed uuencoded line: {0}")]
    MalformedEncoding(String),

    /// Zip archive error.
    #[error("archive error: {0}")]
    Archive(#[from] zip::result::ZipError),

    /// HTTP transport error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// A browse-edgar page did not have the expected structure.
    #[error("scrape error: {0}")]
    Scrape(String),

    /// IO error.
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}
