//! Download cache for fetched archive resources.
//!
//! Every resource is identified by the `(server, path, filename)` triple it
//! was retrieved from and cached as an opaque byte blob. Corrupt entries are
//! detected lazily at read time and evicted, so a retry re-fetches.

pub mod sqlite;

pub use sqlite::ResourceCache;

use std::fmt;

/// Composite key identifying one fetched resource.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ResourceKey {
    /// Remote host the resource was fetched from.
    pub server: String,
    /// Remote directory on that host.
    pub path: String,
    /// File name within the directory.
    pub filename: String,
}

impl ResourceKey {
    /// Key for `filename` under `path` on `server`.
    pub fn new(
        server: impl Into<String>,
        path: impl Into<String>,
        filename: impl Into<String>,
    ) -> Self {
        Self {
            server: server.into(),
            path: path.into(),
            filename: filename.into(),
        }
    }

    /// Storage location: the three components joined with `/`.
    ///
    /// Identical `(server, path, filename)` triples always produce the
    /// identical location.
    pub fn location(&self) -> String {
        format!("{}/{}/{}", self.server, self.path, self.filename)
    }
}

impl fmt::Display for ResourceKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}/{}", self.server, self.path, self.filename)
    }
}

/// Result of looking a key up in the cache.
///
/// `Corrupted` means a row exists but its blob cannot be read back; the
/// entry is expected to be evicted before anything else happens.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    /// The stored body.
    Hit(Vec<u8>),
    /// No entry under this key.
    Miss,
    /// An entry exists but is unreadable.
    Corrupted,
}
