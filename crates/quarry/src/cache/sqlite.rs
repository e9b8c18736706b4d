//! SQLite-backed resource cache.

use crate::cache::{Lookup, ResourceKey};
use crate::error::{QuarryError, Result};
use chrono::Utc;
use rusqlite::{Connection, params};
use std::path::Path;
use tracing::debug;

/// SQLite store mapping resource locations to fetched bodies.
#[derive(Debug)]
pub struct ResourceCache {
    conn: Connection,
}

impl ResourceCache {
    /// Open (or create) a cache database at `path`.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let conn = Connection::open(path)?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    /// Create an in-memory cache (useful for testing).
    pub fn in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory()?;
        let cache = Self { conn };
        cache.initialize_schema()?;
        Ok(cache)
    }

    fn initialize_schema(&self) -> Result<()> {
        self.conn.execute(
            "CREATE TABLE IF NOT EXISTS resources (
                location TEXT PRIMARY KEY,
                body BLOB NOT NULL,
                fetched_at TEXT NOT NULL
            )",
            [],
        )?;
        Ok(())
    }

    /// Look up `key` without fetching.
    pub fn lookup(&self, key: &ResourceKey) -> Result<Lookup> {
        let mut stmt = self
            .conn
            .prepare("SELECT body FROM resources WHERE location = ?1")?;
        match stmt.query_row(params![key.location()], |row| row.get::<_, Vec<u8>>(0)) {
            Ok(body) => Ok(Lookup::Hit(body)),
            Err(rusqlite::Error::QueryReturnedNoRows) => Ok(Lookup::Miss),
            // Row present but the blob cannot be read back: report corruption
            // rather than a database error, so the caller evicts and re-fetches.
            Err(_) => Ok(Lookup::Corrupted),
        }
    }

    /// Store `body` under `key`, replacing any previous entry.
    pub fn store(&self, key: &ResourceKey, body: &[u8]) -> Result<()> {
        self.conn.execute(
            "INSERT OR REPLACE INTO resources (location, body, fetched_at)
             VALUES (?1, ?2, ?3)",
            params![key.location(), body, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    /// Remove the entry under `key`, if any.
    pub fn evict(&self, key: &ResourceKey) -> Result<()> {
        self.conn.execute(
            "DELETE FROM resources WHERE location = ?1",
            params![key.location()],
        )?;
        Ok(())
    }

    /// Return the cached body for `key`, fetching and storing it on a miss.
    ///
    /// With `refresh` set the lookup is skipped and the fetched body
    /// overwrites whatever was stored. A corrupt entry is evicted and
    /// reported as [`QuarryError::CacheCorrupted`]; retrying will re-fetch,
    /// since the key is then absent.
    pub fn get_or_fetch<F>(&self, key: &ResourceKey, refresh: bool, fetch: F) -> Result<Vec<u8>>
    where
        F: FnOnce() -> Result<Vec<u8>>,
    {
        if !refresh {
            match self.lookup(key)? {
                Lookup::Hit(body) => {
                    debug!(location = %key, "cache hit");
                    return Ok(body);
                }
                Lookup::Miss => {}
                Lookup::Corrupted => {
                    self.evict(key)?;
                    return Err(QuarryError::CacheCorrupted {
                        location: key.location(),
                    });
                }
            }
        }
        let body = fetch()?;
        self.store(key, &body)?;
        debug!(location = %key, bytes = body.len(), "cache store");
        Ok(body)
    }
}
