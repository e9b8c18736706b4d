//! FTP retrieval of archive resources.

use crate::error::Result;
use suppaftp::FtpStream;
use suppaftp::types::FileType;
use tracing::info;

/// Default archive host.
pub const DEFAULT_SERVER: &str = "ftp.sec.gov";

/// Retrieve `filename` from `path` on `server` into one in-memory buffer.
///
/// Performs an anonymous login followed by a binary-mode `RETR`. Connection,
/// authentication, missing-path and transfer failures all surface as
/// [`QuarryError::Fetch`](crate::QuarryError::Fetch); retrying is left to
/// the caller.
pub fn retrieve(server: &str, path: &str, filename: &str) -> Result<Vec<u8>> {
    info!("retrieving ftp://{server}/{path}/{filename}");
    let mut ftp = FtpStream::connect((server, 21))?;
    ftp.login("anonymous", "anonymous")?;
    ftp.transfer_type(FileType::Binary)?;
    ftp.cwd(path)?;
    let buffer = ftp.retr_as_buffer(filename)?;
    // Best-effort close; the payload is already in hand.
    let _ = ftp.quit();
    Ok(buffer.into_inner())
}
