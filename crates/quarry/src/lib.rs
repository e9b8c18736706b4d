#![doc = include_str!("../README.md")]
#![doc(issue_tracker_base_url = "https://github.com/quarrydata/quarry/issues/")]
#![cfg_attr(docsrs, feature(doc_cfg, doc_auto_cfg))]
#![warn(missing_docs)]
#![forbid(unsafe_code)]

pub mod browse;
pub mod cache;
pub mod client;
pub mod error;
pub mod ftp;
pub mod index;
pub mod quarters;
pub mod submission;

pub use error::{QuarryError, Result};

/// Version information.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert!(!VERSION.is_empty());
    }
}
