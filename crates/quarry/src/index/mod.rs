//! Quarterly index listings and their two line formats.
//!
//! EDGAR publishes each quarter's filings as a fixed-field `company.idx`
//! listing and a pipe-delimited `xbrl.idx` listing. The parsers here are
//! pure functions over listing text; fetching and caching live in
//! [`crate::client`].

pub mod company;
pub mod xbrl;

pub use company::CompanyRecord;
pub use xbrl::XbrlRecord;

/// Which quarterly index archive to load.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IndexKind {
    /// `company.zip` / `company.idx`: fixed-field listing ordered by filer.
    Company,
    /// `xbrl.zip` / `xbrl.idx`: pipe-delimited listing of XBRL filings.
    Xbrl,
}

impl IndexKind {
    /// Base name shared by the archive and its single listing entry.
    pub const fn archive_name(self) -> &'static str {
        match self {
            Self::Company => "company",
            Self::Xbrl => "xbrl",
        }
    }
}
