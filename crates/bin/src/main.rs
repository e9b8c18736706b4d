//! Quarry CLI binary.
//!
//! Streams filtered filing records from the quarterly full indexes, decodes
//! embedded XBRL bundles, and resolves companies through browse-edgar.

use clap::{Parser, Subcommand, ValueEnum};
use quarry::browse::BrowseClient;
use quarry::cache::ResourceCache;
use quarry::client::ArchiveClient;
use quarry::quarters::QuarterKey;
use quarry::submission::{bundle_name, extract_bundle};
use std::error::Error;
use std::fs;
use std::path::PathBuf;
use std::process;
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "quarry")]
#[command(about = "SEC EDGAR full-index retrieval and bundle decoding", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Stream filtered filing records from the quarterly full indexes
    Index {
        /// First year of the range
        #[arg(long)]
        year: i32,

        /// First quarter of the range (1-4)
        #[arg(long, default_value = "1", value_parser = clap::value_parser!(u8).range(1..=4))]
        quarter: u8,

        /// Last year of the range (defaults to the current quarter)
        #[arg(long)]
        end_year: Option<i32>,

        /// Last quarter of the range (defaults to Q4 of --end-year)
        #[arg(long, value_parser = clap::value_parser!(u8).range(1..=4))]
        end_quarter: Option<u8>,

        /// Index format to read
        #[arg(long, value_enum, default_value = "company")]
        kind: Kind,

        /// Form-type substring to match (e.g. 10-K)
        #[arg(long, default_value = "10-Q")]
        filing_type: String,

        /// Free-text filter: whole line for company indexes, company name
        /// for xbrl indexes (case-insensitive)
        #[arg(long)]
        filter: Option<String>,

        /// Cache directory (defaults to the user cache dir)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Disable caching (always fetch fresh data)
        #[arg(long)]
        no_cache: bool,

        /// Force refresh cached data
        #[arg(long)]
        refresh: bool,

        /// Emit records as JSON lines
        #[arg(long)]
        json: bool,
    },

    /// Decode the XBRL bundle embedded in one submission
    Bundle {
        /// Remote directory of the submission (e.g. edgar/data/123456)
        path: String,

        /// Submission file name (e.g. 0000123456-16-000099.txt)
        filename: String,

        /// Write the bundle entries into this directory
        #[arg(long)]
        extract: Option<PathBuf>,

        /// Cache directory (defaults to the user cache dir)
        #[arg(long)]
        cache_dir: Option<PathBuf>,

        /// Disable caching (always fetch fresh data)
        #[arg(long)]
        no_cache: bool,

        /// Force refresh cached data
        #[arg(long)]
        refresh: bool,
    },

    /// Look up a company on browse-edgar
    Company {
        /// Ticker symbol or CIK
        ticker: String,

        /// Also list filings of this form type
        #[arg(long)]
        filing_type: Option<String>,

        /// Maximum filings to list
        #[arg(long, default_value = "40")]
        count: usize,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum Kind {
    Company,
    Xbrl,
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    if let Err(err) = run(Cli::parse()) {
        eprintln!("error: {err}");
        process::exit(1);
    }
}

fn run(cli: Cli) -> Result<(), Box<dyn Error>> {
    match cli.command {
        Commands::Index {
            year,
            quarter,
            end_year,
            end_quarter,
            kind,
            filing_type,
            filter,
            cache_dir,
            no_cache,
            refresh,
            json,
        } => {
            let client = build_client(cache_dir, no_cache, refresh)?;
            let start = QuarterKey::new(year, quarter);
            let end = match (end_year, end_quarter) {
                (Some(y), Some(q)) => QuarterKey::new(y, q),
                (Some(y), None) => QuarterKey::new(y, 4),
                _ => QuarterKey::current(),
            };
            match kind {
                Kind::Company => {
                    for record in
                        client.company_filings(start, end, &filing_type, filter.as_deref())
                    {
                        let record = record?;
                        if json {
                            println!("{}", serde_json::to_string(&record)?);
                        } else {
                            println!(
                                "{}\t{}\t{}\t{}\t{}",
                                record.date_filed,
                                record.form_type,
                                record.cik,
                                record.company_name,
                                record.file_path
                            );
                        }
                    }
                }
                Kind::Xbrl => {
                    for record in
                        client.xbrl_filings(start, end, &filing_type, filter.as_deref())
                    {
                        let record = record?;
                        if json {
                            println!("{}", serde_json::to_string(&record)?);
                        } else {
                            println!(
                                "{}\t{}\t{}\t{}\t{}/{}",
                                record.date_filed,
                                record.form_type,
                                record.cik,
                                record.company,
                                record.path,
                                record.filename
                            );
                        }
                    }
                }
            }
        }

        Commands::Bundle {
            path,
            filename,
            extract,
            cache_dir,
            no_cache,
            refresh,
        } => {
            let client = build_client(cache_dir, no_cache, refresh)?;
            let text = client.fetch_submission_at(&path, &filename)?;
            let name = bundle_name(&filename);
            match extract_bundle(&text, &name)? {
                None => println!("no {name} bundle embedded in {path}/{filename}"),
                Some(bundle) => {
                    for entry in bundle.entry_names() {
                        println!("{entry}");
                    }
                    if let Some(dir) = extract {
                        fs::create_dir_all(&dir)?;
                        for entry in bundle.entry_names() {
                            let target = dir.join(entry);
                            fs::write(&target, bundle.read_entry(entry)?)?;
                            println!("wrote {}", target.display());
                        }
                    }
                }
            }
        }

        Commands::Company {
            ticker,
            filing_type,
            count,
        } => {
            let browse = BrowseClient::new()?;
            let company = browse.company_search(&ticker)?;
            println!("\"{}\",\"{}\"", company.name, company.cik);
            if let Some(form) = filing_type {
                for pointer in browse.filing_pointers(&company.cik, &form, count)? {
                    if pointer.form_type == form {
                        println!(
                            "{}\t{}\t{}",
                            pointer.date_filed, pointer.form_type, pointer.documents_path
                        );
                    }
                }
            }
        }
    }
    Ok(())
}

fn build_client(
    cache_dir: Option<PathBuf>,
    no_cache: bool,
    refresh: bool,
) -> Result<ArchiveClient, Box<dyn Error>> {
    let mut client = ArchiveClient::new().with_refresh(refresh);
    if !no_cache {
        let dir = cache_dir
            .or_else(|| dirs::cache_dir().map(|base| base.join("quarry")))
            .unwrap_or_else(|| PathBuf::from(".quarry-cache"));
        fs::create_dir_all(&dir)?;
        client = client.with_cache(ResourceCache::open(dir.join("ftpcache.db"))?);
    }
    Ok(client)
}
