//! dnsperf - a DNS performance testing tool.
//!
//! This crate provides both a library API and a CLI tool for:
//! - Resolving a list of queries against a list of nameservers
//! - Measuring per-query response latency and recording answer TTLs
//! - Emitting JSON result batches (file, stdout, or HTTP upload)
//! - Converting accumulated batches to CSV for analysis
//!
//! # Library Usage
//!
//! ```ignore
//! use dnsperf::{InputLoader, QueryRunner, aggregate};
//!
//! let nameservers = InputLoader::load_lines("nameservers.txt").await?;
//! let queries = InputLoader::load_queries("queries.txt").await?;
//!
//! let runner = QueryRunner::new();
//! let results = runner.run(&nameservers, &queries).await;
//! ```
//!
//! # CLI Usage
//!
//! ```bash
//! # Run with the default input files
//! dnsperf run
//!
//! # Explicit inputs, console table, upload
//! dnsperf run --ifname ns.txt --ifquery queries.txt --display
//! dnsperf run --upload https://collector.example.com/ingest
//!
//! # Convert accumulated batches to CSV
//! dnsperf convert --jsonfile output.txt --csvfile output.csv
//!
//! # Device identity management
//! dnsperf tag set branch-office
//! dnsperf uuid show
//! ```

pub mod cli;
pub mod config;
pub mod dns;
pub mod error;
pub mod identity;
pub mod output;

// Re-export commonly used types
pub use cli::{Cli, Commands, RunArgs};
pub use config::InputLoader;
pub use dns::report::{aggregate, Identity};
pub use dns::resolve::QueryRunner;
pub use dns::types::{Query, QueryResult, RecordKind, RunReport, RunResult};
pub use error::{Error, Result};
pub use identity::IdentityStore;
