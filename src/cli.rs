//! Command-line interface (CLI) argument parsing module.
//!
//! This module provides CLI argument parsing using `clap`.
//! It supports the test run itself plus housekeeping commands: converting
//! accumulated result batches to CSV and managing the device tag and UUID.

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// CLI argument parser using clap derive macro.
///
/// # Example
///
/// ```ignore
/// let cli = Cli::parse();
/// match cli.command {
///     Some(Commands::Run(args)) => { /* ... */ }
///     Some(Commands::Convert { .. }) => { /* ... */ }
///     None => { /* run with defaults */ }
/// }
/// ```
#[derive(Parser, Debug)]
#[command(
    name = "dnsperf",
    version,
    about = "DNS performance testing",
    long_about = "Resolves a list of queries against a list of nameservers, \
                  measures per-query latency, and emits a JSON result batch",
    infer_subcommands = true
)]
pub struct Cli {
    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Quiet mode (only errors)
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

/// Input/output options for one test run.
#[derive(Args, Debug, Clone)]
pub struct RunArgs {
    /// List of nameserver IP addresses or hostnames, one per line
    /// (local path or http(s) URL)
    #[arg(long, default_value = "nameservers.txt")]
    pub ifname: String,

    /// List of queries to perform, one per line as `name` or `name,TYPE`
    /// (local path or http(s) URL)
    #[arg(long, default_value = "queries.txt")]
    pub ifquery: String,

    /// JSON results output file
    #[arg(long, default_value = "output.txt")]
    pub ofresults: PathBuf,

    /// Also print the JSON report to stdout
    #[arg(long)]
    pub stdout: bool,

    /// Display results as a console table
    #[arg(short, long)]
    pub display: bool,

    /// Upload the JSON report to this URL via HTTP POST
    #[arg(long)]
    pub upload: Option<String>,

    /// Per-lookup timeout in seconds
    #[arg(short, long, default_value = "5")]
    pub timeout: u64,
}

impl Default for RunArgs {
    fn default() -> Self {
        Self {
            ifname: "nameservers.txt".to_string(),
            ifquery: "queries.txt".to_string(),
            ofresults: PathBuf::from("output.txt"),
            stdout: false,
            display: false,
            upload: None,
            timeout: 5,
        }
    }
}

/// Available commands for the dnsperf CLI.
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the DNS performance test
    ///
    /// Resolves every query against every nameserver in order, records
    /// per-query latency and TTL, and writes a JSON result batch.
    #[command(alias = "r")]
    Run(RunArgs),

    /// Convert accumulated JSON result batches to CSV
    ///
    /// Reads one JSON report per line and flattens every result row into a
    /// spreadsheet-friendly CSV file.
    #[command(alias = "c")]
    Convert {
        /// JSON-lines results file produced by the run command
        #[arg(long, default_value = "output.txt")]
        jsonfile: PathBuf,

        /// CSV file to write
        #[arg(long, default_value = "output.csv")]
        csvfile: PathBuf,
    },

    /// Manage the device tag attached to reports
    Tag {
        #[command(subcommand)]
        action: TagAction,
    },

    /// Manage the persistent device UUID attached to reports
    Uuid {
        #[command(subcommand)]
        action: UuidAction,
    },
}

/// Tag management actions. Each performs its side effect and exits.
#[derive(Debug, Subcommand)]
pub enum TagAction {
    /// Set the device tag
    Set {
        /// Tag value to persist
        name: String,
    },
    /// Delete the device tag
    Delete,
    /// Print the current device tag
    Show,
}

/// UUID management actions. Each performs its side effect and exits.
#[derive(Debug, Subcommand)]
pub enum UuidAction {
    /// Print the current device UUID
    Show,
    /// Delete the device UUID (a new one is created on the next run)
    Delete,
}

/// Parse CLI arguments.
///
/// # Returns
///
/// Returns the parsed `Cli` struct.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}
