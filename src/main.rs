//! dnsperf - DNS performance testing CLI
//!
//! Binary entry point for the dnsperf application.

#![warn(clippy::all, warnings)]
#![warn(clippy::pedantic, clippy::nursery)]

use chrono::Utc;
use dnsperf::cli::{Commands, RunArgs, TagAction, UuidAction};
use dnsperf::config::InputLoader;
use dnsperf::dns::{aggregate, QueryRunner};
use dnsperf::error::Result;
use dnsperf::identity::IdentityStore;
use dnsperf::output;
use std::time::Duration;
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

/// Set up logging based on verbosity level.
///
/// # Arguments
///
/// * `verbose` - Enable debug-level logging
/// * `quiet` - Enable error-level only logging
fn setup_logging(verbose: bool, quiet: bool) {
    let filter = if quiet {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("error"))
    } else if verbose {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("debug"))
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
    };

    tracing_subscriber::registry()
        .with(filter)
        .with(fmt::layer().without_time())
        .init();
}

/// Run the performance test and fan results out to the configured sinks.
async fn run_test(args: RunArgs) -> Result<()> {
    let store = IdentityStore::new();
    // Identity is created here, once, before the run; the aggregator only
    // reads the snapshot.
    store.ensure_uuid()?;
    let identity = store.snapshot()?;

    tracing::info!("loading queries from {}", args.ifquery);
    let queries = InputLoader::load_queries(&args.ifquery).await?;

    tracing::info!("loading nameservers from {}", args.ifname);
    let nameservers = InputLoader::load_lines(&args.ifname).await?;

    tracing::info!(
        "resolving {} queries against {} nameservers ({} lookups)",
        queries.len(),
        nameservers.len(),
        queries.len() * nameservers.len()
    );

    let start = Utc::now();
    let runner = QueryRunner::with_timeout(Duration::from_secs(args.timeout));
    let results = runner.run(&nameservers, &queries).await;
    let end = Utc::now();

    let report = aggregate(results, start, end, &identity);

    if args.display {
        output::display_table(&report.query_results);
    }

    output::write_report_file(&report, &args.ofresults)?;
    tracing::info!("results written to {}", args.ofresults.display());

    if args.stdout {
        output::print_report(&report)?;
    }

    if let Some(url) = &args.upload {
        let headers = output::upload_report(&report, url).await?;
        tracing::info!("uploaded report to {url}");
        for (name, value) in &headers {
            tracing::debug!("response header {name}: {value:?}");
        }
    }

    Ok(())
}

/// Dispatch the selected subcommand.
async fn dispatch(command: Option<Commands>) -> Result<()> {
    match command {
        Some(Commands::Run(args)) => run_test(args).await,

        Some(Commands::Convert { jsonfile, csvfile }) => {
            let reports = output::convert_batches(&jsonfile, &csvfile)?;
            println!(
                "Converted {} report(s) into {}",
                reports,
                csvfile.display()
            );
            Ok(())
        }

        Some(Commands::Tag { action }) => {
            let store = IdentityStore::new();
            match action {
                TagAction::Set { name } => {
                    store.set_tag(&name)?;
                    println!("Tag set.");
                }
                TagAction::Delete => {
                    store.delete_tag()?;
                    println!("Tag deleted.");
                }
                TagAction::Show => println!("{}", store.tag()?),
            }
            Ok(())
        }

        Some(Commands::Uuid { action }) => {
            let store = IdentityStore::new();
            match action {
                UuidAction::Show => println!("{}", store.uuid()?),
                UuidAction::Delete => {
                    store.delete_uuid()?;
                    println!("UUID deleted.");
                }
            }
            Ok(())
        }

        // No subcommand: run with the default input files.
        None => run_test(RunArgs::default()).await,
    }
}

/// Main entry point for the dnsperf CLI application.
#[tokio::main]
async fn main() {
    let cli = dnsperf::cli::parse();
    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("dnsperf starting...");

    let outcome = tokio::select! {
        outcome = dispatch(cli.command) => outcome,
        _ = tokio::signal::ctrl_c() => {
            tracing::info!("interrupted");
            Ok(())
        }
    };

    if let Err(e) = outcome {
        tracing::error!("{e}");
        // Only configuration errors (missing input files, identity misuse)
        // change the exit status.
        if e.is_fatal_config() {
            std::process::exit(1);
        }
    }
}
