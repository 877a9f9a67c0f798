//! broken-links main entry point
//!
//! This is the command-line interface for the broken-links checker.

use anyhow::{bail, Context};
use broken_links::config::{load_config_with_hash, Config};
use broken_links::crawler::{Checker, CheckerSettings, HttpFetcher};
use broken_links::output::{print_summary, write_csv_report, CrawlSummary};
use broken_links::storage::{open_storage, RunStatus, Storage};
use clap::Parser;
use std::path::{Path, PathBuf};
use tracing_subscriber::EnvFilter;

/// broken-links: a bounded, concurrent link checker
///
/// Crawls a site breadth-first from its root URL, following same-site links
/// up to a depth and page budget, and reports every link that never answered
/// with 200 OK together with the pages that contain it.
#[derive(Parser, Debug)]
#[command(name = "broken-links")]
#[command(version)]
#[command(about = "Find broken links on a website", long_about = None)]
struct Cli {
    /// Path to TOML configuration file
    #[arg(value_name = "CONFIG")]
    config: PathBuf,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose")]
    quiet: bool,

    /// Validate config and show what would be checked without crawling
    #[arg(long, conflicts_with = "history")]
    dry_run: bool,

    /// List stored runs from the database and exit
    #[arg(long, conflicts_with = "dry_run")]
    history: bool,

    /// Skip writing the CSV report
    #[arg(long)]
    no_report: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    if cli.dry_run {
        handle_dry_run(&config)
    } else if cli.history {
        handle_history(&config)
    } else {
        handle_check(&config, &config_hash, cli.no_report).await
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("broken_links=info,warn"),
            1 => EnvFilter::new("broken_links=debug,info"),
            2 => EnvFilter::new("broken_links=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .init();
}

/// Handles the --dry-run mode: validates config and shows the crawl settings
fn handle_dry_run(config: &Config) -> anyhow::Result<()> {
    let settings = CheckerSettings::from_config(config)?;

    println!("=== broken-links Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Root: {}", settings.root);
    println!("  Concurrency: {}", settings.concurrency);
    println!("  Max depth: {}", settings.max_depth);
    println!("  Max pages: {}", settings.max_pages);
    println!("  Max tries: {}", settings.max_tries);
    println!("  Timeout: {:?}", settings.timeout);
    println!("  Retry delay: {:?}", settings.retry_delay);
    if let Some(proxy) = &config.crawler.proxy {
        println!("  Proxy: {}", proxy);
    }
    if config.crawler.accept_invalid_certs {
        println!("  TLS verification: disabled");
    }

    println!("\nUser Agent:");
    println!("  {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!(
        "  Report: {}",
        broken_links::output::report_path(Path::new(&config.output.report_dir), &config.report_title())
            .display()
    );
    match &config.output.database_path {
        Some(path) => println!("  Database: {}", path),
        None => println!("  Database: (none)"),
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the --history mode: lists stored runs
fn handle_history(config: &Config) -> anyhow::Result<()> {
    let Some(database_path) = &config.output.database_path else {
        bail!("No database-path configured in [output]; there is no history to show");
    };

    let storage = open_storage(Path::new(database_path))
        .with_context(|| format!("Failed to open database {}", database_path))?;
    let runs = storage.list_runs(20)?;

    println!("Database: {}\n", database_path);
    if runs.is_empty() {
        println!("No runs recorded.");
        return Ok(());
    }

    for run in runs {
        let duration = run
            .duration_seconds()
            .map(|s| format!("{}s", s))
            .unwrap_or_else(|| "-".to_string());
        println!(
            "#{:<4} {}  {:<11} {}  pages: {}  broken: {}  duration: {}",
            run.id,
            run.started_at,
            run.status.to_string(),
            run.root,
            run.pages_visited.map_or("-".to_string(), |n| n.to_string()),
            run.broken_count.map_or("-".to_string(), |n| n.to_string()),
            duration
        );
    }

    Ok(())
}

/// Handles the main check operation
async fn handle_check(config: &Config, config_hash: &str, no_report: bool) -> anyhow::Result<()> {
    let settings = CheckerSettings::from_config(config)?;
    let root = settings.root.clone();

    let fetcher = HttpFetcher::from_config(config).context("Failed to build HTTP client")?;
    let checker = Checker::new(settings, fetcher)?;

    let mut storage = match &config.output.database_path {
        Some(path) => Some(
            open_storage(Path::new(path))
                .with_context(|| format!("Failed to open database {}", path))?,
        ),
        None => None,
    };
    let run_id = match storage.as_mut() {
        Some(storage) => Some(storage.create_run(root.as_str(), config_hash)?),
        None => None,
    };

    let outcome = checker
        .check_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::warn!("Unable to listen for Ctrl-C: {}", e);
                std::future::pending::<()>().await;
            }
        })
        .await;

    let status = if outcome.interrupted {
        RunStatus::Interrupted
    } else {
        RunStatus::Completed
    };

    if let (Some(storage), Some(run_id)) = (storage.as_mut(), run_id) {
        storage
            .save_result(run_id, outcome.pages_visited(), &outcome.result, status)
            .context("Failed to store run result")?;
        tracing::info!("Stored run {} as {}", run_id, status);
    }

    let summary = CrawlSummary::from_outcome(&root, &outcome);
    print_summary(&summary, &outcome);

    if !no_report {
        let path = write_csv_report(
            &outcome.result,
            Path::new(&config.output.report_dir),
            &config.report_title(),
        )
        .context("Failed to write CSV report")?;
        println!("\n✓ Report written to: {}", path.display());
    }

    Ok(())
}
