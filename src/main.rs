//! firmware-crawler main entry point
//!
//! This is the command-line interface for the firmware crawler.

use anyhow::{bail, Context};
use clap::Parser;
use firmware_crawler::config::{load_config_with_hash, Config};
use firmware_crawler::crawler::{CrawlSummary, Fetcher, HttpFetcher, PolitenessOverrides};
use firmware_crawler::sink::JsonLinesSink;
use firmware_crawler::vendors;
use std::path::PathBuf;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// firmware-crawler: latest firmware releases from vendor sites
///
/// Runs the enabled vendor modules one after another, politely, and appends
/// every normalized firmware record to a JSON-lines file.
#[derive(Parser, Debug)]
#[command(name = "firmware-crawler")]
#[command(version)]
#[command(about = "Polite firmware release crawler", long_about = None)]
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

    /// Validate config and show what would be crawled without actually crawling
    #[arg(long)]
    dry_run: bool,

    /// Only run these vendors (repeatable); defaults to every enabled entry
    #[arg(long = "vendor", value_name = "NAME")]
    vendors: Vec<String>,

    /// Write records here instead of the configured records-path
    #[arg(long, value_name = "PATH")]
    output: Option<PathBuf>,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    setup_logging(cli.verbose, cli.quiet);

    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (config, config_hash) = load_config_with_hash(&cli.config)
        .with_context(|| format!("Failed to load configuration {}", cli.config.display()))?;
    tracing::info!("Configuration loaded successfully (hash: {})", config_hash);

    let selected = select_vendors(&config, &cli.vendors)?;
    if selected.is_empty() {
        tracing::warn!("No vendors enabled, nothing to do");
        return Ok(());
    }

    if cli.dry_run {
        return handle_dry_run(&config, &selected);
    }

    let output = cli
        .output
        .unwrap_or_else(|| PathBuf::from(&config.output.records_path));
    handle_crawl(&config, &selected, output).await
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("firmware_crawler=info,warn"),
            1 => EnvFilter::new("firmware_crawler=debug,info"),
            2 => EnvFilter::new("firmware_crawler=trace,debug"),
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

/// Resolves which vendors to run, with each one's config overrides
///
/// Vendors named on the command line run even if their entry is disabled
/// or missing.
fn select_vendors(config: &Config, requested: &[String]) -> anyhow::Result<Vec<(String, PolitenessOverrides)>> {
    if requested.is_empty() {
        return Ok(config
            .enabled_vendors()
            .map(|entry| (entry.name.clone(), entry.overrides()))
            .collect());
    }

    let mut selected = Vec::new();
    for name in requested {
        if !vendors::is_known(name) {
            bail!(
                "Unknown vendor '{}' (known: {})",
                name,
                vendors::KNOWN_VENDORS.join(", ")
            );
        }
        let overrides = config
            .vendor(name)
            .map(|entry| entry.overrides())
            .unwrap_or_default();
        selected.push((name.clone(), overrides));
    }
    Ok(selected)
}

/// Handles the --dry-run mode: shows the effective settings per vendor
fn handle_dry_run(config: &Config, selected: &[(String, PolitenessOverrides)]) -> anyhow::Result<()> {
    let global = config.politeness.to_politeness();

    println!("=== firmware-crawler Dry Run ===\n");

    println!("User Agent:");
    println!("  Name: {}", config.user_agent.crawler_name);
    println!("  Version: {}", config.user_agent.crawler_version);
    println!("  Contact URL: {}", config.user_agent.contact_url);
    println!("  Contact Email: {}", config.user_agent.contact_email);

    println!("\nOutput:");
    println!("  Records: {}", config.output.records_path);

    let mut seed_count = 0;
    for (name, overrides) in selected {
        let plan = vendors::plan(name, &global, overrides)?;
        seed_count += plan.seeds.len();

        println!("\nVendor {}:", plan.name);
        println!("  Concurrent requests: {}", plan.politeness.concurrent_requests);
        println!(
            "  Download delay: {}ms (+{}..{}ms jitter)",
            plan.politeness.download_delay.as_millis(),
            plan.politeness.jitter_min.as_millis(),
            plan.politeness.jitter_max.as_millis()
        );
        println!("  Obey robots.txt: {}", plan.politeness.obey_robots);
        println!("  Allowed domains: {}", plan.allowed_domains.join(", "));
        println!("  Seeds ({}):", plan.seeds.len());
        for seed in &plan.seeds {
            println!("    * {}", seed);
        }
    }

    println!("\n✓ Configuration is valid");
    println!(
        "✓ Would crawl {} vendor(s) starting from {} seed(s)",
        selected.len(),
        seed_count
    );

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(
    config: &Config,
    selected: &[(String, PolitenessOverrides)],
    output: PathBuf,
) -> anyhow::Result<()> {
    let global = config.politeness.to_politeness();
    let fetcher: Arc<dyn Fetcher> = Arc::new(
        HttpFetcher::new(&config.user_agent).context("Failed to build HTTP client")?,
    );
    let mut sink = JsonLinesSink::open(&output)
        .await
        .with_context(|| format!("Failed to open records file {}", output.display()))?;

    tracing::info!(
        "Crawling {} vendor(s), records go to {}",
        selected.len(),
        output.display()
    );

    let mut total = CrawlSummary::default();
    for (name, overrides) in selected {
        let summary = vendors::run_vendor(
            name,
            fetcher.clone(),
            &global,
            overrides,
            &config.user_agent.crawler_name,
            &mut sink,
        )
        .await?;
        total.merge(&summary);
    }

    tracing::info!(
        "All vendors done: {} ({} written to {})",
        total,
        sink.written(),
        sink.path().display()
    );
    Ok(())
}
