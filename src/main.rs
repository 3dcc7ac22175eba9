//! Scope-Spider main entry point
//!
//! This is the command-line interface for the Scope-Spider link discovery crawler.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use scope_spider::config::{load_config_or_default, Config};
use scope_spider::crawler::{crawl, CrawlJob};
use scope_spider::notify::{CrawlNotification, WebhookNotifier};
use scope_spider::storage::open_storage;
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Scope-Spider: a scope-limited link discovery crawler
///
/// Scope-Spider starts from a seed URL and finds every page reachable under
/// the seed's domain and path prefix, storing the discovered links in SQLite
/// as it goes.
#[derive(Parser, Debug)]
#[command(name = "scope-spider")]
#[command(version)]
#[command(about = "A scope-limited link discovery crawler", long_about = None)]
struct Cli {
    /// Path to TOML configuration file (defaults apply when omitted)
    #[arg(short, long, value_name = "CONFIG", global = true)]
    config: Option<PathBuf>,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Suppress non-error output
    #[arg(short, long, conflicts_with = "verbose", global = true)]
    quiet: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Crawl a seed URL and print every discovered link
    Crawl {
        /// Absolute HTTP(S) URL to start from
        seed: String,

        /// Post the result to the configured webhook when done
        #[arg(long)]
        notify: bool,

        /// Show the derived scope and effective configuration without crawling
        #[arg(long, conflicts_with = "notify")]
        dry_run: bool,
    },

    /// Run the HTTP front-end
    Serve {
        /// Socket address to listen on (overrides [server] bind)
        #[arg(long, value_name = "ADDR")]
        bind: Option<String>,
    },

    /// Print the stored result of a seed URL
    Show {
        seed: String,
    },

    /// List every stored seed with its link count
    List,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    if let Some(path) = &cli.config {
        tracing::info!("Loading configuration from: {}", path.display());
    }
    let config = load_config_or_default(cli.config.as_deref())
        .context("Failed to load configuration")?;

    match cli.command {
        Command::Crawl {
            seed,
            notify,
            dry_run,
        } => {
            if dry_run {
                handle_dry_run(&config, &seed)
            } else {
                handle_crawl(&config, &seed, notify).await
            }
        }
        Command::Serve { bind } => handle_serve(config, bind).await,
        Command::Show { seed } => handle_show(&config, &seed),
        Command::List => handle_list(&config),
    }
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("scope_spider=info,warn"),
            1 => EnvFilter::new("scope_spider=debug,info"),
            2 => EnvFilter::new("scope_spider=trace,debug"),
            _ => EnvFilter::new("trace"),
        }
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_writer(std::io::stderr)
        .init();
}

/// Cancels the returned token on Ctrl-C
fn cancel_on_ctrl_c() -> CancellationToken {
    let cancel = CancellationToken::new();
    let token = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing current batch");
            token.cancel();
        }
    });
    cancel
}

/// Handles `crawl --dry-run`: validates the seed and shows what would be crawled
fn handle_dry_run(config: &Config, seed: &str) -> anyhow::Result<()> {
    let job = CrawlJob::new(seed).with_context(|| format!("Invalid seed URL: {}", seed))?;

    println!("=== Scope-Spider Dry Run ===\n");

    println!("Scope:");
    println!("  Seed: {}", job.seed_url());
    println!("  Domain: {}", job.scope_domain());
    println!("  Path prefix: {}", job.scope_path());

    println!("\nCrawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!(
        "  Checkpoint threshold: {}",
        config.crawler.checkpoint_threshold
    );

    println!("\nFetcher:");
    println!(
        "  Timeouts: {}s connect / {}s total",
        config.fetcher.connect_timeout_secs, config.fetcher.total_timeout_secs
    );
    println!("  User agent: {}", config.fetcher.user_agent);
    println!(
        "  Accept invalid certificates: {}",
        config.fetcher.accept_invalid_certs
    );

    println!("\nStorage:");
    println!("  Database: {}", config.storage.database_path);

    match &config.labeler {
        Some(labeler) => println!("\nLabeler: {} ({})", labeler.endpoint, labeler.model),
        None => println!("\nLabeler: scope domain"),
    }
    match &config.notify {
        Some(notify) => println!("Webhook: {}", notify.webhook_url),
        None => println!("Webhook: none"),
    }

    println!("\n✓ Configuration is valid");
    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: &Config, seed: &str, notify: bool) -> anyhow::Result<()> {
    let notifier = if notify {
        match &config.notify {
            Some(notify_config) => Some(WebhookNotifier::new(notify_config)?),
            None => bail!("--notify requires a [notify] section in the configuration"),
        }
    } else {
        None
    };

    let result = crawl(seed, config, cancel_on_ctrl_c()).await;

    if let Some(notifier) = &notifier {
        let notification = match &result {
            Ok(report) => CrawlNotification::from_report(report),
            Err(_) => CrawlNotification::failed(seed),
        };
        if let Err(e) = notifier.notify(&notification).await {
            tracing::warn!("Failed to deliver notification: {}", e);
        }
    }

    let report = result.context("Crawl failed")?;
    for link in &report.links {
        println!("{}", link);
    }

    tracing::info!(
        "{} links from {} pages ({} failed) in {:?}{}",
        report.links.len(),
        report.pages_fetched,
        report.fetch_failures,
        report.elapsed,
        if report.cancelled { ", cancelled" } else { "" }
    );

    Ok(())
}

/// Handles `serve`: runs the HTTP front-end until Ctrl-C
async fn handle_serve(mut config: Config, bind: Option<String>) -> anyhow::Result<()> {
    if let Some(bind) = bind {
        config.server.bind = bind;
    }

    scope_spider::server::serve(config, cancel_on_ctrl_c())
        .await
        .context("Server failed")
}

/// Handles `show`: prints a stored result
fn handle_show(config: &Config, seed: &str) -> anyhow::Result<()> {
    let job = CrawlJob::new(seed).with_context(|| format!("Invalid seed URL: {}", seed))?;
    let storage = open_storage(Path::new(&config.storage.database_path))?;

    let Some(record) = storage.load_result(job.seed_url())? else {
        bail!("No stored result for {}", job.seed_url());
    };

    println!("Seed: {}", record.seed_url);
    println!("Label: {}", record.scope_label);
    println!("Links: {}", record.total_links);
    println!("Updated: {}", record.updated_at);
    println!();
    for link in &record.links {
        println!("{}", link);
    }

    Ok(())
}

/// Handles `list`: lists stored seeds
fn handle_list(config: &Config) -> anyhow::Result<()> {
    let storage = open_storage(Path::new(&config.storage.database_path))?;
    let results = storage.list_results()?;

    if results.is_empty() {
        println!("No stored results in {}", config.storage.database_path);
        return Ok(());
    }

    for result in results {
        println!(
            "{:>6}  {}  {}  ({})",
            result.total_links, result.seed_url, result.scope_label, result.updated_at
        );
    }

    Ok(())
}
