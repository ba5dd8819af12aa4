//! Coverage Crawler main entry point
//!
//! This is the command-line interface for the artist coverage crawler.

use clap::Parser;
use coverage_crawler::config::{load_config_with_hash, validate, Config};
use coverage_crawler::crawler::{run_crawl, HttpFetcher, IndexCrawler};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing_subscriber::EnvFilter;

/// Coverage Crawler: artist index walker and coverage extractor
///
/// Walks the site's alphabetical artist index, visits every artist page,
/// extracts the editorial coverage listed there and reconciles it into a
/// SQLite database. Re-running refreshes the stored data in place.
#[derive(Parser, Debug)]
#[command(name = "coverage-crawler")]
#[command(version = "1.0.0")]
#[command(about = "Artist index walker and coverage extractor", long_about = None)]
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

    /// Number of artist pages processed concurrently (overrides config)
    #[arg(short, long)]
    workers: Option<u32>,

    /// Comma-separated index letters to crawl (overrides config)
    #[arg(long, value_delimiter = ',')]
    letters: Option<Vec<String>>,

    /// Walk the index and list artist URLs without visiting artist pages
    #[arg(long, conflicts_with_all = ["stats", "export_summary"])]
    dry_run: bool,

    /// Show statistics from the database and exit
    #[arg(long, conflicts_with_all = ["dry_run", "export_summary"])]
    stats: bool,

    /// Generate markdown summary of the latest run and exit
    #[arg(long, conflicts_with_all = ["dry_run", "stats"])]
    export_summary: bool,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    // Setup logging based on verbosity
    setup_logging(cli.verbose, cli.quiet);

    // Load and validate configuration
    tracing::info!("Loading configuration from: {}", cli.config.display());
    let (mut config, config_hash) = match load_config_with_hash(&cli.config) {
        Ok((cfg, hash)) => {
            tracing::info!("Configuration loaded successfully (hash: {})", hash);
            (cfg, hash)
        }
        Err(e) => {
            tracing::error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    if let Some(workers) = cli.workers {
        config.crawler.workers = workers;
    }
    if let Some(letters) = cli.letters {
        config.site.letters = letters;
    }
    validate(&config)?;

    // Handle different modes
    if cli.dry_run {
        handle_dry_run(&config).await?;
    } else if cli.stats {
        handle_stats(&config)?;
    } else if cli.export_summary {
        handle_export_summary(&config)?;
    } else {
        handle_crawl(config, config_hash).await?;
    }

    Ok(())
}

/// Sets up the logging/tracing subscriber based on verbosity level
fn setup_logging(verbose: u8, quiet: bool) {
    let filter = if quiet {
        // Only show errors
        EnvFilter::new("error")
    } else {
        match verbose {
            0 => EnvFilter::new("coverage_crawler=info,warn"),
            1 => EnvFilter::new("coverage_crawler=debug,info"),
            2 => EnvFilter::new("coverage_crawler=trace,debug"),
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

/// Handles the --dry-run mode: walks every index chain and lists artist URLs
async fn handle_dry_run(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    println!("=== Coverage Crawler Dry Run ===\n");

    println!("Crawler Configuration:");
    println!("  Workers: {}", config.crawler.workers);
    println!("  Request timeout: {}s", config.crawler.request_timeout_secs);
    println!("  Max retries: {}", config.crawler.max_retries);

    println!("\nUser Agent: {}", config.user_agent.header_value());

    println!("\nOutput:");
    println!("  Database: {}", config.output.database_path);
    println!("  Summary: {}", config.output.summary_path);
    if let Some(dir) = &config.output.json_dir {
        println!("  Artist documents: {}", dir);
    }

    let fetcher = Arc::new(HttpFetcher::new(&config.crawler, &config.user_agent)?);
    let crawler = IndexCrawler::new(fetcher, config.selectors.clone());

    let mut total = 0;
    for seed in config.index_urls()? {
        println!("\nIndex {}:", seed);
        let (urls, report) = crawler.crawl(seed).await;
        for url in &urls {
            println!("  - {}", url);
        }
        println!(
            "  {} artists on {} pages{}",
            report.artists_found,
            report.pages_visited,
            if report.cycles > 0 { " (pagination cycle)" } else { "" }
        );
        total += urls.len();
    }

    println!("\n✓ Configuration is valid");
    println!("✓ Would visit {} artist pages", total);

    Ok(())
}

/// Handles the --stats mode: shows statistics from the database
fn handle_stats(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use coverage_crawler::output::{load_statistics, print_statistics};
    use coverage_crawler::storage::SqliteStorage;

    println!("Database: {}\n", config.output.database_path);

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;
    let stats = load_statistics(&storage)?;
    print_statistics(&stats);

    Ok(())
}

/// Handles the --export-summary mode: generates markdown summary
fn handle_export_summary(config: &Config) -> Result<(), Box<dyn std::error::Error>> {
    use coverage_crawler::output::{generate_markdown_summary, load_run_summary};
    use coverage_crawler::storage::SqliteStorage;

    println!("=== Exporting Crawl Summary ===\n");
    println!("Database: {}", config.output.database_path);
    println!("Output: {}", config.output.summary_path);
    println!();

    let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

    tracing::info!("Loading latest run from database...");
    let summary = load_run_summary(&storage, None)?;

    tracing::info!("Generating markdown summary...");
    generate_markdown_summary(&summary, Path::new(&config.output.summary_path))?;

    println!("✓ Summary exported to: {}", config.output.summary_path);

    Ok(())
}

/// Handles the main crawl operation
async fn handle_crawl(config: Config, config_hash: String) -> Result<(), Box<dyn std::error::Error>> {
    tracing::info!(
        "Crawling {} index letters with {} workers",
        config.site.letters.len(),
        config.crawler.workers
    );

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupt received, finishing in-flight artists");
            on_signal.cancel();
        }
    });

    match run_crawl(config, config_hash, cancel).await {
        Ok(summary) => {
            tracing::info!(
                "Crawl {}: {} artists stored, {} failed",
                summary.status(),
                summary.run.totals.artists_reconciled,
                summary.run.totals.artists_failed
            );
            Ok(())
        }
        Err(e) => {
            tracing::error!("Crawl failed: {}", e);
            Err(e.into())
        }
    }
}
