//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the crawl pipeline that ties everything together:
//! - Index crawlers walk every seed chain and feed a bounded artist queue
//! - A worker pool assembles and reconciles artist pages concurrently
//! - Cancellation stops index crawling and in-flight fetches
//! - The run record, its counters and unfamiliar kinds are persisted at the end

use crate::config::Config;
use crate::coverage::{ArtistAssembler, AssembledArtist, UnfamiliarKinds};
use crate::crawler::fetcher::{Fetcher, HttpFetcher};
use crate::crawler::index::{IndexCrawlReport, IndexCrawler};
use crate::output::{generate_markdown_summary, write_artist_json, RunSummary};
use crate::storage::{
    reconcile, ReconcileOutcome, RunStatus, RunTotals, SqliteStorage, Storage, StorageError,
};
use crate::url::page_key;
use crate::CrawlError;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Instant;
use tokio::sync::{mpsc, Semaphore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use url::Url;

/// Main crawler coordinator structure
pub struct Coordinator {
    config: Arc<Config>,
    config_hash: String,
    fetcher: Arc<dyn Fetcher>,
    storage: Arc<Mutex<SqliteStorage>>,
    unfamiliar: UnfamiliarKinds,
    cancel: CancellationToken,
}

/// How one artist page ended
#[derive(Debug)]
enum ArtistOutcome {
    Reconciled {
        outcome: ReconcileOutcome,
        skipped_items: usize,
    },
    Failed(&'static str),
    Cancelled,
}

impl Coordinator {
    /// Creates a coordinator fetching over HTTP
    ///
    /// # Arguments
    ///
    /// * `config` - The crawler configuration
    /// * `config_hash` - Hash of the configuration file, recorded with the run
    ///
    /// # Returns
    ///
    /// * `Ok(Coordinator)` - Successfully created coordinator
    /// * `Err(CrawlError)` - The HTTP client or the database could not be set up
    pub fn new(config: Config, config_hash: impl Into<String>) -> Result<Self, CrawlError> {
        let fetcher = HttpFetcher::new(&config.crawler, &config.user_agent)?;
        Self::with_fetcher(config, config_hash, Arc::new(fetcher))
    }

    /// Creates a coordinator around any [`Fetcher`]
    pub fn with_fetcher(
        config: Config,
        config_hash: impl Into<String>,
        fetcher: Arc<dyn Fetcher>,
    ) -> Result<Self, CrawlError> {
        let storage = SqliteStorage::new(Path::new(&config.output.database_path))?;

        Ok(Self {
            config: Arc::new(config),
            config_hash: config_hash.into(),
            fetcher,
            storage: Arc::new(Mutex::new(storage)),
            unfamiliar: UnfamiliarKinds::new(),
            cancel: CancellationToken::new(),
        })
    }

    /// Replaces the token that stops the run
    pub fn with_cancellation(mut self, cancel: CancellationToken) -> Self {
        self.cancel = cancel;
        self
    }

    /// Token that stops the run when cancelled
    pub fn cancellation_token(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Runs one crawl to completion or cancellation
    ///
    /// Per-artist failures are logged and counted; they never stop the run.
    /// On cancellation, index crawling stops, in-flight artist fetches are
    /// abandoned and queued artist URLs are dropped. Reconciliations already
    /// started finish, so every artist is either fully stored or untouched.
    pub async fn run(&self) -> Result<RunSummary, CrawlError> {
        let run_id = lock_storage(&self.storage)?.create_run(&self.config_hash)?;
        tracing::info!("Starting crawl run {}", run_id);

        match self.execute(run_id).await {
            Ok(summary) => Ok(summary),
            Err(e) => {
                tracing::error!(kind = e.kind(), "Crawl run {} failed: {}", run_id, e);
                let finished = lock_storage(&self.storage).and_then(|mut storage| {
                    storage.finish_run(run_id, RunStatus::Failed, &RunTotals::default())
                });
                if let Err(store_err) = finished {
                    tracing::error!(
                        kind = "store",
                        "Could not mark run {} as failed: {}",
                        run_id,
                        store_err
                    );
                }
                Err(e)
            }
        }
    }

    async fn execute(&self, run_id: i64) -> Result<RunSummary, CrawlError> {
        let seeds = self.config.index_urls()?;
        let start_time = Instant::now();

        let (tx, mut rx) = mpsc::channel(self.config.crawler.queue_capacity.max(1) as usize);
        let index_crawler = IndexCrawler::new(self.fetcher.clone(), self.config.selectors.clone());
        let producer = tokio::spawn(discover(index_crawler, seeds, tx, self.cancel.clone()));

        let task = ArtistTask {
            assembler: ArtistAssembler::new(
                self.fetcher.clone(),
                self.config.selectors.clone(),
                self.unfamiliar.clone(),
            ),
            storage: self.storage.clone(),
            json_dir: self.config.output.json_dir.as_ref().map(PathBuf::from),
            cancel: self.cancel.clone(),
        };

        let semaphore = Arc::new(Semaphore::new(self.config.crawler.workers.max(1) as usize));
        let mut workers = JoinSet::new();
        let mut seen = HashSet::new();
        let mut totals = RunTotals::default();

        loop {
            let url = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                next = rx.recv() => match next {
                    Some(url) => url,
                    None => break,
                },
            };

            // Artists listed under several index chains are processed once
            if !seen.insert(page_key(&url)) {
                continue;
            }

            let permit = tokio::select! {
                biased;
                _ = self.cancel.cancelled() => break,
                permit = semaphore.clone().acquire_owned() => match permit {
                    Ok(permit) => permit,
                    Err(_) => break,
                },
            };

            totals.artists_discovered += 1;
            let task = task.clone();
            workers.spawn(async move {
                let _permit = permit;
                task.process(url).await
            });

            if totals.artists_discovered % 100 == 0 {
                let rate = totals.artists_discovered as f64 / start_time.elapsed().as_secs_f64();
                tracing::info!(
                    "Progress: {} artists dispatched, {:.2} artists/sec",
                    totals.artists_discovered,
                    rate
                );
            }
        }

        // Drops everything still queued
        drop(rx);

        while let Some(joined) = workers.join_next().await {
            match joined {
                Ok(ArtistOutcome::Reconciled {
                    outcome,
                    skipped_items,
                }) => {
                    totals.artists_reconciled += 1;
                    totals.coverage_records += outcome.inserted as u64;
                    totals.extraction_warnings += skipped_items as u64;
                }
                Ok(ArtistOutcome::Failed(kind)) => {
                    totals.artists_failed += 1;
                    *totals.failures.entry(kind.to_string()).or_default() += 1;
                }
                Ok(ArtistOutcome::Cancelled) => {}
                Err(e) => {
                    tracing::error!(kind = "join", "Artist worker failed: {}", e);
                    totals.artists_failed += 1;
                    *totals.failures.entry("join".to_string()).or_default() += 1;
                }
            }
        }

        let index_report = producer.await?;
        totals.index_pages = index_report.pages_visited as u64;
        totals.pagination_cycles = index_report.cycles as u64;

        let status = if self.cancel.is_cancelled() {
            tracing::warn!("Crawl run {} interrupted", run_id);
            RunStatus::Interrupted
        } else {
            RunStatus::Completed
        };

        let unfamiliar = self.unfamiliar.snapshot();
        let run = {
            let mut storage = lock_storage(&self.storage)?;
            storage.record_unfamiliar(run_id, &unfamiliar)?;
            storage.finish_run(run_id, status, &totals)?;
            storage.get_run(run_id)?
        };

        for (label, urls) in &unfamiliar {
            tracing::info!(
                kind = "unfamiliar_kind",
                "Unfamiliar coverage type '{}' on {} artist pages",
                label,
                urls.len()
            );
        }
        tracing::info!(
            "Crawl {}: {} index pages, {} artists reconciled, {} failed, {} items skipped in {:?}",
            status,
            totals.index_pages,
            totals.artists_reconciled,
            totals.artists_failed,
            totals.extraction_warnings,
            start_time.elapsed()
        );

        Ok(RunSummary { run, unfamiliar })
    }
}

/// Per-artist work shared by every worker
#[derive(Clone)]
struct ArtistTask {
    assembler: ArtistAssembler,
    storage: Arc<Mutex<SqliteStorage>>,
    json_dir: Option<PathBuf>,
    cancel: CancellationToken,
}

impl ArtistTask {
    async fn process(self, url: Url) -> ArtistOutcome {
        let assembled = tokio::select! {
            _ = self.cancel.cancelled() => return ArtistOutcome::Cancelled,
            result = self.assembler.assemble(&url) => result,
        };

        let stored = assembled.and_then(|assembled| {
            let outcome = self.store(&assembled)?;
            Ok(ArtistOutcome::Reconciled {
                outcome,
                skipped_items: assembled.warnings.len(),
            })
        });

        match stored {
            Ok(reconciled) => reconciled,
            Err(e) => {
                if e.is_per_item() {
                    tracing::warn!(url = %url, kind = e.kind(), "Artist skipped: {}", e);
                } else {
                    tracing::error!(url = %url, kind = e.kind(), "Artist failed: {}", e);
                }
                ArtistOutcome::Failed(e.kind())
            }
        }
    }

    fn store(&self, assembled: &AssembledArtist) -> Result<ReconcileOutcome, CrawlError> {
        let outcome = {
            let mut storage = lock_storage(&self.storage)?;
            reconcile(&mut *storage, &assembled.artist, &assembled.coverage)?
        };
        tracing::debug!(
            url = %assembled.artist.url,
            "Reconciled artist {}: {} records replaced {}",
            assembled.artist.id,
            outcome.inserted,
            outcome.removed
        );

        if let Some(dir) = &self.json_dir {
            if let Err(e) = write_artist_json(dir, assembled) {
                tracing::warn!(
                    url = %assembled.artist.url,
                    kind = "output",
                    "Could not write artist document: {}",
                    e
                );
            }
        }

        Ok(outcome)
    }
}

/// Walks every seed chain concurrently, feeding `tx`
async fn discover(
    crawler: IndexCrawler,
    seeds: Vec<Url>,
    tx: mpsc::Sender<Url>,
    cancel: CancellationToken,
) -> IndexCrawlReport {
    let mut chains = JoinSet::new();
    for seed in seeds {
        let crawler = crawler.clone();
        let tx = tx.clone();
        let cancel = cancel.clone();
        chains.spawn(async move {
            tokio::select! {
                _ = cancel.cancelled() => IndexCrawlReport::default(),
                report = crawler.crawl_into(seed, &tx) => report,
            }
        });
    }
    drop(tx);

    let mut total = IndexCrawlReport::default();
    while let Some(joined) = chains.join_next().await {
        match joined {
            Ok(report) => total.merge(&report),
            Err(e) => tracing::error!(kind = "join", "Index crawler failed: {}", e),
        }
    }
    total
}

fn lock_storage(
    storage: &Mutex<SqliteStorage>,
) -> Result<MutexGuard<'_, SqliteStorage>, StorageError> {
    storage
        .lock()
        .map_err(|_| StorageError::Database("storage lock poisoned".to_string()))
}

/// Runs the main crawl operation
///
/// Builds a [`Coordinator`], runs it until every index chain and artist page
/// is done or `cancel` fires, then writes the markdown run summary.
///
/// # Arguments
///
/// * `config` - The crawler configuration
/// * `config_hash` - Hash of the configuration file
/// * `cancel` - Token that interrupts the run
///
/// # Example
///
/// ```no_run
/// use coverage_crawler::config::load_config_with_hash;
/// use coverage_crawler::crawler::run_crawl;
/// use std::path::Path;
/// use tokio_util::sync::CancellationToken;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let (config, hash) = load_config_with_hash(Path::new("crawler.toml"))?;
/// let summary = run_crawl(config, hash, CancellationToken::new()).await?;
/// println!("{} artists stored", summary.run.totals.artists_reconciled);
/// # Ok(())
/// # }
/// ```
pub async fn run_crawl(
    config: Config,
    config_hash: String,
    cancel: CancellationToken,
) -> Result<RunSummary, CrawlError> {
    let summary_path = PathBuf::from(&config.output.summary_path);
    let coordinator = Coordinator::new(config, config_hash)?.with_cancellation(cancel);

    let summary = coordinator.run().await?;

    match generate_markdown_summary(&summary, &summary_path) {
        Ok(()) => tracing::info!("Summary written to {}", summary_path.display()),
        Err(e) => tracing::warn!(
            kind = "output",
            "Could not write summary to {}: {}",
            summary_path.display(),
            e
        ),
    }

    Ok(summary)
}
