//! Artist index traversal
//!
//! An index is a chain of pages linked by a "next page" control. Each page
//! carries a list of links to artist detail pages. [`IndexCrawler`] walks the
//! chain from one seed and emits artist URLs as each page is processed, so
//! downstream workers can start before the chain is exhausted.

use crate::config::SelectorConfig;
use crate::crawler::fetcher::{Fetcher, RawPage};
use crate::page::Page;
use crate::url::page_key;
use std::collections::HashSet;
use std::sync::Arc;
use tokio::sync::mpsc;
use url::Url;

/// What one index chain produced
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IndexCrawlReport {
    /// Index pages fetched and parsed
    pub pages_visited: usize,

    /// Distinct artist URLs emitted
    pub artists_found: usize,

    /// Index pages without an artist list
    pub missing_lists: usize,

    /// Index pages that could not be fetched
    pub failed_pages: usize,

    /// Number of chains that ended on a next link pointing back into the chain
    pub cycles: usize,

    /// Artist or next-page links that had no usable href
    pub skipped_links: usize,
}

impl IndexCrawlReport {
    /// Adds another chain's counters to this one
    pub fn merge(&mut self, other: &IndexCrawlReport) {
        self.pages_visited += other.pages_visited;
        self.artists_found += other.artists_found;
        self.missing_lists += other.missing_lists;
        self.failed_pages += other.failed_pages;
        self.cycles += other.cycles;
        self.skipped_links += other.skipped_links;
    }
}

/// Owned data pulled out of one index page
#[derive(Debug, Default)]
struct IndexPage {
    artists: Vec<Url>,
    next: Option<Url>,
    has_list: bool,
    skipped_links: usize,
}

/// Walks one index chain
#[derive(Clone)]
pub struct IndexCrawler {
    fetcher: Arc<dyn Fetcher>,
    selectors: SelectorConfig,
}

impl IndexCrawler {
    pub fn new(fetcher: Arc<dyn Fetcher>, selectors: SelectorConfig) -> Self {
        Self { fetcher, selectors }
    }

    /// Walks the chain starting at `start`, sending each artist URL to `tx`
    ///
    /// Every call starts with an empty visited set. The walk ends when a page
    /// has no next link, when a page fails to fetch, when the next link points
    /// at a page already visited in this chain, or when the receiver is gone.
    pub async fn crawl_into(&self, start: Url, tx: &mpsc::Sender<Url>) -> IndexCrawlReport {
        let mut report = IndexCrawlReport::default();
        let mut visited = HashSet::new();
        let mut emitted = HashSet::new();
        let mut current = Some(start);

        while let Some(url) = current.take() {
            if !visited.insert(page_key(&url)) {
                tracing::warn!(
                    url = %url,
                    kind = "pagination_cycle",
                    "Next page was already visited, stopping index chain"
                );
                report.cycles += 1;
                break;
            }

            let raw = match self.fetcher.fetch(&url).await {
                Ok(raw) => raw,
                Err(e) => {
                    tracing::warn!(url = %url, kind = "fetch", "Index page failed: {}", e);
                    report.failed_pages += 1;
                    break;
                }
            };
            // Redirects land on the final URL; count it as visited too
            visited.insert(page_key(&raw.url));
            report.pages_visited += 1;

            let index = parse_index_page(&raw, &self.selectors);
            if !index.has_list {
                report.missing_lists += 1;
            }
            report.skipped_links += index.skipped_links;

            for artist in index.artists {
                if !emitted.insert(page_key(&artist)) {
                    continue;
                }
                report.artists_found += 1;
                if tx.send(artist).await.is_err() {
                    tracing::debug!(url = %url, "Artist queue closed, stopping index chain");
                    return report;
                }
            }

            current = index.next;
        }

        tracing::debug!(
            "Index chain done: {} pages, {} artists",
            report.pages_visited,
            report.artists_found
        );
        report
    }

    /// Walks the chain and collects every artist URL in discovery order
    pub async fn crawl(&self, start: Url) -> (Vec<Url>, IndexCrawlReport) {
        let (tx, mut rx) = mpsc::channel(64);

        let producer = async move { self.crawl_into(start, &tx).await };
        let consumer = async {
            let mut urls = Vec::new();
            while let Some(url) = rx.recv().await {
                urls.push(url);
            }
            urls
        };

        let (report, urls) = tokio::join!(producer, consumer);
        (urls, report)
    }
}

fn parse_index_page(raw: &RawPage, selectors: &SelectorConfig) -> IndexPage {
    let page = Page::parse(raw.url.clone(), &raw.body);
    let mut index = IndexPage::default();

    match page.select_first(&selectors.artist_list) {
        Some(list) => {
            index.has_list = true;
            for (position, anchor) in list.select_all("a").into_iter().enumerate() {
                let Some(href) = anchor.attr("href") else {
                    tracing::warn!(
                        url = %page.url(),
                        kind = "page_format",
                        "Artist link {} has no href, skipping",
                        position
                    );
                    index.skipped_links += 1;
                    continue;
                };
                match page.resolve(href) {
                    Some(url) => index.artists.push(url),
                    None => {
                        tracing::warn!(
                            url = %page.url(),
                            kind = "page_format",
                            "Artist link {} has unusable href '{}', skipping",
                            position,
                            href
                        );
                        index.skipped_links += 1;
                    }
                }
            }
        }
        None => {
            tracing::warn!(
                url = %page.url(),
                kind = "page_format",
                "Index page has no artist list"
            );
        }
    }

    // The control is either the anchor itself or a wrapper around one
    if let Some(next) = page.select_first(&selectors.next_page) {
        let href = next
            .attr("href")
            .or_else(|| next.select_first("a[href]").and_then(|a| a.attr("href")));
        match href.map(|href| (href, page.resolve(href))) {
            Some((_, Some(next))) => index.next = Some(next),
            Some((href, None)) => {
                tracing::warn!(
                    url = %page.url(),
                    kind = "page_format",
                    "Next page control has unusable href '{}', ending index chain",
                    href
                );
                index.skipped_links += 1;
            }
            None => {
                tracing::warn!(
                    url = %page.url(),
                    kind = "page_format",
                    "Next page control has no link"
                );
                index.skipped_links += 1;
            }
        }
    }

    index
}
