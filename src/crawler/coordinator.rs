//! Crawler coordinator - main crawl orchestration logic
//!
//! This module contains the breadth-first crawl loop that coordinates:
//! - Fetching every page of a round concurrently
//! - Parsing pages and resolving their links
//! - Committing each page into the index, one at a time in frontier order
//! - Building the next round's frontier
//! - Recording the crawl run

use crate::crawler::fetcher::{FetchError, Fetcher};
use crate::crawler::frontier::Frontier;
use crate::parser::{parse_document, tokenize};
use crate::storage::{IndexStore, OutboundLink, PageCommit, PageUpdate, RunStatus};
use crate::url::resolve_link;
use crate::SearchError;
use std::collections::HashSet;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use url::Url;

/// Default bound on fetches in flight within one round
const DEFAULT_MAX_CONCURRENT_FETCHES: usize = 4;

/// Totals for one crawl
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CrawlSummary {
    /// Id of the recorded crawl run
    pub run_id: i64,

    /// Rounds that had a non-empty frontier
    pub rounds: u32,

    /// Pages whose content was retrieved
    pub pages_fetched: u64,

    /// Pages that received postings during this crawl
    pub pages_indexed: u64,

    /// Pages that were already indexed and left untouched
    pub pages_skipped: u64,

    /// Pages that could not be retrieved
    pub fetch_failures: u64,

    /// Link edges written
    pub links_recorded: u64,
}

/// A fetched page turned into an index update
struct ParsedPage {
    update: PageUpdate,
    targets: Vec<Url>,
}

/// Breadth-first crawler writing into an index store
///
/// The store is borrowed for the whole crawl and is only ever touched from
/// the crawl loop itself; fetch tasks see nothing but the fetcher.
pub struct Crawler<'a, S, F> {
    store: &'a mut S,
    fetcher: Arc<F>,
    ignored_words: HashSet<String>,
    max_concurrent_fetches: usize,
    config_hash: String,
}

impl<'a, S: IndexStore, F: Fetcher> Crawler<'a, S, F> {
    /// Creates a new crawler
    ///
    /// # Arguments
    ///
    /// * `store` - The index to commit pages into
    /// * `fetcher` - Source of page content
    /// * `ignored_words` - Terms never written as postings
    pub fn new(store: &'a mut S, fetcher: F, ignored_words: HashSet<String>) -> Self {
        Self {
            store,
            fetcher: Arc::new(fetcher),
            ignored_words,
            max_concurrent_fetches: DEFAULT_MAX_CONCURRENT_FETCHES,
            config_hash: String::new(),
        }
    }

    /// Sets how many fetches of one round may be in flight at once
    pub fn with_max_concurrent_fetches(mut self, max: usize) -> Self {
        self.max_concurrent_fetches = max.max(1);
        self
    }

    /// Sets the configuration hash recorded with the crawl run
    pub fn with_config_hash(mut self, hash: impl Into<String>) -> Self {
        self.config_hash = hash.into();
        self
    }

    /// Crawls `depth` breadth-first rounds starting from `seeds`
    ///
    /// Fetch failures are logged and counted; storage failures abort the
    /// crawl and mark the run as failed.
    ///
    /// # Returns
    ///
    /// * `Ok(CrawlSummary)` - Totals for the crawl
    /// * `Err(SearchError)` - The index could not be written
    pub async fn crawl(&mut self, seeds: &[Url], depth: u32) -> Result<CrawlSummary, SearchError> {
        let seed_strings: Vec<String> = seeds.iter().map(|s| s.to_string()).collect();
        let run_id = self
            .store
            .start_crawl_run(&seed_strings, depth, &self.config_hash)?;

        tracing::info!(
            "Starting crawl run {} with {} seeds, depth {}",
            run_id,
            seeds.len(),
            depth
        );
        let start_time = Instant::now();

        let mut summary = CrawlSummary {
            run_id,
            ..CrawlSummary::default()
        };

        match self.run_rounds(seeds, depth, &mut summary).await {
            Ok(()) => {
                self.store.finish_crawl_run(
                    run_id,
                    RunStatus::Completed,
                    summary.pages_indexed,
                    summary.fetch_failures,
                )?;
                tracing::info!(
                    "Crawl completed: {} pages indexed, {} skipped, {} failed in {:?}",
                    summary.pages_indexed,
                    summary.pages_skipped,
                    summary.fetch_failures,
                    start_time.elapsed()
                );
                Ok(summary)
            }
            Err(e) => {
                tracing::error!("Crawl run {} failed: {}", run_id, e);
                if let Err(mark) = self.store.finish_crawl_run(
                    run_id,
                    RunStatus::Failed,
                    summary.pages_indexed,
                    summary.fetch_failures,
                ) {
                    tracing::error!("Could not mark run {} as failed: {}", run_id, mark);
                }
                Err(e)
            }
        }
    }

    async fn run_rounds(
        &mut self,
        seeds: &[Url],
        depth: u32,
        summary: &mut CrawlSummary,
    ) -> Result<(), SearchError> {
        let mut frontier = Frontier::from_urls(seeds.iter().cloned());
        let mut visited: HashSet<String> = HashSet::new();

        for round in 1..=depth {
            if frontier.is_empty() {
                tracing::info!("Frontier is empty, stopping after {} rounds", round - 1);
                break;
            }

            summary.rounds += 1;
            tracing::info!("Round {}/{}: {} pages", round, depth, frontier.len());

            let pages = frontier.into_urls();
            visited.extend(pages.iter().map(|url| url.to_string()));

            let fetched = self.fetch_round(&pages).await;
            let mut next = Frontier::new();

            for (url, result) in pages.iter().zip(fetched) {
                let html = match result {
                    Ok(html) => html,
                    Err(e) => {
                        tracing::warn!("Skipping {}: {}", url, e);
                        summary.fetch_failures += 1;
                        continue;
                    }
                };
                summary.pages_fetched += 1;

                let page = parse_page(url, &html);
                match self.store.commit_page(&page.update, &self.ignored_words)? {
                    PageCommit::Indexed {
                        url_id,
                        postings,
                        links,
                    } => {
                        tracing::debug!(
                            "Indexed {} (id {}): {} postings, {} links",
                            url,
                            url_id,
                            postings,
                            links
                        );
                        summary.pages_indexed += 1;
                        summary.links_recorded += links as u64;
                    }
                    PageCommit::Skipped { url_id } => {
                        tracing::debug!("{} (id {}) is already indexed", url, url_id);
                        summary.pages_skipped += 1;
                    }
                }

                for target in page.targets {
                    let key = target.as_str();
                    if visited.contains(key) || next.contains(key) {
                        continue;
                    }
                    if self.store.is_url_indexed(key)? {
                        continue;
                    }
                    tracing::trace!("Scheduling {} for round {}", target, round + 1);
                    next.push(target);
                }
            }

            frontier = next;
        }

        Ok(())
    }

    /// Fetches every page of a round, at most `max_concurrent_fetches` at once
    ///
    /// Results come back aligned with `pages`. A fetch task that dies without
    /// reporting leaves its page as a network failure.
    async fn fetch_round(&self, pages: &[Url]) -> Vec<Result<String, FetchError>> {
        let semaphore = Arc::new(Semaphore::new(self.max_concurrent_fetches));
        let mut tasks = JoinSet::new();

        for (slot, url) in pages.iter().enumerate() {
            let fetcher = Arc::clone(&self.fetcher);
            let semaphore = Arc::clone(&semaphore);
            let url = url.clone();

            tasks.spawn(async move {
                let result = match semaphore.acquire_owned().await {
                    Ok(_permit) => fetcher.fetch(&url).await,
                    Err(e) => Err(FetchError::Network(e.to_string())),
                };
                (slot, result)
            });
        }

        let mut results: Vec<Option<Result<String, FetchError>>> = vec![None; pages.len()];
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((slot, result)) => results[slot] = Some(result),
                Err(e) => tracing::warn!("Fetch task failed: {}", e),
            }
        }

        results
            .into_iter()
            .zip(pages)
            .map(|(result, url)| {
                result.unwrap_or_else(|| {
                    Err(FetchError::Network(format!("fetch task for {} did not finish", url)))
                })
            })
            .collect()
    }
}

/// Parses one page into its postings and resolved outbound links
///
/// Links that do not resolve to an http(s) URL are dropped; repeats are kept.
fn parse_page(url: &Url, html: &str) -> ParsedPage {
    let document = parse_document(html);

    let mut links = Vec::with_capacity(document.links.len());
    let mut targets = Vec::with_capacity(document.links.len());

    for raw in &document.links {
        let Some(target) = resolve_link(url, &raw.href) else {
            tracing::debug!("Ignoring link {:?} on {}", raw.href, url);
            continue;
        };
        links.push(OutboundLink {
            url: target.to_string(),
            anchor_terms: tokenize(&raw.anchor_text),
        });
        targets.push(target);
    }

    ParsedPage {
        update: PageUpdate {
            url: url.to_string(),
            terms: tokenize(&document.text),
            links,
        },
        targets,
    }
}
