//! Crawler module for breadth-first page discovery and indexing
//!
//! This module contains the crawling logic, including:
//! - HTTP fetching behind the `Fetcher` trait
//! - The deduplicated frontier of each round
//! - Round coordination and per-page commits into the index

mod coordinator;
mod fetcher;
mod frontier;

pub use coordinator::{CrawlSummary, Crawler};
pub use fetcher::{build_http_client, FetchError, Fetcher, HttpFetcher};
pub use frontier::Frontier;

use crate::config::{load_ignored_words, Config};
use crate::storage::IndexStore;
use crate::url::canonicalize_url;
use crate::SearchError;

/// Runs a complete crawl with the default HTTP fetcher
///
/// This is the main entry point used by the CLI. It will:
/// 1. Canonicalize the seed URLs
/// 2. Load the ignored-word set
/// 3. Build the HTTP fetcher
/// 4. Crawl `depth` rounds, committing each page into `store`
///
/// # Arguments
///
/// * `store` - The index to write into
/// * `config` - The loaded configuration
/// * `config_hash` - Hash recorded with the crawl run
/// * `seeds` - Seed URLs as given by the operator
/// * `depth` - Number of breadth-first rounds
///
/// # Returns
///
/// * `Ok(CrawlSummary)` - Crawl finished; individual fetch failures are counted, not fatal
/// * `Err(SearchError)` - A seed was invalid or the index failed
pub async fn crawl<S: IndexStore>(
    store: &mut S,
    config: &Config,
    config_hash: &str,
    seeds: &[String],
    depth: u32,
) -> Result<CrawlSummary, SearchError> {
    let seeds = seeds
        .iter()
        .map(|seed| canonicalize_url(seed))
        .collect::<Result<Vec<_>, _>>()?;

    let ignored_words = load_ignored_words(&config.crawler)?;
    let fetcher = HttpFetcher::new(&config.user_agent, &config.crawler)?;

    Crawler::new(store, fetcher, ignored_words)
        .with_max_concurrent_fetches(config.crawler.max_concurrent_fetches as usize)
        .with_config_hash(config_hash)
        .crawl(&seeds, depth)
        .await
}
