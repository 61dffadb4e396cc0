//! Storage traits and error types
//!
//! This module defines the trait interface for index backends and
//! associated error types.

use crate::storage::{
    CrawlRunRecord, IndexCounts, LinkEdge, LinkGraph, Match, PageCommit, PageUpdate, RunStatus,
};
use std::collections::HashSet;
use thiserror::Error;

/// Errors that can occur during storage operations
///
/// Every variant means the index cannot be trusted; callers propagate
/// these rather than skipping past them.
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("URL not found: id {0}")]
    UrlNotFound(i64),

    #[error("Crawl run not found: {0}")]
    RunNotFound(i64),

    #[error("Position overflow for URL id {0}")]
    PositionOverflow(i64),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),
}

/// Result type for storage operations
pub type StorageResult<T> = Result<T, StorageError>;

/// Trait for index backend implementations
///
/// Every mutating operation is transactional: it is either fully applied
/// or not applied at all. The crawler and the rank engine mutate the index
/// only through this trait.
pub trait IndexStore {
    // ===== URLs and Words =====

    /// Looks up a URL by exact string, inserting it if absent
    fn get_or_create_url(&mut self, url: &str) -> StorageResult<i64>;

    /// Looks up a term by exact string, inserting it if absent
    fn get_or_create_word(&mut self, term: &str) -> StorageResult<i64>;

    /// Looks up a URL without creating it
    fn url_id(&self, url: &str) -> StorageResult<Option<i64>>;

    /// Looks up a term without creating it
    fn word_id(&self, term: &str) -> StorageResult<Option<i64>>;

    /// Gets the canonical URL string for an id
    fn url_for_id(&self, url_id: i64) -> StorageResult<String>;

    // ===== Postings =====

    /// True iff at least one posting exists for the URL
    fn is_indexed(&self, url_id: i64) -> StorageResult<bool>;

    /// Same as [`IndexStore::is_indexed`], keyed by URL string; unknown URLs
    /// are not indexed
    fn is_url_indexed(&self, url: &str) -> StorageResult<bool> {
        match self.url_id(url)? {
            Some(id) => self.is_indexed(id),
            None => Ok(false),
        }
    }

    /// Writes postings for `terms`, skipping `ignored_words`
    ///
    /// Surviving terms get positions 0..n-1 in order. A no-op returning 0
    /// if the URL is already indexed.
    ///
    /// # Returns
    ///
    /// The number of postings written
    fn add_postings(
        &mut self,
        url_id: i64,
        terms: &[String],
        ignored_words: &HashSet<String>,
    ) -> StorageResult<usize>;

    /// Number of postings stored for a URL
    fn count_postings_for(&self, url_id: i64) -> StorageResult<u64>;

    // ===== Link Graph =====

    /// Records an edge and its anchor words, creating either URL if needed
    ///
    /// Duplicate edges are kept; each physical anchor counts.
    ///
    /// # Returns
    ///
    /// The id of the new edge
    fn add_link(&mut self, from_url: &str, to_url: &str, anchor_terms: &[String])
        -> StorageResult<i64>;

    /// Number of edge rows pointing at the URL
    fn inbound_count(&self, url_id: i64) -> StorageResult<u64>;

    /// Number of distinct targets linked from the URL, self-loops excluded
    fn outbound_count(&self, url_id: i64) -> StorageResult<u64>;

    /// All edges leaving a URL, in insertion order
    fn outgoing_links(&self, url_id: i64) -> StorageResult<Vec<LinkEdge>>;

    /// Anchor words recorded for an edge, in insertion order
    fn link_words(&self, link_id: i64) -> StorageResult<Vec<String>>;

    /// Read snapshot of every URL and the distinct edges between them
    fn link_graph(&self) -> StorageResult<LinkGraph>;

    // ===== Page Commit =====

    /// Applies one fetched page as a single transaction
    ///
    /// If the page is already indexed nothing is written. Otherwise any
    /// earlier outbound edges of the page are replaced by `update.links`
    /// and its postings are written.
    fn commit_page(
        &mut self,
        update: &PageUpdate,
        ignored_words: &HashSet<String>,
    ) -> StorageResult<PageCommit>;

    // ===== PageRank =====

    /// Stores the score of one URL
    fn write_page_rank(&mut self, url_id: i64, score: f64) -> StorageResult<()>;

    /// Reads the score of one URL; 0.0 if none was computed
    fn read_page_rank(&self, url_id: i64) -> StorageResult<f64>;

    /// Replaces the whole score table in one transaction
    fn replace_page_ranks(&mut self, scores: &[(i64, f64)]) -> StorageResult<()>;

    // ===== Queries =====

    /// Conjunctive join of postings
    ///
    /// Produces one [`Match`] per combination of positions such that the URL
    /// holds every word in `word_ids`, positions listed in `word_ids` order.
    /// An empty `word_ids` yields no matches.
    fn find_matches(&self, word_ids: &[i64]) -> StorageResult<Vec<Match>>;

    // ===== Crawl Runs =====

    /// Records the start of a crawl
    fn start_crawl_run(
        &mut self,
        seeds: &[String],
        depth: u32,
        config_hash: &str,
    ) -> StorageResult<i64>;

    /// Records the end of a crawl with its totals
    fn finish_crawl_run(
        &mut self,
        run_id: i64,
        status: RunStatus,
        pages_indexed: u64,
        fetch_failures: u64,
    ) -> StorageResult<()>;

    /// Gets a run by id
    fn get_crawl_run(&self, run_id: i64) -> StorageResult<CrawlRunRecord>;

    /// Most recent runs first
    fn recent_crawl_runs(&self, limit: usize) -> StorageResult<Vec<CrawlRunRecord>>;

    // ===== Statistics =====

    /// Row counts across all relations
    fn counts(&self) -> StorageResult<IndexCounts>;
}
