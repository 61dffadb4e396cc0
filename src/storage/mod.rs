//! Storage module for the search index
//!
//! This module owns every persistent relation of the engine:
//! - URLs and words, each keyed by exact string
//! - Word locations (postings) per URL
//! - The link graph and the anchor words of each edge
//! - PageRank scores
//! - Crawl run bookkeeping

mod schema;
mod sqlite;
mod traits;

pub use schema::{get_schema_version, SCHEMA_SQL};
pub use sqlite::SqliteIndex;
pub use traits::{IndexStore, StorageError, StorageResult};

use crate::SearchError;
use std::collections::HashMap;
use std::path::Path;

/// Opens (creating if needed) the index database at `path`
pub fn open_index(path: &Path) -> Result<SqliteIndex, SearchError> {
    SqliteIndex::open(path)
}

/// A directed edge of the link graph
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LinkEdge {
    pub id: i64,
    pub from_id: i64,
    pub to_id: i64,
}

/// One row of a conjunctive join: a URL and one position per query term
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Match {
    pub url_id: i64,
    pub positions: Vec<i64>,
}

/// A link discovered on a page, already resolved to a canonical URL
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundLink {
    pub url: String,
    pub anchor_terms: Vec<String>,
}

/// Everything learned from one fetched page, committed as a unit
#[derive(Debug, Clone, Default)]
pub struct PageUpdate {
    /// Canonical URL of the page
    pub url: String,

    /// The page's terms in document order
    pub terms: Vec<String>,

    /// Outbound links in document order; repeats are kept
    pub links: Vec<OutboundLink>,
}

/// Outcome of [`IndexStore::commit_page`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageCommit {
    /// Postings and links were written
    Indexed {
        url_id: i64,
        postings: usize,
        links: usize,
    },

    /// The page already had postings; nothing was written
    Skipped { url_id: i64 },
}

impl PageCommit {
    pub fn url_id(&self) -> i64 {
        match self {
            Self::Indexed { url_id, .. } | Self::Skipped { url_id } => *url_id,
        }
    }
}

/// Read snapshot of the link graph used by the rank engine
///
/// `inbound` holds the distinct sources of each target; `out_degree` counts
/// distinct targets per source with self-loops excluded.
#[derive(Debug, Clone, Default)]
pub struct LinkGraph {
    pub url_ids: Vec<i64>,
    pub inbound: HashMap<i64, Vec<i64>>,
    pub out_degree: HashMap<i64, usize>,
}

impl LinkGraph {
    /// Builds the snapshot from every URL id and the distinct edge pairs
    pub fn from_edges(url_ids: Vec<i64>, edges: impl IntoIterator<Item = (i64, i64)>) -> Self {
        let mut inbound: HashMap<i64, Vec<i64>> = HashMap::new();
        let mut out_degree: HashMap<i64, usize> = HashMap::new();

        for (from_id, to_id) in edges {
            inbound.entry(to_id).or_default().push(from_id);
            if from_id != to_id {
                *out_degree.entry(from_id).or_default() += 1;
            }
        }

        Self {
            url_ids,
            inbound,
            out_degree,
        }
    }

    pub fn len(&self) -> usize {
        self.url_ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.url_ids.is_empty()
    }

    /// Distinct URLs linking to `url_id`
    pub fn inbound(&self, url_id: i64) -> &[i64] {
        self.inbound.get(&url_id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Distinct non-self targets of `url_id`
    pub fn out_degree(&self, url_id: i64) -> usize {
        self.out_degree.get(&url_id).copied().unwrap_or(0)
    }
}

/// A recorded crawl run
#[derive(Debug, Clone)]
pub struct CrawlRunRecord {
    pub id: i64,
    pub started_at: String,
    pub finished_at: Option<String>,
    pub seeds: Vec<String>,
    pub depth: u32,
    pub config_hash: String,
    pub pages_indexed: u64,
    pub fetch_failures: u64,
    pub status: RunStatus,
}

/// Status of a crawl run
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunStatus {
    Running,
    Completed,
    Failed,
}

impl RunStatus {
    pub fn to_db_string(&self) -> &'static str {
        match self {
            Self::Running => "running",
            Self::Completed => "completed",
            Self::Failed => "failed",
        }
    }

    pub fn from_db_string(s: &str) -> Option<Self> {
        match s {
            "running" => Some(Self::Running),
            "completed" => Some(Self::Completed),
            "failed" => Some(Self::Failed),
            _ => None,
        }
    }
}

/// Row counts across the index
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct IndexCounts {
    pub urls: u64,
    pub indexed_urls: u64,
    pub words: u64,
    pub postings: u64,
    pub links: u64,
    pub ranked_urls: u64,
}
