//! Rank engine
//!
//! Computes a link-based authority score for every URL in the index. Scores
//! are recomputed from scratch on every run; nothing is updated incrementally.

mod pagerank;

pub use pagerank::{compute_page_rank, iterate, PageRankSummary, DAMPING_FACTOR};
