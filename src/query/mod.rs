//! Query engine
//!
//! Resolves query terms, joins their postings conjunctively, and ranks the
//! matching pages by a weighted sum of five normalized signals:
//! - frequency of the query terms
//! - how early they appear
//! - how close together they appear
//! - inbound link count
//! - PageRank

mod engine;
mod signals;

pub use engine::{QueryEngine, SearchResult};
pub use signals::{match_distance, normalize, Direction, SignalScores, EPSILON};
