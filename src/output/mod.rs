//! Output module for query results and index reports
//!
//! This module handles:
//! - Formatting ranked query results, one `score<TAB>url` line each
//! - Loading and printing index statistics

pub mod stats;

pub use stats::{load_statistics, print_statistics, render_statistics, IndexStatistics};

use crate::query::SearchResult;

/// Formats one query result as `score<TAB>url`
///
/// With `explain`, the normalized signal values follow on the same line.
pub fn format_result(result: &SearchResult, explain: bool) -> String {
    let mut line = format!("{:.6}\t{}", result.score, result.url);

    if explain {
        let signals: Vec<String> = result
            .signals
            .as_array()
            .iter()
            .map(|(name, value)| format!("{}={:.4}", name, value))
            .collect();
        line.push('\t');
        line.push_str(&signals.join(" "));
    }

    line
}

/// Formats up to `limit` results, best first
pub fn format_results(
    results: &[SearchResult],
    limit: Option<usize>,
    explain: bool,
) -> Vec<String> {
    results
        .iter()
        .take(limit.unwrap_or(usize::MAX))
        .map(|result| format_result(result, explain))
        .collect()
}
