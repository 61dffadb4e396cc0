//! Statistics from the index database
//!
//! This module provides functionality for extracting and displaying
//! index statistics from the storage layer.

use crate::storage::{get_schema_version, CrawlRunRecord, IndexCounts, IndexStore};
use crate::SearchError;
use std::fmt::Write;

/// Index statistics summary
#[derive(Debug, Clone)]
pub struct IndexStatistics {
    /// Row counts across the index
    pub counts: IndexCounts,

    /// Most recent crawl runs, newest first
    pub recent_runs: Vec<CrawlRunRecord>,
}

/// Loads statistics from storage
///
/// # Arguments
///
/// * `store` - The index to query
/// * `run_limit` - How many recent crawl runs to include
///
/// # Returns
///
/// * `Ok(IndexStatistics)` - Successfully loaded statistics
/// * `Err(SearchError)` - Failed to query statistics
pub fn load_statistics(
    store: &dyn IndexStore,
    run_limit: usize,
) -> Result<IndexStatistics, SearchError> {
    Ok(IndexStatistics {
        counts: store.counts()?,
        recent_runs: store.recent_crawl_runs(run_limit)?,
    })
}

/// Wall-clock duration of a finished run
pub fn run_duration_seconds(run: &CrawlRunRecord) -> Option<i64> {
    let started = run
        .started_at
        .parse::<chrono::DateTime<chrono::Utc>>()
        .ok()?;
    let finished = run
        .finished_at
        .as_deref()?
        .parse::<chrono::DateTime<chrono::Utc>>()
        .ok()?;
    Some((finished - started).num_seconds())
}

/// Formats statistics for the terminal
pub fn render_statistics(stats: &IndexStatistics) -> String {
    let counts = &stats.counts;
    let mut out = String::new();

    let _ = writeln!(out, "=== Index Statistics ===\n");
    let _ = writeln!(out, "Overview:");
    let _ = writeln!(out, "  Schema version: {}", get_schema_version());
    let _ = writeln!(out, "  URLs known: {}", counts.urls);
    let _ = writeln!(out, "  URLs indexed: {}", counts.indexed_urls);
    let _ = writeln!(out, "  Distinct words: {}", counts.words);
    let _ = writeln!(out, "  Postings: {}", counts.postings);
    let _ = writeln!(out, "  Links: {}", counts.links);
    let _ = writeln!(out, "  Ranked URLs: {}", counts.ranked_urls);

    if counts.urls > 0 {
        let coverage = counts.indexed_urls as f64 / counts.urls as f64 * 100.0;
        let _ = writeln!(out, "  Index coverage: {:.1}%", coverage);
    }

    if counts.urls > 0 && counts.ranked_urls < counts.urls {
        let _ = writeln!(
            out,
            "\n{} URLs have no PageRank yet; run `rank` to refresh scores",
            counts.urls - counts.ranked_urls
        );
    }

    if !stats.recent_runs.is_empty() {
        let _ = writeln!(out, "\nRecent Crawl Runs:");
        for run in &stats.recent_runs {
            let duration = run_duration_seconds(run)
                .map(|s| format!("{}s", s))
                .unwrap_or_else(|| "-".to_string());
            let _ = writeln!(
                out,
                "  #{} {} depth={} indexed={} failures={} duration={} started={}",
                run.id,
                run.status.to_db_string(),
                run.depth,
                run.pages_indexed,
                run.fetch_failures,
                duration,
                run.started_at
            );
            for seed in &run.seeds {
                let _ = writeln!(out, "      seed {}", seed);
            }
        }
    }

    out
}

/// Prints statistics to stdout in a formatted manner
pub fn print_statistics(stats: &IndexStatistics) {
    print!("{}", render_statistics(stats));
}
