//! PageRank power iteration over the stored link graph

use crate::storage::{IndexStore, LinkGraph};
use crate::SearchError;
use std::collections::HashMap;

/// Probability of following a link rather than jumping to a random page
pub const DAMPING_FACTOR: f64 = 0.85;

/// Outcome of one PageRank computation
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PageRankSummary {
    /// Number of URLs scored
    pub urls: usize,

    /// Iterations performed
    pub iterations: u32,

    /// Sum of all scores after the last iteration
    pub total_score: f64,
}

/// Computes PageRank for every URL and replaces the stored scores
///
/// Every iteration reads only the scores of the previous one. Each page keeps
/// a virtual link to itself, so its out-degree is the number of distinct
/// other pages it links to plus one. The score table is rewritten once, after
/// the final iteration.
///
/// # Arguments
///
/// * `store` - The index holding the link graph
/// * `iterations` - Number of power iterations; no convergence check is made
///
/// # Returns
///
/// * `Ok(PageRankSummary)` - Scores written
/// * `Err(SearchError)` - The graph could not be read or the scores written
pub fn compute_page_rank<S: IndexStore>(
    store: &mut S,
    iterations: u32,
) -> Result<PageRankSummary, SearchError> {
    let graph = store.link_graph()?;

    if graph.is_empty() {
        tracing::info!("No URLs in the index, nothing to rank");
        store.replace_page_ranks(&[])?;
        return Ok(PageRankSummary {
            iterations,
            ..PageRankSummary::default()
        });
    }

    tracing::info!(
        "Computing PageRank for {} URLs over {} iterations",
        graph.len(),
        iterations
    );

    let scores = iterate(&graph, iterations);
    let total_score = scores.values().sum();

    let rows: Vec<(i64, f64)> = graph
        .url_ids
        .iter()
        .map(|id| (*id, scores.get(id).copied().unwrap_or(0.0)))
        .collect();
    store.replace_page_ranks(&rows)?;

    tracing::info!("PageRank written, total score {:.6}", total_score);

    Ok(PageRankSummary {
        urls: graph.len(),
        iterations,
        total_score,
    })
}

/// Runs `iterations` synchronous updates starting from the uniform distribution
pub fn iterate(graph: &LinkGraph, iterations: u32) -> HashMap<i64, f64> {
    let n = graph.len() as f64;
    let floor = (1.0 - DAMPING_FACTOR) / n;

    let mut scores: HashMap<i64, f64> = graph.url_ids.iter().map(|id| (*id, 1.0 / n)).collect();

    for iteration in 0..iterations {
        let mut next = HashMap::with_capacity(scores.len());

        for &url_id in &graph.url_ids {
            let sources = graph
                .inbound(url_id)
                .iter()
                .copied()
                .filter(|&from_id| from_id != url_id)
                .chain(std::iter::once(url_id));

            let inflow: f64 = sources
                .map(|from_id| {
                    let score = scores.get(&from_id).copied().unwrap_or(0.0);
                    score / (graph.out_degree(from_id) + 1) as f64
                })
                .sum();

            next.insert(url_id, floor + DAMPING_FACTOR * inflow);
        }

        scores = next;
        tracing::trace!("PageRank iteration {} done", iteration + 1);
    }

    scores
}
