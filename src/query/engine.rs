//! Query engine: conjunctive lookup and weighted ranking

use crate::config::SignalWeights;
use crate::parser::tokenize;
use crate::query::signals::{self, Direction, SignalScores};
use crate::storage::{IndexStore, Match};
use crate::SearchError;
use std::collections::{HashMap, HashSet};

/// One ranked hit
#[derive(Debug, Clone, PartialEq)]
pub struct SearchResult {
    /// Weighted sum of the signals
    pub score: f64,

    /// Canonical URL of the page
    pub url: String,

    pub url_id: i64,

    /// Normalized signal values the score was built from
    pub signals: SignalScores,
}

/// Answers queries against an index
///
/// Holds no state between calls beyond the store reference and weights.
pub struct QueryEngine<'a, S> {
    store: &'a S,
    weights: SignalWeights,
}

impl<'a, S: IndexStore> QueryEngine<'a, S> {
    /// Creates an engine with every signal weighted 1.0
    pub fn new(store: &'a S) -> Self {
        Self {
            store,
            weights: SignalWeights::default(),
        }
    }

    pub fn with_weights(mut self, weights: SignalWeights) -> Self {
        self.weights = weights;
        self
    }

    /// Looks up the word ids of the query terms, in query order
    ///
    /// Terms never seen by the indexer are dropped.
    pub fn resolve_terms(&self, query: &str) -> Result<Vec<i64>, SearchError> {
        let mut word_ids = Vec::new();
        for term in tokenize(query) {
            match self.store.word_id(&term)? {
                Some(id) => word_ids.push(id),
                None => tracing::debug!("Dropping unknown query term '{}'", term),
            }
        }
        Ok(word_ids)
    }

    /// Runs a query and returns hits best first
    ///
    /// Only pages containing every known query term are returned. A query
    /// with no known terms yields an empty list.
    ///
    /// # Arguments
    ///
    /// * `query` - Free text; tokenized the same way as indexed pages
    ///
    /// # Returns
    ///
    /// * `Ok(Vec<SearchResult>)` - Hits sorted by descending score
    /// * `Err(SearchError)` - The index could not be read
    pub fn search(&self, query: &str) -> Result<Vec<SearchResult>, SearchError> {
        let word_ids = self.resolve_terms(query)?;
        if word_ids.is_empty() {
            return Ok(Vec::new());
        }

        let matches = self.store.find_matches(&word_ids)?;
        tracing::debug!(
            "Query '{}' resolved {} terms, {} match rows",
            query,
            word_ids.len(),
            matches.len()
        );

        let url_ids = distinct_urls(&matches);
        let signals = self.score_signals(&matches, &url_ids)?;

        let mut results = Vec::with_capacity(url_ids.len());
        for url_id in url_ids {
            let signals = signals.get(&url_id).copied().unwrap_or_default();
            results.push(SearchResult {
                score: self.combine(&signals),
                url: self.store.url_for_id(url_id)?,
                url_id,
                signals,
            });
        }

        results.sort_by(|a, b| b.score.total_cmp(&a.score));
        Ok(results)
    }

    fn score_signals(
        &self,
        matches: &[Match],
        url_ids: &[i64],
    ) -> Result<HashMap<i64, SignalScores>, SearchError> {
        let frequency = signals::frequency(matches);
        let location = signals::location(matches);
        let distance = signals::distance(matches);

        let mut inbound_raw = HashMap::with_capacity(url_ids.len());
        let mut page_rank = HashMap::with_capacity(url_ids.len());
        for &url_id in url_ids {
            inbound_raw.insert(url_id, self.store.inbound_count(url_id)? as f64);
            page_rank.insert(url_id, self.store.read_page_rank(url_id)?);
        }
        let inbound = signals::normalize(&inbound_raw, Direction::LargerIsBetter);

        let value =
            |map: &HashMap<i64, f64>, url_id: i64| map.get(&url_id).copied().unwrap_or(0.0);

        Ok(url_ids
            .iter()
            .map(|&url_id| {
                let scores = SignalScores {
                    frequency: value(&frequency, url_id),
                    location: value(&location, url_id),
                    distance: value(&distance, url_id),
                    inbound_links: value(&inbound, url_id),
                    page_rank: value(&page_rank, url_id),
                };
                (url_id, scores)
            })
            .collect())
    }

    fn combine(&self, signals: &SignalScores) -> f64 {
        self.weights
            .as_array()
            .iter()
            .zip(signals.as_array())
            .map(|((_, weight), (_, value))| weight * value)
            .sum()
    }
}

/// URL ids of `matches` in first-seen order
fn distinct_urls(matches: &[Match]) -> Vec<i64> {
    let mut seen = HashSet::new();
    matches
        .iter()
        .map(|m| m.url_id)
        .filter(|url_id| seen.insert(*url_id))
        .collect()
}
