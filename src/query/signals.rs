//! Per-URL relevance signals computed from conjunctive matches
//!
//! Every signal maps each matching URL to a value in `[0, 1]` where the best
//! raw value maps to exactly 1.0.

use crate::storage::Match;
use std::collections::HashMap;

/// Floor for normalization denominators
pub const EPSILON: f64 = 0.000001;

/// Which end of a raw signal is better
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    LargerIsBetter,
    SmallerIsBetter,
}

/// Normalized signal values of one URL
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct SignalScores {
    pub frequency: f64,
    pub location: f64,
    pub distance: f64,
    pub inbound_links: f64,
    pub page_rank: f64,
}

impl SignalScores {
    pub fn as_array(&self) -> [(&'static str, f64); 5] {
        [
            ("frequency", self.frequency),
            ("location", self.location),
            ("distance", self.distance),
            ("inbound-links", self.inbound_links),
            ("page-rank", self.page_rank),
        ]
    }
}

/// Scales raw values into `[0, 1]`
///
/// Larger-is-better divides by the maximum; smaller-is-better divides the
/// minimum by each value. Both denominators are floored at [`EPSILON`].
pub fn normalize(raw: &HashMap<i64, f64>, direction: Direction) -> HashMap<i64, f64> {
    if raw.is_empty() {
        return HashMap::new();
    }

    match direction {
        Direction::LargerIsBetter => {
            let max = raw.values().copied().fold(f64::MIN, f64::max);
            let denominator = if max <= 0.0 { EPSILON } else { max };
            raw.iter()
                .map(|(url_id, value)| (*url_id, value / denominator))
                .collect()
        }
        Direction::SmallerIsBetter => {
            let min = raw.values().copied().fold(f64::MAX, f64::min).max(EPSILON);
            raw.iter()
                .map(|(url_id, value)| (*url_id, min / value.max(EPSILON)))
                .collect()
        }
    }
}

/// Number of match rows per URL
pub fn frequency(matches: &[Match]) -> HashMap<i64, f64> {
    let mut counts: HashMap<i64, f64> = HashMap::new();
    for m in matches {
        *counts.entry(m.url_id).or_default() += 1.0;
    }
    normalize(&counts, Direction::LargerIsBetter)
}

/// Smallest sum of term positions per URL
pub fn location(matches: &[Match]) -> HashMap<i64, f64> {
    let mut best: HashMap<i64, f64> = HashMap::new();
    for m in matches {
        let sum = m.positions.iter().sum::<i64>() as f64;
        best.entry(m.url_id)
            .and_modify(|current| *current = current.min(sum))
            .or_insert(sum);
    }
    normalize(&best, Direction::SmallerIsBetter)
}

/// Spread of one match: summed gaps between consecutive term positions
pub fn match_distance(positions: &[i64]) -> i64 {
    positions.windows(2).map(|pair| (pair[1] - pair[0]).abs()).sum()
}

/// Smallest term spread per URL; 1.0 everywhere for single-term queries
pub fn distance(matches: &[Match]) -> HashMap<i64, f64> {
    let single_term = matches.first().map_or(true, |m| m.positions.len() <= 1);
    if single_term {
        return matches.iter().map(|m| (m.url_id, 1.0)).collect();
    }

    let mut best: HashMap<i64, f64> = HashMap::new();
    for m in matches {
        let spread = match_distance(&m.positions) as f64;
        best.entry(m.url_id)
            .and_modify(|current| *current = current.min(spread))
            .or_insert(spread);
    }
    normalize(&best, Direction::SmallerIsBetter)
}
