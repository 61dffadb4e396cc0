//! Crawl frontier
//!
//! The frontier holds the pages scheduled for one breadth-first round. It keeps
//! discovery order and drops repeats, so each URL is fetched at most once per
//! round no matter how many pages link to it.

use std::collections::HashSet;
use url::Url;

/// Ordered, deduplicated set of URLs for one crawl round
#[derive(Debug, Clone, Default)]
pub struct Frontier {
    /// URLs in the order they were first scheduled
    urls: Vec<Url>,

    /// String forms of `urls`, for membership checks
    seen: HashSet<String>,
}

impl Frontier {
    /// Creates an empty frontier
    pub fn new() -> Self {
        Self::default()
    }

    /// Creates a frontier from seed URLs, dropping repeats
    pub fn from_urls(urls: impl IntoIterator<Item = Url>) -> Self {
        let mut frontier = Self::new();
        for url in urls {
            frontier.push(url);
        }
        frontier
    }

    /// Schedules `url` unless it is already scheduled
    ///
    /// # Returns
    ///
    /// `true` if the URL was added
    pub fn push(&mut self, url: Url) -> bool {
        if !self.seen.insert(url.as_str().to_string()) {
            return false;
        }
        self.urls.push(url);
        true
    }

    pub fn contains(&self, url: &str) -> bool {
        self.seen.contains(url)
    }

    pub fn len(&self) -> usize {
        self.urls.len()
    }

    pub fn is_empty(&self) -> bool {
        self.urls.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Url> {
        self.urls.iter()
    }

    /// Consumes the frontier, yielding its URLs in scheduling order
    pub fn into_urls(self) -> Vec<Url> {
        self.urls
    }
}
