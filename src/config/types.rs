use serde::Deserialize;

/// Main configuration structure for Ripple-Search
///
/// Every section is optional; a missing section takes its defaults so the
/// CLI runs without a configuration file.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub index: IndexConfig,
    #[serde(default)]
    pub crawler: CrawlerConfig,
    #[serde(default, rename = "user-agent")]
    pub user_agent: UserAgentConfig,
    #[serde(default)]
    pub rank: RankConfig,
    #[serde(default)]
    pub query: QueryConfig,
}

/// Index storage configuration
#[derive(Debug, Clone, Deserialize)]
pub struct IndexConfig {
    /// Path to the SQLite database file
    #[serde(rename = "database-path", default = "default_database_path")]
    pub database_path: String,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            database_path: default_database_path(),
        }
    }
}

fn default_database_path() -> String {
    "searchindex.sqlite3".to_string()
}

/// Crawler behavior configuration
#[derive(Debug, Clone, Deserialize)]
pub struct CrawlerConfig {
    /// Number of breadth-first rounds to run from the seed URLs
    #[serde(rename = "max-depth", default = "default_max_depth")]
    pub max_depth: u32,

    /// Maximum number of fetches in flight within one round
    #[serde(
        rename = "max-concurrent-fetches",
        default = "default_max_concurrent_fetches"
    )]
    pub max_concurrent_fetches: u32,

    /// Per-request timeout (seconds)
    #[serde(
        rename = "request-timeout-secs",
        default = "default_request_timeout_secs"
    )]
    pub request_timeout_secs: u64,

    /// Terms excluded from indexing (e.g. stop words)
    #[serde(rename = "ignored-words", default)]
    pub ignored_words: Vec<String>,

    /// Optional file with one ignored word per line, merged with `ignored_words`
    #[serde(rename = "ignored-words-file", default)]
    pub ignored_words_file: Option<String>,
}

impl Default for CrawlerConfig {
    fn default() -> Self {
        Self {
            max_depth: default_max_depth(),
            max_concurrent_fetches: default_max_concurrent_fetches(),
            request_timeout_secs: default_request_timeout_secs(),
            ignored_words: Vec::new(),
            ignored_words_file: None,
        }
    }
}

fn default_max_depth() -> u32 {
    2
}

fn default_max_concurrent_fetches() -> u32 {
    4
}

fn default_request_timeout_secs() -> u64 {
    30
}

/// User agent identification configuration
#[derive(Debug, Clone, Deserialize)]
pub struct UserAgentConfig {
    /// Name of the crawler
    #[serde(rename = "crawler-name", default = "default_crawler_name")]
    pub crawler_name: String,

    /// Version of the crawler
    #[serde(rename = "crawler-version", default = "default_crawler_version")]
    pub crawler_version: String,

    /// URL with information about the crawler
    #[serde(rename = "contact-url", default)]
    pub contact_url: Option<String>,
}

impl Default for UserAgentConfig {
    fn default() -> Self {
        Self {
            crawler_name: default_crawler_name(),
            crawler_version: default_crawler_version(),
            contact_url: None,
        }
    }
}

impl UserAgentConfig {
    /// Formats the `User-Agent` header value: `Name/Version (+ContactURL)`
    pub fn header_value(&self) -> String {
        match &self.contact_url {
            Some(contact) => format!(
                "{}/{} (+{})",
                self.crawler_name, self.crawler_version, contact
            ),
            None => format!("{}/{}", self.crawler_name, self.crawler_version),
        }
    }
}

fn default_crawler_name() -> String {
    "RippleSearch".to_string()
}

fn default_crawler_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

/// PageRank configuration
#[derive(Debug, Clone, Deserialize)]
pub struct RankConfig {
    /// Number of power iterations
    #[serde(default = "default_iterations")]
    pub iterations: u32,
}

impl Default for RankConfig {
    fn default() -> Self {
        Self {
            iterations: default_iterations(),
        }
    }
}

fn default_iterations() -> u32 {
    20
}

/// Query engine configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct QueryConfig {
    /// Maximum number of results printed per query
    #[serde(default)]
    pub limit: Option<usize>,

    /// Weights of the ranking signals
    #[serde(default)]
    pub weights: SignalWeights,
}

/// Weights applied to each normalized ranking signal
#[derive(Debug, Clone, Copy, PartialEq, Deserialize)]
pub struct SignalWeights {
    #[serde(default = "default_weight")]
    pub frequency: f64,

    #[serde(default = "default_weight")]
    pub location: f64,

    #[serde(default = "default_weight")]
    pub distance: f64,

    #[serde(rename = "inbound-links", default = "default_weight")]
    pub inbound_links: f64,

    #[serde(rename = "page-rank", default = "default_weight")]
    pub page_rank: f64,
}

impl Default for SignalWeights {
    fn default() -> Self {
        Self {
            frequency: default_weight(),
            location: default_weight(),
            distance: default_weight(),
            inbound_links: default_weight(),
            page_rank: default_weight(),
        }
    }
}

impl SignalWeights {
    /// Weights that rank by PageRank alone
    pub fn page_rank_only() -> Self {
        Self {
            frequency: 0.0,
            location: 0.0,
            distance: 0.0,
            inbound_links: 0.0,
            page_rank: 1.0,
        }
    }

    pub(crate) fn as_array(&self) -> [(&'static str, f64); 5] {
        [
            ("frequency", self.frequency),
            ("location", self.location),
            ("distance", self.distance),
            ("inbound-links", self.inbound_links),
            ("page-rank", self.page_rank),
        ]
    }
}

fn default_weight() -> f64 {
    1.0
}
