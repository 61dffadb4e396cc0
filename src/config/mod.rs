//! Configuration module for Ripple-Search
//!
//! This module handles loading, parsing, and validating TOML configuration files.
//!
//! # Example
//!
//! ```no_run
//! use ripple_search::config::load_config;
//! use std::path::Path;
//!
//! let config = load_config(Path::new("ripple.toml")).unwrap();
//! println!("Index lives at: {}", config.index.database_path);
//! ```

mod parser;
mod types;
mod validation;

// Re-export types
pub use types::{
    Config, CrawlerConfig, IndexConfig, QueryConfig, RankConfig, SignalWeights, UserAgentConfig,
};

// Re-export parser functions
pub use parser::{
    compute_config_hash, hash_config_content, load_config, load_config_with_hash,
    load_ignored_words,
};
