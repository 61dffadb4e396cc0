use crate::config::types::{Config, CrawlerConfig};
use crate::config::validation::{is_single_term, validate};
use crate::ConfigError;
use sha2::{Digest, Sha256};
use std::collections::HashSet;
use std::path::Path;

/// Loads and parses a configuration file from the given path
///
/// # Arguments
///
/// * `path` - Path to the TOML configuration file
///
/// # Returns
///
/// * `Ok(Config)` - Successfully loaded and validated configuration
/// * `Err(ConfigError)` - Failed to load, parse, or validate the configuration
///
/// # Example
///
/// ```no_run
/// use std::path::Path;
/// use ripple_search::config::load_config;
///
/// let config = load_config(Path::new("ripple.toml")).unwrap();
/// println!("Crawl depth: {}", config.crawler.max_depth);
/// ```
pub fn load_config(path: &Path) -> Result<Config, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    let config: Config = toml::from_str(&content)?;
    validate(&config)?;
    Ok(config)
}

/// Computes a SHA-256 hash of the configuration file content
///
/// Recorded with every crawl run so an index can be traced back to the
/// settings that built it.
pub fn compute_config_hash(path: &Path) -> Result<String, ConfigError> {
    let content = std::fs::read_to_string(path)?;
    Ok(hash_config_content(&content))
}

/// Hex-encoded SHA-256 of raw configuration text
pub fn hash_config_content(content: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(content.as_bytes());
    hex::encode(hasher.finalize())
}

/// Loads a configuration and returns both the config and its hash
pub fn load_config_with_hash(path: &Path) -> Result<(Config, String), ConfigError> {
    let config = load_config(path)?;
    let hash = compute_config_hash(path)?;
    Ok((config, hash))
}

/// Builds the operator's ignored-word set
///
/// Merges `ignored-words` with the lines of `ignored-words-file` (blank
/// lines and `#` comments skipped). Words are lower-cased to match the
/// tokenizer's output. A file entry the tokenizer would split, such as
/// `e-mail`, is rejected.
pub fn load_ignored_words(config: &CrawlerConfig) -> Result<HashSet<String>, ConfigError> {
    let mut words: HashSet<String> = config
        .ignored_words
        .iter()
        .map(|w| w.trim().to_lowercase())
        .collect();

    if let Some(path) = &config.ignored_words_file {
        let content = std::fs::read_to_string(path)?;
        for line in content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty() && !line.starts_with('#'))
        {
            if !is_single_term(line) {
                return Err(ConfigError::Validation(format!(
                    "{}: ignored word '{}' is not a single letters-and-digits term",
                    path, line
                )));
            }
            words.insert(line.to_lowercase());
        }
    }

    Ok(words)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn create_temp_config(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().unwrap();
        file.write_all(content.as_bytes()).unwrap();
        file.flush().unwrap();
        file
    }

    #[test]
    fn test_load_valid_config() {
        let config_content = r#"
[index]
database-path = "./test.db"

[crawler]
max-depth = 3
max-concurrent-fetches = 8
request-timeout-secs = 5
ignored-words = ["the", "and"]

[user-agent]
crawler-name = "TestCrawler"
crawler-version = "1.0"
contact-url = "https://example.com/about"

[rank]
iterations = 16

[query]
limit = 25

[query.weights]
frequency = 0.5
page-rank = 2.0
"#;

        let file = create_temp_config(config_content);
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.index.database_path, "./test.db");
        assert_eq!(config.crawler.max_depth, 3);
        assert_eq!(config.crawler.max_concurrent_fetches, 8);
        assert_eq!(config.crawler.ignored_words.len(), 2);
        assert_eq!(config.user_agent.crawler_name, "TestCrawler");
        assert_eq!(config.rank.iterations, 16);
        assert_eq!(config.query.limit, Some(25));
        assert_eq!(config.query.weights.frequency, 0.5);
        assert_eq!(config.query.weights.location, 1.0);
        assert_eq!(config.query.weights.page_rank, 2.0);
    }

    #[test]
    fn test_empty_config_uses_defaults() {
        let file = create_temp_config("");
        let config = load_config(file.path()).unwrap();

        assert_eq!(config.index.database_path, "searchindex.sqlite3");
        assert_eq!(config.crawler.max_depth, 2);
        assert_eq!(config.rank.iterations, 20);
        assert!(config.query.limit.is_none());
    }

    #[test]
    fn test_load_config_with_invalid_path() {
        let result = load_config(Path::new("/nonexistent/config.toml"));
        assert!(result.is_err());
    }

    #[test]
    fn test_load_config_with_invalid_toml() {
        let file = create_temp_config("this is not valid TOML {{{");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Parse(_))));
    }

    #[test]
    fn test_load_config_with_validation_error() {
        let file = create_temp_config("[rank]\niterations = 0\n");
        let result = load_config(file.path());
        assert!(matches!(result, Err(ConfigError::Validation(_))));
    }

    #[test]
    fn test_compute_config_hash() {
        let file = create_temp_config("test content");

        let hash1 = compute_config_hash(file.path()).unwrap();
        let hash2 = compute_config_hash(file.path()).unwrap();

        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn test_different_content_different_hash() {
        let file1 = create_temp_config("content 1");
        let file2 = create_temp_config("content 2");

        let hash1 = compute_config_hash(file1.path()).unwrap();
        let hash2 = compute_config_hash(file2.path()).unwrap();

        assert_ne!(hash1, hash2);
    }

    #[test]
    fn test_load_ignored_words_merges_file() {
        let words_file = create_temp_config("# stop words\nThe\n\nof\n");
        let config = CrawlerConfig {
            ignored_words: vec!["AND".to_string()],
            ignored_words_file: Some(words_file.path().display().to_string()),
            ..CrawlerConfig::default()
        };

        let words = load_ignored_words(&config).unwrap();
        assert_eq!(words.len(), 3);
        assert!(words.contains("the"));
        assert!(words.contains("of"));
        assert!(words.contains("and"));
    }

    #[test]
    fn test_load_ignored_words_rejects_split_terms() {
        let words_file = create_temp_config("the
don't
");
        let config = CrawlerConfig {
            ignored_words_file: Some(words_file.path().display().to_string()),
            ..CrawlerConfig::default()
        };

        let err = load_ignored_words(&config).unwrap_err();
        assert!(matches!(err, ConfigError::Validation(msg) if msg.contains("don't")));
    }
}
