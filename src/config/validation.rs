use crate::config::types::{
    Config, CrawlerConfig, IndexConfig, QueryConfig, RankConfig, UserAgentConfig,
};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_index_config(&config.index)?;
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_rank_config(&config.rank)?;
    validate_query_config(&config.query)?;
    Ok(())
}

fn validate_index_config(config: &IndexConfig) -> Result<(), ConfigError> {
    if config.database_path.is_empty() {
        return Err(ConfigError::Validation(
            "database_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    if config.max_concurrent_fetches < 1 || config.max_concurrent_fetches > 64 {
        return Err(ConfigError::Validation(format!(
            "max_concurrent_fetches must be between 1 and 64, got {}",
            config.max_concurrent_fetches
        )));
    }

    if config.request_timeout_secs < 1 {
        return Err(ConfigError::Validation(format!(
            "request_timeout_secs must be >= 1, got {}",
            config.request_timeout_secs
        )));
    }

    if let Some(word) = config.ignored_words.iter().find(|w| w.trim().is_empty()) {
        return Err(ConfigError::Validation(format!(
            "ignored_words cannot contain blank entries, got '{}'",
            word
        )));
    }

    if let Some(word) = config.ignored_words.iter().find(|w| !is_single_term(w)) {
        return Err(ConfigError::Validation(format!(
            "ignored_words entries must be a single letters-and-digits term, got '{}'",
            word
        )));
    }

    Ok(())
}

/// True when the tokenizer turns `word` into exactly one term
pub(crate) fn is_single_term(word: &str) -> bool {
    let trimmed = word.trim();
    !trimmed.is_empty() && trimmed.chars().all(char::is_alphanumeric)
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> Result<(), ConfigError> {
    // Validate crawler name: non-empty, alphanumeric + hyphens only
    if config.crawler_name.is_empty() {
        return Err(ConfigError::Validation(
            "crawler_name cannot be empty".to_string(),
        ));
    }

    if !config
        .crawler_name
        .chars()
        .all(|c| c.is_alphanumeric() || c == '-')
    {
        return Err(ConfigError::Validation(format!(
            "crawler_name must contain only alphanumeric characters and hyphens, got '{}'",
            config.crawler_name
        )));
    }

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

fn validate_rank_config(config: &RankConfig) -> Result<(), ConfigError> {
    if config.iterations < 1 {
        return Err(ConfigError::Validation(
            "rank iterations must be >= 1".to_string(),
        ));
    }
    Ok(())
}

/// Validates query weights: finite, non-negative, not all zero
fn validate_query_config(config: &QueryConfig) -> Result<(), ConfigError> {
    if config.limit == Some(0) {
        return Err(ConfigError::Validation(
            "query limit must be >= 1 when set".to_string(),
        ));
    }

    let weights = config.weights.as_array();
    for (name, weight) in weights {
        if !weight.is_finite() || weight < 0.0 {
            return Err(ConfigError::Validation(format!(
                "weight '{}' must be a non-negative number, got {}",
                name, weight
            )));
        }
    }

    if weights.iter().all(|(_, weight)| *weight == 0.0) {
        return Err(ConfigError::Validation(
            "at least one query weight must be positive".to_string(),
        ));
    }

    Ok(())
}
