use crate::config::types::{Config, CrawlOptions, CrawlerConfig, UserAgentConfig};
use crate::ConfigError;

/// Upper bound on the worker count accepted from configuration
pub const MAX_CONCURRENCY: usize = 256;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(config)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> Result<(), ConfigError> {
    validate_options(&CrawlOptions::from(config))
}

/// Validates runtime crawl options
///
/// Shared by file-based configuration and CLI overrides.
pub fn validate_options(options: &CrawlOptions) -> Result<(), ConfigError> {
    if options.concurrency < 1 || options.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, options.concurrency
        )));
    }

    if options.timeout.as_secs() < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1s, got {:?}",
            options.timeout
        )));
    }

    if options.frontier_capacity < 1 {
        return Err(ConfigError::Validation(
            "frontier_capacity must be >= 1".to_string(),
        ));
    }

    if options.pool_queue_capacity < 1 {
        return Err(ConfigError::Validation(
            "pool_queue_capacity must be >= 1".to_string(),
        ));
    }

    Ok(())
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

    if config.crawler_version.trim().is_empty() {
        return Err(ConfigError::Validation(
            "crawler_version cannot be empty".to_string(),
        ));
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &Config) -> Result<(), ConfigError> {
    if let Some(path) = &config.output.summary_path {
        if path.trim().is_empty() {
            return Err(ConfigError::Validation(
                "summary_path cannot be empty when set".to_string(),
            ));
        }
    }

    Ok(())
}
