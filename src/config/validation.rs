use crate::config::types::{Config, CrawlerConfig, OutputConfig, UserAgentConfig};
use crate::url::normalize_url;
use crate::{ConfigError, ConfigResult};
use url::Url;

/// Upper bound on the worker pool size
pub const MAX_CONCURRENCY: u32 = 256;

/// Upper bound on the retry backoff (milliseconds)
pub const MAX_RETRY_DELAY_MS: u64 = 10_000;

/// Validates the entire configuration
pub fn validate(config: &Config) -> ConfigResult<()> {
    validate_crawler_config(&config.crawler)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    Ok(())
}

/// Validates crawler configuration
fn validate_crawler_config(config: &CrawlerConfig) -> ConfigResult<()> {
    normalize_url(&config.root)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid root '{}': {}", config.root, e)))?;

    if config.concurrency < 1 || config.concurrency > MAX_CONCURRENCY {
        return Err(ConfigError::Validation(format!(
            "concurrency must be between 1 and {}, got {}",
            MAX_CONCURRENCY, config.concurrency
        )));
    }

    // max_depth and max_tries may be zero: root only / no retries

    if config.max_pages < 1 {
        return Err(ConfigError::Validation(format!(
            "max_pages must be >= 1, got {}",
            config.max_pages
        )));
    }

    if config.timeout < 1 {
        return Err(ConfigError::Validation(format!(
            "timeout must be >= 1s, got {}s",
            config.timeout
        )));
    }

    if config.retry_delay > MAX_RETRY_DELAY_MS {
        return Err(ConfigError::Validation(format!(
            "retry_delay must be <= {}ms, got {}ms",
            MAX_RETRY_DELAY_MS, config.retry_delay
        )));
    }

    if let Some(proxy) = &config.proxy {
        validate_proxy(proxy)?;
    }

    Ok(())
}

/// Validates a proxy URL (http or https proxies)
fn validate_proxy(proxy: &str) -> ConfigResult<()> {
    let url = Url::parse(proxy)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid proxy '{}': {}", proxy, e)))?;

    if url.scheme() != "http" && url.scheme() != "https" {
        return Err(ConfigError::Validation(format!(
            "proxy must use http or https, got '{}'",
            url.scheme()
        )));
    }

    Ok(())
}

/// Validates user agent configuration
fn validate_user_agent_config(config: &UserAgentConfig) -> ConfigResult<()> {
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

    if let Some(contact) = &config.contact_url {
        Url::parse(contact)
            .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;
    }

    Ok(())
}

/// Validates output configuration
fn validate_output_config(config: &OutputConfig) -> ConfigResult<()> {
    if config.report_dir.is_empty() {
        return Err(ConfigError::Validation(
            "report_dir cannot be empty".to_string(),
        ));
    }

    if let Some(title) = &config.report_title {
        if title.trim().is_empty() {
            return Err(ConfigError::Validation(
                "report_title cannot be blank".to_string(),
            ));
        }
    }

    if let Some(path) = &config.database_path {
        if path.is_empty() {
            return Err(ConfigError::Validation(
                "database_path cannot be empty".to_string(),
            ));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn crawler_config() -> CrawlerConfig {
        CrawlerConfig {
            root: "https://example.com/".to_string(),
            concurrency: 4,
            max_depth: 2,
            max_pages: 100,
            max_tries: 1,
            timeout: 5,
            retry_delay: 0,
            proxy: None,
            accept_invalid_certs: false,
        }
    }

    #[test]
    fn test_valid_crawler_config() {
        assert!(validate_crawler_config(&crawler_config()).is_ok());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = crawler_config();
        config.concurrency = 0;
        assert!(matches!(
            validate_crawler_config(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_excessive_concurrency_rejected() {
        let mut config = crawler_config();
        config.concurrency = MAX_CONCURRENCY + 1;
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_zero_max_pages_rejected() {
        let mut config = crawler_config();
        config.max_pages = 0;
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_zero_depth_and_tries_allowed() {
        let mut config = crawler_config();
        config.max_depth = 0;
        config.max_tries = 0;
        assert!(validate_crawler_config(&config).is_ok());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = crawler_config();
        config.timeout = 0;
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_retry_delay_cap() {
        let mut config = crawler_config();
        config.retry_delay = MAX_RETRY_DELAY_MS;
        assert!(validate_crawler_config(&config).is_ok());
        config.retry_delay = MAX_RETRY_DELAY_MS + 1;
        assert!(validate_crawler_config(&config).is_err());
    }

    #[test]
    fn test_malformed_root_rejected() {
        let mut config = crawler_config();
        config.root = "not a url".to_string();
        assert!(matches!(
            validate_crawler_config(&config),
            Err(ConfigError::InvalidUrl(_))
        ));

        config.root = "ftp://example.com/".to_string();
        assert!(matches!(
            validate_crawler_config(&config),
            Err(ConfigError::InvalidUrl(_))
        ));
    }

    #[test]
    fn test_proxy_validation() {
        assert!(validate_proxy("http://127.0.0.1:3128").is_ok());
        assert!(validate_proxy("https://proxy.example.com").is_ok());
        assert!(validate_proxy("socks5://127.0.0.1:1080").is_err());
        assert!(validate_proxy("nonsense").is_err());
    }

    #[test]
    fn test_crawler_name_validation() {
        let mut config = UserAgentConfig::default();
        assert!(validate_user_agent_config(&config).is_ok());

        config.crawler_name = "bad name".to_string();
        assert!(validate_user_agent_config(&config).is_err());

        config.crawler_name = String::new();
        assert!(validate_user_agent_config(&config).is_err());
    }

    #[test]
    fn test_output_validation() {
        let mut config = OutputConfig::default();
        assert!(validate_output_config(&config).is_ok());

        config.report_title = Some("   ".to_string());
        assert!(validate_output_config(&config).is_err());

        config.report_title = None;
        config.database_path = Some(String::new());
        assert!(validate_output_config(&config).is_err());
    }
}
