use crate::config::types::{CrawlConfig, DelayConfig, ThrottleConfig};
use crate::ConfigError;
use url::Url;

/// Validates the entire configuration
pub fn validate(config: &CrawlConfig) -> Result<(), ConfigError> {
    validate_seed(&config.seed)?;
    validate_scheduling(config)?;
    if let Some(throttle) = &config.throttle {
        validate_throttle(throttle)?;
    }
    validate_delay(&config.delay)?;
    Ok(())
}

/// Validates the seed URL
fn validate_seed(seed: &str) -> Result<(), ConfigError> {
    if seed.is_empty() {
        return Err(ConfigError::Validation("seed cannot be empty".to_string()));
    }

    Url::parse(seed)
        .map_err(|e| ConfigError::Validation(format!("seed is not a valid URL: {}", e)))?;

    Ok(())
}

/// Validates concurrency, limit, and timeout
fn validate_scheduling(config: &CrawlConfig) -> Result<(), ConfigError> {
    if config.concurrency < 1 {
        return Err(ConfigError::Validation(format!(
            "concurrency must be >= 1, got {}",
            config.concurrency
        )));
    }

    if config.limit == Some(0) {
        return Err(ConfigError::Validation(
            "limit must be >= 1 when set".to_string(),
        ));
    }

    if config.timeout_ms == Some(0) {
        return Err(ConfigError::Validation(
            "timeout-ms must be >= 1 when set".to_string(),
        ));
    }

    Ok(())
}

/// Validates the rate limit parameters
fn validate_throttle(throttle: &ThrottleConfig) -> Result<(), ConfigError> {
    if throttle.requests < 1 {
        return Err(ConfigError::Validation(format!(
            "throttle requests must be >= 1, got {}",
            throttle.requests
        )));
    }

    if throttle.window_ms < 1 {
        return Err(ConfigError::Validation(format!(
            "throttle window-ms must be >= 1, got {}",
            throttle.window_ms
        )));
    }

    Ok(())
}

/// Validates the delay range
fn validate_delay(delay: &DelayConfig) -> Result<(), ConfigError> {
    if let Some(max_ms) = delay.max_ms {
        if max_ms < delay.min_ms {
            return Err(ConfigError::Validation(format!(
                "delay max-ms ({}) must be >= min-ms ({})",
                max_ms, delay.min_ms
            )));
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn valid_config() -> CrawlConfig {
        CrawlConfig::new("https://example.com/")
    }

    #[test]
    fn test_valid_config_passes() {
        assert!(validate(&valid_config()).is_ok());
    }

    #[test]
    fn test_empty_seed_rejected() {
        let mut config = valid_config();
        config.seed = String::new();
        assert!(matches!(
            validate(&config),
            Err(ConfigError::Validation(_))
        ));
    }

    #[test]
    fn test_relative_seed_rejected() {
        let mut config = valid_config();
        config.seed = "/relative/path".to_string();
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_concurrency_rejected() {
        let mut config = valid_config();
        config.concurrency = 0;
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_limit_rejected() {
        let mut config = valid_config();
        config.limit = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_timeout_rejected() {
        let mut config = valid_config();
        config.timeout_ms = Some(0);
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_inverted_delay_rejected() {
        let mut config = valid_config();
        config.delay = DelayConfig {
            min_ms: 500,
            max_ms: Some(100),
        };
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_zero_throttle_requests_rejected() {
        let mut config = valid_config();
        config.throttle = Some(ThrottleConfig {
            requests: 0,
            window_ms: 1000,
        });
        assert!(validate(&config).is_err());
    }

    #[test]
    fn test_valid_throttle_passes() {
        let mut config = valid_config();
        config.throttle = Some(ThrottleConfig {
            requests: 5,
            window_ms: 1000,
        });
        assert!(validate(&config).is_ok());
    }
}
