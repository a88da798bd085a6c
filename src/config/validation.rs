//! Configuration validation.
//!
//! Semantic checks only; serde handles the syntactic ones. Returns all
//! validation errors, not just the first, so a bad config can be fixed in one
//! pass.

use url::Url;

use crate::config::schema::RelayConfig;

/// A single semantic validation failure.
#[derive(Debug)]
pub struct ValidationError {
    pub field: String,
    pub message: String,
}

impl std::fmt::Display for ValidationError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}: {}", self.field, self.message)
    }
}

/// Validate a parsed configuration.
pub fn validate_config(config: &RelayConfig) -> Result<(), Vec<ValidationError>> {
    let mut errors = Vec::new();

    if let Some(url) = &config.upstream.provider_url {
        check_url(&mut errors, "upstream.provider_url", url);
    }

    if config.upstream.fallback_urls.is_empty() {
        errors.push(ValidationError {
            field: "upstream.fallback_urls".to_string(),
            message: "must contain at least one endpoint".to_string(),
        });
    }
    for (i, url) in config.upstream.fallback_urls.iter().enumerate() {
        check_url(&mut errors, &format!("upstream.fallback_urls[{}]", i), url);
    }

    if config.upstream.attempt_timeout_ms == 0 {
        errors.push(ValidationError {
            field: "upstream.attempt_timeout_ms".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    if config.timeouts.request_secs == 0 {
        errors.push(ValidationError {
            field: "timeouts.request_secs".to_string(),
            message: "must be greater than zero".to_string(),
        });
    }

    if errors.is_empty() {
        Ok(())
    } else {
        Err(errors)
    }
}

fn check_url(errors: &mut Vec<ValidationError>, field: &str, url: &str) {
    match Url::parse(url) {
        Ok(parsed) if parsed.scheme() == "http" || parsed.scheme() == "https" => {}
        Ok(parsed) => errors.push(ValidationError {
            field: field.to_string(),
            message: format!("unsupported scheme '{}'", parsed.scheme()),
        }),
        Err(e) => errors.push(ValidationError {
            field: field.to_string(),
            message: format!("invalid URL: {}", e),
        }),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::schema::RelayConfig;

    #[test]
    fn default_config_is_valid() {
        assert!(validate_config(&RelayConfig::default()).is_ok());
    }

    #[test]
    fn empty_fallback_list_is_rejected() {
        let mut config = RelayConfig::default();
        config.upstream.fallback_urls.clear();
        let errors = validate_config(&config).unwrap_err();
        assert!(errors.iter().any(|e| e.field == "upstream.fallback_urls"));
    }

    #[test]
    fn bad_provider_url_is_rejected() {
        let mut config = RelayConfig::default();
        config.upstream.provider_url = Some("not a url".to_string());
        assert!(validate_config(&config).is_err());
    }

    #[test]
    fn zero_attempt_timeout_is_rejected() {
        let mut config = RelayConfig::default();
        config.upstream.attempt_timeout_ms = 0;
        let errors = validate_config(&config).unwrap_err();
        assert!(errors
            .iter()
            .any(|e| e.field == "upstream.attempt_timeout_ms"));
    }
}
