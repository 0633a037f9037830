use std::collections::HashSet;

use crate::config::types::{Config, OutputConfig, PolitenessConfig, UserAgentConfig, VendorEntry};
use crate::vendors;
use crate::ConfigError;
use url::Url;

const MAX_CONCURRENT_REQUESTS: usize = 64;

/// Validates the entire configuration
pub fn validate(config: &Config) -> Result<(), ConfigError> {
    validate_politeness_config(&config.politeness)?;
    validate_user_agent_config(&config.user_agent)?;
    validate_output_config(&config.output)?;
    validate_vendor_entries(&config.vendors)?;
    Ok(())
}

/// Validates the global politeness table
fn validate_politeness_config(config: &PolitenessConfig) -> Result<(), ConfigError> {
    validate_concurrency("politeness", config.concurrent_requests)?;
    validate_jitter("politeness", config.jitter_min_ms, config.jitter_max_ms)
}

fn validate_concurrency(scope: &str, n: usize) -> Result<(), ConfigError> {
    if !(1..=MAX_CONCURRENT_REQUESTS).contains(&n) {
        return Err(ConfigError::Validation(format!(
            "{}: concurrent_requests must be between 1 and {}, got {}",
            scope, MAX_CONCURRENT_REQUESTS, n
        )));
    }
    Ok(())
}

fn validate_jitter(scope: &str, min_ms: u64, max_ms: u64) -> Result<(), ConfigError> {
    if min_ms > max_ms {
        return Err(ConfigError::Validation(format!(
            "{}: jitter_min_ms ({}) must not exceed jitter_max_ms ({})",
            scope, min_ms, max_ms
        )));
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

    Url::parse(&config.contact_url)
        .map_err(|e| ConfigError::InvalidUrl(format!("Invalid contact_url: {}", e)))?;

    validate_email(&config.contact_email)?;

    Ok(())
}

fn validate_output_config(config: &OutputConfig) -> Result<(), ConfigError> {
    if config.records_path.trim().is_empty() {
        return Err(ConfigError::Validation(
            "records_path cannot be empty".to_string(),
        ));
    }
    Ok(())
}

/// Validates `[[vendor]]` entries: known, unique, sane overrides
fn validate_vendor_entries(entries: &[VendorEntry]) -> Result<(), ConfigError> {
    let mut seen = HashSet::new();

    for entry in entries {
        if !vendors::is_known(&entry.name) {
            return Err(ConfigError::Validation(format!(
                "Unknown vendor '{}' (known: {})",
                entry.name,
                vendors::KNOWN_VENDORS.join(", ")
            )));
        }

        if !seen.insert(entry.name.as_str()) {
            return Err(ConfigError::Validation(format!(
                "Vendor '{}' is configured more than once",
                entry.name
            )));
        }

        let scope = format!("vendor '{}'", entry.name);
        if let Some(n) = entry.concurrent_requests {
            validate_concurrency(&scope, n)?;
        }
        if let (Some(min), Some(max)) = (entry.jitter_min_ms, entry.jitter_max_ms) {
            validate_jitter(&scope, min, max)?;
        }
    }

    Ok(())
}

/// Basic email validation
fn validate_email(email: &str) -> Result<(), ConfigError> {
    if email.is_empty() {
        return Err(ConfigError::Validation(
            "contact_email cannot be empty".to_string(),
        ));
    }

    // Basic email format check: must contain @ and have text on both sides
    let parts: Vec<&str> = email.split('@').collect();
    if parts.len() != 2 {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    let local = parts[0];
    let domain = parts[1];

    if local.is_empty() || domain.is_empty() {
        return Err(ConfigError::Validation(format!(
            "Invalid email format: '{}'",
            email
        )));
    }

    if !domain.contains('.') {
        return Err(ConfigError::Validation(format!(
            "Invalid email domain: '{}'",
            email
        )));
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entry(name: &str) -> VendorEntry {
        VendorEntry {
            name: name.to_string(),
            enabled: true,
            concurrent_requests: None,
            download_delay_ms: None,
            jitter_min_ms: None,
            jitter_max_ms: None,
            obey_robots: None,
        }
    }

    #[test]
    fn test_validate_email() {
        assert!(validate_email("user@example.com").is_ok());
        assert!(validate_email("admin@sub.example.com").is_ok());

        assert!(validate_email("").is_err());
        assert!(validate_email("invalid").is_err());
        assert!(validate_email("@example.com").is_err());
        assert!(validate_email("user@").is_err());
        assert!(validate_email("user@domain").is_err());
    }

    #[test]
    fn test_concurrency_bounds() {
        assert!(validate_concurrency("politeness", 1).is_ok());
        assert!(validate_concurrency("politeness", 64).is_ok());
        assert!(validate_concurrency("politeness", 0).is_err());
        assert!(validate_concurrency("politeness", 65).is_err());
    }

    #[test]
    fn test_jitter_order() {
        assert!(validate_jitter("politeness", 0, 0).is_ok());
        assert!(validate_jitter("politeness", 100, 375).is_ok());
        assert!(validate_jitter("politeness", 400, 375).is_err());
    }

    #[test]
    fn test_vendor_entries() {
        assert!(validate_vendor_entries(&[entry("asus"), entry("avm")]).is_ok());
        assert!(validate_vendor_entries(&[entry("netgear")]).is_err());
        assert!(validate_vendor_entries(&[entry("asus"), entry("asus")]).is_err());

        let mut greedy = entry("dlink");
        greedy.concurrent_requests = Some(100);
        assert!(validate_vendor_entries(&[greedy]).is_err());
    }
}
