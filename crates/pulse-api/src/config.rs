// HTTP server configuration from environment

use anyhow::{Context, Result};
use axum::http::HeaderValue;
use pulse_storage::DEFAULT_EVENT_LIMIT;

pub const DEFAULT_BIND_ADDRESS: &str = "0.0.0.0:9000";

#[derive(Debug, Clone)]
pub struct ApiConfig {
    pub bind_address: String,
    /// Prefix for `/api/...` routes, e.g. `/analytics`. Empty means none.
    pub api_prefix: String,
    /// Only needed when the dashboard is served from a different origin.
    pub cors_origins: Vec<HeaderValue>,
    /// Events returned when a request carries no `limit`.
    pub default_event_limit: usize,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind_address: DEFAULT_BIND_ADDRESS.to_string(),
            api_prefix: String::new(),
            cors_origins: Vec::new(),
            default_event_limit: DEFAULT_EVENT_LIMIT,
        }
    }
}

impl ApiConfig {
    /// Load from environment variables:
    /// - BIND_ADDRESS (default: 0.0.0.0:9000)
    /// - API_PREFIX (default: empty)
    /// - CORS_ALLOWED_ORIGINS: comma-separated origins (default: none)
    /// - DEFAULT_EVENT_LIMIT (default: 100)
    pub fn from_env() -> Result<Self> {
        let mut config = Self::default();

        if let Some(addr) = env_non_empty("BIND_ADDRESS") {
            config.bind_address = addr;
        }
        if let Some(prefix) = env_non_empty("API_PREFIX") {
            config.api_prefix = normalize_prefix(&prefix);
        }
        if let Some(origins) = env_non_empty("CORS_ALLOWED_ORIGINS") {
            config.cors_origins = origins
                .split(',')
                .filter_map(|s| s.trim().parse().ok())
                .collect();
        }
        if let Some(limit) = env_non_empty("DEFAULT_EVENT_LIMIT") {
            let limit: usize = limit
                .parse()
                .with_context(|| format!("Invalid DEFAULT_EVENT_LIMIT: {limit}"))?;
            anyhow::ensure!(limit > 0, "DEFAULT_EVENT_LIMIT must be positive");
            config.default_event_limit = limit;
        }

        Ok(config)
    }
}

fn env_non_empty(name: &str) -> Option<String> {
    std::env::var(name)
        .ok()
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
}

/// `api/` -> `/api`
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_end_matches('/');
    if trimmed.is_empty() || trimmed.starts_with('/') {
        trimmed.to_string()
    } else {
        format!("/{trimmed}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_prefix() {
        assert_eq!(normalize_prefix("/analytics"), "/analytics");
        assert_eq!(normalize_prefix("analytics/"), "/analytics");
        assert_eq!(normalize_prefix("/"), "");
    }

    #[test]
    fn test_defaults() {
        let config = ApiConfig::default();
        assert_eq!(config.bind_address, DEFAULT_BIND_ADDRESS);
        assert!(config.api_prefix.is_empty());
        assert_eq!(config.default_event_limit, 100);
    }
}
