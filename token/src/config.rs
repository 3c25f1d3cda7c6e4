//! Token issuance configuration.

use std::env;

use chrono::Duration;
use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::{Result, TokenError};

const DEFAULT_ISSUER: &str = "idp-core";
const DEFAULT_AUDIENCE: &str = "idp-clients";
const DEFAULT_TTL_SECONDS: u64 = 3600;
const DEFAULT_LEEWAY_SECONDS: u64 = 30;

/// Issuer/audience identity and token lifetime settings.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenConfig {
    pub issuer: String,
    pub audience: String,
    /// Lifetime of issued tokens in seconds.
    pub ttl_seconds: u64,
    /// Allowed clock skew when validating expiry.
    pub leeway_seconds: u64,
}

impl TokenConfig {
    /// Load configuration, prioritizing environment variables.
    pub fn new() -> Result<Self> {
        Ok(Self {
            issuer: env::var("IDP_TOKEN_ISSUER").unwrap_or_else(|_| DEFAULT_ISSUER.to_string()),
            audience: env::var("IDP_TOKEN_AUDIENCE")
                .unwrap_or_else(|_| DEFAULT_AUDIENCE.to_string()),
            ttl_seconds: read_seconds("IDP_TOKEN_TTL_SECONDS", DEFAULT_TTL_SECONDS)?,
            leeway_seconds: read_seconds("IDP_TOKEN_LEEWAY_SECONDS", DEFAULT_LEEWAY_SECONDS)?,
        })
    }

    pub fn ttl(&self) -> Duration {
        Duration::seconds(self.ttl_seconds as i64)
    }
}

impl Default for TokenConfig {
    fn default() -> Self {
        Self::new().unwrap_or_else(|e| {
            warn!("Failed to load token config: {}. Using defaults.", e);
            Self {
                issuer: DEFAULT_ISSUER.to_string(),
                audience: DEFAULT_AUDIENCE.to_string(),
                ttl_seconds: DEFAULT_TTL_SECONDS,
                leeway_seconds: DEFAULT_LEEWAY_SECONDS,
            }
        })
    }
}

fn read_seconds(var: &str, default: u64) -> Result<u64> {
    match env::var(var) {
        Ok(value) => value
            .parse()
            .map_err(|_| TokenError::Configuration(format!("{var} is not a number: {value}"))),
        Err(_) => Ok(default),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_without_environment() {
        dotenvy::dotenv().ok();

        let config = TokenConfig::default();
        assert_eq!(config.issuer, DEFAULT_ISSUER);
        assert_eq!(config.audience, DEFAULT_AUDIENCE);
        assert_eq!(config.ttl(), Duration::seconds(3600));
    }

    #[test]
    fn test_unparseable_ttl_is_a_configuration_error() {
        std::env::set_var("IDP_TOKEN_TTL_SECONDS", "not-a-number");
        let result = TokenConfig::new();
        std::env::remove_var("IDP_TOKEN_TTL_SECONDS");

        assert!(matches!(result, Err(TokenError::Configuration(_))));
    }
}
