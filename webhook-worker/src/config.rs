//! Configuration module for environment variable parsing.
//!
//! Secrets (the application public key and the Better Stack source token) are
//! supplied by the hosting environment; everything else has a default.

use std::env;

use anyhow::{bail, Context, Result};
use tracing::warn;
use url::Url;

/// Default Better Stack HTTP ingestion endpoint.
pub const DEFAULT_BETTER_STACK_URL: &str = "https://in.logs.betterstack.com";

/// Application configuration loaded from environment variables.
#[derive(Debug, Clone)]
pub struct Config {
    /// Hex-encoded Ed25519 public key of the application
    pub public_key: String,

    /// Better Stack source token; shipping is disabled when unset
    pub better_stack_token: Option<String>,

    /// Better Stack ingestion endpoint
    pub better_stack_url: Url,

    /// Port for the web server to listen on
    pub port: u16,

    /// HTTP timeout for a single log shipment in milliseconds
    pub log_ship_timeout_ms: u64,

    /// Upper bound on waiting for deferred work at shutdown in milliseconds
    pub shutdown_drain_timeout_ms: u64,
}

impl Config {
    /// Load configuration from environment variables.
    pub fn from_env() -> Result<Self> {
        let public_key = match env::var("PUBLIC_KEY") {
            Ok(v) if !v.trim().is_empty() => v.trim().to_string(),
            _ => bail!("PUBLIC_KEY must be set"),
        };

        let better_stack_url = match env::var("BETTER_STACK_URL") {
            Ok(raw) => Url::parse(raw.trim()).context("BETTER_STACK_URL is not a valid URL")?,
            Err(_) => Url::parse(DEFAULT_BETTER_STACK_URL)
                .context("default Better Stack URL is invalid")?,
        };

        Ok(Config {
            public_key,

            better_stack_token: env::var("BETTER_STACK_TOKEN")
                .ok()
                .filter(|v| !v.trim().is_empty()),

            better_stack_url,

            port: parse_or("PORT", 8080),

            log_ship_timeout_ms: parse_or("LOG_SHIP_TIMEOUT_MS", 5000),

            shutdown_drain_timeout_ms: parse_or("SHUTDOWN_DRAIN_TIMEOUT_MS", 10_000),
        })
    }
}

/// Parse a numeric variable, falling back to `default` when unset or invalid.
fn parse_or<T: std::str::FromStr>(name: &str, default: T) -> T {
    let raw = match env::var(name) {
        Ok(v) => v,
        Err(_) => return default,
    };

    match raw.trim().parse() {
        Ok(v) => v,
        Err(_) => {
            warn!(env_var = name, value = %raw, "invalid_numeric_value_using_default");
            default
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_or_valid() {
        env::set_var("TEST_APPWEBHOOK_PORT", "9090");
        assert_eq!(parse_or("TEST_APPWEBHOOK_PORT", 8080u16), 9090);
        env::remove_var("TEST_APPWEBHOOK_PORT");
    }

    #[test]
    fn test_parse_or_invalid_falls_back() {
        env::set_var("TEST_APPWEBHOOK_TIMEOUT", "soon");
        assert_eq!(parse_or("TEST_APPWEBHOOK_TIMEOUT", 5000u64), 5000);
        env::remove_var("TEST_APPWEBHOOK_TIMEOUT");
    }

    #[test]
    fn test_parse_or_default() {
        assert_eq!(parse_or("TEST_APPWEBHOOK_NONEXISTENT", 42u64), 42);
    }

    #[test]
    fn test_default_better_stack_url_parses() {
        assert!(Url::parse(DEFAULT_BETTER_STACK_URL).is_ok());
    }
}
