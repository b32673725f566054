// crates/prometheus-mcp-config/src/settings.rs
// ============================================================================
// Module: Proxy Settings
// Description: Runtime limits for outbound Prometheus requests.
// Purpose: Load and validate timeout, size, and user-agent settings.
// Dependencies: serde, thiserror
// ============================================================================

//! ## Overview
//! [`ProxySettings`] governs every outbound request: timeout, maximum
//! response size, and user agent. Values come from `PROMETHEUS_MCP_*`
//! variables and fall back to defaults when unset. Unlike server slots,
//! invalid settings fail closed with [`ConfigError`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::ops::RangeInclusive;
use std::str::FromStr;

use serde::Serialize;
use thiserror::Error;

use crate::source::ConfigSource;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Request timeout variable (milliseconds).
pub const TIMEOUT_MS_ENV: &str = "PROMETHEUS_MCP_TIMEOUT_MS";
/// Maximum response size variable (bytes).
pub const MAX_RESPONSE_BYTES_ENV: &str = "PROMETHEUS_MCP_MAX_RESPONSE_BYTES";
/// User agent variable.
pub const USER_AGENT_ENV: &str = "PROMETHEUS_MCP_USER_AGENT";

/// Default request timeout in milliseconds.
const DEFAULT_TIMEOUT_MS: u64 = 10_000;
/// Accepted request timeout range in milliseconds.
const TIMEOUT_MS_RANGE: RangeInclusive<u64> = 100..=120_000;
/// Default maximum response size in bytes.
const DEFAULT_MAX_RESPONSE_BYTES: usize = 8 * 1024 * 1024;
/// Accepted maximum response size range in bytes.
const MAX_RESPONSE_BYTES_RANGE: RangeInclusive<usize> = 1024..=64 * 1024 * 1024;
/// Maximum user agent length in bytes.
const MAX_USER_AGENT_BYTES: usize = 256;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Runtime settings applied to outbound Prometheus requests.
///
/// # Invariants
/// - Values returned by [`ProxySettings::from_source`] have passed
///   [`ProxySettings::validate`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProxySettings {
    /// Request timeout in milliseconds.
    pub timeout_ms: u64,
    /// Maximum response body size in bytes.
    pub max_response_bytes: usize,
    /// User agent string for outbound requests.
    pub user_agent: String,
}

impl Default for ProxySettings {
    fn default() -> Self {
        Self {
            timeout_ms: DEFAULT_TIMEOUT_MS,
            max_response_bytes: DEFAULT_MAX_RESPONSE_BYTES,
            user_agent: format!("prometheus-mcp/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl ProxySettings {
    /// Loads settings from a configuration source, applying defaults.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when a value does not parse or is out
    /// of bounds.
    pub fn from_source(source: &dyn ConfigSource) -> Result<Self, ConfigError> {
        let mut settings = Self::default();
        if let Some(timeout_ms) = parse_optional(source, TIMEOUT_MS_ENV)? {
            settings.timeout_ms = timeout_ms;
        }
        if let Some(max_response_bytes) = parse_optional(source, MAX_RESPONSE_BYTES_ENV)? {
            settings.max_response_bytes = max_response_bytes;
        }
        if let Some(user_agent) = source.get(USER_AGENT_ENV) {
            settings.user_agent = user_agent;
        }
        settings.validate()?;
        Ok(settings)
    }

    /// Validates setting bounds.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] when any value is out of bounds.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if !TIMEOUT_MS_RANGE.contains(&self.timeout_ms) {
            return Err(ConfigError::Invalid(format!(
                "{TIMEOUT_MS_ENV} must be between {} and {}",
                TIMEOUT_MS_RANGE.start(),
                TIMEOUT_MS_RANGE.end()
            )));
        }
        if !MAX_RESPONSE_BYTES_RANGE.contains(&self.max_response_bytes) {
            return Err(ConfigError::Invalid(format!(
                "{MAX_RESPONSE_BYTES_ENV} must be between {} and {}",
                MAX_RESPONSE_BYTES_RANGE.start(),
                MAX_RESPONSE_BYTES_RANGE.end()
            )));
        }
        if self.user_agent.trim().is_empty() {
            return Err(ConfigError::Invalid(format!("{USER_AGENT_ENV} must not be empty")));
        }
        if self.user_agent.len() > MAX_USER_AGENT_BYTES {
            return Err(ConfigError::Invalid(format!(
                "{USER_AGENT_ENV} exceeds {MAX_USER_AGENT_BYTES} bytes"
            )));
        }
        Ok(())
    }
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Runtime settings errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    /// Invalid configuration data.
    #[error("invalid config: {0}")]
    Invalid(String),
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Parses an optional numeric setting.
fn parse_optional<T: FromStr>(source: &dyn ConfigSource, key: &str) -> Result<Option<T>, ConfigError> {
    let Some(raw) = source.get(key) else {
        return Ok(None);
    };
    raw.trim()
        .parse::<T>()
        .map(Some)
        .map_err(|_| ConfigError::Invalid(format!("{key} must be a non-negative integer")))
}
