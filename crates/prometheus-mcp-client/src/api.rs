// crates/prometheus-mcp-client/src/api.rs
// ============================================================================
// Module: Prometheus API Interface
// Description: Async interface for the Prometheus endpoints the proxy uses.
// Purpose: Let callers swap the HTTP client for fakes in tests.
// Dependencies: async-trait, prometheus-mcp-config, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`PrometheusApi`] is the seam between tool handling and the network. Each
//! call targets one [`ServerDescriptor`] and returns the decoded JSON body.
//! Calls against different servers share no state, so one failing server
//! never affects a request to another.

// ============================================================================
// SECTION: Imports
// ============================================================================

use async_trait::async_trait;
use prometheus_mcp_config::ServerDescriptor;
use serde_json::Value;
use thiserror::Error;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Alerting and recording rules endpoint.
pub const RULES_PATH: &str = "/api/v1/rules";
/// Build information endpoint.
pub const BUILD_INFO_PATH: &str = "/api/v1/status/buildinfo";

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Read-only access to a Prometheus server's HTTP API.
#[async_trait]
pub trait PrometheusApi: Send + Sync {
    /// Fetches the rules document from `/api/v1/rules`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails or the body is not JSON.
    async fn fetch_rules(&self, server: &ServerDescriptor) -> Result<Value, ClientError>;

    /// Fetches build information from `/api/v1/status/buildinfo`.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError`] when the request fails or the body is not JSON.
    async fn fetch_build_info(&self, server: &ServerDescriptor) -> Result<Value, ClientError>;
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Joins a server base URL and an API path, dropping trailing slashes from
/// the base.
#[must_use]
pub fn endpoint_url(base_url: &str, path: &str) -> String {
    format!("{}{path}", base_url.trim_end_matches('/'))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Prometheus client errors.
///
/// # Invariants
/// - Messages never include bearer tokens.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ClientError {
    /// HTTP client could not be constructed.
    #[error("http client build failed: {0}")]
    Build(String),
    /// Request exceeded the configured timeout.
    #[error("connection timeout")]
    Timeout,
    /// Connection could not be established.
    #[error("connection error: {0}")]
    Connect(String),
    /// Request failed for another transport reason.
    #[error("request failed: {0}")]
    Request(String),
    /// Server answered with a non-success status.
    #[error("unexpected http status {status}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Truncated response body.
        body: String,
    },
    /// Response body exceeded the configured limit.
    #[error("response exceeds {limit} bytes")]
    ResponseTooLarge {
        /// Configured limit in bytes.
        limit: usize,
    },
    /// Response body was not valid JSON.
    #[error("invalid json response: {0}")]
    Decode(String),
}

impl ClientError {
    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Build(_) => "build",
            Self::Timeout => "timeout",
            Self::Connect(_) => "connect",
            Self::Request(_) => "request",
            Self::Status { .. } => "status",
            Self::ResponseTooLarge { .. } => "response_too_large",
            Self::Decode(_) => "decode",
        }
    }
}
