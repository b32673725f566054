// crates/prometheus-mcp-client/src/http.rs
// ============================================================================
// Module: HTTP Prometheus Client
// Description: reqwest-backed implementation of the Prometheus API interface.
// Purpose: Issue bounded, authenticated GET requests to Prometheus servers.
// Dependencies: async-trait, prometheus-mcp-config, reqwest, serde_json
// ============================================================================

//! ## Overview
//! [`HttpPrometheusClient`] keeps two connection pools: one that verifies TLS
//! certificates and one that does not. Each request picks the pool matching
//! the target server's `verify_ssl` flag. Redirects are never followed and
//! response bodies are read under the configured size limit.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::time::Duration;

use async_trait::async_trait;
use prometheus_mcp_config::ProxySettings;
use prometheus_mcp_config::ServerDescriptor;
use reqwest::Client;
use reqwest::Response;
use reqwest::header::ACCEPT;
use reqwest::header::AUTHORIZATION;
use reqwest::header::HeaderMap;
use reqwest::header::HeaderValue;
use reqwest::redirect::Policy;
use serde_json::Value;

use crate::api::BUILD_INFO_PATH;
use crate::api::ClientError;
use crate::api::PrometheusApi;
use crate::api::RULES_PATH;
use crate::api::endpoint_url;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Maximum characters of an error body kept in [`ClientError::Status`].
const MAX_ERROR_BODY_CHARS: usize = 512;

// ============================================================================
// SECTION: Client
// ============================================================================

/// Prometheus API client over HTTP(S).
pub struct HttpPrometheusClient {
    /// Client that verifies TLS certificates.
    verified: Client,
    /// Client that skips TLS certificate verification.
    unverified: Client,
    /// Maximum response body size in bytes.
    max_response_bytes: usize,
}

impl HttpPrometheusClient {
    /// Builds a client from validated proxy settings.
    ///
    /// # Errors
    ///
    /// Returns [`ClientError::Build`] when an HTTP client cannot be created.
    pub fn new(settings: &ProxySettings) -> Result<Self, ClientError> {
        Ok(Self {
            verified: build_client(settings, true)?,
            unverified: build_client(settings, false)?,
            max_response_bytes: settings.max_response_bytes,
        })
    }

    /// Issues a GET request and decodes the JSON body.
    async fn get_json(&self, server: &ServerDescriptor, path: &str) -> Result<Value, ClientError> {
        let client = if server.verify_ssl() { &self.verified } else { &self.unverified };
        let response = client
            .get(endpoint_url(server.url(), path))
            .headers(build_headers(server)?)
            .send()
            .await
            .map_err(classify_error)?;
        let status = response.status();
        let body = read_response_limited(response, self.max_response_bytes).await?;
        if !status.is_success() {
            let body = String::from_utf8_lossy(&body).chars().take(MAX_ERROR_BODY_CHARS).collect();
            return Err(ClientError::Status {
                status: status.as_u16(),
                body,
            });
        }
        serde_json::from_slice(&body).map_err(|err| ClientError::Decode(err.to_string()))
    }
}

#[async_trait]
impl PrometheusApi for HttpPrometheusClient {
    async fn fetch_rules(&self, server: &ServerDescriptor) -> Result<Value, ClientError> {
        self.get_json(server, RULES_PATH).await
    }

    async fn fetch_build_info(&self, server: &ServerDescriptor) -> Result<Value, ClientError> {
        self.get_json(server, BUILD_INFO_PATH).await
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds a reqwest client with shared limits.
fn build_client(settings: &ProxySettings, verify_tls: bool) -> Result<Client, ClientError> {
    Client::builder()
        .timeout(Duration::from_millis(settings.timeout_ms))
        .user_agent(settings.user_agent.clone())
        .redirect(Policy::none())
        .danger_accept_invalid_certs(!verify_tls)
        .build()
        .map_err(|err| ClientError::Build(err.to_string()))
}

/// Builds request headers, marking the bearer token as sensitive.
fn build_headers(server: &ServerDescriptor) -> Result<HeaderMap, ClientError> {
    let mut headers = HeaderMap::new();
    headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
    if server.has_token() {
        let mut value = HeaderValue::from_str(&format!("Bearer {}", server.token()))
            .map_err(|_| ClientError::Request("invalid bearer token".to_string()))?;
        value.set_sensitive(true);
        headers.insert(AUTHORIZATION, value);
    }
    Ok(headers)
}

/// Maps a transport error to a client error.
fn classify_error(err: reqwest::Error) -> ClientError {
    if err.is_timeout() {
        ClientError::Timeout
    } else if err.is_connect() {
        ClientError::Connect(err.to_string())
    } else {
        ClientError::Request(err.to_string())
    }
}

/// Reads the response body while enforcing a byte limit.
async fn read_response_limited(
    mut response: Response,
    max_bytes: usize,
) -> Result<Vec<u8>, ClientError> {
    let limit_exceeded = ClientError::ResponseTooLarge {
        limit: max_bytes,
    };
    let max_bytes_u64 = u64::try_from(max_bytes).map_err(|_| limit_exceeded.clone())?;
    if let Some(expected) = response.content_length()
        && expected > max_bytes_u64
    {
        return Err(limit_exceeded);
    }
    let mut buf = Vec::new();
    while let Some(chunk) = response.chunk().await.map_err(classify_error)? {
        if buf.len().saturating_add(chunk.len()) > max_bytes {
            return Err(limit_exceeded);
        }
        buf.extend_from_slice(&chunk);
    }
    Ok(buf)
}
