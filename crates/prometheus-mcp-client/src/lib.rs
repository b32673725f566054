// crates/prometheus-mcp-client/src/lib.rs
// ============================================================================
// Module: Prometheus MCP Client Library
// Description: Async access to the Prometheus HTTP API.
// Purpose: Fetch rules and build information from configured servers.
// Dependencies: async-trait, prometheus-mcp-config, reqwest, serde_json, thiserror
// ============================================================================

//! ## Overview
//! Exposes the [`PrometheusApi`] interface and its reqwest-backed
//! implementation, [`HttpPrometheusClient`]. Per-server connection details
//! come from [`prometheus_mcp_config::ServerDescriptor`]; timeouts and size
//! limits come from [`prometheus_mcp_config::ProxySettings`].

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod api;
pub mod http;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use api::BUILD_INFO_PATH;
pub use api::ClientError;
pub use api::PrometheusApi;
pub use api::RULES_PATH;
pub use api::endpoint_url;
pub use http::HttpPrometheusClient;
