// crates/prometheus-mcp-server/src/audit.rs
// ============================================================================
// Module: MCP Audit Logging
// Description: Structured audit events for MCP request handling.
// Purpose: Emit one JSON line per handled request without payload contents.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Every JSON-RPC request handled by the server produces one
//! [`McpAuditEvent`]. Events carry identifiers and sizes only; tool
//! arguments, tool results, and bearer tokens are never recorded.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Outcome of a handled request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum McpOutcome {
    /// Request produced a result.
    Ok,
    /// Request produced a JSON-RPC error.
    Error,
    /// Notification handled without a response.
    Notification,
}

/// MCP audit event payload.
#[derive(Debug, Clone, Serialize)]
pub struct McpAuditEvent {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Request identifier when provided.
    pub request_id: Option<String>,
    /// JSON-RPC method name.
    pub method: String,
    /// Tool name for `tools/call`.
    pub tool: Option<String>,
    /// Target server for tool calls that name one.
    pub server: Option<String>,
    /// Request outcome.
    pub outcome: McpOutcome,
    /// JSON-RPC error code when present.
    pub error_code: Option<i64>,
    /// Request body size in bytes.
    pub request_bytes: usize,
    /// Response body size in bytes.
    pub response_bytes: usize,
}

impl McpAuditEvent {
    /// Creates an event for a method with the current timestamp.
    #[must_use]
    pub fn new(method: impl Into<String>, outcome: McpOutcome) -> Self {
        Self {
            event: "mcp_request",
            timestamp_ms: now_ms(),
            request_id: None,
            method: method.into(),
            tool: None,
            server: None,
            outcome,
            error_code: None,
            request_bytes: 0,
            response_bytes: 0,
        }
    }

    /// Sets the JSON-RPC error code.
    #[must_use]
    pub const fn with_error_code(mut self, code: i64) -> Self {
        self.error_code = Some(code);
        self
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Audit sink for MCP request events.
pub trait McpAuditSink: Send + Sync {
    /// Record an audit event.
    fn record(&self, event: &McpAuditEvent);
}

/// Audit sink that logs JSON lines to stderr.
pub struct McpStderrAuditSink;

impl McpAuditSink for McpStderrAuditSink {
    fn record(&self, event: &McpAuditEvent) {
        if let Ok(payload) = serde_json::to_string(event) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Audit sink that drops all events.
pub struct McpNoopAuditSink;

impl McpAuditSink for McpNoopAuditSink {
    fn record(&self, _event: &McpAuditEvent) {}
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns milliseconds since the Unix epoch.
fn now_ms() -> u128 {
    SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis()
}
