// crates/prometheus-mcp-server/src/lib.rs
// ============================================================================
// Module: Prometheus MCP Server Library
// Description: MCP tools and stdio JSON-RPC server for Prometheus alerts.
// Purpose: Expose server listing, connectivity checks, and alert queries.
// Dependencies: prometheus-mcp-alerts, prometheus-mcp-client,
//               prometheus-mcp-config, serde, tokio
// ============================================================================

//! ## Overview
//! `prometheus-mcp-server` wires the server registry, the Prometheus client,
//! and the alert filter into three MCP tools served over stdio. The registry
//! is immutable once the server starts.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod audit;
pub mod server;
pub mod tools;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use audit::McpAuditEvent;
pub use audit::McpAuditSink;
pub use audit::McpNoopAuditSink;
pub use audit::McpOutcome;
pub use audit::McpStderrAuditSink;
pub use server::DEFAULT_MAX_BODY_BYTES;
pub use server::DEFAULT_PROTOCOL_VERSION;
pub use server::McpServer;
pub use server::McpServerError;
pub use server::SERVER_NAME;
pub use tools::AlertReport;
pub use tools::ConnectionReport;
pub use tools::ConnectionStatus;
pub use tools::ServerSummary;
pub use tools::ToolDefinition;
pub use tools::ToolError;
pub use tools::ToolName;
pub use tools::ToolRouter;
pub use tools::servers_summary;
pub use tools::tool_definitions;
