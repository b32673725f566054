// crates/prometheus-mcp-server/src/server.rs
// ============================================================================
// Module: MCP Server
// Description: JSON-RPC 2.0 server over framed stdio.
// Purpose: Expose Prometheus tools to MCP clients.
// Dependencies: prometheus-mcp-client, prometheus-mcp-config, serde, tokio
// ============================================================================

//! ## Overview
//! [`McpServer`] reads `Content-Length` framed JSON-RPC messages, routes
//! `tools/*` calls through [`ToolRouter`], and writes framed responses.
//! Malformed messages get JSON-RPC errors and the session continues;
//! transport failures end the session. Inputs are untrusted.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::BufRead;
use std::io::BufReader;
use std::io::Read;
use std::io::Write;
use std::sync::Arc;

use prometheus_mcp_client::HttpPrometheusClient;
use prometheus_mcp_client::PrometheusApi;
use prometheus_mcp_config::ProxySettings;
use prometheus_mcp_config::ServerRegistry;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;

use crate::audit::McpAuditEvent;
use crate::audit::McpAuditSink;
use crate::audit::McpOutcome;
use crate::tools::ToolDefinition;
use crate::tools::ToolError;
use crate::tools::ToolRouter;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Server name reported by `initialize`.
pub const SERVER_NAME: &str = "prometheus-mcp";
/// Protocol version used when the client does not send one.
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";
/// Default maximum request body size in bytes.
pub const DEFAULT_MAX_BODY_BYTES: usize = 1024 * 1024;
/// Maximum length of a single header line in bytes.
const MAX_HEADER_LINE_BYTES: usize = 8 * 1024;

// ============================================================================
// SECTION: Server
// ============================================================================

/// MCP server instance.
pub struct McpServer {
    /// Tool router for request dispatch.
    router: ToolRouter,
    /// Audit sink for request events.
    audit: Arc<dyn McpAuditSink>,
    /// Maximum allowed request body size.
    max_body_bytes: usize,
}

impl McpServer {
    /// Creates a server over a registry and Prometheus API.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Config`] when the registry is empty.
    pub fn new(
        registry: ServerRegistry,
        api: Arc<dyn PrometheusApi>,
        audit: Arc<dyn McpAuditSink>,
    ) -> Result<Self, McpServerError> {
        if registry.is_empty() {
            return Err(McpServerError::Config(
                "no prometheus servers configured; set PROMETHEUS_SERVER_0..PROMETHEUS_SERVER_9"
                    .to_string(),
            ));
        }
        Ok(Self {
            router: ToolRouter::new(Arc::new(registry), api),
            audit,
            max_body_bytes: DEFAULT_MAX_BODY_BYTES,
        })
    }

    /// Creates a server backed by the HTTP Prometheus client.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError`] when the registry is empty or the HTTP
    /// client cannot be built.
    pub fn from_settings(
        registry: ServerRegistry,
        settings: &ProxySettings,
        audit: Arc<dyn McpAuditSink>,
    ) -> Result<Self, McpServerError> {
        let client = HttpPrometheusClient::new(settings)
            .map_err(|err| McpServerError::Init(err.to_string()))?;
        Self::new(registry, Arc::new(client), audit)
    }

    /// Overrides the maximum request body size.
    #[must_use]
    pub const fn with_max_body_bytes(mut self, max_body_bytes: usize) -> Self {
        self.max_body_bytes = max_body_bytes;
        self
    }

    /// Serves framed JSON-RPC over process stdin and stdout until stdin
    /// closes.
    ///
    /// Stdin reads block the calling runtime worker; run this on a
    /// multi-threaded runtime so spawned connection checks keep progressing.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Transport`] when stdio fails.
    pub async fn serve_stdio(&self) -> Result<(), McpServerError> {
        self.serve_io(BufReader::new(std::io::stdin()), std::io::stdout()).await
    }

    /// Serves framed JSON-RPC over arbitrary reader and writer.
    ///
    /// Returns `Ok(())` when the reader reaches end of input between
    /// messages. Reads are blocking and messages are handled strictly one at
    /// a time: the next frame is not read until the previous response has
    /// been written.
    ///
    /// # Errors
    ///
    /// Returns [`McpServerError::Transport`] on malformed framing or I/O
    /// failure.
    pub async fn serve_io<R: BufRead, W: Write>(
        &self,
        mut reader: R,
        mut writer: W,
    ) -> Result<(), McpServerError> {
        while let Some(bytes) = read_framed(&mut reader, self.max_body_bytes)? {
            if let Some(response) = self.handle_payload(&bytes).await {
                let payload = serde_json::to_vec(&response).map_err(|_| {
                    McpServerError::Transport("json-rpc serialization failed".to_string())
                })?;
                write_framed(&mut writer, &payload)?;
            }
        }
        Ok(())
    }

    /// Handles one JSON-RPC message and returns the response, or `None` for
    /// notifications.
    pub async fn handle_payload(&self, bytes: &[u8]) -> Option<Value> {
        let (response, mut event) = self.dispatch(bytes).await;
        event.request_bytes = bytes.len();
        let value = response.map(|response| {
            serde_json::to_value(&response).unwrap_or_else(|_| {
                json!({
                    "jsonrpc": "2.0",
                    "id": Value::Null,
                    "error": {"code": -32060, "message": "serialization failed"}
                })
            })
        });
        event.response_bytes = value.as_ref().map_or(0, |value| value.to_string().len());
        self.audit.record(&event);
        value
    }

    /// Parses and dispatches a message, returning the response and its
    /// audit event.
    async fn dispatch(&self, bytes: &[u8]) -> (Option<JsonRpcResponse>, McpAuditEvent) {
        let Ok(raw) = serde_json::from_slice::<Value>(bytes) else {
            let response = JsonRpcResponse::failure(Value::Null, -32700, "parse error", None);
            return (
                Some(response),
                McpAuditEvent::new("invalid", McpOutcome::Error).with_error_code(-32700),
            );
        };
        let request = match serde_json::from_value::<JsonRpcRequest>(raw) {
            Ok(request) => request,
            Err(_) => {
                let response =
                    JsonRpcResponse::failure(Value::Null, -32600, "invalid json-rpc request", None);
                return (
                    Some(response),
                    McpAuditEvent::new("invalid", McpOutcome::Error).with_error_code(-32600),
                );
            }
        };
        let mut event = McpAuditEvent::new(request.method.clone(), McpOutcome::Notification);
        event.request_id = request.id.as_ref().map(Value::to_string);
        let Some(id) = request.id.clone() else {
            return (None, event);
        };
        let response = self.handle_request(id, request, &mut event).await;
        event.outcome = if response.error.is_some() { McpOutcome::Error } else { McpOutcome::Ok };
        event.error_code = response.error.as_ref().map(|error| error.code);
        (Some(response), event)
    }

    /// Dispatches a JSON-RPC request that expects a response.
    async fn handle_request(
        &self,
        id: Value,
        request: JsonRpcRequest,
        event: &mut McpAuditEvent,
    ) -> JsonRpcResponse {
        if request.jsonrpc != "2.0" {
            return JsonRpcResponse::failure(id, -32600, "invalid json-rpc version", None);
        }
        match request.method.as_str() {
            "initialize" => JsonRpcResponse::success(id, initialize_result(request.params.as_ref())),
            "ping" => JsonRpcResponse::success(id, json!({})),
            "tools/list" => match serde_json::to_value(ToolListResult {
                tools: self.router.list_tools(),
            }) {
                Ok(value) => JsonRpcResponse::success(id, value),
                Err(_) => jsonrpc_error(id, &ToolError::Serialization),
            },
            "tools/call" => {
                let params = request.params.unwrap_or(Value::Null);
                let call = match serde_json::from_value::<ToolCallParams>(params) {
                    Ok(call) => call,
                    Err(err) => {
                        return jsonrpc_error(id, &ToolError::InvalidParams(err.to_string()));
                    }
                };
                event.tool = Some(call.name.clone());
                event.server =
                    call.arguments.get("server").and_then(Value::as_str).map(str::to_string);
                match self.router.handle_tool_call(&call.name, call.arguments).await {
                    Ok(result) => match tool_call_result(&result) {
                        Ok(value) => JsonRpcResponse::success(id, value),
                        Err(err) => jsonrpc_error(id, &err),
                    },
                    Err(err) => jsonrpc_error(id, &err),
                }
            }
            _ => JsonRpcResponse::failure(id, -32601, "method not found", None),
        }
    }
}

// ============================================================================
// SECTION: JSON-RPC Types
// ============================================================================

/// Incoming JSON-RPC message; requests without `id` are notifications.
#[derive(Debug, Deserialize)]
struct JsonRpcRequest {
    /// JSON-RPC protocol version.
    jsonrpc: String,
    /// Request identifier.
    #[serde(default)]
    id: Option<Value>,
    /// Method name.
    method: String,
    /// Optional parameters payload.
    #[serde(default)]
    params: Option<Value>,
}

/// JSON-RPC response envelope.
#[derive(Debug, Serialize)]
struct JsonRpcResponse {
    /// JSON-RPC protocol version.
    jsonrpc: &'static str,
    /// Request identifier.
    id: Value,
    /// Successful result payload.
    #[serde(skip_serializing_if = "Option::is_none")]
    result: Option<Value>,
    /// Error payload when the request fails.
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<JsonRpcError>,
}

impl JsonRpcResponse {
    /// Builds a success response.
    const fn success(id: Value, result: Value) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: Some(result),
            error: None,
        }
    }

    /// Builds an error response.
    fn failure(id: Value, code: i64, message: &str, data: Option<Value>) -> Self {
        Self {
            jsonrpc: "2.0",
            id,
            result: None,
            error: Some(JsonRpcError {
                code,
                message: message.to_string(),
                data,
            }),
        }
    }
}

/// JSON-RPC error payload.
#[derive(Debug, Serialize)]
struct JsonRpcError {
    /// Error code.
    code: i64,
    /// Human-readable error message.
    message: String,
    /// Structured error detail.
    #[serde(skip_serializing_if = "Option::is_none")]
    data: Option<Value>,
}

/// Tool call parameters for JSON-RPC requests.
#[derive(Debug, Deserialize)]
struct ToolCallParams {
    /// Tool name.
    name: String,
    /// Raw JSON arguments.
    #[serde(default)]
    arguments: Value,
}

/// Tool list response payload.
#[derive(Debug, Serialize)]
struct ToolListResult {
    /// Registered tool definitions.
    tools: Vec<ToolDefinition>,
}

/// Tool call response payload.
#[derive(Debug, Serialize)]
struct ToolCallResult {
    /// Tool output content.
    content: Vec<ToolContent>,
}

/// Tool output payloads for JSON-RPC responses.
#[derive(Debug, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
enum ToolContent {
    /// JSON tool output rendered as text.
    Text {
        /// Serialized JSON payload.
        text: String,
    },
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Builds the `initialize` result, echoing the client's protocol version.
fn initialize_result(params: Option<&Value>) -> Value {
    let protocol_version = params
        .and_then(|params| params.get("protocolVersion"))
        .and_then(Value::as_str)
        .unwrap_or(DEFAULT_PROTOCOL_VERSION);
    json!({
        "protocolVersion": protocol_version,
        "capabilities": {"tools": {"listChanged": false}},
        "serverInfo": {
            "name": SERVER_NAME,
            "version": env!("CARGO_PKG_VERSION"),
        },
    })
}

/// Wraps a tool result as MCP text content.
fn tool_call_result(result: &Value) -> Result<Value, ToolError> {
    let text = serde_json::to_string(result).map_err(|_| ToolError::Serialization)?;
    serde_json::to_value(ToolCallResult {
        content: vec![ToolContent::Text {
            text,
        }],
    })
    .map_err(|_| ToolError::Serialization)
}

/// Maps a tool error to a JSON-RPC error response.
fn jsonrpc_error(id: Value, error: &ToolError) -> JsonRpcResponse {
    let data = match error {
        ToolError::UnknownServer {
            available, ..
        } => json!({"kind": error.kind(), "available": available}),
        ToolError::Upstream {
            status_code,
            details,
            ..
        } => {
            let mut data = serde_json::Map::new();
            data.insert("kind".to_string(), json!(error.kind()));
            if let Some(status_code) = status_code {
                data.insert("status_code".to_string(), json!(status_code));
            }
            if let Some(details) = details {
                data.insert("details".to_string(), details.clone());
            }
            Value::Object(data)
        }
        _ => json!({"kind": error.kind()}),
    };
    JsonRpcResponse::failure(id, error.code(), &error.to_string(), Some(data))
}

/// Reads a framed stdio payload using MCP `Content-Length` headers.
///
/// Returns `Ok(None)` when input ends before any header of a new message.
fn read_framed(
    reader: &mut impl BufRead,
    max_body_bytes: usize,
) -> Result<Option<Vec<u8>>, McpServerError> {
    let mut content_length: Option<usize> = None;
    let mut saw_header = false;
    let mut line = String::new();
    loop {
        line.clear();
        let bytes = reader
            .by_ref()
            .take(u64::try_from(MAX_HEADER_LINE_BYTES + 1).unwrap_or(u64::MAX))
            .read_line(&mut line)
            .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
        if bytes == 0 {
            if saw_header {
                return Err(McpServerError::Transport("stdio closed mid-message".to_string()));
            }
            return Ok(None);
        }
        if bytes > MAX_HEADER_LINE_BYTES {
            return Err(McpServerError::Transport("header line too large".to_string()));
        }
        if line.trim().is_empty() {
            if saw_header {
                break;
            }
            continue;
        }
        saw_header = true;
        if let Some((name, value)) = line.split_once(':')
            && name.trim().eq_ignore_ascii_case("content-length")
        {
            if content_length.is_some() {
                return Err(McpServerError::Transport("duplicate content length".to_string()));
            }
            let parsed = value
                .trim()
                .parse::<usize>()
                .map_err(|_| McpServerError::Transport("invalid content length".to_string()))?;
            content_length = Some(parsed);
        }
    }
    let len = content_length
        .ok_or_else(|| McpServerError::Transport("missing content length".to_string()))?;
    if len > max_body_bytes {
        return Err(McpServerError::Transport("payload too large".to_string()));
    }
    let mut buf = vec![0u8; len];
    reader
        .read_exact(&mut buf)
        .map_err(|_| McpServerError::Transport("stdio read failed".to_string()))?;
    Ok(Some(buf))
}

/// Writes a framed stdio payload using MCP `Content-Length` headers.
fn write_framed(writer: &mut impl Write, payload: &[u8]) -> Result<(), McpServerError> {
    let header = format!("Content-Length: {}\r\n\r\n", payload.len());
    writer
        .write_all(header.as_bytes())
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer
        .write_all(payload)
        .map_err(|_| McpServerError::Transport("stdio write failed".to_string()))?;
    writer.flush().map_err(|_| McpServerError::Transport("stdio write failed".to_string()))
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// MCP server errors.
#[derive(Debug, thiserror::Error)]
pub enum McpServerError {
    /// Configuration errors.
    #[error("config error: {0}")]
    Config(String),
    /// Initialization errors.
    #[error("init error: {0}")]
    Init(String),
    /// Transport errors.
    #[error("transport error: {0}")]
    Transport(String),
}

// ============================================================================
// SECTION: Tests
// ============================================================================
