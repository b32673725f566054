// crates/prometheus-mcp-server/src/tools.rs
// ============================================================================
// Module: MCP Tool Router
// Description: Tool catalog and dispatch for Prometheus MCP tools.
// Purpose: Resolve servers, call Prometheus, and shape tool results.
// Dependencies: prometheus-mcp-alerts, prometheus-mcp-client,
//               prometheus-mcp-config, serde, serde_json, tokio
// ============================================================================

//! ## Overview
//! [`ToolRouter`] owns the immutable [`ServerRegistry`] and a shared
//! [`PrometheusApi`]. Each tool call decodes its arguments, resolves the
//! target server by name, and returns a JSON value. Bearer tokens never
//! appear in tool results.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::sync::Arc;

use prometheus_mcp_alerts::AlertDocumentError;
use prometheus_mcp_alerts::DetailLevel;
use prometheus_mcp_alerts::FilterCriteria;
use prometheus_mcp_alerts::FilterResult;
use prometheus_mcp_alerts::filter_alerts;
use prometheus_mcp_alerts::parse_rules_document;
use prometheus_mcp_client::ClientError;
use prometheus_mcp_client::PrometheusApi;
use prometheus_mcp_config::ServerDescriptor;
use prometheus_mcp_config::ServerRegistry;
use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: Tool Catalog
// ============================================================================

/// Tools exposed by the server.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolName {
    /// List configured Prometheus servers.
    ListServers,
    /// Check connectivity to one or all servers.
    CheckConnection,
    /// List alerting rules for a server.
    ListAlerts,
}

impl ToolName {
    /// Returns the canonical tool name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::ListServers => "list_servers",
            Self::CheckConnection => "check_connection",
            Self::ListAlerts => "list_alerts",
        }
    }

    /// Returns all tools in listing order.
    #[must_use]
    pub const fn all() -> &'static [Self] {
        &[Self::ListServers, Self::CheckConnection, Self::ListAlerts]
    }

    /// Parses a canonical tool name.
    #[must_use]
    pub fn parse(name: &str) -> Option<Self> {
        Self::all().iter().copied().find(|tool| tool.as_str() == name)
    }
}

/// Tool definition returned by `tools/list`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ToolDefinition {
    /// Tool name.
    pub name: ToolName,
    /// Tool description for clients.
    pub description: String,
    /// JSON schema for tool input.
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Returns the definitions of every tool.
#[must_use]
pub fn tool_definitions() -> Vec<ToolDefinition> {
    ToolName::all()
        .iter()
        .map(|tool| match tool {
            ToolName::ListServers => ToolDefinition {
                name: *tool,
                description: "List the configured Prometheus servers.".to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {},
                    "additionalProperties": false
                }),
            },
            ToolName::CheckConnection => ToolDefinition {
                name: *tool,
                description: "Check connectivity to a Prometheus server, or to every configured \
                              server when no server is given."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "server": {"type": "string", "description": "Server name."}
                    },
                    "additionalProperties": false
                }),
            },
            ToolName::ListAlerts => ToolDefinition {
                name: *tool,
                description: "List alerting rules from a Prometheus server with summary counts. \
                              Optional filters are combined with AND."
                    .to_string(),
                input_schema: json!({
                    "type": "object",
                    "properties": {
                        "server": {"type": "string", "description": "Server name."},
                        "state": {"type": "string", "enum": ["firing", "pending", "inactive"]},
                        "group": {"type": "string", "description": "Exact rule group name."},
                        "alert_name": {"type": "string", "description": "Exact alert name."},
                        "extended": {
                            "type": "boolean",
                            "description": "Include query, evaluation metadata, health, and labels."
                        }
                    },
                    "required": ["server"],
                    "additionalProperties": false
                }),
            },
        })
        .collect()
}

// ============================================================================
// SECTION: Requests and Responses
// ============================================================================

/// Arguments for `list_servers`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListServersRequest {}

/// Arguments for `check_connection`.
#[derive(Debug, Default, Deserialize)]
#[serde(deny_unknown_fields)]
struct CheckConnectionRequest {
    /// Target server; all servers when absent.
    #[serde(default)]
    server: Option<String>,
}

/// Arguments for `list_alerts`.
#[derive(Debug, Deserialize)]
#[serde(deny_unknown_fields)]
struct ListAlertsRequest {
    /// Target server.
    server: String,
    /// Exact state filter.
    #[serde(default)]
    state: Option<String>,
    /// Exact group filter.
    #[serde(default)]
    group: Option<String>,
    /// Exact alert name filter.
    #[serde(default)]
    alert_name: Option<String>,
    /// Extended projection flag.
    #[serde(default)]
    extended: bool,
}

/// Public view of a configured server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ServerSummary {
    /// Server name.
    pub name: String,
    /// Server base URL.
    pub url: String,
    /// Server description.
    pub description: String,
    /// Whether TLS certificates are verified.
    pub verify_ssl: bool,
    /// Whether a bearer token is configured.
    pub has_token: bool,
}

impl From<&ServerDescriptor> for ServerSummary {
    fn from(descriptor: &ServerDescriptor) -> Self {
        Self {
            name: descriptor.name().to_string(),
            url: descriptor.url().to_string(),
            description: descriptor.description().to_string(),
            verify_ssl: descriptor.verify_ssl(),
            has_token: descriptor.has_token(),
        }
    }
}

/// Connection check status.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConnectionStatus {
    /// Server answered the build info request.
    Success,
    /// Server could not be queried.
    Error,
}

/// Outcome of checking one server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ConnectionReport {
    /// Server name.
    pub server: String,
    /// Check status.
    pub status: ConnectionStatus,
    /// Human-readable message.
    pub message: String,
    /// Build information on success.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub build_info: Option<Value>,
    /// Error kind label on failure.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error_kind: Option<&'static str>,
    /// HTTP status code for status failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status_code: Option<u16>,
    /// Response body for status failures.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ConnectionReport {
    /// Builds a report from a build info result.
    fn from_result(server: &str, result: Result<Value, ClientError>) -> Self {
        match result {
            Ok(body) => Self {
                server: server.to_string(),
                status: ConnectionStatus::Success,
                message: "Connected to Prometheus".to_string(),
                build_info: Some(body.get("data").cloned().unwrap_or(body)),
                error_kind: None,
                status_code: None,
                details: None,
            },
            Err(err) => {
                let (status_code, details) = status_details(&err);
                Self {
                    server: server.to_string(),
                    status: ConnectionStatus::Error,
                    message: err.to_string(),
                    build_info: None,
                    error_kind: Some(err.kind()),
                    status_code,
                    details,
                }
            }
        }
    }
}

/// Filtered alerts for one server.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AlertReport {
    /// Server name.
    pub server: String,
    /// Filter output.
    #[serde(flatten)]
    pub result: FilterResult,
}

// ============================================================================
// SECTION: Router
// ============================================================================

/// Routes tool calls to handlers.
#[derive(Clone)]
pub struct ToolRouter {
    /// Immutable server registry.
    registry: Arc<ServerRegistry>,
    /// Prometheus API used for upstream calls.
    api: Arc<dyn PrometheusApi>,
}

impl ToolRouter {
    /// Creates a router over a registry and API client.
    #[must_use]
    pub fn new(registry: Arc<ServerRegistry>, api: Arc<dyn PrometheusApi>) -> Self {
        Self {
            registry,
            api,
        }
    }

    /// Returns the server registry.
    #[must_use]
    pub fn registry(&self) -> &ServerRegistry {
        &self.registry
    }

    /// Lists tool definitions.
    #[must_use]
    pub fn list_tools(&self) -> Vec<ToolDefinition> {
        tool_definitions()
    }

    /// Handles a tool call by name with JSON payload.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError`] when the tool is unknown, arguments are invalid,
    /// the server is unknown, or the upstream call fails.
    pub async fn handle_tool_call(&self, name: &str, payload: Value) -> Result<Value, ToolError> {
        let tool = ToolName::parse(name).ok_or(ToolError::UnknownTool)?;
        match tool {
            ToolName::ListServers => {
                let _: ListServersRequest = decode(payload)?;
                to_value(&self.list_servers())
            }
            ToolName::CheckConnection => {
                let request: CheckConnectionRequest = decode(payload)?;
                let reports = self.check_connection(request.server.as_deref()).await?;
                to_value(&json!({"results": reports}))
            }
            ToolName::ListAlerts => {
                let request: ListAlertsRequest = decode(payload)?;
                let criteria = FilterCriteria {
                    state: request.state,
                    group: request.group,
                    alert_name: request.alert_name,
                };
                let detail = DetailLevel::from_extended(request.extended);
                to_value(&self.list_alerts(&request.server, &criteria, detail).await?)
            }
        }
    }

    /// Returns public summaries of every configured server.
    #[must_use]
    pub fn list_servers(&self) -> Value {
        servers_summary(&self.registry)
    }

    /// Checks one server, or every server concurrently when `server` is
    /// `None`.
    ///
    /// Checks are independent: a failing server yields an error report
    /// without affecting the others.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownServer`] when `server` is not registered.
    pub async fn check_connection(
        &self,
        server: Option<&str>,
    ) -> Result<Vec<ConnectionReport>, ToolError> {
        let targets: Vec<ServerDescriptor> = match server {
            Some(name) => vec![self.resolve(name)?.clone()],
            None => self.registry.iter().cloned().collect(),
        };
        let handles: Vec<_> = targets
            .into_iter()
            .map(|descriptor| {
                let api = Arc::clone(&self.api);
                let name = descriptor.name().to_string();
                let handle = tokio::spawn(async move { api.fetch_build_info(&descriptor).await });
                (name, handle)
            })
            .collect();
        let mut reports = Vec::with_capacity(handles.len());
        for (name, handle) in handles {
            let result = handle
                .await
                .unwrap_or_else(|err| Err(ClientError::Request(format!("check aborted: {err}"))));
            reports.push(ConnectionReport::from_result(&name, result));
        }
        Ok(reports)
    }

    /// Fetches, filters, and projects alerting rules for a server.
    ///
    /// # Errors
    ///
    /// Returns [`ToolError::UnknownServer`] for unregistered servers and
    /// [`ToolError::Upstream`] when the rules cannot be fetched or parsed.
    pub async fn list_alerts(
        &self,
        server: &str,
        criteria: &FilterCriteria,
        detail: DetailLevel,
    ) -> Result<AlertReport, ToolError> {
        let descriptor = self.resolve(server)?;
        let document = self
            .api
            .fetch_rules(descriptor)
            .await
            .map_err(|err| ToolError::from_client(server, &err))?;
        let groups = parse_rules_document(document)
            .map_err(|err| ToolError::from_document(server, err))?;
        Ok(AlertReport {
            server: server.to_string(),
            result: filter_alerts(&groups, criteria, detail),
        })
    }

    /// Resolves a server name against the registry.
    fn resolve(&self, name: &str) -> Result<&ServerDescriptor, ToolError> {
        self.registry.get(name).ok_or_else(|| ToolError::UnknownServer {
            server: name.to_string(),
            available: self.registry.names().map(str::to_string).collect(),
        })
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Renders the public view of every server in `registry`.
///
/// Output is `{"count": n, "servers": [...]}` in registry order. Tokens are
/// reported only as `has_token`.
#[must_use]
pub fn servers_summary(registry: &ServerRegistry) -> Value {
    let servers: Vec<ServerSummary> = registry.iter().map(ServerSummary::from).collect();
    json!({
        "count": servers.len(),
        "servers": servers,
    })
}

/// Splits a client error into its HTTP status code and response body.
fn status_details(err: &ClientError) -> (Option<u16>, Option<Value>) {
    match err {
        ClientError::Status {
            status,
            body,
        } => (Some(*status), Some(Value::String(body.clone()))),
        _ => (None, None),
    }
}

/// Decodes tool arguments; `null` is treated as an empty object.
fn decode<T: for<'de> Deserialize<'de>>(payload: Value) -> Result<T, ToolError> {
    let payload = if payload.is_null() { Value::Object(serde_json::Map::new()) } else { payload };
    serde_json::from_value(payload).map_err(|err| ToolError::InvalidParams(err.to_string()))
}

/// Serializes a tool result.
fn to_value<T: Serialize>(value: &T) -> Result<Value, ToolError> {
    serde_json::to_value(value).map_err(|_| ToolError::Serialization)
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Tool routing errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ToolError {
    /// Tool name not recognized.
    #[error("unknown tool")]
    UnknownTool,
    /// Arguments failed validation.
    #[error("invalid params: {0}")]
    InvalidParams(String),
    /// Server name not registered.
    #[error("unknown server '{server}'; available servers: {}", available.join(", "))]
    UnknownServer {
        /// Requested server name.
        server: String,
        /// Registered server names.
        available: Vec<String>,
    },
    /// Upstream Prometheus call failed.
    #[error("prometheus server '{server}' request failed: {message}")]
    Upstream {
        /// Server name.
        server: String,
        /// Failure detail.
        message: String,
        /// HTTP status code when the server answered with a failure status.
        status_code: Option<u16>,
        /// Upstream response body or unsuccessful rules document.
        details: Option<Value>,
    },
    /// Tool payload serialization failed.
    #[error("serialization failure")]
    Serialization,
}

impl ToolError {
    /// Builds an upstream error from a failed Prometheus request.
    #[must_use]
    pub fn from_client(server: &str, err: &ClientError) -> Self {
        let (status_code, details) = status_details(err);
        Self::Upstream {
            server: server.to_string(),
            message: err.to_string(),
            status_code,
            details,
        }
    }

    /// Builds an upstream error from a rules document that could not be used.
    #[must_use]
    pub fn from_document(server: &str, err: AlertDocumentError) -> Self {
        let message = err.to_string();
        let details = match err {
            AlertDocumentError::Unsuccessful {
                document, ..
            } => Some(document),
            AlertDocumentError::Malformed(_) => None,
        };
        Self::Upstream {
            server: server.to_string(),
            message,
            status_code: None,
            details,
        }
    }

    /// Returns the JSON-RPC error code for this error.
    #[must_use]
    pub const fn code(&self) -> i64 {
        match self {
            Self::UnknownTool => -32601,
            Self::InvalidParams(_) => -32602,
            Self::UnknownServer { .. } => -32004,
            Self::Upstream { .. } => -32020,
            Self::Serialization => -32060,
        }
    }

    /// Returns a stable label for the error kind.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::UnknownTool => "unknown_tool",
            Self::InvalidParams(_) => "invalid_params",
            Self::UnknownServer { .. } => "unknown_server",
            Self::Upstream { .. } => "upstream",
            Self::Serialization => "serialization",
        }
    }
}
