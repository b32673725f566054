// crates/prometheus-mcp-cli/src/main.rs
// ============================================================================
// Module: Prometheus MCP CLI Entry Point
// Description: Command dispatcher for the Prometheus MCP server and tools.
// Purpose: Serve MCP over stdio and run tool queries from a shell.
// Dependencies: clap, prometheus-mcp-config, prometheus-mcp-server, tokio
// ============================================================================

//! ## Overview
//! `prometheus-mcp serve` starts the stdio MCP server. The remaining commands
//! run the same registry loading and tools once and print JSON to stdout.
//! Diagnostics and audit events go to stderr as JSON lines. Bearer tokens are
//! never printed.

// ============================================================================
// SECTION: Modules
// ============================================================================

#[cfg(test)]
mod main_tests;

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::process::ExitCode;
use std::sync::Arc;

use clap::ArgAction;
use clap::Args;
use clap::Parser;
use clap::Subcommand;
use prometheus_mcp_alerts::DetailLevel;
use prometheus_mcp_alerts::FilterCriteria;
use prometheus_mcp_client::HttpPrometheusClient;
use prometheus_mcp_config::CollectingDiagnosticSink;
use prometheus_mcp_config::ConfigSource;
use prometheus_mcp_config::DiagnosticSink;
use prometheus_mcp_config::EnvSource;
use prometheus_mcp_config::ProxySettings;
use prometheus_mcp_config::RegistryBuilder;
use prometheus_mcp_config::ServerRegistry;
use prometheus_mcp_config::StderrDiagnosticSink;
use prometheus_mcp_server::McpServer;
use prometheus_mcp_server::McpStderrAuditSink;
use prometheus_mcp_server::ToolRouter;
use prometheus_mcp_server::servers_summary;
use serde_json::Value;
use serde_json::json;
use thiserror::Error;

// ============================================================================
// SECTION: CLI Types
// ============================================================================

/// Top-level CLI definition.
#[derive(Parser, Debug)]
#[command(name = "prometheus-mcp", disable_help_subcommand = true, disable_version_flag = true)]
struct Cli {
    /// Print version information and exit.
    #[arg(long = "version", action = ArgAction::SetTrue, global = true)]
    show_version: bool,
    /// Register a `default` server from `PROMETHEUS_URL` when no slot is set.
    #[arg(long = "legacy-env", action = ArgAction::SetTrue, global = true)]
    legacy_env: bool,
    /// Selected subcommand to execute.
    #[command(subcommand)]
    command: Option<Commands>,
}

/// Supported CLI subcommands.
#[derive(Subcommand, Debug)]
enum Commands {
    /// Start the MCP server on stdio.
    Serve,
    /// List configured servers as JSON.
    Servers,
    /// Configuration utilities.
    Config {
        /// Selected config subcommand.
        #[command(subcommand)]
        command: ConfigCommand,
    },
    /// Check connectivity to one or all servers.
    Check(CheckCommand),
    /// List alerting rules from a server.
    Alerts(AlertsCommand),
}

/// Configuration subcommands.
#[derive(Subcommand, Debug)]
enum ConfigCommand {
    /// Load the registry and report diagnostics; fails when no server loads.
    Check,
}

/// Arguments for `check`.
#[derive(Args, Debug)]
struct CheckCommand {
    /// Server name; all servers when omitted.
    #[arg(long)]
    server: Option<String>,
}

/// Arguments for `alerts`.
#[derive(Args, Debug)]
struct AlertsCommand {
    /// Server name.
    #[arg(long)]
    server: String,
    /// Exact rule state (`firing`, `pending`, `inactive`).
    #[arg(long)]
    state: Option<String>,
    /// Exact rule group name.
    #[arg(long)]
    group: Option<String>,
    /// Exact alert name.
    #[arg(long = "alert-name")]
    alert_name: Option<String>,
    /// Include query, evaluation metadata, health, and labels.
    #[arg(long, action = ArgAction::SetTrue)]
    extended: bool,
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// CLI error wrapper for user-facing messages.
#[derive(Debug, Error)]
#[error("{message}")]
struct CliError {
    /// Human-readable error message.
    message: String,
}

impl CliError {
    /// Constructs a new [`CliError`].
    const fn new(message: String) -> Self {
        Self {
            message,
        }
    }
}

/// CLI result alias for fallible operations.
type CliResult<T> = Result<T, CliError>;

// ============================================================================
// SECTION: Entry Point
// ============================================================================

/// CLI entry point returning an exit code.
#[tokio::main(flavor = "multi_thread")]
async fn main() -> ExitCode {
    match run().await {
        Ok(code) => code,
        Err(err) => emit_error(&err.to_string()),
    }
}

/// Executes the CLI command dispatcher.
async fn run() -> CliResult<ExitCode> {
    let cli = Cli::parse();
    if cli.show_version {
        write_stdout_line(&format!("prometheus-mcp {}", env!("CARGO_PKG_VERSION")))?;
        return Ok(ExitCode::SUCCESS);
    }
    let source = EnvSource;
    let Some(command) = cli.command else {
        return command_serve(&source, cli.legacy_env).await;
    };
    match command {
        Commands::Serve => command_serve(&source, cli.legacy_env).await,
        Commands::Servers => command_servers(&source, cli.legacy_env),
        Commands::Config {
            command: ConfigCommand::Check,
        } => command_config_check(&source, cli.legacy_env),
        Commands::Check(command) => command_check(&source, cli.legacy_env, command).await,
        Commands::Alerts(command) => command_alerts(&source, cli.legacy_env, command).await,
    }
}

// ============================================================================
// SECTION: Commands
// ============================================================================

/// Executes the `serve` command.
async fn command_serve(source: &dyn ConfigSource, legacy_env: bool) -> CliResult<ExitCode> {
    let settings = load_settings(source)?;
    let registry = load_registry(source, legacy_env, &StderrDiagnosticSink);
    let server = McpServer::from_settings(registry, &settings, Arc::new(McpStderrAuditSink))
        .map_err(|err| CliError::new(format!("server init failed: {err}")))?;
    server.serve_stdio().await.map_err(|err| CliError::new(format!("server failed: {err}")))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `servers` command.
fn command_servers(source: &dyn ConfigSource, legacy_env: bool) -> CliResult<ExitCode> {
    let registry = load_registry(source, legacy_env, &StderrDiagnosticSink);
    write_json(&servers_summary(&registry))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `config check` command.
fn command_config_check(source: &dyn ConfigSource, legacy_env: bool) -> CliResult<ExitCode> {
    let (report, healthy) = config_report(source, legacy_env);
    write_json(&report)?;
    Ok(if healthy { ExitCode::SUCCESS } else { ExitCode::FAILURE })
}

/// Executes the `check` command.
async fn command_check(
    source: &dyn ConfigSource,
    legacy_env: bool,
    command: CheckCommand,
) -> CliResult<ExitCode> {
    let router = build_router(source, legacy_env)?;
    let reports = router
        .check_connection(command.server.as_deref())
        .await
        .map_err(|err| CliError::new(err.to_string()))?;
    write_json(&json!({"results": reports}))?;
    Ok(ExitCode::SUCCESS)
}

/// Executes the `alerts` command.
async fn command_alerts(
    source: &dyn ConfigSource,
    legacy_env: bool,
    command: AlertsCommand,
) -> CliResult<ExitCode> {
    let router = build_router(source, legacy_env)?;
    let criteria = FilterCriteria {
        state: command.state,
        group: command.group,
        alert_name: command.alert_name,
    };
    let report = router
        .list_alerts(&command.server, &criteria, DetailLevel::from_extended(command.extended))
        .await
        .map_err(|err| CliError::new(err.to_string()))?;
    let value = serde_json::to_value(&report)
        .map_err(|err| CliError::new(format!("json serialization failed: {err}")))?;
    write_json(&value)?;
    Ok(ExitCode::SUCCESS)
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Loads and validates runtime settings.
fn load_settings(source: &dyn ConfigSource) -> CliResult<ProxySettings> {
    ProxySettings::from_source(source).map_err(|err| CliError::new(err.to_string()))
}

/// Loads the server registry, applying the legacy fallback when requested.
fn load_registry(
    source: &dyn ConfigSource,
    legacy_env: bool,
    sink: &dyn DiagnosticSink,
) -> ServerRegistry {
    let registry = RegistryBuilder::default().load(source, sink);
    if legacy_env { registry.with_legacy_fallback(source, sink) } else { registry }
}

/// Builds a tool router over the HTTP client.
fn build_router(source: &dyn ConfigSource, legacy_env: bool) -> CliResult<ToolRouter> {
    let settings = load_settings(source)?;
    let registry = load_registry(source, legacy_env, &StderrDiagnosticSink);
    let client = HttpPrometheusClient::new(&settings)
        .map_err(|err| CliError::new(format!("http client init failed: {err}")))?;
    Ok(ToolRouter::new(Arc::new(registry), Arc::new(client)))
}

/// Loads configuration with collected diagnostics.
///
/// Returns the report and whether at least one server loaded with valid
/// settings.
fn config_report(source: &dyn ConfigSource, legacy_env: bool) -> (Value, bool) {
    let sink = CollectingDiagnosticSink::new();
    let registry = load_registry(source, legacy_env, &sink);
    let settings = ProxySettings::from_source(source);
    let healthy = !registry.is_empty() && settings.is_ok();
    let report = json!({
        "servers": registry.names().collect::<Vec<_>>(),
        "diagnostics": sink.snapshot(),
        "settings_error": settings.err().map(|err| err.to_string()),
        "ok": healthy,
    });
    (report, healthy)
}

/// Writes pretty JSON followed by a newline to stdout.
fn write_json(value: &Value) -> CliResult<()> {
    let rendered = serde_json::to_string_pretty(value)
        .map_err(|err| CliError::new(format!("json serialization failed: {err}")))?;
    write_stdout_line(&rendered)
}

/// Writes a line to stdout.
fn write_stdout_line(message: &str) -> CliResult<()> {
    let mut stdout = std::io::stdout();
    writeln!(&mut stdout, "{message}")
        .map_err(|err| CliError::new(format!("failed to write stdout: {err}")))
}

/// Writes a line to stderr.
fn write_stderr_line(message: &str) -> std::io::Result<()> {
    let mut stderr = std::io::stderr();
    writeln!(&mut stderr, "{message}")
}

/// Emits an error message and returns a failure exit code.
fn emit_error(message: &str) -> ExitCode {
    let _ = write_stderr_line(message);
    ExitCode::FAILURE
}
