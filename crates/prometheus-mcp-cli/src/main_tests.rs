// crates/prometheus-mcp-cli/src/main_tests.rs
// ============================================================================
// Module: CLI Main Helpers Tests
// Description: Unit tests for argument parsing and config reporting.
// Purpose: Ensure commands parse and config checks fail closed.
// Dependencies: prometheus-mcp-cli main helpers
// ============================================================================

//! ## Overview
//! Exercises the CLI helpers against explicit [`MapSource`] inputs so no
//! test depends on the process environment.

#![allow(
    clippy::panic,
    clippy::print_stdout,
    clippy::print_stderr,
    clippy::unwrap_used,
    clippy::expect_used,
    clippy::use_debug,
    clippy::dbg_macro,
    clippy::panic_in_result_fn,
    clippy::unwrap_in_result,
    reason = "Test-only output and panic-based assertions are permitted."
)]

// ============================================================================
// SECTION: Imports
// ============================================================================

use clap::Parser;
use prometheus_mcp_config::MapSource;
use prometheus_mcp_config::NoopDiagnosticSink;
use prometheus_mcp_server::servers_summary;

use super::Cli;
use super::Commands;
use super::ConfigCommand;
use super::config_report;
use super::load_registry;

// ============================================================================
// SECTION: Argument Parsing
// ============================================================================

#[test]
fn alerts_command_parses_all_filters() {
    let cli = Cli::try_parse_from([
        "prometheus-mcp",
        "alerts",
        "--server",
        "prod",
        "--state",
        "firing",
        "--group",
        "node",
        "--alert-name",
        "HighCPU",
        "--extended",
    ])
    .unwrap();
    let Some(Commands::Alerts(command)) = cli.command else {
        panic!("expected alerts command");
    };
    assert_eq!(command.server, "prod");
    assert_eq!(command.state.as_deref(), Some("firing"));
    assert_eq!(command.group.as_deref(), Some("node"));
    assert_eq!(command.alert_name.as_deref(), Some("HighCPU"));
    assert!(command.extended);
}

#[test]
fn alerts_command_requires_server() {
    assert!(Cli::try_parse_from(["prometheus-mcp", "alerts"]).is_err());
}

#[test]
fn legacy_env_flag_is_global() {
    let cli = Cli::try_parse_from(["prometheus-mcp", "config", "check", "--legacy-env"]).unwrap();
    assert!(cli.legacy_env);
    assert!(matches!(
        cli.command,
        Some(Commands::Config {
            command: ConfigCommand::Check
        })
    ));
}

#[test]
fn no_subcommand_parses() {
    let cli = Cli::try_parse_from(["prometheus-mcp"]).unwrap();
    assert!(cli.command.is_none());
    assert!(!cli.legacy_env);
}

// ============================================================================
// SECTION: Config Reporting
// ============================================================================

#[test]
fn config_check_fails_when_registry_is_empty() {
    let source = MapSource::new().with("PROMETHEUS_SERVER_0", "not json");
    let (report, healthy) = config_report(&source, false);
    assert!(!healthy);
    assert_eq!(report["ok"], false);
    assert_eq!(report["servers"], serde_json::json!([]));
    assert_eq!(report["diagnostics"][0]["kind"], "slot_rejected");
}

#[test]
fn config_check_passes_with_one_server() {
    let source = MapSource::new()
        .with("PROMETHEUS_SERVER_3", r#"{"name":"prod","url":"http://prom:9090"}"#)
        .with("PROMETHEUS_SERVER_12", r#"{"name":"late","url":"http://x"}"#);
    let (report, healthy) = config_report(&source, false);
    assert!(healthy);
    assert_eq!(report["servers"], serde_json::json!(["prod"]));
    assert_eq!(report["diagnostics"][0]["kind"], "out_of_range");
    assert_eq!(report["settings_error"], serde_json::Value::Null);
}

#[test]
fn config_check_reports_invalid_settings() {
    let source = MapSource::new()
        .with("PROMETHEUS_SERVER_0", r#"{"name":"prod","url":"http://prom:9090"}"#)
        .with("PROMETHEUS_MCP_TIMEOUT_MS", "0");
    let (report, healthy) = config_report(&source, false);
    assert!(!healthy);
    assert!(report["settings_error"].is_string());
}

#[test]
fn legacy_fallback_only_applies_when_requested() {
    let source = MapSource::new().with("PROMETHEUS_URL", "http://legacy:9090");
    assert!(load_registry(&source, false, &NoopDiagnosticSink).is_empty());
    let registry = load_registry(&source, true, &NoopDiagnosticSink);
    assert_eq!(registry.names().collect::<Vec<_>>(), vec!["default"]);
}

#[test]
fn servers_output_hides_tokens() {
    let source = MapSource::new().with(
        "PROMETHEUS_SERVER_0",
        r#"{"name":"prod","url":"http://prom:9090","token":"cli-secret"}"#,
    );
    let registry = load_registry(&source, false, &NoopDiagnosticSink);
    let report = servers_summary(&registry);
    assert_eq!(report["count"], 1);
    assert_eq!(report["servers"][0]["has_token"], true);
    assert!(!report.to_string().contains("cli-secret"));
}
