// crates/prometheus-mcp-server/tests/tool_router.rs
// ============================================================================
// Module: Tool Router Tests
// Description: Tool dispatch against a fake Prometheus API.
// Purpose: Validate server resolution, per-server isolation, and alert output.
// Dependencies: prometheus-mcp-server, prometheus-mcp-client, async-trait, tokio
// ============================================================================

//! ## Overview
//! The fake API answers per server name, so tests can mix healthy and
//! failing servers in one registry.

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

use std::collections::BTreeMap;
use std::sync::Arc;
use std::sync::Mutex;

use async_trait::async_trait;
use prometheus_mcp_alerts::DetailLevel;
use prometheus_mcp_alerts::FilterCriteria;
use prometheus_mcp_client::ClientError;
use prometheus_mcp_client::PrometheusApi;
use prometheus_mcp_config::MapSource;
use prometheus_mcp_config::NoopDiagnosticSink;
use prometheus_mcp_config::RegistryBuilder;
use prometheus_mcp_config::ServerDescriptor;
use prometheus_mcp_server::ToolError;
use prometheus_mcp_server::ToolRouter;
use serde_json::Value;
use serde_json::json;

// ============================================================================
// SECTION: Fake API
// ============================================================================

/// Canned per-server responses.
#[derive(Default)]
struct FakeApi {
    /// Rules responses keyed by server name.
    rules: BTreeMap<String, Result<Value, ClientError>>,
    /// Build info responses keyed by server name.
    build_info: BTreeMap<String, Result<Value, ClientError>>,
    /// Server names seen by calls, in call order.
    calls: Mutex<Vec<String>>,
}

impl FakeApi {
    /// Looks up a canned response and records the call.
    fn answer(
        &self,
        table: &BTreeMap<String, Result<Value, ClientError>>,
        server: &ServerDescriptor,
    ) -> Result<Value, ClientError> {
        self.calls.lock().unwrap().push(server.name().to_string());
        table
            .get(server.name())
            .cloned()
            .unwrap_or_else(|| Err(ClientError::Connect("no route".to_string())))
    }
}

#[async_trait]
impl PrometheusApi for FakeApi {
    async fn fetch_rules(&self, server: &ServerDescriptor) -> Result<Value, ClientError> {
        self.answer(&self.rules, server)
    }

    async fn fetch_build_info(&self, server: &ServerDescriptor) -> Result<Value, ClientError> {
        self.answer(&self.build_info, server)
    }
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Registry with `prod` (token) and `dev` (no token) servers.
fn router(api: FakeApi) -> (ToolRouter, Arc<FakeApi>) {
    let source = MapSource::new()
        .with(
            "PROMETHEUS_SERVER_0",
            r#"{"name":"prod","url":"https://prom.example","description":"Production","token":"tok-prod"}"#,
        )
        .with("PROMETHEUS_SERVER_1", r#"{"name":"dev","url":"http://dev:9090","verify_ssl":false}"#);
    let registry = RegistryBuilder::default().load(&source, &NoopDiagnosticSink);
    let api = Arc::new(api);
    (ToolRouter::new(Arc::new(registry), api.clone()), api)
}

/// Rules document with one group and three alerting rules.
fn rules_document() -> Value {
    json!({
        "status": "success",
        "data": {"groups": [{
            "name": "node",
            "file": "/etc/prometheus/node.yml",
            "interval": 30,
            "rules": [
                {"type": "alerting", "name": "HighCPU", "query": "cpu > 90", "duration": 300,
                 "state": "firing", "labels": {"severity": "critical"},
                 "annotations": {"summary": "CPU high"}, "alerts": [{}], "health": "ok"},
                {"type": "alerting", "name": "DiskFull", "query": "disk > 95", "duration": 60,
                 "state": "pending", "labels": {"severity": "warning"},
                 "annotations": {}, "alerts": [{}], "health": "ok"},
                {"type": "alerting", "name": "Down", "query": "up == 0", "duration": 0,
                 "state": "inactive", "labels": {}, "annotations": {}, "alerts": [], "health": "ok"},
                {"type": "recording", "name": "job:rate", "query": "rate(x[5m])", "health": "ok"}
            ]
        }]}
    })
}

// ============================================================================
// SECTION: list_servers
// ============================================================================

#[tokio::test]
async fn list_servers_reports_public_fields_without_tokens() {
    let (router, _) = router(FakeApi::default());
    let result = router.handle_tool_call("list_servers", Value::Null).await.unwrap();
    assert_eq!(result["count"], 2);
    let prod = result["servers"]
        .as_array()
        .unwrap()
        .iter()
        .find(|server| server["name"] == "prod")
        .unwrap();
    assert_eq!(prod["url"], "https://prom.example");
    assert_eq!(prod["description"], "Production");
    assert_eq!(prod["verify_ssl"], true);
    assert_eq!(prod["has_token"], true);
    assert!(!result.to_string().contains("tok-prod"));
}

#[tokio::test]
async fn list_servers_rejects_unknown_arguments() {
    let (router, _) = router(FakeApi::default());
    let err = router.handle_tool_call("list_servers", json!({"verbose": true})).await.unwrap_err();
    assert!(matches!(err, ToolError::InvalidParams(_)));
}

#[tokio::test]
async fn unknown_tool_is_rejected() {
    let (router, _) = router(FakeApi::default());
    let err = router.handle_tool_call("query", json!({})).await.unwrap_err();
    assert_eq!(err, ToolError::UnknownTool);
}

// ============================================================================
// SECTION: check_connection
// ============================================================================

#[tokio::test]
async fn check_connection_reports_each_server_independently() {
    let mut api = FakeApi::default();
    api.build_info.insert(
        "prod".to_string(),
        Ok(json!({"status": "success", "data": {"version": "2.53.0"}})),
    );
    api.build_info.insert("dev".to_string(), Err(ClientError::Timeout));
    let (router, fake) = router(api);
    let result = router.handle_tool_call("check_connection", json!({})).await.unwrap();
    let results = result["results"].as_array().unwrap();
    assert_eq!(results.len(), 2);
    let by_name = |name: &str| results.iter().find(|report| report["server"] == name).unwrap();
    assert_eq!(by_name("prod")["status"], "success");
    assert_eq!(by_name("prod")["build_info"]["version"], "2.53.0");
    assert_eq!(by_name("dev")["status"], "error");
    assert_eq!(by_name("dev")["error_kind"], "timeout");
    assert_eq!(by_name("dev")["message"], "connection timeout");
    assert_eq!(fake.calls.lock().unwrap().len(), 2);
}

#[tokio::test]
async fn check_connection_single_server_reports_status_code() {
    let mut api = FakeApi::default();
    api.build_info.insert(
        "dev".to_string(),
        Err(ClientError::Status {
            status: 503,
            body: "down".to_string(),
        }),
    );
    let (router, fake) = router(api);
    let reports = router.check_connection(Some("dev")).await.unwrap();
    assert_eq!(reports.len(), 1);
    assert_eq!(reports[0].status_code, Some(503));
    assert_eq!(reports[0].details, Some(json!("down")));
    assert_eq!(*fake.calls.lock().unwrap(), vec!["dev".to_string()]);
}

#[tokio::test]
async fn check_connection_unknown_server_lists_available() {
    let (router, fake) = router(FakeApi::default());
    let err = router.handle_tool_call("check_connection", json!({"server": "qa"})).await.unwrap_err();
    match err {
        ToolError::UnknownServer {
            server,
            available,
        } => {
            assert_eq!(server, "qa");
            assert_eq!(available, vec!["dev".to_string(), "prod".to_string()]);
        }
        other => panic!("unexpected error: {other:?}"),
    }
    assert!(fake.calls.lock().unwrap().is_empty());
}

// ============================================================================
// SECTION: list_alerts
// ============================================================================

#[tokio::test]
async fn list_alerts_filters_and_summarizes() {
    let mut api = FakeApi::default();
    api.rules.insert("prod".to_string(), Ok(rules_document()));
    let (router, _) = router(api);
    let result = router
        .handle_tool_call("list_alerts", json!({"server": "prod", "state": "firing"}))
        .await
        .unwrap();
    assert_eq!(result["server"], "prod");
    assert_eq!(result["summary"]["total"], 1);
    assert_eq!(result["summary"]["firing"], 1);
    assert_eq!(result["appliedFilters"]["state"], "firing");
    let rule = &result["groups"][0]["rules"][0];
    assert_eq!(rule["name"], "HighCPU");
    assert_eq!(rule["severity"], "critical");
    assert!(rule.get("query").is_none());
}

#[tokio::test]
async fn list_alerts_extended_includes_query_and_labels() {
    let mut api = FakeApi::default();
    api.rules.insert("prod".to_string(), Ok(rules_document()));
    let (router, _) = router(api);
    let result = router
        .handle_tool_call(
            "list_alerts",
            json!({"server": "prod", "alert_name": "DiskFull", "extended": true}),
        )
        .await
        .unwrap();
    assert_eq!(result["summary"]["total"], 1);
    let rule = &result["groups"][0]["rules"][0];
    assert_eq!(rule["query"], "disk > 95");
    assert_eq!(rule["labels"]["severity"], "warning");
}

#[tokio::test]
async fn list_alerts_without_filters_counts_every_alerting_rule() {
    let mut api = FakeApi::default();
    api.rules.insert("prod".to_string(), Ok(rules_document()));
    let (router, _) = router(api);
    let result = router.handle_tool_call("list_alerts", json!({"server": "prod"})).await.unwrap();
    assert_eq!(result["summary"]["total"], 3);
    assert_eq!(result["summary"]["pending"], 1);
    assert_eq!(result["summary"]["inactive"], 1);
}

#[tokio::test]
async fn list_alerts_requires_server_argument() {
    let (router, _) = router(FakeApi::default());
    let err = router.handle_tool_call("list_alerts", json!({})).await.unwrap_err();
    assert!(matches!(err, ToolError::InvalidParams(_)));
}

#[tokio::test]
async fn list_alerts_upstream_failure_is_reported() {
    let mut api = FakeApi::default();
    api.rules.insert("dev".to_string(), Err(ClientError::Connect("refused".to_string())));
    let (router, _) = router(api);
    let err = router.handle_tool_call("list_alerts", json!({"server": "dev"})).await.unwrap_err();
    assert_eq!(err.code(), -32020);
    assert!(err.to_string().contains("dev"));
}

#[tokio::test]
async fn list_alerts_unsuccessful_document_is_upstream_error() {
    let mut api = FakeApi::default();
    api.rules.insert(
        "prod".to_string(),
        Ok(json!({"status": "error", "errorType": "internal", "error": "boom"})),
    );
    let (router, _) = router(api);
    let err = router.handle_tool_call("list_alerts", json!({"server": "prod"})).await.unwrap_err();
    let ToolError::Upstream {
        status_code,
        details,
        ..
    } = err
    else {
        panic!("expected upstream error, got {err:?}");
    };
    assert_eq!(status_code, None);
    let details = details.unwrap();
    assert_eq!(details["errorType"], "internal");
    assert_eq!(details["error"], "boom");
}

#[tokio::test]
async fn list_alerts_status_failure_keeps_code_and_body() {
    let mut api = FakeApi::default();
    api.rules.insert(
        "prod".to_string(),
        Err(ClientError::Status {
            status: 503,
            body: "tsdb overloaded".to_string(),
        }),
    );
    let (router, _) = router(api);
    let err = router
        .list_alerts("prod", &FilterCriteria::default(), DetailLevel::Minimal)
        .await
        .unwrap_err();
    assert_eq!(
        err,
        ToolError::Upstream {
            server: "prod".to_string(),
            message: "unexpected http status 503".to_string(),
            status_code: Some(503),
            details: Some(json!("tsdb overloaded")),
        }
    );
}

#[tokio::test]
async fn failing_server_does_not_affect_other_server() {
    let mut api = FakeApi::default();
    api.rules.insert("prod".to_string(), Ok(rules_document()));
    api.rules.insert("dev".to_string(), Err(ClientError::Timeout));
    let (router, _) = router(api);
    assert!(router.handle_tool_call("list_alerts", json!({"server": "dev"})).await.is_err());
    let result = router.handle_tool_call("list_alerts", json!({"server": "prod"})).await.unwrap();
    assert_eq!(result["summary"]["total"], 3);
}
