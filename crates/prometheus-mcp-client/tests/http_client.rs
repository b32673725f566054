// crates/prometheus-mcp-client/tests/http_client.rs
// ============================================================================
// Module: HTTP Client Tests
// Description: Tests for the reqwest-backed Prometheus client.
// Purpose: Validate paths, auth headers, limits, redirects, and error mapping.
// Dependencies: prometheus-mcp-client, prometheus-mcp-config, tiny_http, tokio
// ============================================================================

//! ## Overview
//! Each test spins up a single-request `tiny_http` server on a loopback port
//! and records what the client sent.

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

use std::net::TcpListener;
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use prometheus_mcp_client::ClientError;
use prometheus_mcp_client::HttpPrometheusClient;
use prometheus_mcp_client::PrometheusApi;
use prometheus_mcp_config::ProxySettings;
use prometheus_mcp_config::ServerDescriptor;
use tiny_http::Header;
use tiny_http::Response;
use tiny_http::Server;

// ============================================================================
// SECTION: Test Helpers
// ============================================================================

/// Request details observed by the test server.
struct Observed {
    /// Request path.
    url: String,
    /// Authorization header value, if sent.
    authorization: Option<String>,
}

/// Canned response served by the test server.
struct Canned {
    /// Response body.
    body: String,
    /// Response status code.
    status: u16,
    /// Extra response headers.
    headers: Vec<(&'static str, &'static str)>,
    /// Delay before responding.
    delay: Duration,
}

impl Canned {
    /// JSON body with status 200.
    fn ok(body: &str) -> Self {
        Self {
            body: body.to_string(),
            status: 200,
            headers: Vec::new(),
            delay: Duration::ZERO,
        }
    }
}

/// Spawns a server that answers one request and reports what it received.
fn spawn_server(canned: Canned) -> (String, mpsc::Receiver<Observed>, thread::JoinHandle<()>) {
    let server = Server::http("127.0.0.1:0").unwrap();
    let addr = server.server_addr().to_ip().unwrap();
    let (sender, receiver) = mpsc::channel();
    let handle = thread::spawn(move || {
        if let Ok(request) = server.recv() {
            let authorization = request
                .headers()
                .iter()
                .find(|header| header.field.equiv("Authorization"))
                .map(|header| header.value.as_str().to_string());
            let _ = sender.send(Observed {
                url: request.url().to_string(),
                authorization,
            });
            thread::sleep(canned.delay);
            let mut response = Response::from_string(canned.body).with_status_code(canned.status);
            for (field, value) in canned.headers {
                response.add_header(Header::from_bytes(field, value).unwrap());
            }
            let _ = request.respond(response);
        }
    });
    (format!("http://{addr}"), receiver, handle)
}

/// Creates a descriptor for the test server.
fn descriptor(url: &str, token: &str) -> ServerDescriptor {
    ServerDescriptor::new("test", url).unwrap().with_token(token)
}

/// Creates a client with default settings.
fn client() -> HttpPrometheusClient {
    HttpPrometheusClient::new(&ProxySettings::default()).unwrap()
}

// ============================================================================
// SECTION: Happy Path
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn fetch_rules_sends_bearer_token_to_rules_endpoint() {
    let (url, observed, handle) = spawn_server(Canned::ok(r#"{"status":"success","data":{"groups":[]}}"#));
    let server = descriptor(&format!("{url}/"), "secret-token");
    let body = client().fetch_rules(&server).await.unwrap();
    assert_eq!(body["status"], "success");
    let observed = observed.recv().unwrap();
    assert_eq!(observed.url, "/api/v1/rules");
    assert_eq!(observed.authorization.as_deref(), Some("Bearer secret-token"));
    handle.join().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn fetch_build_info_omits_auth_without_token() {
    let (url, observed, handle) =
        spawn_server(Canned::ok(r#"{"status":"success","data":{"version":"2.53.0"}}"#));
    let body = client().fetch_build_info(&descriptor(&url, "")).await.unwrap();
    assert_eq!(body["data"]["version"], "2.53.0");
    let observed = observed.recv().unwrap();
    assert_eq!(observed.url, "/api/v1/status/buildinfo");
    assert!(observed.authorization.is_none());
    handle.join().unwrap();
}

// ============================================================================
// SECTION: Error Mapping
// ============================================================================

#[tokio::test(flavor = "multi_thread")]
async fn non_success_status_is_reported_with_body() {
    let (url, _observed, handle) = spawn_server(Canned {
        status: 503,
        ..Canned::ok("service unavailable")
    });
    let err = client().fetch_rules(&descriptor(&url, "")).await.unwrap_err();
    assert_eq!(err, ClientError::Status {
        status: 503,
        body: "service unavailable".to_string(),
    });
    handle.join().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn redirects_are_not_followed() {
    let (url, _observed, handle) = spawn_server(Canned {
        status: 302,
        headers: vec![("Location", "http://127.0.0.1:1/elsewhere")],
        ..Canned::ok("")
    });
    let err = client().fetch_rules(&descriptor(&url, "")).await.unwrap_err();
    assert!(matches!(err, ClientError::Status { status: 302, .. }));
    handle.join().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn invalid_json_is_a_decode_error() {
    let (url, _observed, handle) = spawn_server(Canned::ok("<html>not json</html>"));
    let err = client().fetch_rules(&descriptor(&url, "")).await.unwrap_err();
    assert!(matches!(err, ClientError::Decode(_)));
    handle.join().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn oversized_body_is_rejected() {
    let (url, _observed, handle) = spawn_server(Canned::ok(&"x".repeat(4096)));
    let settings = ProxySettings {
        max_response_bytes: 1024,
        ..ProxySettings::default()
    };
    let client = HttpPrometheusClient::new(&settings).unwrap();
    let err = client.fetch_rules(&descriptor(&url, "")).await.unwrap_err();
    assert_eq!(err, ClientError::ResponseTooLarge {
        limit: 1024,
    });
    handle.join().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn slow_server_times_out() {
    let (url, _observed, handle) = spawn_server(Canned {
        delay: Duration::from_millis(1500),
        ..Canned::ok("{}")
    });
    let settings = ProxySettings {
        timeout_ms: 200,
        ..ProxySettings::default()
    };
    let client = HttpPrometheusClient::new(&settings).unwrap();
    let err = client.fetch_rules(&descriptor(&url, "")).await.unwrap_err();
    assert_eq!(err, ClientError::Timeout);
    handle.join().unwrap();
}

#[tokio::test(flavor = "multi_thread")]
async fn refused_connection_is_a_connect_error() {
    let port = {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        listener.local_addr().unwrap().port()
    };
    let err = client()
        .fetch_rules(&descriptor(&format!("http://127.0.0.1:{port}"), ""))
        .await
        .unwrap_err();
    assert!(matches!(err, ClientError::Connect(_)), "unexpected error: {err:?}");
}

#[tokio::test(flavor = "multi_thread")]
async fn error_messages_never_include_token() {
    let (url, _observed, handle) = spawn_server(Canned {
        status: 401,
        ..Canned::ok("unauthorized")
    });
    let err = client().fetch_rules(&descriptor(&url, "do-not-leak")).await.unwrap_err();
    assert!(!err.to_string().contains("do-not-leak"));
    assert!(!format!("{err:?}").contains("do-not-leak"));
    handle.join().unwrap();
}
