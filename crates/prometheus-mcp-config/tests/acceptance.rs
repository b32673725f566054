// crates/prometheus-mcp-config/tests/acceptance.rs
// ============================================================================
// Module: Registry Acceptance Tests
// Description: Reference configurations and their expected registries.
// Purpose: Lock in the documented outcome for canonical slot layouts.
// Dependencies: prometheus-mcp-config
// ============================================================================

//! Reference configurations and their expected registries.

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

use prometheus_mcp_config::CollectingDiagnosticSink;
use prometheus_mcp_config::RegistryBuilder;
use prometheus_mcp_config::RejectionReason;
use prometheus_mcp_config::ServerDescriptor;
use prometheus_mcp_config::ServerRegistry;
use prometheus_mcp_config::SlotIndex;

/// Builds a registry from a fixed slot table.
fn build(slots: &[(u8, &str)]) -> (ServerRegistry, CollectingDiagnosticSink) {
    let sink = CollectingDiagnosticSink::new();
    let registry = RegistryBuilder::default().build(
        |slot| {
            slots
                .iter()
                .find(|(index, _)| *index == slot.get())
                .map(|(_, raw)| (*raw).to_string())
        },
        &sink,
    );
    (registry, sink)
}

#[test]
fn single_slot_gets_defaults() {
    let (registry, sink) = build(&[(0, r#"{"name":"prod","url":"http://x"}"#)]);
    let expected = ServerDescriptor::new("prod", "http://x").unwrap();
    assert_eq!(registry.len(), 1);
    assert_eq!(registry.get("prod"), Some(&expected));
    assert!(sink.snapshot().is_empty());
}

#[test]
fn duplicate_keeps_lower_slot_and_names_both() {
    let (registry, sink) = build(&[
        (0, r#"{"name":"a","url":"http://x"}"#),
        (5, r#"{"name":"a","url":"http://y"}"#),
    ]);
    assert_eq!(registry.get("a").unwrap().url(), "http://x");
    let diagnostics = sink.snapshot();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].slot, SlotIndex::new(5));
    assert_eq!(
        diagnostics[0].rejection,
        Some(RejectionReason::DuplicateName(SlotIndex::new(0).unwrap()))
    );
    assert!(diagnostics[0].detail.contains("PROMETHEUS_SERVER_5"));
    assert!(diagnostics[0].detail.contains("slot 0"));
}

#[test]
fn missing_url_leaves_registry_empty() {
    let (registry, sink) = build(&[(2, r#"{"name":"test"}"#)]);
    assert!(registry.is_empty());
    let diagnostics = sink.snapshot();
    assert_eq!(diagnostics.len(), 1);
    assert_eq!(diagnostics[0].slot, SlotIndex::new(2));
    assert_eq!(diagnostics[0].rejection, Some(RejectionReason::MissingField("url")));
}

#[test]
fn verify_ssl_yes_and_no() {
    let (registry, _) = build(&[
        (0, r#"{"name":"s","url":"u","verify_ssl":"yes"}"#),
        (1, r#"{"name":"t","url":"u","verify_ssl":"no"}"#),
    ]);
    assert!(registry.get("s").unwrap().verify_ssl());
    assert!(!registry.get("t").unwrap().verify_ssl());
}
