// crates/prometheus-mcp-config/src/lib.rs
// ============================================================================
// Module: Prometheus MCP Config Library
// Description: Server registry loading, runtime settings, and diagnostics.
// Purpose: Single source of truth for Prometheus server connection semantics.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `prometheus-mcp-config` turns the indexed `PROMETHEUS_SERVER_<n>`
//! environment slots into an immutable [`ServerRegistry`]. Each slot holds a
//! JSON object describing one Prometheus server. Bad slots never abort the
//! load: every rejection is reported as a structured [`ConfigDiagnostic`]
//! through an injectable [`DiagnosticSink`] and the remaining slots continue.
//! Invariants:
//! - Only slots `0..=9` contribute entries, scanned in ascending order.
//! - Server names are unique; the lowest slot defining a name wins.
//! - Bearer tokens never appear in diagnostics or `Debug` output.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod descriptor;
pub mod diagnostics;
pub mod entry;
pub mod registry;
pub mod scanner;
pub mod settings;
pub mod source;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use descriptor::InvalidVerifySsl;
pub use descriptor::ResolvedVerifySsl;
pub use descriptor::ServerDescriptor;
pub use descriptor::VerifySslValue;
pub use descriptor::resolve_verify_ssl;
pub use diagnostics::CollectingDiagnosticSink;
pub use diagnostics::ConfigDiagnostic;
pub use diagnostics::DiagnosticKind;
pub use diagnostics::DiagnosticSink;
pub use diagnostics::NoopDiagnosticSink;
pub use diagnostics::StderrDiagnosticSink;
pub use entry::ParsedEntry;
pub use entry::RejectionReason;
pub use entry::parse_server_entry;
pub use registry::LEGACY_SERVER_NAME;
pub use registry::RegistryBuilder;
pub use registry::SERVER_ENV_PREFIX;
pub use registry::ServerRegistry;
pub use registry::SlotIndex;
pub use registry::slot_key;
pub use scanner::scan_out_of_range;
pub use settings::ConfigError;
pub use settings::ProxySettings;
pub use source::ConfigSource;
pub use source::EnvSource;
pub use source::MapSource;
