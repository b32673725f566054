// crates/prometheus-mcp-config/src/diagnostics.rs
// ============================================================================
// Module: Configuration Diagnostics
// Description: Structured warning events raised while loading configuration.
// Purpose: Report recoverable configuration problems without aborting a load.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Configuration loading never fails on a bad slot. Each problem becomes a
//! [`ConfigDiagnostic`] delivered to a [`DiagnosticSink`]. Sinks emit JSON
//! lines so deployments can route them to their own logging pipeline.
//! Diagnostics never carry bearer tokens.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::io::Write;
use std::sync::Mutex;
use std::time::SystemTime;
use std::time::UNIX_EPOCH;

use serde::Serialize;

use crate::descriptor::InvalidVerifySsl;
use crate::entry::RejectionReason;
use crate::registry::SlotIndex;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Classification of a configuration diagnostic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum DiagnosticKind {
    /// Slot value was rejected by the entry parser.
    SlotRejected,
    /// Slot declared a name already used by a lower slot.
    DuplicateName,
    /// Slot carried a `verify_ssl` value of an unsupported type.
    InvalidVerifySsl,
    /// Key uses an index outside the supported slot range.
    OutOfRange,
    /// Registry was populated from legacy single-server variables.
    LegacyFallback,
}

/// Configuration diagnostic payload.
#[derive(Debug, Clone, Serialize)]
pub struct ConfigDiagnostic {
    /// Event identifier.
    pub event: &'static str,
    /// Event timestamp (milliseconds since epoch).
    pub timestamp_ms: u128,
    /// Diagnostic classification.
    pub kind: DiagnosticKind,
    /// Configuration key the diagnostic refers to.
    pub key: String,
    /// Slot index when the key maps to a supported slot.
    pub slot: Option<SlotIndex>,
    /// Rejection reason for rejected or duplicate slots.
    pub rejection: Option<RejectionReason>,
    /// Offending JSON type for `verify_ssl` warnings.
    pub value_type: Option<&'static str>,
    /// Human-readable detail.
    pub detail: String,
}

impl ConfigDiagnostic {
    /// Creates a diagnostic with a consistent timestamp.
    fn new(kind: DiagnosticKind, key: &str, slot: Option<SlotIndex>, detail: String) -> Self {
        let timestamp_ms =
            SystemTime::now().duration_since(UNIX_EPOCH).unwrap_or_default().as_millis();
        Self {
            event: "config_diagnostic",
            timestamp_ms,
            kind,
            key: key.to_string(),
            slot,
            rejection: None,
            value_type: None,
            detail,
        }
    }

    /// Builds a diagnostic for a slot the parser rejected.
    #[must_use]
    pub fn slot_rejected(key: &str, slot: SlotIndex, reason: RejectionReason) -> Self {
        let detail = format!("skipping {key}: {reason}");
        let mut diagnostic = Self::new(DiagnosticKind::SlotRejected, key, Some(slot), detail);
        diagnostic.rejection = Some(reason);
        diagnostic
    }

    /// Builds a diagnostic for a duplicate server name.
    #[must_use]
    pub fn duplicate_name(key: &str, slot: SlotIndex, name: &str, first: SlotIndex) -> Self {
        let reason = RejectionReason::DuplicateName(first);
        let detail = format!("skipping {key}: server name '{name}' already defined by slot {first}");
        let mut diagnostic = Self::new(DiagnosticKind::DuplicateName, key, Some(slot), detail);
        diagnostic.rejection = Some(reason);
        diagnostic
    }

    /// Builds a warning for a `verify_ssl` value of an unsupported type.
    #[must_use]
    pub fn invalid_verify_ssl(key: &str, slot: SlotIndex, warning: InvalidVerifySsl) -> Self {
        let detail = format!(
            "{key}: verify_ssl has unsupported type {}, defaulting to true",
            warning.value_type
        );
        let mut diagnostic = Self::new(DiagnosticKind::InvalidVerifySsl, key, Some(slot), detail);
        diagnostic.value_type = Some(warning.value_type);
        diagnostic
    }

    /// Builds a warning for a key outside the supported slot range.
    #[must_use]
    pub fn out_of_range(key: &str) -> Self {
        let detail = format!("ignoring {key}: only indices 0 through 9 are supported");
        Self::new(DiagnosticKind::OutOfRange, key, None, detail)
    }

    /// Builds a notice that legacy single-server variables were used.
    #[must_use]
    pub fn legacy_fallback(key: &str) -> Self {
        let detail = format!("no indexed servers configured; registered 'default' from {key}");
        Self::new(DiagnosticKind::LegacyFallback, key, None, detail)
    }
}

// ============================================================================
// SECTION: Sinks
// ============================================================================

/// Destination for configuration diagnostics.
pub trait DiagnosticSink: Send + Sync {
    /// Record a diagnostic.
    fn record(&self, diagnostic: &ConfigDiagnostic);
}

/// Sink that writes JSON lines to stderr.
pub struct StderrDiagnosticSink;

impl DiagnosticSink for StderrDiagnosticSink {
    fn record(&self, diagnostic: &ConfigDiagnostic) {
        if let Ok(payload) = serde_json::to_string(diagnostic) {
            let _ = writeln!(std::io::stderr(), "{payload}");
        }
    }
}

/// Sink that keeps diagnostics in memory.
#[derive(Default)]
pub struct CollectingDiagnosticSink {
    /// Recorded diagnostics in arrival order.
    diagnostics: Mutex<Vec<ConfigDiagnostic>>,
}

impl CollectingDiagnosticSink {
    /// Creates an empty collecting sink.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a copy of the recorded diagnostics.
    #[must_use]
    pub fn snapshot(&self) -> Vec<ConfigDiagnostic> {
        match self.diagnostics.lock() {
            Ok(guard) => guard.clone(),
            Err(poisoned) => poisoned.into_inner().clone(),
        }
    }

    /// Returns the recorded diagnostic kinds in arrival order.
    #[must_use]
    pub fn kinds(&self) -> Vec<DiagnosticKind> {
        self.snapshot().iter().map(|diagnostic| diagnostic.kind).collect()
    }
}

impl DiagnosticSink for CollectingDiagnosticSink {
    fn record(&self, diagnostic: &ConfigDiagnostic) {
        let mut guard = match self.diagnostics.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        };
        guard.push(diagnostic.clone());
    }
}

/// Sink that discards diagnostics.
pub struct NoopDiagnosticSink;

impl DiagnosticSink for NoopDiagnosticSink {
    fn record(&self, _diagnostic: &ConfigDiagnostic) {}
}
