// crates/prometheus-mcp-alerts/src/lib.rs
// ============================================================================
// Module: Prometheus MCP Alerts Library
// Description: Alert rule parsing, filtering, and summarization.
// Purpose: Turn a Prometheus rules document into a filtered alert report.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! `prometheus-mcp-alerts` parses the `/api/v1/rules` document into typed
//! [`RuleGroup`]s and reduces them with [`filter_alerts`]. Filtering is pure:
//! no I/O and no failure modes, so callers can run it on any thread.

// ============================================================================
// SECTION: Modules
// ============================================================================

pub mod document;
pub mod filter;
pub mod rule;

// ============================================================================
// SECTION: Re-Exports
// ============================================================================

pub use document::AlertDocumentError;
pub use document::parse_rules_document;
pub use filter::DetailLevel;
pub use filter::ExtendedRule;
pub use filter::FilterCriteria;
pub use filter::FilterResult;
pub use filter::FilterSummary;
pub use filter::FilteredGroup;
pub use filter::MinimalRule;
pub use filter::RuleView;
pub use filter::filter_alerts;
pub use rule::AlertRule;
pub use rule::AlertState;
pub use rule::RuleGroup;
