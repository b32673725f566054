// crates/prometheus-mcp-alerts/src/document.rs
// ============================================================================
// Module: Rules Document
// Description: Parser for the Prometheus `/api/v1/rules` response envelope.
// Purpose: Extract alerting rule groups from an upstream JSON document.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! The rules endpoint answers with `{"status": "success", "data": {"groups":
//! [...]}}`. Any other status is an [`AlertDocumentError::Unsuccessful`] that
//! carries the full document for diagnosis. Recording rules are discarded;
//! a missing `data` or `groups` member yields no groups.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Deserialize;
use serde_json::Value;
use thiserror::Error;

use crate::rule::AlertRule;
use crate::rule::RuleGroup;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Envelope status reported for successful API calls.
const SUCCESS_STATUS: &str = "success";
/// Rule `type` value identifying alerting rules.
const ALERTING_RULE_TYPE: &str = "alerting";

// ============================================================================
// SECTION: Types
// ============================================================================

/// Group as it appears on the wire, before rule filtering.
#[derive(Deserialize)]
struct RawGroup {
    /// Group name.
    name: String,
    /// Rule file path.
    #[serde(default)]
    file: String,
    /// Evaluation interval in seconds.
    #[serde(default)]
    interval: Option<f64>,
    /// Alerting and recording rules.
    #[serde(default)]
    rules: Vec<Value>,
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Parses a rules document into alerting rule groups.
///
/// # Errors
///
/// Returns [`AlertDocumentError::Unsuccessful`] when the envelope status is
/// not `success` and [`AlertDocumentError::Malformed`] when groups or alerting
/// rules do not have the expected shape.
pub fn parse_rules_document(document: Value) -> Result<Vec<RuleGroup>, AlertDocumentError> {
    let status = document.get("status").and_then(Value::as_str).unwrap_or_default();
    if status != SUCCESS_STATUS {
        return Err(AlertDocumentError::Unsuccessful {
            status: status.to_string(),
            document,
        });
    }
    let Some(groups) = document.get("data").and_then(|data| data.get("groups")) else {
        return Ok(Vec::new());
    };
    let raw_groups: Vec<RawGroup> = serde_json::from_value(groups.clone())
        .map_err(|err| AlertDocumentError::Malformed(format!("rule groups: {err}")))?;
    raw_groups.into_iter().map(convert_group).collect()
}

/// Converts a wire group, keeping only alerting rules.
fn convert_group(raw: RawGroup) -> Result<RuleGroup, AlertDocumentError> {
    let mut rules = Vec::new();
    for rule in raw.rules {
        if rule.get("type").and_then(Value::as_str) != Some(ALERTING_RULE_TYPE) {
            continue;
        }
        let rule: AlertRule = serde_json::from_value(rule).map_err(|err| {
            AlertDocumentError::Malformed(format!("alerting rule in group '{}': {err}", raw.name))
        })?;
        rules.push(rule);
    }
    Ok(RuleGroup {
        name: raw.name,
        file: raw.file,
        interval: raw.interval,
        rules,
    })
}

// ============================================================================
// SECTION: Errors
// ============================================================================

/// Rules document errors.
#[derive(Debug, Error)]
pub enum AlertDocumentError {
    /// Upstream reported a non-success status.
    #[error("failed to retrieve alert rules: status '{status}'")]
    Unsuccessful {
        /// Reported status (empty when absent).
        status: String,
        /// Full upstream document.
        document: Value,
    },
    /// Document structure did not match the rules API.
    #[error("malformed rules document: {0}")]
    Malformed(String),
}
