// crates/prometheus-mcp-config/src/entry.rs
// ============================================================================
// Module: Server Entry Parser
// Description: Parses one slot's JSON document into a server descriptor.
// Purpose: Validate required fields and apply documented defaults.
// Dependencies: serde, serde_json, thiserror
// ============================================================================

//! ## Overview
//! [`parse_server_entry`] turns the raw value of one configuration slot into
//! a [`ServerDescriptor`] or a typed [`RejectionReason`]. Slot documents follow
//! this shape:
//!
//! ```json
//! { "name": "prod", "url": "https://prom.example.com",
//!   "description": "optional", "token": "optional", "verify_ssl": true }
//! ```
//!
//! Required fields are checked in the order `name`, `url`. Unknown fields are
//! ignored.

// ============================================================================
// SECTION: Imports
// ============================================================================

use serde::Serialize;
use serde_json::Map;
use serde_json::Value;
use thiserror::Error;

use crate::descriptor::InvalidVerifySsl;
use crate::descriptor::ServerDescriptor;
use crate::descriptor::VerifySslValue;
use crate::descriptor::json_type_name;
use crate::descriptor::resolve_verify_ssl;
use crate::registry::SlotIndex;

// ============================================================================
// SECTION: Types
// ============================================================================

/// Reason a slot did not produce a registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Error, Serialize)]
#[serde(tag = "reason", content = "detail", rename_all = "snake_case")]
pub enum RejectionReason {
    /// Slot has no value; skipped without a diagnostic.
    #[error("slot is empty")]
    EmptySlot,
    /// Slot value is not a JSON object.
    #[error("failed to parse JSON: {0}")]
    ParseError(String),
    /// Required field is missing, empty, or not a string.
    #[error("missing required field '{0}'")]
    MissingField(&'static str),
    /// Name contains only whitespace.
    #[error("server name must not be blank")]
    EmptyName,
    /// Name already registered by an earlier slot.
    #[error("duplicate server name already defined by slot {0}")]
    DuplicateName(SlotIndex),
}

/// Successfully parsed slot entry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedEntry {
    /// Validated descriptor.
    pub descriptor: ServerDescriptor,
    /// Soft warning raised while resolving `verify_ssl`.
    pub verify_ssl_warning: Option<InvalidVerifySsl>,
}

// ============================================================================
// SECTION: Parser
// ============================================================================

/// Parses a raw slot value into a validated server entry.
///
/// # Errors
///
/// Returns [`RejectionReason::EmptySlot`] for absent or empty input,
/// [`RejectionReason::ParseError`] when the input is not a JSON object, and
/// [`RejectionReason::MissingField`] / [`RejectionReason::EmptyName`] when
/// required fields fail validation.
pub fn parse_server_entry(raw: Option<&str>) -> Result<ParsedEntry, RejectionReason> {
    let raw = match raw {
        Some(raw) if !raw.is_empty() => raw,
        _ => return Err(RejectionReason::EmptySlot),
    };
    let document: Value =
        serde_json::from_str(raw).map_err(|err| RejectionReason::ParseError(err.to_string()))?;
    let Value::Object(fields) = document else {
        return Err(RejectionReason::ParseError(format!(
            "expected a JSON object, found {}",
            json_type_name(&document)
        )));
    };

    let name = required_string(&fields, "name")?;
    let url = required_string(&fields, "url")?;
    let verify_ssl = resolve_verify_ssl(VerifySslValue::from_json(fields.get("verify_ssl")));
    let descriptor = ServerDescriptor::new(name, url)?
        .with_description(coerce_string(fields.get("description")))
        .with_token(coerce_string(fields.get("token")))
        .with_verify_ssl(verify_ssl.enabled);
    Ok(ParsedEntry {
        descriptor,
        verify_ssl_warning: verify_ssl.warning,
    })
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Extracts a required non-empty string field.
fn required_string<'a>(
    fields: &'a Map<String, Value>,
    field: &'static str,
) -> Result<&'a str, RejectionReason> {
    match fields.get(field) {
        Some(Value::String(value)) if !value.is_empty() => Ok(value),
        _ => Err(RejectionReason::MissingField(field)),
    }
}

/// Coerces an optional field to a string; absent and `null` become empty.
fn coerce_string(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(text)) => text.clone(),
        Some(other) => other.to_string(),
    }
}
