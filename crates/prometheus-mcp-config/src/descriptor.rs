// crates/prometheus-mcp-config/src/descriptor.rs
// ============================================================================
// Module: Server Descriptors
// Description: Validated connection parameters for one Prometheus server.
// Purpose: Hold normalized descriptor fields and resolve `verify_ssl` inputs.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! A [`ServerDescriptor`] is the validated, defaulted form of one server slot.
//! The raw `verify_ssl` field may arrive as a boolean, a string, or some other
//! JSON type; [`VerifySslValue`] captures that variant at the parsing boundary
//! and [`resolve_verify_ssl`] collapses it to a strict boolean so nothing past
//! the parser ever sees the raw form.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::fmt;

use serde::Serialize;
use serde_json::Value;

use crate::entry::RejectionReason;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// String values (compared case-insensitively) that enable TLS verification.
const VERIFY_SSL_TRUE_VALUES: [&str; 3] = ["true", "1", "yes"];

// ============================================================================
// SECTION: Server Descriptor
// ============================================================================

/// Connection parameters for a single Prometheus server.
///
/// # Invariants
/// - `name` and `url` are non-empty.
/// - `token` is a secret and is redacted from `Debug` output.
#[derive(Clone, PartialEq, Eq)]
pub struct ServerDescriptor {
    /// Registry lookup key.
    name: String,
    /// Base URL of the Prometheus server (opaque, not validated).
    url: String,
    /// Human-readable description.
    description: String,
    /// Bearer token sent with requests when non-empty.
    token: String,
    /// Whether TLS certificates are verified.
    verify_ssl: bool,
}

impl ServerDescriptor {
    /// Creates a descriptor with default optional fields.
    ///
    /// # Errors
    ///
    /// Returns [`RejectionReason::MissingField`] when `name` or `url` is empty
    /// and [`RejectionReason::EmptyName`] when `name` is only whitespace.
    pub fn new(name: impl Into<String>, url: impl Into<String>) -> Result<Self, RejectionReason> {
        let name = name.into();
        let url = url.into();
        if name.is_empty() {
            return Err(RejectionReason::MissingField("name"));
        }
        if name.trim().is_empty() {
            return Err(RejectionReason::EmptyName);
        }
        if url.is_empty() {
            return Err(RejectionReason::MissingField("url"));
        }
        Ok(Self {
            name,
            url,
            description: String::new(),
            token: String::new(),
            verify_ssl: true,
        })
    }

    /// Sets the description.
    #[must_use]
    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = description.into();
        self
    }

    /// Sets the bearer token.
    #[must_use]
    pub fn with_token(mut self, token: impl Into<String>) -> Self {
        self.token = token.into();
        self
    }

    /// Sets TLS certificate verification.
    #[must_use]
    pub const fn with_verify_ssl(mut self, verify_ssl: bool) -> Self {
        self.verify_ssl = verify_ssl;
        self
    }

    /// Returns the server name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the server base URL.
    #[must_use]
    pub fn url(&self) -> &str {
        &self.url
    }

    /// Returns the server description.
    #[must_use]
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Returns the bearer token (empty when unauthenticated).
    #[must_use]
    pub fn token(&self) -> &str {
        &self.token
    }

    /// Returns true when a bearer token is configured.
    #[must_use]
    pub const fn has_token(&self) -> bool {
        !self.token.is_empty()
    }

    /// Returns whether TLS certificates are verified.
    #[must_use]
    pub const fn verify_ssl(&self) -> bool {
        self.verify_ssl
    }
}

impl fmt::Debug for ServerDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let token = if self.token.is_empty() { "" } else { "<redacted>" };
        f.debug_struct("ServerDescriptor")
            .field("name", &self.name)
            .field("url", &self.url)
            .field("description", &self.description)
            .field("token", &token)
            .field("verify_ssl", &self.verify_ssl)
            .finish()
    }
}

// ============================================================================
// SECTION: verify_ssl Resolution
// ============================================================================

/// Raw `verify_ssl` input as found in a slot document.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum VerifySslValue<'a> {
    /// Field not present.
    Absent,
    /// JSON boolean.
    Bool(bool),
    /// JSON string.
    Text(&'a str),
    /// Any other JSON type, labelled by type name.
    Other(&'static str),
}

impl<'a> VerifySslValue<'a> {
    /// Classifies an optional JSON value.
    #[must_use]
    pub fn from_json(value: Option<&'a Value>) -> Self {
        match value {
            None => Self::Absent,
            Some(Value::Bool(flag)) => Self::Bool(*flag),
            Some(Value::String(text)) => Self::Text(text),
            Some(other) => Self::Other(json_type_name(other)),
        }
    }
}

/// Soft warning raised when `verify_ssl` has an unsupported type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct InvalidVerifySsl {
    /// JSON type name of the rejected value.
    pub value_type: &'static str,
}

/// Outcome of resolving a raw `verify_ssl` value.
///
/// # Invariants
/// - `warning` is set only when `enabled` fell back to `true`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ResolvedVerifySsl {
    /// Resolved verification flag.
    pub enabled: bool,
    /// Warning for unsupported input types.
    pub warning: Option<InvalidVerifySsl>,
}

/// Resolves a raw `verify_ssl` value to a strict boolean.
///
/// Strings are an allow-list: only `true`, `1` and `yes` (any case) enable
/// verification; every other string disables it. Unsupported types fall back
/// to `true` with a warning.
#[must_use]
pub fn resolve_verify_ssl(raw: VerifySslValue<'_>) -> ResolvedVerifySsl {
    match raw {
        VerifySslValue::Absent => ResolvedVerifySsl {
            enabled: true,
            warning: None,
        },
        VerifySslValue::Bool(flag) => ResolvedVerifySsl {
            enabled: flag,
            warning: None,
        },
        VerifySslValue::Text(text) => ResolvedVerifySsl {
            enabled: VERIFY_SSL_TRUE_VALUES
                .iter()
                .any(|allowed| text.eq_ignore_ascii_case(allowed)),
            warning: None,
        },
        VerifySslValue::Other(value_type) => ResolvedVerifySsl {
            enabled: true,
            warning: Some(InvalidVerifySsl {
                value_type,
            }),
        },
    }
}

/// Returns the JSON type name of a value.
pub(crate) const fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
