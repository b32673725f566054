// crates/prometheus-mcp-config/src/registry.rs
// ============================================================================
// Module: Server Registry
// Description: Slot scanning and the immutable name-keyed server registry.
// Purpose: Build the registry once from indexed configuration slots.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`RegistryBuilder`] scans slots `0..=9` in ascending order, parses each
//! slot with [`parse_server_entry`], and assembles a [`ServerRegistry`]. The
//! build never fails: rejected slots are reported through a
//! [`DiagnosticSink`] and skipped. When two slots declare the same name the
//! lower slot wins and the later one is reported as a duplicate.
//! Invariants:
//! - Processing order is strictly ascending so the outcome is reproducible.
//! - No slot outside `0..=9` ever contributes an entry.
//! - The registry is never mutated after it is returned.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Serialize;

use crate::descriptor::ServerDescriptor;
use crate::descriptor::VerifySslValue;
use crate::descriptor::resolve_verify_ssl;
use crate::diagnostics::ConfigDiagnostic;
use crate::diagnostics::DiagnosticSink;
use crate::entry::RejectionReason;
use crate::entry::parse_server_entry;
use crate::scanner::scan_out_of_range;
use crate::source::ConfigSource;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Default prefix for indexed server slots (`PROMETHEUS_SERVER_<n>`).
pub const SERVER_ENV_PREFIX: &str = "PROMETHEUS_SERVER";
/// Number of supported server slots.
const SLOT_COUNT: u8 = 10;
/// Name given to the server built from legacy single-server variables.
pub const LEGACY_SERVER_NAME: &str = "default";
/// Legacy single-server URL variable.
const LEGACY_URL_ENV: &str = "PROMETHEUS_URL";
/// Legacy single-server token variable.
const LEGACY_TOKEN_ENV: &str = "PROMETHEUS_TOKEN";
/// Legacy single-server TLS verification variable.
const LEGACY_VERIFY_SSL_ENV: &str = "PROMETHEUS_VERIFY_SSL";

// ============================================================================
// SECTION: Slot Index
// ============================================================================

/// Index of a configuration slot.
///
/// # Invariants
/// - The wrapped value is always within `0..=9`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(transparent)]
pub struct SlotIndex(u8);

impl SlotIndex {
    /// Creates a slot index when `value` is within the supported range.
    #[must_use]
    pub const fn new(value: u8) -> Option<Self> {
        if value < SLOT_COUNT { Some(Self(value)) } else { None }
    }

    /// Returns the numeric slot value.
    #[must_use]
    pub const fn get(self) -> u8 {
        self.0
    }

    /// Returns all slots in ascending order.
    pub fn all() -> impl Iterator<Item = Self> {
        (0..SLOT_COUNT).map(Self)
    }
}

impl fmt::Display for SlotIndex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Returns the configuration key for a slot, e.g. `PROMETHEUS_SERVER_3`.
#[must_use]
pub fn slot_key(prefix: &str, slot: SlotIndex) -> String {
    format!("{prefix}_{slot}")
}

// ============================================================================
// SECTION: Registry
// ============================================================================

/// Immutable name-keyed collection of validated server descriptors.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ServerRegistry {
    /// Descriptors keyed by server name.
    servers: BTreeMap<String, ServerDescriptor>,
}

impl ServerRegistry {
    /// Looks up a server by name.
    #[must_use]
    pub fn get(&self, name: &str) -> Option<&ServerDescriptor> {
        self.servers.get(name)
    }

    /// Returns true when a server with this name is registered.
    #[must_use]
    pub fn contains(&self, name: &str) -> bool {
        self.servers.contains_key(name)
    }

    /// Returns the number of registered servers.
    #[must_use]
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// Returns true when no servers are registered.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// Iterates descriptors in name order.
    pub fn iter(&self) -> impl Iterator<Item = &ServerDescriptor> {
        self.servers.values()
    }

    /// Iterates registered names in order.
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.servers.keys().map(String::as_str)
    }

    /// Adds a `default` server from the legacy single-server variables when
    /// the slot scan produced nothing.
    ///
    /// Uses `PROMETHEUS_URL`, `PROMETHEUS_TOKEN` and `PROMETHEUS_VERIFY_SSL`.
    /// A non-empty registry is returned unchanged.
    #[must_use]
    pub fn with_legacy_fallback(
        mut self,
        source: &dyn ConfigSource,
        sink: &dyn DiagnosticSink,
    ) -> Self {
        if !self.is_empty() {
            return self;
        }
        let Some(url) = source.get(LEGACY_URL_ENV).filter(|url| !url.is_empty()) else {
            return self;
        };
        let verify_raw = source.get(LEGACY_VERIFY_SSL_ENV);
        let verify_ssl = verify_raw
            .as_deref()
            .map_or(VerifySslValue::Absent, VerifySslValue::Text);
        let token = source.get(LEGACY_TOKEN_ENV).unwrap_or_default();
        if let Ok(descriptor) = ServerDescriptor::new(LEGACY_SERVER_NAME, url) {
            let descriptor = descriptor
                .with_token(token)
                .with_verify_ssl(resolve_verify_ssl(verify_ssl).enabled);
            sink.record(&ConfigDiagnostic::legacy_fallback(LEGACY_URL_ENV));
            self.servers.insert(LEGACY_SERVER_NAME.to_string(), descriptor);
        }
        self
    }
}

// ============================================================================
// SECTION: Builder
// ============================================================================

/// Builds a [`ServerRegistry`] from indexed configuration slots.
#[derive(Debug, Clone)]
pub struct RegistryBuilder {
    /// Slot key prefix (without the trailing underscore).
    prefix: String,
}

impl Default for RegistryBuilder {
    fn default() -> Self {
        Self::new(SERVER_ENV_PREFIX)
    }
}

impl RegistryBuilder {
    /// Creates a builder for slot keys named `<prefix>_<n>`.
    #[must_use]
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    /// Scans slots `0..=9` through `lookup` and assembles the registry.
    ///
    /// Never fails; the result may be empty.
    pub fn build<F>(&self, lookup: F, sink: &dyn DiagnosticSink) -> ServerRegistry
    where
        F: Fn(SlotIndex) -> Option<String>,
    {
        let mut servers = BTreeMap::new();
        let mut seen: BTreeMap<String, SlotIndex> = BTreeMap::new();
        for slot in SlotIndex::all() {
            let key = slot_key(&self.prefix, slot);
            let raw = lookup(slot);
            let entry = match parse_server_entry(raw.as_deref()) {
                Ok(entry) => entry,
                Err(RejectionReason::EmptySlot) => continue,
                Err(reason) => {
                    sink.record(&ConfigDiagnostic::slot_rejected(&key, slot, reason));
                    continue;
                }
            };
            if let Some(warning) = entry.verify_ssl_warning {
                sink.record(&ConfigDiagnostic::invalid_verify_ssl(&key, slot, warning));
            }
            let name = entry.descriptor.name().to_string();
            if let Some(first) = seen.get(&name) {
                sink.record(&ConfigDiagnostic::duplicate_name(&key, slot, &name, *first));
                continue;
            }
            seen.insert(name.clone(), slot);
            servers.insert(name, entry.descriptor);
        }
        ServerRegistry {
            servers,
        }
    }

    /// Builds the registry from a configuration source and reports keys
    /// beyond the supported slot range.
    pub fn load(&self, source: &dyn ConfigSource, sink: &dyn DiagnosticSink) -> ServerRegistry {
        let registry = self.build(|slot| source.get(&slot_key(&self.prefix, slot)), sink);
        scan_out_of_range(&self.prefix, source.keys(), sink);
        registry
    }
}
