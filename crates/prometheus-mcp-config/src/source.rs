// crates/prometheus-mcp-config/src/source.rs
// ============================================================================
// Module: Configuration Sources
// Description: Key/value lookups backing registry and settings loading.
// Purpose: Decouple loading from the process environment.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Loading reads configuration through [`ConfigSource`] so the same pipeline
//! runs against the process environment ([`EnvSource`]) or an explicit map
//! ([`MapSource`]) in tests and embedded use.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

// ============================================================================
// SECTION: Trait
// ============================================================================

/// Read-only key/value configuration source.
pub trait ConfigSource: Send + Sync {
    /// Returns the value for `key`, if present.
    fn get(&self, key: &str) -> Option<String>;

    /// Returns every key known to the source.
    fn keys(&self) -> Vec<String>;
}

// ============================================================================
// SECTION: Environment Source
// ============================================================================

/// Source backed by the process environment.
///
/// # Invariants
/// - Variables whose key or value is not valid UTF-8 are treated as absent.
#[derive(Debug, Clone, Copy, Default)]
pub struct EnvSource;

impl ConfigSource for EnvSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }

    fn keys(&self) -> Vec<String> {
        std::env::vars_os().filter_map(|(key, _)| key.into_string().ok()).collect()
    }
}

// ============================================================================
// SECTION: Map Source
// ============================================================================

/// Source backed by an explicit key/value map.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MapSource {
    /// Configured entries.
    entries: BTreeMap<String, String>,
}

impl MapSource {
    /// Creates an empty map source.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts or replaces an entry.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }

    /// Returns the source with an additional entry.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.insert(key, value);
        self
    }
}

impl<K, V> FromIterator<(K, V)> for MapSource
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            entries: iter.into_iter().map(|(key, value)| (key.into(), value.into())).collect(),
        }
    }
}

impl ConfigSource for MapSource {
    fn get(&self, key: &str) -> Option<String> {
        self.entries.get(key).cloned()
    }

    fn keys(&self) -> Vec<String> {
        self.entries.keys().cloned().collect()
    }
}
