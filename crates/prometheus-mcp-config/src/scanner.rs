// crates/prometheus-mcp-config/src/scanner.rs
// ============================================================================
// Module: Out-of-Range Scanner
// Description: Advisory pass over configuration keys.
// Purpose: Warn about `<prefix>_<n>` keys whose index is outside `0..=9`.
// Dependencies: none
// ============================================================================

//! ## Overview
//! Operators sometimes configure `PROMETHEUS_SERVER_10` expecting an eleventh
//! server. Those keys are never loaded; this pass reports them so the mistake
//! is visible. It reads keys only and never touches the registry.

// ============================================================================
// SECTION: Imports
// ============================================================================

use crate::diagnostics::ConfigDiagnostic;
use crate::diagnostics::DiagnosticSink;

// ============================================================================
// SECTION: Constants
// ============================================================================

/// Highest supported slot index.
const MAX_SLOT_INDEX: i64 = 9;

// ============================================================================
// SECTION: Scanner
// ============================================================================

/// Reports keys of the form `<prefix>_<integer>` whose integer is outside
/// `0..=9`, returning the offending keys in sorted order.
///
/// Negative indices are reported. Suffixes that are not integers are ignored.
/// Integers too large to represent are reported as out of range.
pub fn scan_out_of_range<I, K>(prefix: &str, keys: I, sink: &dyn DiagnosticSink) -> Vec<String>
where
    I: IntoIterator<Item = K>,
    K: AsRef<str>,
{
    let mut offending: Vec<String> = keys
        .into_iter()
        .filter(|key| is_out_of_range(prefix, key.as_ref()))
        .map(|key| key.as_ref().to_string())
        .collect();
    offending.sort();
    offending.dedup();
    for key in &offending {
        sink.record(&ConfigDiagnostic::out_of_range(key));
    }
    offending
}

// ============================================================================
// SECTION: Helpers
// ============================================================================

/// Returns true when `key` is `<prefix>_<integer>` with an unsupported index.
fn is_out_of_range(prefix: &str, key: &str) -> bool {
    let Some(suffix) = key.strip_prefix(prefix).and_then(|rest| rest.strip_prefix('_')) else {
        return false;
    };
    let digits = suffix.strip_prefix('-').unwrap_or(suffix);
    if digits.is_empty() || !digits.bytes().all(|byte| byte.is_ascii_digit()) {
        return false;
    }
    !matches!(suffix.parse::<i64>(), Ok(index) if (0..=MAX_SLOT_INDEX).contains(&index))
}
