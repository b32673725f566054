// crates/prometheus-mcp-alerts/src/rule.rs
// ============================================================================
// Module: Alert Rules
// Description: Alerting rule and rule group models.
// Purpose: Typed view of the alerting rules reported by Prometheus.
// Dependencies: serde, serde_json
// ============================================================================

//! ## Overview
//! Prometheus reports each alerting rule with its current state and the
//! alert instances it has produced. Only alerting rules are modelled here;
//! recording rules are dropped while parsing the rules document.
//! Invariants:
//! - A rule with a missing or unrecognized state is [`AlertState::Inactive`].

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;
use std::fmt;

use serde::Deserialize;
use serde::Deserializer;
use serde::Serialize;
use serde_json::Value;

// ============================================================================
// SECTION: Alert State
// ============================================================================

/// Evaluation state of an alerting rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum AlertState {
    /// Condition held for the full `for` duration.
    Firing,
    /// Condition holds but the `for` duration has not elapsed.
    Pending,
    /// Condition does not hold.
    #[default]
    Inactive,
}

impl AlertState {
    /// Returns all states in reporting order.
    #[must_use]
    pub const fn all() -> [Self; 3] {
        [Self::Firing, Self::Pending, Self::Inactive]
    }

    /// Returns the wire label.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Firing => "firing",
            Self::Pending => "pending",
            Self::Inactive => "inactive",
        }
    }

    /// Parses an exact, case-sensitive state label.
    #[must_use]
    pub fn parse(label: &str) -> Option<Self> {
        Self::all().into_iter().find(|state| state.as_str() == label)
    }

    /// Maps an upstream state label, bucketing anything unknown as inactive.
    #[must_use]
    pub fn from_upstream(label: Option<&str>) -> Self {
        label.and_then(Self::parse).unwrap_or_default()
    }
}

impl fmt::Display for AlertState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Deserializes a rule state leniently.
fn deserialize_state<'de, D>(deserializer: D) -> Result<AlertState, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = Option::<Value>::deserialize(deserializer)?;
    Ok(AlertState::from_upstream(raw.as_ref().and_then(Value::as_str)))
}

// ============================================================================
// SECTION: Alert Rule
// ============================================================================

/// Alerting rule as reported by `/api/v1/rules`.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AlertRule {
    /// Alert name.
    pub name: String,
    /// `PromQL` expression.
    #[serde(default)]
    pub query: String,
    /// Required `for` duration in seconds.
    #[serde(default)]
    pub duration: f64,
    /// Current evaluation state.
    #[serde(default, deserialize_with = "deserialize_state")]
    pub state: AlertState,
    /// Static rule labels.
    #[serde(default)]
    pub labels: BTreeMap<String, String>,
    /// Rule annotations.
    #[serde(default)]
    pub annotations: BTreeMap<String, String>,
    /// Active alert instances produced by the rule.
    #[serde(default)]
    pub alerts: Vec<Value>,
    /// Rule health (`ok`, `err`, `unknown`).
    #[serde(default)]
    pub health: String,
    /// Last evaluation error, if any.
    #[serde(default)]
    pub last_error: Option<String>,
    /// Duration of the last evaluation in seconds.
    #[serde(default)]
    pub evaluation_time: Option<f64>,
    /// Timestamp of the last evaluation.
    #[serde(default)]
    pub last_evaluation: Option<String>,
}

impl AlertRule {
    /// Returns the `severity` label when present.
    #[must_use]
    pub fn severity(&self) -> Option<&str> {
        self.labels.get("severity").map(String::as_str)
    }

    /// Returns the number of active alert instances.
    #[must_use]
    pub fn active_alert_count(&self) -> usize {
        self.alerts.len()
    }
}

// ============================================================================
// SECTION: Rule Group
// ============================================================================

/// Named group of alerting rules.
#[derive(Debug, Clone, PartialEq)]
pub struct RuleGroup {
    /// Group name.
    pub name: String,
    /// Rule file that defines the group.
    pub file: String,
    /// Evaluation interval in seconds.
    pub interval: Option<f64>,
    /// Alerting rules in declaration order.
    pub rules: Vec<AlertRule>,
}
