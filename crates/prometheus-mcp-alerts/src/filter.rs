// crates/prometheus-mcp-alerts/src/filter.rs
// ============================================================================
// Module: Alert Filter Engine
// Description: Conjunctive filtering, summary counts, and rule projection.
// Purpose: Reduce rule groups to the alerts a caller asked about.
// Dependencies: serde
// ============================================================================

//! ## Overview
//! [`filter_alerts`] keeps a rule only when every present criterion matches
//! it, counts the kept rules by state, and projects them into the requested
//! [`DetailLevel`]. It is a pure function with no error cases.
//! Invariants:
//! - `summary.total == summary.firing + summary.pending + summary.inactive`.
//! - Groups with no kept rules are omitted.
//! - The detail level changes only the projection, never the selection.

// ============================================================================
// SECTION: Imports
// ============================================================================

use std::collections::BTreeMap;

use serde::Deserialize;
use serde::Serialize;
use serde_json::Value;

use crate::rule::AlertRule;
use crate::rule::AlertState;
use crate::rule::RuleGroup;

// ============================================================================
// SECTION: Criteria
// ============================================================================

/// Optional filter criteria; an absent criterion matches every rule.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterCriteria {
    /// Exact, case-sensitive rule state.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    /// Exact rule group name.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub group: Option<String>,
    /// Exact alert name.
    #[serde(
        default,
        rename = "alertName",
        alias = "alert_name",
        skip_serializing_if = "Option::is_none"
    )]
    pub alert_name: Option<String>,
}

impl FilterCriteria {
    /// Returns true when `rule` in `group` satisfies every present criterion.
    #[must_use]
    pub fn matches(&self, group: &str, rule: &AlertRule) -> bool {
        let state_ok = self
            .state
            .as_deref()
            .is_none_or(|state| AlertState::parse(state) == Some(rule.state));
        let group_ok = self.group.as_deref().is_none_or(|wanted| wanted == group);
        let name_ok = self.alert_name.as_deref().is_none_or(|wanted| wanted == rule.name);
        state_ok && group_ok && name_ok
    }
}

/// Projection applied to kept rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DetailLevel {
    /// Name, state, severity, and annotations.
    #[default]
    Minimal,
    /// Minimal fields plus query, evaluation metadata, health, and labels.
    Extended,
}

impl DetailLevel {
    /// Maps the `extended` flag of a request to a detail level.
    #[must_use]
    pub const fn from_extended(extended: bool) -> Self {
        if extended { Self::Extended } else { Self::Minimal }
    }
}

// ============================================================================
// SECTION: Result Types
// ============================================================================

/// Counts over the kept rules.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct FilterSummary {
    /// Number of kept rules.
    pub total: usize,
    /// Kept rules in the firing state.
    pub firing: usize,
    /// Kept rules in the pending state.
    pub pending: usize,
    /// Kept rules in the inactive state.
    pub inactive: usize,
    /// Active alert instances across kept rules.
    pub active_alerts: usize,
}

impl FilterSummary {
    /// Adds one rule to the counts.
    fn count(&mut self, rule: &AlertRule) {
        self.total += 1;
        match rule.state {
            AlertState::Firing => self.firing += 1,
            AlertState::Pending => self.pending += 1,
            AlertState::Inactive => self.inactive += 1,
        }
        self.active_alerts += rule.active_alert_count();
    }
}

/// Minimal projection of a rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MinimalRule {
    /// Alert name.
    pub name: String,
    /// Current state.
    pub state: AlertState,
    /// `severity` label when present.
    pub severity: Option<String>,
    /// Rule annotations.
    pub annotations: BTreeMap<String, String>,
}

/// Extended projection of a rule.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ExtendedRule {
    /// Minimal fields.
    #[serde(flatten)]
    pub summary: MinimalRule,
    /// `PromQL` expression.
    pub query: String,
    /// Required `for` duration in seconds.
    pub duration: f64,
    /// Rule health.
    pub health: String,
    /// Last evaluation error, if any.
    pub last_error: Option<String>,
    /// Timestamp of the last evaluation.
    pub last_evaluation: Option<String>,
    /// Duration of the last evaluation in seconds.
    pub evaluation_time: Option<f64>,
    /// Full rule labels.
    pub labels: BTreeMap<String, String>,
    /// Active alert instances.
    pub alerts: Vec<Value>,
}

/// Projected rule in the requested detail level.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum RuleView {
    /// Minimal projection.
    Minimal(MinimalRule),
    /// Extended projection.
    Extended(ExtendedRule),
}

impl RuleView {
    /// Returns the alert name.
    #[must_use]
    pub fn name(&self) -> &str {
        match self {
            Self::Minimal(rule) => &rule.name,
            Self::Extended(rule) => &rule.summary.name,
        }
    }

    /// Returns the rule state.
    #[must_use]
    pub const fn state(&self) -> AlertState {
        match self {
            Self::Minimal(rule) => rule.state,
            Self::Extended(rule) => rule.summary.state,
        }
    }
}

/// Group with its kept, projected rules.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilteredGroup {
    /// Group name.
    pub name: String,
    /// Rule file that defines the group.
    pub file: String,
    /// Evaluation interval in seconds.
    pub interval: Option<f64>,
    /// Kept rules.
    pub rules: Vec<RuleView>,
}

/// Outcome of filtering rule groups.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FilterResult {
    /// Counts over kept rules.
    pub summary: FilterSummary,
    /// Criteria that were applied.
    #[serde(rename = "appliedFilters")]
    pub applied_filters: FilterCriteria,
    /// Groups with at least one kept rule.
    pub groups: Vec<FilteredGroup>,
}

// ============================================================================
// SECTION: Engine
// ============================================================================

/// Filters, summarizes, and projects alerting rules.
#[must_use]
pub fn filter_alerts(
    groups: &[RuleGroup],
    criteria: &FilterCriteria,
    detail: DetailLevel,
) -> FilterResult {
    let mut summary = FilterSummary::default();
    let mut kept_groups = Vec::new();
    for group in groups {
        let rules: Vec<RuleView> = group
            .rules
            .iter()
            .filter(|rule| criteria.matches(&group.name, rule))
            .inspect(|rule| summary.count(rule))
            .map(|rule| project(rule, detail))
            .collect();
        if rules.is_empty() {
            continue;
        }
        kept_groups.push(FilteredGroup {
            name: group.name.clone(),
            file: group.file.clone(),
            interval: group.interval,
            rules,
        });
    }
    FilterResult {
        summary,
        applied_filters: criteria.clone(),
        groups: kept_groups,
    }
}

/// Projects a rule into the requested detail level.
fn project(rule: &AlertRule, detail: DetailLevel) -> RuleView {
    let minimal = MinimalRule {
        name: rule.name.clone(),
        state: rule.state,
        severity: rule.severity().map(str::to_string),
        annotations: rule.annotations.clone(),
    };
    match detail {
        DetailLevel::Minimal => RuleView::Minimal(minimal),
        DetailLevel::Extended => RuleView::Extended(ExtendedRule {
            summary: minimal,
            query: rule.query.clone(),
            duration: rule.duration,
            health: rule.health.clone(),
            last_error: rule.last_error.clone(),
            last_evaluation: rule.last_evaluation.clone(),
            evaluation_time: rule.evaluation_time,
            labels: rule.labels.clone(),
            alerts: rule.alerts.clone(),
        }),
    }
}
