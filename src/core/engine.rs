//! Rule-based assignment of case identifiers to handlers.
//!
//! For each identifier the number is trimmed; an empty result is a
//! [`DATA_ERROR`]. Otherwise the rule tiers of the [`RuleStore`] are
//! consulted in order (two-digit, then one-digit) and the first hit wins.
//! Nothing matching yields [`UNASSIGNED`]. The year never takes part.

use crate::core::rules::RuleStore;
use crate::domain::model::{Assignment, CaseIdentifier, DATA_ERROR, UNASSIGNED};

pub const TRACE_NO_NUMBER: &str = "no number";
pub const TRACE_NO_MATCH: &str = "no rule matched";

/// Owns one rule set for the duration of a run. Swapping rules means
/// building a new engine.
#[derive(Debug, Clone)]
pub struct AssignmentEngine {
    store: RuleStore,
}

impl AssignmentEngine {
    pub fn new(store: RuleStore) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &RuleStore {
        &self.store
    }

    pub fn assign(&self, cases: &[CaseIdentifier]) -> Vec<Assignment> {
        assign(cases, &self.store)
    }

    pub fn assign_one(&self, case: &CaseIdentifier) -> Assignment {
        assign_one(case, &self.store)
    }
}

/// One assignment per identifier, in input order. Never fails.
pub fn assign(cases: &[CaseIdentifier], rules: &RuleStore) -> Vec<Assignment> {
    let assignments: Vec<Assignment> = cases.iter().map(|case| assign_one(case, rules)).collect();

    tracing::debug!(
        "Assigned {} case(s): {} data error(s), {} unassigned",
        assignments.len(),
        assignments.iter().filter(|a| a.is_data_error()).count(),
        assignments.iter().filter(|a| a.is_unassigned()).count()
    );

    assignments
}

pub fn assign_one(case: &CaseIdentifier, rules: &RuleStore) -> Assignment {
    let trimmed = case.number().trim();
    if trimmed.is_empty() {
        tracing::trace!("Case '{}' has no number", case.full_string());
        return Assignment::new(case.clone(), DATA_ERROR, TRACE_NO_NUMBER);
    }

    for matcher in rules.matchers() {
        if let Some(hit) = matcher.evaluate(trimmed) {
            return Assignment::new(case.clone(), hit.handler, hit.trace);
        }
    }

    tracing::trace!("No rule matched case '{}'", case.full_string());
    Assignment::new(case.clone(), UNASSIGNED, TRACE_NO_MATCH)
}
