//! Generic-vs-specific check deduplication

use crate::checks::Check;
use std::collections::{HashMap, HashSet};

/// Table-driven overlap rule: a generic check for a capability class is
/// suppressed when at least one of the specific checks that supersede it
/// is present in the execution set. New capability classes are added by
/// adding rules; the aggregator never special-cases a dependency type.
#[derive(Debug, Clone, Default)]
pub struct DedupPolicy {
    rules: HashMap<String, HashSet<String>>,
}

impl DedupPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds (or extends) the rule mapping a generic identifier to the
    /// specific identifiers that supersede it.
    pub fn with_rule<I, S>(mut self, generic: impl Into<String>, specifics: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.rules
            .entry(generic.into())
            .or_default()
            .extend(specifics.into_iter().map(Into::into));
        self
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    fn is_superseded(&self, identifier: &str, present: &HashSet<String>) -> bool {
        match self.rules.get(identifier) {
            Some(specifics) => specifics.iter().any(|s| present.contains(s)),
            None => false,
        }
    }

    /// Filters the instantiated check set, dropping every generic check
    /// that a present specific check supersedes. Survivors keep their
    /// original order.
    pub fn apply(&self, checks: Vec<Box<dyn Check>>) -> Vec<Box<dyn Check>> {
        if self.rules.is_empty() {
            return checks;
        }

        let present: HashSet<String> = checks
            .iter()
            .map(|check| check.identifier().to_string())
            .collect();

        checks
            .into_iter()
            .filter(|check| {
                if self.is_superseded(check.identifier(), &present) {
                    tracing::debug!(
                        "Excluding generic check '{}': superseded by a specific check",
                        check.identifier()
                    );
                    false
                } else {
                    true
                }
            })
            .collect()
    }
}
