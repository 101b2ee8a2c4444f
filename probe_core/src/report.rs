//! Report model produced by one aggregation run

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "UPPERCASE")]
pub enum CheckStatus {
    Ok,
    Error,
}

impl std::fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CheckStatus::Ok => write!(f, "OK"),
            CheckStatus::Error => write!(f, "ERROR"),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum OverallStatus {
    Ready,
    NotReady,
}

impl std::fmt::Display for OverallStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OverallStatus::Ready => write!(f, "READY"),
            OverallStatus::NotReady => write!(f, "NOT_READY"),
        }
    }
}

/// Outcome of a single check. `status` is `Error` iff `errors` is
/// non-empty; the constructors are the only way this type is built, so
/// the invariant holds everywhere.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CheckResult {
    pub identifier: String,
    pub status: CheckStatus,
    pub errors: Vec<String>,
    pub time_taken_ms: u64,
}

impl CheckResult {
    pub fn ok(identifier: impl Into<String>, time_taken_ms: u64) -> Self {
        Self {
            identifier: identifier.into(),
            status: CheckStatus::Ok,
            errors: Vec::new(),
            time_taken_ms,
        }
    }

    pub fn error(identifier: impl Into<String>, message: impl Into<String>, time_taken_ms: u64) -> Self {
        Self {
            identifier: identifier.into(),
            status: CheckStatus::Error,
            errors: vec![message.into()],
            time_taken_ms,
        }
    }

    pub fn errors(identifier: impl Into<String>, errors: Vec<String>, time_taken_ms: u64) -> Self {
        let status = if errors.is_empty() {
            CheckStatus::Ok
        } else {
            CheckStatus::Error
        };

        Self {
            identifier: identifier.into(),
            status,
            errors,
            time_taken_ms,
        }
    }

    pub fn is_ok(&self) -> bool {
        self.status == CheckStatus::Ok
    }
}

/// The structured outcome of one aggregation run. Results are kept in
/// execution order; the report is never mutated after the aggregator
/// returns it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AggregateReport {
    pub overall_status: OverallStatus,
    pub checks: Vec<CheckResult>,
    pub timestamp: chrono::DateTime<chrono::Utc>,
}

impl AggregateReport {
    pub fn new() -> Self {
        Self {
            overall_status: OverallStatus::Ready,
            checks: Vec::new(),
            timestamp: chrono::Utc::now(),
        }
    }

    pub fn add_result(&mut self, result: CheckResult) {
        if result.status == CheckStatus::Error {
            self.overall_status = OverallStatus::NotReady;
        }

        self.checks.push(result);
    }

    pub fn get(&self, identifier: &str) -> Option<&CheckResult> {
        self.checks.iter().find(|r| r.identifier == identifier)
    }

    pub fn is_ready(&self) -> bool {
        self.overall_status == OverallStatus::Ready
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }
}

impl Default for AggregateReport {
    fn default() -> Self {
        Self::new()
    }
}
