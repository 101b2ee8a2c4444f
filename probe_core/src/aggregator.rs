//! Readiness aggregation engine

use crate::dedup::DedupPolicy;
use crate::error::Result;
use crate::registry::CheckRegistry;
use crate::report::{AggregateReport, CheckResult, CheckStatus};
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinError;
use tracing::{error, info, warn};

/// Runs every active check and reduces the results to a single report.
///
/// The aggregator owns the check instances for the duration of one run;
/// the registry it reads from is immutable after bootstrap, so concurrent
/// runs never share mutable state.
pub struct Aggregator {
    registry: Arc<CheckRegistry>,
    policy: DedupPolicy,
    deadline: Option<Duration>,
}

impl Aggregator {
    pub fn new(registry: Arc<CheckRegistry>, policy: DedupPolicy) -> Self {
        Self {
            registry,
            policy,
            deadline: None,
        }
    }

    /// Caps the whole run. A check still outstanding when the deadline
    /// expires is reported as an error with a timeout message; its task
    /// is left to finish in the background.
    pub fn with_deadline(mut self, deadline: Duration) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub async fn run(&self) -> Result<AggregateReport> {
        let checks = self.registry.instantiate()?;
        let checks = self.policy.apply(checks);

        info!("Running readiness aggregation for {} checks", checks.len());

        let deadline = self.deadline.map(|d| tokio::time::Instant::now() + d);

        // One task per check, each with an independent execution context.
        // Results are collected back in registration order.
        let mut handles = Vec::with_capacity(checks.len());
        for check in checks {
            let identifier = check.identifier().to_string();
            let handle = tokio::spawn(async move { check.run().await });
            handles.push((identifier, handle));
        }

        let mut report = AggregateReport::new();
        for (identifier, handle) in handles {
            let result = match deadline {
                Some(deadline) => match tokio::time::timeout_at(deadline, handle).await {
                    Ok(joined) => settle(identifier, joined),
                    Err(_) => {
                        let deadline_ms = self.deadline.unwrap_or_default().as_millis() as u64;
                        warn!(
                            "Check '{}' still outstanding at the {}ms aggregation deadline",
                            identifier, deadline_ms
                        );
                        CheckResult::error(
                            identifier,
                            format!("timed out: still running at the {}ms aggregation deadline", deadline_ms),
                            deadline_ms,
                        )
                    }
                },
                None => settle(identifier, handle.await),
            };

            match result.status {
                CheckStatus::Ok => {
                    info!("Check '{}' passed in {}ms", result.identifier, result.time_taken_ms);
                }
                CheckStatus::Error => {
                    warn!(
                        "Check '{}' failed in {}ms: {}",
                        result.identifier,
                        result.time_taken_ms,
                        result.errors.join("; ")
                    );
                }
            }

            report.add_result(result);
        }

        info!("Aggregation complete - overall status: {}", report.overall_status);
        Ok(report)
    }
}

/// Converts a panicking check into an error result at the join
/// boundary, so one broken check cannot abort the whole run.
fn settle(identifier: String, joined: std::result::Result<CheckResult, JoinError>) -> CheckResult {
    match joined {
        Ok(result) => result,
        Err(join_err) => {
            error!("Check '{}' aborted unexpectedly: {}", identifier, join_err);
            CheckResult::error(identifier, format!("unexpected check failure: {}", join_err), 0)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::checks::{Check, CustomCheck};
    use crate::registry::CheckOptions;
    use crate::report::OverallStatus;
    use async_trait::async_trait;

    struct PanickingCheck;

    #[async_trait]
    impl Check for PanickingCheck {
        fn identifier(&self) -> &str {
            "panicking"
        }

        async fn run(&self) -> CheckResult {
            panic!("programming error inside the check");
        }
    }

    struct SlowCheck {
        delay: Duration,
    }

    #[async_trait]
    impl Check for SlowCheck {
        fn identifier(&self) -> &str {
            "broker"
        }

        async fn run(&self) -> CheckResult {
            tokio::time::sleep(self.delay).await;
            CheckResult::ok("broker", self.delay.as_millis() as u64)
        }
    }

    fn registry_of(names: &[(&'static str, std::result::Result<(), &'static str>)]) -> CheckRegistry {
        let mut registry = CheckRegistry::new();
        for (name, outcome) in names {
            let name = *name;
            let outcome = *outcome;
            registry.register(
                move |_: Option<&CheckOptions>| {
                    Ok(Box::new(CustomCheck::new(name, move || {
                        outcome.map_err(|msg| msg.to_string())
                    })) as Box<dyn Check>)
                },
                None,
            );
        }
        registry
    }

    #[tokio::test]
    async fn test_empty_registry_yields_ready() {
        let aggregator = Aggregator::new(Arc::new(CheckRegistry::new()), DedupPolicy::new());

        let report = aggregator.run().await.unwrap();
        assert_eq!(report.overall_status, OverallStatus::Ready);
        assert!(report.is_empty());
    }

    #[tokio::test]
    async fn test_all_checks_passing_yields_ready() {
        let registry = registry_of(&[("cache", Ok(())), ("disk", Ok(()))]);
        let aggregator = Aggregator::new(Arc::new(registry), DedupPolicy::new());

        let report = aggregator.run().await.unwrap();
        assert_eq!(report.overall_status, OverallStatus::Ready);
        assert_eq!(report.len(), 2);
        assert!(report.get("cache").unwrap().errors.is_empty());
        assert!(report.get("disk").unwrap().errors.is_empty());
    }

    #[tokio::test]
    async fn test_single_failure_yields_not_ready() {
        let registry = registry_of(&[
            ("cache", Ok(())),
            ("database:primary", Err("connection refused")),
            ("disk", Ok(())),
        ]);
        let aggregator = Aggregator::new(Arc::new(registry), DedupPolicy::new());

        let report = aggregator.run().await.unwrap();
        assert_eq!(report.overall_status, OverallStatus::NotReady);
        assert_eq!(report.len(), 3);
        assert!(report.get("cache").unwrap().is_ok());
        assert_eq!(
            report.get("database:primary").unwrap().errors,
            vec!["connection refused".to_string()]
        );
    }

    #[tokio::test]
    async fn test_results_follow_registration_order() {
        let registry = registry_of(&[("disk", Ok(())), ("broker", Ok(())), ("cache", Ok(()))]);
        let aggregator = Aggregator::new(Arc::new(registry), DedupPolicy::new());

        let report = aggregator.run().await.unwrap();
        let identifiers: Vec<&str> = report.checks.iter().map(|r| r.identifier.as_str()).collect();
        assert_eq!(identifiers, vec!["disk", "broker", "cache"]);
    }

    #[tokio::test]
    async fn test_panicking_check_does_not_abort_the_run() {
        let mut registry = CheckRegistry::new();
        registry.register(|_: Option<&CheckOptions>| Ok(Box::new(PanickingCheck) as Box<dyn Check>), None);
        registry.register(
            |_: Option<&CheckOptions>| Ok(Box::new(CustomCheck::new("cache", || Ok(()))) as Box<dyn Check>),
            None,
        );

        let aggregator = Aggregator::new(Arc::new(registry), DedupPolicy::new());
        let report = aggregator.run().await.unwrap();

        assert_eq!(report.overall_status, OverallStatus::NotReady);
        let failed = report.get("panicking").unwrap();
        assert_eq!(failed.status, CheckStatus::Error);
        assert!(failed.errors[0].contains("unexpected check failure"));
        assert!(report.get("cache").unwrap().is_ok());
    }

    #[tokio::test]
    async fn test_generic_database_superseded_by_failing_specific() {
        let registry = registry_of(&[
            ("db_generic", Ok(())),
            ("db_primary", Err("connection refused")),
        ]);
        let policy = DedupPolicy::new().with_rule("db_generic", ["db_primary"]);
        let aggregator = Aggregator::new(Arc::new(registry), policy);

        let report = aggregator.run().await.unwrap();
        assert_eq!(report.overall_status, OverallStatus::NotReady);
        assert_eq!(report.len(), 1);
        assert!(report.get("db_generic").is_none());
        assert_eq!(
            report.get("db_primary").unwrap().errors,
            vec!["connection refused".to_string()]
        );
    }

    #[tokio::test]
    async fn test_repeated_runs_are_idempotent() {
        let registry = registry_of(&[("cache", Ok(())), ("broker", Err("unreachable"))]);
        let aggregator = Aggregator::new(Arc::new(registry), DedupPolicy::new());

        let first = aggregator.run().await.unwrap();
        let second = aggregator.run().await.unwrap();

        assert_eq!(first.overall_status, second.overall_status);
        for (a, b) in first.checks.iter().zip(second.checks.iter()) {
            assert_eq!(a.identifier, b.identifier);
            assert_eq!(a.status, b.status);
            assert_eq!(a.errors, b.errors);
        }
    }

    #[tokio::test]
    async fn test_deadline_reports_outstanding_check_as_timed_out() {
        let mut registry = CheckRegistry::new();
        registry.register(
            |_: Option<&CheckOptions>| {
                Ok(Box::new(SlowCheck {
                    delay: Duration::from_secs(30),
                }) as Box<dyn Check>)
            },
            None,
        );
        registry.register(
            |_: Option<&CheckOptions>| Ok(Box::new(CustomCheck::new("cache", || Ok(()))) as Box<dyn Check>),
            None,
        );

        let aggregator = Aggregator::new(Arc::new(registry), DedupPolicy::new())
            .with_deadline(Duration::from_millis(50));

        let report = aggregator.run().await.unwrap();
        assert_eq!(report.overall_status, OverallStatus::NotReady);

        let broker = report.get("broker").unwrap();
        assert_eq!(broker.status, CheckStatus::Error);
        assert!(broker.errors[0].contains("timed out"));
        assert!(report.get("cache").unwrap().is_ok());
    }
}
