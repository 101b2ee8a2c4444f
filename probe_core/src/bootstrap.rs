//! Config-driven registration of checks and dedup rules

use crate::checks::{Check, DiskCheck, TcpCheck};
use crate::config::ChecksConfig;
use crate::dedup::DedupPolicy;
use crate::error::{ProbeError, Result};
use crate::registry::{CheckOptions, CheckRegistry};
use std::time::Duration;

pub const DATABASE_CHECK_ID: &str = "database";
pub const CACHE_CHECK_ID: &str = "cache";
pub const BROKER_CHECK_ID: &str = "broker";

fn specific_id(class: &str, instance: &str) -> String {
    format!("{}:{}", class, instance)
}

fn tcp_factory(
    class: &'static str,
) -> impl Fn(Option<&CheckOptions>) -> Result<Box<dyn Check>> + Send + Sync + 'static {
    move |options| {
        let options = options
            .ok_or_else(|| ProbeError::Configuration(format!("{} check requires options", class)))?;
        let target = options
            .target
            .as_deref()
            .ok_or_else(|| ProbeError::Configuration(format!("{} check requires a target", class)))?;

        let identifier = match options.instance.as_deref() {
            Some(instance) => specific_id(class, instance),
            None => class.to_string(),
        };

        let mut check = TcpCheck::new(identifier, target);
        if let Some(timeout) = options.timeout {
            check = check.with_timeout(timeout);
        }

        Ok(Box::new(check) as Box<dyn Check>)
    }
}

fn disk_factory(options: Option<&CheckOptions>) -> Result<Box<dyn Check>> {
    let options = options
        .ok_or_else(|| ProbeError::Configuration("disk check requires options".to_string()))?;
    let paths = options
        .paths
        .clone()
        .ok_or_else(|| ProbeError::Configuration("disk check requires paths".to_string()))?;

    Ok(Box::new(DiskCheck::new(paths)) as Box<dyn Check>)
}

/// Translates deployment configuration into registry entries, one per
/// enabled check. Registration order is database, cache, broker, disk;
/// generic checks precede the named instances of their class.
pub fn build_registry(config: &ChecksConfig) -> CheckRegistry {
    let timeout = Duration::from_millis(config.check_timeout_ms);
    let mut registry = CheckRegistry::new();

    if let Some(target) = &config.database.generic_target {
        registry.register(
            tcp_factory(DATABASE_CHECK_ID),
            Some(CheckOptions::new().with_target(target.clone()).with_timeout(timeout)),
        );
    }
    for instance in &config.database.instances {
        registry.register(
            tcp_factory(DATABASE_CHECK_ID),
            Some(
                CheckOptions::new()
                    .with_instance(instance.name.clone())
                    .with_target(instance.target.clone())
                    .with_timeout(timeout),
            ),
        );
    }

    if let Some(target) = &config.cache.generic_target {
        registry.register(
            tcp_factory(CACHE_CHECK_ID),
            Some(CheckOptions::new().with_target(target.clone()).with_timeout(timeout)),
        );
    }
    for instance in &config.cache.instances {
        registry.register(
            tcp_factory(CACHE_CHECK_ID),
            Some(
                CheckOptions::new()
                    .with_instance(instance.name.clone())
                    .with_target(instance.target.clone())
                    .with_timeout(timeout),
            ),
        );
    }

    if let Some(target) = &config.broker.target {
        registry.register(
            tcp_factory(BROKER_CHECK_ID),
            Some(CheckOptions::new().with_target(target.clone()).with_timeout(timeout)),
        );
    }

    if !config.disk.paths.is_empty() {
        registry.register(
            disk_factory,
            Some(CheckOptions::new().with_paths(config.disk.paths.clone())),
        );
    }

    registry
}

/// Builds the dedup table from the same configuration: a generic class
/// check is superseded exactly by the named instances configured for
/// that class.
pub fn build_dedup_policy(config: &ChecksConfig) -> DedupPolicy {
    let mut policy = DedupPolicy::new();

    if !config.database.instances.is_empty() {
        policy = policy.with_rule(
            DATABASE_CHECK_ID,
            config
                .database
                .instances
                .iter()
                .map(|i| specific_id(DATABASE_CHECK_ID, &i.name)),
        );
    }

    if !config.cache.instances.is_empty() {
        policy = policy.with_rule(
            CACHE_CHECK_ID,
            config
                .cache
                .instances
                .iter()
                .map(|i| specific_id(CACHE_CHECK_ID, &i.name)),
        );
    }

    policy
}
