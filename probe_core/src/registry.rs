//! Registry of check factories, populated once at process initialization

use crate::checks::Check;
use crate::error::Result;
use std::collections::HashMap;
use std::path::PathBuf;
use std::time::Duration;

/// Construction-time options for a registered check factory, e.g. which
/// named cache instance to probe. Factories read the fields they care
/// about and reject entries with missing or malformed options.
#[derive(Debug, Clone, Default)]
pub struct CheckOptions {
    pub instance: Option<String>,
    pub target: Option<String>,
    pub paths: Option<Vec<PathBuf>>,
    pub timeout: Option<Duration>,
}

impl CheckOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_instance(mut self, instance: impl Into<String>) -> Self {
        self.instance = Some(instance.into());
        self
    }

    pub fn with_target(mut self, target: impl Into<String>) -> Self {
        self.target = Some(target.into());
        self
    }

    pub fn with_paths(mut self, paths: Vec<PathBuf>) -> Self {
        self.paths = Some(paths);
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

pub type CheckFactory = Box<dyn Fn(Option<&CheckOptions>) -> Result<Box<dyn Check>> + Send + Sync>;

pub struct RegistryEntry {
    factory: CheckFactory,
    options: Option<CheckOptions>,
}

impl RegistryEntry {
    pub fn options(&self) -> Option<&CheckOptions> {
        self.options.as_ref()
    }

    pub fn create(&self) -> Result<Box<dyn Check>> {
        (self.factory)(self.options.as_ref())
    }
}

/// Ordered set of `(factory, options)` entries. Built once during
/// bootstrap and read-only afterwards; the aggregator instantiates a
/// fresh set of checks from it on every run.
#[derive(Default)]
pub struct CheckRegistry {
    entries: Vec<RegistryEntry>,
}

impl CheckRegistry {
    pub fn new() -> Self {
        Self { entries: Vec::new() }
    }

    pub fn register<F>(&mut self, factory: F, options: Option<CheckOptions>)
    where
        F: Fn(Option<&CheckOptions>) -> Result<Box<dyn Check>> + Send + Sync + 'static,
    {
        self.entries.push(RegistryEntry {
            factory: Box::new(factory),
            options,
        });
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// The registered entries in registration order.
    pub fn active_entries(&self) -> &[RegistryEntry] {
        &self.entries
    }

    /// Instantiates one check per entry, in registration order. When two
    /// entries produce the same identifier the later registration wins,
    /// keeping the position of the first one.
    pub fn instantiate(&self) -> Result<Vec<Box<dyn Check>>> {
        let mut checks: Vec<Box<dyn Check>> = Vec::new();
        let mut positions: HashMap<String, usize> = HashMap::new();

        for entry in self.active_entries() {
            let check = entry.create()?;
            let identifier = check.identifier().to_string();

            match positions.get(&identifier) {
                Some(&index) => checks[index] = check,
                None => {
                    positions.insert(identifier, checks.len());
                    checks.push(check);
                }
            }
        }

        Ok(checks)
    }

    /// Instantiates every entry once and discards the result, so that a
    /// misconfigured entry fails process startup instead of being
    /// silently skipped later.
    pub fn validate(&self) -> Result<()> {
        self.instantiate().map(|_| ())
    }
}
