//! Closure-backed check for process-local dependencies

use crate::checks::Check;
use crate::report::CheckResult;
use async_trait::async_trait;
use std::time::Instant;

/// Wraps a caller-supplied probe function under a chosen identifier.
/// Useful for dependencies that are plain in-process state (a worker
/// pool, an internal queue) rather than a network target.
pub struct CustomCheck {
    identifier: String,
    check_fn: Box<dyn Fn() -> std::result::Result<(), String> + Send + Sync>,
}

impl CustomCheck {
    pub fn new<F>(identifier: impl Into<String>, check_fn: F) -> Self
    where
        F: Fn() -> std::result::Result<(), String> + Send + Sync + 'static,
    {
        Self {
            identifier: identifier.into(),
            check_fn: Box::new(check_fn),
        }
    }
}

#[async_trait]
impl Check for CustomCheck {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn run(&self) -> CheckResult {
        let start = Instant::now();

        match (self.check_fn)() {
            Ok(()) => CheckResult::ok(&self.identifier, start.elapsed().as_millis() as u64),
            Err(message) => {
                CheckResult::error(&self.identifier, message, start.elapsed().as_millis() as u64)
            }
        }
    }
}
