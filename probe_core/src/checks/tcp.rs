//! TCP reachability check used for database, cache and broker targets

use crate::checks::Check;
use crate::report::CheckResult;
use async_trait::async_trait;
use std::time::{Duration, Instant};
use tokio::net::TcpStream;

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Probes a single TCP endpoint. The check carries its own timeout and
/// resolves to an `Error` result when it fires, so a hanging target can
/// never stall the whole aggregation.
pub struct TcpCheck {
    identifier: String,
    target: String,
    timeout: Duration,
}

impl TcpCheck {
    pub fn new(identifier: impl Into<String>, target: impl Into<String>) -> Self {
        Self {
            identifier: identifier.into(),
            target: target.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn target(&self) -> &str {
        &self.target
    }
}

#[async_trait]
impl Check for TcpCheck {
    fn identifier(&self) -> &str {
        &self.identifier
    }

    async fn run(&self) -> CheckResult {
        let start = Instant::now();

        match tokio::time::timeout(self.timeout, TcpStream::connect(&self.target)).await {
            Ok(Ok(_stream)) => {
                CheckResult::ok(&self.identifier, start.elapsed().as_millis() as u64)
            }
            Ok(Err(e)) => CheckResult::error(
                &self.identifier,
                format!("connection to {} failed: {}", self.target, e),
                start.elapsed().as_millis() as u64,
            ),
            Err(_) => CheckResult::error(
                &self.identifier,
                format!("connection to {} timed out after {:?}", self.target, self.timeout),
                start.elapsed().as_millis() as u64,
            ),
        }
    }
}
