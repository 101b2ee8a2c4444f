//! Pluggable dependency checks

use crate::report::CheckResult;
use async_trait::async_trait;

pub mod custom;
pub mod disk;
pub mod tcp;


pub use custom::CustomCheck;
pub use disk::DiskCheck;
pub use tcp::TcpCheck;

/// Contract for a single dependency probe.
///
/// Expected failure modes (connection refused, timeout, missing path)
/// must resolve to an `Error` result with a descriptive message rather
/// than panic; the aggregator only treats a panic as a last-resort
/// unexpected error. `identifier()` is deterministic given the check's
/// construction parameters and stable across runs.
#[async_trait]
pub trait Check: Send + Sync {
    fn identifier(&self) -> &str;

    async fn run(&self) -> CheckResult;
}
