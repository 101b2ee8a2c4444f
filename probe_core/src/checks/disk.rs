//! Local filesystem check

use crate::checks::Check;
use crate::report::CheckResult;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::time::Instant;
use tokio::fs;

pub const DISK_CHECK_ID: &str = "disk";

/// Verifies that a set of paths exist and are readable and writable.
/// Writability is probed by writing and removing a scratch file, since
/// permission bits alone do not prove the mount accepts writes.
pub struct DiskCheck {
    paths: Vec<PathBuf>,
}

impl DiskCheck {
    pub fn new(paths: Vec<PathBuf>) -> Self {
        Self { paths }
    }
}

async fn probe_writable(path: &Path) -> bool {
    let dir = if path.is_dir() {
        path
    } else {
        match path.parent() {
            Some(parent) => parent,
            None => return false,
        }
    };

    let scratch = dir.join(".readiness_probe_scratch");
    match fs::write(&scratch, "probe").await {
        Ok(_) => {
            let _ = fs::remove_file(&scratch).await;
            true
        }
        Err(_) => false,
    }
}

#[async_trait]
impl Check for DiskCheck {
    fn identifier(&self) -> &str {
        DISK_CHECK_ID
    }

    async fn run(&self) -> CheckResult {
        let start = Instant::now();
        let mut errors = Vec::new();

        for path in &self.paths {
            if !path.exists() {
                errors.push(format!("path does not exist: {}", path.display()));
                continue;
            }

            if fs::metadata(path).await.is_err() {
                errors.push(format!("cannot read path: {}", path.display()));
            }

            if !probe_writable(path).await {
                errors.push(format!("cannot write to path: {}", path.display()));
            }
        }

        CheckResult::errors(DISK_CHECK_ID, errors, start.elapsed().as_millis() as u64)
    }
}
