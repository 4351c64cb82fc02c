//! Result aggregation: deterministic ordering, summary, report payload.

use crate::config::TargetsInfo;
use crate::corpus::write_json;
use crate::error::StoreError;
use crate::executor::RunResult;
use serde::{Deserialize, Serialize};
use std::path::Path;
use tracing::info;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Summary {
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
}

pub fn summarize(results: &[RunResult]) -> Summary {
    let passed = results.iter().filter(|r| r.equal).count();
    Summary {
        total: results.len(),
        passed,
        failed: results.len() - passed,
    }
}

/// The `results.json` payload.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Report {
    pub summary: Summary,
    /// Ordered by testcase id
    pub results: Vec<RunResult>,
    pub targets: TargetsInfo,
}

impl Report {
    /// Order results by id (completion order is arbitrary) and summarize.
    pub fn assemble(mut results: Vec<RunResult>, targets: TargetsInfo) -> Self {
        results.sort_by(|a, b| a.id.cmp(&b.id));
        Self {
            summary: summarize(&results),
            results,
            targets,
        }
    }

    pub fn failures(&self) -> impl Iterator<Item = &RunResult> {
        self.results.iter().filter(|r| !r.equal)
    }

    pub fn write(&self, path: &Path) -> Result<(), StoreError> {
        write_json(path, self)?;
        info!(
            "Wrote {} results ({} passed, {} failed) to {}",
            self.summary.total,
            self.summary.passed,
            self.summary.failed,
            path.display()
        );
        Ok(())
    }
}
