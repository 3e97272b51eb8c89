mod aggregator;
mod writer;

pub use aggregator::ReportAggregator;
pub use writer::{RUN_STAMP_FORMAT, ReportWriter};

use crate::platform::Platform;
use crate::result::{Artifact, CheckResult, CheckStatus};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum PlatformOutcome {
    Completed,
    FailedFatal { reason: String },
}

/// Per-platform counts, computed at finalize.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformSummary {
    pub platform: Platform,
    pub outcome: PlatformOutcome,
    pub total: usize,
    pub passed: usize,
    pub failed: usize,
    pub errors: usize,
    pub skipped: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub log_path: Option<PathBuf>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RunStatus {
    Passed,
    Failed,
}

/// Finalized, deterministically ordered aggregate of one invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunReport {
    pub generated_at: DateTime<Utc>,
    pub started_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub finished_at: Option<DateTime<Utc>>,
    pub status: RunStatus,
    pub platforms: Vec<PlatformSummary>,
    pub results: Vec<CheckResult>,
    pub artifacts: Vec<Artifact>,
}

impl RunReport {
    /// 0 when every result is pass or skip.
    pub fn exit_code(&self) -> i32 {
        match self.status {
            RunStatus::Passed => 0,
            RunStatus::Failed => 1,
        }
    }

    pub fn artifact_for(&self, result: &CheckResult) -> Option<&Artifact> {
        self.artifacts.iter().find(|a| a.result == result.key)
    }

    pub fn results_for(&self, platform: Platform) -> impl Iterator<Item = &CheckResult> {
        self.results.iter().filter(move |r| r.key.platform == platform)
    }

    pub fn count(&self, status: CheckStatus) -> usize {
        self.results.iter().filter(|r| r.status == status).count()
    }
}
