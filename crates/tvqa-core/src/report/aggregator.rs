use super::{PlatformOutcome, PlatformSummary, RunReport, RunStatus};
use crate::platform::Platform;
use crate::result::{Artifact, CheckResult, CheckStatus};
use chrono::{DateTime, Utc};
use std::collections::BTreeMap;
use std::path::PathBuf;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct Accumulator {
    results: Vec<CheckResult>,
    artifacts: Vec<Artifact>,
    platforms: BTreeMap<Platform, (PlatformOutcome, Option<PathBuf>)>,
    finished_at: Option<DateTime<Utc>>,
}

/// Shared sink for results produced by concurrent platform workers.
///
/// Submission order does not matter: [`finalize`](Self::finalize) sorts by
/// platform, resolution position and check position.
#[derive(Debug)]
pub struct ReportAggregator {
    started_at: DateTime<Utc>,
    inner: Mutex<Accumulator>,
}

impl ReportAggregator {
    pub fn new(started_at: DateTime<Utc>) -> Self {
        Self {
            started_at,
            inner: Mutex::new(Accumulator::default()),
        }
    }

    pub fn started_at(&self) -> DateTime<Utc> {
        self.started_at
    }

    pub async fn submit_result(&self, result: CheckResult) {
        tracing::debug!("Recording {} result for {}", result.status, result.key);
        self.inner.lock().await.results.push(result);
    }

    pub async fn submit_artifact(&self, artifact: Artifact) {
        self.inner.lock().await.artifacts.push(artifact);
    }

    /// Record how a platform run ended. A later call for the same platform replaces the earlier one.
    pub async fn record_platform(
        &self,
        platform: Platform,
        outcome: PlatformOutcome,
        log_path: Option<PathBuf>,
    ) {
        self.inner
            .lock()
            .await
            .platforms
            .insert(platform, (outcome, log_path));
    }

    pub async fn mark_finished(&self, at: DateTime<Utc>) {
        self.inner.lock().await.finished_at = Some(at);
    }

    /// Build the report. Does not consume the buffer; finalizing an unchanged
    /// buffer twice differs only in `generated_at`.
    pub async fn finalize(&self, generated_at: DateTime<Utc>) -> RunReport {
        let acc = self.inner.lock().await;

        let mut results = acc.results.clone();
        results.sort_by(|a, b| a.key.cmp(&b.key));

        let mut artifacts = acc.artifacts.clone();
        artifacts.sort_by(|a, b| a.result.cmp(&b.result).then_with(|| a.path.cmp(&b.path)));

        let mut outcomes = acc.platforms.clone();
        for result in &results {
            outcomes
                .entry(result.key.platform)
                .or_insert((PlatformOutcome::Completed, None));
        }

        let platforms = outcomes
            .into_iter()
            .map(|(platform, (outcome, log_path))| {
                let mine: Vec<_> = results.iter().filter(|r| r.key.platform == platform).collect();
                let count = |status: CheckStatus| mine.iter().filter(|r| r.status == status).count();
                PlatformSummary {
                    platform,
                    outcome,
                    total: mine.len(),
                    passed: count(CheckStatus::Pass),
                    failed: count(CheckStatus::Fail),
                    errors: count(CheckStatus::Error),
                    skipped: count(CheckStatus::Skip),
                    log_path,
                }
            })
            .collect();

        let status = if results.iter().any(|r| r.status.is_failure()) {
            RunStatus::Failed
        } else {
            RunStatus::Passed
        };

        RunReport {
            generated_at,
            started_at: self.started_at,
            finished_at: acc.finished_at,
            status,
            platforms,
            results,
            artifacts,
        }
    }
}
