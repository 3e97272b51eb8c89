use super::{CheckOutcome, CheckSuite, CheckTarget};
use crate::Error;
use crate::artifacts::ArtifactCollector;
use crate::config::Thresholds;
use crate::log::PlatformLog;
use crate::report::ReportAggregator;
use crate::result::{CheckResult, CheckStatus, ResultKey};
use crate::session::ReadySession;
use futures::FutureExt;
use std::any::Any;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tracing::Instrument;

/// How a check sequence ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SequenceEnd {
    Completed,
    /// The session died mid-sequence; remaining checks were not attempted.
    SessionLost,
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        s.to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "unknown panic".to_string()
    }
}

/// Runs the suite against a ready session, one check at a time.
#[derive(Clone)]
pub struct CheckRunner {
    suite: Arc<CheckSuite>,
    thresholds: Thresholds,
    check_timeout: Duration,
}

impl CheckRunner {
    pub fn new(suite: Arc<CheckSuite>, thresholds: Thresholds, check_timeout: Duration) -> Self {
        Self {
            suite,
            thresholds,
            check_timeout,
        }
    }

    pub fn suite(&self) -> &CheckSuite {
        &self.suite
    }

    /// Check positions start at 1; 0 is the readiness gate.
    pub fn check_index(position: usize) -> usize {
        position + 1
    }

    /// Execute every check in order. A failing or erroring check never stops
    /// the sequence; only a lost session does.
    pub async fn run(
        &self,
        ready: &mut ReadySession<'_>,
        resolution_index: usize,
        collector: &ArtifactCollector,
        aggregator: &ReportAggregator,
        log: &mut PlatformLog,
    ) -> SequenceEnd {
        let target = CheckTarget {
            profile: Arc::clone(ready.profile()),
            resolution: ready.resolution().clone(),
            thresholds: self.thresholds.clone(),
            ready_after: ready.ready_after(),
        };

        for (position, check) in self.suite.checks().iter().enumerate() {
            let key = ResultKey::new(
                target.profile.platform,
                resolution_index,
                target.resolution.label.clone(),
                Self::check_index(position),
                check.name(),
            );
            let span = tracing::info_span!(
                "check",
                resolution = %target.resolution.label,
                check = check.name()
            );

            let started = Instant::now();
            let outcome = match ready.browser() {
                Ok(browser) => {
                    let guarded = AssertUnwindSafe(check.run(browser, &target)).catch_unwind();
                    match tokio::time::timeout(self.check_timeout, guarded)
                        .instrument(span)
                        .await
                    {
                        Ok(outcome) => outcome,
                        Err(_) => Ok(Err(Error::Timeout {
                            operation: "check",
                            timeout: self.check_timeout,
                        })),
                    }
                }
                Err(e) => Ok(Err(e)),
            };
            let elapsed = started.elapsed();

            let mut session_lost = false;
            let (status, message) = match outcome {
                Ok(Ok(CheckOutcome::Pass(msg))) => (CheckStatus::Pass, msg),
                Ok(Ok(CheckOutcome::Fail(msg))) => (CheckStatus::Fail, msg),
                Ok(Ok(CheckOutcome::Skip(msg))) => (CheckStatus::Skip, msg),
                Ok(Err(e)) => {
                    session_lost = e.is_session_lost();
                    (CheckStatus::Error, format!("Unexpected error: {}", e))
                }
                Err(payload) => (
                    CheckStatus::Error,
                    format!("Check panicked: {}", panic_message(payload)),
                ),
            };

            let result = CheckResult::new(key, status, message, elapsed);
            match status {
                CheckStatus::Pass | CheckStatus::Skip => {
                    log.info(&result.key, format!("{}: {}", status, result.message))
                }
                CheckStatus::Fail | CheckStatus::Error => {
                    log.error(&result.key, format!("{}: {}", status, result.message))
                }
            }

            if status.is_failure() {
                if let Some(artifact) = collector.on_failure(&result, ready.browser(), log).await {
                    aggregator.submit_artifact(artifact).await;
                }
            }
            aggregator.submit_result(result).await;

            if session_lost || !ready.is_usable() {
                log.error(
                    format!("{}::{}", target.profile.platform, target.resolution.label),
                    "Session lost, remaining checks not attempted",
                );
                return SequenceEnd::SessionLost;
            }
        }

        SequenceEnd::Completed
    }
}
