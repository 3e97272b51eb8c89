//! Resolution matrix: resize, re-navigate and re-validate readiness per
//! resolution, then hand the ready session to the check runner.

use crate::artifacts::ArtifactCollector;
use crate::checks::{CheckRunner, SequenceEnd};
use crate::log::PlatformLog;
use crate::report::ReportAggregator;
use crate::resolution::ResolutionSpec;
use crate::result::{CheckResult, CheckStatus, READINESS_CHECK, ResultKey};
use crate::session::ManagedSession;
use crate::{Error, Result};
use std::time::Instant;

/// How a matrix pass ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatrixEnd {
    Exhausted,
    SessionLost,
}

/// Per-resolution progress reported to the orchestrator's state machine.
pub trait MatrixObserver: Send {
    fn entering_resolution(&mut self, _index: usize, _resolution: &ResolutionSpec) {}

    fn running_checks(&mut self, _index: usize, _resolution: &ResolutionSpec) {}
}

impl MatrixObserver for () {}

pub struct ResolutionMatrixRunner<'a> {
    checks: &'a CheckRunner,
    collector: &'a ArtifactCollector,
    aggregator: &'a ReportAggregator,
}

impl<'a> ResolutionMatrixRunner<'a> {
    pub fn new(
        checks: &'a CheckRunner,
        collector: &'a ArtifactCollector,
        aggregator: &'a ReportAggregator,
    ) -> Self {
        Self {
            checks,
            collector,
            aggregator,
        }
    }

    /// Visit every resolution in configured order. A resolution that never
    /// becomes ready is recorded as a `readiness` error and skipped; the
    /// matrix only stops early when the session is lost.
    pub async fn run(
        &self,
        session: &mut ManagedSession,
        resolutions: &[ResolutionSpec],
        log: &mut PlatformLog,
        observer: &mut dyn MatrixObserver,
    ) -> MatrixEnd {
        let platform = session.profile().platform;

        for (index, resolution) in resolutions.iter().enumerate() {
            observer.entering_resolution(index, resolution);
            let identity = format!("{}::{}", platform, resolution.label);
            log.info(&identity, format!("Testing resolution {}", resolution));

            let navigation_started = Instant::now();
            let prepared = self.prepare(session, resolution).await;
            let readiness = match prepared {
                Ok(()) => session.wait_until_ready(navigation_started).await,
                Err(e) => Err(e),
            };

            match readiness {
                Ok(mut ready) => {
                    observer.running_checks(index, resolution);
                    let end = self
                        .checks
                        .run(&mut ready, index, self.collector, self.aggregator, log)
                        .await;
                    if end == SequenceEnd::SessionLost {
                        return MatrixEnd::SessionLost;
                    }
                }
                Err(e) => {
                    let lost = e.is_session_lost();
                    self.record_not_ready(session, index, resolution, navigation_started, e, log)
                        .await;
                    if lost || !session.is_usable() {
                        log.error(&identity, "Session lost, remaining resolutions not attempted");
                        return MatrixEnd::SessionLost;
                    }
                }
            }
        }

        MatrixEnd::Exhausted
    }

    async fn prepare(&self, session: &mut ManagedSession, resolution: &ResolutionSpec) -> Result<()> {
        session.resize(resolution).await?;
        session.navigate_home().await
    }

    async fn record_not_ready(
        &self,
        session: &mut ManagedSession,
        index: usize,
        resolution: &ResolutionSpec,
        started: Instant,
        error: Error,
        log: &mut PlatformLog,
    ) {
        let key = ResultKey::new(
            session.profile().platform,
            index,
            resolution.label.clone(),
            0,
            READINESS_CHECK,
        );
        let result = CheckResult::new(key, CheckStatus::Error, error.to_string(), started.elapsed());
        log.error(&result.key, format!("error: {}", result.message));

        if let Some(artifact) = self.collector.on_failure(&result, session.browser(), log).await {
            self.aggregator.submit_artifact(artifact).await;
        }
        self.aggregator.submit_result(result).await;
    }
}
