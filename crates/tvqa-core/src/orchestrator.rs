//! Top-level driver: one worker per selected platform, each owning exactly
//! one session for its whole matrix.

use crate::artifacts::ArtifactCollector;
use crate::checks::{CheckRunner, CheckSuite};
use crate::config::HarnessConfig;
use crate::log::PlatformLog;
use crate::matrix::{MatrixEnd, MatrixObserver, ResolutionMatrixRunner};
use crate::platform::{Platform, PlatformProfile};
use crate::report::{PlatformOutcome, RUN_STAMP_FORMAT, ReportAggregator, RunReport};
use crate::resolution::ResolutionSpec;
use crate::session::{SessionLauncher, SessionManager};
use crate::Result;
use chrono::Utc;
use futures::FutureExt;
use std::fmt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::Instrument;

/// Lifecycle of one platform run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformState {
    Pending,
    Acquiring,
    RunningMatrix,
    RunningChecks,
    Releasing,
    Done,
    FailedFatal,
}

impl PlatformState {
    pub fn can_transition_to(self, next: PlatformState) -> bool {
        use PlatformState::*;
        matches!(
            (self, next),
            (Pending, Acquiring)
                | (Pending, Done)
                | (Acquiring, RunningMatrix)
                | (Acquiring, FailedFatal)
                | (RunningMatrix, RunningMatrix)
                | (RunningMatrix, RunningChecks)
                | (RunningMatrix, Releasing)
                | (RunningChecks, RunningMatrix)
                | (RunningChecks, Releasing)
                | (Releasing, Done)
        )
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, PlatformState::Done | PlatformState::FailedFatal)
    }
}

impl fmt::Display for PlatformState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlatformState::Pending => "PENDING",
            PlatformState::Acquiring => "ACQUIRING",
            PlatformState::RunningMatrix => "RUNNING_MATRIX",
            PlatformState::RunningChecks => "RUNNING_CHECKS",
            PlatformState::Releasing => "RELEASING",
            PlatformState::Done => "DONE",
            PlatformState::FailedFatal => "FAILED_FATAL",
        };
        f.write_str(name)
    }
}

/// Tracks a platform's state and rejects transitions the lifecycle does not allow.
#[derive(Debug)]
pub struct PlatformStateMachine {
    platform: Platform,
    state: PlatformState,
    history: Vec<PlatformState>,
}

impl PlatformStateMachine {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            state: PlatformState::Pending,
            history: vec![PlatformState::Pending],
        }
    }

    pub fn state(&self) -> PlatformState {
        self.state
    }

    pub fn history(&self) -> &[PlatformState] {
        &self.history
    }

    /// Returns false, leaving the state unchanged, for a disallowed transition.
    pub fn transition(&mut self, next: PlatformState) -> bool {
        if !self.state.can_transition_to(next) {
            tracing::warn!(
                "{}: ignoring invalid transition {} -> {}",
                self.platform,
                self.state,
                next
            );
            return false;
        }
        tracing::debug!("{}: {} -> {}", self.platform, self.state, next);
        self.state = next;
        self.history.push(next);
        true
    }
}

impl MatrixObserver for PlatformStateMachine {
    fn entering_resolution(&mut self, _index: usize, _resolution: &ResolutionSpec) {
        self.transition(PlatformState::RunningMatrix);
    }

    fn running_checks(&mut self, _index: usize, _resolution: &ResolutionSpec) {
        self.transition(PlatformState::RunningChecks);
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutionMode {
    Sequential,
    /// Bounded worker pool; each worker owns one platform and its session.
    Parallel { max_workers: usize },
}

#[derive(Clone)]
pub struct Orchestrator {
    config: Arc<HarnessConfig>,
    sessions: SessionManager,
    checks: CheckRunner,
    collector: Arc<ArtifactCollector>,
}

impl Orchestrator {
    pub fn new(config: HarnessConfig, launcher: Arc<dyn SessionLauncher>) -> Self {
        Self::with_suite(config, launcher, CheckSuite::standard())
    }

    pub fn with_suite(config: HarnessConfig, launcher: Arc<dyn SessionLauncher>, suite: CheckSuite) -> Self {
        let sessions = SessionManager::new(launcher, config.session.clone());
        let checks = CheckRunner::new(
            Arc::new(suite),
            config.thresholds.clone(),
            config.session.check_timeout(),
        );
        let collector = Arc::new(ArtifactCollector::from_config(&config));
        Self {
            config: Arc::new(config),
            sessions,
            checks,
            collector,
        }
    }

    pub fn config(&self) -> &HarnessConfig {
        &self.config
    }

    /// Run every selected platform and return the finalized report.
    ///
    /// Only an invalid selection fails; platform-level failures end up in the
    /// report.
    pub async fn run(&self, selection: &[Platform], mode: ExecutionMode) -> Result<RunReport> {
        let profiles = self.config.registry.select(selection)?;
        let started_at = Utc::now();
        let stamp = started_at.format(RUN_STAMP_FORMAT).to_string();
        let aggregator = Arc::new(ReportAggregator::new(started_at));

        tracing::info!(
            "Starting run for {} platform(s) across {} resolution(s)",
            profiles.len(),
            self.config.resolutions.len()
        );

        match mode {
            ExecutionMode::Sequential => {
                for profile in profiles {
                    self.run_platform(profile, &aggregator, &stamp).await;
                }
            }
            ExecutionMode::Parallel { max_workers } => {
                let semaphore = Arc::new(Semaphore::new(max_workers.max(1)));
                let mut workers = JoinSet::new();

                for profile in profiles {
                    let this = self.clone();
                    let aggregator = Arc::clone(&aggregator);
                    let semaphore = Arc::clone(&semaphore);
                    let stamp = stamp.clone();
                    workers.spawn(async move {
                        let _permit = semaphore.acquire_owned().await.ok();
                        this.run_platform(profile, &aggregator, &stamp).await;
                    });
                }

                while let Some(joined) = workers.join_next().await {
                    if let Err(e) = joined {
                        tracing::error!("Platform worker did not complete: {}", e);
                    }
                }
            }
        }

        aggregator.mark_finished(Utc::now()).await;
        let report = aggregator.finalize(Utc::now()).await;

        tracing::info!(
            "Run finished: {} results, {} artifacts, status {:?}",
            report.results.len(),
            report.artifacts.len(),
            report.status
        );

        Ok(report)
    }

    async fn run_platform(&self, profile: Arc<PlatformProfile>, aggregator: &ReportAggregator, stamp: &str) {
        let platform = profile.platform;
        let span = tracing::info_span!("platform", platform = %platform);

        async move {
            let mut log = PlatformLog::new(platform);
            let mut machine = PlatformStateMachine::new(platform);

            let driven = AssertUnwindSafe(self.drive(profile, aggregator, &mut log, &mut machine))
                .catch_unwind()
                .await;
            let outcome = match driven {
                Ok(outcome) => outcome,
                Err(_) => {
                    log.error(platform, "Platform worker panicked");
                    PlatformOutcome::FailedFatal {
                        reason: "platform worker panicked".to_string(),
                    }
                }
            };

            let log_path = match log.write_to(&self.config.logs_dir(), stamp).await {
                Ok(path) => Some(path),
                Err(e) => {
                    tracing::warn!("Failed to write {} log: {}", platform, e);
                    None
                }
            };

            aggregator.record_platform(platform, outcome, log_path).await;
        }
        .instrument(span)
        .await
    }

    async fn drive(
        &self,
        profile: Arc<PlatformProfile>,
        aggregator: &ReportAggregator,
        log: &mut PlatformLog,
        machine: &mut PlatformStateMachine,
    ) -> PlatformOutcome {
        let platform = profile.platform;
        let resolutions = &self.config.resolutions;

        let Some(first) = resolutions.first() else {
            log.warning(platform, "No resolutions configured, nothing to run");
            machine.transition(PlatformState::Done);
            return PlatformOutcome::Completed;
        };

        machine.transition(PlatformState::Acquiring);
        let mut session = match self.sessions.acquire(Arc::clone(&profile), first).await {
            Ok(session) => session,
            Err(e) => {
                log.error(platform, e.to_string());
                machine.transition(PlatformState::FailedFatal);
                return PlatformOutcome::FailedFatal {
                    reason: e.to_string(),
                };
            }
        };
        log.info(platform, format!("Session {} acquired", session.id()));
        machine.transition(PlatformState::RunningMatrix);

        let matrix = ResolutionMatrixRunner::new(&self.checks, &self.collector, aggregator);
        let end = AssertUnwindSafe(matrix.run(&mut session, resolutions, log, &mut *machine))
            .catch_unwind()
            .await;

        machine.transition(PlatformState::Releasing);
        session.release().await;
        machine.transition(PlatformState::Done);

        match end {
            Ok(MatrixEnd::Exhausted) => log.info(platform, "Resolution matrix complete"),
            Ok(MatrixEnd::SessionLost) => log.error(platform, "Session lost before the matrix completed"),
            Err(_) => log.error(platform, "Resolution matrix panicked; session released"),
        }

        PlatformOutcome::Completed
    }
}
