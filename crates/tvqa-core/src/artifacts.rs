//! Failure artifacts.
//!
//! Called synchronously by the runners right after a result is recorded as
//! `fail` or `error`, while the session still shows the failing state.

use crate::config::HarnessConfig;
use crate::log::PlatformLog;
use crate::report::RUN_STAMP_FORMAT;
use crate::result::{Artifact, ArtifactKind, CheckResult, ResultKey};
use crate::session::BrowserSession;
use crate::{Error, Result};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

/// Replace anything outside `[A-Za-z0-9_-]` so names are safe in file paths.
pub fn sanitize_component(name: &str) -> String {
    name.chars()
        .map(|c| match c {
            'a'..='z' | 'A'..='Z' | '0'..='9' | '-' | '_' => c,
            _ => '_',
        })
        .collect()
}

/// Captures one artifact per failing result. Shared by all workers.
#[derive(Debug)]
pub struct ArtifactCollector {
    screenshots_dir: PathBuf,
    logs_dir: PathBuf,
    capture_timeout: Duration,
    sequence: AtomicU64,
}

impl ArtifactCollector {
    pub fn new(screenshots_dir: PathBuf, logs_dir: PathBuf, capture_timeout: Duration) -> Self {
        Self {
            screenshots_dir,
            logs_dir,
            capture_timeout,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn from_config(config: &HarnessConfig) -> Self {
        Self::new(
            config.screenshots_dir(),
            config.logs_dir(),
            config.session.navigation_timeout(),
        )
    }

    pub fn screenshots_dir(&self) -> &Path {
        &self.screenshots_dir
    }

    /// `<platform>_<check>_<resolution>_<YYYYmmdd_HHMMSS>-<seq>`.
    ///
    /// The sequence is run-wide, so two workers failing in the same second
    /// never collide.
    pub fn artifact_stem(&self, key: &ResultKey, at: DateTime<Utc>) -> String {
        let seq = self.sequence.fetch_add(1, Ordering::SeqCst) + 1;
        format!(
            "{}_{}_{}_{}-{:04}",
            key.platform,
            sanitize_component(&key.check),
            sanitize_component(&key.resolution),
            at.format(RUN_STAMP_FORMAT),
            seq
        )
    }

    /// Capture the artifact for a failing result.
    ///
    /// A screenshot is preferred. If it cannot be taken the error is logged and
    /// a text artifact describing the result is written instead. `None` is only
    /// returned when nothing at all could be written; that is logged too and
    /// never affects the result itself.
    pub async fn on_failure(
        &self,
        result: &CheckResult,
        browser: Result<&mut dyn BrowserSession>,
        log: &mut PlatformLog,
    ) -> Option<Artifact> {
        let captured_at = Utc::now();
        let stem = self.artifact_stem(&result.key, captured_at);

        let capture_error = match self.capture_screenshot(browser, &stem).await {
            Ok(path) => {
                log.info(&result.key, format!("Screenshot saved to {}", path.display()));
                return Some(Artifact {
                    kind: ArtifactKind::Screenshot,
                    path,
                    result: result.key.clone(),
                    captured_at,
                });
            }
            Err(e) => e,
        };

        log.warning(
            &result.key,
            format!("Failed to capture screenshot on failure: {}", capture_error),
        );

        match self.write_fallback(result, &capture_error, &stem).await {
            Ok(path) => Some(Artifact {
                kind: ArtifactKind::Log,
                path,
                result: result.key.clone(),
                captured_at,
            }),
            Err(e) => {
                log.error(&result.key, format!("Failed to write failure artifact: {}", e));
                None
            }
        }
    }

    async fn capture_screenshot(
        &self,
        browser: Result<&mut dyn BrowserSession>,
        stem: &str,
    ) -> Result<PathBuf> {
        let browser = browser.map_err(|e| Error::ArtifactCapture(e.to_string()))?;
        if !browser.is_open() {
            return Err(Error::ArtifactCapture(Error::SessionClosed.to_string()));
        }

        let png = tokio::time::timeout(self.capture_timeout, browser.screenshot())
            .await
            .map_err(|_| {
                Error::ArtifactCapture(format!("screenshot timed out after {:?}", self.capture_timeout))
            })?
            .map_err(|e| Error::ArtifactCapture(e.to_string()))?;

        tokio::fs::create_dir_all(&self.screenshots_dir).await?;
        let path = self.screenshots_dir.join(format!("{}.png", stem));
        tokio::fs::write(&path, png).await?;
        Ok(path)
    }

    async fn write_fallback(&self, result: &CheckResult, capture_error: &Error, stem: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(&self.logs_dir).await?;
        let path = self.logs_dir.join(format!("{}.log", stem));
        let body = format!(
            "test: {}\nstatus: {}\nmessage: {}\nscreenshot unavailable: {}\n",
            result.key, result.status, result.message, capture_error
        );
        tokio::fs::write(&path, body).await?;
        Ok(path)
    }
}
