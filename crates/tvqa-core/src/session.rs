//! Browser session contract and scoped session lifecycle.
//!
//! A [`BrowserSession`] is a remote-controlled browser exposing navigate,
//! inspect, screenshot and close. The [`SessionManager`] acquires one per
//! platform run and hands back a [`ManagedSession`] whose `release` is
//! idempotent and bounded. Checks only ever see a session through a
//! [`ReadySession`], which can only be obtained from a successful readiness
//! probe.

use crate::config::SessionOptions;
use crate::platform::PlatformProfile;
use crate::resolution::ResolutionSpec;
use crate::{Error, Result, scripts};
use async_trait::async_trait;
use serde_json::Value;
use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Opaque remote-controlled browser.
///
/// Every operation takes `&mut self`: a session has exactly one owner and is
/// never driven concurrently.
#[async_trait]
pub trait BrowserSession: Send {
    fn id(&self) -> &str;

    fn is_open(&self) -> bool;

    async fn navigate(&mut self, url: &str) -> Result<()>;

    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()>;

    /// Evaluate a script expression in the page and return its JSON value.
    async fn evaluate(&mut self, script: &str) -> Result<Value>;

    /// Send a key press (`ArrowDown`, `Enter`, ...) to the focused document.
    async fn press_key(&mut self, key: &str) -> Result<()>;

    /// PNG screenshot of the current viewport.
    async fn screenshot(&mut self) -> Result<Vec<u8>>;

    async fn close(&mut self) -> Result<()>;
}

/// Everything a launcher needs to produce a usable session.
#[derive(Debug, Clone)]
pub struct SessionRequest {
    pub profile: Arc<PlatformProfile>,
    pub resolution: ResolutionSpec,
    pub headless: bool,
}

/// Starts browser sessions. Window size, viewport and user agent must be
/// applied before `launch` returns.
#[async_trait]
pub trait SessionLauncher: Send + Sync {
    async fn launch(&self, request: &SessionRequest) -> Result<Box<dyn BrowserSession>>;
}

async fn bounded<T>(
    operation: &'static str,
    timeout: Duration,
    fut: impl Future<Output = Result<T>>,
) -> Result<T> {
    tokio::time::timeout(timeout, fut)
        .await
        .map_err(|_| Error::Timeout { operation, timeout })?
}

/// Acquires sessions on behalf of platform workers.
#[derive(Clone)]
pub struct SessionManager {
    launcher: Arc<dyn SessionLauncher>,
    options: SessionOptions,
}

impl SessionManager {
    pub fn new(launcher: Arc<dyn SessionLauncher>, options: SessionOptions) -> Self {
        Self { launcher, options }
    }

    pub fn options(&self) -> &SessionOptions {
        &self.options
    }

    /// Launch a session for `profile` sized to `resolution`.
    ///
    /// Any launcher failure, including the acquire timeout, is reported as
    /// [`Error::SessionAcquisition`].
    pub async fn acquire(
        &self,
        profile: Arc<PlatformProfile>,
        resolution: &ResolutionSpec,
    ) -> Result<ManagedSession> {
        let platform = profile.platform;
        let request = SessionRequest {
            profile: Arc::clone(&profile),
            resolution: resolution.clone(),
            headless: self.options.headless,
        };

        tracing::info!(
            "Acquiring {} session for {} at {}",
            if request.headless { "headless" } else { "headed" },
            platform,
            resolution
        );

        let timeout = self.options.acquire_timeout();
        let inner = match tokio::time::timeout(timeout, self.launcher.launch(&request)).await {
            Ok(Ok(inner)) => inner,
            Ok(Err(e)) => {
                return Err(Error::SessionAcquisition {
                    platform,
                    reason: e.to_string(),
                });
            }
            Err(_) => {
                return Err(Error::SessionAcquisition {
                    platform,
                    reason: format!("launch timed out after {:?}", timeout),
                });
            }
        };

        tracing::info!("Session {} acquired for {}", inner.id(), platform);

        Ok(ManagedSession {
            inner,
            profile,
            resolution: resolution.clone(),
            options: self.options.clone(),
            released: false,
        })
    }
}

/// A live session owned by exactly one platform worker.
pub struct ManagedSession {
    inner: Box<dyn BrowserSession>,
    profile: Arc<PlatformProfile>,
    resolution: ResolutionSpec,
    options: SessionOptions,
    released: bool,
}

impl ManagedSession {
    pub fn id(&self) -> &str {
        self.inner.id()
    }

    pub fn profile(&self) -> &Arc<PlatformProfile> {
        &self.profile
    }

    /// Resolution most recently applied to the viewport.
    pub fn resolution(&self) -> &ResolutionSpec {
        &self.resolution
    }

    pub fn is_released(&self) -> bool {
        self.released
    }

    pub fn is_usable(&self) -> bool {
        !self.released && self.inner.is_open()
    }

    /// Direct access to the browser, used for artifact capture.
    pub fn browser(&mut self) -> Result<&mut dyn BrowserSession> {
        if self.released {
            return Err(Error::SessionClosed);
        }
        Ok(self.inner.as_mut())
    }

    pub async fn resize(&mut self, resolution: &ResolutionSpec) -> Result<()> {
        let timeout = self.options.navigation_timeout();
        let browser = self.browser()?;
        bounded(
            "viewport resize",
            timeout,
            browser.set_viewport(resolution.width, resolution.height),
        )
        .await?;
        self.resolution = resolution.clone();
        Ok(())
    }

    /// Navigate to the profile's base URL, bounded by the navigation timeout.
    pub async fn navigate_home(&mut self) -> Result<()> {
        let timeout = self.options.navigation_timeout();
        let url = self.profile.base_url.clone();
        let browser = self.browser()?;
        tracing::debug!("Navigating to {}", url);
        bounded("navigation", timeout, browser.navigate(&url)).await
    }

    /// Poll the readiness probe until it succeeds or the readiness timeout elapses.
    ///
    /// `navigation_started` is used to report how long the app took to become ready.
    pub async fn wait_until_ready(&mut self, navigation_started: Instant) -> Result<ReadySession<'_>> {
        let timeout = self.options.readiness_timeout();
        let poll = self.options.poll_interval();
        let selector = self.profile.readiness.selector.clone();
        let script = scripts::element_present(&selector);
        let deadline = Instant::now() + timeout;

        if self.released {
            return Err(Error::SessionClosed);
        }

        loop {
            let remaining = deadline.saturating_duration_since(Instant::now());
            if remaining.is_zero() {
                break;
            }

            let outcome = tokio::time::timeout(remaining, self.inner.evaluate(&script)).await;
            match outcome {
                Ok(Ok(Value::Bool(true))) => {
                    let ready_after = navigation_started.elapsed();
                    tracing::debug!("Readiness probe '{}' succeeded after {:?}", selector, ready_after);
                    return Ok(ReadySession {
                        session: self,
                        ready_after,
                    });
                }
                Ok(Ok(_)) => {}
                Ok(Err(e)) if e.is_session_lost() => return Err(e),
                Ok(Err(e)) => tracing::debug!("Readiness probe errored, retrying: {}", e),
                Err(_) => break,
            }

            let remaining = deadline.saturating_duration_since(Instant::now());
            tokio::time::sleep(poll.min(remaining)).await;
        }

        Err(Error::ReadinessTimeout { selector, timeout })
    }

    /// Close the browser. Safe to call any number of times; only the first
    /// call reaches the browser, and failures are logged, not returned.
    pub async fn release(&mut self) {
        if self.released {
            tracing::debug!("Session {} already released", self.inner.id());
            return;
        }
        self.released = true;

        let timeout = self.options.acquire_timeout();
        match tokio::time::timeout(timeout, self.inner.close()).await {
            Ok(Ok(())) => tracing::info!("Session {} released", self.inner.id()),
            Ok(Err(e)) => tracing::warn!("Session {} did not close cleanly: {}", self.inner.id(), e),
            Err(_) => tracing::warn!(
                "Session {} did not close within {:?}",
                self.inner.id(),
                timeout
            ),
        }
    }
}

impl Drop for ManagedSession {
    fn drop(&mut self) {
        if !self.released {
            tracing::warn!(
                "Session {} for {} dropped without release",
                self.inner.id(),
                self.profile.platform
            );
        }
    }
}

/// A session whose readiness probe has succeeded at the current resolution.
pub struct ReadySession<'a> {
    session: &'a mut ManagedSession,
    ready_after: Duration,
}

impl ReadySession<'_> {
    pub fn profile(&self) -> &Arc<PlatformProfile> {
        self.session.profile()
    }

    pub fn resolution(&self) -> &ResolutionSpec {
        self.session.resolution()
    }

    /// Time from navigation start until the probe first succeeded.
    pub fn ready_after(&self) -> Duration {
        self.ready_after
    }

    pub fn is_usable(&self) -> bool {
        self.session.is_usable()
    }

    pub fn browser(&mut self) -> Result<&mut dyn BrowserSession> {
        self.session.browser()
    }
}
