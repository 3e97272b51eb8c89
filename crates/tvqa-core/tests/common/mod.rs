#![allow(dead_code)]

use async_trait::async_trait;
use serde_json::{Value, json};
use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tvqa_core::checks::{
    CheckSuite, NavigationCheck, PageLoadCheck, PerformanceCheck, ResponsiveLayoutCheck, UiElementsCheck,
    VendorSpecificCheck,
};
use tvqa_core::config::{HarnessConfig, SessionOptions};
use tvqa_core::platform::{Platform, PlatformProfile, PlatformRegistry};
use tvqa_core::resolution::ResolutionSpec;
use tvqa_core::scripts;
use tvqa_core::session::{BrowserSession, SessionLauncher, SessionRequest};
use tvqa_core::{Error, Result};

/// How a scripted session answers.
#[derive(Debug, Clone)]
pub struct Behavior {
    pub ready: bool,
    pub title: String,
    /// Reported instead of the applied viewport when set.
    pub viewport: Option<(u32, u32)>,
    pub load_time_ms: u64,
    pub visible_elements: u64,
    pub vendor_elements: (u64, u64),
    pub fail_launch: bool,
    pub launch_delay: Duration,
    /// Delay applied to each of the first `slow_navigations` navigations.
    pub navigate_delay: Duration,
    pub slow_navigations: usize,
    pub fail_screenshot: bool,
}

impl Default for Behavior {
    fn default() -> Self {
        Self {
            ready: true,
            title: "TV 2 Play".to_string(),
            viewport: None,
            load_time_ms: 1500,
            visible_elements: 42,
            vendor_elements: (0, 0),
            fail_launch: false,
            launch_delay: Duration::ZERO,
            navigate_delay: Duration::ZERO,
            slow_navigations: 0,
            fail_screenshot: false,
        }
    }
}

#[derive(Debug, Default)]
pub struct Counters {
    pub launched: AtomicUsize,
    pub closed: AtomicUsize,
    pub screenshots: AtomicUsize,
    pub navigations: AtomicUsize,
}

impl Counters {
    pub fn launched(&self) -> usize {
        self.launched.load(Ordering::SeqCst)
    }

    pub fn closed(&self) -> usize {
        self.closed.load(Ordering::SeqCst)
    }

    pub fn screenshots(&self) -> usize {
        self.screenshots.load(Ordering::SeqCst)
    }

    pub fn navigations(&self) -> usize {
        self.navigations.load(Ordering::SeqCst)
    }
}

#[derive(Default)]
pub struct ScriptedLauncher {
    behaviors: HashMap<Platform, Behavior>,
    pub counters: Arc<Counters>,
}

impl ScriptedLauncher {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, platform: Platform, behavior: Behavior) -> Self {
        self.behaviors.insert(platform, behavior);
        self
    }

    pub fn counters(&self) -> Arc<Counters> {
        Arc::clone(&self.counters)
    }
}

#[async_trait]
impl SessionLauncher for ScriptedLauncher {
    async fn launch(&self, request: &SessionRequest) -> Result<Box<dyn BrowserSession>> {
        let platform = request.profile.platform;
        let behavior = self.behaviors.get(&platform).cloned().unwrap_or_default();

        tokio::time::sleep(behavior.launch_delay).await;
        if behavior.fail_launch {
            return Err(Error::Browser(format!("no browser for {}", platform)));
        }

        let n = self.counters.launched.fetch_add(1, Ordering::SeqCst);
        Ok(Box::new(ScriptedSession {
            id: format!("{}-{}", platform, n),
            behavior,
            viewport: (request.resolution.width, request.resolution.height),
            navigations: 0,
            open: true,
            counters: Arc::clone(&self.counters),
        }))
    }
}

pub struct ScriptedSession {
    id: String,
    behavior: Behavior,
    viewport: (u32, u32),
    navigations: usize,
    open: bool,
    counters: Arc<Counters>,
}

impl ScriptedSession {
    fn ensure_open(&self) -> Result<()> {
        if self.open { Ok(()) } else { Err(Error::SessionClosed) }
    }
}

#[async_trait]
impl BrowserSession for ScriptedSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_open(&self) -> bool {
        self.open
    }

    async fn navigate(&mut self, _url: &str) -> Result<()> {
        self.ensure_open()?;
        self.counters.navigations.fetch_add(1, Ordering::SeqCst);
        self.navigations += 1;
        if self.navigations <= self.behavior.slow_navigations {
            tokio::time::sleep(self.behavior.navigate_delay).await;
        }
        Ok(())
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> Result<()> {
        self.ensure_open()?;
        self.viewport = (width, height);
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> Result<Value> {
        self.ensure_open()?;
        let b = &self.behavior;
        let value = if script == scripts::DOCUMENT_TITLE {
            json!(b.title)
        } else if script == scripts::VIEWPORT_SIZE {
            let (width, height) = b.viewport.unwrap_or(self.viewport);
            json!({ "width": width, "height": height })
        } else if script == scripts::NAVIGATION_TIMING {
            json!({ "navigationStart": 1_000_000u64, "loadEventEnd": 1_000_000 + b.load_time_ms })
        } else if script == scripts::VISIBLE_BODY_ELEMENTS {
            json!(b.visible_elements)
        } else if script.starts_with("document.querySelector(") {
            json!(b.ready)
        } else if script.contains("querySelectorAll") {
            json!({ "total": b.vendor_elements.0, "visible": b.vendor_elements.1 })
        } else {
            return Err(Error::Browser(format!("unscripted evaluation: {}", script)));
        };
        Ok(value)
    }

    async fn press_key(&mut self, _key: &str) -> Result<()> {
        self.ensure_open()
    }

    async fn screenshot(&mut self) -> Result<Vec<u8>> {
        self.ensure_open()?;
        if self.behavior.fail_screenshot {
            return Err(Error::Browser("capture failed".to_string()));
        }
        self.counters.screenshots.fetch_add(1, Ordering::SeqCst);
        Ok(b"\x89PNG\r\n\x1a\nscripted".to_vec())
    }

    async fn close(&mut self) -> Result<()> {
        self.open = false;
        self.counters.closed.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Short timeouts so readiness failures resolve quickly.
pub fn fast_session_options() -> SessionOptions {
    SessionOptions {
        headless: true,
        acquire_timeout_ms: 2_000,
        navigation_timeout_ms: 2_000,
        readiness_timeout_ms: 100,
        poll_interval_ms: 10,
        check_timeout_ms: 2_000,
    }
}

pub fn config(platforms: &[Platform], resolutions: Vec<ResolutionSpec>, artifacts_dir: &Path) -> HarnessConfig {
    let registry = PlatformRegistry::new(
        platforms
            .iter()
            .map(|p| PlatformProfile::new(*p, format!("https://tv.example.com/{}/", p))),
    )
    .unwrap();

    let mut config = HarnessConfig::new(registry);
    config.resolutions = resolutions;
    config.session = fast_session_options();
    config.artifacts_dir = artifacts_dir.to_path_buf();
    config
}

pub fn hd() -> ResolutionSpec {
    ResolutionSpec::new(1920, 1080, "1080p")
}

pub fn uhd() -> ResolutionSpec {
    ResolutionSpec::new(3840, 2160, "2160p")
}

/// Standard checks with no settle pause between remote key presses.
pub fn fast_suite() -> CheckSuite {
    CheckSuite::new()
        .with(PageLoadCheck)
        .with(UiElementsCheck)
        .with(ResponsiveLayoutCheck)
        .with(NavigationCheck::with_settle(Duration::ZERO))
        .with(PerformanceCheck)
        .with(VendorSpecificCheck)
}
