//! Named platform checks and the runner that executes them in order.

mod layout;
mod navigation;
mod page_load;
mod performance;
mod runner;
mod ui_elements;
mod vendor;

pub use layout::ResponsiveLayoutCheck;
pub use navigation::{NavigationCheck, REMOTE_KEY_SEQUENCE};
pub use page_load::PageLoadCheck;
pub use performance::{LoadTiming, PerformanceCheck};
pub use runner::{CheckRunner, SequenceEnd};
pub use ui_elements::UiElementsCheck;
pub use vendor::VendorSpecificCheck;

use crate::config::Thresholds;
use crate::platform::PlatformProfile;
use crate::resolution::ResolutionSpec;
use crate::session::BrowserSession;
use async_trait::async_trait;
use std::sync::Arc;
use std::time::Duration;

/// Assertion-level outcome of a check. Unexpected conditions are reported as
/// `Err` instead and recorded with status `error`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CheckOutcome {
    Pass(String),
    Fail(String),
    Skip(String),
}

/// What a check runs against: a ready page for one profile at one resolution.
#[derive(Debug, Clone)]
pub struct CheckTarget {
    pub profile: Arc<PlatformProfile>,
    pub resolution: ResolutionSpec,
    pub thresholds: Thresholds,
    /// Time from navigation start until the readiness probe succeeded.
    pub ready_after: Duration,
}

#[async_trait]
pub trait Check: Send + Sync {
    fn name(&self) -> &str;

    async fn run(
        &self,
        session: &mut dyn BrowserSession,
        target: &CheckTarget,
    ) -> crate::Result<CheckOutcome>;
}

/// Ordered, pluggable sequence of checks.
#[derive(Clone, Default)]
pub struct CheckSuite {
    checks: Vec<Arc<dyn Check>>,
}

impl CheckSuite {
    pub fn new() -> Self {
        Self::default()
    }

    /// page-load, ui-elements, responsive-layout, navigation, performance, vendor-specific.
    pub fn standard() -> Self {
        Self::new()
            .with(PageLoadCheck)
            .with(UiElementsCheck)
            .with(ResponsiveLayoutCheck)
            .with(NavigationCheck::default())
            .with(PerformanceCheck)
            .with(VendorSpecificCheck)
    }

    pub fn with(mut self, check: impl Check + 'static) -> Self {
        self.checks.push(Arc::new(check));
        self
    }

    pub fn push(&mut self, check: Arc<dyn Check>) {
        self.checks.push(check);
    }

    pub fn checks(&self) -> &[Arc<dyn Check>] {
        &self.checks
    }

    pub fn names(&self) -> Vec<&str> {
        self.checks.iter().map(|c| c.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.checks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.checks.is_empty()
    }
}

/// Read a `{ total, visible }` object produced by
/// [`scripts::element_visibility`](crate::scripts::element_visibility).
pub(crate) fn visibility_counts(value: &serde_json::Value) -> crate::Result<(u64, u64)> {
    let total = value.get("total").and_then(|v| v.as_u64());
    let visible = value.get("visible").and_then(|v| v.as_u64());
    match (total, visible) {
        (Some(total), Some(visible)) => Ok((total, visible)),
        _ => Err(crate::Error::Browser(format!(
            "Unexpected visibility result: {}",
            value
        ))),
    }
}
