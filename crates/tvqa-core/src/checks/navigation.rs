use super::{Check, CheckOutcome, CheckTarget};
use crate::session::BrowserSession;
use crate::{Result, scripts};
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Keys a TV remote sends while moving through the app and selecting an item.
pub const REMOTE_KEY_SEQUENCE: [&str; 5] = ["ArrowDown", "ArrowRight", "ArrowUp", "ArrowLeft", "Enter"];

/// Simulated remote-control navigation leaves the app shell mounted.
pub struct NavigationCheck {
    /// Pause after each key press so focus handlers can run.
    settle: Duration,
}

impl NavigationCheck {
    pub fn with_settle(settle: Duration) -> Self {
        Self { settle }
    }
}

impl Default for NavigationCheck {
    fn default() -> Self {
        Self::with_settle(Duration::from_millis(200))
    }
}

#[async_trait]
impl Check for NavigationCheck {
    fn name(&self) -> &str {
        "navigation"
    }

    async fn run(&self, session: &mut dyn BrowserSession, target: &CheckTarget) -> Result<CheckOutcome> {
        for key in REMOTE_KEY_SEQUENCE {
            session.press_key(key).await?;
            tokio::time::sleep(self.settle).await;
        }

        let selector = &target.profile.readiness.selector;
        let still_mounted = session.evaluate(&scripts::element_present(selector)).await?;

        if still_mounted == Value::Bool(true) {
            Ok(CheckOutcome::Pass(format!(
                "App remained responsive after {} remote key presses",
                REMOTE_KEY_SEQUENCE.len()
            )))
        } else {
            Ok(CheckOutcome::Fail(format!(
                "App shell '{}' disappeared during remote navigation",
                selector
            )))
        }
    }
}
