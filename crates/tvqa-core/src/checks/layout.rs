use super::{Check, CheckOutcome, CheckTarget};
use crate::session::BrowserSession;
use crate::{Error, Result, scripts};
use async_trait::async_trait;
use serde_json::Value;

/// The observed viewport equals the configured resolution within tolerance.
pub struct ResponsiveLayoutCheck;

fn dimension(value: &Value, name: &str) -> Result<u32> {
    value
        .get(name)
        .and_then(Value::as_f64)
        .map(|v| v.round() as u32)
        .ok_or_else(|| Error::Browser(format!("Viewport result has no '{}': {}", name, value)))
}

#[async_trait]
impl Check for ResponsiveLayoutCheck {
    fn name(&self) -> &str {
        "responsive-layout"
    }

    async fn run(&self, session: &mut dyn BrowserSession, target: &CheckTarget) -> Result<CheckOutcome> {
        let value = session.evaluate(scripts::VIEWPORT_SIZE).await?;
        let observed = (dimension(&value, "width")?, dimension(&value, "height")?);
        let tolerance = target.thresholds.viewport_tolerance_px;
        let res = &target.resolution;

        if res.matches(observed, tolerance) {
            Ok(CheckOutcome::Pass(format!(
                "Viewport {}x{} matches {}",
                observed.0, observed.1, res
            )))
        } else {
            Ok(CheckOutcome::Fail(format!(
                "Viewport {}x{} differs from {}x{} by more than {}px",
                observed.0, observed.1, res.width, res.height, tolerance
            )))
        }
    }
}
