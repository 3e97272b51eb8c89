use super::{Check, CheckOutcome, CheckTarget};
use crate::session::BrowserSession;
use crate::{Error, Result, scripts};
use async_trait::async_trait;

/// At least `min_visible_elements` rendered elements inside `body`.
pub struct UiElementsCheck;

#[async_trait]
impl Check for UiElementsCheck {
    fn name(&self) -> &str {
        "ui-elements"
    }

    async fn run(&self, session: &mut dyn BrowserSession, target: &CheckTarget) -> Result<CheckOutcome> {
        let value = session.evaluate(scripts::VISIBLE_BODY_ELEMENTS).await?;
        let visible = value
            .as_u64()
            .ok_or_else(|| Error::Browser(format!("Unexpected element count: {}", value)))?;
        let required = target.thresholds.min_visible_elements as u64;

        if visible >= required {
            Ok(CheckOutcome::Pass(format!("Found {} visible elements", visible)))
        } else {
            Ok(CheckOutcome::Fail(format!(
                "Found {} visible elements, expected at least {}",
                visible, required
            )))
        }
    }
}
