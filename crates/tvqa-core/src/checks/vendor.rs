use super::{Check, CheckOutcome, CheckTarget, visibility_counts};
use crate::session::BrowserSession;
use crate::{Result, scripts};
use async_trait::async_trait;

/// Vendor-marked elements, when the build ships any, are all visible.
pub struct VendorSpecificCheck;

#[async_trait]
impl Check for VendorSpecificCheck {
    fn name(&self) -> &str {
        "vendor-specific"
    }

    async fn run(&self, session: &mut dyn BrowserSession, target: &CheckTarget) -> Result<CheckOutcome> {
        let selector = &target.profile.vendor_selector;
        let value = session.evaluate(&scripts::element_visibility(selector)).await?;
        let (total, visible) = visibility_counts(&value)?;
        let platform = target.profile.platform;

        if total == 0 {
            return Ok(CheckOutcome::Skip(format!(
                "No {}-specific elements present",
                platform
            )));
        }

        if visible == total {
            Ok(CheckOutcome::Pass(format!(
                "All {} {}-specific elements visible",
                total, platform
            )))
        } else {
            Ok(CheckOutcome::Fail(format!(
                "{} of {} {}-specific elements are hidden",
                total - visible,
                total,
                platform
            )))
        }
    }
}
