use super::{Check, CheckOutcome, CheckTarget};
use crate::session::BrowserSession;
use crate::{Result, scripts};
use async_trait::async_trait;

/// The document title carries the app's expected title.
pub struct PageLoadCheck;

#[async_trait]
impl Check for PageLoadCheck {
    fn name(&self) -> &str {
        "page-load"
    }

    async fn run(&self, session: &mut dyn BrowserSession, target: &CheckTarget) -> Result<CheckOutcome> {
        let title = session.evaluate(scripts::DOCUMENT_TITLE).await?;
        let title = title.as_str().unwrap_or_default();
        let expected = &target.profile.expected_title;

        if title.contains(expected.as_str()) {
            Ok(CheckOutcome::Pass(format!("Page title '{}' loaded", title)))
        } else {
            Ok(CheckOutcome::Fail(format!(
                "Page title '{}' does not contain '{}'",
                title, expected
            )))
        }
    }
}
