use crate::profile::ProfileDir;
use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::browser::Browser;
use chromiumoxide::cdp::browser_protocol::emulation::SetDeviceMetricsOverrideParams;
use chromiumoxide::cdp::browser_protocol::page::CaptureScreenshotFormat;
use chromiumoxide::page::{Page, ScreenshotParams};
use serde_json::Value;
use tokio::task::JoinHandle;
use tvqa_core::session::BrowserSession;

/// One Chrome process with a single page, driven over the DevTools protocol.
pub struct CdpSession {
    id: String,
    browser: Browser,
    page: Page,
    handler_task: JoinHandle<()>,
    // Held so the user-data directory outlives the browser process.
    _profile: ProfileDir,
    open: bool,
}

impl CdpSession {
    pub(crate) fn new(
        id: String,
        browser: Browser,
        page: Page,
        handler_task: JoinHandle<()>,
        profile: ProfileDir,
    ) -> Self {
        Self {
            id,
            browser,
            page,
            handler_task,
            _profile: profile,
            open: true,
        }
    }

    pub(crate) async fn apply_viewport(page: &Page, width: u32, height: u32) -> Result<()> {
        page.execute(SetDeviceMetricsOverrideParams::new(
            i64::from(width),
            i64::from(height),
            1.0,
            false,
        ))
        .await?;
        Ok(())
    }

    fn ensure_open(&self) -> Result<()> {
        if self.is_open() {
            Ok(())
        } else {
            Err(Error::Disconnected(format!("session {} is closed", self.id)))
        }
    }
}

#[async_trait]
impl BrowserSession for CdpSession {
    fn id(&self) -> &str {
        &self.id
    }

    fn is_open(&self) -> bool {
        self.open && !self.handler_task.is_finished()
    }

    async fn navigate(&mut self, url: &str) -> tvqa_core::Result<()> {
        self.ensure_open()?;
        tracing::debug!("CDP {}: navigating to {}", self.id, url);
        self.page.goto(url).await.map_err(Error::from)?;
        Ok(())
    }

    async fn set_viewport(&mut self, width: u32, height: u32) -> tvqa_core::Result<()> {
        self.ensure_open()?;
        tracing::debug!("CDP {}: viewport {}x{}", self.id, width, height);
        Self::apply_viewport(&self.page, width, height).await?;
        Ok(())
    }

    async fn evaluate(&mut self, script: &str) -> tvqa_core::Result<Value> {
        self.ensure_open()?;
        let result = self.page.evaluate(script).await.map_err(Error::from)?;
        Ok(result.value().cloned().unwrap_or(Value::Null))
    }

    async fn press_key(&mut self, key: &str) -> tvqa_core::Result<()> {
        self.ensure_open()?;
        let body = self.page.find_element("body").await.map_err(Error::from)?;
        body.press_key(key).await.map_err(Error::from)?;
        Ok(())
    }

    async fn screenshot(&mut self) -> tvqa_core::Result<Vec<u8>> {
        self.ensure_open()?;
        let params = ScreenshotParams::builder()
            .format(CaptureScreenshotFormat::Png)
            .build();
        let png = self.page.screenshot(params).await.map_err(Error::from)?;
        Ok(png)
    }

    async fn close(&mut self) -> tvqa_core::Result<()> {
        if !self.open {
            return Ok(());
        }
        self.open = false;
        tracing::debug!("CDP {}: closing browser", self.id);

        let closed = self.browser.close().await.map_err(Error::from);
        if let Err(e) = self.browser.wait().await {
            tracing::debug!("CDP {}: browser process wait failed: {}", self.id, e);
        }
        self.handler_task.abort();

        closed?;
        Ok(())
    }
}
