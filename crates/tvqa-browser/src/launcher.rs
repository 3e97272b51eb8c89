use crate::cdp_session::CdpSession;
use crate::profile::ProfileDir;
use crate::{Error, Result};
use async_trait::async_trait;
use chromiumoxide::browser::{Browser, BrowserConfig};
use chromiumoxide::cdp::browser_protocol::network::SetUserAgentOverrideParams;
use chromiumoxide::handler::viewport::Viewport;
use chromiumoxide::page::Page;
use futures::StreamExt;
use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicU64, Ordering};
use tvqa_core::session::{BrowserSession, SessionLauncher, SessionRequest};

/// Launches one Chrome process per session with the platform's identity applied.
pub struct ChromeLauncher {
    chrome_path: PathBuf,
    sequence: AtomicU64,
}

impl ChromeLauncher {
    pub fn new(chrome_path: PathBuf) -> Self {
        Self {
            chrome_path,
            sequence: AtomicU64::new(0),
        }
    }

    pub fn chrome_path(&self) -> &Path {
        &self.chrome_path
    }

    /// Extra Chrome flags on top of what `BrowserConfig` sets.
    fn build_args(request: &SessionRequest) -> Vec<String> {
        vec![
            "--no-first-run".to_string(),
            "--no-default-browser-check".to_string(),
            "--disable-gpu".to_string(),
            "--disable-dev-shm-usage".to_string(),
            "--disable-extensions".to_string(),
            format!("--user-agent={}", request.profile.user_agent),
        ]
    }

    fn build_config(&self, request: &SessionRequest, profile: &ProfileDir) -> Result<BrowserConfig> {
        let res = &request.resolution;
        let mut builder = BrowserConfig::builder()
            .chrome_executable(&self.chrome_path)
            .user_data_dir(profile.path())
            .window_size(res.width, res.height)
            .viewport(None::<Viewport>)
            .no_sandbox()
            .args(Self::build_args(request));

        if !request.headless {
            builder = builder.with_head();
        }

        builder.build().map_err(Error::Browser)
    }

    async fn start(&self, request: &SessionRequest) -> Result<CdpSession> {
        let platform = request.profile.platform;
        let id = format!(
            "{}-{}",
            platform,
            self.sequence.fetch_add(1, Ordering::SeqCst) + 1
        );
        let profile = ProfileDir::temporary(platform.as_str())?;
        let config = self.build_config(request, &profile)?;

        tracing::info!("Launching Chrome for {} ({})", platform, id);
        let (browser, mut handler) = Browser::launch(config).await?;

        // The handler must be polled for any command to complete.
        let handler_task = tokio::spawn(async move {
            while let Some(event) = handler.next().await {
                if let Err(e) = event {
                    tracing::debug!("CDP handler event error (continuing): {}", e);
                }
            }
        });

        let page = match Self::prepare_page(&browser, request).await {
            Ok(page) => page,
            Err(e) => {
                handler_task.abort();
                return Err(e);
            }
        };

        tracing::debug!(
            "Chrome session {} ready at {} with user agent '{}'",
            id,
            request.resolution,
            request.profile.user_agent
        );

        Ok(CdpSession::new(id, browser, page, handler_task, profile))
    }

    async fn prepare_page(browser: &Browser, request: &SessionRequest) -> Result<Page> {
        let page = browser.new_page("about:blank").await?;
        page.execute(SetUserAgentOverrideParams::new(request.profile.user_agent.clone()))
            .await?;
        CdpSession::apply_viewport(&page, request.resolution.width, request.resolution.height).await?;
        Ok(page)
    }
}

#[async_trait]
impl SessionLauncher for ChromeLauncher {
    async fn launch(&self, request: &SessionRequest) -> tvqa_core::Result<Box<dyn BrowserSession>> {
        let session = self.start(request).await?;
        Ok(Box::new(session))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use tvqa_core::platform::{Platform, PlatformProfile};
    use tvqa_core::resolution::ResolutionSpec;

    fn request(platform: Platform, headless: bool) -> SessionRequest {
        SessionRequest {
            profile: Arc::new(PlatformProfile::new(platform, "https://tv.example.com/")),
            resolution: ResolutionSpec::new(1920, 1080, "1080p"),
            headless,
        }
    }

    #[test]
    fn test_args_carry_platform_user_agent() {
        let req = request(Platform::Lg, true);
        let args = ChromeLauncher::build_args(&req);

        assert!(args.contains(&"--no-first-run".to_string()));
        assert!(args.contains(&"--disable-dev-shm-usage".to_string()));
        let ua = args.iter().find(|a| a.starts_with("--user-agent=")).unwrap();
        assert!(ua.contains("Web0S"), "{}", ua);
    }

    #[test]
    fn test_config_builds_for_headed_and_headless() {
        let launcher = ChromeLauncher::new(PathBuf::from("/usr/bin/google-chrome"));
        let profile = ProfileDir::temporary("test").unwrap();

        assert!(launcher.build_config(&request(Platform::Samsung, true), &profile).is_ok());
        assert!(launcher.build_config(&request(Platform::Samsung, false), &profile).is_ok());
    }

    #[tokio::test]
    async fn test_launch_with_missing_binary_fails() {
        let launcher = ChromeLauncher::new(PathBuf::from("/nonexistent/chrome"));
        let result = launcher.launch(&request(Platform::Philips, true)).await;
        assert!(result.is_err());
    }
}
