use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Selector shared by every vendor build that marks the app shell as mounted.
pub const DEFAULT_READINESS_SELECTOR: &str = ".app-container, #app, .tv-app";

/// Title fragment every vendor build shows once loaded.
pub const DEFAULT_EXPECTED_TITLE: &str = "TV 2 Play";

/// Smart TV browser targets.
///
/// Variant order is the report ordering: samsung, lg, philips.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    Samsung,
    Lg,
    Philips,
}

impl Platform {
    pub const ALL: [Platform; 3] = [Platform::Samsung, Platform::Lg, Platform::Philips];

    pub fn as_str(&self) -> &'static str {
        match self {
            Platform::Samsung => "samsung",
            Platform::Lg => "lg",
            Platform::Philips => "philips",
        }
    }

    /// User agent the vendor's TV browser identifies itself with.
    pub fn default_user_agent(&self) -> &'static str {
        match self {
            Platform::Samsung => {
                "Mozilla/5.0 (SMART-TV; SAMSUNG; Tizen) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
            }
            Platform::Lg => {
                "Mozilla/5.0 (Web0S; Linux/SmartTV) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
            }
            Platform::Philips => {
                "Mozilla/5.0 (SMART-TV; PHILIPS-OS) AppleWebKit/537.36 (KHTML, like Gecko) Chrome/91.0.4472.124 Safari/537.36"
            }
        }
    }

    pub fn default_vendor_selector(&self) -> String {
        let name = self.as_str();
        format!("[data-platform='{name}'], .{name}-feature, .{name}-specific")
    }
}

impl fmt::Display for Platform {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Platform {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "samsung" => Ok(Platform::Samsung),
            "lg" => Ok(Platform::Lg),
            "philips" => Ok(Platform::Philips),
            other => Err(Error::Config(format!(
                "Unknown platform '{}'. Expected one of: samsung, lg, philips",
                other
            ))),
        }
    }
}

/// Condition meaning "the app finished loading".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ReadinessProbe {
    pub selector: String,
}

impl Default for ReadinessProbe {
    fn default() -> Self {
        Self {
            selector: DEFAULT_READINESS_SELECTOR.to_string(),
        }
    }
}

/// Static description of one Smart TV browser target.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformProfile {
    pub platform: Platform,
    pub base_url: String,
    pub user_agent: String,
    pub readiness: ReadinessProbe,
    pub expected_title: String,
    pub vendor_selector: String,
}

impl PlatformProfile {
    /// Profile with the vendor defaults; the base URL always comes from configuration.
    pub fn new(platform: Platform, base_url: impl Into<String>) -> Self {
        Self {
            platform,
            base_url: base_url.into(),
            user_agent: platform.default_user_agent().to_string(),
            readiness: ReadinessProbe::default(),
            expected_title: DEFAULT_EXPECTED_TITLE.to_string(),
            vendor_selector: platform.default_vendor_selector(),
        }
    }

    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.base_url).map_err(|e| {
            Error::Config(format!(
                "Invalid base URL for {}: '{}' ({})",
                self.platform, self.base_url, e
            ))
        })?;

        if url.scheme() != "http" && url.scheme() != "https" {
            return Err(Error::Config(format!(
                "Base URL for {} must use http or https: {}",
                self.platform, self.base_url
            )));
        }

        if self.user_agent.trim().is_empty() {
            return Err(Error::Config(format!(
                "User agent for {} must not be empty",
                self.platform
            )));
        }

        if self.readiness.selector.trim().is_empty() {
            return Err(Error::Config(format!(
                "Readiness selector for {} must not be empty",
                self.platform
            )));
        }

        Ok(())
    }
}

/// Read-only lookup of configured profiles, shared by all workers.
#[derive(Debug, Clone, Default)]
pub struct PlatformRegistry {
    profiles: BTreeMap<Platform, Arc<PlatformProfile>>,
}

impl PlatformRegistry {
    pub fn new(profiles: impl IntoIterator<Item = PlatformProfile>) -> Result<Self> {
        let mut map = BTreeMap::new();
        for profile in profiles {
            profile.validate()?;
            let platform = profile.platform;
            if map.insert(platform, Arc::new(profile)).is_some() {
                return Err(Error::Config(format!(
                    "Platform {} is configured more than once",
                    platform
                )));
            }
        }
        Ok(Self { profiles: map })
    }

    pub fn get(&self, platform: Platform) -> Option<&Arc<PlatformProfile>> {
        self.profiles.get(&platform)
    }

    /// Configured platforms in report order.
    pub fn platforms(&self) -> Vec<Platform> {
        self.profiles.keys().copied().collect()
    }

    pub fn profiles(&self) -> impl Iterator<Item = &Arc<PlatformProfile>> {
        self.profiles.values()
    }

    /// Resolve a selection to profiles, deduplicated and in report order.
    pub fn select(&self, selection: &[Platform]) -> Result<Vec<Arc<PlatformProfile>>> {
        let mut wanted: Vec<Platform> = selection.to_vec();
        wanted.sort();
        wanted.dedup();

        wanted
            .into_iter()
            .map(|platform| {
                self.get(platform).cloned().ok_or_else(|| {
                    Error::Config(format!("Platform {} has no configured profile", platform))
                })
            })
            .collect()
    }

    pub fn is_empty(&self) -> bool {
        self.profiles.is_empty()
    }
}
