use crate::platform::{Platform, PlatformProfile, PlatformRegistry, ReadinessProbe};
use crate::resolution::{self, ResolutionSpec};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Numeric limits the built-in checks compare against.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Thresholds {
    pub max_load_time_ms: u64,
    pub viewport_tolerance_px: u32,
    pub min_visible_elements: usize,
}

impl Thresholds {
    pub fn max_load_time(&self) -> Duration {
        Duration::from_millis(self.max_load_time_ms)
    }
}

impl Default for Thresholds {
    fn default() -> Self {
        Self {
            max_load_time_ms: 10_000,
            viewport_tolerance_px: 10,
            min_visible_elements: 1,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionOptions {
    pub headless: bool,
    pub acquire_timeout_ms: u64,
    pub navigation_timeout_ms: u64,
    pub readiness_timeout_ms: u64,
    pub poll_interval_ms: u64,
    /// Upper bound on a single check, including its browser round trips.
    pub check_timeout_ms: u64,
}

impl SessionOptions {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_millis(self.navigation_timeout_ms)
    }

    pub fn readiness_timeout(&self) -> Duration {
        Duration::from_millis(self.readiness_timeout_ms)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn check_timeout(&self) -> Duration {
        Duration::from_millis(self.check_timeout_ms)
    }
}

impl Default for SessionOptions {
    fn default() -> Self {
        Self {
            headless: true,
            acquire_timeout_ms: 30_000,
            navigation_timeout_ms: 30_000,
            readiness_timeout_ms: 20_000,
            poll_interval_ms: 250,
            check_timeout_ms: 60_000,
        }
    }
}

/// Platform entry as written in the config file; omitted fields take vendor defaults.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlatformEntry {
    pub platform: Platform,
    pub base_url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub readiness_selector: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub expected_title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub vendor_selector: Option<String>,
}

impl PlatformEntry {
    pub fn into_profile(self) -> PlatformProfile {
        let mut profile = PlatformProfile::new(self.platform, self.base_url);
        if let Some(user_agent) = self.user_agent {
            profile.user_agent = user_agent;
        }
        if let Some(selector) = self.readiness_selector {
            profile.readiness = ReadinessProbe { selector };
        }
        if let Some(title) = self.expected_title {
            profile.expected_title = title;
        }
        if let Some(selector) = self.vendor_selector {
            profile.vendor_selector = selector;
        }
        profile
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResolutionEntry {
    pub width: u32,
    pub height: u32,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
}

impl From<ResolutionEntry> for ResolutionSpec {
    fn from(entry: ResolutionEntry) -> Self {
        match entry.label {
            Some(label) => ResolutionSpec::new(entry.width, entry.height, label),
            None => ResolutionSpec::sized(entry.width, entry.height),
        }
    }
}

fn default_artifacts_dir() -> PathBuf {
    PathBuf::from("artifacts")
}

fn default_max_workers() -> usize {
    2
}

/// On-disk configuration layout.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConfigFile {
    pub platforms: Vec<PlatformEntry>,
    #[serde(default)]
    pub resolutions: Option<Vec<ResolutionEntry>>,
    #[serde(default)]
    pub thresholds: Thresholds,
    #[serde(default)]
    pub session: SessionOptions,
    #[serde(default = "default_artifacts_dir")]
    pub artifacts_dir: PathBuf,
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,
}

/// Validated configuration consumed by the orchestrator.
#[derive(Debug, Clone)]
pub struct HarnessConfig {
    pub registry: PlatformRegistry,
    pub resolutions: Vec<ResolutionSpec>,
    pub thresholds: Thresholds,
    pub session: SessionOptions,
    pub artifacts_dir: PathBuf,
    pub max_workers: usize,
}

impl HarnessConfig {
    /// Configuration with every default except the platform profiles.
    pub fn new(registry: PlatformRegistry) -> Self {
        Self {
            registry,
            resolutions: resolution::default_matrix(),
            thresholds: Thresholds::default(),
            session: SessionOptions::default(),
            artifacts_dir: default_artifacts_dir(),
            max_workers: default_max_workers(),
        }
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        tracing::debug!("Reading harness configuration from: {}", path.display());

        let file = File::open(path)?;
        let raw: ConfigFile = serde_json::from_reader(BufReader::new(file))?;
        let config = Self::from_raw(raw)?;

        tracing::info!(
            "Loaded configuration with {} platform(s) and {} resolution(s)",
            config.registry.platforms().len(),
            config.resolutions.len()
        );

        Ok(config)
    }

    pub fn from_json(content: &str) -> Result<Self> {
        let raw: ConfigFile = serde_json::from_str(content)?;
        Self::from_raw(raw)
    }

    pub fn from_raw(raw: ConfigFile) -> Result<Self> {
        let registry =
            PlatformRegistry::new(raw.platforms.into_iter().map(PlatformEntry::into_profile))?;

        let resolutions = match raw.resolutions {
            Some(entries) => entries.into_iter().map(ResolutionSpec::from).collect(),
            None => resolution::default_matrix(),
        };

        let config = Self {
            registry,
            resolutions,
            thresholds: raw.thresholds,
            session: raw.session,
            artifacts_dir: raw.artifacts_dir,
            max_workers: raw.max_workers,
        };
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.registry.is_empty() {
            return Err(Error::Config("No platforms configured".to_string()));
        }

        let mut labels = HashSet::new();
        for res in &self.resolutions {
            if res.width == 0 || res.height == 0 {
                return Err(Error::Config(format!(
                    "Resolution '{}' must have non-zero width and height",
                    res.label
                )));
            }
            if !labels.insert(res.label.as_str()) {
                return Err(Error::Config(format!(
                    "Resolution label '{}' is used more than once",
                    res.label
                )));
            }
        }

        if self.max_workers == 0 {
            return Err(Error::Config("max_workers must be at least 1".to_string()));
        }

        let durations = [
            ("acquire_timeout_ms", self.session.acquire_timeout_ms),
            ("navigation_timeout_ms", self.session.navigation_timeout_ms),
            ("readiness_timeout_ms", self.session.readiness_timeout_ms),
            ("poll_interval_ms", self.session.poll_interval_ms),
            ("check_timeout_ms", self.session.check_timeout_ms),
        ];
        for (name, value) in durations {
            if value == 0 {
                return Err(Error::Config(format!("{} must be at least 1", name)));
            }
        }

        Ok(())
    }

    pub fn screenshots_dir(&self) -> PathBuf {
        self.artifacts_dir.join("screenshots")
    }

    pub fn reports_dir(&self) -> PathBuf {
        self.artifacts_dir.join("reports")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.artifacts_dir.join("logs")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_minimal_config_uses_defaults() {
        let config = HarnessConfig::from_json(
            r#"{ "platforms": [ { "platform": "samsung", "base_url": "https://tv.example.com/samsung/" } ] }"#,
        )
        .unwrap();

        assert_eq!(config.registry.platforms(), vec![Platform::Samsung]);
        assert_eq!(config.resolutions.len(), 3);
        assert_eq!(config.thresholds.max_load_time_ms, 10_000);
        assert!(config.session.headless);
        assert_eq!(config.artifacts_dir, PathBuf::from("artifacts"));
        assert_eq!(config.max_workers, 2);
    }

    #[test]
    fn test_overrides_are_applied() {
        let config = HarnessConfig::from_json(
            r##"{
                "platforms": [ {
                    "platform": "lg",
                    "base_url": "https://tv.example.com/lg/",
                    "user_agent": "Custom UA",
                    "readiness_selector": "#root"
                } ],
                "resolutions": [ { "width": 1280, "height": 720 } ],
                "thresholds": { "max_load_time_ms": 5000 },
                "session": { "headless": false }
            }"##,
        )
        .unwrap();

        let profile = config.registry.get(Platform::Lg).unwrap();
        assert_eq!(profile.user_agent, "Custom UA");
        assert_eq!(profile.readiness.selector, "#root");
        assert_eq!(config.resolutions[0].label, "1280x720");
        assert_eq!(config.thresholds.max_load_time_ms, 5000);
        assert_eq!(config.thresholds.viewport_tolerance_px, 10);
        assert!(!config.session.headless);
        assert_eq!(config.session.readiness_timeout_ms, 20_000);
        assert_eq!(config.session.check_timeout_ms, 60_000);
    }

    #[test]
    fn test_rejects_duplicate_resolution_labels() {
        let result = HarnessConfig::from_json(
            r#"{
                "platforms": [ { "platform": "lg", "base_url": "https://tv.example.com/lg/" } ],
                "resolutions": [
                    { "width": 1280, "height": 720, "label": "hd" },
                    { "width": 1366, "height": 768, "label": "hd" }
                ]
            }"#,
        );
        assert!(result.unwrap_err().to_string().contains("more than once"));
    }

    #[test]
    fn test_rejects_empty_platforms_and_zero_workers() {
        assert!(HarnessConfig::from_json(r#"{ "platforms": [] }"#).is_err());

        let result = HarnessConfig::from_json(
            r#"{
                "platforms": [ { "platform": "lg", "base_url": "https://tv.example.com/lg/" } ],
                "max_workers": 0
            }"#,
        );
        assert!(result.is_err());
    }

    #[test]
    fn test_rejects_zero_timeouts() {
        for field in [
            "acquire_timeout_ms",
            "navigation_timeout_ms",
            "readiness_timeout_ms",
            "poll_interval_ms",
            "check_timeout_ms",
        ] {
            let json = format!(
                r#"{{
                    "platforms": [ {{ "platform": "lg", "base_url": "https://tv.example.com/lg/" }} ],
                    "session": {{ "{}": 0 }}
                }}"#,
                field
            );
            let err = HarnessConfig::from_json(&json).unwrap_err();
            assert!(matches!(err, Error::Config(_)), "{}: {}", field, err);
            assert!(err.to_string().contains(field), "{}", err);
        }
    }

    #[test]
    fn test_missing_base_url_is_rejected() {
        let result = HarnessConfig::from_json(r#"{ "platforms": [ { "platform": "philips" } ] }"#);
        assert!(matches!(result, Err(Error::Json(_))));
    }
}
