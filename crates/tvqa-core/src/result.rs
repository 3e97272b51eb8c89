use crate::platform::Platform;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;

/// Check name used for the per-resolution readiness gate.
pub const READINESS_CHECK: &str = "readiness";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CheckStatus {
    Pass,
    Fail,
    Error,
    Skip,
}

impl CheckStatus {
    /// Fail and error results need an artifact and make the run exit non-zero.
    pub fn is_failure(&self) -> bool {
        matches!(self, CheckStatus::Fail | CheckStatus::Error)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            CheckStatus::Pass => "pass",
            CheckStatus::Fail => "fail",
            CheckStatus::Error => "error",
            CheckStatus::Skip => "skip",
        }
    }
}

impl fmt::Display for CheckStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Identity of one check at one resolution on one platform.
///
/// Orders by platform, then matrix position, then check position, which is
/// the order results appear in the report.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct ResultKey {
    pub platform: Platform,
    pub resolution_index: usize,
    pub check_index: usize,
    pub resolution: String,
    pub check: String,
}

impl ResultKey {
    pub fn new(
        platform: Platform,
        resolution_index: usize,
        resolution: impl Into<String>,
        check_index: usize,
        check: impl Into<String>,
    ) -> Self {
        Self {
            platform,
            resolution_index,
            check_index,
            resolution: resolution.into(),
            check: check.into(),
        }
    }
}

impl fmt::Display for ResultKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}::{}::{}", self.platform, self.resolution, self.check)
    }
}

/// Outcome of one named check; immutable once recorded.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CheckResult {
    #[serde(flatten)]
    pub key: ResultKey,
    pub status: CheckStatus,
    pub message: String,
    pub duration_ms: u64,
}

impl CheckResult {
    pub fn new(key: ResultKey, status: CheckStatus, message: impl Into<String>, duration: Duration) -> Self {
        Self {
            key,
            status,
            message: message.into(),
            duration_ms: duration.as_millis() as u64,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ArtifactKind {
    Screenshot,
    Log,
}

/// Diagnostic file captured for a failing result.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Artifact {
    pub kind: ArtifactKind,
    pub path: PathBuf,
    pub result: ResultKey,
    pub captured_at: DateTime<Utc>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_orders_by_declaration_not_name() {
        let readiness = ResultKey::new(Platform::Lg, 0, "1080p", 0, READINESS_CHECK);
        let page_load = ResultKey::new(Platform::Lg, 0, "1080p", 1, "page-load");
        let later_res = ResultKey::new(Platform::Lg, 1, "2160p", 0, READINESS_CHECK);
        let samsung = ResultKey::new(Platform::Samsung, 2, "720p", 6, "vendor-specific");

        let mut keys = vec![later_res.clone(), page_load.clone(), samsung.clone(), readiness.clone()];
        keys.sort();
        assert_eq!(keys, vec![samsung, readiness, page_load, later_res]);
    }

    #[test]
    fn test_result_serializes_flat() {
        let result = CheckResult::new(
            ResultKey::new(Platform::Philips, 0, "720p", 5, "performance"),
            CheckStatus::Fail,
            "too slow",
            Duration::from_millis(1500),
        );
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["platform"], "philips");
        assert_eq!(json["check"], "performance");
        assert_eq!(json["status"], "fail");
        assert_eq!(json["duration_ms"], 1500);
    }

    #[test]
    fn test_failure_statuses() {
        assert!(CheckStatus::Fail.is_failure());
        assert!(CheckStatus::Error.is_failure());
        assert!(!CheckStatus::Pass.is_failure());
        assert!(!CheckStatus::Skip.is_failure());
    }
}
