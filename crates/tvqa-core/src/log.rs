//! Per-platform log stream.
//!
//! Each platform worker owns one [`PlatformLog`]. Every entry is emitted as a
//! `tracing` event and kept in memory so the worker can write it out as
//! `logs/<platform>_<run timestamp>.log` once the platform finishes.

use crate::platform::Platform;
use crate::Result;
use chrono::{DateTime, Utc};
use std::fmt;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Warning,
    Error,
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            LogLevel::Info => "INFO",
            LogLevel::Warning => "WARNING",
            LogLevel::Error => "ERROR",
        })
    }
}

#[derive(Debug, Clone)]
pub struct LogEntry {
    pub at: DateTime<Utc>,
    pub level: LogLevel,
    /// Test identity, e.g. `samsung::1080p::page-load`.
    pub identity: String,
    pub message: String,
}

impl fmt::Display for LogEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} [{}] [{}] {}",
            self.at.to_rfc3339(),
            self.level,
            self.identity,
            self.message
        )
    }
}

pub struct PlatformLog {
    platform: Platform,
    entries: Vec<LogEntry>,
}

impl PlatformLog {
    pub fn new(platform: Platform) -> Self {
        Self {
            platform,
            entries: Vec::new(),
        }
    }

    pub fn platform(&self) -> Platform {
        self.platform
    }

    pub fn entries(&self) -> &[LogEntry] {
        &self.entries
    }

    pub fn info(&mut self, identity: impl fmt::Display, message: impl Into<String>) {
        self.record(LogLevel::Info, identity, message.into());
    }

    pub fn warning(&mut self, identity: impl fmt::Display, message: impl Into<String>) {
        self.record(LogLevel::Warning, identity, message.into());
    }

    pub fn error(&mut self, identity: impl fmt::Display, message: impl Into<String>) {
        self.record(LogLevel::Error, identity, message.into());
    }

    fn record(&mut self, level: LogLevel, identity: impl fmt::Display, message: String) {
        let identity = identity.to_string();
        match level {
            LogLevel::Info => tracing::info!(test = %identity, "{}", message),
            LogLevel::Warning => tracing::warn!(test = %identity, "{}", message),
            LogLevel::Error => tracing::error!(test = %identity, "{}", message),
        }
        self.entries.push(LogEntry {
            at: Utc::now(),
            level,
            identity,
            message,
        });
    }

    pub fn render(&self) -> String {
        let mut out = String::new();
        for entry in &self.entries {
            out.push_str(&entry.to_string());
            out.push('\n');
        }
        out
    }

    /// Write the stream to `<dir>/<platform>_<stamp>.log`.
    pub async fn write_to(&self, dir: &Path, stamp: &str) -> Result<PathBuf> {
        tokio::fs::create_dir_all(dir).await?;
        let path = dir.join(format!("{}_{}.log", self.platform, stamp));
        tokio::fs::write(&path, self.render()).await?;
        tracing::debug!("Wrote {} log entries to {}", self.entries.len(), path.display());
        Ok(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_entries_are_tagged_with_identity() {
        let mut log = PlatformLog::new(Platform::Lg);
        log.info("lg::1080p::page-load", "Page loaded");
        log.error("lg::720p::readiness", "Timed out");

        let rendered = log.render();
        let lines: Vec<_> = rendered.lines().collect();
        assert_eq!(lines.len(), 2);
        assert!(lines[0].ends_with("[INFO] [lg::1080p::page-load] Page loaded"));
        assert!(lines[1].ends_with("[ERROR] [lg::720p::readiness] Timed out"));
    }

    #[tokio::test]
    async fn test_write_to_creates_platform_file() {
        let dir = tempfile::tempdir().unwrap();
        let mut log = PlatformLog::new(Platform::Philips);
        log.warning("philips", "Vendor elements missing");

        let path = log.write_to(dir.path(), "20261019_120000").await.unwrap();
        assert!(path.ends_with("philips_20261019_120000.log"));
        let content = std::fs::read_to_string(path).unwrap();
        assert!(content.contains("[WARNING] [philips] Vendor elements missing"));
    }
}
