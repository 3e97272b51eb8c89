use super::RunReport;
use crate::Result;
use crate::platform::Platform;
use chrono::{DateTime, Utc};
use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

/// Timestamp format shared by report, log and screenshot file names.
pub const RUN_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

pub struct ReportWriter;

impl ReportWriter {
    /// `report_<platforms>_<YYYYmmdd_HHMMSS>`, platforms joined with `-`.
    pub fn report_stem(platforms: &[Platform], at: DateTime<Utc>) -> String {
        let names = if platforms.is_empty() {
            "none".to_string()
        } else {
            platforms
                .iter()
                .map(|p| p.as_str())
                .collect::<Vec<_>>()
                .join("-")
        };
        format!("report_{}_{}", names, at.format(RUN_STAMP_FORMAT))
    }

    /// Like [`report_stem`](Self::report_stem), with a `-<n>` suffix when a
    /// report with that stem already exists in `dir`.
    pub fn unique_stem(dir: &Path, platforms: &[Platform], at: DateTime<Utc>) -> String {
        let base = Self::report_stem(platforms, at);
        let taken = |stem: &str| {
            dir.join(format!("{}.json", stem)).exists() || dir.join(format!("{}.html", stem)).exists()
        };
        if !taken(&base) {
            return base;
        }
        (2..)
            .map(|n| format!("{}-{}", base, n))
            .find(|stem| !taken(stem))
            .unwrap_or(base)
    }

    /// Write a report as pretty JSON to `<dir>/<stem>.json`.
    pub fn to_dir(report: &RunReport, dir: &Path, stem: &str) -> Result<PathBuf> {
        std::fs::create_dir_all(dir)?;
        let path = dir.join(format!("{}.json", stem));
        Self::to_file(report, &path)?;
        Ok(path)
    }

    pub fn to_file(report: &RunReport, path: &Path) -> Result<()> {
        tracing::debug!("Writing run report to: {}", path.display());

        let file = File::create(path)?;
        let writer = BufWriter::new(file);
        serde_json::to_writer_pretty(writer, report)?;

        tracing::info!(
            "Wrote run report with {} results to {}",
            report.results.len(),
            path.display()
        );

        Ok(())
    }

    pub fn to_string(report: &RunReport) -> Result<String> {
        Ok(serde_json::to_string_pretty(report)?)
    }
}
