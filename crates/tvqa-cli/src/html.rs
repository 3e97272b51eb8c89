//! Static HTML rendering of a run report.

use anyhow::Result;
use std::fmt::Write as _;
use std::path::{Path, PathBuf};
use tvqa_core::report::{PlatformOutcome, RunReport, RunStatus};
use tvqa_core::result::{Artifact, ArtifactKind};

const STYLE: &str = "body{font-family:sans-serif;margin:2em;color:#222}\
table{border-collapse:collapse;margin-bottom:2em}\
th,td{border:1px solid #ccc;padding:4px 8px;text-align:left}\
th{background:#f0f0f0}\
.pass{color:#1a7f37}.fail{color:#cf222e}.error{color:#bf3989}.skip{color:#9a6700}";

pub fn escape(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}

fn artifact_label(artifact: &Artifact) -> &'static str {
    match artifact.kind {
        ArtifactKind::Screenshot => "screenshot",
        ArtifactKind::Log => "log",
    }
}

/// Link to an artifact relative to the report, when both live under the same
/// artifacts directory.
fn artifact_href(artifact: &Artifact, reports_dir: &Path) -> String {
    let relative = reports_dir
        .parent()
        .and_then(|base| artifact.path.strip_prefix(base).ok())
        .map(|rel| Path::new("..").join(rel));
    let href = relative.unwrap_or_else(|| artifact.path.clone());
    escape(&href.to_string_lossy().replace('\\', "/"))
}

pub fn render(report: &RunReport, reports_dir: &Path) -> String {
    let mut html = String::new();
    let status = match report.status {
        RunStatus::Passed => "PASSED",
        RunStatus::Failed => "FAILED",
    };

    let _ = write!(
        html,
        "<!DOCTYPE html>\n<html><head><meta charset=\"utf-8\"><title>tvqa report</title><style>{}</style></head><body>\n",
        STYLE
    );
    let _ = writeln!(html, "<h1>Smart TV regression report: {}</h1>", status);
    let _ = writeln!(
        html,
        "<p>Started {} &middot; generated {}</p>",
        escape(&report.started_at.to_rfc3339()),
        escape(&report.generated_at.to_rfc3339())
    );

    html.push_str("<h2>Platforms</h2>\n<table><tr><th>Platform</th><th>Outcome</th><th>Total</th><th>Passed</th><th>Failed</th><th>Errors</th><th>Skipped</th></tr>\n");
    for summary in &report.platforms {
        let outcome = match &summary.outcome {
            PlatformOutcome::Completed => "completed".to_string(),
            PlatformOutcome::FailedFatal { reason } => format!("failed: {}", reason),
        };
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td><td>{}</td></tr>",
            summary.platform,
            escape(&outcome),
            summary.total,
            summary.passed,
            summary.failed,
            summary.errors,
            summary.skipped
        );
    }
    html.push_str("</table>\n");

    html.push_str("<h2>Results</h2>\n<table><tr><th>Platform</th><th>Resolution</th><th>Check</th><th>Status</th><th>Message</th><th>Duration</th><th>Artifact</th></tr>\n");
    for result in &report.results {
        let artifact = report
            .artifact_for(result)
            .map(|a| format!("<a href=\"{}\">{}</a>", artifact_href(a, reports_dir), artifact_label(a)))
            .unwrap_or_default();
        let _ = writeln!(
            html,
            "<tr><td>{}</td><td>{}</td><td>{}</td><td class=\"{}\">{}</td><td>{}</td><td>{} ms</td><td>{}</td></tr>",
            result.key.platform,
            escape(&result.key.resolution),
            escape(&result.key.check),
            result.status.as_str(),
            result.status,
            escape(&result.message),
            result.duration_ms,
            artifact
        );
    }
    html.push_str("</table>\n</body></html>\n");

    html
}

/// Render to `<dir>/<stem>.html`.
pub fn write(report: &RunReport, dir: &Path, stem: &str) -> Result<PathBuf> {
    std::fs::create_dir_all(dir)?;
    let path = dir.join(format!("{}.html", stem));
    std::fs::write(&path, render(report, dir))?;
    tracing::info!("Wrote HTML report to {}", path.display());
    Ok(path)
}
