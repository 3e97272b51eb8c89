use super::config;
use crate::{PlatformChoice, html};
use anyhow::{Context, Result};
use console::style;
use std::path::{Path, PathBuf};
use std::process::ExitCode;
use std::sync::Arc;
use tvqa_browser::{ChromeFinder, ChromeLauncher};
use tvqa_core::config::HarnessConfig;
use tvqa_core::orchestrator::{ExecutionMode, Orchestrator};
use tvqa_core::platform::Platform;
use tvqa_core::report::{PlatformOutcome, ReportWriter, RunReport, RunStatus};

pub struct RunOptions {
    pub platforms: Vec<PlatformChoice>,
    pub parallel: bool,
    pub no_html: bool,
    pub quiet: bool,
    pub config: Option<PathBuf>,
    pub chrome_path: Option<PathBuf>,
    pub headed: bool,
    pub artifacts_dir: Option<PathBuf>,
    pub max_workers: Option<usize>,
}

/// Command-line flags take precedence over the config file.
fn apply_overrides(config: &mut HarnessConfig, options: &RunOptions) -> Result<()> {
    if options.headed {
        config.session.headless = false;
    }
    if let Some(dir) = &options.artifacts_dir {
        config.artifacts_dir = dir.clone();
    }
    if let Some(workers) = options.max_workers {
        config.max_workers = workers;
    }
    config.validate()?;
    Ok(())
}

pub fn execute(options: RunOptions) -> Result<ExitCode> {
    let (mut config, source) = config::load(options.config.as_deref())?;
    apply_overrides(&mut config, &options)?;
    tracing::debug!("Using configuration from {}", source.display());

    let selection = PlatformChoice::resolve(&options.platforms, &config.registry);
    config.registry.select(&selection)?;

    let chrome = ChromeFinder::new(options.chrome_path.clone()).find()?;
    tracing::info!("Found Chrome at: {}", chrome.display());

    let mode = if options.parallel {
        ExecutionMode::Parallel {
            max_workers: config.max_workers,
        }
    } else {
        ExecutionMode::Sequential
    };

    let reports_dir = config.reports_dir();
    let orchestrator = Orchestrator::new(config, Arc::new(ChromeLauncher::new(chrome)));

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;
    let report = runtime.block_on(orchestrator.run(&selection, mode))?;

    let stem = ReportWriter::unique_stem(&reports_dir, &selection, report.started_at);
    let json_path = ReportWriter::to_dir(&report, &reports_dir, &stem)
        .with_context(|| format!("Failed to write report to {}", reports_dir.display()))?;
    let html_path = if options.no_html {
        None
    } else {
        Some(html::write(&report, &reports_dir, &stem)?)
    };

    print_summary(&report, &selection, &json_path, html_path.as_deref(), options.quiet);

    Ok(ExitCode::from(report.exit_code() as u8))
}

fn print_summary(
    report: &RunReport,
    selection: &[Platform],
    json_path: &Path,
    html_path: Option<&Path>,
    quiet: bool,
) {
    let names: Vec<_> = selection.iter().map(|p| p.as_str()).collect();
    println!(
        "\n{} {}",
        style("Smart TV Regression Run").bold().cyan(),
        style(format!("({})", names.join(", "))).dim()
    );
    println!("{}", style("=======================").cyan());

    for summary in &report.platforms {
        let headline = match &summary.outcome {
            PlatformOutcome::Completed => format!(
                "{} passed, {} failed, {} errors, {} skipped",
                summary.passed, summary.failed, summary.errors, summary.skipped
            ),
            PlatformOutcome::FailedFatal { reason } => format!("session failed: {}", reason),
        };
        println!("  {:<10} {}", style(summary.platform).bold(), headline);
    }

    if !quiet {
        let failing: Vec<_> = report.results.iter().filter(|r| r.status.is_failure()).collect();
        if !failing.is_empty() {
            println!("\n{}", style("Failures:").bold());
            for result in failing {
                println!(
                    "  {} {} {}",
                    style(result.status).red(),
                    result.key,
                    style(&result.message).dim()
                );
                if let Some(artifact) = report.artifact_for(result) {
                    println!("      {}", artifact.path.display());
                }
            }
        }
    }

    println!("\n  JSON report: {}", json_path.display());
    if let Some(path) = html_path {
        println!("  HTML report: {}", path.display());
    }

    let verdict = match report.status {
        RunStatus::Passed => style("PASSED").green().bold(),
        RunStatus::Failed => style("FAILED").red().bold(),
    };
    println!("\n{}\n", verdict);
}
