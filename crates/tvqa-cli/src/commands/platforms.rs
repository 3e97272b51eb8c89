use super::config;
use anyhow::Result;
use console::style;
use std::path::Path;

/// List the configured platform profiles.
pub fn execute(config_path: Option<&Path>) -> Result<()> {
    let (config, source) = config::load(config_path)?;

    println!(
        "\n{} {}",
        style("Configured platforms").bold().cyan(),
        style(format!("({})", source.display())).dim()
    );

    for profile in config.registry.profiles() {
        println!("\n  {}", style(profile.platform).bold());
        println!("    Base URL:   {}", profile.base_url);
        println!("    User agent: {}", profile.user_agent);
        println!("    Readiness:  {}", profile.readiness.selector);
        println!("    Title:      {}", profile.expected_title);
    }

    println!("\n{}", style("Resolutions").bold().cyan());
    for res in &config.resolutions {
        println!("  {}", res);
    }
    println!();

    Ok(())
}
