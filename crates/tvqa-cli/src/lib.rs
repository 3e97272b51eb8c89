use clap::ValueEnum;
use tvqa_core::platform::{Platform, PlatformRegistry};

pub mod commands;
pub mod html;

/// Platform names accepted by `--platforms`.
#[derive(Copy, Clone, Debug, Eq, PartialEq, ValueEnum)]
pub enum PlatformChoice {
    Samsung,
    Lg,
    Philips,
    All,
}

impl PlatformChoice {
    /// Expand a selection; `all` (or nothing) means every configured platform.
    pub fn resolve(choices: &[PlatformChoice], registry: &PlatformRegistry) -> Vec<Platform> {
        if choices.is_empty() || choices.contains(&PlatformChoice::All) {
            return registry.platforms();
        }

        let mut platforms: Vec<Platform> = choices
            .iter()
            .filter_map(|c| match c {
                PlatformChoice::Samsung => Some(Platform::Samsung),
                PlatformChoice::Lg => Some(Platform::Lg),
                PlatformChoice::Philips => Some(Platform::Philips),
                PlatformChoice::All => None,
            })
            .collect();
        platforms.sort();
        platforms.dedup();
        platforms
    }
}
