use anyhow::Result;
use clap::{CommandFactory, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;
use std::process::ExitCode;
use tvqa_cli::PlatformChoice;
use tvqa_cli::commands;

#[derive(Parser)]
#[command(name = "tvqa")]
#[command(author, version, long_about = None)]
#[command(
    about = "Regression harness for Smart TV web apps",
    long_about = "tvqa drives a Chrome session per Smart TV platform (Samsung Tizen, LG webOS, \
                  Philips) across a matrix of resolutions, runs page-load, UI, layout, navigation, \
                  performance and vendor checks, and writes a JSON/HTML report with screenshots \
                  of every failure."
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Only log warnings and errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,

    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Run the regression checks
    Run {
        /// Platforms to test
        #[arg(short = 'p', long, value_enum, num_args = 1.., default_value = "all")]
        platforms: Vec<PlatformChoice>,

        /// Run platforms concurrently on a bounded worker pool
        #[arg(long)]
        parallel: bool,

        /// Skip the HTML report
        #[arg(long)]
        no_html: bool,

        /// Path to the JSON configuration file
        #[arg(short, long, env = "TVQA_CONFIG", value_name = "FILE")]
        config: Option<PathBuf>,

        /// Path to the Chrome binary (auto-detected if not specified)
        #[arg(long, value_name = "FILE")]
        chrome_path: Option<PathBuf>,

        /// Show the browser window instead of running headless
        #[arg(long)]
        headed: bool,

        /// Directory for screenshots, logs and reports
        #[arg(long, value_name = "DIR")]
        artifacts_dir: Option<PathBuf>,

        /// Upper bound on concurrent platform workers with --parallel
        #[arg(long, value_name = "N")]
        max_workers: Option<usize>,
    },

    /// List configured platforms and resolutions
    Platforms {
        /// Path to the JSON configuration file
        #[arg(short, long, env = "TVQA_CONFIG", value_name = "FILE")]
        config: Option<PathBuf>,
    },

    /// Generate shell completion scripts
    #[command(after_help = "SUPPORTED SHELLS:\n  \
        bash, zsh, fish, powershell, elvish\n\n\
        INSTALLATION:\n  \
        bash: tvqa completion bash >> ~/.bashrc\n  \
        zsh:  tvqa completion zsh > ~/.zfunc/_tvqa\n  \
        fish: tvqa completion fish > ~/.config/fish/completions/tvqa.fish")]
    Completion {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

fn main() -> Result<ExitCode> {
    let cli = Cli::parse();

    init_logging(cli.quiet, cli.verbose);

    match cli.command {
        Commands::Run {
            platforms,
            parallel,
            no_html,
            config,
            chrome_path,
            headed,
            artifacts_dir,
            max_workers,
        } => commands::run::execute(commands::run::RunOptions {
            platforms,
            parallel,
            no_html,
            quiet: cli.quiet,
            config,
            chrome_path,
            headed,
            artifacts_dir,
            max_workers,
        }),
        Commands::Platforms { config } => {
            commands::platforms::execute(config.as_deref())?;
            Ok(ExitCode::SUCCESS)
        }
        Commands::Completion { shell } => {
            let mut cmd = Cli::command();
            commands::completion::execute(shell, &mut cmd, &mut std::io::stdout())?;
            Ok(ExitCode::SUCCESS)
        }
    }
}

fn init_logging(quiet: bool, verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let default = if verbose {
        "tvqa=debug,tvqa_cli=debug,tvqa_core=debug,tvqa_browser=debug"
    } else if quiet {
        "warn"
    } else {
        "tvqa=info,tvqa_cli=info,tvqa_core=info,tvqa_browser=info"
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}
