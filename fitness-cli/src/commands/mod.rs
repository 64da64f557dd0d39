mod config_cmd;
mod norms;
mod report;
mod score;
mod track;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use fitness_assess::{EngineConfig, NormativeTable, ScoringService};
use std::path::{Path, PathBuf};

pub use norms::NormsCommand;
pub use score::ScoreCommand;
pub use track::{TrackCommand, TrackSummary};

#[derive(Parser)]
#[command(name = "fitness-assess")]
#[command(about = "Replay pose streams and score fitness tests", long_about = None)]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Path to configuration file
    #[arg(long, global = true, env = "FITNESS_ASSESS_CONFIG")]
    config: Option<PathBuf>,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a JSON-lines pose file through the tracker
    Track(TrackCommand),

    /// Score a raw test result against the normative tables
    Score(ScoreCommand),

    /// Show normative percentile bands
    Norms(NormsCommand),

    /// Manage configuration
    #[command(subcommand)]
    Config(ConfigSubcommands),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: clap_complete::Shell,
    },
}

#[derive(Subcommand)]
enum ConfigSubcommands {
    /// Show the effective configuration
    Show,

    /// Print the config file location
    Path,

    /// Write a configuration file with defaults
    Init {
        /// Overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    pub fn verbose(&self) -> bool {
        self.verbose
    }

    pub fn execute(self) -> Result<()> {
        let config_path = self.config.as_deref();

        match self.command {
            Commands::Track(cmd) => cmd.execute(&crate::config::load(config_path)?),
            Commands::Score(cmd) => cmd.execute(&crate::config::load(config_path)?),
            Commands::Norms(cmd) => cmd.execute(),
            Commands::Config(subcmd) => match subcmd {
                ConfigSubcommands::Show => config_cmd::show_config(config_path),
                ConfigSubcommands::Path => config_cmd::show_path(config_path),
                ConfigSubcommands::Init { force } => config_cmd::init_config(config_path, force),
            },
            Commands::Completions { shell } => {
                generate_completions(shell);
                Ok(())
            }
        }
    }
}

/// Normative table from a dataset file, or the embedded one
fn load_table(dataset: Option<&Path>) -> Result<NormativeTable> {
    match dataset {
        Some(path) => NormativeTable::load(path)
            .with_context(|| format!("Failed to load normative dataset {}", path.display())),
        None => NormativeTable::embedded().context("Embedded normative dataset is invalid"),
    }
}

/// Scoring service for the configured dataset version.
///
/// An explicitly supplied dataset is trusted to carry its own version.
fn scoring_service(config: &EngineConfig, dataset: Option<&Path>) -> Result<ScoringService> {
    let table = load_table(dataset)?;
    let mut scoring = config.scoring.clone();
    if dataset.is_some() {
        scoring.normative_version = table.version().to_string();
    }
    ScoringService::with_config(table, scoring).context("Normative dataset does not match configuration")
}

fn generate_completions(shell: clap_complete::Shell) {
    use clap::CommandFactory;
    use clap_complete::generate;
    use std::io;

    let mut cmd = Cli::command();
    let name = cmd.get_name().to_string();
    generate(shell, &mut cmd, name, &mut io::stdout());
}
