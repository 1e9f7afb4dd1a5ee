//! `peerrank` command line.
//!
//! Loads a competition snapshot and an optional ranking configuration, then
//! ranks, explains or validates. Logs go to stderr, results to stdout.

mod output;

use std::path::{Path, PathBuf};
use std::process::ExitCode;

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand, ValueEnum};
use peerrank_core::{
    explain, rank_competition, rank_competition_dimensions, Competition, CompetitionRanking,
    DimensionRanking, RankingConfig,
};
use tracing::debug;
use tracing_subscriber::EnvFilter;

const EXIT_FAILURE: u8 = 1;
const EXIT_INPUT: u8 = 2;

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
enum Format {
    Text,
    Json,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Rank every dimension in a snapshot, or only the selected ones
    Rank {
        /// Snapshot file (YAML, or JSON with a .json extension)
        snapshot: PathBuf,

        /// Dimension to rank; repeat for several
        #[arg(short, long = "dimension")]
        dimensions: Vec<String>,

        #[arg(short, long, value_enum, default_value_t = Format::Text)]
        format: Format,
    },
    /// Explain how one entry was placed in one dimension
    Explain {
        snapshot: PathBuf,

        #[arg(short, long)]
        dimension: String,

        #[arg(short, long)]
        entry: String,
    },
    /// Check a snapshot and the configuration without ranking
    Validate { snapshot: PathBuf },
}

#[derive(Parser, Debug)]
#[command(name = "peerrank")]
#[command(about = "Robust ranking for peer-rated competitions", long_about = None)]
#[command(version)]
struct Cli {
    /// Enable debug logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Ranking configuration file (YAML or JSON); defaults apply when absent
    #[arg(short, long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_tracing(cli.verbose);

    match run(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("Error: {:#}", e);
            if e.chain().any(is_load_error) {
                ExitCode::from(EXIT_INPUT)
            } else {
                ExitCode::from(EXIT_FAILURE)
            }
        }
    }
}

fn is_load_error(e: &(dyn std::error::Error + 'static)) -> bool {
    e.is::<peerrank_core::ConfigError>() || e.is::<peerrank_core::CompetitionError>()
}

fn init_tracing(verbose: bool) {
    let filter = if verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"))
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(cli.config.as_deref())?;

    match cli.command {
        Commands::Rank {
            snapshot,
            dimensions,
            format,
        } => {
            let competition = load_snapshot(&snapshot)?;
            let ranking = if dimensions.is_empty() {
                rank_competition(&competition, &config)
            } else {
                rank_competition_dimensions(
                    &competition,
                    dimensions.iter().map(String::as_str),
                    &config,
                )
            };
            print_ranking(&ranking, format)
        }
        Commands::Explain {
            snapshot,
            dimension,
            entry,
        } => {
            let competition = load_snapshot(&snapshot)?;
            if competition.entry(&entry).is_none() {
                bail!("no entry with id '{}' in {}", entry, snapshot.display());
            }

            let ranking = DimensionRanking::compute(
                &competition.entries,
                &dimension,
                competition.total_jury,
                &competition.owner_rated_counts(),
                &config,
            );
            let Some(result) = ranking.result_for(&entry) else {
                bail!("entry '{}' missing from ranking of [{}]", entry, dimension);
            };
            print!("{}", explain(result, &dimension));
            Ok(())
        }
        Commands::Validate { snapshot } => {
            let competition = load_snapshot(&snapshot)?;
            let dimensions = competition.dimensions();
            let ratings: usize = competition
                .entries
                .iter()
                .flat_map(|e| e.ratings.values())
                .map(Vec::len)
                .sum();
            println!(
                "{}: {} entries, {} dimensions, {} ratings, jury pool {}",
                snapshot.display(),
                competition.entries.len(),
                dimensions.len(),
                ratings,
                competition.total_jury
            );
            println!("configuration ok");
            Ok(())
        }
    }
}

fn load_config(path: Option<&Path>) -> Result<RankingConfig> {
    match path {
        Some(path) => {
            debug!(path = %path.display(), "loading ranking config");
            RankingConfig::from_path(path)
                .with_context(|| format!("failed to load config {}", path.display()))
        }
        None => Ok(RankingConfig::default()),
    }
}

fn load_snapshot(path: &Path) -> Result<Competition> {
    debug!(path = %path.display(), "loading snapshot");
    Competition::from_path(path)
        .with_context(|| format!("failed to load snapshot {}", path.display()))
}

fn print_ranking(ranking: &CompetitionRanking, format: Format) -> Result<()> {
    match format {
        Format::Json => {
            let json = serde_json::to_string_pretty(ranking).context("failed to encode ranking")?;
            println!("{}", json);
        }
        Format::Text => print!("{}", output::render_text(ranking)),
    }
    Ok(())
}
