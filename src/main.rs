use anyhow::{Context, Result, bail};
use clap::{Parser, Subcommand};
use hunk_miner::GitConnector;
use hunk_miner::config::Config;
use std::collections::BTreeMap;
use std::io::Write;
use std::path::PathBuf;

const LONG_VERSION: &str = concat!(
    env!("CARGO_PKG_VERSION"),
    " (",
    env!("HUNK_MINER_REVISION"),
    ", built ",
    env!("HUNK_MINER_BUILD_DATE"),
    ")"
);

/// Structured change hunks between two commits of a local git repository
#[derive(Parser)]
#[command(name = "hunk-miner", version, long_version = LONG_VERSION)]
struct Cli {
    /// Working copy to open (discovery walks upward from here)
    #[arg(short, long, env = "HUNK_MINER_REPO", default_value = ".")]
    repo: PathBuf,

    /// Configuration file (defaults to the platform config directory)
    #[arg(long, env = "HUNK_MINER_CONFIG")]
    config: Option<PathBuf>,

    /// Unchanged lines shown around each change
    #[arg(long)]
    context_lines: Option<u32>,

    /// Report renamed files as a deletion plus an addition
    #[arg(long)]
    no_renames: bool,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Print change hunks between two revisions as JSON
    Hunks {
        base: String,
        head: String,
        /// Keep only paths ending in this suffix, e.g. ".java"
        #[arg(short, long)]
        ext: Option<String>,
    },
    /// Print commit history from HEAD as JSON
    Log {
        #[arg(short = 'n', long)]
        limit: Option<usize>,
    },
    /// Print the HEAD commit id
    Head,
    /// Print the contents of a blob, e.g. `HEAD:src/lib.rs`
    Show { blob: String },
}

fn load_config(cli: &Cli) -> Result<Config> {
    let mut config = match &cli.config {
        Some(path) => Config::from_file(path)?,
        None => Config::load_or_default()?,
    };
    config.apply_env_overrides();

    if let Some(lines) = cli.context_lines {
        config.diff.context_lines = lines;
    }
    if cli.no_renames {
        config.diff.detect_renames = false;
    }

    config.validate()?;
    Ok(config)
}

fn run(cli: Cli) -> Result<()> {
    let config = load_config(&cli)?;
    let mut connector = GitConnector::with_config(&cli.repo, config);
    if !connector.connect() {
        bail!(
            "No usable git repository at {} (missing, or HEAD has no commits)",
            cli.repo.display()
        );
    }

    let mut stdout = std::io::stdout().lock();
    match &cli.command {
        Command::Hunks { base, head, ext } => {
            let hunks = connector.get_change_hunks(base, head, ext.as_deref())?;
            let sorted: BTreeMap<_, _> = hunks.into_iter().collect();
            serde_json::to_writer_pretty(&mut stdout, &sorted)?;
            writeln!(stdout)?;
        }
        Command::Log { limit } => {
            let log = connector.log().context("Failed to walk history from HEAD")?;
            let commits = log
                .take(limit.unwrap_or(usize::MAX))
                .collect::<Result<Vec<_>, _>>()?;
            serde_json::to_writer_pretty(&mut stdout, &commits)?;
            writeln!(stdout)?;
        }
        Command::Head => {
            let id = connector
                .get_head_commit_id()
                .context("HEAD does not resolve to a commit")?;
            writeln!(stdout, "{}", id)?;
        }
        Command::Show { blob } => {
            let store = connector.store().context("Repository is not connected")?;
            let id = store.resolve(blob)?;
            let bytes = connector.get_file_bytes(id)?;
            stdout.write_all(&bytes)?;
        }
    }

    connector.close();
    Ok(())
}

fn main() -> Result<()> {
    // stdout carries JSON, so logs go to stderr
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .init();

    run(Cli::parse())
}
