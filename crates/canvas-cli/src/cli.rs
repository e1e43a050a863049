use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "canvas",
    about = "Canvas state sync: reconcile agent snapshots with the cached canvas",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,

    /// Session config file (TOML)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Merge one agent snapshot into a cached state
    Merge(MergeArgs),
    /// Fold a sequence of snapshots into an initial state
    Replay(ReplayArgs),
    /// Print the default payload for a card type
    Default(DefaultArgs),
    /// Report whether a state file holds any content
    Check(CheckArgs),
    /// Apply canvas actions to a state
    Apply(ApplyArgs),
}

#[derive(Args)]
pub struct MergeArgs {
    /// Cached state (JSON)
    pub cached: PathBuf,
    /// Incoming agent snapshot (JSON)
    pub incoming: PathBuf,
    /// Write the merged state here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct ReplayArgs {
    /// Initial state (JSON)
    pub initial: PathBuf,
    /// Snapshots, merged in the order given
    #[arg(required = true)]
    pub snapshots: Vec<PathBuf>,
    /// Write the final state here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}

#[derive(Args)]
pub struct DefaultArgs {
    /// Card type tag, e.g. `project`
    pub card_type: String,
}

#[derive(Args)]
pub struct CheckArgs {
    /// State file (JSON)
    pub state: PathBuf,
}

#[derive(Args)]
pub struct ApplyArgs {
    /// State to edit (JSON)
    pub state: PathBuf,
    /// One action object or an array of actions (JSON)
    pub actions: PathBuf,
    /// Write the edited state here
    #[arg(short, long)]
    pub output: Option<PathBuf>,
}
