use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(
    name = "cluesmith",
    version,
    about = "Non-spoiling hints and explanations for cryptic crossword clues"
)]
pub struct Cli {
    #[command(subcommand)]
    pub cmd: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Generate hints and explanations for a clue list
    Generate(GenerateArgs),
    Version,
}

#[derive(Args, Debug, Clone)]
pub struct GenerateArgs {
    /// Clue list (JSON document with a `clues` array)
    #[arg(default_value = "game_data.json")]
    pub game_data: PathBuf,

    /// Hints output path
    #[arg(default_value = "hints.json")]
    pub hints: PathBuf,

    /// Explanations output path
    #[arg(default_value = "explanations.json")]
    pub explanations: PathBuf,

    /// YAML config file; environment and flags override it
    #[arg(long, env = "CLUESMITH_CONFIG")]
    pub config: Option<PathBuf>,

    #[arg(long)]
    pub model: Option<String>,

    /// Prompt version tag; changing it invalidates cached content
    #[arg(long)]
    pub prompt_version: Option<String>,

    /// Worker pool width
    #[arg(long)]
    pub concurrency: Option<usize>,

    #[arg(long)]
    pub cache_file: Option<PathBuf>,

    /// Chat-completions endpoint
    #[arg(long)]
    pub api_url: Option<String>,

    #[arg(long)]
    pub temperature: Option<f32>,

    /// Skip generation and rebuild outputs from the cache only
    #[arg(long)]
    pub offline: bool,
}
