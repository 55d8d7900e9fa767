//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// feedpress: batch pipeline that turns feed articles into LLM-generated blog posts
#[derive(Parser, Debug)]
#[command(name = "feedpress")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Process one batch over all configured feeds
    Run(RunArgs),

    /// One-shot post generation for a single article
    Generate(GenerateArgs),

    /// Configuration management
    Config(ConfigArgs),
}

#[derive(Args, Debug)]
pub struct RunArgs {
    /// Log what would be stored without touching the database
    #[arg(long)]
    pub dry_run: bool,

    /// Override the per-feed item count from config
    #[arg(long)]
    pub limit: Option<usize>,
}

#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Article title
    #[arg(long)]
    pub title: String,

    /// Article link (also used as the post's original_url)
    #[arg(long)]
    pub link: String,

    /// Article summary
    #[arg(long)]
    pub summary: Option<String>,

    /// Category label for the post
    #[arg(long, default_value = "DEV")]
    pub category: String,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },
}
