//! CLI argument definitions using clap derive

use clap::{ArgAction, Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Composer buildpack - verified retrieval and cached installation of Composer
///
/// Retrieves upstream Composer releases, proves their integrity and
/// authenticity, records them in a catalog, and installs the selected
/// version into a reusable build layer.
#[derive(Parser, Debug)]
#[command(name = "composer-buildpack")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,

    /// Increase verbosity (-v info, -vv debug)
    #[arg(short, long, global = true, action = ArgAction::Count)]
    pub verbose: u8,

    /// Configuration file path
    #[arg(short, long, global = true, env = "COMPOSER_BUILDPACK_CONFIG")]
    pub config: Option<PathBuf>,

    /// Log output format (overrides [general] log_format)
    #[arg(long, global = true, value_enum)]
    pub log_format: Option<LogFormat>,
}

/// Available commands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Retrieve, verify and catalog one upstream release
    Retrieve(RetrieveArgs),

    /// Install the selected Composer version into a layer
    Build(BuildArgs),

    /// Inspect the dependency catalog
    Catalog(CatalogArgs),
}

/// Arguments for the retrieve command
#[derive(Parser, Debug)]
pub struct RetrieveArgs {
    /// Upstream version to retrieve (e.g. 2.4.4)
    #[arg(long)]
    pub version: String,

    /// Catalog file to update (default: from config)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Armored public key ring trusted to sign releases (default: config, then compiled-in keys)
    #[arg(long)]
    pub key: Option<PathBuf>,
}

/// Arguments for the build command
#[derive(Parser, Debug)]
pub struct BuildArgs {
    /// Build plan file listing the entries for this buildpack
    #[arg(long)]
    pub plan: PathBuf,

    /// Layers root directory
    #[arg(long)]
    pub layers: PathBuf,

    /// Buildpack directory holding pre-fetched `dependencies/`
    #[arg(long)]
    pub cnb: Option<PathBuf>,

    /// Catalog file (default: from config)
    #[arg(long)]
    pub catalog: Option<PathBuf>,

    /// Stack id (default: from config)
    #[arg(long, env = "CNB_STACK_ID")]
    pub stack: Option<String>,

    /// Version requested through the environment
    #[arg(long, env = "BP_COMPOSER_VERSION", hide = true)]
    pub requested_version: Option<String>,
}

/// Arguments for the catalog command
#[derive(Parser, Debug)]
pub struct CatalogArgs {
    /// Subcommand for catalog
    #[command(subcommand)]
    pub action: CatalogAction,
}

/// Catalog subcommands
#[derive(Subcommand, Debug)]
pub enum CatalogAction {
    /// List catalog entries
    List {
        /// Catalog file (default: from config)
        #[arg(long)]
        catalog: Option<PathBuf>,

        /// Output format
        #[arg(short, long, default_value = "table")]
        format: OutputFormat,
    },
}

/// Output format for list commands
#[derive(Debug, Clone, Copy, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable table
    Table,
    /// JSON output
    Json,
}

/// Log output format
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum LogFormat {
    Text,
    Json,
}

impl LogFormat {
    /// Parse the `[general] log_format` value; anything unknown is text
    pub fn from_config(value: &str) -> Self {
        match value {
            "json" => Self::Json,
            _ => Self::Text,
        }
    }
}
