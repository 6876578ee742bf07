//! Command-line interface argument parsing and definitions
//!
//! This module defines the CLI structure using clap's derive API,
//! providing a type-safe and well-documented command interface.

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// omi-validate - validate openMINDS schema templates and JSON-LD instances
///
/// Checks schema templates for type casing, `_extends` targets and inherited
/// required properties, and instances for identifier conventions, type and
/// namespace consistency and property conformance.
#[derive(Parser, Debug)]
#[command(
    name = "omi-validate",
    version,
    author,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Enable verbose output (can be used multiple times for increased verbosity)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all non-essential output
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(short, long, global = true, env = "OMI_VALIDATE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results [default: from config, else human]
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// The subcommand to run
    #[command(subcommand)]
    pub command: Commands,
}

/// Available subcommands
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Validate a schema template (*.schema.tpl.json)
    Schema(SchemaArgs),

    /// Validate one or more JSON-LD instances
    Instance(InstanceArgs),
}

/// Arguments for the schema command
#[derive(Parser, Debug)]
pub struct SchemaArgs {
    /// Path to the schema template
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Repository the schema lives in, used to bind absolute `_extends` references
    #[arg(long, requires = "branch")]
    pub repository: Option<String>,

    /// Branch of `--repository` the schema lives on
    #[arg(long, requires = "repository")]
    pub branch: Option<String>,

    /// Directory relative `_extends` references are read from
    #[arg(long, value_name = "DIR")]
    pub schema_root: Option<PathBuf>,

    /// Use the manifests already downloaded instead of fetching them
    #[arg(long)]
    pub offline: bool,
}

/// Arguments for the instance command
#[derive(Parser, Debug)]
pub struct InstanceArgs {
    /// Paths to the instance files
    #[arg(value_name = "INSTANCE", required = true, num_args = 1..)]
    pub instances: Vec<PathBuf>,

    /// Version to validate against instead of the one implied by the path
    #[arg(long = "schema-version", value_name = "VERSION")]
    pub schema_version: Option<String>,

    /// Use the manifests and sources already downloaded instead of fetching them
    #[arg(long)]
    pub offline: bool,

    /// Remove and re-clone the central sources used for class definitions
    #[arg(long, conflicts_with = "offline")]
    pub refetch: bool,
}

/// Output format options
#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable formatted output
    Human,
    /// JSON output
    Json,
    /// YAML output
    Yaml,
    /// Pretty-printed JSON output
    JsonPretty,
}

impl Cli {
    /// Parse command-line arguments
    pub fn parse_args() -> Self {
        Self::parse()
    }

    /// Get the effective verbosity level (considering quiet flag)
    pub fn verbosity_level(&self) -> u8 {
        if self.quiet {
            0
        } else {
            self.verbose
        }
    }

    /// Check if colored output should be used
    pub fn use_color(&self, configured: bool) -> bool {
        configured && !self.no_color && std::io::stderr().is_terminal()
    }

    /// The `--output` flag, else the configured format name, else human
    pub fn output_format(&self, configured: &str) -> OutputFormat {
        self.output
            .or_else(|| OutputFormat::from_str(configured, true).ok())
            .unwrap_or(OutputFormat::Human)
    }
}
