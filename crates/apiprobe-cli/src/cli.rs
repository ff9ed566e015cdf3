//! Command-line interface argument parsing and definitions

use clap::{Parser, Subcommand, ValueEnum};
use is_terminal::IsTerminal;
use std::path::PathBuf;

/// Apiprobe CLI - contract testing primitives for HTTP/JSON APIs
///
/// Generate single-violation negative fixtures from a field schema,
/// evaluate declarative checks against saved responses, and run request
/// suites against a live service.
#[derive(Parser, Debug)]
#[command(
    name = "apiprobe",
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
    #[arg(short, long, global = true, env = "APIPROBE_CONFIG")]
    pub config: Option<PathBuf>,

    /// Output format for results
    #[arg(short, long, value_enum, global = true, default_value = "human")]
    pub output: OutputFormat,

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
    /// Print the negative fixtures a schema yields for a baseline payload
    Fixtures(FixturesArgs),

    /// Evaluate declarative checks against a saved response body
    Check(CheckArgs),

    /// Execute every case of a request suite against the base URL
    Run(RunArgs),
}

/// Arguments for the fixtures command
#[derive(Parser, Debug)]
pub struct FixturesArgs {
    /// Field-constraint schema (JSON or YAML)
    #[arg(value_name = "SCHEMA")]
    pub schema: PathBuf,

    /// Known-valid baseline payload (JSON or YAML)
    #[arg(value_name = "BASELINE")]
    pub baseline: PathBuf,

    /// Only emit fixtures for this field
    #[arg(long)]
    pub field: Option<String>,

    /// Emit bare payloads instead of annotated fixtures
    #[arg(long)]
    pub payloads_only: bool,
}

/// Arguments for the check command
#[derive(Parser, Debug)]
pub struct CheckArgs {
    /// List of declarative checks (JSON or YAML)
    #[arg(value_name = "CHECKS")]
    pub checks: PathBuf,

    /// Saved response body
    #[arg(value_name = "RESPONSE")]
    pub response: PathBuf,

    /// HTTP status the response was received with
    #[arg(long, default_value = "200")]
    pub status: u16,
}

/// Arguments for the run command
#[derive(Parser, Debug)]
pub struct RunArgs {
    /// Request suite (JSON or YAML)
    #[arg(value_name = "SUITE")]
    pub suite: PathBuf,

    /// Base URL override
    #[arg(long, env = "BASE_URL")]
    pub base_url: Option<String>,

    /// Skip the generated negative cases
    #[arg(long)]
    pub skip_negative: bool,

    /// Attach request and response summaries to every check record
    #[arg(long)]
    pub debug: bool,

    /// Timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Accept invalid TLS certificates
    #[arg(long)]
    pub insecure: bool,

    /// Only run cases whose feature matches
    #[arg(long)]
    pub feature: Option<String>,
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
    pub fn use_color(&self) -> bool {
        !self.no_color && std::io::stdout().is_terminal()
    }
}
