//! CLI command definitions

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Output format for command results
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Content plus scores, iteration table and stop reason
    Full,
    /// Only the final scene text
    Content,
    /// JSON output
    Json,
}

impl From<OutputFormat> for stagecraft_domain::OutputFormat {
    fn from(format: OutputFormat) -> Self {
        match format {
            OutputFormat::Full => stagecraft_domain::OutputFormat::Full,
            OutputFormat::Content => stagecraft_domain::OutputFormat::Content,
            OutputFormat::Json => stagecraft_domain::OutputFormat::Json,
        }
    }
}

/// CLI arguments for stagecraft
#[derive(Parser, Debug)]
#[command(name = "stagecraft")]
#[command(author, version, about = "Iteratively refine theatrical scenes with an LLM")]
#[command(long_about = r#"
Stagecraft refines a theatrical scene through repeated
generate -> evaluate -> adopt rounds until it meets a quality threshold,
stops improving, or runs out of rounds.

Configuration files are loaded from (in priority order):
1. --config <path>          Explicit config file
2. ./stagecraft.toml        Project-level config
3. ~/.config/stagecraft/config.toml   Global config
Environment variables prefixed with STAGECRAFT_ override all files
(e.g. STAGECRAFT_REFINEMENT__MAX_ITERATIONS=3).

Example:
  stagecraft refine scene.txt --feedback director.json --feedback designer.json
  stagecraft expand scene.txt --target 6000
  stagecraft plan director.json designer.json
  stagecraft evaluate scene.txt
"#)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Command>,

    /// Output format (defaults to the configured format, then "content")
    #[arg(short, long, value_enum, global = true)]
    pub output: Option<OutputFormat>,

    /// Verbosity level (-v = info, -vv = debug, -vvv = trace)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress progress indicators
    #[arg(short, long, global = true)]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(long, value_name = "PATH", global = true)]
    pub config: Option<PathBuf>,

    /// Disable loading of configuration files
    #[arg(long, global = true)]
    pub no_config: bool,

    /// Show configuration file locations and exit
    #[arg(long)]
    pub show_config: bool,

    /// Also write logs to this file
    #[arg(long, value_name = "PATH", global = true)]
    pub log_file: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone, PartialEq)]
pub enum Command {
    /// Refine a scene until it meets the quality threshold
    Refine {
        /// Scene text file
        file: PathBuf,

        /// Expand the refined scene to the configured target length
        #[arg(long)]
        expand: bool,

        /// Feedback package JSON files whose revision plan guides refinement
        #[arg(long, value_name = "JSON")]
        feedback: Vec<PathBuf>,

        /// Scene identifier used in prompts and review threads
        #[arg(long, value_name = "ID")]
        scene_id: Option<String>,

        /// Override the configured maximum number of rounds
        #[arg(long, value_name = "N")]
        max_iterations: Option<usize>,
    },

    /// Expand a scene to a target length, preserving its content
    Expand {
        /// Scene text file
        file: PathBuf,

        /// Length to expand to (defaults to the configured target)
        #[arg(long, value_name = "N")]
        target: Option<usize>,
    },

    /// Aggregate feedback packages and print the unified revision plan
    Plan {
        /// Feedback package JSON files
        #[arg(required = true, value_name = "JSON")]
        packages: Vec<PathBuf>,
    },

    /// Print the heuristic quality scores of a scene
    Evaluate {
        /// Scene text file
        file: PathBuf,

        /// Scene identifier used in the report
        #[arg(long, value_name = "ID")]
        scene_id: Option<String>,
    },
}
