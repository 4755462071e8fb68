//! CLI argument definitions for refconflict.
//!
//! Uses `clap` derive macros to define the command surface. Each command
//! corresponds to a handler in the [`super::commands`] module.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use refconflict_core::config::OutputFormat;

#[derive(Parser, Debug)]
#[command(
    name = "refconflict",
    version,
    about = "Find version conflicts between .NET assembly references",
    long_about = "refconflict walks every assembly referenced (transitively) by an entry \
                  module, builds the reference graph, and reports version conflicts that \
                  are not covered by binding redirects."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Use this config file instead of ~/.refconflict/config.toml
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Build and print the reference graph of an assembly
    Analyze {
        /// Entry assembly (.exe or .dll); prompted for when omitted
        path: Option<PathBuf>,
        #[command(flatten)]
        analysis: AnalysisArgs,
        /// Output format: text, tree, dgml, json
        #[arg(short, long)]
        format: Option<OutputFormat>,
        /// Write the output to a file instead of stdout
        #[arg(short, long, value_name = "FILE")]
        output: Option<PathBuf>,
        /// Exit with an error when unresolved conflicts are found
        #[arg(long)]
        fail_on_conflict: bool,
    },

    /// Print only the version conflicts of an assembly
    Conflicts {
        /// Entry assembly (.exe or .dll)
        path: PathBuf,
        #[command(flatten)]
        analysis: AnalysisArgs,
        /// Exit with an error when unresolved conflicts are found
        #[arg(long)]
        fail_on_conflict: bool,
    },

    /// Show how the entry assembly comes to reference a module
    Why {
        /// Entry assembly (.exe or .dll)
        path: PathBuf,
        /// Module name or full name
        module: String,
        #[command(flatten)]
        analysis: AnalysisArgs,
    },
}

/// Flags shared by every command that builds a graph.
#[derive(Args, Debug, Default)]
pub struct AnalysisArgs {
    /// Application config with binding redirects (default: next to the entry)
    #[arg(long, value_name = "FILE")]
    pub app_config: Option<PathBuf>,
    /// Do not skip framework assemblies
    #[arg(long)]
    pub no_skip: bool,
    /// Also skip this module name
    #[arg(long = "skip", value_name = "NAME")]
    pub skip: Vec<String>,
    /// Also skip module names starting with this prefix
    #[arg(long = "skip-prefix", value_name = "PREFIX")]
    pub skip_prefix: Vec<String>,
    /// Additional directory to search for referenced assemblies
    #[arg(long = "probe", value_name = "DIR")]
    pub probe: Vec<PathBuf>,
}

pub fn parse() -> Cli {
    Cli::parse()
}
