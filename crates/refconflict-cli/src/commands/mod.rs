//! Command dispatch and handler modules.

mod analyze;
mod conflicts;
mod why;

use std::path::PathBuf;

use miette::Result;
use refconflict_ops::ops_analyze::AnalyzeOptions;

use crate::cli::{AnalysisArgs, Cli, Command};

/// Route a parsed CLI invocation to the appropriate command handler.
pub fn dispatch(cli: Cli) -> Result<()> {
    let config = cli.config;
    match cli.command {
        Command::Analyze {
            path,
            analysis,
            format,
            output,
            fail_on_conflict,
        } => analyze::exec(
            path,
            options(config, analysis),
            format,
            output,
            fail_on_conflict,
        ),
        Command::Conflicts {
            path,
            analysis,
            fail_on_conflict,
        } => conflicts::exec(&path, options(config, analysis), fail_on_conflict),
        Command::Why {
            path,
            module,
            analysis,
        } => why::exec(&path, &module, options(config, analysis)),
    }
}

fn options(config: Option<PathBuf>, args: AnalysisArgs) -> AnalyzeOptions {
    AnalyzeOptions {
        config,
        app_config: args.app_config,
        no_skip: args.no_skip,
        skip_names: args.skip,
        skip_prefixes: args.skip_prefix,
        probe_paths: args.probe,
    }
}
