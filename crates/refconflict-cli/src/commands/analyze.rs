//! Handler for `refconflict analyze`.

use std::path::PathBuf;

use dialoguer::Input;
use miette::Result;
use refconflict_core::config::OutputFormat;
use refconflict_ops::ops_analyze::{self, AnalyzeOptions};
use refconflict_util::errors::RefConflictError;

pub fn exec(
    path: Option<PathBuf>,
    opts: AnalyzeOptions,
    format: Option<OutputFormat>,
    output: Option<PathBuf>,
    fail_on_conflict: bool,
) -> Result<()> {
    let entry = match path {
        Some(path) => path,
        None => prompt_entry()?,
    };
    let format = match format {
        Some(format) => format,
        None => ops_analyze::load_config(&opts)?.output.format,
    };

    let analysis = ops_analyze::analyze(&entry, &opts)?;
    let rendered = ops_analyze::render(&analysis, format)?;
    ops_analyze::emit(&rendered, output.as_deref())?;

    let unresolved = analysis.report.unresolved_count();
    if fail_on_conflict && unresolved > 0 {
        return Err(RefConflictError::Conflicts { count: unresolved }.into());
    }
    Ok(())
}

/// Ask for the entry assembly on an attended terminal.
fn prompt_entry() -> Result<PathBuf> {
    if !console::user_attended() {
        return Err(RefConflictError::Generic {
            message: "No entry assembly given; pass a path to a .dll or .exe".to_string(),
        }
        .into());
    }
    let answer: String = Input::new()
        .with_prompt("Path to the assembly to analyze")
        .validate_with(|input: &String| {
            if input.trim().is_empty() {
                Err("a path is required")
            } else {
                Ok(())
            }
        })
        .interact_text()
        .map_err(|e| RefConflictError::Generic {
            message: format!("Failed to read the entry path: {e}"),
        })?;
    Ok(PathBuf::from(answer.trim()))
}
