//! Handler for `refconflict conflicts`.

use std::path::Path;

use miette::Result;
use refconflict_ops::ops_analyze::{self, AnalyzeOptions};
use refconflict_util::errors::RefConflictError;

pub fn exec(path: &Path, opts: AnalyzeOptions, fail_on_conflict: bool) -> Result<()> {
    let analysis = ops_analyze::analyze(path, &opts)?;
    if analysis.report.is_empty() {
        println!("{}", analysis.report);
    } else {
        print!("{}", analysis.report);
    }

    let unresolved = analysis.report.unresolved_count();
    if fail_on_conflict && unresolved > 0 {
        return Err(RefConflictError::Conflicts { count: unresolved }.into());
    }
    Ok(())
}
