//! Handler for `refconflict why`.

use std::path::Path;

use miette::Result;
use refconflict_ops::ops_analyze::AnalyzeOptions;
use refconflict_ops::ops_why;

pub fn exec(path: &Path, module: &str, opts: AnalyzeOptions) -> Result<()> {
    ops_why::why(path, module, &opts)
}
