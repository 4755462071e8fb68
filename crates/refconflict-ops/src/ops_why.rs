//! Operation: explain why a module is part of the reference graph.

use std::path::Path;

use refconflict_util::errors::RefConflictResult;

use crate::ops_analyze::{self, AnalyzeOptions};
use crate::render;

/// Print the reference chain from `entry` to `module`, followed by every
/// module that references it directly.
///
/// `module` may be a module name or a full name. Prints a notice and still
/// succeeds when the module is not in the graph.
pub fn why(entry: &Path, module: &str, opts: &AnalyzeOptions) -> RefConflictResult<()> {
    let analysis = ops_analyze::analyze(entry, opts)?;
    match render::why(&analysis.graph, module) {
        Some(path) => {
            println!("Path to {module}:");
            print!("{path}");
            if let Some(referrers) = render::referrers(&analysis.graph, module) {
                if !referrers.is_empty() {
                    println!("Referenced by:");
                    print!("{referrers}");
                }
            }
        }
        None => println!("Module '{module}' not found in the graph."),
    }
    Ok(())
}
