//! Reference graph engine: memoized depth-first discovery of module
//! references, skip policies, and version conflict analysis against binding
//! redirects.

pub mod builder;
mod cache;
pub mod conflict;
pub mod graph;
pub mod skip;
