//! Traversal-scoped lookup table for avoiding redundant module loads.
//!
//! A table lives inside one `build` call. It maps every full name seen during
//! that traversal (both as requested at a reference site and as reported by a
//! loaded file) to the node that stands for it.

use std::collections::HashMap;

use petgraph::graph::NodeIndex;

/// Tracks which full names already have a node, so each module is loaded and
/// expanded at most once and cycles terminate.
#[derive(Debug, Default)]
pub struct ModuleTable {
    nodes: HashMap<String, NodeIndex>,
}

impl ModuleTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `full_name` for `idx`. Returns `false` (and keeps the
    /// existing mapping) if the name was already registered.
    pub fn register(&mut self, full_name: &str, idx: NodeIndex) -> bool {
        if self.nodes.contains_key(full_name) {
            return false;
        }
        self.nodes.insert(full_name.to_string(), idx);
        true
    }

    pub fn get(&self, full_name: &str) -> Option<NodeIndex> {
        self.nodes.get(full_name).copied()
    }

    /// Number of full names registered, requested and authoritative alike.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }
}
