//! Reference graph construction and traversal.

use std::collections::{HashMap, HashSet};
use std::fmt;

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use refconflict_core::identity::ModuleIdentity;
use refconflict_core::version::ModuleVersion;

/// The role or resolution status of a module in the graph.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Category {
    EntryPoint,
    Normal,
    ConflictResolved,
    Conflicted,
    Missing,
}

impl Category {
    pub const ALL: [Category; 5] = [
        Category::EntryPoint,
        Category::Normal,
        Category::ConflictResolved,
        Category::Conflicted,
        Category::Missing,
    ];

    /// Identifier form, e.g. `ConflictResolved`.
    pub fn as_str(&self) -> &'static str {
        match self {
            Category::EntryPoint => "EntryPoint",
            Category::Normal => "Normal",
            Category::ConflictResolved => "ConflictResolved",
            Category::Conflicted => "Conflicted",
            Category::Missing => "Missing",
        }
    }

    /// Human-readable label, e.g. `Conflict resolved`.
    pub fn description(&self) -> &'static str {
        match self {
            Category::EntryPoint => "Entry point",
            Category::Normal => "Normal",
            Category::ConflictResolved => "Conflict resolved",
            Category::Conflicted => "Conflicted",
            Category::Missing => "Missing",
        }
    }
}

impl fmt::Display for Category {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A module in the reference graph.
///
/// Nodes are immutable once built; the analyser produces recategorized
/// copies instead of mutating them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleNode {
    identity: ModuleIdentity,
    category: Category,
    failure: Option<String>,
}

impl ModuleNode {
    pub fn entry_point(identity: ModuleIdentity) -> Self {
        Self {
            identity,
            category: Category::EntryPoint,
            failure: None,
        }
    }

    pub fn normal(identity: ModuleIdentity) -> Self {
        Self {
            identity,
            category: Category::Normal,
            failure: None,
        }
    }

    /// A module that could not be loaded; `identity` is the one requested.
    pub fn missing(identity: ModuleIdentity, reason: impl Into<String>) -> Self {
        Self {
            identity,
            category: Category::Missing,
            failure: Some(reason.into()),
        }
    }

    pub fn identity(&self) -> &ModuleIdentity {
        &self.identity
    }

    pub fn name(&self) -> &str {
        self.identity.name()
    }

    pub fn version(&self) -> ModuleVersion {
        self.identity.version()
    }

    /// The full name under which this node is keyed.
    pub fn key(&self) -> &str {
        self.identity.full_name()
    }

    pub fn category(&self) -> Category {
        self.category
    }

    /// Failure reason of a `Missing` node.
    pub fn failure(&self) -> Option<&str> {
        self.failure.as_deref()
    }

    fn with_category(&self, category: Category) -> Self {
        Self {
            category,
            ..self.clone()
        }
    }
}

impl fmt::Display for ModuleNode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.identity.name(), self.identity.version())
    }
}

/// Edge label: the version requested at the reference site.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceEdge {
    pub requested: ModuleVersion,
}

/// A module reference graph backed by petgraph.
///
/// Nodes are keyed by full name; edges keep their insertion order. There is
/// always exactly one `EntryPoint` node.
#[derive(Debug, Clone)]
pub struct ReferenceGraph {
    graph: DiGraph<ModuleNode, ReferenceEdge>,
    /// Lookup from full name to node index.
    index: HashMap<String, NodeIndex>,
    entry: NodeIndex,
}

impl ReferenceGraph {
    /// Create a graph holding only the entry point.
    pub(crate) fn new(entry: ModuleIdentity) -> Self {
        let mut graph = DiGraph::new();
        let key = entry.full_name().to_string();
        let idx = graph.add_node(ModuleNode::entry_point(entry));
        let mut index = HashMap::new();
        index.insert(key, idx);
        Self {
            graph,
            index,
            entry: idx,
        }
    }

    /// Add a node. If its key already exists, returns the existing index.
    pub(crate) fn add_node(&mut self, node: ModuleNode) -> NodeIndex {
        if let Some(&idx) = self.index.get(node.key()) {
            return idx;
        }
        let key = node.key().to_string();
        let idx = self.graph.add_node(node);
        self.index.insert(key, idx);
        idx
    }

    /// Add a reference edge from `from` to `to`. An identical edge is only
    /// recorded once.
    pub(crate) fn add_edge(&mut self, from: NodeIndex, to: NodeIndex, edge: ReferenceEdge) {
        if !self
            .graph
            .edges(from)
            .any(|e| e.target() == to && *e.weight() == edge)
        {
            self.graph.add_edge(from, to, edge);
        }
    }

    /// The entry-point node.
    pub fn entry(&self) -> NodeIndex {
        self.entry
    }

    /// Look up a node by full name.
    pub fn find(&self, full_name: &str) -> Option<NodeIndex> {
        self.index.get(full_name).copied()
    }

    /// All nodes whose module name matches `name` (case-insensitive).
    pub fn find_by_name(&self, name: &str) -> Vec<NodeIndex> {
        self.graph
            .node_indices()
            .filter(|&idx| self.graph[idx].name().eq_ignore_ascii_case(name))
            .collect()
    }

    /// Get the node data for an index.
    pub fn node(&self, idx: NodeIndex) -> &ModuleNode {
        &self.graph[idx]
    }

    /// All nodes, in creation order.
    pub fn nodes(&self) -> impl Iterator<Item = (NodeIndex, &ModuleNode)> + '_ {
        self.graph
            .node_indices()
            .map(move |idx| (idx, &self.graph[idx]))
    }

    /// All edges as `(from, to, label)`, in insertion order.
    pub fn edges(&self) -> impl Iterator<Item = (NodeIndex, NodeIndex, &ReferenceEdge)> + '_ {
        self.graph
            .edge_references()
            .map(|e| (e.source(), e.target(), e.weight()))
    }

    /// Direct references of a node, in insertion order.
    pub fn dependencies_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &ReferenceEdge)> {
        self.sorted_edges(idx, Direction::Outgoing)
    }

    /// Reverse references (who references this node), in insertion order.
    pub fn dependents_of(&self, idx: NodeIndex) -> Vec<(NodeIndex, &ReferenceEdge)> {
        self.sorted_edges(idx, Direction::Incoming)
    }

    fn sorted_edges(&self, idx: NodeIndex, dir: Direction) -> Vec<(NodeIndex, &ReferenceEdge)> {
        let mut edges: Vec<(EdgeIndex, NodeIndex, &ReferenceEdge)> = self
            .graph
            .edges_directed(idx, dir)
            .map(|e| {
                let other = match dir {
                    Direction::Outgoing => e.target(),
                    Direction::Incoming => e.source(),
                };
                (e.id(), other, e.weight())
            })
            .collect();
        edges.sort_by_key(|(id, _, _)| *id);
        edges.into_iter().map(|(_, n, w)| (n, w)).collect()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    /// Number of nodes in `category`.
    pub fn count(&self, category: Category) -> usize {
        self.graph
            .node_weights()
            .filter(|n| n.category() == category)
            .count()
    }

    /// Copy of this graph with the given categories replaced. Indices,
    /// keys and edges are preserved.
    pub(crate) fn recategorized(&self, overrides: &HashMap<NodeIndex, Category>) -> Self {
        let graph = self.graph.map(
            |idx, node| match overrides.get(&idx) {
                Some(&category) => node.with_category(category),
                None => node.clone(),
            },
            |_, edge| edge.clone(),
        );
        Self {
            graph,
            index: self.index.clone(),
            entry: self.entry,
        }
    }

    /// Print the reference tree from the entry point, annotating each module
    /// with its category. A module is expanded only the first time it is
    /// printed; later occurrences are marked with `(*)`.
    pub fn print_tree(&self, max_depth: Option<usize>) -> String {
        let mut output = String::new();
        let root = &self.graph[self.entry];
        output.push_str(&format!("{root}\n"));

        let mut expanded = HashSet::new();
        expanded.insert(self.entry);

        // Pending lines, popped in pre-order.
        let mut stack: Vec<TreeLine> = Vec::new();
        self.push_children(&mut stack, self.entry, String::new(), 1);

        while let Some(line) = stack.pop() {
            let node = &self.graph[line.idx];
            let connector = if line.is_last { "└── " } else { "├── " };
            let requested = if line.requested != node.version() {
                format!(" (requested {})", line.requested)
            } else {
                String::new()
            };
            let first_visit = expanded.insert(line.idx);
            let marker = if first_visit { "" } else { " (*)" };
            let tag = match node.category() {
                Category::Normal => String::new(),
                other => format!(" [{other}]"),
            };
            output.push_str(&format!(
                "{}{connector}{node}{requested}{tag}{marker}\n",
                line.prefix
            ));

            if !first_visit || max_depth.is_some_and(|max| line.depth >= max) {
                continue;
            }
            let child_prefix = format!(
                "{}{}",
                line.prefix,
                if line.is_last { "    " } else { "│   " }
            );
            self.push_children(&mut stack, line.idx, child_prefix, line.depth + 1);
        }

        output
    }

    /// Queue the references of `idx` so the first one is popped first.
    fn push_children(
        &self,
        stack: &mut Vec<TreeLine>,
        idx: NodeIndex,
        prefix: String,
        depth: usize,
    ) {
        let deps = self.dependencies_of(idx);
        let count = deps.len();
        for (i, (child, edge)) in deps.into_iter().enumerate().rev() {
            stack.push(TreeLine {
                idx: child,
                requested: edge.requested,
                prefix: prefix.clone(),
                is_last: i + 1 == count,
                depth,
            });
        }
    }

    /// Find the path from the entry point to a module.
    ///
    /// Accepts either a full name or just a module name. The path is the
    /// first one found by a depth-first walk in reference order.
    pub fn find_path(&self, target_key: &str) -> Option<Vec<&ModuleNode>> {
        let target = self.resolve_key(target_key)?;
        if target == self.entry {
            return Some(vec![&self.graph[self.entry]]);
        }

        let mut visited = HashSet::new();
        visited.insert(self.entry);
        let mut stack = vec![(self.entry, self.children(self.entry))];
        while let Some((_, pending)) = stack.last_mut() {
            match pending.next() {
                Some(next) if next == target => {
                    let mut path: Vec<&ModuleNode> =
                        stack.iter().map(|(idx, _)| &self.graph[*idx]).collect();
                    path.push(&self.graph[target]);
                    return Some(path);
                }
                Some(next) => {
                    if visited.insert(next) {
                        stack.push((next, self.children(next)));
                    }
                }
                None => {
                    stack.pop();
                }
            }
        }
        None
    }

    fn children(&self, idx: NodeIndex) -> std::vec::IntoIter<NodeIndex> {
        self.dependencies_of(idx)
            .into_iter()
            .map(|(child, _)| child)
            .collect::<Vec<_>>()
            .into_iter()
    }

    /// Resolve a user-provided key to a node index.
    ///
    /// Tries the exact full name first, then falls back to the first node
    /// with a matching module name.
    fn resolve_key(&self, key: &str) -> Option<NodeIndex> {
        if let Some(&idx) = self.index.get(key) {
            return Some(idx);
        }
        self.find_by_name(key).into_iter().next()
    }
}

/// One line of the tree presenter waiting to be printed.
struct TreeLine {
    idx: NodeIndex,
    requested: ModuleVersion,
    prefix: String,
    is_last: bool,
    depth: usize,
}
