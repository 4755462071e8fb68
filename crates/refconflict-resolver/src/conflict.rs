//! Version conflict detection and binding-redirect analysis.

use std::collections::{BTreeMap, BTreeSet, HashMap};
use std::fmt;

use petgraph::graph::NodeIndex;
use refconflict_core::redirect::BindingRedirect;
use refconflict_core::version::ModuleVersion;

use crate::graph::{Category, ReferenceGraph};

/// Modules of one name present in the graph at two or more versions.
#[derive(Debug, Clone)]
pub struct ConflictGroup {
    /// Module name as spelled by the first node of the group.
    pub name: String,
    /// Distinct versions present, ascending.
    pub versions: Vec<ModuleVersion>,
    pub highest: ModuleVersion,
    /// Lower versions with no rule redirecting them to `highest`.
    pub unresolved: Vec<ModuleVersion>,
    /// Whether some rule for this name covers `highest` itself.
    pub highest_redirected: bool,
    pub members: Vec<(NodeIndex, ModuleVersion)>,
}

impl ConflictGroup {
    pub fn is_resolved(&self) -> bool {
        self.unresolved.is_empty()
    }

    /// Category assigned to a member at `version`.
    fn category_for(&self, version: &ModuleVersion) -> Category {
        if !self.is_resolved() {
            Category::Conflicted
        } else if *version != self.highest || self.highest_redirected {
            Category::ConflictResolved
        } else {
            Category::Normal
        }
    }
}

impl fmt::Display for ConflictGroup {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let versions: Vec<String> = self.versions.iter().map(|v| v.to_string()).collect();
        write!(f, "{} [{}]", self.name, versions.join(", "))?;
        if self.is_resolved() {
            write!(f, " resolved by redirect to {}", self.highest)
        } else {
            let missing: Vec<String> = self.unresolved.iter().map(|v| v.to_string()).collect();
            write!(f, " no redirect to {} for {}", self.highest, missing.join(", "))
        }
    }
}

/// All conflict groups found in a graph, ordered by module name.
#[derive(Debug, Clone, Default)]
pub struct ConflictReport {
    pub groups: Vec<ConflictGroup>,
}

impl ConflictReport {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }

    pub fn len(&self) -> usize {
        self.groups.len()
    }

    /// Number of groups still `Conflicted` after applying redirects.
    pub fn unresolved_count(&self) -> usize {
        self.groups.iter().filter(|g| !g.is_resolved()).count()
    }

    /// Category overrides for every member of every group.
    pub fn categories(&self) -> HashMap<NodeIndex, Category> {
        let mut overrides = HashMap::new();
        for group in &self.groups {
            for (idx, version) in &group.members {
                overrides.insert(*idx, group.category_for(version));
            }
        }
        overrides
    }
}

impl fmt::Display for ConflictReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.groups.is_empty() {
            return write!(f, "No version conflicts.");
        }
        writeln!(f, "Version conflicts ({}):", self.groups.len())?;
        for group in &self.groups {
            writeln!(f, "  {group}")?;
        }
        Ok(())
    }
}

/// Group the graph's loaded modules by name and judge each multi-version
/// group against `redirects`.
pub fn detect(graph: &ReferenceGraph, redirects: &[BindingRedirect]) -> ConflictReport {
    let mut partitions: BTreeMap<String, Vec<(NodeIndex, ModuleVersion)>> = BTreeMap::new();
    for (idx, node) in graph.nodes() {
        if matches!(node.category(), Category::EntryPoint | Category::Missing) {
            continue;
        }
        partitions
            .entry(node.name().to_ascii_lowercase())
            .or_default()
            .push((idx, node.version()));
    }

    let mut report = ConflictReport::new();
    for members in partitions.into_values() {
        let versions: BTreeSet<ModuleVersion> = members.iter().map(|(_, v)| *v).collect();
        if versions.len() < 2 {
            continue;
        }
        let Some(&highest) = versions.iter().next_back() else {
            continue;
        };
        let name = graph.node(members[0].0).name().to_string();

        let unresolved: Vec<ModuleVersion> = versions
            .iter()
            .filter(|v| **v != highest)
            .filter(|v| !redirects.iter().any(|r| r.redirects(&name, v, &highest)))
            .copied()
            .collect();
        let highest_redirected = redirects.iter().any(|r| r.covers(&name, &highest));

        let group = ConflictGroup {
            name,
            versions: versions.into_iter().collect(),
            highest,
            unresolved,
            highest_redirected,
            members,
        };
        if group.is_resolved() {
            tracing::info!("conflict resolved: {group}");
        } else {
            tracing::warn!("conflict: {group}");
        }
        report.groups.push(group);
    }
    report
}

/// Return a copy of `graph` with conflict categories applied.
pub fn analyze(graph: &ReferenceGraph, redirects: &[BindingRedirect]) -> ReferenceGraph {
    analyze_with_report(graph, redirects).0
}

/// Like [`analyze`], also returning the per-group verdicts.
pub fn analyze_with_report(
    graph: &ReferenceGraph,
    redirects: &[BindingRedirect],
) -> (ReferenceGraph, ConflictReport) {
    let report = detect(graph, redirects);
    let revised = graph.recategorized(&report.categories());
    (revised, report)
}
