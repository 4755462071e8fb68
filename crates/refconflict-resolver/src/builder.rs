//! Reference graph discovery: memoized depth-first traversal from an entry
//! module, loading each distinct module once.

use std::path::{Path, PathBuf};

use miette::Diagnostic;
use petgraph::graph::NodeIndex;
use refconflict_core::identity::ModuleIdentity;
use refconflict_metadata::provider::{LoadError, MetadataProvider, ModuleMetadata};
use refconflict_util::fs::find_module_file;
use thiserror::Error;

use crate::cache::ModuleTable;
use crate::graph::{ModuleNode, ReferenceEdge, ReferenceGraph};

/// Fatal errors of a build. Failures to load referenced modules are not
/// errors; they become `Missing` nodes.
#[derive(Debug, Error, Diagnostic)]
pub enum BuildError {
    #[error("Input not found: {}", .path.display())]
    #[diagnostic(help("Pass the path of an existing .dll or .exe"))]
    InputNotFound { path: PathBuf },

    #[error("Cannot read entry module {}", .path.display())]
    #[diagnostic(help("The entry file must be a .NET assembly with a manifest"))]
    EntryUnreadable {
        path: PathBuf,
        #[source]
        source: LoadError,
    },
}

/// A node whose references are still being walked.
struct Frame {
    node: NodeIndex,
    pending: std::vec::IntoIter<ModuleIdentity>,
}

/// Builds reference graphs using a [`MetadataProvider`].
pub struct GraphBuilder<P> {
    provider: P,
    extensions: Vec<String>,
}

impl<P: MetadataProvider> GraphBuilder<P> {
    pub fn new(provider: P) -> Self {
        Self {
            provider,
            extensions: vec!["dll".to_string(), "exe".to_string()],
        }
    }

    /// File extensions tried in the entry directory, in priority order.
    pub fn with_extensions(mut self, extensions: Vec<String>) -> Self {
        self.extensions = extensions;
        self
    }

    /// Discover every module reachable from `entry`.
    ///
    /// References whose name matches `should_skip` are dropped together with
    /// everything reachable only through them. Each distinct full name is
    /// loaded and expanded at most once, so cycles and shared dependencies
    /// cost one load per module.
    pub fn build<F>(&self, entry: &Path, should_skip: F) -> Result<ReferenceGraph, BuildError>
    where
        F: Fn(&str) -> bool,
    {
        if !entry.is_file() {
            return Err(BuildError::InputNotFound {
                path: entry.to_path_buf(),
            });
        }
        let entry_dir = match entry.parent() {
            Some(dir) if !dir.as_os_str().is_empty() => dir.to_path_buf(),
            _ => PathBuf::from("."),
        };

        let metadata =
            self.provider
                .load_metadata(entry)
                .map_err(|source| BuildError::EntryUnreadable {
                    path: entry.to_path_buf(),
                    source,
                })?;
        tracing::info!("building reference graph for {}", metadata.identity);

        let mut graph = ReferenceGraph::new(metadata.identity.clone());
        let mut table = ModuleTable::new();
        table.register(metadata.identity.full_name(), graph.entry());

        let mut stack = vec![Frame {
            node: graph.entry(),
            pending: metadata.references.into_iter(),
        }];

        while let Some(frame) = stack.last_mut() {
            let Some(reference) = frame.pending.next() else {
                stack.pop();
                continue;
            };
            let from = frame.node;
            let edge = ReferenceEdge {
                requested: reference.version(),
            };

            if should_skip(reference.name()) {
                tracing::trace!("skipping {}", reference.name());
                continue;
            }

            if let Some(existing) = table.get(reference.full_name()) {
                tracing::trace!("already seen {reference}");
                graph.add_edge(from, existing, edge);
                continue;
            }

            match self.load_reference(&entry_dir, &reference) {
                Ok(loaded) => {
                    let authoritative = loaded.identity.full_name().to_string();
                    if let Some(existing) = table.get(&authoritative) {
                        tracing::debug!("{reference} resolved to known module {authoritative}");
                        table.register(reference.full_name(), existing);
                        graph.add_edge(from, existing, edge);
                        continue;
                    }

                    let idx = graph.add_node(ModuleNode::normal(loaded.identity));
                    table.register(&authoritative, idx);
                    table.register(reference.full_name(), idx);
                    graph.add_edge(from, idx, edge);
                    stack.push(Frame {
                        node: idx,
                        pending: loaded.references.into_iter(),
                    });
                }
                Err(e) => {
                    tracing::warn!("missing {reference}: {e}");
                    let idx = graph.add_node(ModuleNode::missing(reference.clone(), e.to_string()));
                    table.register(reference.full_name(), idx);
                    graph.add_edge(from, idx, edge);
                }
            }
        }

        tracing::info!(
            "discovered {} module(s) and {} reference(s)",
            graph.node_count(),
            graph.edge_count()
        );
        tracing::debug!("{} full name(s) mapped to nodes", table.len());
        Ok(graph)
    }

    /// Load a referenced module: a same-named file next to the entry wins,
    /// otherwise the provider's global lookup by full name.
    fn load_reference(
        &self,
        entry_dir: &Path,
        reference: &ModuleIdentity,
    ) -> Result<ModuleMetadata, LoadError> {
        match find_module_file(entry_dir, reference.name(), &self.extensions) {
            Ok(Some(path)) => {
                tracing::debug!("loading {} from {}", reference.name(), path.display());
                self.provider.load_metadata(&path)
            }
            Ok(None) => {
                tracing::debug!("resolving {reference} globally");
                self.provider.resolve_by_full_name(reference.full_name())
            }
            Err(e) => {
                tracing::debug!("cannot list {}: {e}", entry_dir.display());
                self.provider.resolve_by_full_name(reference.full_name())
            }
        }
    }
}
