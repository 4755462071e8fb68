//! The metadata provider seam.

use std::path::{Path, PathBuf};

use refconflict_core::identity::{IdentityParseError, ModuleIdentity};
use thiserror::Error;

/// What a provider reports about one module: its own identity and the
/// identities it requests, in declaration order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleMetadata {
    pub identity: ModuleIdentity,
    pub references: Vec<ModuleIdentity>,
}

/// Why a module could not be loaded. The display text is what a `Missing`
/// node records as its failure reason.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("could not locate '{full_name}' (searched {searched} location(s))")]
    NotFound { full_name: String, searched: usize },

    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{} is not a readable module: {message}", .path.display())]
    Invalid { path: PathBuf, message: String },

    #[error("{} has no assembly manifest", .path.display())]
    NoManifest { path: PathBuf },

    #[error("invalid module name '{full_name}': {source}")]
    BadName {
        full_name: String,
        #[source]
        source: IdentityParseError,
    },
}

/// Reads module identities and reference lists.
///
/// Implementations must be deterministic for a given input: the graph
/// builder calls each method at most once per distinct module.
pub trait MetadataProvider {
    /// Load the module stored at `path`.
    fn load_metadata(&self, path: &Path) -> Result<ModuleMetadata, LoadError>;

    /// Locate and load a module by its full name, without a file path.
    fn resolve_by_full_name(&self, full_name: &str) -> Result<ModuleMetadata, LoadError>;
}

impl<P: MetadataProvider + ?Sized> MetadataProvider for &P {
    fn load_metadata(&self, path: &Path) -> Result<ModuleMetadata, LoadError> {
        (**self).load_metadata(path)
    }

    fn resolve_by_full_name(&self, full_name: &str) -> Result<ModuleMetadata, LoadError> {
        (**self).resolve_by_full_name(full_name)
    }
}
