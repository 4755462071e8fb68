//! .NET assembly metadata through `dotscope`.

use std::path::Path;

use dotscope::metadata::identity::Identity;
use dotscope::metadata::tables::AssemblyHashAlgorithm;
use dotscope::CilObject;
use refconflict_core::identity::ModuleIdentity;
use refconflict_core::version::ModuleVersion;
use refconflict_util::hex::to_hex;

use crate::probe::GlobalProbe;
use crate::provider::{LoadError, MetadataProvider, ModuleMetadata};

/// Display form of a strong-name identifier: the 8-byte public-key token
/// as lowercase hex. A full key is hashed with SHA-1; a stored token is
/// already in display byte order.
fn token_hex(identifier: &Identity) -> Option<String> {
    match identifier {
        Identity::PubKey(key) if key.is_empty() => None,
        Identity::PubKey(_) => match identifier.to_token(AssemblyHashAlgorithm::SHA1) {
            Ok(token) => Some(to_hex(&token.to_be_bytes())),
            Err(e) => {
                tracing::debug!("cannot derive public key token: {e}");
                None
            }
        },
        Identity::Token(token) => Some(to_hex(&token.to_le_bytes())),
    }
}

fn module_identity(
    name: &str,
    version: ModuleVersion,
    culture: Option<String>,
    identifier: Option<&Identity>,
) -> ModuleIdentity {
    ModuleIdentity::new(name, version, culture, identifier.and_then(token_hex))
}

/// Reads the `Assembly` and `AssemblyRef` metadata tables of PE files.
#[derive(Debug, Clone, Default)]
pub struct DotnetProvider {
    probe: GlobalProbe,
}

impl DotnetProvider {
    pub fn new(probe: GlobalProbe) -> Self {
        Self { probe }
    }
}

impl MetadataProvider for DotnetProvider {
    fn load_metadata(&self, path: &Path) -> Result<ModuleMetadata, LoadError> {
        tracing::debug!("reading metadata from {}", path.display());
        let data = std::fs::read(path).map_err(|source| LoadError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let object = CilObject::from_mem(data).map_err(|e| LoadError::Invalid {
            path: path.to_path_buf(),
            message: e.to_string(),
        })?;
        let assembly = object.assembly().ok_or_else(|| LoadError::NoManifest {
            path: path.to_path_buf(),
        })?;

        let identity = module_identity(
            &assembly.name,
            ModuleVersion::new(
                assembly.major_version,
                assembly.minor_version,
                assembly.build_number,
                assembly.revision_number,
            ),
            assembly.culture.clone(),
            assembly
                .public_key
                .as_ref()
                .map(|key| Identity::PubKey(key.clone()))
                .as_ref(),
        );

        let references = object
            .refs_assembly()
            .iter()
            .map(|entry| {
                let reference = entry.value();
                module_identity(
                    &reference.name,
                    ModuleVersion::new(
                        reference.major_version,
                        reference.minor_version,
                        reference.build_number,
                        reference.revision_number,
                    ),
                    reference.culture.clone(),
                    reference.identifier.as_ref(),
                )
            })
            .collect();

        Ok(ModuleMetadata {
            identity,
            references,
        })
    }

    fn resolve_by_full_name(&self, full_name: &str) -> Result<ModuleMetadata, LoadError> {
        let requested: ModuleIdentity = full_name.parse().map_err(|source| LoadError::BadName {
            full_name: full_name.to_string(),
            source,
        })?;

        for candidate in self.probe.candidates(&requested) {
            match self.load_metadata(&candidate) {
                Ok(metadata) if metadata.identity.satisfies(&requested) => {
                    tracing::debug!("resolved {full_name} to {}", candidate.display());
                    return Ok(metadata);
                }
                Ok(metadata) => tracing::debug!(
                    "{} holds {}, not {full_name}",
                    candidate.display(),
                    metadata.identity
                ),
                Err(e) => tracing::debug!("skipping {}: {e}", candidate.display()),
            }
        }

        Err(LoadError::NotFound {
            full_name: full_name.to_string(),
            searched: self.probe.roots().len(),
        })
    }
}
