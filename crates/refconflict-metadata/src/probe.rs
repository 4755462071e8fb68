//! Global lookup of modules by full name.
//!
//! A probe root is either a flat directory of modules (`/usr/lib/mono/4.5`)
//! or a global assembly cache laid out as
//! `<root>/<Name>/<prefix?><Version>_<Culture>_<Token>/<Name>.dll`, where the
//! optional prefix is a runtime marker such as `v4.0_`.

use std::path::{Path, PathBuf};

use refconflict_core::identity::ModuleIdentity;
use refconflict_util::fs::find_module_file;

/// Candidate locator over a list of probe roots.
#[derive(Debug, Clone, Default)]
pub struct GlobalProbe {
    roots: Vec<PathBuf>,
    extensions: Vec<String>,
}

impl GlobalProbe {
    /// Roots that do not exist are dropped.
    pub fn new(roots: impl IntoIterator<Item = PathBuf>, extensions: Vec<String>) -> Self {
        let roots = roots
            .into_iter()
            .filter(|r| {
                let ok = r.is_dir();
                if !ok {
                    tracing::debug!("ignoring probe root {} (not a directory)", r.display());
                }
                ok
            })
            .collect();
        Self { roots, extensions }
    }

    pub fn roots(&self) -> &[PathBuf] {
        &self.roots
    }

    /// Existing files that may hold `requested`, most specific first.
    ///
    /// Candidates still have to be loaded and checked against the request.
    pub fn candidates(&self, requested: &ModuleIdentity) -> Vec<PathBuf> {
        let mut found = Vec::new();
        for root in &self.roots {
            found.extend(self.gac_candidates(root, requested));
            match find_module_file(root, requested.name(), &self.extensions) {
                Ok(Some(path)) => found.push(path),
                Ok(None) => {}
                Err(e) => tracing::debug!("cannot list {}: {e}", root.display()),
            }
        }
        found
    }

    fn gac_candidates(&self, root: &Path, requested: &ModuleIdentity) -> Vec<PathBuf> {
        let name_dir = root.join(requested.name());
        let Ok(entries) = std::fs::read_dir(&name_dir) else {
            return Vec::new();
        };
        let version_prefix = format!("{}_", requested.version());
        let mut found = Vec::new();
        for entry in entries.flatten() {
            let dir = entry.path();
            if !dir.is_dir() {
                continue;
            }
            let folder = entry.file_name().to_string_lossy().into_owned();
            if !gac_folder_matches(&folder, &version_prefix) {
                continue;
            }
            if let Ok(Some(path)) = find_module_file(&dir, requested.name(), &self.extensions) {
                found.push(path);
            }
        }
        found.sort();
        found
    }
}

/// `4.0.0.0__b77a5c561934e089` or `v4.0_4.0.0.0__b77a5c561934e089`.
fn gac_folder_matches(folder: &str, version_prefix: &str) -> bool {
    if folder.starts_with(version_prefix) {
        return true;
    }
    folder
        .strip_prefix('v')
        .and_then(|rest| rest.split_once('_'))
        .is_some_and(|(_, rest)| rest.starts_with(version_prefix))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn exts() -> Vec<String> {
        vec!["dll".to_string(), "exe".to_string()]
    }

    #[test]
    fn gac_folder_patterns() {
        assert!(gac_folder_matches("4.0.0.0__b77a5c561934e089", "4.0.0.0_"));
        assert!(gac_folder_matches("v4.0_4.0.0.0__b77a5c561934e089", "4.0.0.0_"));
        assert!(!gac_folder_matches("4.0.0.1__b77a5c561934e089", "4.0.0.0_"));
        assert!(!gac_folder_matches("v4.0_4.0.0.1__b77a5c561934e089", "4.0.0.0_"));
    }

    #[test]
    fn missing_roots_are_dropped() {
        let tmp = TempDir::new().unwrap();
        let probe = GlobalProbe::new(
            [tmp.path().to_path_buf(), tmp.path().join("nope")],
            exts(),
        );
        assert_eq!(probe.roots(), &[tmp.path().to_path_buf()]);
    }

    #[test]
    fn finds_gac_and_flat_candidates() {
        let tmp = TempDir::new().unwrap();
        let gac = tmp.path().join("Lib").join("v4.0_2.0.0.0__0123456789abcdef");
        std::fs::create_dir_all(&gac).unwrap();
        std::fs::write(gac.join("Lib.dll"), "").unwrap();
        let other = tmp.path().join("Lib").join("1.0.0.0__0123456789abcdef");
        std::fs::create_dir_all(&other).unwrap();
        std::fs::write(other.join("Lib.dll"), "").unwrap();
        std::fs::write(tmp.path().join("Lib.dll"), "").unwrap();

        let probe = GlobalProbe::new([tmp.path().to_path_buf()], exts());
        let requested: ModuleIdentity = "Lib, Version=2.0.0.0".parse().unwrap();
        let found = probe.candidates(&requested);
        assert_eq!(found, vec![gac.join("Lib.dll"), tmp.path().join("Lib.dll")]);
    }
}
