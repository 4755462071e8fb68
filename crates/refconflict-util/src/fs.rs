use std::path::{Path, PathBuf};

/// Look in `dir` (non-recursively) for a file named `<name>.<ext>` whose
/// extension appears in `extensions`.
///
/// Names and extensions compare ASCII case-insensitively. When several files
/// qualify, the one whose extension comes first in `extensions` wins.
pub fn find_module_file(
    dir: &Path,
    name: &str,
    extensions: &[String],
) -> std::io::Result<Option<PathBuf>> {
    let mut best: Option<(usize, PathBuf)> = None;
    for entry in std::fs::read_dir(dir)? {
        let path = entry?.path();
        if !path.is_file() {
            continue;
        }
        let (Some(stem), Some(ext)) = (
            path.file_stem().and_then(|s| s.to_str()),
            path.extension().and_then(|s| s.to_str()),
        ) else {
            continue;
        };
        if !stem.eq_ignore_ascii_case(name) {
            continue;
        }
        let Some(rank) = extensions.iter().position(|e| e.eq_ignore_ascii_case(ext)) else {
            continue;
        };
        if best.as_ref().map_or(true, |(r, _)| rank < *r) {
            best = Some((rank, path));
        }
    }
    if let Some((_, path)) = &best {
        tracing::trace!("{name} found at {}", path.display());
    }
    Ok(best.map(|(_, path)| path))
}

/// Return the first path in `candidates` that is an existing file.
pub fn first_existing_file<I>(candidates: I) -> Option<PathBuf>
where
    I: IntoIterator<Item = PathBuf>,
{
    candidates.into_iter().find(|p| p.is_file())
}

/// Ensure a directory exists, creating it and any parents if needed.
pub fn ensure_dir(path: &Path) -> std::io::Result<()> {
    if !path.exists() {
        std::fs::create_dir_all(path)?;
    }
    Ok(())
}
