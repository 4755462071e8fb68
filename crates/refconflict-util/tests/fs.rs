use refconflict_util::fs::{ensure_dir, find_module_file, first_existing_file};
use tempfile::TempDir;

fn exts() -> Vec<String> {
    vec!["dll".to_string(), "exe".to_string()]
}

#[test]
fn test_find_module_file_prefers_first_extension() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("Lib.exe"), "").unwrap();
    std::fs::write(tmp.path().join("Lib.dll"), "").unwrap();
    let found = find_module_file(tmp.path(), "Lib", &exts()).unwrap();
    assert_eq!(found, Some(tmp.path().join("Lib.dll")));
}

#[test]
fn test_find_module_file_ignores_other_extensions() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("Lib.pdb"), "").unwrap();
    std::fs::write(tmp.path().join("Lib.xml"), "").unwrap();
    let found = find_module_file(tmp.path(), "Lib", &exts()).unwrap();
    assert_eq!(found, None);
}

#[test]
fn test_find_module_file_is_case_insensitive() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("newtonsoft.json.DLL"), "").unwrap();
    let found = find_module_file(tmp.path(), "Newtonsoft.Json", &exts()).unwrap();
    assert_eq!(found, Some(tmp.path().join("newtonsoft.json.DLL")));
}

#[test]
fn test_find_module_file_requires_exact_stem() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("Lib.Extra.dll"), "").unwrap();
    let found = find_module_file(tmp.path(), "Lib", &exts()).unwrap();
    assert_eq!(found, None);
}

#[test]
fn test_first_existing_file() {
    let tmp = TempDir::new().unwrap();
    std::fs::write(tmp.path().join("b.config"), "").unwrap();
    let found = first_existing_file([tmp.path().join("a.config"), tmp.path().join("b.config")]);
    assert_eq!(found, Some(tmp.path().join("b.config")));
}

#[test]
fn test_ensure_dir_creates_nested() {
    let tmp = TempDir::new().unwrap();
    let deep = tmp.path().join("x").join("y").join("z");
    assert!(!deep.exists());
    ensure_dir(&deep).unwrap();
    assert!(deep.is_dir());
}

#[test]
fn test_ensure_dir_idempotent() {
    let tmp = TempDir::new().unwrap();
    let dir = tmp.path().join("already");
    std::fs::create_dir(&dir).unwrap();
    ensure_dir(&dir).unwrap();
    assert!(dir.is_dir());
}
