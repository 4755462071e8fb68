use std::collections::HashMap;
use std::path::{Path, PathBuf};

use refconflict_core::config::{GlobalConfig, OutputFormat};
use refconflict_metadata::provider::{LoadError, MetadataProvider, ModuleMetadata};
use refconflict_ops::ops_analyze::{analyze_with, render, skip_policy, AnalyzeOptions};
use refconflict_ops::render as present;
use refconflict_resolver::graph::Category;
use tempfile::TempDir;

/// Looks modules up by file stem; nothing resolves globally.
struct StemProvider(HashMap<String, ModuleMetadata>);

impl StemProvider {
    fn new() -> Self {
        Self(HashMap::new())
    }

    fn with(mut self, identity: &str, references: &[&str]) -> Self {
        let metadata = ModuleMetadata {
            identity: identity.parse().unwrap(),
            references: references.iter().map(|r| r.parse().unwrap()).collect(),
        };
        self.0
            .insert(metadata.identity.name().to_ascii_lowercase(), metadata);
        self
    }
}

impl MetadataProvider for StemProvider {
    fn load_metadata(&self, path: &Path) -> Result<ModuleMetadata, LoadError> {
        let stem = path
            .file_stem()
            .and_then(|s| s.to_str())
            .unwrap_or_default()
            .to_ascii_lowercase();
        self.0.get(&stem).cloned().ok_or_else(|| LoadError::Invalid {
            path: path.to_path_buf(),
            message: "bad image".to_string(),
        })
    }

    fn resolve_by_full_name(&self, full_name: &str) -> Result<ModuleMetadata, LoadError> {
        Err(LoadError::NotFound {
            full_name: full_name.to_string(),
            searched: 0,
        })
    }
}

/// App -> Lib, App -> Json 6, Lib -> Json 13, App -> Gone (missing).
fn fixture() -> (TempDir, PathBuf, StemProvider) {
    let dir = TempDir::new().unwrap();
    for f in ["App.exe", "Lib.dll", "Json.dll", "Json13.dll"] {
        std::fs::write(dir.path().join(f), b"MZ").unwrap();
    }
    let provider = StemProvider::new()
        .with(
            "App, Version=1.0.0.0",
            &[
                "Lib, Version=1.0.0.0",
                "Json, Version=6.0.0.0",
                "Gone, Version=1.0.0.0",
            ],
        )
        .with("Lib, Version=1.0.0.0", &["Json13, Version=13.0.0.0"])
        .with("Json, Version=6.0.0.0", &[])
        .with("Json13, Version=13.0.0.0", &[]);
    let entry = dir.path().join("App.exe");
    (dir, entry, provider)
}

/// App -> X 1.0, App -> Lib -> X 2.0, with both X versions found globally.
struct ConflictProvider(StemProvider, Vec<ModuleMetadata>);

impl MetadataProvider for ConflictProvider {
    fn load_metadata(&self, path: &Path) -> Result<ModuleMetadata, LoadError> {
        self.0.load_metadata(path)
    }

    fn resolve_by_full_name(&self, full_name: &str) -> Result<ModuleMetadata, LoadError> {
        match self.1.iter().find(|m| m.identity.full_name() == full_name) {
            Some(metadata) => Ok(metadata.clone()),
            None => self.0.resolve_by_full_name(full_name),
        }
    }
}

fn conflict_fixture(app_config: Option<&str>) -> (TempDir, PathBuf, ConflictProvider) {
    let dir = TempDir::new().unwrap();
    for f in ["App.exe", "Lib.dll"] {
        std::fs::write(dir.path().join(f), b"MZ").unwrap();
    }
    if let Some(xml) = app_config {
        std::fs::write(dir.path().join("App.exe.config"), xml).unwrap();
    }
    let stems = StemProvider::new()
        .with(
            "App, Version=1.0.0.0",
            &["X, Version=1.0.0.0", "Lib, Version=1.0.0.0"],
        )
        .with("Lib, Version=1.0.0.0", &["X, Version=2.0.0.0"]);
    let global = ["X, Version=1.0.0.0", "X, Version=2.0.0.0"]
        .iter()
        .map(|name| ModuleMetadata {
            identity: name.parse().unwrap(),
            references: Vec::new(),
        })
        .collect();
    let entry = dir.path().join("App.exe");
    (dir, entry, ConflictProvider(stems, global))
}

const REDIRECT: &str = r#"<?xml version="1.0"?>
<configuration>
  <runtime>
    <assemblyBinding xmlns="urn:schemas-microsoft-com:asm.v1">
      <dependentAssembly>
        <assemblyIdentity name="X" />
        <bindingRedirect oldVersion="0.0.0.0-1.65535.65535.65535" newVersion="2.0.0.0" />
      </dependentAssembly>
    </assemblyBinding>
  </runtime>
</configuration>
"#;

#[test]
fn conflict_without_redirects_is_conflicted() {
    let (_dir, entry, provider) = conflict_fixture(None);
    let analysis =
        analyze_with(&entry, &AnalyzeOptions::default(), &GlobalConfig::default(), provider).unwrap();

    assert!(analysis.config_file.is_none());
    assert_eq!(analysis.report.unresolved_count(), 1);
    assert_eq!(analysis.graph.count(Category::Conflicted), 2);
}

#[test]
fn suggested_app_config_resolves_conflict() {
    let (_dir, entry, provider) = conflict_fixture(Some(REDIRECT));
    let analysis =
        analyze_with(&entry, &AnalyzeOptions::default(), &GlobalConfig::default(), provider).unwrap();

    assert!(analysis.config_file.is_some());
    assert_eq!(analysis.redirects.len(), 1);
    assert_eq!(analysis.report.unresolved_count(), 0);
    assert_eq!(analysis.graph.count(Category::ConflictResolved), 1);
    assert_eq!(analysis.graph.count(Category::Conflicted), 0);
}

#[test]
fn explicit_app_config_must_exist() {
    let (dir, entry, provider) = conflict_fixture(None);
    let opts = AnalyzeOptions {
        app_config: Some(dir.path().join("missing.config")),
        ..Default::default()
    };
    let err = analyze_with(&entry, &opts, &GlobalConfig::default(), provider).unwrap_err();
    assert!(err.to_string().contains("missing.config"));
}

#[test]
fn missing_entry_fails() {
    let dir = TempDir::new().unwrap();
    let provider = StemProvider::new();
    let err = analyze_with(
        &dir.path().join("Nope.exe"),
        &AnalyzeOptions::default(),
        &GlobalConfig::default(),
        provider,
    )
    .unwrap_err();
    assert!(err.to_string().contains("Input not found"));
}

#[test]
fn text_lists_references_and_modules() {
    let (_dir, entry, provider) = fixture();
    let analysis =
        analyze_with(&entry, &AnalyzeOptions::default(), &GlobalConfig::default(), provider).unwrap();
    let out = render(&analysis, OutputFormat::Text).unwrap();

    assert!(out.starts_with("References:\n"));
    assert!(out.contains("App 1.0.0.0 -> Lib 1.0.0.0 (requested 1.0.0.0)\n"));
    assert!(out.contains("Lib 1.0.0.0 -> Json13 13.0.0.0 (requested 13.0.0.0)\n"));
    assert!(out.contains("\nModules:\n"));
    assert!(out.contains("App 1.0.0.0: Entry point\n"));
    assert!(out.contains("Gone 1.0.0.0: Missing (could not locate"));
}

#[test]
fn dgml_has_nodes_links_and_styles() {
    let (_dir, entry, provider) = fixture();
    let analysis =
        analyze_with(&entry, &AnalyzeOptions::default(), &GlobalConfig::default(), provider).unwrap();
    let out = render(&analysis, OutputFormat::Dgml).unwrap();

    assert!(out.starts_with("<?xml version=\"1.0\" encoding=\"utf-8\"?>"));
    assert!(out.contains("GraphDirection=\"BottomToTop\""));
    assert!(out.contains(
        "Id=\"app, version=1.0.0.0, culture=neutral, publickeytoken=null\" Label=\"App 1.0.0.0\" Category=\"EntryPoint\""
    ));
    assert_eq!(out.matches("<Node ").count(), analysis.graph.node_count());
    assert_eq!(out.matches("<Link ").count(), analysis.graph.edge_count());
    assert!(out.contains("Value=\"LightSalmon\""));
    assert_eq!(out.matches("<Style ").count(), 5);
}

#[test]
fn json_document_shape() {
    let (_dir, entry, provider) = fixture();
    let analysis =
        analyze_with(&entry, &AnalyzeOptions::default(), &GlobalConfig::default(), provider).unwrap();
    let out = render(&analysis, OutputFormat::Json).unwrap();
    let doc: serde_json::Value = serde_json::from_str(&out).unwrap();

    assert_eq!(
        doc["entry"],
        "App, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null"
    );
    assert_eq!(doc["nodes"].as_array().unwrap().len(), 5);
    assert_eq!(doc["edges"].as_array().unwrap().len(), 4);
    let gone = doc["nodes"]
        .as_array()
        .unwrap()
        .iter()
        .find(|n| n["name"] == "Gone")
        .unwrap();
    assert_eq!(gone["category"], "Missing");
    assert!(gone["failure"].is_string());
}

#[test]
fn why_prints_chain() {
    let (_dir, entry, provider) = fixture();
    let analysis =
        analyze_with(&entry, &AnalyzeOptions::default(), &GlobalConfig::default(), provider).unwrap();

    let chain = present::why(&analysis.graph, "json13").unwrap();
    assert_eq!(
        chain,
        "App 1.0.0.0 [EntryPoint]\n  Lib 1.0.0.0\n    Json13 13.0.0.0\n"
    );
    assert!(present::why(&analysis.graph, "Nowhere").is_none());
}

#[test]
fn referrers_list_direct_dependents() {
    let (_dir, entry, provider) = conflict_fixture(None);
    let analysis =
        analyze_with(&entry, &AnalyzeOptions::default(), &GlobalConfig::default(), provider).unwrap();

    assert_eq!(
        present::referrers(&analysis.graph, "Lib").unwrap(),
        "  App 1.0.0.0 (requested 1.0.0.0)\n"
    );
    assert_eq!(
        present::referrers(
            &analysis.graph,
            "X, Version=2.0.0.0, Culture=neutral, PublicKeyToken=null"
        )
        .unwrap(),
        "  Lib 1.0.0.0 (requested 2.0.0.0)\n"
    );
    assert_eq!(present::referrers(&analysis.graph, "app").unwrap(), "");
    assert!(present::referrers(&analysis.graph, "Nowhere").is_none());
}

#[test]
fn command_line_skips_extend_config() {
    let (_dir, entry, provider) = fixture();
    let opts = AnalyzeOptions {
        skip_names: vec!["lib".to_string()],
        ..Default::default()
    };
    let analysis = analyze_with(&entry, &opts, &GlobalConfig::default(), provider).unwrap();
    assert!(analysis.graph.find_by_name("Lib").is_empty());
    assert!(analysis.graph.find_by_name("Json13").is_empty());
}

#[test]
fn no_skip_disables_configured_names() {
    let opts = AnalyzeOptions {
        no_skip: true,
        skip_prefixes: vec!["Contoso.".to_string()],
        ..Default::default()
    };
    let policy = skip_policy(&opts, &GlobalConfig::default());
    assert!(!policy.matches("System.Xml"));
    assert!(!policy.matches("mscorlib"));
    assert!(policy.matches("Contoso.Billing"));
}
