use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use refconflict_util::errors::RefConflictError;

/// Global user configuration loaded from `~/.refconflict/config.toml`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GlobalConfig {
    #[serde(default)]
    pub skip: SkipConfig,

    #[serde(default)]
    pub probe: ProbeConfig,

    #[serde(default)]
    pub output: OutputConfig,
}

/// Which references are left out of the graph, from `[skip]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SkipConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    /// Module names skipped on exact (case-insensitive) match.
    #[serde(default = "default_skip_names")]
    pub names: Vec<String>,
    /// Module name prefixes skipped on (case-insensitive) prefix match.
    #[serde(default = "default_skip_prefixes")]
    pub prefixes: Vec<String>,
}

impl Default for SkipConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            names: default_skip_names(),
            prefixes: default_skip_prefixes(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_skip_names() -> Vec<String> {
    vec!["mscorlib".to_string(), "System".to_string()]
}

fn default_skip_prefixes() -> Vec<String> {
    vec!["System.".to_string()]
}

/// How referenced modules are located, from `[probe]`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProbeConfig {
    /// File extensions tried next to the entry module, in priority order.
    #[serde(default = "default_extensions")]
    pub extensions: Vec<String>,
    /// Roots searched when a module is resolved by its full name.
    /// Both flat directories and GAC-style layouts are understood.
    #[serde(default = "default_probe_paths")]
    pub paths: Vec<PathBuf>,
}

impl Default for ProbeConfig {
    fn default() -> Self {
        Self {
            extensions: default_extensions(),
            paths: default_probe_paths(),
        }
    }
}

fn default_extensions() -> Vec<String> {
    vec!["dll".to_string(), "exe".to_string()]
}

/// Well-known global assembly cache locations for the host platform.
pub fn default_probe_paths() -> Vec<PathBuf> {
    let paths: &[&str] = if cfg!(windows) {
        &[
            r"C:\Windows\Microsoft.NET\assembly\GAC_MSIL",
            r"C:\Windows\Microsoft.NET\assembly\GAC_32",
            r"C:\Windows\Microsoft.NET\assembly\GAC_64",
            r"C:\Windows\assembly\GAC_MSIL",
            r"C:\Windows\assembly\GAC",
        ]
    } else {
        &[
            "/usr/lib/mono/gac",
            "/usr/lib/mono/4.5",
            "/Library/Frameworks/Mono.framework/Versions/Current/lib/mono/gac",
        ]
    };
    paths.iter().map(PathBuf::from).collect()
}

/// Presentation settings from `[output]`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OutputConfig {
    #[serde(default)]
    pub format: OutputFormat,
}

/// How an analysed graph is presented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Reference list followed by module list.
    #[default]
    Text,
    /// Indented tree from the entry point.
    Tree,
    /// Directed Graph Markup Language document.
    Dgml,
    /// JSON document with nodes and edges.
    Json,
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            OutputFormat::Text => "text",
            OutputFormat::Tree => "tree",
            OutputFormat::Dgml => "dgml",
            OutputFormat::Json => "json",
        };
        f.write_str(s)
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "text" => Ok(OutputFormat::Text),
            "tree" => Ok(OutputFormat::Tree),
            "dgml" => Ok(OutputFormat::Dgml),
            "json" => Ok(OutputFormat::Json),
            other => Err(format!(
                "unknown output format '{other}' (expected text, tree, dgml or json)"
            )),
        }
    }
}

impl GlobalConfig {
    /// Load the global configuration from `~/.refconflict/config.toml`, or return defaults if the file doesn't exist.
    pub fn load() -> miette::Result<Self> {
        let path = Self::default_path();
        if path.is_file() {
            Self::load_from(&path)
        } else {
            tracing::debug!("no config at {}, using defaults", path.display());
            Ok(Self::default())
        }
    }

    /// Load configuration from an explicit path. The file must exist.
    pub fn load_from(path: &Path) -> miette::Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| RefConflictError::Config {
            message: format!("Failed to read {}: {e}", path.display()),
        })?;
        toml::from_str(&content).map_err(|e| {
            RefConflictError::Config {
                message: format!("Failed to parse {}: {e}", path.display()),
            }
            .into()
        })
    }

    /// Returns the default path to the global config file.
    pub fn default_path() -> PathBuf {
        dirs_path().join("config.toml")
    }
}

/// Returns the path to the refconflict data directory (`~/.refconflict/`).
pub fn dirs_path() -> PathBuf {
    let home = std::env::var("HOME")
        .or_else(|_| std::env::var("USERPROFILE"))
        .unwrap_or_else(|_| ".".to_string());
    Path::new(&home).join(".refconflict")
}
