//! Policies for leaving references out of the graph.

use refconflict_core::config::SkipConfig;

/// Skips references by exact module name or name prefix, both compared
/// ASCII case-insensitively.
///
/// The default policy skips the .NET base class library (`mscorlib`,
/// `System`, `System.*`).
#[derive(Debug, Clone)]
pub struct SkipPolicy {
    names: Vec<String>,
    prefixes: Vec<String>,
}

impl SkipPolicy {
    pub fn new(names: Vec<String>, prefixes: Vec<String>) -> Self {
        Self { names, prefixes }
    }

    /// A policy that skips nothing.
    pub fn none() -> Self {
        Self::new(Vec::new(), Vec::new())
    }

    pub fn from_config(config: &SkipConfig) -> Self {
        if !config.enabled {
            return Self::none();
        }
        Self::new(config.names.clone(), config.prefixes.clone())
    }

    /// Add a name to skip.
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.names.push(name.into());
        self
    }

    /// Add a prefix to skip.
    pub fn with_prefix(mut self, prefix: impl Into<String>) -> Self {
        self.prefixes.push(prefix.into());
        self
    }

    pub fn matches(&self, name: &str) -> bool {
        self.names.iter().any(|n| n.eq_ignore_ascii_case(name))
            || self.prefixes.iter().any(|p| {
                name.len() >= p.len()
                    && name.is_char_boundary(p.len())
                    && name[..p.len()].eq_ignore_ascii_case(p)
            })
    }
}

impl Default for SkipPolicy {
    fn default() -> Self {
        Self::from_config(&SkipConfig::default())
    }
}
