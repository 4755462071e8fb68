//! Binding-redirect rules.

use std::fmt;

use crate::version::{ModuleVersion, VersionRange};

/// A rule stating "requests for `name` in `old_versions` are satisfied by
/// `new_version` instead".
///
/// `public_key_token` and `culture` are carried over from the configuration
/// file and shown by `Display`; rules are matched by name and version only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BindingRedirect {
    pub name: String,
    pub public_key_token: Option<String>,
    pub culture: Option<String>,
    pub old_versions: VersionRange,
    pub new_version: ModuleVersion,
}

impl BindingRedirect {
    pub fn new(name: impl Into<String>, old_versions: VersionRange, new_version: ModuleVersion) -> Self {
        Self {
            name: name.into(),
            public_key_token: None,
            culture: None,
            old_versions,
            new_version,
        }
    }

    /// Whether the rule targets the module `name` (case-insensitive).
    pub fn applies_to(&self, name: &str) -> bool {
        self.name.eq_ignore_ascii_case(name)
    }

    /// Whether requests for `name` at `version` are redirected by this rule.
    pub fn covers(&self, name: &str, version: &ModuleVersion) -> bool {
        self.applies_to(name) && self.old_versions.contains(version)
    }

    /// Whether this rule sends `name` at `from` to exactly `to`.
    pub fn redirects(&self, name: &str, from: &ModuleVersion, to: &ModuleVersion) -> bool {
        self.covers(name, from) && self.new_version == *to
    }
}

impl fmt::Display for BindingRedirect {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.name)?;
        if let Some(culture) = &self.culture {
            write!(f, ", Culture={culture}")?;
        }
        if let Some(token) = &self.public_key_token {
            write!(f, ", PublicKeyToken={token}")?;
        }
        write!(f, ": {} -> {}", self.old_versions, self.new_version)
    }
}
