//! Module identities and their full-name keys.

use std::fmt;
use std::str::FromStr;

use thiserror::Error;

use crate::version::{ModuleVersion, VersionParseError};

/// The identity of a module: name, version, culture and public-key token.
///
/// The full name (`Name, Version=1.0.0.0, Culture=neutral, PublicKeyToken=null`)
/// is computed once and is the key under which a module is tracked during a
/// traversal. Two identities with equal full names are the same module.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ModuleIdentity {
    name: String,
    version: ModuleVersion,
    culture: Option<String>,
    public_key_token: Option<String>,
    full_name: String,
}

/// Error returned when a full name cannot be parsed into an identity.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum IdentityParseError {
    #[error("module full name is empty")]
    EmptyName,
    #[error("module full name '{0}' has no Version")]
    MissingVersion(String),
    #[error("malformed attribute '{attribute}' in '{input}'")]
    Attribute { input: String, attribute: String },
    #[error(transparent)]
    Version(#[from] VersionParseError),
}

impl ModuleIdentity {
    /// Build an identity. An empty or `neutral` culture and an empty or
    /// `null` token are normalized to `None`; tokens are lower-cased.
    pub fn new(
        name: impl Into<String>,
        version: ModuleVersion,
        culture: Option<String>,
        public_key_token: Option<String>,
    ) -> Self {
        let name = name.into();
        let culture = culture.filter(|c| !c.is_empty() && !c.eq_ignore_ascii_case("neutral"));
        let public_key_token = public_key_token
            .filter(|t| !t.is_empty() && !t.eq_ignore_ascii_case("null"))
            .map(|t| t.to_ascii_lowercase());
        let full_name = format!(
            "{name}, Version={version}, Culture={}, PublicKeyToken={}",
            culture.as_deref().unwrap_or("neutral"),
            public_key_token.as_deref().unwrap_or("null"),
        );
        Self {
            name,
            version,
            culture,
            public_key_token,
            full_name,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn version(&self) -> ModuleVersion {
        self.version
    }

    /// Culture, or `None` for culture-neutral modules.
    pub fn culture(&self) -> Option<&str> {
        self.culture.as_deref()
    }

    /// Lowercase hex public-key token, or `None` for unsigned modules.
    pub fn public_key_token(&self) -> Option<&str> {
        self.public_key_token.as_deref()
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    /// Whether this (loaded) identity satisfies a `requested` identity.
    ///
    /// Names compare case-insensitively and versions must be equal. Culture
    /// and token are only compared when the request specifies them.
    pub fn satisfies(&self, requested: &ModuleIdentity) -> bool {
        let culture_ok = match requested.culture.as_deref() {
            Some(c) => self
                .culture
                .as_deref()
                .is_some_and(|own| own.eq_ignore_ascii_case(c)),
            None => true,
        };
        let token_ok = match requested.public_key_token.as_deref() {
            Some(t) => self.public_key_token.as_deref() == Some(t),
            None => true,
        };
        self.name.eq_ignore_ascii_case(&requested.name)
            && self.version == requested.version
            && culture_ok
            && token_ok
    }
}

impl fmt::Display for ModuleIdentity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.full_name)
    }
}

impl FromStr for ModuleIdentity {
    type Err = IdentityParseError;

    /// Parse a full name. Unknown attributes (`ProcessorArchitecture`,
    /// `Retargetable`, ...) are ignored.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.split(',');
        let name = parts.next().map(str::trim).unwrap_or_default();
        if name.is_empty() {
            return Err(IdentityParseError::EmptyName);
        }

        let mut version = None;
        let mut culture = None;
        let mut token = None;
        for part in parts {
            let part = part.trim();
            let Some((key, value)) = part.split_once('=') else {
                return Err(IdentityParseError::Attribute {
                    input: s.to_string(),
                    attribute: part.to_string(),
                });
            };
            let value = value.trim();
            match key.trim().to_ascii_lowercase().as_str() {
                "version" => version = Some(value.parse::<ModuleVersion>()?),
                "culture" => culture = Some(value.to_string()),
                "publickeytoken" => token = Some(value.to_string()),
                _ => {}
            }
        }

        let version = version.ok_or_else(|| IdentityParseError::MissingVersion(s.to_string()))?;
        Ok(Self::new(name, version, culture, token))
    }
}
