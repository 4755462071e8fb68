//! Binding redirects from application configuration files.
//!
//! Redirects live under
//! `configuration/runtime/assemblyBinding/dependentAssembly`:
//!
//! ```xml
//! <dependentAssembly>
//!   <assemblyIdentity name="Newtonsoft.Json" publicKeyToken="30ad4fe6b2a6aeed" culture="neutral" />
//!   <bindingRedirect oldVersion="0.0.0.0-13.0.0.0" newVersion="13.0.0.0" />
//! </dependentAssembly>
//! ```

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use quick_xml::events::{BytesStart, Event};
use quick_xml::Reader;
use refconflict_core::redirect::BindingRedirect;
use refconflict_core::version::{ModuleVersion, VersionParseError, VersionRange};
use refconflict_util::errors::{RefConflictError, RefConflictResult};
use refconflict_util::fs::first_existing_file;
use thiserror::Error;

const DEPENDENT_ASSEMBLY_PATH: &str = "configuration>runtime>assemblyBinding>dependentAssembly";

/// Error returned when a configuration document cannot be turned into rules.
#[derive(Debug, Error)]
pub enum AppConfigError {
    #[error("malformed XML: {0}")]
    Xml(#[from] quick_xml::Error),
    #[error("malformed attribute: {0}")]
    Attribute(#[from] quick_xml::events::attributes::AttrError),
    #[error("bindingRedirect for '{name}' is missing the {attribute} attribute")]
    MissingAttribute { name: String, attribute: &'static str },
    #[error("bindingRedirect for '{name}' has an invalid version: {source}")]
    Version {
        name: String,
        #[source]
        source: VersionParseError,
    },
}

/// Guess the configuration file that applies to `entry`.
///
/// Tries `<entry>.config` (e.g. `App.exe.config`), then `web.config` next to
/// the entry, then `web.config` one level up when the entry lives in `bin`.
pub fn suggest_config_file(entry: &Path) -> Option<PathBuf> {
    let dir = entry.parent().unwrap_or_else(|| Path::new("."));
    let mut candidates = Vec::new();
    if let Some(file_name) = entry.file_name() {
        let mut config_name = file_name.to_os_string();
        config_name.push(".config");
        candidates.push(dir.join(config_name));
    }
    candidates.push(dir.join("web.config"));
    let in_bin = dir
        .file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| n.eq_ignore_ascii_case("bin"));
    if in_bin {
        if let Some(parent) = dir.parent() {
            candidates.push(parent.join("web.config"));
        }
    }
    first_existing_file(candidates)
}

/// Read and parse the binding redirects of the configuration file at `path`.
pub fn load_binding_redirects(path: &Path) -> RefConflictResult<Vec<BindingRedirect>> {
    let xml = std::fs::read_to_string(path).map_err(|e| RefConflictError::AppConfig {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    let rules = parse_binding_redirects(&xml).map_err(|e| RefConflictError::AppConfig {
        path: path.display().to_string(),
        message: e.to_string(),
    })?;
    tracing::info!("loaded {} binding redirect(s) from {}", rules.len(), path.display());
    for rule in &rules {
        tracing::debug!("redirect {rule}");
    }
    Ok(rules)
}

#[derive(Default)]
struct DependentAssembly {
    name: Option<String>,
    public_key_token: Option<String>,
    culture: Option<String>,
    redirects: Vec<(Option<String>, Option<String>)>,
}

/// Parse the binding redirects in a configuration document, in file order.
pub fn parse_binding_redirects(xml: &str) -> Result<Vec<BindingRedirect>, AppConfigError> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut rules = Vec::new();
    let mut path: Vec<String> = Vec::new();
    let mut current: Option<DependentAssembly> = None;

    loop {
        match reader.read_event()? {
            Event::Start(ref e) => {
                let tag = local_name(e);
                path.push(tag);
                if path.join(">") == DEPENDENT_ASSEMBLY_PATH {
                    current = Some(DependentAssembly::default());
                } else if let Some(ref mut dependent) = current {
                    read_child(e, dependent)?;
                }
            }
            Event::Empty(ref e) => {
                if let Some(ref mut dependent) = current {
                    read_child(e, dependent)?;
                }
            }
            Event::End(_) => {
                if path.join(">") == DEPENDENT_ASSEMBLY_PATH {
                    if let Some(dependent) = current.take() {
                        flush(dependent, &mut rules)?;
                    }
                }
                path.pop();
            }
            Event::Eof => break,
            _ => {}
        }
    }

    Ok(rules)
}

fn local_name(e: &BytesStart<'_>) -> String {
    String::from_utf8_lossy(e.local_name().as_ref()).to_string()
}

fn attributes(e: &BytesStart<'_>) -> Result<HashMap<String, String>, AppConfigError> {
    let mut map = HashMap::new();
    for attr in e.attributes() {
        let attr = attr?;
        let key = String::from_utf8_lossy(attr.key.local_name().as_ref()).to_string();
        let value = attr
            .unescape_value()
            .map_err(|e| AppConfigError::Xml(e.into()))?
            .trim()
            .to_string();
        map.insert(key, value);
    }
    Ok(map)
}

fn read_child(e: &BytesStart<'_>, dependent: &mut DependentAssembly) -> Result<(), AppConfigError> {
    match local_name(e).as_str() {
        "assemblyIdentity" => {
            let mut attrs = attributes(e)?;
            dependent.name = attrs.remove("name");
            dependent.public_key_token = attrs.remove("publicKeyToken");
            dependent.culture = attrs.remove("culture");
        }
        "bindingRedirect" => {
            let mut attrs = attributes(e)?;
            dependent
                .redirects
                .push((attrs.remove("oldVersion"), attrs.remove("newVersion")));
        }
        _ => {}
    }
    Ok(())
}

fn flush(dependent: DependentAssembly, rules: &mut Vec<BindingRedirect>) -> Result<(), AppConfigError> {
    let Some(name) = dependent.name.filter(|n| !n.is_empty()) else {
        if !dependent.redirects.is_empty() {
            tracing::warn!("ignoring bindingRedirect without an assemblyIdentity name");
        }
        return Ok(());
    };

    for (old, new) in dependent.redirects {
        let old = old.ok_or_else(|| AppConfigError::MissingAttribute {
            name: name.clone(),
            attribute: "oldVersion",
        })?;
        let new = new.ok_or_else(|| AppConfigError::MissingAttribute {
            name: name.clone(),
            attribute: "newVersion",
        })?;
        let version_error = |source| AppConfigError::Version {
            name: name.clone(),
            source,
        };
        let old_versions: VersionRange = old.parse().map_err(version_error)?;
        let new_version: ModuleVersion = new.parse().map_err(version_error)?;

        rules.push(BindingRedirect {
            name: name.clone(),
            public_key_token: dependent.public_key_token.clone(),
            culture: dependent.culture.clone(),
            old_versions,
            new_version,
        });
    }
    Ok(())
}
