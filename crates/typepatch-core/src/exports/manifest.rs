//! Package manifest model and `exports` normalization.

use super::target::ExportTarget;
use crate::error::Error;
use indexmap::IndexMap;
use serde::Deserialize;
use serde_json::Value;
use std::path::Path;

/// Root subpath key.
pub const ROOT_KEY: &str = ".";

/// The manifest's own subpath, which is never redirected.
pub const PACKAGE_JSON_KEY: &str = "./package.json";

/// The subset of package.json that drives redirect generation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PackageManifest {
    /// `"module"` or `"commonjs"`.
    #[serde(rename = "type", default)]
    pub module_type: Option<String>,

    #[serde(default)]
    pub version: Option<String>,

    /// Package-level declaration entry, used when no branch yields one.
    #[serde(default)]
    pub types: Option<String>,

    /// Older spelling of `types`; consulted only when `types` is absent.
    #[serde(default)]
    pub typings: Option<String>,

    /// Raw `exports` field; normalized on demand.
    #[serde(default)]
    pub exports: Option<Value>,
}

impl PackageManifest {
    /// Parse a manifest from JSON text.
    pub fn from_json(text: &str, path: &Path) -> Result<Self, Error> {
        serde_json::from_str(text).map_err(|source| Error::ManifestParse {
            path: path.to_path_buf(),
            source,
        })
    }

    /// Read and parse a package.json from disk.
    pub fn read(path: &Path) -> Result<Self, Error> {
        let text = std::fs::read_to_string(path).map_err(|source| Error::ManifestRead {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json(&text, path)
    }

    /// Package-level declaration entry: `types`, else `typings`.
    #[must_use]
    pub fn package_types(&self) -> Option<&str> {
        self.types.as_deref().or(self.typings.as_deref())
    }

    /// Normalize this manifest's `exports` field.
    #[must_use]
    pub fn normalized_exports(&self) -> Option<ExportsManifest> {
        normalize_exports(self.exports.as_ref())
    }
}

/// Ordered mapping from subpath key to export target.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExportsManifest {
    entries: IndexMap<String, ExportTarget>,
}

impl ExportsManifest {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert or replace an entry, keeping the original position on replace.
    pub fn insert(&mut self, key: impl Into<String>, target: ExportTarget) {
        self.entries.insert(key.into(), target);
    }

    #[must_use]
    pub fn get(&self, key: &str) -> Option<&ExportTarget> {
        self.entries.get(key)
    }

    #[must_use]
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ExportTarget)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl FromIterator<(String, ExportTarget)> for ExportsManifest {
    fn from_iter<I: IntoIterator<Item = (String, ExportTarget)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}

/// Coerce a raw `exports` field into an ordered subpath mapping.
///
/// - absent or `null`: nothing to process
/// - string or array: the single root entry `"."`
/// - map with `.`-prefixed keys: used as-is
/// - map of bare conditions (`{ "import": ..., "require": ... }`): the root entry
#[must_use]
pub fn normalize_exports(exports: Option<&Value>) -> Option<ExportsManifest> {
    let exports = exports?;

    match exports {
        Value::Null | Value::Bool(_) | Value::Number(_) => None,
        Value::String(_) | Value::Array(_) => {
            let mut manifest = ExportsManifest::new();
            manifest.insert(ROOT_KEY, ExportTarget::from_value(exports));
            Some(manifest)
        }
        Value::Object(map) => {
            if !map.is_empty() && map.keys().all(|k| !k.starts_with('.')) {
                let mut manifest = ExportsManifest::new();
                manifest.insert(ROOT_KEY, ExportTarget::from_value(exports));
                return Some(manifest);
            }
            Some(
                map.iter()
                    .map(|(k, v)| (k.clone(), ExportTarget::from_value(v)))
                    .collect(),
            )
        }
    }
}
