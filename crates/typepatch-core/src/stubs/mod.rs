//! Redirect stubs for legacy resolution.
//!
//! Resolvers that ignore `exports` look for `<subpath>/package.json` and
//! follow its `main`/`types`. For every concrete subpath that such a resolver
//! cannot already reach, a minimal redirect manifest is planned and written
//! at the subpath's physical location.

mod classify;
mod plan;
mod write;

pub use classify::{is_direct_match, is_excluded_key, is_legacy_resolvable, LEGACY_EXTENSIONS};
pub use plan::{explain_subpath, plan_stubs, Disposition, StubExplain};
pub use write::{write_stub, write_stubs, StubOutcome, WriteReport};

use crate::error::Error;
use crate::exports::{BranchOrder, PackageManifest, ResolutionKind};
use crate::paths::PACKAGE_JSON;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Everything one redirect-generation run needs, passed explicitly.
#[derive(Debug, Clone)]
pub struct StubContext {
    /// Package root; stub directories are created under it.
    pub root: PathBuf,
    pub manifest: PackageManifest,
    /// Module-format preference used to pick the runtime branch.
    pub kind: ResolutionKind,
}

impl StubContext {
    #[must_use]
    pub fn new(root: impl Into<PathBuf>, manifest: PackageManifest, kind: ResolutionKind) -> Self {
        Self {
            root: root.into(),
            manifest,
            kind,
        }
    }

    /// Read `<root>/package.json` and build a context from it.
    pub fn load(root: &Path, kind: ResolutionKind) -> Result<Self, Error> {
        let manifest = PackageManifest::read(&root.join(PACKAGE_JSON))?;
        Ok(Self::new(root, manifest, kind))
    }

    #[must_use]
    pub fn branch_order(&self) -> BranchOrder {
        BranchOrder::for_kind(self.kind)
    }
}

/// Contents of a redirect `package.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StubManifest {
    pub private: bool,
    /// Runtime entry, relative to the stub directory.
    pub main: String,
    /// Declaration entry, relative to the stub directory.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub types: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,
}

/// A planned redirect for one subpath.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StubTask {
    /// Public subpath key, e.g. `./sub`.
    pub subpath: String,
    pub subpath_dir: PathBuf,
    pub manifest_path: PathBuf,
    /// `None` when the subpath has no runtime target to redirect to.
    pub manifest: Option<StubManifest>,
}

impl StubManifest {
    /// Pretty JSON with a trailing newline, as written to disk.
    pub fn to_json(&self) -> Result<String, Error> {
        let mut json = serde_json::to_string_pretty(self)
            .map_err(|e| Error::other(format!("failed to serialize stub manifest: {e}")))?;
        json.push('\n');
        Ok(json)
    }
}
