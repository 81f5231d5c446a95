//! Redirect planning.

use super::classify::{is_direct_match, is_excluded_key, is_legacy_resolvable};
use super::{StubContext, StubManifest, StubTask};
use crate::exports::{
    expand_wildcards, select_main, select_types, BranchOrder, ExportTarget, ROOT_KEY,
};
use crate::paths::PACKAGE_JSON;
use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};
use typepatch_util::posix::{normalize_posix, relative_posix, strip_dot_slash};

/// What planning decided for one subpath.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Disposition {
    /// Root, `./package.json`, patterns and non-subpath keys.
    Excluded,
    /// The subpath is itself the physical file.
    DirectMatch,
    /// Legacy resolution already reaches the runtime file.
    LegacyResolvable,
    /// No runtime path could be selected; a null task is emitted.
    NoRuntimeTarget,
    /// A redirect stub is planned.
    Redirect,
}

impl Disposition {
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Excluded => "excluded",
            Self::DirectMatch => "direct_match",
            Self::LegacyResolvable => "legacy_resolvable",
            Self::NoRuntimeTarget => "no_runtime_target",
            Self::Redirect => "redirect",
        }
    }
}

/// Full planning detail for one subpath.
#[derive(Debug, Clone, Serialize)]
pub struct StubExplain {
    pub subpath: String,
    /// The (expanded) export target, as JSON.
    pub target: Value,
    pub disposition: Disposition,
    /// Selected runtime path, root-relative as written in the manifest.
    pub main: Option<String>,
    /// Condition keys taken to reach `main`.
    pub trail: Vec<String>,
    /// Selected declaration path, root-relative.
    pub types: Option<String>,
    /// The planned task, absent for skipped subpaths.
    pub task: Option<StubTask>,
}

/// Plan redirect stubs for every concrete subpath of the manifest.
///
/// Wildcard keys are expanded against the filesystem first, so this must run
/// after the output tree exists. Subpaths that need no redirect produce no
/// task; subpaths with no runtime target produce a task whose manifest is
/// `None`.
pub async fn plan_stubs(ctx: &StubContext) -> Vec<StubTask> {
    let Some(exports) = ctx.manifest.normalized_exports() else {
        debug!("no exports field; nothing to plan");
        return Vec::new();
    };

    let expanded = expand_wildcards(&exports, &ctx.root).await;
    let order = ctx.branch_order();

    let tasks: Vec<StubTask> = expanded
        .iter()
        .filter_map(|(key, target)| plan_entry(ctx, &order, key, target).task)
        .collect();

    debug!(
        subpaths = expanded.len(),
        tasks = tasks.len(),
        kind = %ctx.kind,
        "planned redirect stubs"
    );
    tasks
}

/// Explain how one subpath resolves and what planning would do with it.
///
/// Accepts `sub`, `./sub` or `.`. Returns `None` when the subpath is not
/// exported (after wildcard expansion).
pub async fn explain_subpath(ctx: &StubContext, subpath: &str) -> Option<StubExplain> {
    let exports = ctx.manifest.normalized_exports()?;
    let key = subpath_key(subpath);

    let target = match exports.get(&key) {
        Some(target) => target.clone(),
        None => expand_wildcards(&exports, &ctx.root).await.get(&key)?.clone(),
    };

    Some(plan_entry(ctx, &ctx.branch_order(), &key, &target))
}

fn subpath_key(subpath: &str) -> String {
    let rel = normalize_posix(strip_dot_slash(subpath));
    if rel.is_empty() {
        ROOT_KEY.to_string()
    } else {
        format!("./{rel}")
    }
}

fn plan_entry(
    ctx: &StubContext,
    order: &BranchOrder,
    key: &str,
    target: &ExportTarget,
) -> StubExplain {
    let mut explain = StubExplain {
        subpath: key.to_string(),
        target: target.to_value(),
        disposition: Disposition::Excluded,
        main: None,
        trail: Vec::new(),
        types: None,
        task: None,
    };

    let selection = select_main(target, order);
    explain.types = select_types(
        target,
        order,
        selection.as_ref(),
        ctx.manifest.package_types(),
    );
    if let Some(selection) = &selection {
        explain.main = Some(selection.path.clone());
        explain.trail.clone_from(&selection.trail);
    }

    if is_excluded_key(key) {
        return explain;
    }

    if is_direct_match(key, target) {
        debug!(subpath = key, "subpath is a physical file; no redirect needed");
        explain.disposition = Disposition::DirectMatch;
        return explain;
    }

    let dir_rel = normalize_posix(key);
    let subpath_dir = ctx.root.join(&dir_rel);
    let manifest_path = subpath_dir.join(PACKAGE_JSON);

    let Some(selection) = selection else {
        debug!(subpath = key, "no runtime target");
        explain.disposition = Disposition::NoRuntimeTarget;
        explain.task = Some(StubTask {
            subpath: key.to_string(),
            subpath_dir,
            manifest_path,
            manifest: None,
        });
        return explain;
    };

    if is_legacy_resolvable(key, &selection.path) {
        warn!(
            subpath = key,
            main = %selection.path,
            "subpath already resolvable without exports; skipping redirect"
        );
        explain.disposition = Disposition::LegacyResolvable;
        return explain;
    }

    let manifest = StubManifest {
        private: true,
        main: relative_posix(&dir_rel, &selection.path),
        types: explain
            .types
            .as_deref()
            .map(|types| relative_posix(&dir_rel, types)),
        version: ctx.manifest.version.clone(),
    };

    explain.disposition = Disposition::Redirect;
    explain.task = Some(StubTask {
        subpath: key.to_string(),
        subpath_dir,
        manifest_path,
        manifest: Some(manifest),
    });
    explain
}
