//! Module-specific declaration files.
//!
//! A dual ESM/CJS build emits plain `.d.ts` files into each output directory.
//! This module renames them to `.d.mts`/`.d.cts`, points their relative
//! `.js` specifiers at `.mjs`/`.cjs`, and keeps companion source maps in step.

mod rewrite;

pub use rewrite::{
    declaration_target, is_declaration_file, rewrite_declaration_file, rewrite_source_map,
    rewrite_source_mapping_url, rewrite_specifiers, EMITTED_DECLARATION_EXT,
};

use crate::error::Error;
use crate::pool::{TaskPool, MAX_CONCURRENT_DIR_SCANS, MAX_CONCURRENT_FILE_OPS};
use futures::future::{join_all, BoxFuture, FutureExt};
use serde::Serialize;
use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;
use tracing::{debug, info, warn};

/// Module format an output directory was compiled for.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ModuleKind {
    Esm,
    Cjs,
}

impl ModuleKind {
    /// Runtime extension relative specifiers are rewritten to.
    #[must_use]
    pub fn runtime_ext(self) -> &'static str {
        match self {
            Self::Esm => "mjs",
            Self::Cjs => "cjs",
        }
    }

    /// Declaration extension files are renamed to.
    #[must_use]
    pub fn declaration_ext(self) -> &'static str {
        match self {
            Self::Esm => "d.mts",
            Self::Cjs => "d.cts",
        }
    }

    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Esm => "esm",
            Self::Cjs => "cjs",
        }
    }
}

impl fmt::Display for ModuleKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ModuleKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "esm" | "module" | "mjs" => Ok(Self::Esm),
            "cjs" | "commonjs" => Ok(Self::Cjs),
            other => Err(Error::other(format!(
                "unknown module kind '{other}' (expected esm or cjs)"
            ))),
        }
    }
}

/// Outcome of a declaration-rewrite batch.
#[derive(Debug, Default, Serialize)]
pub struct RewriteReport {
    /// New paths of every rewritten declaration file.
    pub rewritten: Vec<PathBuf>,
    #[serde(skip)]
    pub errors: Vec<Error>,
}

impl RewriteReport {
    #[must_use]
    pub fn total(&self) -> usize {
        self.rewritten.len() + self.errors.len()
    }

    /// Fail with an aggregate error if any file failed.
    pub fn check(&self) -> Result<(), Error> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::BatchFailed {
                operation: "rewrite declarations",
                failed: self.errors.len(),
                total: self.total(),
            })
        }
    }

    /// The report itself, or the aggregate error if anything failed.
    pub fn into_result(self) -> Result<Self, Error> {
        self.check().map(|()| self)
    }
}

/// Recursively collect `.d.ts` files under `dir`, sorted.
///
/// Directory reads run through `pool`; a directory that cannot be read is
/// logged and treated as empty. Symlinked directories are not followed.
pub async fn collect_declarations(dir: &Path, pool: &TaskPool) -> Vec<PathBuf> {
    let mut files = scan_dir(dir.to_path_buf(), pool).await;
    files.sort();
    files
}

fn scan_dir(dir: PathBuf, pool: &TaskPool) -> BoxFuture<'_, Vec<PathBuf>> {
    async move {
        // Only the read holds a slot; sub-directory scans queue for their own.
        let entries = match pool.run(read_entries(&dir)).await {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %dir.display(), error = %e, "failed to read directory; skipping");
                return Vec::new();
            }
        };

        let mut files = Vec::new();
        let mut subdirs = Vec::new();
        for (path, is_dir) in entries {
            if is_dir {
                subdirs.push(path);
            } else if is_declaration_file(&path) {
                files.push(path);
            }
        }

        let nested = join_all(subdirs.into_iter().map(|sub| scan_dir(sub, pool))).await;
        files.extend(nested.into_iter().flatten());
        files
    }
    .boxed()
}

async fn read_entries(dir: &Path) -> std::io::Result<Vec<(PathBuf, bool)>> {
    let mut read_dir = tokio::fs::read_dir(dir).await?;
    let mut entries = Vec::new();
    while let Some(entry) = read_dir.next_entry().await? {
        let is_dir = entry.file_type().await.map(|t| t.is_dir());
        entries.extend(classify_entry(entry.path(), is_dir));
    }
    Ok(entries)
}

/// Keep an entry whose type is known; an unreadable one is skipped on its own.
fn classify_entry(path: PathBuf, is_dir: std::io::Result<bool>) -> Option<(PathBuf, bool)> {
    match is_dir {
        Ok(is_dir) => Some((path, is_dir)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "failed to read entry type; skipping");
            None
        }
    }
}

/// Rewrite every declaration file under `dir` for `kind`.
///
/// Files are processed concurrently with bounded parallelism. One file's
/// failure never stops the others; failures land in the report.
pub async fn rewrite_declarations(dir: &Path, kind: ModuleKind) -> RewriteReport {
    let files = collect_declarations(dir, &TaskPool::new(MAX_CONCURRENT_DIR_SCANS)).await;
    debug!(dir = %dir.display(), count = files.len(), %kind, "collected declaration files");

    let pool = TaskPool::new(MAX_CONCURRENT_FILE_OPS);
    let outcomes = pool
        .run_all(files.into_iter().map(|path| async move {
            tokio::task::spawn_blocking(move || rewrite_declaration_file(&path, kind))
                .await
                .unwrap_or_else(|e| Err(Error::other(format!("rewrite task failed: {e}"))))
        }))
        .await;

    let mut report = RewriteReport::default();
    for outcome in outcomes {
        match outcome {
            Ok(path) => report.rewritten.push(path),
            Err(e) => {
                warn!(error = %e, "declaration rewrite failed");
                report.errors.push(e);
            }
        }
    }

    info!(
        dir = %dir.display(),
        %kind,
        rewritten = report.rewritten.len(),
        failed = report.errors.len(),
        "rewrote declarations"
    );
    report
}
