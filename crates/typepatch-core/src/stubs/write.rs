//! Persisting planned redirect stubs.

use super::StubTask;
use crate::error::Error;
use crate::pool::TaskPool;
use serde::Serialize;
use std::path::PathBuf;
use tracing::{info, warn};
use typepatch_util::fs::atomic_write;

/// What happened to one task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StubOutcome {
    /// The stub manifest was written to this path.
    Written(PathBuf),
    /// A non-directory already occupies the stub directory path.
    Collision(PathBuf),
    /// The task had no runtime target; nothing to write.
    Unresolved(String),
}

/// Summary of a stub-writing batch.
#[derive(Debug, Default, Serialize)]
pub struct WriteReport {
    pub written: Vec<PathBuf>,
    pub collisions: Vec<PathBuf>,
    /// Subpaths skipped because no runtime target was found.
    pub unresolved: Vec<String>,
    #[serde(skip)]
    pub errors: Vec<Error>,
}

impl WriteReport {
    /// Number of tasks the batch processed.
    #[must_use]
    pub fn total(&self) -> usize {
        self.written.len() + self.collisions.len() + self.unresolved.len() + self.errors.len()
    }

    /// Fail with an aggregate error if any task failed.
    pub fn check(&self) -> Result<(), Error> {
        if self.errors.is_empty() {
            Ok(())
        } else {
            Err(Error::BatchFailed {
                operation: "write stubs",
                failed: self.errors.len(),
                total: self.total(),
            })
        }
    }

    /// The report itself, or the aggregate error if anything failed.
    pub fn into_result(self) -> Result<Self, Error> {
        self.check().map(|()| self)
    }

    fn record(&mut self, outcome: Result<StubOutcome, Error>) {
        match outcome {
            Ok(StubOutcome::Written(path)) => self.written.push(path),
            Ok(StubOutcome::Collision(path)) => self.collisions.push(path),
            Ok(StubOutcome::Unresolved(subpath)) => self.unresolved.push(subpath),
            Err(e) => self.errors.push(e),
        }
    }
}

/// Write one stub: create its directory, then its manifest.
///
/// Re-running overwrites an existing stub with freshly computed content.
pub fn write_stub(task: &StubTask) -> Result<StubOutcome, Error> {
    let Some(manifest) = &task.manifest else {
        warn!(subpath = %task.subpath, "no runtime target found; no redirect written");
        return Ok(StubOutcome::Unresolved(task.subpath.clone()));
    };

    if let Ok(meta) = std::fs::metadata(&task.subpath_dir) {
        if !meta.is_dir() {
            warn!(
                subpath = %task.subpath,
                path = %task.subpath_dir.display(),
                "a file occupies the redirect directory; skipping"
            );
            return Ok(StubOutcome::Collision(task.subpath_dir.clone()));
        }
    }

    let stub_error = |source| Error::StubWrite {
        path: task.manifest_path.clone(),
        source,
    };

    std::fs::create_dir_all(&task.subpath_dir).map_err(stub_error)?;
    atomic_write(&task.manifest_path, manifest.to_json()?.as_bytes()).map_err(stub_error)?;

    Ok(StubOutcome::Written(task.manifest_path.clone()))
}

/// Write every task through the pool; failures are collected, never fatal.
pub async fn write_stubs(tasks: &[StubTask], pool: &TaskPool) -> WriteReport {
    let outcomes = pool
        .run_all(tasks.iter().cloned().map(|task| async move {
            tokio::task::spawn_blocking(move || write_stub(&task))
                .await
                .unwrap_or_else(|e| Err(Error::other(format!("stub writer task failed: {e}"))))
        }))
        .await;

    let mut report = WriteReport::default();
    for outcome in outcomes {
        report.record(outcome);
    }

    info!(
        written = report.written.len(),
        collisions = report.collisions.len(),
        unresolved = report.unresolved.len(),
        failed = report.errors.len(),
        "wrote redirect stubs"
    );
    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::stubs::StubManifest;
    use std::fs;
    use std::path::Path;
    use tempfile::tempdir;

    fn task(root: &Path, sub: &str, main: Option<&str>) -> StubTask {
        let subpath_dir = root.join(sub);
        StubTask {
            subpath: format!("./{sub}"),
            manifest_path: subpath_dir.join("package.json"),
            subpath_dir,
            manifest: main.map(|main| StubManifest {
                private: true,
                main: main.to_string(),
                types: None,
                version: Some("0.1.0".to_string()),
            }),
        }
    }

    #[tokio::test]
    async fn test_write_stubs_creates_manifests() {
        let dir = tempdir().unwrap();
        let tasks = vec![
            task(dir.path(), "a", Some("../dist/a.js")),
            task(dir.path(), "nested/b", Some("../../dist/b.js")),
        ];

        let report = write_stubs(&tasks, &TaskPool::default()).await;
        assert!(report.check().is_ok());
        assert_eq!(report.written.len(), 2);

        let written: StubManifest = serde_json::from_str(
            &fs::read_to_string(dir.path().join("nested/b/package.json")).unwrap(),
        )
        .unwrap();
        assert_eq!(written.main, "../../dist/b.js");
        assert_eq!(written.version.as_deref(), Some("0.1.0"));
        assert!(written.private);
    }

    #[tokio::test]
    async fn test_rewrite_is_idempotent() {
        let dir = tempdir().unwrap();
        let tasks = vec![task(dir.path(), "a", Some("../dist/a.js"))];
        let pool = TaskPool::new(2);

        write_stubs(&tasks, &pool).await.check().unwrap();
        let first = fs::read_to_string(dir.path().join("a/package.json")).unwrap();
        write_stubs(&tasks, &pool).await.check().unwrap();
        let second = fs::read_to_string(dir.path().join("a/package.json")).unwrap();
        assert_eq!(first, second);
    }

    #[tokio::test]
    async fn test_collision_is_skipped_not_fatal() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("a"), "occupied").unwrap();
        let tasks = vec![
            task(dir.path(), "a", Some("../dist/a.js")),
            task(dir.path(), "b", Some("../dist/b.js")),
        ];

        let report = write_stubs(&tasks, &TaskPool::default()).await;
        assert!(report.check().is_ok());
        assert_eq!(report.collisions, vec![dir.path().join("a")]);
        assert_eq!(report.written, vec![dir.path().join("b/package.json")]);
        assert_eq!(fs::read_to_string(dir.path().join("a")).unwrap(), "occupied");
    }

    #[tokio::test]
    async fn test_null_manifest_not_written() {
        let dir = tempdir().unwrap();
        let tasks = vec![task(dir.path(), "types", None)];

        let report = write_stubs(&tasks, &TaskPool::default()).await;
        assert_eq!(report.unresolved, vec!["./types".to_string()]);
        assert!(!dir.path().join("types").exists());
    }

    #[tokio::test]
    async fn test_failures_collected_and_siblings_continue() {
        let dir = tempdir().unwrap();
        fs::write(dir.path().join("blocker"), "").unwrap();
        let tasks = vec![
            task(dir.path(), "blocker/inner", Some("../../dist/x.js")),
            task(dir.path(), "ok", Some("../dist/ok.js")),
        ];

        let report = write_stubs(&tasks, &TaskPool::default()).await;
        assert_eq!(report.errors.len(), 1);
        assert_eq!(report.written.len(), 1);
        let err = report.check().unwrap_err();
        assert!(matches!(
            err,
            Error::BatchFailed {
                failed: 1,
                total: 2,
                ..
            }
        ));
    }
}
