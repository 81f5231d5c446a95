use crate::error::Error;
use std::path::{Path, PathBuf};

/// Name of the package manifest file.
pub const PACKAGE_JSON: &str = "package.json";

/// Find the package root by walking up from `cwd` looking for `package.json`.
///
/// Returns the first directory containing one, or `None` if none is found.
#[must_use]
pub fn project_root(cwd: &Path) -> Option<PathBuf> {
    let mut current = cwd.to_path_buf();

    loop {
        if current.join(PACKAGE_JSON).is_file() {
            return Some(current);
        }

        if !current.pop() {
            return None;
        }
    }
}

/// Like [`project_root`], but fails with [`Error::ProjectNotFound`].
pub fn require_project_root(cwd: &Path) -> Result<PathBuf, Error> {
    project_root(cwd).ok_or_else(|| Error::ProjectNotFound {
        start: cwd.to_path_buf(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_project_root_with_package_json() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("dist").join("esm");
        fs::create_dir_all(&nested).unwrap();
        fs::write(dir.path().join(PACKAGE_JSON), "{}").unwrap();

        let root = project_root(&nested);
        assert_eq!(root, Some(dir.path().to_path_buf()));
    }

    #[test]
    fn test_project_root_prefers_nearest() {
        let dir = tempdir().unwrap();
        let inner = dir.path().join("packages").join("lib");
        fs::create_dir_all(&inner).unwrap();
        fs::write(dir.path().join(PACKAGE_JSON), "{}").unwrap();
        fs::write(inner.join(PACKAGE_JSON), "{}").unwrap();

        assert_eq!(project_root(&inner), Some(inner.clone()));
    }

    #[test]
    fn test_package_json_directory_is_not_a_marker() {
        let dir = tempdir().unwrap();
        let nested = dir.path().join("a");
        fs::create_dir_all(nested.join(PACKAGE_JSON)).unwrap();
        fs::write(dir.path().join(PACKAGE_JSON), "{}").unwrap();

        assert_eq!(project_root(&nested), Some(dir.path().to_path_buf()));
    }
}
