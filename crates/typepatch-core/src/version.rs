//! Version metadata and the JSON output contract version.

use serde::Serialize;

/// Binary name shown in version output.
pub const NAME: &str = "typepatch";

/// Crate version, read from Cargo.toml at compile time.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Version of the `--json` output of every command.
///
/// Every object printed by `version`, `stubs`, `explain` and `dts` carries
/// it next to `ok`. Bump it when a key is removed or renamed, or when the
/// shape of `tasks`, `explain` or an `error` object changes. Adding keys does
/// not require a bump.
pub const SCHEMA_VERSION: u32 = 1;

/// What `typepatch version --json` reports.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VersionInfo {
    pub name: &'static str,
    pub version: &'static str,
    pub schema_version: u32,
    /// Commit the binary was built from, when the build provided one.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub git_hash: Option<&'static str>,
}

impl VersionInfo {
    #[must_use]
    pub fn current() -> Self {
        Self {
            name: NAME,
            version: VERSION,
            schema_version: SCHEMA_VERSION,
            git_hash: option_env!("TYPEPATCH_BUILD_GIT_HASH"),
        }
    }
}

impl std::fmt::Display for VersionInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.name, self.version)?;
        if let Some(hash) = self.git_hash {
            write!(f, " ({hash})")?;
        }
        Ok(())
    }
}

/// Human-readable version line, e.g. `typepatch 0.2.0 (abc123)`.
#[must_use]
pub fn version_string() -> String {
    VersionInfo::current().to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version_line_with_and_without_hash() {
        let mut info = VersionInfo {
            name: NAME,
            version: "1.4.0",
            schema_version: SCHEMA_VERSION,
            git_hash: None,
        };
        assert_eq!(info.to_string(), "typepatch 1.4.0");
        info.git_hash = Some("abc123");
        assert_eq!(info.to_string(), "typepatch 1.4.0 (abc123)");
    }

    #[test]
    fn test_version_json_shape() {
        let info = VersionInfo {
            name: NAME,
            version: "1.4.0",
            schema_version: 1,
            git_hash: None,
        };
        assert_eq!(
            serde_json::to_value(&info).unwrap(),
            serde_json::json!({
                "name": "typepatch",
                "version": "1.4.0",
                "schema_version": 1
            })
        );
    }

    #[test]
    fn test_current_matches_crate() {
        let info = VersionInfo::current();
        assert_eq!(info.version, VERSION);
        assert_eq!(info.schema_version, SCHEMA_VERSION);
        assert!(version_string().starts_with("typepatch "));
    }
}
