use crate::codes;
use std::path::PathBuf;
use thiserror::Error;

/// Core error type for typepatch operations.
#[derive(Error, Debug)]
pub enum Error {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Failed to read package manifest at {path}: {source}")]
    ManifestRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to parse package manifest at {path}: {source}")]
    ManifestParse {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Project root not found from {start}")]
    ProjectNotFound { start: PathBuf },

    #[error("Failed to write redirect stub {path}: {source}")]
    StubWrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Failed to rewrite declaration file {path}: {source}")]
    DeclarationRewrite {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{operation}: {failed} of {total} task(s) failed")]
    BatchFailed {
        operation: &'static str,
        failed: usize,
        total: usize,
    },

    #[error("{0}")]
    Other(String),
}

impl Error {
    #[must_use]
    pub fn other(msg: impl Into<String>) -> Self {
        Self::Other(msg.into())
    }

    /// Stable error code for machine-readable output.
    #[must_use]
    pub fn code(&self) -> &'static str {
        match self {
            Self::Io(_) => codes::IO_ERROR,
            Self::ManifestRead { .. } => codes::MANIFEST_READ_FAILED,
            Self::ManifestParse { .. } => codes::MANIFEST_INVALID,
            Self::ProjectNotFound { .. } => codes::PROJECT_NOT_FOUND,
            Self::StubWrite { .. } => codes::STUB_WRITE_FAILED,
            Self::DeclarationRewrite { .. } => codes::DTS_REWRITE_FAILED,
            Self::BatchFailed { .. } => codes::BATCH_FAILED,
            Self::Other(_) => codes::INTERNAL_ERROR,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_batch_failed_message() {
        let err = Error::BatchFailed {
            operation: "write stubs",
            failed: 2,
            total: 5,
        };
        assert_eq!(err.to_string(), "write stubs: 2 of 5 task(s) failed");
        assert_eq!(err.code(), codes::BATCH_FAILED);
    }

    #[test]
    fn test_manifest_parse_code() {
        let source = serde_json::from_str::<serde_json::Value>("{").unwrap_err();
        let err = Error::ManifestParse {
            path: PathBuf::from("/proj/package.json"),
            source,
        };
        assert_eq!(err.code(), codes::MANIFEST_INVALID);
        assert!(err.to_string().contains("/proj/package.json"));
    }
}
