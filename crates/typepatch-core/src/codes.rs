//! Stable error codes for typepatch.
//!
//! All codes are SCREAMING_SNAKE_CASE and stable across versions.

/// Generic I/O failure outside a more specific operation.
pub const IO_ERROR: &str = "IO_ERROR";

/// package.json could not be read.
pub const MANIFEST_READ_FAILED: &str = "MANIFEST_READ_FAILED";

/// package.json is not valid JSON or has an unexpected shape.
pub const MANIFEST_INVALID: &str = "MANIFEST_INVALID";

/// No package.json found walking up from the working directory.
pub const PROJECT_NOT_FOUND: &str = "PROJECT_NOT_FOUND";

/// A redirect stub could not be written.
pub const STUB_WRITE_FAILED: &str = "STUB_WRITE_FAILED";

/// A declaration file could not be rewritten.
pub const DTS_REWRITE_FAILED: &str = "DTS_REWRITE_FAILED";

/// One or more tasks in a batch failed.
pub const BATCH_FAILED: &str = "BATCH_FAILED";

/// The requested subpath is not exported.
pub const SUBPATH_NOT_EXPORTED: &str = "SUBPATH_NOT_EXPORTED";

/// The declaration output directory does not exist.
pub const DTS_DIR_NOT_FOUND: &str = "DTS_DIR_NOT_FOUND";

/// Unexpected internal failure.
pub const INTERNAL_ERROR: &str = "INTERNAL_ERROR";
