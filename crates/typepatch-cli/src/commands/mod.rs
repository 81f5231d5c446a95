pub mod dts;
pub mod explain;
pub mod stubs;
pub mod version;

use miette::{MietteDiagnostic, Report, Result};
use std::path::Path;
use typepatch_core::paths::require_project_root;
use typepatch_core::version::SCHEMA_VERSION;
use typepatch_core::{Error, ResolutionKind, StubContext};

/// Report a failure.
///
/// JSON mode prints the error object and exits with status 1; human mode
/// returns a diagnostic for `main` to render.
pub fn failure(json: bool, code: &str, message: &str) -> Report {
    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": false,
                "schema_version": SCHEMA_VERSION,
                "error": {
                    "code": code,
                    "message": message,
                }
            })
        );
        std::process::exit(1);
    }
    Report::new(MietteDiagnostic::new(message).with_code(code))
}

/// Report a core error.
pub fn error_failure(json: bool, err: &Error) -> Report {
    failure(json, err.code(), &err.to_string())
}

/// Locate the package root from `cwd` and load its manifest.
pub fn load_context(cwd: &Path, prefer: ResolutionKind, json: bool) -> Result<StubContext> {
    require_project_root(cwd)
        .and_then(|root| StubContext::load(&root, prefer))
        .map_err(|e| error_failure(json, &e))
}

/// Render errors the way JSON output carries them.
pub fn errors_json(errors: &[Error]) -> Vec<serde_json::Value> {
    errors
        .iter()
        .map(|e| {
            serde_json::json!({
                "code": e.code(),
                "message": e.to_string(),
            })
        })
        .collect()
}
