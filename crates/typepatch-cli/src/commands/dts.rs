//! `typepatch dts` command implementation.
//!
//! Renames the `.d.ts` files of one build output directory to the module
//! kind's declaration extension and rewrites their relative specifiers.

use super::{error_failure, errors_json, failure};
use miette::{IntoDiagnostic, Result};
use std::path::Path;
use typepatch_core::codes;
use typepatch_core::version::SCHEMA_VERSION;
use typepatch_core::{rewrite_declarations, ModuleKind};

pub fn run(cwd: &Path, dir: &Path, kind: ModuleKind, json: bool) -> Result<()> {
    let dir = cwd.join(dir);
    if !dir.is_dir() {
        return Err(failure(
            json,
            codes::DTS_DIR_NOT_FOUND,
            &format!("{} is not a directory", dir.display()),
        ));
    }

    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;
    let report = runtime.block_on(rewrite_declarations(&dir, kind));
    let batch_failure = report.check().err();

    if json {
        let mut out = serde_json::json!({
            "ok": batch_failure.is_none(),
            "schema_version": SCHEMA_VERSION,
            "dir": dir.to_string_lossy(),
            "kind": kind,
            "rewritten": report.rewritten,
            "errors": errors_json(&report.errors),
        });
        if let Some(err) = &batch_failure {
            out["error"] = serde_json::json!({
                "code": err.code(),
                "message": err.to_string(),
            });
        }
        println!("{out}");
        if batch_failure.is_some() {
            std::process::exit(1);
        }
        return Ok(());
    }

    println!(
        "Rewrote {} declaration file(s) as .{}",
        report.rewritten.len(),
        kind.declaration_ext()
    );
    for err in &report.errors {
        eprintln!("  x {err}");
    }

    match batch_failure {
        Some(err) => Err(error_failure(false, &err)),
        None => Ok(()),
    }
}
