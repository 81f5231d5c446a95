//! `typepatch stubs` command implementation.
//!
//! Plans redirect `package.json` stubs for every exported subpath and writes
//! them, or just prints the plan with `--dry-run`.

use super::{error_failure, errors_json, load_context};
use miette::{IntoDiagnostic, Result};
use std::path::Path;
use typepatch_core::version::SCHEMA_VERSION;
use typepatch_core::{plan_stubs, write_stubs, ResolutionKind, TaskPool, MAX_CONCURRENT_FILE_OPS};

pub fn run(cwd: &Path, prefer: ResolutionKind, dry_run: bool, json: bool) -> Result<()> {
    let ctx = load_context(cwd, prefer, json)?;
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;

    let tasks = runtime.block_on(plan_stubs(&ctx));

    if dry_run {
        if json {
            println!(
                "{}",
                serde_json::json!({
                    "ok": true,
                    "schema_version": SCHEMA_VERSION,
                    "root": ctx.root.to_string_lossy(),
                    "prefer": prefer.as_str(),
                    "dry_run": true,
                    "tasks": tasks,
                })
            );
        } else if tasks.is_empty() {
            println!("No redirect stubs needed.");
        } else {
            println!("Planned {} redirect stub(s):", tasks.len());
            for task in &tasks {
                match &task.manifest {
                    Some(manifest) => println!("  {} -> {}", task.subpath, manifest.main),
                    None => println!("  {} (no runtime target)", task.subpath),
                }
            }
        }
        return Ok(());
    }

    let report = runtime.block_on(write_stubs(&tasks, &TaskPool::new(MAX_CONCURRENT_FILE_OPS)));
    let batch_failure = report.check().err();

    if json {
        let mut out = serde_json::json!({
            "ok": batch_failure.is_none(),
            "schema_version": SCHEMA_VERSION,
            "root": ctx.root.to_string_lossy(),
            "prefer": prefer.as_str(),
            "dry_run": false,
            "planned": tasks.len(),
            "written": report.written,
            "collisions": report.collisions,
            "unresolved": report.unresolved,
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

    if report.written.is_empty() {
        println!("No redirect stubs written.");
    } else {
        println!("Wrote {} redirect stub(s):", report.written.len());
        for path in &report.written {
            let shown = path.strip_prefix(&ctx.root).unwrap_or(path);
            println!("  + {}", shown.display());
        }
    }
    for path in &report.collisions {
        println!("  ! {} is not a directory; skipped", path.display());
    }
    for subpath in &report.unresolved {
        println!("  ? {subpath} has no runtime target; skipped");
    }
    for err in &report.errors {
        eprintln!("  x {err}");
    }

    match batch_failure {
        Some(err) => Err(error_failure(false, &err)),
        None => Ok(()),
    }
}
