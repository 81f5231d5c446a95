//! `typepatch explain` command implementation.
//!
//! Shows how one exported subpath resolves and what stub planning does with it.

use super::{failure, load_context};
use miette::{IntoDiagnostic, Result};
use std::path::Path;
use typepatch_core::codes;
use typepatch_core::version::SCHEMA_VERSION;
use typepatch_core::{explain_subpath, ResolutionKind};

pub fn run(cwd: &Path, subpath: &str, prefer: ResolutionKind, json: bool) -> Result<()> {
    let ctx = load_context(cwd, prefer, json)?;
    let runtime = tokio::runtime::Runtime::new().into_diagnostic()?;

    let Some(explain) = runtime.block_on(explain_subpath(&ctx, subpath)) else {
        return Err(failure(
            json,
            codes::SUBPATH_NOT_EXPORTED,
            &format!("subpath '{subpath}' is not exported"),
        ));
    };

    if json {
        println!(
            "{}",
            serde_json::json!({
                "ok": true,
                "schema_version": SCHEMA_VERSION,
                "prefer": prefer.as_str(),
                "explain": explain,
            })
        );
        return Ok(());
    }

    println!("{} ({})", explain.subpath, explain.disposition.as_str());
    match &explain.main {
        Some(main) if explain.trail.is_empty() => println!("  main:  {main}"),
        Some(main) => println!("  main:  {main} (via {})", explain.trail.join(" > ")),
        None => println!("  main:  <none>"),
    }
    println!("  types: {}", explain.types.as_deref().unwrap_or("<none>"));
    if let Some(task) = &explain.task {
        println!("  stub:  {}", task.manifest_path.display());
        if let Some(manifest) = &task.manifest {
            println!("         main -> {}", manifest.main);
            if let Some(types) = &manifest.types {
                println!("         types -> {types}");
            }
        }
    }

    Ok(())
}
