//! Text-level rewriting of one declaration file and its source map.

use super::ModuleKind;
use crate::error::Error;
use regex_lite::Regex;
use std::path::{Path, PathBuf};
use std::sync::OnceLock;
use tracing::warn;
use typepatch_util::fs::{atomic_write, read_optional, read_to_string_lossy, remove_if_exists};

/// Extension of declaration files as emitted by the compiler.
pub const EMITTED_DECLARATION_EXT: &str = ".d.ts";

/// Relative specifiers ending in `.js` inside `from`, `import(...)` and bare `import`.
const SPECIFIER_PATTERN: &str =
    r#"(\bfrom\s*|\bimport\s*\(\s*|\bimport\s+)(["'])(\.\.?/[^"'\n]*?)\.js(["'])"#;

const SOURCE_MAPPING_URL_PATTERN: &str = r"(//# sourceMappingURL=)(\S+?)\.d\.ts\.map";

fn specifier_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SPECIFIER_PATTERN).ok()).as_ref()
}

fn source_mapping_url_regex() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(SOURCE_MAPPING_URL_PATTERN).ok())
        .as_ref()
}

/// Whether a path is an emitted `.d.ts` (not `.d.mts`/`.d.cts`).
#[must_use]
pub fn is_declaration_file(path: &Path) -> bool {
    path.file_name()
        .and_then(|n| n.to_str())
        .is_some_and(|n| {
            n.len() > EMITTED_DECLARATION_EXT.len() && n.ends_with(EMITTED_DECLARATION_EXT)
        })
}

/// Where a declaration file lands for the given module kind.
#[must_use]
pub fn declaration_target(path: &Path, kind: ModuleKind) -> Option<PathBuf> {
    let name = path.file_name()?.to_str()?;
    let stem = name.strip_suffix(EMITTED_DECLARATION_EXT)?;
    Some(path.with_file_name(format!("{stem}.{}", kind.declaration_ext())))
}

/// Point relative `.js` specifiers at the kind's runtime extension.
#[must_use]
pub fn rewrite_specifiers(source: &str, kind: ModuleKind) -> String {
    let Some(re) = specifier_regex() else {
        return source.to_string();
    };
    let replacement = format!("${{1}}${{2}}${{3}}.{}${{4}}", kind.runtime_ext());
    re.replace_all(source, replacement.as_str()).into_owned()
}

/// Point the trailing `sourceMappingURL` comment at the renamed map.
#[must_use]
pub fn rewrite_source_mapping_url(source: &str, kind: ModuleKind) -> String {
    let Some(re) = source_mapping_url_regex() else {
        return source.to_string();
    };
    let replacement = format!("${{1}}${{2}}.{}.map", kind.declaration_ext());
    re.replace_all(source, replacement.as_str()).into_owned()
}

/// Set a source map's `file` field. `None` if the map is not a JSON object.
#[must_use]
pub fn rewrite_source_map(map: &str, file_name: &str) -> Option<String> {
    let mut value: serde_json::Value = serde_json::from_str(map).ok()?;
    let object = value.as_object_mut()?;
    object.insert(
        "file".to_string(),
        serde_json::Value::String(file_name.to_string()),
    );
    serde_json::to_string(&value).ok()
}

/// Rewrite and rename one declaration file, plus its map if there is one.
///
/// A missing map is ignored. A malformed map is left untouched (and the
/// declaration keeps pointing at it) while the declaration itself is still
/// rewritten. Returns the new declaration path.
pub fn rewrite_declaration_file(path: &Path, kind: ModuleKind) -> Result<PathBuf, Error> {
    let io_error = |source| Error::DeclarationRewrite {
        path: path.to_path_buf(),
        source,
    };

    let new_path = declaration_target(path, kind).ok_or_else(|| {
        io_error(std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            "not a .d.ts file",
        ))
    })?;
    let new_name = new_path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or_default()
        .to_string();

    let source = read_to_string_lossy(path).map_err(io_error)?;
    let mut rewritten = rewrite_specifiers(&source, kind);

    let map_path = append_map_ext(path);
    let mut stale_map = None;
    if let Some(map) = read_optional(&map_path).map_err(io_error)? {
        match rewrite_source_map(&map, &new_name) {
            Some(new_map) => {
                atomic_write(&append_map_ext(&new_path), new_map.as_bytes()).map_err(io_error)?;
                rewritten = rewrite_source_mapping_url(&rewritten, kind);
                stale_map = Some(map_path);
            }
            None => {
                warn!(map = %map_path.display(), "malformed source map; leaving it unchanged");
            }
        }
    }

    atomic_write(&new_path, rewritten.as_bytes()).map_err(io_error)?;
    remove_if_exists(path).map_err(io_error)?;
    if let Some(stale_map) = stale_map {
        remove_if_exists(&stale_map).map_err(io_error)?;
    }

    Ok(new_path)
}

fn append_map_ext(path: &Path) -> PathBuf {
    let mut os = path.as_os_str().to_owned();
    os.push(".map");
    PathBuf::from(os)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_is_declaration_file() {
        assert!(is_declaration_file(Path::new("dist/index.d.ts")));
        assert!(!is_declaration_file(Path::new("dist/index.d.mts")));
        assert!(!is_declaration_file(Path::new("dist/index.ts")));
        assert!(!is_declaration_file(Path::new("dist/index.d.ts.map")));
        assert!(!is_declaration_file(Path::new(".d.ts")));
    }

    #[test]
    fn test_declaration_target() {
        assert_eq!(
            declaration_target(Path::new("/out/a.d.ts"), ModuleKind::Esm),
            Some(PathBuf::from("/out/a.d.mts"))
        );
        assert_eq!(
            declaration_target(Path::new("/out/a.d.ts"), ModuleKind::Cjs),
            Some(PathBuf::from("/out/a.d.cts"))
        );
        assert_eq!(declaration_target(Path::new("/out/a.ts"), ModuleKind::Cjs), None);
    }

    #[test]
    fn test_rewrite_specifiers() {
        let source = r#"import { A } from "./a.js";
export * from '../b/c.js';
export type T = import("./t.js").T;
import "./side.js";
import { x } from "pkg/x.js";
import { y } from "./y.json";
"#;
        let out = rewrite_specifiers(source, ModuleKind::Cjs);
        assert!(out.contains(r#"from "./a.cjs""#));
        assert!(out.contains("from '../b/c.cjs'"));
        assert!(out.contains(r#"import("./t.cjs")"#));
        assert!(out.contains(r#"import "./side.cjs""#));
        assert!(out.contains(r#"from "pkg/x.js""#));
        assert!(out.contains(r#"from "./y.json""#));
    }

    #[test]
    fn test_rewrite_specifiers_esm() {
        assert_eq!(
            rewrite_specifiers(r#"export { a } from "./a.js";"#, ModuleKind::Esm),
            r#"export { a } from "./a.mjs";"#
        );
    }

    #[test]
    fn test_rewrite_source_mapping_url() {
        assert_eq!(
            rewrite_source_mapping_url("//# sourceMappingURL=index.d.ts.map", ModuleKind::Esm),
            "//# sourceMappingURL=index.d.mts.map"
        );
    }

    #[test]
    fn test_rewrite_source_map() {
        let out = rewrite_source_map(
            r#"{"version":3,"file":"a.d.ts","sources":["../src/a.ts"],"mappings":""}"#,
            "a.d.cts",
        )
        .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out).unwrap();
        assert_eq!(value["file"], "a.d.cts");
        assert_eq!(value["sources"][0], "../src/a.ts");

        assert!(rewrite_source_map("{ nope", "a.d.cts").is_none());
        assert!(rewrite_source_map("[1, 2]", "a.d.cts").is_none());
    }

    #[test]
    fn test_rewrite_file_with_map() {
        let dir = tempdir().unwrap();
        let dts = dir.path().join("index.d.ts");
        fs::write(
            &dts,
            "export * from './util.js';\n//# sourceMappingURL=index.d.ts.map\n",
        )
        .unwrap();
        fs::write(
            dir.path().join("index.d.ts.map"),
            r#"{"version":3,"file":"index.d.ts","sources":[],"mappings":""}"#,
        )
        .unwrap();

        let new_path = rewrite_declaration_file(&dts, ModuleKind::Cjs).unwrap();
        assert_eq!(new_path, dir.path().join("index.d.cts"));
        assert!(!dts.exists());
        assert!(!dir.path().join("index.d.ts.map").exists());

        let content = fs::read_to_string(&new_path).unwrap();
        assert!(content.contains("from './util.cjs'"));
        assert!(content.contains("sourceMappingURL=index.d.cts.map"));

        let map: serde_json::Value = serde_json::from_str(
            &fs::read_to_string(dir.path().join("index.d.cts.map")).unwrap(),
        )
        .unwrap();
        assert_eq!(map["file"], "index.d.cts");
    }

    #[test]
    fn test_rewrite_file_without_map() {
        let dir = tempdir().unwrap();
        let dts = dir.path().join("a.d.ts");
        fs::write(&dts, "export declare const a: 1;\n").unwrap();

        let new_path = rewrite_declaration_file(&dts, ModuleKind::Esm).unwrap();
        assert_eq!(
            fs::read_to_string(new_path).unwrap(),
            "export declare const a: 1;\n"
        );
        assert!(!dir.path().join("a.d.mts.map").exists());
    }

    #[test]
    fn test_malformed_map_still_renames_declaration() {
        let dir = tempdir().unwrap();
        let dts = dir.path().join("a.d.ts");
        fs::write(&dts, "export {};\n//# sourceMappingURL=a.d.ts.map\n").unwrap();
        fs::write(dir.path().join("a.d.ts.map"), "{ broken").unwrap();

        let new_path = rewrite_declaration_file(&dts, ModuleKind::Esm).unwrap();
        assert!(new_path.exists());
        assert!(!dts.exists());
        assert_eq!(
            fs::read_to_string(dir.path().join("a.d.ts.map")).unwrap(),
            "{ broken"
        );
        assert!(fs::read_to_string(&new_path)
            .unwrap()
            .contains("sourceMappingURL=a.d.ts.map"));
    }
}
