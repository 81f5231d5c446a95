//! Which subpaths legacy resolution already reaches.

use crate::exports::{wildcard_count, ExportTarget, PACKAGE_JSON_KEY, ROOT_KEY};
use typepatch_util::posix::{normalize_posix, strip_extension};

/// Extensions a legacy resolver tries after a bare path and after `/index`.
pub const LEGACY_EXTENSIONS: [&str; 5] = ["js", "cjs", "mjs", "json", "node"];

/// Keys that never get a redirect stub.
///
/// The root, the manifest itself, unexpanded patterns, anything that is
/// not a `./` subpath, and keys with `..` segments that would leave the root.
#[must_use]
pub fn is_excluded_key(key: &str) -> bool {
    key == ROOT_KEY
        || key == PACKAGE_JSON_KEY
        || wildcard_count(key) > 0
        || !key.starts_with("./")
        || escapes_root(key)
        || normalize_posix(key).is_empty()
}

fn escapes_root(key: &str) -> bool {
    key.split(['/', '\\']).any(|segment| segment == "..")
}

/// The subpath maps straight onto a file of the same name.
#[must_use]
pub fn is_direct_match(key: &str, target: &ExportTarget) -> bool {
    target
        .as_literal()
        .is_some_and(|path| normalize_posix(path) == normalize_posix(key))
}

/// Legacy resolution reaches `main` from `key` without help.
///
/// Candidates are the bare key plus `key.<ext>` and `key/index.<ext>` for every
/// legacy extension. `main` qualifies when it, or its extension-stripped form,
/// is a candidate or equals the key with its own extension stripped. This is a
/// naming check only; nothing is looked up on disk.
#[must_use]
pub fn is_legacy_resolvable(key: &str, main: &str) -> bool {
    let key = normalize_posix(key);
    let main = normalize_posix(main);
    let main_stem = strip_extension(&main);
    let key_stem = strip_extension(&key);

    let mut candidates = Vec::with_capacity(1 + LEGACY_EXTENSIONS.len() * 2);
    candidates.push(key.clone());
    for ext in LEGACY_EXTENSIONS {
        candidates.push(format!("{key}.{ext}"));
        candidates.push(format!("{key}/index.{ext}"));
    }

    candidates
        .iter()
        .any(|c| c.as_str() == main || c.as_str() == main_stem)
        || main == key_stem
        || main_stem == key_stem
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_excluded_keys() {
        assert!(is_excluded_key("."));
        assert!(is_excluded_key("./package.json"));
        assert!(is_excluded_key("./features/*"));
        assert!(is_excluded_key("import"));
        assert!(is_excluded_key("./"));
        assert!(is_excluded_key("./../evil"));
        assert!(is_excluded_key("./a/../../b"));
        assert!(is_excluded_key("./a/../b"));
        assert!(!is_excluded_key("./sub"));
        assert!(!is_excluded_key("./a/b"));
    }

    #[test]
    fn test_direct_match() {
        assert!(is_direct_match("./sub.js", &ExportTarget::from("./sub.js")));
        assert!(is_direct_match("./sub.js", &ExportTarget::from("sub.js")));
        assert!(!is_direct_match("./sub", &ExportTarget::from("./dist/sub.js")));
        assert!(!is_direct_match(
            "./sub.js",
            &ExportTarget::List(vec![ExportTarget::from("./sub.js")])
        ));
    }

    #[test]
    fn test_legacy_resolvable_extension_candidates() {
        assert!(is_legacy_resolvable("./sub", "./sub.js"));
        assert!(is_legacy_resolvable("./sub", "./sub.cjs"));
        assert!(is_legacy_resolvable("./sub", "./sub/index.mjs"));
        assert!(is_legacy_resolvable("./data", "./data.json"));
        assert!(is_legacy_resolvable("./addon", "./addon/index.node"));
    }

    #[test]
    fn test_legacy_resolvable_stems() {
        assert!(is_legacy_resolvable("./sub", "./sub.ts"));
        assert!(is_legacy_resolvable("./sub.js", "./sub.cjs"));
        assert!(is_legacy_resolvable("./sub/index", "./sub/index.js"));
    }

    #[test]
    fn test_nested_output_not_legacy_resolvable() {
        assert!(!is_legacy_resolvable("./sub", "./cjs/sub.cjs"));
        assert!(!is_legacy_resolvable("./a", "./dist/a.js"));
        assert!(!is_legacy_resolvable("./sub", "./sub/lib/main.js"));
    }
}
