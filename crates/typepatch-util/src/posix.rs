//! Lexical POSIX path helpers.
//!
//! Package manifests always speak in `/`-separated paths regardless of the
//! host platform, so these helpers never touch the filesystem and never use
//! `std::path` separators.

/// Strip every leading `./` from a path.
///
/// `"././dist/a.js"` becomes `"dist/a.js"`; `"../x"` is returned unchanged.
#[must_use]
pub fn strip_dot_slash(path: &str) -> &str {
    let mut rest = path;
    while let Some(stripped) = rest.strip_prefix("./") {
        rest = stripped;
    }
    rest
}

/// Normalize a relative path lexically.
///
/// Backslashes become `/`, empty and `.` segments are dropped, and `..`
/// segments cancel the preceding segment when there is one. The result has
/// no leading `./` and no trailing `/`.
#[must_use]
pub fn normalize_posix(path: &str) -> String {
    let path = path.replace('\\', "/");
    let mut segments: Vec<&str> = Vec::new();

    for segment in path.split('/') {
        match segment {
            "" | "." => {}
            ".." => {
                if matches!(segments.last(), Some(last) if *last != "..") {
                    segments.pop();
                } else {
                    segments.push("..");
                }
            }
            other => segments.push(other),
        }
    }

    segments.join("/")
}

/// Express `to` relative to the directory `from_dir`.
///
/// Both inputs are interpreted relative to the same base. The result is
/// always prefixed with `./` or `../`.
///
/// ```
/// use typepatch_util::posix::relative_posix;
/// assert_eq!(relative_posix("sub", "cjs/sub.cjs"), "../cjs/sub.cjs");
/// assert_eq!(relative_posix("a/b", "a/b/index.js"), "./index.js");
/// ```
#[must_use]
pub fn relative_posix(from_dir: &str, to: &str) -> String {
    let from = normalize_posix(from_dir);
    let to = normalize_posix(to);

    let from_segments: Vec<&str> = from.split('/').filter(|s| !s.is_empty()).collect();
    let to_segments: Vec<&str> = to.split('/').filter(|s| !s.is_empty()).collect();

    let common = from_segments
        .iter()
        .zip(&to_segments)
        .take_while(|(a, b)| a == b)
        .count();

    let ups = from_segments.len() - common;
    let rest = to_segments[common..].join("/");

    if ups == 0 {
        format!("./{rest}")
    } else {
        format!("{}{rest}", "../".repeat(ups))
    }
}

/// Strip the extension from the final segment of a path.
///
/// Dotfiles (`.env`) and extensionless names are returned unchanged.
#[must_use]
pub fn strip_extension(path: &str) -> &str {
    let name_start = path.rfind('/').map_or(0, |i| i + 1);
    match path[name_start..].rfind('.') {
        Some(0) | None => path,
        Some(dot) => &path[..name_start + dot],
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strip_dot_slash() {
        assert_eq!(strip_dot_slash("./sub"), "sub");
        assert_eq!(strip_dot_slash("././sub"), "sub");
        assert_eq!(strip_dot_slash("sub"), "sub");
        assert_eq!(strip_dot_slash("../sub"), "../sub");
    }

    #[test]
    fn test_normalize_posix() {
        assert_eq!(normalize_posix("./dist//a.js"), "dist/a.js");
        assert_eq!(normalize_posix("dist/../esm/a.js"), "esm/a.js");
        assert_eq!(normalize_posix("..\\x\\y.js"), "../x/y.js");
        assert_eq!(normalize_posix("."), "");
    }

    #[test]
    fn test_relative_posix_sibling_tree() {
        assert_eq!(relative_posix("sub", "cjs/sub.cjs"), "../cjs/sub.cjs");
        assert_eq!(
            relative_posix("features/alpha", "dist/features/alpha.js"),
            "../../dist/features/alpha.js"
        );
    }

    #[test]
    fn test_relative_posix_descendant() {
        assert_eq!(relative_posix("a/b", "a/b/index.js"), "./index.js");
        assert_eq!(relative_posix("./a", "./a/lib/x.js"), "./lib/x.js");
    }

    #[test]
    fn test_relative_posix_partial_overlap() {
        assert_eq!(relative_posix("a/b", "a/c/x.js"), "../c/x.js");
    }

    #[test]
    fn test_strip_extension() {
        assert_eq!(strip_extension("dist/a.js"), "dist/a");
        assert_eq!(strip_extension("dist/a.d.ts"), "dist/a.d");
        assert_eq!(strip_extension("dist.v2/a"), "dist.v2/a");
        assert_eq!(strip_extension(".env"), ".env");
        assert_eq!(strip_extension("sub"), "sub");
    }
}
