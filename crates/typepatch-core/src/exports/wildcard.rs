//! Wildcard subpath expansion against the filesystem.
//!
//! `"./features/*": "./dist/features/*.js"` becomes one concrete entry per
//! file in `dist/features/` matching `*.js`. Only a single `*` per string is
//! supported; anything else is left unexpanded.

use super::manifest::ExportsManifest;
use super::target::ExportTarget;
use std::collections::{BTreeSet, HashMap};
use std::path::{Path, PathBuf};
use tracing::debug;
use typepatch_util::posix::normalize_posix;

/// The wildcard glyph in export keys and targets.
pub const WILDCARD: char = '*';

/// Number of wildcard glyphs in a string.
#[must_use]
pub fn wildcard_count(s: &str) -> usize {
    s.matches(WILDCARD).count()
}

/// A single-wildcard pattern split around its `*`.
#[derive(Debug, Clone, PartialEq, Eq)]
struct LeafPattern<'a> {
    /// Directory part of the prefix, root-relative.
    dir: String,
    /// File-name part of the prefix.
    file_prefix: &'a str,
    suffix: &'a str,
}

impl<'a> LeafPattern<'a> {
    fn parse(leaf: &'a str) -> Option<Self> {
        if wildcard_count(leaf) != 1 {
            return None;
        }
        let (prefix, suffix) = leaf.split_once(WILDCARD)?;
        let (dir, file_prefix) = match prefix.rfind('/') {
            Some(slash) => (&prefix[..slash], &prefix[slash + 1..]),
            None => ("", prefix),
        };
        Some(Self {
            dir: normalize_posix(dir),
            file_prefix,
            suffix,
        })
    }

    /// The token a file name stands for, if it matches.
    fn token_for<'n>(&self, name: &'n str) -> Option<&'n str> {
        let rest = name.strip_prefix(self.file_prefix)?;
        let token = rest.strip_suffix(self.suffix)?;
        (!token.is_empty() && !token.contains(WILDCARD)).then_some(token)
    }
}

/// Substitute a token for the single wildcard of every eligible string leaf.
///
/// Leaves without exactly one wildcard are left untouched.
#[must_use]
pub fn substitute_token(target: &ExportTarget, token: &str) -> ExportTarget {
    target.map_leaves(&|leaf| {
        if wildcard_count(leaf) == 1 {
            leaf.replacen(WILDCARD, token, 1)
        } else {
            leaf.to_string()
        }
    })
}

/// Replace every single-wildcard key with one concrete entry per discovered token.
///
/// Tokens are discovered across all string leaves of the key's target, so a
/// pattern referenced from several conditions yields the union of their
/// matches. Keys with no matches are dropped. Keys with more than one wildcard
/// pass through unexpanded. A concrete key already present in the manifest
/// always wins over an expansion.
pub async fn expand_wildcards(manifest: &ExportsManifest, root: &Path) -> ExportsManifest {
    let mut listings = DirListings::default();
    let mut expanded = ExportsManifest::new();

    for (key, target) in manifest.iter() {
        if wildcard_count(key) != 1 {
            expanded.insert(key, target.clone());
            continue;
        }

        let tokens = discover_tokens(target, root, &mut listings).await;
        if tokens.is_empty() {
            debug!(key, "wildcard export matched no files");
            continue;
        }

        for token in &tokens {
            let concrete = key.replacen(WILDCARD, token, 1);
            if manifest.contains_key(&concrete) || expanded.contains_key(&concrete) {
                debug!(key = %concrete, "explicit export shadows wildcard expansion");
                continue;
            }
            expanded.insert(concrete, substitute_token(target, token));
        }
        debug!(key, count = tokens.len(), "expanded wildcard export");
    }

    expanded
}

/// Distinct tokens matched by any single-wildcard leaf of `target`, sorted.
async fn discover_tokens(
    target: &ExportTarget,
    root: &Path,
    listings: &mut DirListings,
) -> BTreeSet<String> {
    let mut tokens = BTreeSet::new();

    for leaf in target.leaves() {
        let Some(pattern) = LeafPattern::parse(leaf) else {
            continue;
        };
        let files = listings.files_in(&root.join(&pattern.dir)).await;
        tokens.extend(
            files
                .iter()
                .filter_map(|name| pattern.token_for(name))
                .map(str::to_string),
        );
    }

    tokens
}

/// Immediate file names per directory, read once per expansion run.
#[derive(Default)]
struct DirListings {
    cache: HashMap<PathBuf, Vec<String>>,
}

impl DirListings {
    async fn files_in(&mut self, dir: &Path) -> &[String] {
        if !self.cache.contains_key(dir) {
            let files = match list_files(dir).await {
                Ok(files) => files,
                Err(e) => {
                    debug!(dir = %dir.display(), error = %e, "cannot list wildcard directory");
                    Vec::new()
                }
            };
            self.cache.insert(dir.to_path_buf(), files);
        }
        self.cache.get(dir).map_or(&[][..], Vec::as_slice)
    }
}

async fn list_files(dir: &Path) -> std::io::Result<Vec<String>> {
    let mut entries = tokio::fs::read_dir(dir).await?;
    let mut files = Vec::new();

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        let is_file = tokio::fs::metadata(&path)
            .await
            .map(|m| m.is_file())
            .unwrap_or(false);
        if !is_file {
            continue;
        }
        if let Some(name) = path.file_name().and_then(|n| n.to_str()) {
            files.push(name.to_string());
        }
    }

    files.sort();
    Ok(files)
}
