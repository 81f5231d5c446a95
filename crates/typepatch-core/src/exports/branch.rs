//! Conditional branch resolution.
//!
//! Two walks over the same [`ExportTarget`]: one picks the runtime file, the
//! other picks the declaration file relative to the branches the first walk
//! actually took. Runtime loaders and type checkers read different keys, and
//! ESM/CJS builds commonly ship distinct `.d.ts`/`.d.cts` files, so the types
//! search has to start from the chosen runtime branch.

use super::target::{ExportTarget, DEFAULT_CONDITION, TYPES_CONDITION};

/// Resolution kind determines which conditional export to prefer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ResolutionKind {
    /// ESM import (prefer "import" condition)
    #[default]
    Import,
    /// CJS require (prefer "require" condition)
    Require,
}

impl ResolutionKind {
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Import => "import",
            Self::Require => "require",
        }
    }
}

impl std::fmt::Display for ResolutionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for ResolutionKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "import" | "esm" => Ok(Self::Import),
            "require" | "cjs" => Ok(Self::Require),
            other => Err(format!(
                "invalid preference '{other}'. Use: import or require"
            )),
        }
    }
}

/// Priority order over condition names, highest first.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BranchOrder {
    conditions: Vec<String>,
}

impl BranchOrder {
    /// A caller-defined priority order.
    pub fn new<I, S>(conditions: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            conditions: conditions.into_iter().map(Into::into).collect(),
        }
    }

    /// The fixed order for a module-format preference.
    ///
    /// `node` always outranks `browser`, whichever format is preferred.
    #[must_use]
    pub fn for_kind(kind: ResolutionKind) -> Self {
        match kind {
            ResolutionKind::Import => {
                Self::new(["import", "node", DEFAULT_CONDITION, "require", "browser"])
            }
            ResolutionKind::Require => {
                Self::new(["require", "node", DEFAULT_CONDITION, "import", "browser"])
            }
        }
    }

    #[must_use]
    pub fn conditions(&self) -> &[String] {
        &self.conditions
    }

    #[must_use]
    pub fn contains(&self, condition: &str) -> bool {
        self.conditions.iter().any(|c| c == condition)
    }

    /// Keys of a condition map outside this order, in alphabetical order.
    ///
    /// `default` and `types` are never part of the remainder.
    fn remaining_keys<'a>(&self, map: &'a indexmap::IndexMap<String, ExportTarget>) -> Vec<&'a str> {
        let mut keys: Vec<&str> = map
            .keys()
            .map(String::as_str)
            .filter(|k| *k != DEFAULT_CONDITION && *k != TYPES_CONDITION && !self.contains(k))
            .collect();
        keys.sort_unstable();
        keys
    }
}

impl From<ResolutionKind> for BranchOrder {
    fn from(kind: ResolutionKind) -> Self {
        Self::for_kind(kind)
    }
}

/// Result of the runtime walk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MainSelection {
    /// The selected runtime path, as written in the manifest.
    pub path: String,
    /// Condition keys descended through, outermost first.
    pub trail: Vec<String>,
}

impl MainSelection {
    /// The innermost condition that led to the runtime path.
    #[must_use]
    pub fn chosen_branch(&self) -> Option<&str> {
        self.trail.last().map(String::as_str)
    }
}

/// Select the runtime path for a target.
///
/// At each condition map: the first condition of `order` present wins; then a
/// literal `default`; then the remaining keys alphabetically. Lists are tried
/// left to right. A branch that resolves to nothing falls through to the next
/// candidate.
#[must_use]
pub fn select_main(target: &ExportTarget, order: &BranchOrder) -> Option<MainSelection> {
    let mut trail = Vec::new();
    let path = walk_main(target, order, &mut trail)?;
    Some(MainSelection { path, trail })
}

fn walk_main(target: &ExportTarget, order: &BranchOrder, trail: &mut Vec<String>) -> Option<String> {
    match target {
        ExportTarget::Literal(path) => (!path.is_empty()).then(|| path.clone()),
        ExportTarget::List(items) => items.iter().find_map(|item| walk_main(item, order, trail)),
        ExportTarget::Conditional(map) => {
            for condition in order.conditions() {
                if let Some(branch) = map.get(condition) {
                    if let Some(path) = descend(condition, branch, order, trail) {
                        return Some(path);
                    }
                }
            }

            if let Some(path) = map
                .get(DEFAULT_CONDITION)
                .and_then(ExportTarget::as_literal)
                .filter(|p| !p.is_empty())
            {
                trail.push(DEFAULT_CONDITION.to_string());
                return Some(path.to_string());
            }

            order
                .remaining_keys(map)
                .into_iter()
                .find_map(|key| descend(key, &map[key], order, trail))
        }
    }
}

fn descend(
    key: &str,
    branch: &ExportTarget,
    order: &BranchOrder,
    trail: &mut Vec<String>,
) -> Option<String> {
    trail.push(key.to_string());
    let found = walk_main(branch, order, trail);
    if found.is_none() {
        trail.pop();
    }
    found
}

/// Select the declaration path for a target.
///
/// `selection` is the runtime walk's result; the search starts from the
/// branches it took. Priority at the top-level condition map:
/// 1. `types` along the chosen branch path (deepest first)
/// 2. this node's own `types`
/// 3. `types` directly under the other conditions of `order`
/// 4. a deep search of the remaining keys alphabetically, then of every
///    condition of `order`
///
/// Falls back to `package_types` when the tree has no `types` leaf at all.
#[must_use]
pub fn select_types(
    target: &ExportTarget,
    order: &BranchOrder,
    selection: Option<&MainSelection>,
    package_types: Option<&str>,
) -> Option<String> {
    let trail = selection.map_or(&[][..], |s| s.trail.as_slice());
    walk_types(target, order, trail).or_else(|| package_types.map(str::to_string))
}

fn walk_types(target: &ExportTarget, order: &BranchOrder, trail: &[String]) -> Option<String> {
    match target {
        ExportTarget::Literal(_) => None,
        ExportTarget::List(items) => items.iter().find_map(|item| walk_types(item, order, trail)),
        ExportTarget::Conditional(map) => {
            let chosen = trail
                .split_first()
                .filter(|(head, _)| map.contains_key(head.as_str()));

            if let Some((head, rest)) = chosen {
                if let Some(found) = chosen_types(&map[head.as_str()], rest) {
                    return Some(found);
                }
            }

            if let Some(found) = target.types_leaf() {
                return Some(found.to_string());
            }

            let chosen_key = chosen.map(|(head, _)| head.as_str());
            let sibling = order
                .conditions()
                .iter()
                .filter(|c| Some(c.as_str()) != chosen_key)
                .filter_map(|c| map.get(c))
                .find_map(ExportTarget::types_leaf);
            if let Some(found) = sibling {
                return Some(found.to_string());
            }

            order
                .remaining_keys(map)
                .into_iter()
                .filter_map(|k| map.get(k))
                .chain(order.conditions().iter().filter_map(|c| map.get(c)))
                .find_map(|branch| walk_types(branch, order, &[]))
        }
    }
}

/// `types` leaves along the chosen path only, deepest first.
fn chosen_types(target: &ExportTarget, trail: &[String]) -> Option<String> {
    match target {
        ExportTarget::Literal(_) => None,
        ExportTarget::List(items) => items.iter().find_map(|item| chosen_types(item, trail)),
        ExportTarget::Conditional(map) => trail
            .split_first()
            .and_then(|(head, rest)| map.get(head.as_str()).map(|branch| (branch, rest)))
            .and_then(|(branch, rest)| chosen_types(branch, rest))
            .or_else(|| target.types_leaf().map(str::to_string)),
    }
}
