//! Package.json `exports` model and resolution.
//!
//! - Normalization of the raw field into an ordered subpath map
//! - Wildcard expansion against the emitted output tree
//! - Runtime (`main`) and declaration (`types`) branch selection

mod branch;
mod manifest;
mod target;
mod wildcard;

pub use branch::{select_main, select_types, BranchOrder, MainSelection, ResolutionKind};
pub use manifest::{
    normalize_exports, ExportsManifest, PackageManifest, PACKAGE_JSON_KEY, ROOT_KEY,
};
pub use target::{ExportTarget, DEFAULT_CONDITION, TYPES_CONDITION};
pub use wildcard::{expand_wildcards, substitute_token, wildcard_count, WILDCARD};
