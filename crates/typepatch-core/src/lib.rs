#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::return_self_not_must_use)]

pub mod codes;
pub mod config;
pub mod dts;
pub mod error;
pub mod exports;
pub mod paths;
pub mod pool;
pub mod stubs;
pub mod version;

pub use config::Config;
pub use dts::{collect_declarations, rewrite_declarations, ModuleKind, RewriteReport};
pub use error::Error;
pub use exports::{
    expand_wildcards, normalize_exports, select_main, select_types, BranchOrder, ExportTarget,
    ExportsManifest, MainSelection, PackageManifest, ResolutionKind,
};
pub use pool::{TaskPool, MAX_CONCURRENT_DIR_SCANS, MAX_CONCURRENT_FILE_OPS};
pub use stubs::{
    explain_subpath, plan_stubs, write_stubs, StubContext, StubExplain, StubManifest, StubTask,
    WriteReport,
};
pub use version::VERSION;
