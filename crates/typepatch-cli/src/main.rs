#![deny(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

mod commands;
mod logging;

use clap::Parser;
use miette::Result;
use std::path::PathBuf;
use typepatch_core::{Config, ModuleKind, ResolutionKind};

#[derive(Parser, Debug)]
#[command(name = "typepatch")]
#[command(
    author,
    version,
    about = "Post-build patching for dual ESM/CJS TypeScript packages",
    long_about = None
)]
struct Cli {
    /// Increase logging verbosity (-v for DEBUG, -vv for TRACE)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Emit JSON formatted output (stable, machine-readable)
    #[arg(long, global = true)]
    json: bool,

    /// Override the working directory
    #[arg(long, global = true, value_name = "PATH")]
    cwd: Option<PathBuf>,

    #[command(subcommand)]
    command: Option<Commands>,
}

#[derive(clap::Subcommand, Debug)]
enum Commands {
    /// Print version information
    Version,

    /// Write redirect package.json stubs for exported subpaths
    Stubs {
        /// Runtime branch to prefer: import or require
        #[arg(long, default_value = "import", value_name = "KIND")]
        prefer: ResolutionKind,

        /// Only print the planned stubs without writing them
        #[arg(long)]
        dry_run: bool,
    },

    /// Show how one exported subpath resolves
    Explain {
        /// Subpath to explain (e.g. "./sub" or "sub")
        subpath: String,

        /// Runtime branch to prefer: import or require
        #[arg(long, default_value = "import", value_name = "KIND")]
        prefer: ResolutionKind,
    },

    /// Rename .d.ts files to .d.mts/.d.cts and rewrite their specifiers
    Dts {
        /// Build output directory holding the declarations
        dir: PathBuf,

        /// Module kind the directory was compiled for: esm or cjs
        #[arg(long, value_name = "KIND")]
        kind: ModuleKind,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Determine working directory
    let cwd = cli
        .cwd
        .or_else(|| std::env::current_dir().ok())
        .unwrap_or_else(|| PathBuf::from("."));

    let config = Config::new(cwd.clone())
        .with_verbosity(cli.verbose)
        .with_json_logs(cli.json);

    logging::init(config.verbosity, config.json_logs);

    match cli.command {
        Some(Commands::Version) | None => commands::version::run(cli.json),
        Some(Commands::Stubs { prefer, dry_run }) => {
            let span = tracing::info_span!("stubs", cmd = "stubs", cwd = %config.cwd.display());
            let _guard = span.enter();
            commands::stubs::run(&config.cwd, prefer, dry_run, cli.json)
        }
        Some(Commands::Explain { subpath, prefer }) => {
            let span = tracing::info_span!("explain", cmd = "explain", cwd = %config.cwd.display());
            let _guard = span.enter();
            commands::explain::run(&config.cwd, &subpath, prefer, cli.json)
        }
        Some(Commands::Dts { dir, kind }) => {
            let span = tracing::info_span!("dts", cmd = "dts", cwd = %config.cwd.display());
            let _guard = span.enter();
            commands::dts::run(&config.cwd, &dir, kind, cli.json)
        }
    }
}
