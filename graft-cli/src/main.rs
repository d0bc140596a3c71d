//! Graft — lifecycle CLI for signed generated files.
//!
//! # Usage
//!
//! ```text
//! graft verify-signed <path> [path ...]
//! graft status <path> [path ...] [--json]
//! graft sections <file>
//! graft commit <target> --from <file|-> [--root <dir>] [--legacy <path>]...
//!              [--rekey <new=old[,old...]>]... [--rekey-file <yaml>]
//!              [--clobber] [--create-only] [--unsigned] [--dry-run]
//! ```

mod commands;

use anyhow::Result;
use clap::{Parser, Subcommand};

use commands::{
    commit::CommitArgs, sections::SectionsArgs, status::StatusArgs, verify::VerifyArgs,
};

// ---------------------------------------------------------------------------
// CLI entry point
// ---------------------------------------------------------------------------

#[derive(Parser, Debug)]
#[command(
    name = "graft",
    version,
    about = "Verify, inspect, and regenerate signed generated files",
    long_about = None,
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Check seals on files or whole directory trees.
    VerifySigned(VerifyArgs),

    /// Show seal state per file without failing the process.
    Status(StatusArgs),

    /// List the manual sections a file declares.
    Sections(SectionsArgs),

    /// Commit a pre-rendered skeleton to a target file.
    Commit(CommitArgs),
}

// ---------------------------------------------------------------------------
// Main
// ---------------------------------------------------------------------------

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();
    match cli.command {
        Commands::VerifySigned(args) => args.run(),
        Commands::Status(args) => args.run(),
        Commands::Sections(args) => args.run(),
        Commands::Commit(args) => args.run(),
    }
}
