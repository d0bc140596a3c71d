//! `graft verify-signed` — pass/fail seal checks with an aggregate exit
//! code.

use std::path::PathBuf;

use anyhow::Result;
use clap::Args;

use graft_core::{is_signed, is_validly_signed};

use super::walk::{collect_files, read_text};

/// Arguments for `graft verify-signed`.
#[derive(Args, Debug)]
pub struct VerifyArgs {
    /// Files or directories to check (directories walked recursively).
    #[arg(required = true)]
    pub paths: Vec<PathBuf>,
}

impl VerifyArgs {
    pub fn run(self) -> Result<()> {
        let files = collect_files(&self.paths)?;
        let mut failed = 0usize;

        for file in &files {
            let text = match read_text(file) {
                Ok(Some(text)) => text,
                // Unreadable file inside a directory walk: not an artifact.
                Ok(None) => continue,
                Err(e) => {
                    eprintln!("ERROR: {}: {e}", file.path.display());
                    failed += 1;
                    continue;
                }
            };
            // Unsigned files have nothing to check and pass silently.
            if !is_signed(&text) {
                continue;
            }
            // An unverifiable partial seal counts as a failing file, not a
            // fatal error; the rest of the run continues.
            if is_validly_signed(&text).unwrap_or(false) {
                println!("OK: {}", file.path.display());
            } else {
                eprintln!("MODIFIED: {}", file.path.display());
                failed += 1;
            }
        }

        if failed > 0 {
            anyhow::bail!("{failed} file(s) failed verification");
        }
        Ok(())
    }
}
