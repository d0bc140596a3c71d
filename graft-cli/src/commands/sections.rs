//! `graft sections` — list the manual sections a file declares.
//!
//! Handy when writing a rekey map: run it against the old file to see the
//! exact keys to redirect.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Args;

use graft_core::extract;

/// Arguments for `graft sections`.
#[derive(Args, Debug)]
pub struct SectionsArgs {
    /// File to inspect.
    pub file: PathBuf,
}

impl SectionsArgs {
    pub fn run(self) -> Result<()> {
        let text = fs::read_to_string(&self.file)
            .with_context(|| format!("failed to read {}", self.file.display()))?;
        let sections = extract(&text)
            .with_context(|| format!("malformed sections in {}", self.file.display()))?;

        if sections.is_empty() {
            println!("no manual sections in {}", self.file.display());
            return Ok(());
        }
        for (key, body) in &sections {
            let lines = body.lines().count();
            println!("{key}  ({lines} line(s))");
        }
        Ok(())
    }
}
