//! `graft commit` — commit a pre-rendered skeleton to a target file.
//!
//! The skeleton normally comes from a generator invoking `graft-commit` as
//! a library; this command covers scripted pipelines where the rendered
//! text already sits in a file (or arrives on stdin with `--from -`).

use std::fs;
use std::io::Read;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::Args;

use graft_commit::{commit, CommitOptions, CommitOutcome};
use graft_core::RekeyMap;

/// Arguments for `graft commit`.
#[derive(Args, Debug)]
pub struct CommitArgs {
    /// Target file, resolved under --root unless absolute.
    pub target: PathBuf,

    /// File holding the rendered skeleton, or `-` for stdin.
    #[arg(long, value_name = "FILE")]
    pub from: PathBuf,

    /// Root directory the commit resolves paths under.
    #[arg(long, default_value = ".")]
    pub root: PathBuf,

    /// Legacy path whose manual sections are also harvested (repeatable).
    #[arg(long, value_name = "PATH")]
    pub legacy: Vec<PathBuf>,

    /// Section rename, `new=old` or `new=old1,old2` (repeatable; first
    /// candidate with content wins).
    #[arg(long, value_name = "SPEC")]
    pub rekey: Vec<String>,

    /// YAML file of section renames (`new_key: [old, older]`).
    #[arg(long, value_name = "FILE")]
    pub rekey_file: Option<PathBuf>,

    /// Overwrite a target that fails verification, losing its sections.
    #[arg(long)]
    pub clobber: bool,

    /// Never touch an already-existing target.
    #[arg(long)]
    pub create_only: bool,

    /// Skip signature checks and write unsealed output.
    #[arg(long)]
    pub unsigned: bool,

    /// Report what would happen without writing.
    #[arg(long)]
    pub dry_run: bool,
}

impl CommitArgs {
    pub fn run(self) -> Result<()> {
        let mut rekey = match &self.rekey_file {
            Some(path) => RekeyMap::from_file(path)
                .with_context(|| format!("failed to load rekey map {}", path.display()))?,
            None => RekeyMap::new(),
        };
        // --rekey flags layer over the file, later flags winning.
        let mut flag_map = RekeyMap::new();
        for spec in &self.rekey {
            let (new_key, old_keys) = parse_rekey_spec(spec)?;
            flag_map.insert(new_key, old_keys);
        }
        rekey.extend(flag_map);

        let options = CommitOptions {
            signed: !self.unsigned,
            clobber: self.clobber,
            create_only: self.create_only,
            dry_run: self.dry_run,
            rekey,
        };

        let from = self.from.clone();
        let outcome = commit(
            &self.root,
            &self.target,
            &self.legacy,
            move || read_skeleton(&from),
            &options,
        )
        .with_context(|| format!("commit failed for {}", self.target.display()))?;

        print_outcome(&outcome, self.dry_run);
        Ok(())
    }
}

fn read_skeleton(path: &Path) -> Result<String, std::io::Error> {
    if path == Path::new("-") {
        let mut buf = String::new();
        std::io::stdin().read_to_string(&mut buf)?;
        Ok(buf)
    } else {
        fs::read_to_string(path)
    }
}

fn parse_rekey_spec(spec: &str) -> Result<(String, Vec<String>)> {
    let invalid = || format!("invalid --rekey '{spec}'; expected new=old[,old...]");
    let (new_key, old_part) = spec.split_once('=').with_context(invalid)?;
    let old_keys: Vec<String> = old_part
        .split(',')
        .map(|s| s.trim().to_string())
        .filter(|s| !s.is_empty())
        .collect();
    if new_key.trim().is_empty() || old_keys.is_empty() {
        anyhow::bail!(invalid());
    }
    Ok((new_key.trim().to_string(), old_keys))
}

fn print_outcome(outcome: &CommitOutcome, dry_run: bool) {
    let prefix = if dry_run { "[dry-run] " } else { "" };
    match outcome {
        CommitOutcome::Created { path } => {
            println!("{prefix}✎  created    {}", path.display());
        }
        CommitOutcome::Updated { path } => {
            println!("{prefix}✎  updated    {}", path.display());
        }
        CommitOutcome::Unchanged { path } => {
            println!("{prefix}·  unchanged  {}", path.display());
        }
        CommitOutcome::WouldCreate { path } => {
            println!("{prefix}~  would create  {}", path.display());
        }
        CommitOutcome::WouldUpdate { path } => {
            println!("{prefix}~  would update  {}", path.display());
        }
    }
}
