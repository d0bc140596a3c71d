//! Commit protocol for one generated artifact.
//!
//! ## `commit` steps
//!
//! 1. Create-only skip if the target already exists (no read, no render).
//! 2. Read prior content from the target and any legacy paths; every
//!    non-empty prior file must verify, or be excluded by `clobber`.
//! 3. Invoke the renderer for the fresh skeleton.
//! 4. Harvest manual sections from the verified prior files and merge them
//!    into the skeleton; seal the result (partial when the skeleton
//!    declares sections, full otherwise).
//! 5. Compare against on-disk bytes and skip identical content.
//! 6. Write via `<path>.graft.tmp` + rename, creating parent directories.

use std::path::{Path, PathBuf};

use graft_core::{
    extract, has_sections, is_signed, is_validly_signed, merge, RekeyMap, SignatureKind,
};

use crate::error::{io_err, sections_err, CommitError};

// ---------------------------------------------------------------------------
// Options and outcome
// ---------------------------------------------------------------------------

/// Per-commit configuration. Plain immutable value; build one with
/// [`CommitOptions::default`] and override fields as needed.
#[derive(Debug, Clone)]
pub struct CommitOptions {
    /// Require prior content to verify and seal the committed output.
    /// Off, the commit neither checks nor embeds seals; manual sections
    /// still merge.
    pub signed: bool,
    /// Overwrite prior content that fails verification instead of
    /// aborting. Unverified files are dropped from the harvest, so their
    /// manual sections are lost.
    pub clobber: bool,
    /// Never touch an already-existing target.
    pub create_only: bool,
    /// Report the outcome without writing anything.
    pub dry_run: bool,
    /// Key renames consulted when a skeleton key has no same-named prior
    /// section.
    pub rekey: RekeyMap,
}

impl Default for CommitOptions {
    fn default() -> Self {
        Self {
            signed: true,
            clobber: false,
            create_only: false,
            dry_run: false,
            rekey: RekeyMap::new(),
        }
    }
}

/// Outcome of one commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommitOutcome {
    /// On-disk bytes already match the committed content, or create-only
    /// skipped an existing target.
    Unchanged { path: PathBuf },
    /// The target did not exist and was written.
    Created { path: PathBuf },
    /// The target existed and its bytes changed.
    Updated { path: PathBuf },
    /// Dry-run: the target does not exist and would be written.
    WouldCreate { path: PathBuf },
    /// Dry-run: the target exists and would be rewritten.
    WouldUpdate { path: PathBuf },
}

impl CommitOutcome {
    /// Resolved target path the outcome refers to.
    pub fn path(&self) -> &Path {
        match self {
            CommitOutcome::Unchanged { path }
            | CommitOutcome::Created { path }
            | CommitOutcome::Updated { path }
            | CommitOutcome::WouldCreate { path }
            | CommitOutcome::WouldUpdate { path } => path,
        }
    }
}

// ---------------------------------------------------------------------------
// commit
// ---------------------------------------------------------------------------

/// Commit one artifact under `root`.
///
/// A relative `target` (and relative legacy paths) resolve under `root`;
/// absolute paths are used as given. `render` produces the fresh skeleton
/// and is only invoked when a write is actually possible; its output is
/// normalized to LF line endings, after which every byte is significant.
///
/// Legacy paths are read-only inputs whose manual sections join the
/// harvest at lower precedence than the target's own prior sections, so
/// content travels with the file it currently lives in after a rename.
pub fn commit<F, E>(
    root: &Path,
    target: &Path,
    legacy: &[PathBuf],
    render: F,
    options: &CommitOptions,
) -> Result<CommitOutcome, CommitError>
where
    F: FnOnce() -> Result<String, E>,
    E: Into<Box<dyn std::error::Error + Send + Sync>>,
{
    let path = root.join(target);

    if options.create_only && path.exists() {
        tracing::debug!("create-only, target exists: {}", path.display());
        return Ok(CommitOutcome::Unchanged { path });
    }

    // Gate prior content. The target's own content leads the harvest so
    // its sections outrank legacy files during the merge.
    let old_text = read_if_present(&path)?;
    let existed = old_text.is_some();

    let mut prior: Vec<(PathBuf, String)> = Vec::new();
    if let Some(text) = old_text.clone() {
        if verified(&path, &text, options)? {
            prior.push((path.clone(), text));
        }
    }
    for rel in legacy {
        let legacy_path = root.join(rel);
        if let Some(text) = read_if_present(&legacy_path)? {
            if verified(&legacy_path, &text, options)? {
                prior.push((legacy_path, text));
            }
        }
    }

    // Renderer output is the one place line endings are normalized; prior
    // content and on-disk bytes are always handled exactly.
    let rendered = render().map_err(|e| CommitError::Render {
        path: path.clone(),
        source: e.into(),
    })?;
    let skeleton = rendered.replace("\r\n", "\n");

    let sectioned = has_sections(&skeleton).map_err(|e| sections_err(&path, e))?;
    let merged = if sectioned {
        let mut sets = Vec::with_capacity(prior.len());
        for (source_path, text) in &prior {
            sets.push(extract(text).map_err(|e| sections_err(source_path, e))?);
        }
        merge(&skeleton, &sets, &options.rekey).map_err(|e| sections_err(&path, e))?
    } else {
        // A skeleton without sections has nothing to merge, but it was
        // still validated above.
        skeleton
    };

    let committed = if options.signed {
        let kind = if sectioned {
            SignatureKind::Partial
        } else {
            SignatureKind::Full
        };
        kind.sign(&merged).map_err(|e| sections_err(&path, e))?
    } else {
        merged
    };

    // Idempotent write: byte-identical content is never rewritten.
    if old_text.as_deref() == Some(committed.as_str()) {
        tracing::debug!("unchanged: {}", path.display());
        return Ok(CommitOutcome::Unchanged { path });
    }

    if options.dry_run {
        tracing::info!("[dry-run] would write: {}", path.display());
        return Ok(if existed {
            CommitOutcome::WouldUpdate { path }
        } else {
            CommitOutcome::WouldCreate { path }
        });
    }

    write_atomic(&path, &committed)?;
    tracing::info!("wrote: {}", path.display());
    Ok(if existed {
        CommitOutcome::Updated { path }
    } else {
        CommitOutcome::Created { path }
    })
}

/// Signature gate for one prior file. `Ok(true)` admits the file to the
/// harvest, `Ok(false)` excludes it (clobber waving an unverified file
/// through). Empty files carry nothing worth checking and pass.
fn verified(path: &Path, text: &str, options: &CommitOptions) -> Result<bool, CommitError> {
    if !options.signed || text.is_empty() {
        return Ok(true);
    }
    // A partial seal over broken sections cannot be recomputed either way;
    // it counts as failing verification.
    if is_validly_signed(text).unwrap_or(false) {
        return Ok(true);
    }
    if options.clobber {
        tracing::warn!(
            "clobber: dropping unverified content from {}",
            path.display()
        );
        return Ok(false);
    }
    Err(if is_signed(text) {
        CommitError::BadSignature {
            path: path.to_path_buf(),
        }
    } else {
        CommitError::NoSignature {
            path: path.to_path_buf(),
        }
    })
}

// ---------------------------------------------------------------------------
// Filesystem plumbing
// ---------------------------------------------------------------------------

fn read_if_present(path: &Path) -> Result<Option<String>, CommitError> {
    match std::fs::read_to_string(path) {
        Ok(text) => Ok(Some(text)),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(io_err(path, e)),
    }
}

fn write_atomic(path: &Path, content: &str) -> Result<(), CommitError> {
    let tmp = PathBuf::from(format!("{}.graft.tmp", path.display()));
    write_atomic_with_tmp(path, content, &tmp)
}

fn write_atomic_with_tmp(path: &Path, content: &str, tmp: &Path) -> Result<(), CommitError> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| io_err(parent, e))?;
    }
    if let Some(tmp_parent) = tmp.parent() {
        std::fs::create_dir_all(tmp_parent).map_err(|e| io_err(tmp_parent, e))?;
    }
    std::fs::write(tmp, content).map_err(|e| io_err(tmp, e))?;
    if let Err(e) = std::fs::rename(tmp, path) {
        let _ = std::fs::remove_file(tmp);
        return Err(io_err(path, e));
    }
    Ok(())
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
