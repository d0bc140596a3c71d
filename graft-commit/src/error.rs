//! Error types for graft-commit.

use std::path::PathBuf;

use thiserror::Error;

use graft_core::SectionError;

/// All errors that can arise from committing one artifact.
#[derive(Debug, Error)]
pub enum CommitError {
    /// Prior content that should have been generated carries no seal.
    #[error("no signature in {path}; refusing to overwrite (clobber to force)")]
    NoSignature { path: PathBuf },

    /// Prior content carries a seal that does not verify.
    #[error("signature mismatch in {path}; refusing to overwrite (clobber to force)")]
    BadSignature { path: PathBuf },

    /// Broken manual-section structure, in prior content being harvested
    /// or in a freshly rendered skeleton.
    #[error("malformed manual sections in {path}: {source}")]
    Sections {
        path: PathBuf,
        #[source]
        source: SectionError,
    },

    /// The caller-supplied renderer failed.
    #[error("render failed for {path}: {source}")]
    Render {
        path: PathBuf,
        #[source]
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// An I/O error, with annotated path for context.
    #[error("I/O error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Convenience constructor for [`CommitError::Io`].
pub(crate) fn io_err(path: impl Into<PathBuf>, source: std::io::Error) -> CommitError {
    CommitError::Io {
        path: path.into(),
        source,
    }
}

/// Convenience constructor for [`CommitError::Sections`].
pub(crate) fn sections_err(path: impl Into<PathBuf>, source: SectionError) -> CommitError {
    CommitError::Sections {
        path: path.into(),
        source,
    }
}
