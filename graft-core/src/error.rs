//! Error types for graft-core.

use std::path::PathBuf;

use thiserror::Error;

/// Structural faults in manual-section delimiters. Any of these aborts the
/// surrounding operation.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum SectionError {
    /// A section was opened and never closed before end of text.
    #[error("manual section '{key}' opened on line {line} is never closed")]
    Unterminated { key: String, line: usize },

    /// A close marker appeared with no section open.
    #[error("section end marker on line {line} has no matching open marker")]
    UnmatchedEnd { line: usize },

    /// A section was opened while another was still open. Sections do not
    /// nest.
    #[error("section '{key}' opened on line {line} while '{open}' is still open")]
    Overlapping {
        key: String,
        open: String,
        line: usize,
    },

    /// Two sections in the same text carry the same key.
    #[error("duplicate manual section key '{key}' (reopened on line {line})")]
    DuplicateKey { key: String, line: usize },
}

/// All errors that can arise from loading a rekey map file.
#[derive(Debug, Error)]
pub enum RekeyError {
    /// Underlying I/O failure (file not found, permission denied, etc.).
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// YAML parse error on load, with the offending file path.
    #[error("failed to parse rekey map at {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: serde_yaml::Error,
    },
}
