//! # graft-commit
//!
//! The commit protocol for signed generated artifacts: gate prior content
//! on seal verification, harvest and merge manual sections into a freshly
//! rendered skeleton, re-seal, and write idempotently.
//!
//! Call [`commit`] once per artifact; each call is self-contained and
//! assumes exclusive access to its target path while it runs.

pub mod commit;
pub mod error;

pub use commit::{commit, CommitOptions, CommitOutcome};
pub use error::CommitError;
