//! Graft core library: seals, manual sections, merging, rekey maps.
//!
//! Public API surface:
//! - [`signature`] — tamper-evident SHA-256 seals, full and partial
//! - [`sections`] — manual-section markers and extraction
//! - [`merge`] — splicing harvested bodies into fresh skeletons
//! - [`rekey`] — carrying bodies across renamed keys
//! - [`error`] — [`SectionError`] and [`RekeyError`]

pub mod error;
pub mod merge;
pub mod rekey;
pub mod sections;
pub mod signature;

pub use error::{RekeyError, SectionError};
pub use merge::merge;
pub use rekey::RekeyMap;
pub use sections::{extract, has_sections, SectionMap, MANUAL_CLOSE, MANUAL_OPEN_PREFIX};
pub use signature::{
    classify, content_kind, is_signed, is_validly_signed, ContentKind, Signature,
    SignatureKind, DIGEST_PLACEHOLDER, SEAL_PREFIX,
};
