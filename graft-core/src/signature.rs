//! Tamper-evident seals over generated text.
//!
//! A seal is a single marker line carrying a SHA-256 digest of the text it
//! lives in:
//!
//! ```text
//! # graft-seal: sha256:<64 hex>            full seal
//! # graft-seal: sha256:<64 hex> +manual    partial seal
//! ```
//!
//! Before hashing, the digest field is blanked to [`DIGEST_PLACEHOLDER`] so
//! the stored digest does not feed into itself. A partial seal additionally
//! drops every manual-section body from the hashed form, so edits inside
//! sections keep the seal valid while any other change breaks it. The
//! `+manual` tail is part of the hashed text, which pins the variant: a
//! partial seal reinterpreted as a full one (or vice versa) never verifies.
//!
//! The first line that parses as a seal is the seal. Renderers that emit
//! their own placeholder put it above any manual section; a seal placed
//! below one can be shadowed by a seal-shaped line pasted into an earlier
//! body.
//!
//! Verification runs over the exact bytes given. Nothing is normalized
//! here; callers decide line-ending policy before sealing.

use sha2::{Digest, Sha256};

use crate::error::SectionError;
use crate::sections;

/// Seal-line prefix, up to and including the algorithm tag.
pub const SEAL_PREFIX: &str = "# graft-seal: sha256:";

/// Tail distinguishing a partial seal from a full one.
const PARTIAL_TAIL: &str = " +manual";

/// Stand-in for the digest field while hashing. Renderers that want to
/// control seal placement emit a seal line carrying this value and signing
/// fills it in.
pub const DIGEST_PLACEHOLDER: &str =
    "0000000000000000000000000000000000000000000000000000000000000000";

/// The two seal variants.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SignatureKind {
    /// Digest over the whole text. Any edit invalidates the seal.
    Full,
    /// Digest excluding manual-section bodies. Edits inside sections are
    /// tolerated; everything else is sealed.
    Partial,
}

/// A seal parsed out of artifact text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Signature {
    pub kind: SignatureKind,
    /// Embedded digest, lowercase hex.
    pub digest: String,
}

/// Signature state of on-disk content, as reported by [`content_kind`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ContentKind {
    Unsigned,
    FullySigned,
    PartiallySigned,
}

impl std::fmt::Display for ContentKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let label = match self {
            ContentKind::Unsigned => "unsigned",
            ContentKind::FullySigned => "full",
            ContentKind::PartiallySigned => "partial",
        };
        write!(f, "{label}")
    }
}

// ---------------------------------------------------------------------------
// Seal-line parsing
// ---------------------------------------------------------------------------

fn is_digest(s: &str) -> bool {
    s.len() == 64 && s.bytes().all(|b| matches!(b, b'0'..=b'9' | b'a'..=b'f'))
}

/// Parse one line as a seal marker. Lines that almost match (wrong digest
/// length, stray characters) are simply not seals; this never fails.
fn parse_seal_line(line: &str) -> Option<Signature> {
    let rest = line.trim().strip_prefix(SEAL_PREFIX)?;
    // Partial first: the full form is a prefix of the partial form.
    if let Some(digest) = rest.strip_suffix(PARTIAL_TAIL) {
        if is_digest(digest) {
            return Some(Signature {
                kind: SignatureKind::Partial,
                digest: digest.to_string(),
            });
        }
    }
    if is_digest(rest) {
        return Some(Signature {
            kind: SignatureKind::Full,
            digest: rest.to_string(),
        });
    }
    None
}

/// Find the first seal line in `text`. Total over arbitrary input:
/// malformed or absent markers yield `None`, never an error.
pub fn classify(text: &str) -> Option<Signature> {
    text.lines().find_map(parse_seal_line)
}

/// Whether `text` carries any seal, valid or not.
pub fn is_signed(text: &str) -> bool {
    classify(text).is_some()
}

/// Signature state of `text` without verifying the digest.
pub fn content_kind(text: &str) -> ContentKind {
    match classify(text) {
        None => ContentKind::Unsigned,
        Some(sig) => match sig.kind {
            SignatureKind::Full => ContentKind::FullySigned,
            SignatureKind::Partial => ContentKind::PartiallySigned,
        },
    }
}

// ---------------------------------------------------------------------------
// Canonical form and digests
// ---------------------------------------------------------------------------

fn sha256_hex(text: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(text.as_bytes());
    hex::encode(hasher.finalize())
}

/// Rewrite the digest field of the first seal line to `digest`, leaving the
/// rest of the line (indentation, variant tail, terminator) untouched.
fn replace_seal_digest(text: &str, digest: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut replaced = false;
    for line in text.split_inclusive('\n') {
        if !replaced {
            if let Some(sig) = parse_seal_line(line) {
                // The 64-hex digest cannot occur in the line before the
                // digest field, so the first occurrence is the field.
                out.push_str(&line.replacen(&sig.digest, digest, 1));
                replaced = true;
                continue;
            }
        }
        out.push_str(line);
    }
    out
}

fn full_digest(text: &str) -> String {
    sha256_hex(&replace_seal_digest(text, DIGEST_PLACEHOLDER))
}

fn partial_digest(text: &str) -> Result<String, SectionError> {
    let stripped = sections::strip_bodies(text)?;
    Ok(sha256_hex(&replace_seal_digest(&stripped, DIGEST_PLACEHOLDER)))
}

// ---------------------------------------------------------------------------
// Signing and verification
// ---------------------------------------------------------------------------

fn seal_line(kind: SignatureKind) -> String {
    match kind {
        SignatureKind::Full => format!("{SEAL_PREFIX}{DIGEST_PLACEHOLDER}"),
        SignatureKind::Partial => {
            format!("{SEAL_PREFIX}{DIGEST_PLACEHOLDER}{PARTIAL_TAIL}")
        }
    }
}

/// Replace an existing seal line with a placeholder seal of `kind`, or
/// insert one when absent: after a leading `#!` line if present, else as
/// the first line.
fn upsert_seal(text: &str, kind: SignatureKind) -> String {
    let seal = seal_line(kind);
    if classify(text).is_some() {
        let mut out = String::with_capacity(text.len() + seal.len());
        let mut replaced = false;
        for line in text.split_inclusive('\n') {
            if !replaced && parse_seal_line(line).is_some() {
                out.push_str(&seal);
                if line.ends_with('\n') {
                    out.push('\n');
                }
                replaced = true;
            } else {
                out.push_str(line);
            }
        }
        out
    } else if text.starts_with("#!") {
        match text.split_once('\n') {
            Some((shebang, rest)) => format!("{shebang}\n{seal}\n{rest}"),
            None => format!("{text}\n{seal}\n"),
        }
    } else {
        format!("{seal}\n{text}")
    }
}

impl SignatureKind {
    /// Embed a seal of this kind into `text` and return the sealed text.
    ///
    /// An existing seal line (placeholder or stale digest) is rewritten in
    /// place, so a renderer-chosen position survives re-signing. Sealing
    /// [`SignatureKind::Partial`] text with malformed sections fails; a
    /// digest cannot be computed over a structure that does not parse.
    pub fn sign(self, text: &str) -> Result<String, SectionError> {
        let tagged = upsert_seal(text, self);
        let digest = match self {
            SignatureKind::Full => full_digest(&tagged),
            SignatureKind::Partial => partial_digest(&tagged)?,
        };
        Ok(replace_seal_digest(&tagged, &digest))
    }
}

/// `Ok(true)` iff `text` carries a seal whose digest matches recomputation
/// over the exact bytes given. Unsigned text and mismatches are
/// `Ok(false)`. A partial seal over malformed sections cannot be
/// recomputed at all and is an error.
pub fn is_validly_signed(text: &str) -> Result<bool, SectionError> {
    match classify(text) {
        None => Ok(false),
        Some(sig) => {
            let recomputed = match sig.kind {
                SignatureKind::Full => full_digest(text),
                SignatureKind::Partial => partial_digest(text)?,
            };
            Ok(recomputed == sig.digest)
        }
    }
}
