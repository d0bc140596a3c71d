//! Manual-section delimiters, scanning, and extraction.
//!
//! A manual section is a region of a generated file that humans own:
//!
//! ```text
//! # graft-manual: imports
//! ...freely edited lines...
//! # graft-manual-end
//! ```
//!
//! Markers are line-oriented and matched on the whitespace-trimmed line, so
//! indented markers still count. Everything outside a delimiter pair belongs
//! to the generated skeleton. Bodies are arbitrary text with one exception:
//! a body line that itself parses as a marker changes the section structure,
//! and the resulting imbalance surfaces as a [`SectionError`] instead of
//! being escaped away.

use std::collections::BTreeMap;

use crate::error::SectionError;

/// Open-marker prefix. The section key is the trimmed remainder of the
/// line; a marker with an empty remainder is not a marker at all.
pub const MANUAL_OPEN_PREFIX: &str = "# graft-manual:";

/// Close marker. Carries no key; it closes the one section currently open.
pub const MANUAL_CLOSE: &str = "# graft-manual-end";

/// Harvested sections, key to body. Keys are case-sensitive and unique
/// within one text.
pub type SectionMap = BTreeMap<String, String>;

// ---------------------------------------------------------------------------
// Scanner
// ---------------------------------------------------------------------------

/// One structural piece of a scanned text. Line slices keep their original
/// terminators so concatenating chunks reproduces the input byte for byte.
#[derive(Debug)]
pub(crate) enum Chunk<'a> {
    /// A single line outside any section.
    Outside(&'a str),
    /// A complete delimited section.
    Section {
        key: &'a str,
        open_line: &'a str,
        body: &'a str,
        close_line: &'a str,
    },
}

enum Marker<'a> {
    Open(&'a str),
    Close,
}

fn marker(line: &str) -> Option<Marker<'_>> {
    let trimmed = line.trim();
    if trimmed == MANUAL_CLOSE {
        return Some(Marker::Close);
    }
    if let Some(rest) = trimmed.strip_prefix(MANUAL_OPEN_PREFIX) {
        let key = rest.trim();
        if !key.is_empty() {
            return Some(Marker::Open(key));
        }
    }
    None
}

struct OpenSection<'a> {
    key: &'a str,
    line: usize,
    open_line: &'a str,
    body_start: usize,
}

/// Single pass over `text`, producing the chunk sequence every other
/// operation in this crate is built on. Fails on unbalanced or duplicate
/// delimiters; partial results are never returned.
pub(crate) fn scan(text: &str) -> Result<Vec<Chunk<'_>>, SectionError> {
    let mut chunks = Vec::new();
    let mut seen: Vec<&str> = Vec::new();
    let mut open: Option<OpenSection<'_>> = None;
    let mut pos = 0;

    for (idx, line) in text.split_inclusive('\n').enumerate() {
        let line_no = idx + 1;
        let line_end = pos + line.len();
        match marker(line) {
            Some(Marker::Open(key)) => {
                if let Some(current) = &open {
                    return Err(SectionError::Overlapping {
                        key: key.to_string(),
                        open: current.key.to_string(),
                        line: line_no,
                    });
                }
                if seen.contains(&key) {
                    return Err(SectionError::DuplicateKey {
                        key: key.to_string(),
                        line: line_no,
                    });
                }
                seen.push(key);
                open = Some(OpenSection {
                    key,
                    line: line_no,
                    open_line: line,
                    body_start: line_end,
                });
            }
            Some(Marker::Close) => match open.take() {
                Some(section) => chunks.push(Chunk::Section {
                    key: section.key,
                    open_line: section.open_line,
                    body: &text[section.body_start..pos],
                    close_line: line,
                }),
                None => return Err(SectionError::UnmatchedEnd { line: line_no }),
            },
            None => {
                if open.is_none() {
                    chunks.push(Chunk::Outside(line));
                }
            }
        }
        pos = line_end;
    }

    if let Some(section) = open {
        return Err(SectionError::Unterminated {
            key: section.key.to_string(),
            line: section.line,
        });
    }
    Ok(chunks)
}

// ---------------------------------------------------------------------------
// Public operations
// ---------------------------------------------------------------------------

/// Extract every manual section body from `text`, keyed by section key.
///
/// Skeleton text outside the delimiters is not returned; only the
/// human-owned bodies are. Delimiter imbalance or a repeated key aborts
/// the whole extraction.
pub fn extract(text: &str) -> Result<SectionMap, SectionError> {
    let mut sections = SectionMap::new();
    for chunk in scan(text)? {
        if let Chunk::Section { key, body, .. } = chunk {
            sections.insert(key.to_string(), body.to_string());
        }
    }
    Ok(sections)
}

/// Whether `text` declares at least one manual section. Scans the whole
/// text, so structural faults are reported even when the answer would be
/// `true` early.
pub fn has_sections(text: &str) -> Result<bool, SectionError> {
    let chunks = scan(text)?;
    Ok(chunks.iter().any(|c| matches!(c, Chunk::Section { .. })))
}

/// Rebuild `text` with every section body removed. Delimiter lines and all
/// skeleton text are kept verbatim. This is the canonical form hashed by
/// partial seals.
pub(crate) fn strip_bodies(text: &str) -> Result<String, SectionError> {
    let chunks = scan(text)?;
    let mut out = String::with_capacity(text.len());
    for chunk in &chunks {
        match chunk {
            Chunk::Outside(line) => out.push_str(line),
            Chunk::Section {
                open_line,
                close_line,
                ..
            } => {
                out.push_str(open_line);
                out.push_str(close_line);
            }
        }
    }
    Ok(out)
}
