//! Rekey maps, redirecting renamed section keys to their old names.

use std::collections::BTreeMap;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::RekeyError;

/// Maps a current section key to candidate old keys, tried in order.
///
/// A rekey map is consulted only when a skeleton key has no same-named
/// section in the harvested content; the first candidate that does have
/// one wins. This carries manual content across refactors that rename
/// generated elements (paired with legacy paths when the file itself
/// moved).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RekeyMap(BTreeMap<String, Vec<String>>);

impl RekeyMap {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register `old_keys` as fallbacks for `new_key`, keeping their order.
    pub fn insert(&mut self, new_key: impl Into<String>, old_keys: Vec<String>) {
        self.0.insert(new_key.into(), old_keys);
    }

    /// Candidate old keys for `new_key`, in registration order.
    pub fn candidates(&self, new_key: &str) -> &[String] {
        self.0.get(new_key).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Fold `other` into `self`. On a colliding new key, `other` wins.
    pub fn extend(&mut self, other: RekeyMap) {
        self.0.extend(other.0);
    }

    /// Load a rekey map from a YAML file shaped `new_key: [old, older]`.
    pub fn from_file(path: &Path) -> Result<Self, RekeyError> {
        let contents = std::fs::read_to_string(path)?;
        serde_yaml::from_str(&contents).map_err(|e| RekeyError::Parse {
            path: path.to_path_buf(),
            source: e,
        })
    }
}
