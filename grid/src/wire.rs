//! Payloads of the two grid endpoints.
//!
//! `GET /api/map[?last_version_id=..]` returns a [`MapResponse`];
//! `POST /api/cell?x_index=..&y_index=..&color_index=..` returns a
//! [`CellResponse`]. Cells are row-major: index `y * size + x`.

#[cfg(test)]
#[path = "wire_test.rs"]
mod wire_test;

use std::cmp::Ordering;
use std::collections::BTreeSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::SyncError;

// =============================================================================
// VERSION
// =============================================================================

/// Server-issued snapshot token.
///
/// Opaque, but comparably ordered: decimal tokens (the server issues
/// nanosecond timestamps) compare numerically, anything else lexically.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "RawVersion", into = "String")]
pub struct VersionId(String);

#[derive(Deserialize)]
#[serde(untagged)]
enum RawVersion {
    Text(String),
    Number(u64),
}

impl From<RawVersion> for VersionId {
    fn from(raw: RawVersion) -> Self {
        match raw {
            RawVersion::Text(text) => Self(text),
            RawVersion::Number(n) => Self(n.to_string()),
        }
    }
}

impl From<VersionId> for String {
    fn from(version: VersionId) -> Self {
        version.0
    }
}

impl VersionId {
    #[must_use]
    pub fn new(token: impl Into<String>) -> Self {
        Self(token.into())
    }

    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Ord for VersionId {
    fn cmp(&self, other: &Self) -> Ordering {
        match (self.0.parse::<u128>(), other.0.parse::<u128>()) {
            (Ok(a), Ok(b)) => a.cmp(&b).then_with(|| self.0.cmp(&other.0)),
            _ => self.0.cmp(&other.0),
        }
    }
}

impl PartialOrd for VersionId {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl fmt::Display for VersionId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

// =============================================================================
// COLOR
// =============================================================================

/// One RGB sample, serialized as `[r, g, b]`.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Rgb(pub [u8; 3]);

impl Rgb {
    pub const WHITE: Self = Self([255, 255, 255]);
    pub const BLACK: Self = Self([0, 0, 0]);
}

// =============================================================================
// RESPONSES
// =============================================================================

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MapResponse {
    pub version_id: VersionId,
    pub size: usize,
    pub colors: Vec<Rgb>,
    /// Colors clients may paint with. Absent means every color.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub available_color_indexes: Option<BTreeSet<usize>>,
    pub cell_color_indexes: Vec<usize>,
}

impl MapResponse {
    /// Check that the cell list matches `size` and every index names a color.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedSnapshot`] describing the first inconsistency.
    pub fn validate(&self) -> Result<(), SyncError> {
        let expected = self
            .size
            .checked_mul(self.size)
            .ok_or_else(|| SyncError::MalformedSnapshot(format!("size {} overflows", self.size)))?;
        if self.cell_color_indexes.len() != expected {
            return Err(SyncError::MalformedSnapshot(format!(
                "expected {expected} cells for size {}, got {}",
                self.size,
                self.cell_color_indexes.len()
            )));
        }
        let palette = self.colors.len();
        if let Some(bad) = self.cell_color_indexes.iter().find(|&&i| i >= palette) {
            return Err(SyncError::MalformedSnapshot(format!("cell color index {bad} outside palette of {palette}")));
        }
        if let Some(bad) = self.available_color_indexes.iter().flatten().find(|&&i| i >= palette) {
            return Err(SyncError::MalformedSnapshot(format!("available color index {bad} outside palette of {palette}")));
        }
        Ok(())
    }

    /// The available color set, defaulting to the whole palette.
    #[must_use]
    pub fn available_colors(&self) -> BTreeSet<usize> {
        match &self.available_color_indexes {
            Some(set) => set.clone(),
            None => (0..self.colors.len()).collect(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CellResponse {
    pub version_id: VersionId,
}

// =============================================================================
// QUERIES
// =============================================================================

#[derive(Debug, Serialize)]
pub(crate) struct MapQuery<'a> {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub(crate) last_version_id: Option<&'a str>,
}

#[derive(Debug, Serialize)]
pub(crate) struct CellQuery {
    pub(crate) x_index: usize,
    pub(crate) y_index: usize,
    pub(crate) color_index: usize,
}
