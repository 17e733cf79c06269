//! Locally issued cell writes awaiting server confirmation.

use crate::wire::VersionId;

/// Identifies one local edit. Ids increase in issue order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EditId(pub u64);

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingEdit {
    pub id: EditId,
    pub x_index: usize,
    pub y_index: usize,
    pub color_index: usize,
    /// Version at which the server applied the write; `None` until acknowledged.
    pub confirmed_at_version: Option<VersionId>,
}

impl PendingEdit {
    #[must_use]
    pub fn new(id: EditId, x_index: usize, y_index: usize, color_index: usize) -> Self {
        Self { id, x_index, y_index, color_index, confirmed_at_version: None }
    }

    #[must_use]
    pub fn is_confirmed(&self) -> bool {
        self.confirmed_at_version.is_some()
    }

    /// Whether a snapshot at `version` already contains this edit.
    #[must_use]
    pub fn is_reflected_in(&self, version: &VersionId) -> bool {
        self.confirmed_at_version.as_ref().is_some_and(|confirmed| confirmed <= version)
    }
}
