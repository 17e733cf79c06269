//! Reconciliation of server snapshots with locally pending edits.
//!
//! DESIGN
//! ======
//! The base buffer is always the latest server snapshot, replaced wholesale.
//! Pending edits live in a separate list in issue order and are painted over
//! the base as a final pass, so the newest edit for a cell wins and a refresh
//! never rolls back an edit the server has not caught up with yet.
//!
//! An edit leaves the list when the held snapshot's version reaches the
//! version the server acknowledged it at, or at once when its write fails.

#[cfg(test)]
#[path = "state_test.rs"]
mod state_test;

use std::collections::BTreeSet;

use tracing::warn;

use crate::error::SyncError;
use crate::pending::{EditId, PendingEdit};
use crate::wire::{MapResponse, Rgb, VersionId};

/// What a snapshot did to the state.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SnapshotOutcome {
    /// This was the first snapshot ever applied.
    pub first_load: bool,
    /// The version differs from the one held before.
    pub changed: bool,
    /// Pending edits the snapshot caught up with.
    pub dropped_edits: usize,
    /// The snapshot was older than the held one and was ignored.
    pub stale: bool,
    /// The server's version went backwards for long enough that the snapshot
    /// was accepted as a new baseline.
    pub rebased: bool,
}

/// Result of acknowledging an edit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Confirmation {
    /// Still overlaid until a snapshot reaches its version.
    Awaiting,
    /// The held snapshot already reflects it; the overlay was removed.
    /// `changed` is set when removing it altered the rendered cell.
    Dropped { changed: bool },
    /// No pending edit had this id.
    Unknown,
}

/// Read-only copy of what should be rendered, published after every change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GridView {
    pub version_id: Option<VersionId>,
    pub size: usize,
    pub colors: Vec<Rgb>,
    pub available_color_indexes: BTreeSet<usize>,
    /// Color index per cell with pending edits applied, row-major.
    pub cell_color_indexes: Vec<usize>,
    /// RGB per cell with pending edits applied, row-major.
    pub pixels: Vec<Rgb>,
    pub pending_edits: usize,
}

impl GridView {
    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.version_id.is_some()
    }

    #[must_use]
    pub fn color_at(&self, x_index: usize, y_index: usize) -> Option<Rgb> {
        cell_index(self.size, x_index, y_index).and_then(|i| self.pixels.get(i).copied())
    }

    #[must_use]
    pub fn color_index_at(&self, x_index: usize, y_index: usize) -> Option<usize> {
        cell_index(self.size, x_index, y_index).and_then(|i| self.cell_color_indexes.get(i).copied())
    }

    /// Pixels as raw RGB triples, the layout the canvas renderer draws.
    #[must_use]
    pub fn raw_pixels(&self) -> Vec<[u8; 3]> {
        self.pixels.iter().map(|rgb| rgb.0).collect()
    }
}

#[derive(Debug, Default)]
pub struct GridState {
    version_id: Option<VersionId>,
    size: usize,
    colors: Vec<Rgb>,
    available: BTreeSet<usize>,
    base: Vec<usize>,
    pending: Vec<PendingEdit>,
    cells: Vec<usize>,
    pixels: Vec<Rgb>,
    next_edit: u64,
    stale_streak: u32,
}

/// Consecutive older snapshots after which the server is taken to have
/// restarted with a lower version, and its snapshot becomes the new base.
pub const STALE_REBASE_AFTER: u32 = 3;

impl GridState {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Queries ---

    #[must_use]
    pub fn is_loaded(&self) -> bool {
        self.version_id.is_some()
    }

    #[must_use]
    pub fn version_id(&self) -> Option<&VersionId> {
        self.version_id.as_ref()
    }

    #[must_use]
    pub fn size(&self) -> usize {
        self.size
    }

    #[must_use]
    pub fn colors(&self) -> &[Rgb] {
        &self.colors
    }

    #[must_use]
    pub fn available_color_indexes(&self) -> &BTreeSet<usize> {
        &self.available
    }

    /// Outstanding edits in issue order.
    #[must_use]
    pub fn pending(&self) -> &[PendingEdit] {
        &self.pending
    }

    /// Rendered pixels, row-major, with pending edits applied.
    #[must_use]
    pub fn pixels(&self) -> &[Rgb] {
        &self.pixels
    }

    #[must_use]
    pub fn color_at(&self, x_index: usize, y_index: usize) -> Option<Rgb> {
        cell_index(self.size, x_index, y_index).and_then(|i| self.pixels.get(i).copied())
    }

    #[must_use]
    pub fn color_index_at(&self, x_index: usize, y_index: usize) -> Option<usize> {
        cell_index(self.size, x_index, y_index).and_then(|i| self.cells.get(i).copied())
    }

    #[must_use]
    pub fn view(&self) -> GridView {
        GridView {
            version_id: self.version_id.clone(),
            size: self.size,
            colors: self.colors.clone(),
            available_color_indexes: self.available.clone(),
            cell_color_indexes: self.cells.clone(),
            pixels: self.pixels.clone(),
            pending_edits: self.pending.len(),
        }
    }

    // --- Server snapshots ---

    /// Replace the base with `snapshot`, re-overlay pending edits, and drop
    /// the edits it has caught up with.
    ///
    /// A snapshot strictly older than the held one is ignored, unless
    /// [`STALE_REBASE_AFTER`] such snapshots arrive in a row. Then the server
    /// is taken to have gone back in time: the snapshot is accepted and
    /// acknowledged edits are dropped, since their versions belong to the old
    /// sequence and would never be reached.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::MalformedSnapshot`] without touching state if the
    /// snapshot is inconsistent.
    pub fn apply_snapshot(&mut self, snapshot: MapResponse) -> Result<SnapshotOutcome, SyncError> {
        snapshot.validate()?;

        let mut rebased = false;
        if let Some(held) = &self.version_id {
            if snapshot.version_id < *held {
                self.stale_streak += 1;
                if self.stale_streak < STALE_REBASE_AFTER {
                    warn!(held = %held, received = %snapshot.version_id, streak = self.stale_streak, "ignoring older snapshot");
                    return Ok(SnapshotOutcome { stale: true, ..SnapshotOutcome::default() });
                }
                warn!(held = %held, received = %snapshot.version_id, "server version went backwards; re-baselining");
                rebased = true;
            }
        }
        self.stale_streak = 0;

        let first_load = self.version_id.is_none();
        let changed = self.version_id.as_ref() != Some(&snapshot.version_id);

        self.available = snapshot.available_colors();
        self.size = snapshot.size;
        self.colors = snapshot.colors;
        self.base = snapshot.cell_color_indexes;

        let before = self.pending.len();
        let version = snapshot.version_id;
        if rebased {
            self.pending.retain(|edit| !edit.is_confirmed());
        } else {
            self.pending.retain(|edit| !edit.is_reflected_in(&version));
        }
        let dropped_edits = before - self.pending.len();
        self.version_id = Some(version);

        self.rebuild();
        Ok(SnapshotOutcome { first_load, changed, dropped_edits, stale: false, rebased })
    }

    // --- Local edits ---

    /// Record an edit and overlay it immediately.
    ///
    /// # Errors
    ///
    /// - [`SyncError::InvalidColorIndex`] if `color_index` is not available.
    /// - [`SyncError::CellOutOfRange`] if the cell is outside the grid.
    ///
    /// State is untouched on error.
    pub fn begin_edit(&mut self, x_index: usize, y_index: usize, color_index: usize) -> Result<EditId, SyncError> {
        if !self.available.contains(&color_index) {
            return Err(SyncError::InvalidColorIndex { color_index });
        }
        let Some(cell) = cell_index(self.size, x_index, y_index) else {
            return Err(SyncError::CellOutOfRange { x_index, y_index, size: self.size });
        };

        let id = EditId(self.next_edit);
        self.next_edit += 1;
        self.pending.push(PendingEdit::new(id, x_index, y_index, color_index));
        self.paint(cell, color_index);
        Ok(id)
    }

    /// Record the version the server applied edit `id` at.
    ///
    /// The overlay stays until a snapshot reaches `version`; if the held
    /// snapshot already has, the edit is dropped now.
    pub fn confirm_edit(&mut self, id: EditId, version: VersionId) -> Confirmation {
        let Some(position) = self.pending.iter().position(|edit| edit.id == id) else {
            return Confirmation::Unknown;
        };
        let edit = &mut self.pending[position];
        edit.confirmed_at_version = Some(version);

        let reflected = self.version_id.as_ref().is_some_and(|held| edit.is_reflected_in(held));
        if reflected {
            let removed = self.pending.remove(position);
            let cell = cell_index(self.size, removed.x_index, removed.y_index);
            let shown = cell.and_then(|i| self.pixels.get(i).copied());
            self.rebuild();
            let changed = cell.and_then(|i| self.pixels.get(i).copied()) != shown;
            Confirmation::Dropped { changed }
        } else {
            Confirmation::Awaiting
        }
    }

    /// Retract edit `id` after its write failed. Returns whether it was pending.
    pub fn fail_edit(&mut self, id: EditId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|edit| edit.id != id);
        if self.pending.len() == before {
            return false;
        }
        self.rebuild();
        true
    }

    // --- Buffer ---

    /// Base pass, then overlay pass in issue order.
    fn rebuild(&mut self) {
        self.cells.clone_from(&self.base);
        self.pixels = self.base.iter().map(|&i| self.colors.get(i).copied().unwrap_or_default()).collect();

        let overlay: Vec<(usize, usize)> = self
            .pending
            .iter()
            .filter_map(|edit| cell_index(self.size, edit.x_index, edit.y_index).map(|cell| (cell, edit.color_index)))
            .collect();
        for (cell, color_index) in overlay {
            self.paint(cell, color_index);
        }
    }

    fn paint(&mut self, cell: usize, color_index: usize) {
        let Some(rgb) = self.colors.get(color_index).copied() else {
            return;
        };
        if let (Some(slot), Some(pixel)) = (self.cells.get_mut(cell), self.pixels.get_mut(cell)) {
            *slot = color_index;
            *pixel = rgb;
        }
    }
}

fn cell_index(size: usize, x_index: usize, y_index: usize) -> Option<usize> {
    (x_index < size && y_index < size).then(|| y_index * size + x_index)
}
