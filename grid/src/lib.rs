//! Grid sync engine for the shared pixel board.
//!
//! The server is the source of truth for the grid. This crate keeps a local
//! copy current through a long-poll refresh loop and lets the client paint
//! without waiting for round-trips: writes are overlaid optimistically and
//! reconciled against later snapshots by version, never by arrival order.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::GridSyncEngine`]: refresh loop and write dispatch on one task |
//! | [`state`] | [`state::GridState`]: base snapshot plus pending-edit overlay |
//! | [`pending`] | Locally issued edits awaiting confirmation |
//! | [`api`] | [`api::GridApi`] seam and its HTTP implementation |
//! | [`wire`] | Endpoint payloads and the version token |
//! | [`config`] | Environment-driven timing and endpoint settings |
//! | [`error`] | [`error::SyncError`] |

pub mod api;
pub mod config;
pub mod engine;
pub mod error;
pub mod pending;
pub mod state;
pub mod wire;

pub use api::{GridApi, HttpGridApi};
pub use config::SyncConfig;
pub use engine::{GridSyncEngine, SyncObserver};
pub use error::SyncError;
pub use pending::{EditId, PendingEdit};
pub use state::{GridState, GridView};
pub use wire::{CellResponse, MapResponse, Rgb, VersionId};
