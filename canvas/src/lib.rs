//! View and gesture engine for the shared pixel board.
//!
//! This crate is compiled to WebAssembly and runs in the browser. It owns the
//! view side of the board: translating raw pointer, touch, and wheel events
//! into pan/zoom changes of a [`transform::ViewTransform`], detecting taps,
//! and drawing a pixel buffer through that transform. Grid state and network
//! sync live in the `grid` crate; the host layer maps taps to cells and hands
//! the current pixel buffer to [`engine::Engine::render`].
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | Browser-bound engine owning the 2D context |
//! | [`gesture`] | Gesture state machine and the [`gesture::Action`]s it emits |
//! | [`anchor`] | Screen/view anchor snapshots for one contact |
//! | [`transform`] | Pan/scale transform and coordinate conversions |
//! | [`input`] | Input event types (contacts, wheel deltas) |
//! | [`render`] | Frame preparation and cell drawing |
//! | [`consts`] | Shared numeric constants (zoom limits, wheel sensitivity) |

pub mod anchor;
pub mod consts;
pub mod engine;
pub mod gesture;
pub mod input;
pub mod render;
pub mod transform;
