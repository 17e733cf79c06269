//! Shared numeric constants for the canvas crate.

// ── Zoom ────────────────────────────────────────────────────────

/// Lower scale bound, as a fraction of the scale that fits the board to the element.
pub const MIN_SCALE_FACTOR: f64 = 0.5;

/// Upper scale bound, as a multiple of the scale that fits the board to the element.
pub const MAX_SCALE_FACTOR: f64 = 64.0;

/// Relative scale change per wheel pixel. Negative `dy` (wheel up) zooms in.
pub const WHEEL_ZOOM_SENSITIVITY: f64 = 0.002;

/// Floor for a single wheel event's zoom factor so a large delta never flips the sign.
pub const MIN_WHEEL_FACTOR: f64 = 0.1;

// ── Gestures ────────────────────────────────────────────────────

/// Pinch baselines shorter than this (screen pixels) never change the scale.
pub const PINCH_MIN_DISTANCE_PX: f64 = 1.0;
