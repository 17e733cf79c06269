//! Input event types consumed by the gesture state machine.
//!
//! Mouse and touch input are normalized into [`Contact`]s: a screen position
//! plus an optional identifier. The mouse has no identifier; each touch point
//! carries the identifier the browser assigned to it for its lifetime.

use crate::transform::Point;

/// Browser-assigned identifier of one touch point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct ContactId(pub i32);

/// One pointer or touch point as reported by an input event.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Contact {
    /// `None` for the mouse pointer.
    pub id: Option<ContactId>,
    /// Position in screen space (CSS pixels relative to the element).
    pub screen: Point,
}

impl Contact {
    /// The mouse pointer at `screen`.
    #[must_use]
    pub fn mouse(screen: Point) -> Self {
        Self { id: None, screen }
    }

    /// Touch point `id` at `screen`.
    #[must_use]
    pub fn touch(id: i32, screen: Point) -> Self {
        Self { id: Some(ContactId(id)), screen }
    }
}

/// Wheel / trackpad scroll delta.
#[derive(Debug, Clone, Copy)]
pub struct WheelDelta {
    /// Horizontal scroll amount in pixels.
    pub dx: f64,
    /// Vertical scroll amount in pixels (positive = down).
    pub dy: f64,
}
