#[cfg(test)]
#[path = "transform_test.rs"]
mod transform_test;

use crate::consts::{MAX_SCALE_FACTOR, MIN_SCALE_FACTOR};

/// A point in either screen or view space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Point halfway between `self` and `other`.
    #[must_use]
    pub fn midpoint(self, other: Self) -> Self {
        Self { x: (self.x + other.x) * 0.5, y: (self.y + other.y) * 0.5 }
    }

    /// Euclidean distance to `other`.
    #[must_use]
    pub fn distance(self, other: Self) -> f64 {
        (other.x - self.x).hypot(other.y - self.y)
    }
}

/// Pan and uniform scale mapping the board's unit square onto the element.
///
/// `offset_x` / `offset_y` are the screen-space position (CSS pixels) of the
/// view origin. `scale` is the on-screen size of the unit square and always
/// lies within `[min_scale, max_scale]`; the bounds are fixed when the
/// transform is created.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ViewTransform {
    pub offset_x: f64,
    pub offset_y: f64,
    scale: f64,
    min_scale: f64,
    max_scale: f64,
}

impl ViewTransform {
    /// Build a transform with explicit bounds. `scale` is clamped into them.
    #[must_use]
    pub fn new(offset_x: f64, offset_y: f64, scale: f64, min_scale: f64, max_scale: f64) -> Self {
        let (min_scale, max_scale) = if min_scale <= max_scale { (min_scale, max_scale) } else { (max_scale, min_scale) };
        Self { offset_x, offset_y, scale: scale.clamp(min_scale, max_scale), min_scale, max_scale }
    }

    /// Fit the unit square into an element of the given size, centered.
    ///
    /// The initial scale is `min(width, height)`; scale bounds are derived
    /// from it once and never change afterwards.
    #[must_use]
    pub fn fit(width: f64, height: f64) -> Self {
        let fitted = width.min(height);
        let scale = if fitted > 0.0 { fitted } else { 1.0 };
        Self::new(
            (width.max(0.0) - scale) * 0.5,
            (height.max(0.0) - scale) * 0.5,
            scale,
            scale * MIN_SCALE_FACTOR,
            scale * MAX_SCALE_FACTOR,
        )
    }

    #[must_use]
    pub fn scale(&self) -> f64 {
        self.scale
    }

    #[must_use]
    pub fn min_scale(&self) -> f64 {
        self.min_scale
    }

    #[must_use]
    pub fn max_scale(&self) -> f64 {
        self.max_scale
    }

    /// Screen-space position of the view origin.
    #[must_use]
    pub fn offset(&self) -> Point {
        Point::new(self.offset_x, self.offset_y)
    }

    /// Set the scale, clamped to the transform's bounds. Non-finite values are ignored.
    pub fn set_scale(&mut self, scale: f64) {
        if scale.is_finite() {
            self.scale = scale.clamp(self.min_scale, self.max_scale);
        }
    }

    /// Pan so that `view` lands exactly on `screen` at the current scale.
    pub fn pin(&mut self, view: Point, screen: Point) {
        self.offset_x = screen.x - view.x * self.scale;
        self.offset_y = screen.y - view.y * self.scale;
    }

    /// Convert a screen-space point (CSS pixels) to view coordinates.
    #[must_use]
    pub fn screen_to_view(&self, screen: Point) -> Point {
        Point { x: (screen.x - self.offset_x) / self.scale, y: (screen.y - self.offset_y) / self.scale }
    }

    /// Convert a view-space point to screen coordinates (CSS pixels).
    #[must_use]
    pub fn view_to_screen(&self, view: Point) -> Point {
        Point { x: view.x * self.scale + self.offset_x, y: view.y * self.scale + self.offset_y }
    }
}
