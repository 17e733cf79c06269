//! Rendering: prepares each frame and draws the pixel buffer to a 2D context.
//!
//! This module is the only place that touches [`web_sys::CanvasRenderingContext2d`].
//! It receives read-only views of the transform and the pixel buffer and
//! produces pixels; it does not mutate any application state.
//!
//! All fallible `Canvas2D` calls propagate errors via `Result<(), JsValue>`.
//! The top-level caller ([`crate::engine::Engine::render`]) handles the result.

#[cfg(test)]
#[path = "render_test.rs"]
mod render_test;

use wasm_bindgen::JsValue;
use web_sys::CanvasRenderingContext2d;

use crate::transform::{Point, ViewTransform};

/// Clear the element and make `transform` the active drawing transform.
///
/// After this call, drawing in view space (the unit square) lands where the
/// transform places it on screen. `width` and `height` are in CSS pixels;
/// `dpr` is the device pixel ratio of the backing store.
///
/// # Errors
///
/// Returns `Err` if the context rejects the transform.
pub fn prepare_draw(
    ctx: &CanvasRenderingContext2d,
    transform: &ViewTransform,
    width: f64,
    height: f64,
    dpr: f64,
) -> Result<(), JsValue> {
    let dpr = normalize_dpr(dpr);
    ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;
    ctx.clear_rect(0.0, 0.0, width, height);
    let [m11, m12, m21, m22, dx, dy] = device_matrix(transform, dpr);
    ctx.set_transform(m11, m12, m21, m22, dx, dy)
}

/// The `set_transform` arguments mapping view space to device pixels:
/// the view transform in CSS pixels, then the device pixel ratio.
#[must_use]
pub fn device_matrix(transform: &ViewTransform, dpr: f64) -> [f64; 6] {
    let dpr = normalize_dpr(dpr);
    let scale = transform.scale() * dpr;
    [scale, 0.0, 0.0, scale, transform.offset_x * dpr, transform.offset_y * dpr]
}

/// Backing-store size in device pixels for a CSS-pixel box, at least 1x1.
#[must_use]
#[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn backing_size(width: f64, height: f64, dpr: f64) -> (u32, u32) {
    let dpr = normalize_dpr(dpr);
    let side = |css: f64| {
        let px = (css * dpr).round();
        if px.is_finite() && px >= 1.0 { px.min(f64::from(u32::MAX)) as u32 } else { 1 }
    };
    (side(width), side(height))
}

/// Non-finite or non-positive ratios fall back to 1.
#[must_use]
pub fn normalize_dpr(dpr: f64) -> f64 {
    if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 }
}

/// Fill one square per cell, row-major, across the unit square.
#[allow(clippy::cast_precision_loss)]
pub fn draw_cells(ctx: &CanvasRenderingContext2d, pixels: &[[u8; 3]], size: usize) {
    if size == 0 {
        return;
    }
    let cell = 1.0 / size as f64;
    for (i, rgb) in pixels.iter().enumerate() {
        let (x, y) = (i % size, i / size);
        ctx.set_fill_style_str(&css_rgb(*rgb));
        ctx.fill_rect(x as f64 * cell, y as f64 * cell, cell, cell);
    }
}

/// CSS color string for an RGB sample.
#[must_use]
pub fn css_rgb([r, g, b]: [u8; 3]) -> String {
    format!("rgb({r}, {g}, {b})")
}

/// The cell under a view-space point, as `(x_index, y_index)`.
///
/// Returns `None` outside the unit square or for an empty grid.
#[must_use]
#[allow(clippy::cast_precision_loss, clippy::cast_possible_truncation, clippy::cast_sign_loss)]
pub fn cell_at(view: Point, size: usize) -> Option<(usize, usize)> {
    if size == 0 || !(0.0..1.0).contains(&view.x) || !(0.0..1.0).contains(&view.y) {
        return None;
    }
    let n = size as f64;
    let x = ((view.x * n).floor() as usize).min(size - 1);
    let y = ((view.y * n).floor() as usize).min(size - 1);
    Some((x, y))
}
