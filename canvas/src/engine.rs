use wasm_bindgen::{JsCast, JsValue};
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement};

use crate::gesture::{Action, GestureController};
use crate::input::{Contact, WheelDelta};
use crate::render;
use crate::transform::{Point, ViewTransform};

/// The browser-bound engine. Owns the 2D context and the gesture controller.
///
/// All input logic lives in [`GestureController`] so it can be tested without
/// a browser; this type only binds it to a canvas element.
pub struct Engine {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    width: f64,
    height: f64,
    dpr: f64,
    gestures: GestureController,
}

impl Engine {
    /// Attach to a canvas element, fitting the board to its bounding box.
    ///
    /// `dpr` is the device pixel ratio (`window.devicePixelRatio`). The
    /// backing store is resized to the bounding box in device pixels so the
    /// CSS-pixel transform used for input matches what is drawn.
    ///
    /// # Errors
    ///
    /// Returns `Err` if the element has no 2D context.
    pub fn attach(canvas: &HtmlCanvasElement, dpr: f64) -> Result<Self, JsValue> {
        let rect = canvas.get_bounding_client_rect();
        let (width, height) = (rect.width(), rect.height());
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("canvas has no 2d context"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        let engine = Self {
            canvas: canvas.clone(),
            ctx,
            width,
            height,
            dpr: render::normalize_dpr(dpr),
            gestures: GestureController::new(ViewTransform::fit(width, height)),
        };
        engine.resize_backing_store();
        Ok(engine)
    }

    /// The element was resized or moved to a screen with another pixel ratio.
    ///
    /// The view transform is kept; only the backing store follows.
    pub fn set_viewport(&mut self, width_css: f64, height_css: f64, dpr: f64) {
        self.width = width_css;
        self.height = height_css;
        self.dpr = render::normalize_dpr(dpr);
        self.resize_backing_store();
    }

    fn resize_backing_store(&self) {
        let (width, height) = render::backing_size(self.width, self.height, self.dpr);
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    // --- Input events ---

    pub fn on_pointer_down(&mut self, contact: Contact) -> Vec<Action> {
        self.gestures.on_pointer_down(contact)
    }

    pub fn on_pointer_move(&mut self, contacts: &[Contact]) -> Vec<Action> {
        self.gestures.on_pointer_move(contacts)
    }

    pub fn on_pointer_up(&mut self, released: &[Contact]) -> Vec<Action> {
        self.gestures.on_pointer_up(released)
    }

    pub fn on_cancel(&mut self) {
        self.gestures.on_cancel();
    }

    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta) -> Vec<Action> {
        self.gestures.on_wheel(screen, delta)
    }

    // --- Render ---

    /// Draw a frame of the given pixel buffer (row-major, `size * size` samples).
    ///
    /// # Errors
    ///
    /// Returns `Err` if any `Canvas2D` call fails.
    pub fn render(&self, pixels: &[[u8; 3]], size: usize) -> Result<(), JsValue> {
        render::prepare_draw(&self.ctx, &self.gestures.transform(), self.width, self.height, self.dpr)?;
        render::draw_cells(&self.ctx, pixels, size);
        Ok(())
    }

    // --- Queries ---

    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.gestures.transform()
    }

    #[must_use]
    pub fn is_possible_tap(&self) -> bool {
        self.gestures.is_possible_tap()
    }
}
