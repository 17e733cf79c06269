//! Gesture state machine: pointer, touch, and wheel input to pan/zoom and taps.
//!
//! The controller owns the [`ViewTransform`] and at most two tracked anchors.
//! Handlers never block and never touch grid state; they return
//! [`Action`]s for the host to process (redraw, tap at a view point).
//!
//! A tap is reported at most once per down→up cycle, only when no move or
//! second contact arrived in between, at the view position of the release.

#[cfg(test)]
#[path = "gesture_test.rs"]
mod gesture_test;

use crate::anchor::GestureAnchor;
use crate::consts::{MIN_WHEEL_FACTOR, PINCH_MIN_DISTANCE_PX, WHEEL_ZOOM_SENSITIVITY};
use crate::input::{Contact, WheelDelta};
use crate::transform::{Point, ViewTransform};

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Action {
    /// The transform changed; the next frame must be redrawn.
    RenderNeeded,
    /// A tap was released at this view-space point.
    Tap { view: Point },
}

/// The active gesture, carrying the anchors it tracks.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum GestureState {
    /// No contact is held.
    #[default]
    Idle,
    /// One contact is held; its view point stays under it.
    Dragging { anchor: GestureAnchor },
    /// Two contacts are held; their midpoint pivots the zoom.
    Pinching {
        first: GestureAnchor,
        second: GestureAnchor,
        /// Screen distance between the contacts when the pinch was (re)seeded.
        initial_distance: f64,
        /// Transform scale when the pinch was (re)seeded.
        initial_scale: f64,
    },
}

#[derive(Debug, Clone)]
pub struct GestureController {
    transform: ViewTransform,
    state: GestureState,
    possible_tap: bool,
}

impl GestureController {
    #[must_use]
    pub fn new(transform: ViewTransform) -> Self {
        Self { transform, state: GestureState::Idle, possible_tap: false }
    }

    /// The current view transform.
    #[must_use]
    pub fn transform(&self) -> ViewTransform {
        self.transform
    }

    #[must_use]
    pub fn state(&self) -> &GestureState {
        &self.state
    }

    /// Whether releasing now (with one contact) would report a tap.
    #[must_use]
    pub fn is_possible_tap(&self) -> bool {
        self.possible_tap
    }

    // --- Input events ---

    /// A contact went down (mouse button press or one new touch point).
    pub fn on_pointer_down(&mut self, contact: Contact) -> Vec<Action> {
        match self.state {
            GestureState::Idle => {
                self.state = GestureState::Dragging { anchor: GestureAnchor::capture(contact, &self.transform) };
                self.possible_tap = true;
            }
            GestureState::Dragging { anchor } if anchor.tracks(&contact) => {
                // Press repeated without a release in between: restart the drag.
                self.state = GestureState::Dragging { anchor: GestureAnchor::capture(contact, &self.transform) };
                self.possible_tap = true;
            }
            GestureState::Dragging { anchor } => {
                self.state = self.seed_pinch(anchor.contact(), contact);
                self.possible_tap = false;
            }
            GestureState::Pinching { .. } => {
                self.state = GestureState::Idle;
                self.possible_tap = false;
            }
        }
        Vec::new()
    }

    /// Contacts moved. `contacts` holds every contact the event still reports.
    pub fn on_pointer_move(&mut self, contacts: &[Contact]) -> Vec<Action> {
        match self.state {
            GestureState::Idle => Vec::new(),
            GestureState::Dragging { anchor } => {
                self.possible_tap = false;
                match anchor.find_in(contacts) {
                    Some(current) => self.drag_to(anchor.moved_to(current.screen)),
                    None => {
                        if let Some(first) = contacts.first() {
                            self.state = GestureState::Dragging { anchor: GestureAnchor::capture(*first, &self.transform) };
                        }
                        Vec::new()
                    }
                }
            }
            GestureState::Pinching { first, second, initial_distance, initial_scale } => {
                self.possible_tap = false;
                match (first.find_in(contacts), second.find_in(contacts)) {
                    (Some(a), Some(b)) => {
                        self.pinch_to(first.moved_to(a.screen), second.moved_to(b.screen), initial_distance, initial_scale)
                    }
                    (Some(a), None) => self.pan_and_rebase(first.moved_to(a.screen), contacts),
                    (None, Some(b)) => self.pan_and_rebase(second.moved_to(b.screen), contacts),
                    (None, None) => {
                        self.reseed(contacts);
                        Vec::new()
                    }
                }
            }
        }
    }

    /// Contacts were released. `released` holds the contacts that went up.
    ///
    /// Always ends the gesture; a later two-finger touch re-baselines fresh.
    pub fn on_pointer_up(&mut self, released: &[Contact]) -> Vec<Action> {
        let mut actions = Vec::new();
        if self.possible_tap {
            if let [contact] = released {
                actions.push(Action::Tap { view: self.transform.screen_to_view(contact.screen) });
            }
        }
        self.state = GestureState::Idle;
        self.possible_tap = false;
        actions
    }

    /// The platform cancelled the gesture (e.g. `touchcancel`). No tap is reported.
    pub fn on_cancel(&mut self) {
        self.state = GestureState::Idle;
        self.possible_tap = false;
    }

    /// Zoom around the wheel position, keeping its view point under the cursor.
    ///
    /// A non-finite delta or position is ignored.
    pub fn on_wheel(&mut self, screen: Point, delta: WheelDelta) -> Vec<Action> {
        if !delta.dy.is_finite() || !screen.x.is_finite() || !screen.y.is_finite() {
            return Vec::new();
        }
        let anchor = GestureAnchor::capture(Contact::mouse(screen), &self.transform);
        let factor = (1.0 - delta.dy * WHEEL_ZOOM_SENSITIVITY).max(MIN_WHEEL_FACTOR);
        let before = self.transform;

        self.transform.set_scale(self.transform.scale() * factor);
        self.transform.pin(anchor.view(), anchor.screen());

        if let GestureState::Pinching { first, second, .. } = self.state {
            self.state = self.seed_pinch(first.contact(), second.contact());
        }

        if self.transform == before { Vec::new() } else { vec![Action::RenderNeeded] }
    }

    // --- Transitions ---

    fn drag_to(&mut self, anchor: GestureAnchor) -> Vec<Action> {
        self.transform.pin(anchor.view(), anchor.screen());
        self.state = GestureState::Dragging { anchor };
        vec![Action::RenderNeeded]
    }

    /// Both tracked contacts moved: scale by the distance ratio and pin the
    /// midpoint's view point under the new screen midpoint.
    fn pinch_to(
        &mut self,
        first: GestureAnchor,
        second: GestureAnchor,
        initial_distance: f64,
        initial_scale: f64,
    ) -> Vec<Action> {
        let mid = GestureAnchor::midpoint(first, second);
        if initial_distance >= PINCH_MIN_DISTANCE_PX {
            let distance = first.screen().distance(second.screen());
            self.transform.set_scale(initial_scale * (distance / initial_distance));
        }
        self.transform.pin(mid.view(), mid.screen());
        self.state = GestureState::Pinching { first, second, initial_distance, initial_scale };
        vec![Action::RenderNeeded]
    }

    /// One tracked contact survived: pan with it, then re-seed the pinch from
    /// it and whichever other contact is now reported.
    fn pan_and_rebase(&mut self, fixed: GestureAnchor, contacts: &[Contact]) -> Vec<Action> {
        self.transform.pin(fixed.view(), fixed.screen());
        self.state = match contacts.iter().find(|c| !fixed.tracks(c)) {
            Some(other) => self.seed_pinch(fixed.contact(), *other),
            None => GestureState::Dragging { anchor: fixed },
        };
        vec![Action::RenderNeeded]
    }

    /// Neither tracked contact is reported: start over from what is.
    fn reseed(&mut self, contacts: &[Contact]) {
        match contacts {
            [] => {}
            [only] => {
                self.state = GestureState::Dragging { anchor: GestureAnchor::capture(*only, &self.transform) };
            }
            [a, b, ..] => self.state = self.seed_pinch(*a, *b),
        }
    }

    fn seed_pinch(&self, first: Contact, second: Contact) -> GestureState {
        let first = GestureAnchor::capture(first, &self.transform);
        let second = GestureAnchor::capture(second, &self.transform);
        GestureState::Pinching {
            first,
            second,
            initial_distance: first.screen().distance(second.screen()),
            initial_scale: self.transform.scale(),
        }
    }
}
