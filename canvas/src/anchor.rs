//! Anchors bind one contact's screen position to the view point beneath it.
//!
//! Panning and zooming work by keeping an anchor's view point pinned under its
//! current screen position. Anchors are immutable; every input event that
//! moves a contact produces a new anchor via [`GestureAnchor::moved_to`].

#[cfg(test)]
#[path = "anchor_test.rs"]
mod anchor_test;

use crate::input::{Contact, ContactId};
use crate::transform::{Point, ViewTransform};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureAnchor {
    id: Option<ContactId>,
    screen: Point,
    view: Point,
}

impl GestureAnchor {
    /// Capture `contact` against the current transform.
    #[must_use]
    pub fn capture(contact: Contact, transform: &ViewTransform) -> Self {
        Self { id: contact.id, screen: contact.screen, view: transform.screen_to_view(contact.screen) }
    }

    /// The same view point, now under a new screen position.
    #[must_use]
    pub fn moved_to(self, screen: Point) -> Self {
        Self { screen, ..self }
    }

    /// Synthetic anchor halfway between two anchors, in both spaces.
    #[must_use]
    pub fn midpoint(a: Self, b: Self) -> Self {
        Self { id: None, screen: a.screen.midpoint(b.screen), view: a.view.midpoint(b.view) }
    }

    #[must_use]
    pub fn id(&self) -> Option<ContactId> {
        self.id
    }

    #[must_use]
    pub fn screen(&self) -> Point {
        self.screen
    }

    #[must_use]
    pub fn view(&self) -> Point {
        self.view
    }

    /// The contact this anchor was captured from, at its last known position.
    #[must_use]
    pub fn contact(&self) -> Contact {
        Contact { id: self.id, screen: self.screen }
    }

    /// Whether `contact` is the one this anchor follows.
    #[must_use]
    pub fn tracks(&self, contact: &Contact) -> bool {
        self.id == contact.id
    }

    /// Find this anchor's contact among the contacts reported by an event.
    #[must_use]
    pub fn find_in(&self, contacts: &[Contact]) -> Option<Contact> {
        contacts.iter().copied().find(|c| self.tracks(c))
    }
}
