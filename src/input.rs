//! Input model: modifier keys, mouse buttons, selection, and the drag state
//! machine.
//!
//! `InputState` is the active gesture tracked between pointer-down and
//! pointer-up. It carries what the engine needs to preview the drag on every
//! move, commit exactly one placement on release, and snap back on cancel.

#[cfg(test)]
#[path = "input_test.rs"]
mod input_test;

use crate::geometry::Point;
use crate::scene::EntityId;

/// Keyboard/mouse modifier keys held during an event.
#[allow(clippy::struct_excessive_bools)]
#[derive(Debug, Clone, Copy, Default)]
pub struct Modifiers {
    /// Shift key is held.
    pub shift: bool,
    /// Ctrl key is held.
    pub ctrl: bool,
    /// Alt / Option key is held.
    pub alt: bool,
    /// Meta / Command key is held.
    pub meta: bool,
}

impl Modifiers {
    /// Platform command key: Ctrl or Meta.
    #[must_use]
    pub fn command(self) -> bool {
        self.ctrl || self.meta
    }
}

/// Mouse button identifier.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Button {
    /// Left mouse button (or single-finger tap).
    Primary,
    /// Middle mouse button (scroll wheel click).
    Middle,
    /// Right mouse button (or two-finger tap).
    Secondary,
}

/// A keyboard key.
///
/// The inner string holds the key name as reported by the host (e.g.
/// `"Delete"`, `"Escape"`, `"c"`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Key(pub String);

impl Key {
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Case-insensitive name comparison.
    #[must_use]
    pub fn is(&self, name: &str) -> bool {
        self.0.eq_ignore_ascii_case(name)
    }
}

/// Persistent UI state visible to the renderer.
#[derive(Debug, Clone, Default)]
pub struct UiState {
    /// Selected entity ids in selection order.
    pub selected: Vec<EntityId>,
}

impl UiState {
    /// Replace the selection with `id`.
    pub fn select_one(&mut self, id: EntityId) {
        self.selected.clear();
        self.selected.push(id);
    }

    /// Add `id` if absent, remove it if present.
    pub fn toggle(&mut self, id: EntityId) {
        if let Some(pos) = self.selected.iter().position(|s| *s == id) {
            self.selected.remove(pos);
        } else {
            self.selected.push(id);
        }
    }

    pub fn clear(&mut self) {
        self.selected.clear();
    }

    /// Drop `id` from the selection, e.g. after it was deleted.
    pub fn deselect(&mut self, id: &EntityId) {
        self.selected.retain(|s| s != id);
    }

    #[must_use]
    pub fn is_selected(&self, id: &EntityId) -> bool {
        self.selected.contains(id)
    }
}

/// Internal state for the input state machine.
#[derive(Debug, Clone, Default)]
pub enum InputState {
    /// No gesture in progress; waiting for the next pointer-down.
    #[default]
    Idle,
    /// The user is moving a product. The store is not touched until release,
    /// so the product's stored position is where a cancel snaps back to.
    DraggingProduct {
        id: EntityId,
        /// Pointer position minus the product's top-left at pointer-down.
        grab: Point,
    },
    /// The user is moving a shelf. The store follows every move so products
    /// riding the shelf move with it.
    DraggingShelf {
        id: EntityId,
        grab: Point,
        /// Absolute top-left at the start of the drag.
        orig: Point,
        /// Section the shelf belonged to when the drag started.
        orig_section: Option<EntityId>,
    },
}

impl InputState {
    /// Id of the entity being dragged, if any.
    #[must_use]
    pub fn dragged_id(&self) -> Option<EntityId> {
        match self {
            Self::Idle => None,
            Self::DraggingProduct { id, .. } | Self::DraggingShelf { id, .. } => Some(*id),
        }
    }

    /// Top-left of the dragged item for pointer position `pointer`.
    #[must_use]
    pub fn drag_origin(&self, pointer: Point) -> Option<Point> {
        match self {
            Self::Idle => None,
            Self::DraggingProduct { grab, .. } | Self::DraggingShelf { grab, .. } => Some(pointer.relative_to(*grab)),
        }
    }
}
