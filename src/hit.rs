//! Pointer hit-testing: which entity a pointer-down lands on.

#[cfg(test)]
#[path = "hit_test.rs"]
mod hit_test;

use crate::geometry::{Point, Tolerance, contains};
use crate::scene::{EntityId, SceneStore};

/// What kind of entity the pointer landed on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HitKind {
    Product,
    Shelf,
    Section,
}

/// Result of a hit test.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Hit {
    pub id: EntityId,
    pub kind: HitKind,
}

/// Topmost entity under `point`.
///
/// Products sit above shelves, shelves above sections. Within a layer the
/// entity added last is on top. Edges count as inside.
#[must_use]
pub fn hit_test(store: &SceneStore, point: Point) -> Option<Hit> {
    let under = |rect| contains(point, rect, Tolerance::NONE);

    if let Some(product) = store.products().rev().find(|p| under(p.rect())) {
        return Some(Hit { id: product.id, kind: HitKind::Product });
    }
    if let Some(shelf) = store.shelves().rev().find(|s| under(s.rect())) {
        return Some(Hit { id: shelf.id, kind: HitKind::Shelf });
    }
    store
        .sections()
        .rev()
        .find(|s| under(s.rect()))
        .map(|section| Hit { id: section.id, kind: HitKind::Section })
}
