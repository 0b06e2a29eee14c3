//! Drag-time collision feedback.
//!
//! [`resolve_collisions`] runs on every pointer-move of a product drag. It
//! never affects placement; its only effects are the returned report and the
//! highlight it writes for every candidate through a [`HighlightSink`].

#[cfg(test)]
#[path = "collision_test.rs"]
mod collision_test;

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::consts::COLLISION_FILL;
use crate::geometry::{OverlapMargins, Rect, overlaps};
use crate::scene::{EntityId, Product};

/// Visual state of a product during a drag.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Highlight {
    /// Product's own color.
    #[default]
    Base,
    /// Flag color: the dragged item overlaps this product.
    Colliding,
}

impl Highlight {
    /// Fill to draw with, given the product's base color.
    #[must_use]
    pub fn fill(self, base: &str) -> &str {
        match self {
            Self::Base => base,
            Self::Colliding => COLLISION_FILL,
        }
    }
}

/// Receiver for per-candidate highlight writes.
pub trait HighlightSink {
    fn set_highlight(&mut self, id: EntityId, highlight: Highlight);
}

/// Highlight state kept in memory, keyed by product id. Unknown ids read
/// as [`Highlight::Base`].
#[derive(Debug, Clone, Default)]
pub struct HighlightMap {
    states: HashMap<EntityId, Highlight>,
}

impl HighlightMap {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, id: &EntityId) -> Highlight {
        self.states.get(id).copied().unwrap_or_default()
    }

    /// Ids currently flagged, in no particular order.
    #[must_use]
    pub fn colliding(&self) -> Vec<EntityId> {
        self.states
            .iter()
            .filter(|(_, h)| **h == Highlight::Colliding)
            .map(|(id, _)| *id)
            .collect()
    }

    /// Forget one product (e.g. after it was deleted).
    pub fn remove(&mut self, id: &EntityId) {
        self.states.remove(id);
    }

    /// Reset everything to base.
    pub fn clear(&mut self) {
        self.states.clear();
    }
}

impl HighlightSink for HighlightMap {
    fn set_highlight(&mut self, id: EntityId, highlight: Highlight) {
        if highlight == Highlight::Base {
            self.states.remove(&id);
        } else {
            self.states.insert(id, highlight);
        }
    }
}

/// Outcome of one collision scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct CollisionReport {
    /// Last candidate, in scan order, that the dragged box overlaps.
    pub colliding_id: Option<EntityId>,
    pub has_collision: bool,
}

/// Test `dragged` against every product except `dragged_id`.
///
/// There is no early exit: every candidate gets a highlight write on every
/// call, `Colliding` when overlapped and `Base` otherwise, which is what
/// clears highlights left over from earlier moves. The report names the
/// last overlapping candidate.
pub fn resolve_collisions<S>(
    dragged: Rect,
    products: &[&Product],
    dragged_id: EntityId,
    margins: OverlapMargins,
    sink: &mut S,
) -> CollisionReport
where
    S: HighlightSink + ?Sized,
{
    let mut report = CollisionReport::default();
    for product in products {
        if product.id == dragged_id {
            continue;
        }
        if overlaps(dragged, product.rect(), margins) {
            sink.set_highlight(product.id, Highlight::Colliding);
            report = CollisionReport { colliding_id: Some(product.id), has_collision: true };
        } else {
            sink.set_highlight(product.id, Highlight::Base);
        }
    }
    tracing::trace!(
        %dragged_id,
        candidates = products.len(),
        colliding_id = ?report.colliding_id,
        "collision scan"
    );
    report
}
