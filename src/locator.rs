//! Candidate collection and drop-target finding.
//!
//! The locator reads the store and hands the resolvers flat candidate lists
//! in traversal order. Order only breaks ties ("first match wins"); none of
//! the finders sort by distance.

#[cfg(test)]
#[path = "locator_test.rs"]
mod locator_test;

use std::collections::HashSet;

use crate::geometry::{Point, Rect, Tolerance, contains, intersects};
use crate::scene::{EntityId, Product, SceneStore, Section, Shelf};

/// Everything a drag could land on or collide with.
#[derive(Debug, Clone, Default)]
pub struct Candidates<'a> {
    pub sections: Vec<&'a Section>,
    pub shelves: Vec<&'a Shelf>,
    pub products: Vec<&'a Product>,
}

/// The dragged item's bounding box at the candidate drop position.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DropProbe {
    /// Top-left corner, absolute.
    pub at: Point,
    pub width: f64,
    pub height: f64,
}

impl DropProbe {
    #[must_use]
    pub fn new(at: Point, width: f64, height: f64) -> Self {
        Self { at, width, height }
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::at(self.at, self.width, self.height)
    }

    /// Bottom-left corner: where the item would rest.
    #[must_use]
    pub fn bottom_left(&self) -> Point {
        Point::new(self.at.x, self.at.y + self.height)
    }
}

/// Collect sections, shelves, and products in traversal order.
///
/// `dragged` is left out of every list. When it names a product, products
/// (transitively) stacked on it are left out too: resting the dragged item on
/// one of them would loop the stack.
#[must_use]
pub fn find_shelves_and_products(store: &SceneStore, dragged: Option<EntityId>) -> Candidates<'_> {
    let excluded: HashSet<EntityId> = match dragged {
        Some(id) => std::iter::once(id).chain(store.stack_dependents(&id)).collect(),
        None => HashSet::new(),
    };
    Candidates {
        sections: store.sections().collect(),
        shelves: store.shelves().filter(|s| !excluded.contains(&s.id)).collect(),
        products: store.products().filter(|p| !excluded.contains(&p.id)).collect(),
    }
}

/// First shelf the probe lands on.
///
/// A shelf matches when the probe's top-left corner lies inside it, or when
/// the probe's bottom edge sits between `y_tolerance` above the shelf top
/// and the shelf bottom with the probe's x inside the shelf's horizontal
/// extent. The tolerance only reaches upward: a probe hanging below the
/// shelf does not rest on it.
///
/// Shelves with zero width or height have no usable extent and are skipped.
#[must_use]
pub fn find_target_shelf<'a>(shelves: &[&'a Shelf], probe: DropProbe, y_tolerance: f64) -> Option<&'a Shelf> {
    let bottom = probe.bottom_left();
    shelves.iter().copied().find(|shelf| {
        let rect = shelf.rect();
        if rect.is_degenerate() {
            tracing::trace!(shelf_id = %shelf.id, "shelf without usable size skipped");
            return false;
        }
        let resting = bottom.x >= rect.x
            && bottom.x <= rect.right()
            && bottom.y + y_tolerance >= rect.y
            && bottom.y <= rect.bottom();
        resting || contains(probe.at, rect, Tolerance::NONE)
    })
}

/// First product (other than `exclude`) the probe would stack onto.
///
/// Horizontally the probe's x must lie within `tolerance.x` of the target
/// product's span, measured with the target's width on both sides.
/// Vertically the band runs from one product height above the target's top
/// (less `tolerance.y`) to one product height below it, so a drop slightly
/// above a product still stacks on it.
#[must_use]
pub fn find_target_product<'a>(
    products: &[&'a Product],
    probe: DropProbe,
    tolerance: Tolerance,
    exclude: Option<EntityId>,
) -> Option<&'a Product> {
    let drop = probe.at;
    products.iter().copied().find(|product| {
        if Some(product.id) == exclude {
            return false;
        }
        let horizontal =
            drop.x + product.width + tolerance.x >= product.x && drop.x <= product.x + product.width + tolerance.x;
        let vertical = drop.y + tolerance.y >= product.y - product.height && drop.y <= product.y + product.height;
        horizontal && vertical
    })
}

/// First section strictly intersecting the probe's full bounding box.
#[must_use]
pub fn find_intersecting_section<'a>(sections: &[&'a Section], probe: DropProbe) -> Option<&'a Section> {
    let footprint = probe.rect();
    sections.iter().copied().find(|section| intersects(footprint, section.rect()))
}
