//! Drop resolution: where a released item ends up and under which parent.
//!
//! Product drops follow a fixed precedence, first match wins:
//!
//! 1. a target shelf: rest on its top surface;
//! 2. a target product: stack on top of it, in its container's frame;
//! 3. nothing: snap back to where the drag started.
//!
//! Shelf drops attach to the first section the shelf's footprint intersects,
//! pinned to the section's left edge, or become standalone.
//!
//! Resolvers only read the store. The `apply_*` functions commit a decision
//! through the store's mutation API.

#[cfg(test)]
#[path = "placement_test.rs"]
mod placement_test;

use serde::{Deserialize, Serialize};

use crate::config::PlacementConfig;
use crate::geometry::{Point, Tolerance};
use crate::locator::{DropProbe, find_intersecting_section, find_shelves_and_products, find_target_product, find_target_shelf};
use crate::scene::{EntityId, Product, ProductPositionUpdate, SceneStore, Shelf};

/// Decision record for a product drop.
///
/// `x` / `y` are the resulting absolute position; `relative_x` /
/// `relative_y` are in the new container's frame.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Placement {
    pub x: f64,
    pub y: f64,
    pub relative_x: f64,
    pub relative_y: f64,
    pub shelf_id: Option<EntityId>,
    pub section_id: Option<EntityId>,
    pub parent_product_id: Option<EntityId>,
    pub found_shelf: bool,
    pub found_product: bool,
}

impl Placement {
    /// Neither a shelf nor a product matched; the item goes back.
    #[must_use]
    pub fn is_revert(&self) -> bool {
        !self.found_shelf && !self.found_product
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }
}

/// Decision record for a shelf drop.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ShelfPlacement {
    pub x: f64,
    pub y: f64,
    pub relative_x: f64,
    pub relative_y: f64,
    pub section_id: Option<EntityId>,
}

/// Decide where `dragged` lands when released with its top-left at `drop`.
///
/// Candidates exclude `dragged` and anything stacked on it.
#[must_use]
pub fn resolve_product_placement(
    store: &SceneStore,
    dragged: &Product,
    drop: Point,
    config: &PlacementConfig,
) -> Placement {
    let candidates = find_shelves_and_products(store, Some(dragged.id));
    let probe = DropProbe::new(drop, dragged.width, dragged.height);

    if let Some(shelf) = find_target_shelf(&candidates.shelves, probe, config.shelf_y_tolerance) {
        let relative = Point::new(drop.x - shelf.x, -dragged.height - config.shelf_top_offset);
        let absolute = relative.offset_by(shelf.origin());
        tracing::debug!(product_id = %dragged.id, shelf_id = %shelf.id, "drop resolved to shelf");
        return Placement {
            x: absolute.x,
            y: absolute.y,
            relative_x: relative.x,
            relative_y: relative.y,
            shelf_id: Some(shelf.id),
            section_id: shelf.section_id,
            parent_product_id: None,
            found_shelf: true,
            found_product: false,
        };
    }

    let tolerance = Tolerance::new(config.product_x_tolerance, config.product_y_tolerance);
    if let Some(target) = find_target_product(&candidates.products, probe, tolerance, Some(dragged.id)) {
        let relative = Point::new(target.relative_x, target.relative_y - dragged.height - config.stack_gap);
        let absolute = relative.offset_by(store.container_origin(target));
        tracing::debug!(product_id = %dragged.id, target_id = %target.id, "drop resolved to product stack");
        return Placement {
            x: absolute.x,
            y: absolute.y,
            relative_x: relative.x,
            relative_y: relative.y,
            shelf_id: target.mount.shelf_id(),
            section_id: target.section_id,
            parent_product_id: Some(target.id),
            found_shelf: false,
            found_product: true,
        };
    }

    tracing::debug!(product_id = %dragged.id, x = drop.x, y = drop.y, "no drop target; reverting");
    revert_to(dragged)
}

/// The snap-back decision for `product`: its current position and parents.
#[must_use]
pub fn revert_to(product: &Product) -> Placement {
    Placement {
        x: product.x,
        y: product.y,
        relative_x: product.relative_x,
        relative_y: product.relative_y,
        shelf_id: product.mount.shelf_id(),
        section_id: product.section_id,
        parent_product_id: product.mount.resting_on(),
        found_shelf: false,
        found_product: false,
    }
}

/// Commit a product decision. A revert leaves the store untouched.
///
/// Returns `false` if the product is unknown or the store dropped the
/// update (stale target, stack loop).
pub fn apply_product_placement(store: &mut SceneStore, product_id: EntityId, placement: &Placement) -> bool {
    if placement.is_revert() {
        return store.product(&product_id).is_some();
    }
    store.update_product_position(
        product_id,
        ProductPositionUpdate {
            x: placement.x,
            y: placement.y,
            relative_x: Some(placement.relative_x),
            relative_y: Some(placement.relative_y),
            shelf_id: placement.shelf_id,
            section_id: placement.section_id,
            resting_on: placement.parent_product_id,
        },
    )
}

/// Decide where `shelf` lands when released with its top-left at `drop`.
#[must_use]
pub fn resolve_shelf_placement(store: &SceneStore, shelf: &Shelf, drop: Point) -> ShelfPlacement {
    let candidates = find_shelves_and_products(store, Some(shelf.id));
    let probe = DropProbe::new(drop, shelf.width, shelf.height);

    match find_intersecting_section(&candidates.sections, probe) {
        Some(section) => {
            tracing::debug!(shelf_id = %shelf.id, section_id = %section.id, "shelf drop resolved to section");
            ShelfPlacement {
                x: section.x,
                y: drop.y,
                relative_x: 0.0,
                relative_y: drop.y - section.y,
                section_id: Some(section.id),
            }
        }
        None => {
            tracing::debug!(shelf_id = %shelf.id, "shelf dropped outside every section");
            ShelfPlacement { x: drop.x, y: drop.y, relative_x: drop.x, relative_y: drop.y, section_id: None }
        }
    }
}

/// Commit a shelf decision. Products on the shelf move with it.
pub fn apply_shelf_placement(store: &mut SceneStore, shelf_id: EntityId, placement: &ShelfPlacement) -> bool {
    store.move_shelf(shelf_id, placement.x, placement.y, placement.section_id)
}
