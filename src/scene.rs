//! Scene model: sections, shelves, products, and the store that owns them.
//!
//! Parent relationships are weak id back-references (`Shelf::section_id`,
//! `Product::mount`, `Product::section_id`). The store keeps the reverse
//! direction in [`ChildIndex`] tables so child lookups never scan the scene.
//!
//! Coordinate frames: every entity stores its absolute canvas position
//! (`x`, `y`). Attached entities also store `relative_x` / `relative_y` in
//! their container's frame:
//!
//! - a shelf in a section: relative to the section origin;
//! - a product on a shelf (directly or stacked): relative to the shelf origin;
//! - a product in a section without a shelf: relative to the section origin;
//! - anything standalone: relative equals absolute.
//!
//! Every mutation keeps `absolute == container origin + relative`.
//!
//! Construction (`add_*`, [`SceneStore::load_snapshot`]) validates its input
//! and returns [`SceneError`]. Mutations of existing entities drop malformed
//! commands silently (logged at debug) and report whether they applied.

#[cfg(test)]
#[path = "scene_test.rs"]
mod scene_test;

use std::collections::{HashMap, HashSet, VecDeque};

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::consts::{DEFAULT_PRODUCT_COLOR, DEFAULT_PRODUCT_KIND};
use crate::geometry::{Point, Rect, Tolerance, contains};
use crate::index::ChildIndex;

/// Unique identifier for any scene entity.
pub type EntityId = Uuid;

/// Rejections raised while building or loading a scene.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum SceneError {
    #[error("invalid size {width}x{height}: dimensions must be finite and non-negative")]
    InvalidSize { width: f64, height: f64 },
    #[error("invalid position ({x}, {y}): coordinates must be finite")]
    InvalidPosition { x: f64, y: f64 },
    #[error("unknown section: {0}")]
    UnknownSection(EntityId),
    #[error("unknown shelf: {0}")]
    UnknownShelf(EntityId),
    #[error("unknown product: {0}")]
    UnknownProduct(EntityId),
    #[error("duplicate entity id: {0}")]
    DuplicateId(EntityId),
    #[error("product {product} cannot rest on {target}: the stack would loop back on itself")]
    StackCycle { product: EntityId, target: EntityId },
}

// =============================================================================
// ENTITIES
// =============================================================================

/// Top-level fixture container. Never has a parent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Section {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub name: String,
}

impl Section {
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }
}

/// Horizontal mounting surface, attached to a section or standalone.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Shelf {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    /// Zero means the shelf has no usable extent and is never a drop target.
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub section_id: Option<EntityId>,
    #[serde(default)]
    pub relative_x: f64,
    #[serde(default)]
    pub relative_y: f64,
}

impl Shelf {
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[must_use]
    pub fn relative(&self) -> Point {
        Point::new(self.relative_x, self.relative_y)
    }
}

/// What a product rests on. The three states are mutually exclusive.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum ProductMount {
    /// Positioned directly on the canvas (or in a section, see
    /// [`Product::section_id`]).
    #[default]
    Standalone,
    /// Sitting on a shelf surface.
    Shelf { shelf_id: EntityId },
    /// Stacked on top of another product. `shelf_id` is the container both
    /// products share, if any; relative coordinates are in its frame.
    Stack { on: EntityId, shelf_id: Option<EntityId> },
}

impl ProductMount {
    /// The shelf whose frame the product is positioned in.
    #[must_use]
    pub fn shelf_id(&self) -> Option<EntityId> {
        match *self {
            Self::Standalone => None,
            Self::Shelf { shelf_id } => Some(shelf_id),
            Self::Stack { shelf_id, .. } => shelf_id,
        }
    }

    /// The product this one sits on, when stacked.
    #[must_use]
    pub fn resting_on(&self) -> Option<EntityId> {
        match *self {
            Self::Stack { on, .. } => Some(on),
            _ => None,
        }
    }
}

/// A placeable item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub id: EntityId,
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    pub relative_x: f64,
    pub relative_y: f64,
    #[serde(default)]
    pub mount: ProductMount,
    #[serde(default)]
    pub section_id: Option<EntityId>,
    /// Product type label, e.g. `"Food"` or `"Drink"`.
    #[serde(default)]
    pub kind: String,
    #[serde(default)]
    pub code: String,
    /// Base fill; collision highlighting resets to this.
    #[serde(default)]
    pub color: String,
    #[serde(default)]
    pub image: Option<String>,
}

impl Product {
    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn rect(&self) -> Rect {
        Rect::new(self.x, self.y, self.width, self.height)
    }

    #[must_use]
    pub fn relative(&self) -> Point {
        Point::new(self.relative_x, self.relative_y)
    }

    /// Neither on a shelf nor inside a section.
    #[must_use]
    pub fn is_standalone(&self) -> bool {
        self.section_id.is_none() && self.mount.shelf_id().is_none()
    }

    fn links(&self) -> ProductLinks {
        ProductLinks { shelf: self.mount.shelf_id(), section: self.section_id, on: self.mount.resting_on() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ProductLinks {
    shelf: Option<EntityId>,
    section: Option<EntityId>,
    on: Option<EntityId>,
}

// =============================================================================
// COMMANDS
// =============================================================================

/// Request to create a section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewSection {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub name: Option<String>,
}

/// Request to create a shelf, optionally inside a section.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewShelf {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub section_id: Option<EntityId>,
}

/// Request to create a product, optionally on a shelf.
///
/// With a shelf, `relative_x` / `relative_y` win over `x` / `y` when given;
/// missing components are derived from the absolute position.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct NewProduct {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
    #[serde(default)]
    pub shelf_id: Option<EntityId>,
    #[serde(default)]
    pub relative_x: Option<f64>,
    #[serde(default)]
    pub relative_y: Option<f64>,
    #[serde(default)]
    pub kind: Option<String>,
    #[serde(default)]
    pub code: Option<String>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub image: Option<String>,
}

/// New local offset for a product riding a shelf that is being dragged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ChildOffset {
    pub product_id: EntityId,
    pub relative_x: f64,
    pub relative_y: f64,
}

/// Full position/parent rewrite for one product.
///
/// `shelf_id`, `section_id`, and `resting_on` replace the current values;
/// `None` clears them. See [`SceneStore::update_product_position`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct ProductPositionUpdate {
    pub x: f64,
    pub y: f64,
    #[serde(default)]
    pub relative_x: Option<f64>,
    #[serde(default)]
    pub relative_y: Option<f64>,
    #[serde(default)]
    pub shelf_id: Option<EntityId>,
    #[serde(default)]
    pub section_id: Option<EntityId>,
    #[serde(default)]
    pub resting_on: Option<EntityId>,
}

/// Whole-scene image used to hydrate or export a store. Order is traversal
/// order.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SceneSnapshot {
    #[serde(default)]
    pub sections: Vec<Section>,
    #[serde(default)]
    pub shelves: Vec<Shelf>,
    #[serde(default)]
    pub products: Vec<Product>,
}

/// Coordinate frame a product is positioned in.
#[derive(Debug, Clone, Copy)]
struct Frame {
    /// `None` for the canvas frame.
    origin: Option<Point>,
    section_id: Option<EntityId>,
}

// =============================================================================
// STORE
// =============================================================================

/// Authoritative scene state, one per editor.
#[derive(Debug, Default)]
pub struct SceneStore {
    sections: HashMap<EntityId, Section>,
    shelves: HashMap<EntityId, Shelf>,
    products: HashMap<EntityId, Product>,
    section_order: Vec<EntityId>,
    shelf_order: Vec<EntityId>,
    product_order: Vec<EntityId>,
    shelves_by_section: ChildIndex,
    products_by_shelf: ChildIndex,
    products_by_section: ChildIndex,
    stacked_on: ChildIndex,
}

impl SceneStore {
    /// Create an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    // --- Construction ---

    /// Add a section with a fresh id.
    ///
    /// # Errors
    ///
    /// `InvalidPosition` / `InvalidSize` for non-finite or negative input.
    pub fn add_section(&mut self, req: NewSection) -> Result<EntityId, SceneError> {
        validate_position(req.x, req.y)?;
        validate_size(req.width, req.height)?;
        let section = Section {
            id: Uuid::new_v4(),
            x: req.x,
            y: req.y,
            width: req.width,
            height: req.height,
            name: req.name.unwrap_or_else(|| "New Section".to_owned()),
        };
        let id = section.id;
        self.insert_section(section);
        tracing::debug!(%id, "section added");
        Ok(id)
    }

    /// Add a shelf with a fresh id. Its relative position is derived from
    /// the owning section, if any.
    ///
    /// # Errors
    ///
    /// `InvalidPosition` / `InvalidSize` for bad geometry, `UnknownSection`
    /// when `section_id` names no section.
    pub fn add_shelf(&mut self, req: NewShelf) -> Result<EntityId, SceneError> {
        validate_position(req.x, req.y)?;
        validate_size(req.width, req.height)?;
        let absolute = Point::new(req.x, req.y);
        let relative = match req.section_id {
            Some(section_id) => {
                let section = self.sections.get(&section_id).ok_or(SceneError::UnknownSection(section_id))?;
                absolute.relative_to(section.origin())
            }
            None => absolute,
        };
        let shelf = Shelf {
            id: Uuid::new_v4(),
            x: req.x,
            y: req.y,
            width: req.width,
            height: req.height,
            section_id: req.section_id,
            relative_x: relative.x,
            relative_y: relative.y,
        };
        let id = shelf.id;
        self.insert_shelf(shelf);
        tracing::debug!(%id, section_id = ?req.section_id, "shelf added");
        Ok(id)
    }

    /// Add a product with a fresh id, standalone or on a shelf.
    ///
    /// # Errors
    ///
    /// `InvalidPosition` / `InvalidSize` for bad geometry, `UnknownShelf`
    /// when `shelf_id` names no shelf.
    pub fn add_product(&mut self, req: NewProduct) -> Result<EntityId, SceneError> {
        validate_position(req.x, req.y)?;
        validate_size(req.width, req.height)?;

        let mut absolute = Point::new(req.x, req.y);
        let mut relative = absolute;
        let mut mount = ProductMount::Standalone;
        let mut section_id = None;
        if let Some(shelf_id) = req.shelf_id {
            let shelf = self.shelves.get(&shelf_id).ok_or(SceneError::UnknownShelf(shelf_id))?;
            let origin = shelf.origin();
            relative = Point::new(
                req.relative_x.unwrap_or(req.x - origin.x),
                req.relative_y.unwrap_or(req.y - origin.y),
            );
            validate_position(relative.x, relative.y)?;
            absolute = relative.offset_by(origin);
            mount = ProductMount::Shelf { shelf_id };
            section_id = shelf.section_id;
        }

        let product = Product {
            id: Uuid::new_v4(),
            x: absolute.x,
            y: absolute.y,
            width: req.width,
            height: req.height,
            relative_x: relative.x,
            relative_y: relative.y,
            mount,
            section_id,
            kind: req.kind.unwrap_or_else(|| DEFAULT_PRODUCT_KIND.to_owned()),
            code: req.code.unwrap_or_default(),
            color: req.color.unwrap_or_else(|| DEFAULT_PRODUCT_COLOR.to_owned()),
            image: req.image,
        };
        let id = product.id;
        self.insert_product(product);
        tracing::debug!(%id, shelf_id = ?req.shelf_id, "product added");
        Ok(id)
    }

    /// Replace the whole scene with `snapshot`.
    ///
    /// Shelf relative positions are re-derived from their sections. Attached
    /// products keep their relative position and have their absolute one
    /// re-derived; standalone products take relative = absolute. On error
    /// the store is left untouched.
    ///
    /// # Errors
    ///
    /// Any geometry, reference, duplicate-id, or stacking-cycle problem.
    pub fn load_snapshot(&mut self, snapshot: SceneSnapshot) -> Result<(), SceneError> {
        let mut next = Self::new();

        for section in snapshot.sections {
            validate_position(section.x, section.y)?;
            validate_size(section.width, section.height)?;
            next.ensure_fresh(section.id)?;
            next.insert_section(section);
        }

        for mut shelf in snapshot.shelves {
            validate_position(shelf.x, shelf.y)?;
            validate_size(shelf.width, shelf.height)?;
            next.ensure_fresh(shelf.id)?;
            let relative = match shelf.section_id {
                Some(section_id) => {
                    let section = next.sections.get(&section_id).ok_or(SceneError::UnknownSection(section_id))?;
                    shelf.origin().relative_to(section.origin())
                }
                None => shelf.origin(),
            };
            shelf.relative_x = relative.x;
            shelf.relative_y = relative.y;
            next.insert_shelf(shelf);
        }

        let product_ids: HashSet<EntityId> = snapshot.products.iter().map(|p| p.id).collect();
        for product in &snapshot.products {
            if let Some(on) = product.mount.resting_on() {
                if on == product.id {
                    return Err(SceneError::StackCycle { product: product.id, target: on });
                }
                if !product_ids.contains(&on) {
                    return Err(SceneError::UnknownProduct(on));
                }
            }
        }

        for mut product in snapshot.products {
            validate_position(product.x, product.y)?;
            validate_position(product.relative_x, product.relative_y)?;
            validate_size(product.width, product.height)?;
            next.ensure_fresh(product.id)?;
            let frame = next.frame_for(product.mount.shelf_id(), product.section_id)?;
            match frame.origin {
                Some(origin) => {
                    let absolute = product.relative().offset_by(origin);
                    product.x = absolute.x;
                    product.y = absolute.y;
                }
                None => {
                    product.relative_x = product.x;
                    product.relative_y = product.y;
                }
            }
            product.section_id = frame.section_id;
            next.insert_product(product);
        }

        for id in &next.product_order {
            let Some(on) = next.products.get(id).and_then(|p| p.mount.resting_on()) else {
                continue;
            };
            if next.would_cycle(*id, on) {
                return Err(SceneError::StackCycle { product: *id, target: on });
            }
        }

        tracing::debug!(
            sections = next.sections.len(),
            shelves = next.shelves.len(),
            products = next.products.len(),
            "snapshot loaded"
        );
        *self = next;
        Ok(())
    }

    /// Export the scene in traversal order.
    #[must_use]
    pub fn snapshot(&self) -> SceneSnapshot {
        SceneSnapshot {
            sections: self.sections().cloned().collect(),
            shelves: self.shelves().cloned().collect(),
            products: self.products().cloned().collect(),
        }
    }

    // --- Shelf mutations ---

    /// Move a shelf during a drag and, in the same step, set the local
    /// offsets of the listed products riding it.
    ///
    /// The shelf keeps its section; its relative position follows the move.
    /// Every product on the shelf gets its absolute position re-derived.
    /// Offsets for products not on this shelf are skipped. Returns `false`
    /// (and changes nothing) for an unknown shelf or non-finite position.
    pub fn update_shelf_position(&mut self, shelf_id: EntityId, x: f64, y: f64, children: &[ChildOffset]) -> bool {
        if !is_finite_pair(x, y) {
            tracing::debug!(%shelf_id, x, y, "update_shelf_position: non-finite position dropped");
            return false;
        }
        let Some(shelf) = self.shelves.get(&shelf_id) else {
            tracing::debug!(%shelf_id, "update_shelf_position: unknown shelf dropped");
            return false;
        };
        let section_id = shelf.section_id;

        for child in children {
            match self.products.get_mut(&child.product_id) {
                Some(product)
                    if product.mount.shelf_id() == Some(shelf_id)
                        && is_finite_pair(child.relative_x, child.relative_y) =>
                {
                    product.relative_x = child.relative_x;
                    product.relative_y = child.relative_y;
                }
                _ => {
                    tracing::debug!(%shelf_id, product_id = %child.product_id, "update_shelf_position: child offset skipped");
                }
            }
        }

        self.place_shelf(shelf_id, Point::new(x, y), section_id);
        true
    }

    /// Commit a shelf drop: re-resolve its section by testing the new
    /// top-left corner for containment in every section (first match in
    /// traversal order), then move it there. No match makes it standalone.
    pub fn finalize_shelf_position(&mut self, shelf_id: EntityId, x: f64, y: f64) -> bool {
        let corner = Point::new(x, y);
        let section_id = self
            .sections()
            .find(|section| contains(corner, section.rect(), Tolerance::NONE))
            .map(|section| section.id);
        self.move_shelf(shelf_id, x, y, section_id)
    }

    /// Move a shelf to absolute `(x, y)` under `section_id` (or standalone).
    ///
    /// Relative position, child products' absolute positions, and child
    /// products' section back-references all follow. Returns `false` for an
    /// unknown shelf or section or a non-finite position.
    pub fn move_shelf(&mut self, shelf_id: EntityId, x: f64, y: f64, section_id: Option<EntityId>) -> bool {
        if !is_finite_pair(x, y) {
            tracing::debug!(%shelf_id, x, y, "move_shelf: non-finite position dropped");
            return false;
        }
        if !self.shelves.contains_key(&shelf_id) {
            tracing::debug!(%shelf_id, "move_shelf: unknown shelf dropped");
            return false;
        }
        if let Some(section_id) = section_id {
            if !self.sections.contains_key(&section_id) {
                tracing::debug!(%shelf_id, %section_id, "move_shelf: unknown section dropped");
                return false;
            }
        }
        self.place_shelf(shelf_id, Point::new(x, y), section_id);
        true
    }

    // --- Product mutations ---

    /// Rewrite one product's position and parent links atomically.
    ///
    /// The container frame is the shelf when `shelf_id` is set, else the
    /// section when `section_id` is set, else the canvas. In a shelf or
    /// section frame the given relative coordinates win and the absolute
    /// position is re-derived; missing relative components come from the
    /// absolute position. In the canvas frame relative equals absolute.
    /// When `shelf_id` is set the shelf's section replaces `section_id`.
    /// If the product moves or changes parent, products resting on it are
    /// unstacked in place.
    ///
    /// Returns `false` and changes nothing for an unknown product, shelf,
    /// section, or stack base, a stack that would loop, or non-finite input.
    pub fn update_product_position(&mut self, id: EntityId, update: ProductPositionUpdate) -> bool {
        let Some(current) = self.products.get(&id) else {
            tracing::debug!(%id, "update_product_position: unknown product dropped");
            return false;
        };
        let before = current.links();
        let before_origin = current.origin();
        if !is_finite_pair(update.x, update.y) {
            tracing::debug!(%id, "update_product_position: non-finite position dropped");
            return false;
        }
        let frame = match self.frame_for(update.shelf_id, update.section_id) {
            Ok(frame) => frame,
            Err(e) => {
                tracing::debug!(%id, error = %e, "update_product_position: unknown parent dropped");
                return false;
            }
        };
        if let Some(on) = update.resting_on {
            if !self.products.contains_key(&on) || self.would_cycle(id, on) {
                tracing::debug!(%id, %on, "update_product_position: invalid stack base dropped");
                return false;
            }
        }

        let absolute = Point::new(update.x, update.y);
        let (absolute, relative) = match frame.origin {
            Some(origin) => {
                let relative = Point::new(
                    update.relative_x.unwrap_or(absolute.x - origin.x),
                    update.relative_y.unwrap_or(absolute.y - origin.y),
                );
                (relative.offset_by(origin), relative)
            }
            None => (absolute, absolute),
        };
        if !is_finite_pair(relative.x, relative.y) {
            tracing::debug!(%id, "update_product_position: non-finite relative position dropped");
            return false;
        }

        let mount = match (update.resting_on, update.shelf_id) {
            (Some(on), shelf_id) => ProductMount::Stack { on, shelf_id },
            (None, Some(shelf_id)) => ProductMount::Shelf { shelf_id },
            (None, None) => ProductMount::Standalone,
        };

        let Some(product) = self.products.get_mut(&id) else {
            return false;
        };
        product.x = absolute.x;
        product.y = absolute.y;
        product.relative_x = relative.x;
        product.relative_y = relative.y;
        product.mount = mount;
        product.section_id = frame.section_id;
        let after = product.links();
        self.relink_product(id, before, after);
        if after != before || absolute != before_origin {
            self.unstack_dependents(id);
        }
        true
    }

    /// Remove a product. Products stacked on it drop to their container's
    /// plain mount at unchanged coordinates.
    pub fn delete_product(&mut self, id: EntityId) -> bool {
        let Some(product) = self.products.remove(&id) else {
            tracing::debug!(%id, "delete_product: unknown product dropped");
            return false;
        };
        self.product_order.retain(|p| *p != id);
        self.relink_product(id, product.links(), ProductLinks { shelf: None, section: None, on: None });
        self.unstack_dependents(id);
        true
    }

    /// Remove a shelf and every product positioned on it. Returns the number
    /// of entities removed (products plus the shelf), `0` if unknown.
    pub fn delete_shelf(&mut self, id: EntityId) -> usize {
        if !self.shelves.contains_key(&id) {
            tracing::debug!(%id, "delete_shelf: unknown shelf dropped");
            return 0;
        }
        let mut removed = 0;
        for product_id in self.products_by_shelf.children(&id).to_vec() {
            if self.delete_product(product_id) {
                removed += 1;
            }
        }
        self.products_by_shelf.remove_parent(&id);

        if let Some(shelf) = self.shelves.remove(&id) {
            self.shelf_order.retain(|s| *s != id);
            if let Some(section_id) = shelf.section_id {
                self.shelves_by_section.unlink(section_id, id);
            }
            removed += 1;
        }
        tracing::debug!(%id, removed, "shelf deleted");
        removed
    }

    /// Remove a section. Its shelves survive as standalone shelves; products
    /// lose their section back-reference.
    pub fn delete_section(&mut self, id: EntityId) -> bool {
        if self.sections.remove(&id).is_none() {
            tracing::debug!(%id, "delete_section: unknown section dropped");
            return false;
        }
        self.section_order.retain(|s| *s != id);

        for shelf_id in self.shelves_by_section.remove_parent(&id) {
            if let Some(shelf) = self.shelves.get_mut(&shelf_id) {
                shelf.section_id = None;
                shelf.relative_x = shelf.x;
                shelf.relative_y = shelf.y;
            }
        }
        for product_id in self.products_by_section.remove_parent(&id) {
            if let Some(product) = self.products.get_mut(&product_id) {
                product.section_id = None;
                if product.mount.shelf_id().is_none() {
                    product.relative_x = product.x;
                    product.relative_y = product.y;
                }
            }
        }
        tracing::debug!(%id, "section deleted");
        true
    }

    // --- Queries ---

    /// Sections in traversal (insertion) order.
    pub fn sections(&self) -> impl DoubleEndedIterator<Item = &Section> {
        self.section_order.iter().filter_map(|id| self.sections.get(id))
    }

    /// Shelves in traversal (insertion) order.
    pub fn shelves(&self) -> impl DoubleEndedIterator<Item = &Shelf> {
        self.shelf_order.iter().filter_map(|id| self.shelves.get(id))
    }

    /// Products in traversal (insertion) order.
    pub fn products(&self) -> impl DoubleEndedIterator<Item = &Product> {
        self.product_order.iter().filter_map(|id| self.products.get(id))
    }

    #[must_use]
    pub fn section(&self, id: &EntityId) -> Option<&Section> {
        self.sections.get(id)
    }

    #[must_use]
    pub fn shelf(&self, id: &EntityId) -> Option<&Shelf> {
        self.shelves.get(id)
    }

    #[must_use]
    pub fn product(&self, id: &EntityId) -> Option<&Product> {
        self.products.get(id)
    }

    #[must_use]
    pub fn shelves_in_section(&self, section_id: &EntityId) -> Vec<&Shelf> {
        self.shelves_by_section
            .children(section_id)
            .iter()
            .filter_map(|id| self.shelves.get(id))
            .collect()
    }

    #[must_use]
    pub fn products_on_shelf(&self, shelf_id: &EntityId) -> Vec<&Product> {
        self.products_by_shelf
            .children(shelf_id)
            .iter()
            .filter_map(|id| self.products.get(id))
            .collect()
    }

    #[must_use]
    pub fn products_in_section(&self, section_id: &EntityId) -> Vec<&Product> {
        self.products_by_section
            .children(section_id)
            .iter()
            .filter_map(|id| self.products.get(id))
            .collect()
    }

    /// Products sitting directly on `product_id`.
    #[must_use]
    pub fn products_resting_on(&self, product_id: &EntityId) -> Vec<&Product> {
        self.stacked_on
            .children(product_id)
            .iter()
            .filter_map(|id| self.products.get(id))
            .collect()
    }

    /// Products with neither a shelf nor a section.
    #[must_use]
    pub fn standalone_products(&self) -> Vec<&Product> {
        self.products().filter(|p| p.is_standalone()).collect()
    }

    /// Shelves with no section.
    #[must_use]
    pub fn standalone_shelves(&self) -> Vec<&Shelf> {
        self.shelves().filter(|s| s.section_id.is_none()).collect()
    }

    /// Every product transitively stacked on `product_id`, nearest first.
    #[must_use]
    pub fn stack_dependents(&self, product_id: &EntityId) -> Vec<EntityId> {
        let mut out = Vec::new();
        let mut seen = HashSet::new();
        let mut queue: VecDeque<EntityId> = self.stacked_on.children(product_id).iter().copied().collect();
        while let Some(id) = queue.pop_front() {
            if id == *product_id || !seen.insert(id) {
                continue;
            }
            out.push(id);
            queue.extend(self.stacked_on.children(&id).iter().copied());
        }
        out
    }

    /// Whether resting `product_id` on `base` would make it (transitively)
    /// sit on itself.
    #[must_use]
    pub fn would_cycle(&self, product_id: EntityId, base: EntityId) -> bool {
        let mut cursor = Some(base);
        let mut steps = 0;
        while let Some(current) = cursor {
            if current == product_id {
                return true;
            }
            steps += 1;
            if steps > self.products.len() {
                // Chain longer than the scene: already looping.
                return true;
            }
            cursor = self.products.get(&current).and_then(|p| p.mount.resting_on());
        }
        false
    }

    /// Absolute origin of the frame `product`'s relative coordinates are in.
    /// The canvas frame has origin `(0, 0)`.
    #[must_use]
    pub fn container_origin(&self, product: &Product) -> Point {
        match self.frame_for(product.mount.shelf_id(), product.section_id) {
            Ok(Frame { origin: Some(origin), .. }) => origin,
            _ => Point::default(),
        }
    }

    #[must_use]
    pub fn section_count(&self) -> usize {
        self.sections.len()
    }

    #[must_use]
    pub fn shelf_count(&self) -> usize {
        self.shelves.len()
    }

    #[must_use]
    pub fn product_count(&self) -> usize {
        self.products.len()
    }

    /// Total entities of every kind.
    #[must_use]
    pub fn len(&self) -> usize {
        self.sections.len() + self.shelves.len() + self.products.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn contains_id(&self, id: &EntityId) -> bool {
        self.sections.contains_key(id) || self.shelves.contains_key(id) || self.products.contains_key(id)
    }

    // --- Internals ---

    fn insert_section(&mut self, section: Section) {
        self.section_order.push(section.id);
        self.sections.insert(section.id, section);
    }

    fn insert_shelf(&mut self, shelf: Shelf) {
        if let Some(section_id) = shelf.section_id {
            self.shelves_by_section.link(section_id, shelf.id);
        }
        self.shelf_order.push(shelf.id);
        self.shelves.insert(shelf.id, shelf);
    }

    fn insert_product(&mut self, product: Product) {
        let none = ProductLinks { shelf: None, section: None, on: None };
        self.relink_product(product.id, none, product.links());
        self.product_order.push(product.id);
        self.products.insert(product.id, product);
    }

    fn relink_product(&mut self, id: EntityId, before: ProductLinks, after: ProductLinks) {
        self.products_by_shelf.relink(id, before.shelf, after.shelf);
        self.products_by_section.relink(id, before.section, after.section);
        self.stacked_on.relink(id, before.on, after.on);
    }

    /// Products resting on `base` fall back to their container's plain mount
    /// and keep their coordinates.
    fn unstack_dependents(&mut self, base: EntityId) {
        for dependent in self.stacked_on.remove_parent(&base) {
            let Some(p) = self.products.get_mut(&dependent) else {
                continue;
            };
            if let ProductMount::Stack { shelf_id, .. } = p.mount {
                p.mount = shelf_id.map_or(ProductMount::Standalone, |shelf_id| ProductMount::Shelf { shelf_id });
                tracing::debug!(%dependent, %base, "stack base moved away, product unstacked");
            }
        }
    }

    fn ensure_fresh(&self, id: EntityId) -> Result<(), SceneError> {
        if self.contains_id(&id) {
            return Err(SceneError::DuplicateId(id));
        }
        Ok(())
    }

    fn frame_for(&self, shelf_id: Option<EntityId>, section_id: Option<EntityId>) -> Result<Frame, SceneError> {
        match (shelf_id, section_id) {
            (Some(shelf_id), requested) => {
                let shelf = self.shelves.get(&shelf_id).ok_or(SceneError::UnknownShelf(shelf_id))?;
                if requested.is_some() && requested != shelf.section_id {
                    tracing::debug!(%shelf_id, ?requested, actual = ?shelf.section_id, "section id follows shelf");
                }
                Ok(Frame { origin: Some(shelf.origin()), section_id: shelf.section_id })
            }
            (None, Some(section_id)) => {
                let section = self.sections.get(&section_id).ok_or(SceneError::UnknownSection(section_id))?;
                Ok(Frame { origin: Some(section.origin()), section_id: Some(section_id) })
            }
            (None, None) => Ok(Frame { origin: None, section_id: None }),
        }
    }

    /// Caller has checked that the shelf and section exist.
    fn place_shelf(&mut self, shelf_id: EntityId, origin: Point, section_id: Option<EntityId>) {
        let section_origin = section_id.and_then(|id| self.sections.get(&id)).map(Section::origin);
        let Some(shelf) = self.shelves.get_mut(&shelf_id) else {
            return;
        };
        let previous = shelf.section_id;
        let relative = section_origin.map_or(origin, |o| origin.relative_to(o));
        shelf.x = origin.x;
        shelf.y = origin.y;
        shelf.section_id = section_id;
        shelf.relative_x = relative.x;
        shelf.relative_y = relative.y;
        self.shelves_by_section.relink(shelf_id, previous, section_id);

        for product_id in self.products_by_shelf.children(&shelf_id).to_vec() {
            let Some(product) = self.products.get_mut(&product_id) else {
                continue;
            };
            product.x = origin.x + product.relative_x;
            product.y = origin.y + product.relative_y;
            let old_section = product.section_id;
            product.section_id = section_id;
            self.products_by_section.relink(product_id, old_section, section_id);
        }
    }
}

fn is_finite_pair(a: f64, b: f64) -> bool {
    a.is_finite() && b.is_finite()
}

fn validate_position(x: f64, y: f64) -> Result<(), SceneError> {
    if is_finite_pair(x, y) {
        Ok(())
    } else {
        Err(SceneError::InvalidPosition { x, y })
    }
}

fn validate_size(width: f64, height: f64) -> Result<(), SceneError> {
    if is_finite_pair(width, height) && width >= 0.0 && height >= 0.0 {
        Ok(())
    } else {
        Err(SceneError::InvalidSize { width, height })
    }
}
