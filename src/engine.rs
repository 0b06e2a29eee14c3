use crate::clipboard::Clipboard;
use crate::collision::{CollisionReport, Highlight, HighlightMap, resolve_collisions};
use crate::config::PlacementConfig;
use crate::geometry::{Point, Rect};
use crate::hit::{Hit, HitKind, hit_test};
use crate::input::{Button, InputState, Key, Modifiers, UiState};
use crate::placement::{
    Placement, ShelfPlacement, apply_product_placement, apply_shelf_placement, resolve_product_placement,
    resolve_shelf_placement, revert_to,
};
use crate::scene::{ChildOffset, EntityId, Product, SceneError, SceneSnapshot, SceneStore};

#[cfg(test)]
#[path = "engine_test.rs"]
mod engine_test;

/// Actions returned from input handlers for the host to process.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    SelectionChanged(Vec<EntityId>),
    /// A product drag moved; draw it at this top-left. The store is unchanged.
    DragPreview { id: EntityId, x: f64, y: f64 },
    /// Result of the collision scan for the latest drag move.
    Collision(CollisionReport),
    /// A shelf drag moved the shelf (and its products) in the store.
    ShelfMoved { id: EntityId, x: f64, y: f64 },
    ProductPlaced { id: EntityId, placement: Placement },
    ShelfPlaced { id: EntityId, placement: ShelfPlacement },
    ProductCreated(Product),
    ProductDeleted { id: EntityId },
    /// `removed` counts the shelf and the products that went with it.
    ShelfDeleted { id: EntityId, removed: usize },
    RenderNeeded,
}

/// Editor state and gesture handling, independent of any rendering host.
#[derive(Debug, Default)]
pub struct EditorCore {
    pub store: SceneStore,
    pub config: PlacementConfig,
    pub ui: UiState,
    pub input: InputState,
    pub highlights: HighlightMap,
    pub clipboard: Clipboard,
}

impl EditorCore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_config(config: PlacementConfig) -> Self {
        Self { config, ..Self::default() }
    }

    // --- Data inputs ---

    /// Replace the scene. Selection, highlights, and any drag are reset.
    ///
    /// # Errors
    ///
    /// Whatever [`SceneStore::load_snapshot`] rejects; the editor is left
    /// untouched in that case.
    pub fn load_snapshot(&mut self, snapshot: SceneSnapshot) -> Result<(), SceneError> {
        self.store.load_snapshot(snapshot)?;
        self.ui.clear();
        self.input = InputState::Idle;
        self.highlights.clear();
        Ok(())
    }

    // --- Input events ---

    /// Select what is under the pointer and start dragging it. Sections and
    /// empty canvas clear the selection.
    pub fn on_pointer_down(&mut self, world_pt: Point, button: Button, modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let mut actions = Vec::new();
        match hit_test(&self.store, world_pt) {
            Some(Hit { id, kind: HitKind::Product }) => {
                let Some(origin) = self.store.product(&id).map(Product::origin) else {
                    return actions;
                };
                self.pick(id, modifiers, &mut actions);
                self.input = InputState::DraggingProduct { id, grab: world_pt.relative_to(origin) };
            }
            Some(Hit { id, kind: HitKind::Shelf }) => {
                let Some((origin, orig_section)) = self.store.shelf(&id).map(|s| (s.origin(), s.section_id)) else {
                    return actions;
                };
                self.pick(id, modifiers, &mut actions);
                self.input =
                    InputState::DraggingShelf { id, grab: world_pt.relative_to(origin), orig: origin, orig_section };
            }
            Some(Hit { kind: HitKind::Section, .. }) | None => {
                self.input = InputState::Idle;
                if !self.ui.selected.is_empty() {
                    self.ui.clear();
                    actions.push(Action::SelectionChanged(Vec::new()));
                }
            }
        }
        if !actions.is_empty() {
            actions.push(Action::RenderNeeded);
        }
        actions
    }

    /// Product drags: preview and collision feedback, store untouched.
    /// Shelf drags: move the shelf and its products in the store.
    pub fn on_pointer_move(&mut self, world_pt: Point, _modifiers: Modifiers) -> Vec<Action> {
        let Some(at) = self.input.drag_origin(world_pt) else {
            return Vec::new();
        };
        match self.input {
            InputState::Idle => Vec::new(),
            InputState::DraggingProduct { id, .. } => {
                let Some(dragged) = self.store.product(&id) else {
                    self.input = InputState::Idle;
                    return Vec::new();
                };
                let rect = Rect::at(at, dragged.width, dragged.height);
                let products: Vec<&Product> = self.store.products().collect();
                let report = resolve_collisions(rect, &products, id, self.config.collision, &mut self.highlights);
                vec![Action::DragPreview { id, x: at.x, y: at.y }, Action::Collision(report), Action::RenderNeeded]
            }
            InputState::DraggingShelf { id, .. } => {
                let riders: Vec<ChildOffset> = self
                    .store
                    .products_on_shelf(&id)
                    .iter()
                    .map(|p| ChildOffset { product_id: p.id, relative_x: p.relative_x, relative_y: p.relative_y })
                    .collect();
                if !self.store.update_shelf_position(id, at.x, at.y, &riders) {
                    self.input = InputState::Idle;
                    return Vec::new();
                }
                vec![Action::ShelfMoved { id, x: at.x, y: at.y }, Action::RenderNeeded]
            }
        }
    }

    /// Resolve and commit the drop. Runs placement exactly once per gesture.
    pub fn on_pointer_up(&mut self, world_pt: Point, button: Button, _modifiers: Modifiers) -> Vec<Action> {
        if button != Button::Primary {
            return Vec::new();
        }
        let Some(drop) = self.input.drag_origin(world_pt) else {
            return Vec::new();
        };
        match std::mem::take(&mut self.input) {
            InputState::Idle => Vec::new(),
            InputState::DraggingProduct { id, .. } => {
                self.highlights.clear();
                let Some(dragged) = self.store.product(&id) else {
                    return vec![Action::RenderNeeded];
                };
                let placement = resolve_product_placement(&self.store, dragged, drop, &self.config);
                if !apply_product_placement(&mut self.store, id, &placement) {
                    tracing::warn!(product_id = %id, "placement rejected by store; product left in place");
                    return vec![Action::RenderNeeded];
                }
                tracing::info!(
                    product_id = %id,
                    found_shelf = placement.found_shelf,
                    found_product = placement.found_product,
                    x = placement.x,
                    y = placement.y,
                    "product placed"
                );
                vec![Action::ProductPlaced { id, placement }, Action::RenderNeeded]
            }
            InputState::DraggingShelf { id, .. } => {
                let Some(shelf) = self.store.shelf(&id) else {
                    return vec![Action::RenderNeeded];
                };
                let placement = resolve_shelf_placement(&self.store, shelf, drop);
                if !apply_shelf_placement(&mut self.store, id, &placement) {
                    tracing::warn!(shelf_id = %id, "shelf placement rejected by store");
                    return vec![Action::RenderNeeded];
                }
                tracing::info!(shelf_id = %id, section_id = ?placement.section_id, y = placement.y, "shelf placed");
                vec![Action::ShelfPlaced { id, placement }, Action::RenderNeeded]
            }
        }
    }

    /// `Escape` cancels a drag (or clears the selection), `Delete` /
    /// `Backspace` delete the selection, command + `c` / `x` / `v` use the
    /// clipboard.
    pub fn on_key_down(&mut self, key: &Key, modifiers: Modifiers) -> Vec<Action> {
        if key.is("Escape") {
            return self.cancel();
        }
        if key.is("Delete") || key.is("Backspace") {
            return self.delete_selection();
        }
        if modifiers.command() {
            if key.is("c") {
                self.copy_selection();
                return Vec::new();
            }
            if key.is("x") {
                return self.cut_selection();
            }
            if key.is("v") {
                return self.paste();
            }
        }
        Vec::new()
    }

    // --- Queries ---

    #[must_use]
    pub fn selection(&self) -> &[EntityId] {
        &self.ui.selected
    }

    #[must_use]
    pub fn highlight(&self, id: &EntityId) -> Highlight {
        self.highlights.get(id)
    }

    #[must_use]
    pub fn is_dragging(&self) -> bool {
        self.input.dragged_id().is_some()
    }

    // --- Internals ---

    fn pick(&mut self, id: EntityId, modifiers: Modifiers, actions: &mut Vec<Action>) {
        if modifiers.shift || modifiers.command() {
            self.ui.toggle(id);
        } else {
            self.ui.select_one(id);
        }
        actions.push(Action::SelectionChanged(self.ui.selected.clone()));
    }

    fn cancel(&mut self) -> Vec<Action> {
        match std::mem::take(&mut self.input) {
            InputState::Idle => {
                if self.ui.selected.is_empty() {
                    return Vec::new();
                }
                self.ui.clear();
                vec![Action::SelectionChanged(Vec::new()), Action::RenderNeeded]
            }
            InputState::DraggingProduct { id, .. } => {
                self.highlights.clear();
                let Some(product) = self.store.product(&id) else {
                    return vec![Action::RenderNeeded];
                };
                tracing::debug!(product_id = %id, "product drag cancelled");
                vec![Action::ProductPlaced { id, placement: revert_to(product) }, Action::RenderNeeded]
            }
            InputState::DraggingShelf { id, orig, orig_section, .. } => {
                if !self.store.move_shelf(id, orig.x, orig.y, orig_section) {
                    tracing::warn!(shelf_id = %id, "shelf could not be restored to its drag origin");
                }
                let Some(shelf) = self.store.shelf(&id) else {
                    return vec![Action::RenderNeeded];
                };
                tracing::debug!(shelf_id = %id, "shelf drag cancelled");
                let placement = ShelfPlacement {
                    x: shelf.x,
                    y: shelf.y,
                    relative_x: shelf.relative_x,
                    relative_y: shelf.relative_y,
                    section_id: shelf.section_id,
                };
                vec![Action::ShelfPlaced { id, placement }, Action::RenderNeeded]
            }
        }
    }

    fn delete_selection(&mut self) -> Vec<Action> {
        if self.is_dragging() || self.ui.selected.is_empty() {
            return Vec::new();
        }
        let mut actions = Vec::new();
        for id in std::mem::take(&mut self.ui.selected) {
            if self.store.delete_product(id) {
                self.highlights.remove(&id);
                actions.push(Action::ProductDeleted { id });
                continue;
            }
            let removed = self.store.delete_shelf(id);
            if removed > 0 {
                actions.push(Action::ShelfDeleted { id, removed });
            }
        }
        tracing::info!(deleted = actions.len(), "selection deleted");
        actions.push(Action::SelectionChanged(Vec::new()));
        actions.push(Action::RenderNeeded);
        actions
    }

    /// First selected product, if any.
    fn selected_product(&self) -> Option<&Product> {
        self.ui.selected.iter().find_map(|id| self.store.product(id))
    }

    fn copy_selection(&mut self) {
        if let Some(product) = self.selected_product() {
            let product = product.clone();
            self.clipboard.copy(&product);
        }
    }

    fn cut_selection(&mut self) -> Vec<Action> {
        if self.is_dragging() {
            return Vec::new();
        }
        let Some(id) = self.selected_product().map(|p| p.id) else {
            return Vec::new();
        };
        if !self.clipboard.cut(&mut self.store, id) {
            return Vec::new();
        }
        self.ui.deselect(&id);
        self.highlights.remove(&id);
        vec![
            Action::ProductDeleted { id },
            Action::SelectionChanged(self.ui.selected.clone()),
            Action::RenderNeeded,
        ]
    }

    fn paste(&mut self) -> Vec<Action> {
        let Some(req) = self.clipboard.paste(self.config.paste_offset) else {
            return Vec::new();
        };
        let id = match self.store.add_product(req) {
            Ok(id) => id,
            Err(e) => {
                tracing::warn!(error = %e, "paste rejected");
                return Vec::new();
            }
        };
        let Some(product) = self.store.product(&id).cloned() else {
            return Vec::new();
        };
        self.ui.select_one(id);
        tracing::info!(product_id = %id, "product pasted");
        vec![
            Action::ProductCreated(product),
            Action::SelectionChanged(vec![id]),
            Action::RenderNeeded,
        ]
    }
}
