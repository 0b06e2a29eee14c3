#![allow(clippy::float_cmp)]

use uuid::Uuid;

use super::*;

// =============================================================
// Helpers
// =============================================================

fn section_at(store: &mut SceneStore, x: f64, y: f64, w: f64, h: f64) -> EntityId {
    store
        .add_section(NewSection { x, y, width: w, height: h, name: None })
        .unwrap()
}

fn shelf_at(store: &mut SceneStore, x: f64, y: f64, section_id: Option<EntityId>) -> EntityId {
    store
        .add_shelf(NewShelf { x, y, width: 380.0, height: 10.0, section_id })
        .unwrap()
}

fn product_at(store: &mut SceneStore, x: f64, y: f64) -> EntityId {
    store
        .add_product(NewProduct { x, y, width: 50.0, height: 50.0, ..Default::default() })
        .unwrap()
}

fn product_on(store: &mut SceneStore, shelf_id: EntityId, rel_x: f64, rel_y: f64) -> EntityId {
    store
        .add_product(NewProduct {
            width: 50.0,
            height: 50.0,
            shelf_id: Some(shelf_id),
            relative_x: Some(rel_x),
            relative_y: Some(rel_y),
            ..Default::default()
        })
        .unwrap()
}

/// Section at (450,150) 400x600 with a shelf at (500,550) 380x10.
fn fixture() -> (SceneStore, EntityId, EntityId) {
    let mut store = SceneStore::new();
    let section = section_at(&mut store, 450.0, 150.0, 400.0, 600.0);
    let shelf = shelf_at(&mut store, 500.0, 550.0, Some(section));
    (store, section, shelf)
}

fn assert_product_consistent(store: &SceneStore, id: EntityId) {
    let product = store.product(&id).unwrap();
    let origin = store.container_origin(product);
    assert_eq!(product.x, origin.x + product.relative_x, "x invariant for {id}");
    assert_eq!(product.y, origin.y + product.relative_y, "y invariant for {id}");
}

// =============================================================
// Construction
// =============================================================

#[test]
fn add_section_assigns_fresh_ids() {
    let mut store = SceneStore::new();
    let a = section_at(&mut store, 0.0, 0.0, 10.0, 10.0);
    let b = section_at(&mut store, 0.0, 0.0, 10.0, 10.0);
    assert_ne!(a, b);
    assert_eq!(store.section_count(), 2);
    assert_eq!(store.section(&a).unwrap().name, "New Section");
}

#[test]
fn add_section_rejects_negative_size() {
    let mut store = SceneStore::new();
    let err = store
        .add_section(NewSection { x: 0.0, y: 0.0, width: -1.0, height: 10.0, name: None })
        .unwrap_err();
    assert!(matches!(err, SceneError::InvalidSize { .. }));
    assert!(store.is_empty());
}

#[test]
fn add_shelf_rejects_nan_position() {
    let mut store = SceneStore::new();
    let err = store
        .add_shelf(NewShelf { x: f64::NAN, y: 0.0, width: 10.0, height: 10.0, section_id: None })
        .unwrap_err();
    assert!(matches!(err, SceneError::InvalidPosition { .. }));
}

#[test]
fn add_shelf_in_section_derives_relative() {
    let (store, section, shelf) = fixture();
    let shelf = store.shelf(&shelf).unwrap();
    assert_eq!(shelf.section_id, Some(section));
    assert_eq!(shelf.relative(), Point::new(50.0, 400.0));
    assert_eq!(store.shelves_in_section(&section).len(), 1);
}

#[test]
fn add_shelf_unknown_section_rejected() {
    let mut store = SceneStore::new();
    let missing = Uuid::new_v4();
    let err = store
        .add_shelf(NewShelf { x: 0.0, y: 0.0, width: 10.0, height: 10.0, section_id: Some(missing) })
        .unwrap_err();
    assert_eq!(err, SceneError::UnknownSection(missing));
}

#[test]
fn add_standalone_product_relative_equals_absolute() {
    let mut store = SceneStore::new();
    let id = product_at(&mut store, 120.0, 80.0);
    let p = store.product(&id).unwrap();
    assert_eq!(p.relative(), Point::new(120.0, 80.0));
    assert_eq!(p.mount, ProductMount::Standalone);
    assert!(p.is_standalone());
    assert_eq!(p.kind, "Food");
    assert_eq!(p.color, "#81C784");
}

#[test]
fn add_product_on_shelf_uses_relative_and_inherits_section() {
    let (mut store, section, shelf) = fixture();
    let id = product_on(&mut store, shelf, 10.0, -53.0);
    let p = store.product(&id).unwrap();
    assert_eq!(p.mount, ProductMount::Shelf { shelf_id: shelf });
    assert_eq!(p.section_id, Some(section));
    assert_eq!(p.origin(), Point::new(510.0, 497.0));
    assert_product_consistent(&store, id);
    assert_eq!(store.products_on_shelf(&shelf).len(), 1);
    assert_eq!(store.products_in_section(&section).len(), 1);
}

#[test]
fn add_product_on_shelf_derives_relative_from_absolute() {
    let (mut store, _, shelf) = fixture();
    let id = store
        .add_product(NewProduct {
            x: 600.0,
            y: 497.0,
            width: 50.0,
            height: 50.0,
            shelf_id: Some(shelf),
            ..Default::default()
        })
        .unwrap();
    assert_eq!(store.product(&id).unwrap().relative(), Point::new(100.0, -53.0));
}

#[test]
fn add_product_unknown_shelf_rejected() {
    let mut store = SceneStore::new();
    let missing = Uuid::new_v4();
    let err = store
        .add_product(NewProduct { width: 1.0, height: 1.0, shelf_id: Some(missing), ..Default::default() })
        .unwrap_err();
    assert_eq!(err, SceneError::UnknownShelf(missing));
    assert_eq!(store.product_count(), 0);
}

#[test]
fn zero_size_is_allowed_at_construction() {
    let mut store = SceneStore::new();
    assert!(
        store
            .add_shelf(NewShelf { x: 0.0, y: 0.0, width: 0.0, height: 0.0, section_id: None })
            .is_ok()
    );
}

// =============================================================
// Traversal order and queries
// =============================================================

#[test]
fn iteration_follows_insertion_order() {
    let mut store = SceneStore::new();
    let ids: Vec<EntityId> = (0..5).map(|i| product_at(&mut store, f64::from(i) * 10.0, 0.0)).collect();
    let seen: Vec<EntityId> = store.products().map(|p| p.id).collect();
    assert_eq!(seen, ids);
}

#[test]
fn standalone_queries() {
    let (mut store, _, shelf) = fixture();
    let loose_shelf = shelf_at(&mut store, 0.0, 0.0, None);
    let loose = product_at(&mut store, 5.0, 5.0);
    product_on(&mut store, shelf, 0.0, -53.0);

    let standalone_products: Vec<EntityId> = store.standalone_products().iter().map(|p| p.id).collect();
    assert_eq!(standalone_products, vec![loose]);
    let standalone_shelves: Vec<EntityId> = store.standalone_shelves().iter().map(|s| s.id).collect();
    assert_eq!(standalone_shelves, vec![loose_shelf]);
}

#[test]
fn lookup_of_unknown_ids_is_none() {
    let store = SceneStore::new();
    let id = Uuid::new_v4();
    assert!(store.section(&id).is_none());
    assert!(store.shelf(&id).is_none());
    assert!(store.product(&id).is_none());
    assert!(store.shelves_in_section(&id).is_empty());
    assert!(store.products_on_shelf(&id).is_empty());
    assert!(!store.contains_id(&id));
}

// =============================================================
// update_shelf_position
// =============================================================

#[test]
fn update_shelf_position_moves_children() {
    let (mut store, _, shelf) = fixture();
    let a = product_on(&mut store, shelf, 0.0, -53.0);
    let b = product_on(&mut store, shelf, 60.0, -53.0);

    let offsets = [ChildOffset { product_id: a, relative_x: 5.0, relative_y: -53.0 }];
    assert!(store.update_shelf_position(shelf, 520.0, 600.0, &offsets));

    let s = store.shelf(&shelf).unwrap();
    assert_eq!(s.origin(), Point::new(520.0, 600.0));
    assert_eq!(s.relative(), Point::new(70.0, 450.0));

    let pa = store.product(&a).unwrap();
    assert_eq!(pa.relative(), Point::new(5.0, -53.0));
    assert_eq!(pa.origin(), Point::new(525.0, 547.0));
    let pb = store.product(&b).unwrap();
    assert_eq!(pb.origin(), Point::new(580.0, 547.0));
    assert_product_consistent(&store, a);
    assert_product_consistent(&store, b);
}

#[test]
fn update_shelf_position_skips_foreign_children() {
    let (mut store, _, shelf) = fixture();
    let loose = product_at(&mut store, 1.0, 2.0);
    let offsets = [ChildOffset { product_id: loose, relative_x: 99.0, relative_y: 99.0 }];
    assert!(store.update_shelf_position(shelf, 500.0, 560.0, &offsets));
    assert_eq!(store.product(&loose).unwrap().relative(), Point::new(1.0, 2.0));
}

#[test]
fn update_shelf_position_unknown_shelf_is_noop() {
    let (mut store, _, _) = fixture();
    let before = store.snapshot();
    assert!(!store.update_shelf_position(Uuid::new_v4(), 1.0, 1.0, &[]));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn update_shelf_position_rejects_non_finite() {
    let (mut store, _, shelf) = fixture();
    assert!(!store.update_shelf_position(shelf, f64::INFINITY, 0.0, &[]));
    assert_eq!(store.shelf(&shelf).unwrap().x, 500.0);
}

// =============================================================
// finalize_shelf_position / move_shelf
// =============================================================

#[test]
fn finalize_inside_section_sets_relative() {
    let (mut store, section, shelf) = fixture();
    assert!(store.finalize_shelf_position(shelf, 460.0, 300.0));
    let s = store.shelf(&shelf).unwrap();
    assert_eq!(s.section_id, Some(section));
    assert_eq!(s.relative(), Point::new(10.0, 150.0));
}

#[test]
fn finalize_outside_sections_clears_section() {
    let (mut store, section, shelf) = fixture();
    let product = product_on(&mut store, shelf, 0.0, -53.0);
    assert!(store.finalize_shelf_position(shelf, 5.0, 5.0));

    let s = store.shelf(&shelf).unwrap();
    assert_eq!(s.section_id, None);
    assert_eq!(s.relative(), Point::new(5.0, 5.0));
    assert!(store.shelves_in_section(&section).is_empty());
    assert_eq!(store.standalone_shelves().len(), 1);

    let p = store.product(&product).unwrap();
    assert_eq!(p.section_id, None);
    assert_eq!(p.origin(), Point::new(5.0, -48.0));
    assert!(store.products_in_section(&section).is_empty());
}

#[test]
fn finalize_picks_first_matching_section() {
    let mut store = SceneStore::new();
    let first = section_at(&mut store, 0.0, 0.0, 100.0, 100.0);
    section_at(&mut store, 50.0, 50.0, 100.0, 100.0);
    let shelf = shelf_at(&mut store, 500.0, 500.0, None);
    assert!(store.finalize_shelf_position(shelf, 60.0, 60.0));
    assert_eq!(store.shelf(&shelf).unwrap().section_id, Some(first));
}

#[test]
fn finalize_moves_between_sections() {
    let (mut store, first, shelf) = fixture();
    let second = section_at(&mut store, 1000.0, 0.0, 200.0, 200.0);
    let product = product_on(&mut store, shelf, 0.0, -53.0);
    assert!(store.finalize_shelf_position(shelf, 1010.0, 100.0));
    assert!(store.shelves_in_section(&first).is_empty());
    assert_eq!(store.shelves_in_section(&second).len(), 1);
    assert_eq!(store.product(&product).unwrap().section_id, Some(second));
    assert_product_consistent(&store, product);
}

#[test]
fn finalize_unknown_shelf_is_noop() {
    let (mut store, _, _) = fixture();
    assert!(!store.finalize_shelf_position(Uuid::new_v4(), 460.0, 300.0));
}

#[test]
fn move_shelf_unknown_section_is_noop() {
    let (mut store, section, shelf) = fixture();
    assert!(!store.move_shelf(shelf, 0.0, 0.0, Some(Uuid::new_v4())));
    assert_eq!(store.shelf(&shelf).unwrap().section_id, Some(section));
    assert_eq!(store.shelf(&shelf).unwrap().x, 500.0);
}

// =============================================================
// update_product_position
// =============================================================

#[test]
fn update_product_onto_shelf_sets_links_atomically() {
    let (mut store, section, shelf) = fixture();
    let id = product_at(&mut store, 5.0, 5.0);
    let applied = store.update_product_position(
        id,
        ProductPositionUpdate {
            x: 600.0,
            y: 560.0,
            relative_x: Some(100.0),
            relative_y: Some(-53.0),
            shelf_id: Some(shelf),
            section_id: Some(section),
            resting_on: None,
        },
    );
    assert!(applied);
    let p = store.product(&id).unwrap();
    assert_eq!(p.mount, ProductMount::Shelf { shelf_id: shelf });
    assert_eq!(p.section_id, Some(section));
    assert_eq!(p.origin(), Point::new(600.0, 497.0));
    assert!(!p.is_standalone());
    assert_eq!(store.products_on_shelf(&shelf).len(), 1);
}

#[test]
fn update_product_section_follows_shelf() {
    let (mut store, section, shelf) = fixture();
    let id = product_at(&mut store, 5.0, 5.0);
    let other = section_at(&mut store, 2000.0, 0.0, 10.0, 10.0);
    assert!(store.update_product_position(
        id,
        ProductPositionUpdate {
            x: 600.0,
            y: 497.0,
            shelf_id: Some(shelf),
            section_id: Some(other),
            ..Default::default()
        },
    ));
    assert_eq!(store.product(&id).unwrap().section_id, Some(section));
    assert!(store.products_in_section(&other).is_empty());
}

#[test]
fn update_product_to_canvas_makes_standalone() {
    let (mut store, section, shelf) = fixture();
    let id = product_on(&mut store, shelf, 0.0, -53.0);
    assert!(store.update_product_position(
        id,
        ProductPositionUpdate { x: 20.0, y: 30.0, relative_x: Some(999.0), ..Default::default() },
    ));
    let p = store.product(&id).unwrap();
    assert!(p.is_standalone());
    assert_eq!(p.relative(), Point::new(20.0, 30.0));
    assert!(store.products_on_shelf(&shelf).is_empty());
    assert!(store.products_in_section(&section).is_empty());
}

#[test]
fn update_product_in_section_frame() {
    let (mut store, section, _) = fixture();
    let id = product_at(&mut store, 5.0, 5.0);
    assert!(store.update_product_position(
        id,
        ProductPositionUpdate { x: 460.0, y: 170.0, section_id: Some(section), ..Default::default() },
    ));
    let p = store.product(&id).unwrap();
    assert_eq!(p.relative(), Point::new(10.0, 20.0));
    assert_eq!(p.mount, ProductMount::Standalone);
    assert!(!p.is_standalone());
    assert_product_consistent(&store, id);
}

#[test]
fn update_product_unknown_ids_are_noops() {
    let (mut store, _, _) = fixture();
    let id = product_at(&mut store, 5.0, 5.0);
    let before = store.snapshot();

    assert!(!store.update_product_position(Uuid::new_v4(), ProductPositionUpdate::default()));
    assert!(!store.update_product_position(
        id,
        ProductPositionUpdate { shelf_id: Some(Uuid::new_v4()), ..Default::default() },
    ));
    assert!(!store.update_product_position(
        id,
        ProductPositionUpdate { section_id: Some(Uuid::new_v4()), ..Default::default() },
    ));
    assert!(!store.update_product_position(
        id,
        ProductPositionUpdate { resting_on: Some(Uuid::new_v4()), ..Default::default() },
    ));
    assert!(!store.update_product_position(id, ProductPositionUpdate { x: f64::NAN, ..Default::default() }));
    assert_eq!(store.snapshot(), before);
}

// =============================================================
// Stacking
// =============================================================

fn stack(store: &mut SceneStore, id: EntityId, on: EntityId, shelf: EntityId) -> bool {
    let base = store.product(&on).unwrap().clone();
    store.update_product_position(
        id,
        ProductPositionUpdate {
            x: 0.0,
            y: 0.0,
            relative_x: Some(base.relative_x),
            relative_y: Some(base.relative_y - 51.0),
            shelf_id: Some(shelf),
            section_id: None,
            resting_on: Some(on),
        },
    )
}

#[test]
fn stacking_records_base_and_dependents() {
    let (mut store, _, shelf) = fixture();
    let base = product_on(&mut store, shelf, 0.0, -53.0);
    let middle = product_on(&mut store, shelf, 100.0, -53.0);
    let top = product_on(&mut store, shelf, 200.0, -53.0);
    assert!(stack(&mut store, middle, base, shelf));
    assert!(stack(&mut store, top, middle, shelf));

    assert_eq!(store.product(&middle).unwrap().mount, ProductMount::Stack { on: base, shelf_id: Some(shelf) });
    assert_eq!(store.products_resting_on(&base).len(), 1);
    assert_eq!(store.stack_dependents(&base), vec![middle, top]);
    assert_eq!(store.product(&top).unwrap().origin(), Point::new(500.0, 550.0 - 53.0 - 51.0 - 51.0));
}

#[test]
fn stacking_refuses_cycles() {
    let (mut store, _, shelf) = fixture();
    let a = product_on(&mut store, shelf, 0.0, -53.0);
    let b = product_on(&mut store, shelf, 100.0, -53.0);
    assert!(stack(&mut store, b, a, shelf));
    assert!(store.would_cycle(a, b));
    assert!(!stack(&mut store, a, b, shelf));
    assert!(!stack(&mut store, a, a, shelf));
    assert_eq!(store.product(&a).unwrap().mount, ProductMount::Shelf { shelf_id: shelf });
}

#[test]
fn deleting_base_drops_stacked_to_container_mount() {
    let (mut store, _, shelf) = fixture();
    let base = product_on(&mut store, shelf, 0.0, -53.0);
    let top = product_on(&mut store, shelf, 100.0, -53.0);
    assert!(stack(&mut store, top, base, shelf));
    let before = store.product(&top).unwrap().origin();

    assert!(store.delete_product(base));
    let p = store.product(&top).unwrap();
    assert_eq!(p.mount, ProductMount::Shelf { shelf_id: shelf });
    assert_eq!(p.origin(), before);
    assert!(store.stack_dependents(&base).is_empty());
}

#[test]
fn moving_base_unstacks_dependents_in_place() {
    let (mut store, _, shelf) = fixture();
    let base = product_at(&mut store, 100.0, 100.0);
    let top = product_at(&mut store, 100.0, 49.0);
    assert!(store.update_product_position(
        top,
        ProductPositionUpdate { x: 100.0, y: 49.0, resting_on: Some(base), ..Default::default() },
    ));
    assert_eq!(store.product(&top).unwrap().mount, ProductMount::Stack { on: base, shelf_id: None });

    assert!(store.update_product_position(
        base,
        ProductPositionUpdate {
            x: 0.0,
            y: 0.0,
            relative_x: Some(100.0),
            relative_y: Some(-53.0),
            shelf_id: Some(shelf),
            ..Default::default()
        },
    ));
    let p = store.product(&top).unwrap();
    assert_eq!(p.mount, ProductMount::Standalone);
    assert_eq!(p.origin(), Point::new(100.0, 49.0));
    assert!(store.products_resting_on(&base).is_empty());
    assert!(!store.would_cycle(base, top));
}

#[test]
fn rewriting_base_in_place_keeps_stack() {
    let (mut store, _, shelf) = fixture();
    let base = product_on(&mut store, shelf, 0.0, -53.0);
    let top = product_on(&mut store, shelf, 100.0, -53.0);
    assert!(stack(&mut store, top, base, shelf));

    let b = store.product(&base).unwrap().clone();
    assert!(store.update_product_position(
        base,
        ProductPositionUpdate {
            x: b.x,
            y: b.y,
            relative_x: Some(b.relative_x),
            relative_y: Some(b.relative_y),
            shelf_id: Some(shelf),
            ..Default::default()
        },
    ));
    assert_eq!(store.product(&top).unwrap().mount, ProductMount::Stack { on: base, shelf_id: Some(shelf) });
}

// =============================================================
// Deletion
// =============================================================

#[test]
fn delete_product_removes_from_indexes() {
    let (mut store, section, shelf) = fixture();
    let id = product_on(&mut store, shelf, 0.0, -53.0);
    assert!(store.delete_product(id));
    assert!(store.product(&id).is_none());
    assert!(store.products_on_shelf(&shelf).is_empty());
    assert!(store.products_in_section(&section).is_empty());
    assert_eq!(store.products().count(), 0);
}

#[test]
fn delete_product_unknown_is_noop() {
    let mut store = SceneStore::new();
    assert!(!store.delete_product(Uuid::new_v4()));
}

#[test]
fn delete_shelf_cascades_to_its_products_only() {
    let (mut store, section, shelf) = fixture();
    for i in 0..3 {
        product_on(&mut store, shelf, f64::from(i) * 60.0, -53.0);
    }
    let loose = product_at(&mut store, 5.0, 5.0);
    let before = store.len();

    assert_eq!(store.delete_shelf(shelf), 4);
    assert_eq!(store.len(), before - 4);
    assert_eq!(store.product_count(), 1);
    assert!(store.product(&loose).is_some());
    assert!(store.shelf(&shelf).is_none());
    assert!(store.shelves_in_section(&section).is_empty());
}

#[test]
fn delete_shelf_unknown_is_noop() {
    let (mut store, _, _) = fixture();
    assert_eq!(store.delete_shelf(Uuid::new_v4()), 0);
    assert_eq!(store.shelf_count(), 1);
}

#[test]
fn delete_section_detaches_shelves() {
    let (mut store, section, shelf) = fixture();
    let product = product_on(&mut store, shelf, 0.0, -53.0);
    assert!(store.delete_section(section));

    let s = store.shelf(&shelf).unwrap();
    assert_eq!(s.section_id, None);
    assert_eq!(s.relative(), s.origin());
    let p = store.product(&product).unwrap();
    assert_eq!(p.section_id, None);
    assert_eq!(p.relative(), Point::new(0.0, -53.0));
    assert_product_consistent(&store, product);
    assert!(!store.delete_section(section));
}

// =============================================================
// Snapshots
// =============================================================

#[test]
fn snapshot_roundtrip_preserves_order_and_links() {
    let (mut store, _, shelf) = fixture();
    let a = product_on(&mut store, shelf, 0.0, -53.0);
    let b = product_at(&mut store, 1.0, 1.0);
    let snapshot = store.snapshot();

    let mut loaded = SceneStore::new();
    loaded.load_snapshot(snapshot.clone()).unwrap();
    assert_eq!(loaded.snapshot(), snapshot);
    let order: Vec<EntityId> = loaded.products().map(|p| p.id).collect();
    assert_eq!(order, vec![a, b]);
    assert_eq!(loaded.products_on_shelf(&shelf).len(), 1);
}

#[test]
fn snapshot_normalizes_coordinates() {
    let section = Section { id: Uuid::new_v4(), x: 100.0, y: 100.0, width: 400.0, height: 400.0, name: "S".into() };
    let shelf = Shelf {
        id: Uuid::new_v4(),
        x: 110.0,
        y: 300.0,
        width: 300.0,
        height: 10.0,
        section_id: Some(section.id),
        relative_x: 0.0,
        relative_y: 0.0,
    };
    let product = Product {
        id: Uuid::new_v4(),
        x: 0.0,
        y: 0.0,
        width: 50.0,
        height: 50.0,
        relative_x: 20.0,
        relative_y: -53.0,
        mount: ProductMount::Shelf { shelf_id: shelf.id },
        section_id: None,
        kind: "Drink".into(),
        code: "cola01".into(),
        color: "yellow".into(),
        image: None,
    };
    let (shelf_id, product_id, section_id) = (shelf.id, product.id, section.id);
    let mut store = SceneStore::new();
    store
        .load_snapshot(SceneSnapshot { sections: vec![section], shelves: vec![shelf], products: vec![product] })
        .unwrap();

    assert_eq!(store.shelf(&shelf_id).unwrap().relative(), Point::new(10.0, 200.0));
    let p = store.product(&product_id).unwrap();
    assert_eq!(p.origin(), Point::new(130.0, 247.0));
    assert_eq!(p.section_id, Some(section_id));
}

#[test]
fn snapshot_with_bad_reference_leaves_store_untouched() {
    let (mut store, _, _) = fixture();
    let before = store.snapshot();
    let orphan = Shelf {
        id: Uuid::new_v4(),
        x: 0.0,
        y: 0.0,
        width: 10.0,
        height: 10.0,
        section_id: Some(Uuid::new_v4()),
        relative_x: 0.0,
        relative_y: 0.0,
    };
    let result = store.load_snapshot(SceneSnapshot { shelves: vec![orphan], ..Default::default() });
    assert!(matches!(result, Err(SceneError::UnknownSection(_))));
    assert_eq!(store.snapshot(), before);
}

#[test]
fn snapshot_rejects_duplicate_ids() {
    let id = Uuid::new_v4();
    let section = Section { id, x: 0.0, y: 0.0, width: 1.0, height: 1.0, name: String::new() };
    let shelf = Shelf { id, x: 0.0, y: 0.0, width: 1.0, height: 1.0, section_id: None, relative_x: 0.0, relative_y: 0.0 };
    let mut store = SceneStore::new();
    let result = store.load_snapshot(SceneSnapshot { sections: vec![section], shelves: vec![shelf], products: vec![] });
    assert_eq!(result, Err(SceneError::DuplicateId(id)));
}

#[test]
fn snapshot_rejects_stack_cycles() {
    let (a, b) = (Uuid::new_v4(), Uuid::new_v4());
    let make = |id: EntityId, on: EntityId| Product {
        id,
        x: 0.0,
        y: 0.0,
        width: 10.0,
        height: 10.0,
        relative_x: 0.0,
        relative_y: 0.0,
        mount: ProductMount::Stack { on, shelf_id: None },
        section_id: None,
        kind: String::new(),
        code: String::new(),
        color: String::new(),
        image: None,
    };
    let mut store = SceneStore::new();
    let result = store.load_snapshot(SceneSnapshot { products: vec![make(a, b), make(b, a)], ..Default::default() });
    assert!(matches!(result, Err(SceneError::StackCycle { .. })));
    assert!(store.is_empty());
}

#[test]
fn snapshot_deserializes_from_json() {
    let section_id = Uuid::new_v4();
    let json = serde_json::json!({
        "sections": [{ "id": section_id, "x": 450.0, "y": 150.0, "width": 400.0, "height": 600.0 }],
        "shelves": [],
        "products": [{
            "id": Uuid::new_v4(), "x": 1.0, "y": 2.0, "width": 3.0, "height": 4.0,
            "relative_x": 1.0, "relative_y": 2.0,
            "mount": { "kind": "standalone" }
        }]
    });
    let snapshot: SceneSnapshot = serde_json::from_value(json).unwrap();
    let mut store = SceneStore::new();
    store.load_snapshot(snapshot).unwrap();
    assert_eq!(store.section_count(), 1);
    assert_eq!(store.standalone_products().len(), 1);
}
