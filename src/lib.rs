//! Spatial placement engine for a planogram editor.
//!
//! Users arrange retail fixtures on a 2D canvas: sections (display fixtures),
//! shelves inside them, and products on shelves, stacked on other products,
//! or loose on the canvas. This crate owns what happens when something is
//! dragged: collision feedback while it moves, and on release the choice of
//! new parent, the conversion into that parent's coordinate frame, and the
//! store update that keeps parent links and coordinates consistent. The
//! rendering host only forwards pointer/key events and draws the returned
//! [`engine::Action`]s.
//!
//! ## Module layout
//!
//! | Module | Role |
//! |--------|------|
//! | [`engine`] | [`engine::EditorCore`]: pointer/key events in, actions out |
//! | [`scene`] | Entity types and the authoritative [`scene::SceneStore`] |
//! | [`index`] | Parent → children lookup tables kept by the store |
//! | [`locator`] | Candidate collection and drop-target finding |
//! | [`collision`] | Drag-time overlap feedback and highlight state |
//! | [`placement`] | Drop decisions for products and shelves, and their commit |
//! | [`hit`] | Which entity is under the pointer |
//! | [`input`] | Modifier keys, buttons, selection, and the drag state machine |
//! | [`clipboard`] | Copy / cut / paste of products |
//! | [`geometry`] | Points, rectangles, and the containment/overlap tests |
//! | [`config`] | Tunable distances, read from the environment |
//! | [`consts`] | Default values behind the config |

pub mod clipboard;
pub mod collision;
pub mod config;
pub mod consts;
pub mod engine;
pub mod geometry;
pub mod hit;
pub mod index;
pub mod input;
pub mod locator;
pub mod placement;
pub mod scene;
