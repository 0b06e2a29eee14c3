//! Shared numeric constants for the placement engine.
//!
//! These are the defaults behind [`crate::config::PlacementConfig`]; every one
//! can be overridden at runtime.

// ── Collision ───────────────────────────────────────────────────

/// Shrink margin applied to the horizontal and downward overlap tests.
pub const COLLISION_MARGIN: f64 = 10.0;

/// Shrink margin for the upward overlap test. Larger than
/// [`COLLISION_MARGIN`] so a product resting on a neighbour is not flagged.
pub const COLLISION_MARGIN_ABOVE: f64 = COLLISION_MARGIN + 5.0;

// ── Targeting ───────────────────────────────────────────────────

/// Vertical slop when matching a drop against a shelf band.
pub const SHELF_Y_TOLERANCE: f64 = 10.0;

/// Vertical slop when matching a drop against a product to stack on.
pub const PRODUCT_Y_TOLERANCE: f64 = 10.0;

/// Horizontal slop when matching a drop against a product to stack on.
pub const PRODUCT_X_TOLERANCE: f64 = 5.0;

// ── Placement ───────────────────────────────────────────────────

/// Distance between a shelf-placed product's bottom edge and the shelf top.
pub const SHELF_TOP_OFFSET: f64 = 3.0;

/// Vertical gap between two stacked products.
pub const STACK_GAP: f64 = 1.0;

/// Offset applied to both axes when pasting a product from the clipboard.
pub const PASTE_OFFSET: f64 = 20.0;

// ── Product defaults ────────────────────────────────────────────

/// Base fill for products created without an explicit color.
pub const DEFAULT_PRODUCT_COLOR: &str = "#81C784";

/// Product type assigned when none is given.
pub const DEFAULT_PRODUCT_KIND: &str = "Food";

/// Fill drawn over a product the dragged item currently overlaps.
pub const COLLISION_FILL: &str = "red";
