//! Axis-aligned rectangle math shared by the locator, resolvers, and store.
//!
//! Every function here is total over finite inputs. Size validation happens
//! at the [`crate::scene::SceneStore`] boundary, not here.

#[cfg(test)]
#[path = "geometry_test.rs"]
mod geometry_test;

use serde::{Deserialize, Serialize};

/// A point in absolute canvas space (or a parent's local space).
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Component-wise difference `self - origin`; the local coordinates of
    /// `self` in a frame whose origin is `origin`.
    #[must_use]
    pub fn relative_to(self, origin: Point) -> Point {
        Point { x: self.x - origin.x, y: self.y - origin.y }
    }

    /// Component-wise sum; maps local coordinates back to the parent frame.
    #[must_use]
    pub fn offset_by(self, origin: Point) -> Point {
        Point { x: self.x + origin.x, y: self.y + origin.y }
    }
}

/// Axis-aligned rectangle. `y` grows downward, as on the canvas.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Rect {
    pub x: f64,
    pub y: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    #[must_use]
    pub fn new(x: f64, y: f64, width: f64, height: f64) -> Self {
        Self { x, y, width, height }
    }

    /// Rectangle of the given size with its top-left corner at `origin`.
    #[must_use]
    pub fn at(origin: Point, width: f64, height: f64) -> Self {
        Self { x: origin.x, y: origin.y, width, height }
    }

    #[must_use]
    pub fn origin(&self) -> Point {
        Point::new(self.x, self.y)
    }

    #[must_use]
    pub fn right(&self) -> f64 {
        self.x + self.width
    }

    #[must_use]
    pub fn bottom(&self) -> f64 {
        self.y + self.height
    }

    /// A rectangle with zero width or height carries no usable extent.
    #[must_use]
    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }
}

/// Independent horizontal / vertical tolerance bands for [`contains`].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct Tolerance {
    pub x: f64,
    pub y: f64,
}

impl Tolerance {
    /// No tolerance in either direction.
    pub const NONE: Self = Self { x: 0.0, y: 0.0 };

    #[must_use]
    pub fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }

    /// Tolerance on the vertical axis only.
    #[must_use]
    pub fn vertical(y: f64) -> Self {
        Self { x: 0.0, y }
    }
}

/// Shrink margins for [`overlaps`].
///
/// The vertical margin is direction-dependent: `above` applies when the
/// moving rectangle sits over the other one, `below` when it sits under.
/// `above` is normally the larger so products resting just on top of a
/// neighbour are not flagged.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct OverlapMargins {
    pub horizontal: f64,
    pub below: f64,
    pub above: f64,
}

impl OverlapMargins {
    #[must_use]
    pub fn new(horizontal: f64, below: f64, above: f64) -> Self {
        Self { horizontal, below, above }
    }
}

impl Default for OverlapMargins {
    fn default() -> Self {
        use crate::consts::{COLLISION_MARGIN, COLLISION_MARGIN_ABOVE};
        Self { horizontal: COLLISION_MARGIN, below: COLLISION_MARGIN, above: COLLISION_MARGIN_ABOVE }
    }
}

/// Whether moving rectangle `a` overlaps `b`.
///
/// They overlap unless `a` is fully right of, left of, below, or above `b`,
/// each separation test shrunk by the matching margin so edges that merely
/// touch (or miss by a few pixels of drag jitter) count as separate.
///
/// Not symmetric in general: swapping `a` and `b` swaps which of
/// `margins.above` / `margins.below` applies to each vertical test.
#[must_use]
pub fn overlaps(a: Rect, b: Rect, margins: OverlapMargins) -> bool {
    let right_of = a.x > b.right() - margins.horizontal;
    let left_of = a.right() < b.x + margins.horizontal;
    let below = a.y > b.bottom() - margins.below;
    let above = a.bottom() < b.y + margins.above;
    !(right_of || left_of || below || above)
}

/// Inclusive point-in-rectangle test with the rectangle grown by `tolerance`
/// on each side.
#[must_use]
pub fn contains(point: Point, rect: Rect, tolerance: Tolerance) -> bool {
    point.x >= rect.x - tolerance.x
        && point.x <= rect.right() + tolerance.x
        && point.y >= rect.y - tolerance.y
        && point.y <= rect.bottom() + tolerance.y
}

/// Strict rectangle intersection with no tolerance. Shared edges do not
/// intersect.
#[must_use]
pub fn intersects(a: Rect, b: Rect) -> bool {
    a.x < b.right() && a.right() > b.x && a.y < b.bottom() && a.bottom() > b.y
}
