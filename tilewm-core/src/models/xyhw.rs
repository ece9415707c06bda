//! Rectangles and the point/corner/clamp helpers used for window placement.
#![allow(clippy::module_name_repetitions)]
use serde::{Deserialize, Serialize};

/// A rectangle, x,y from top left.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Xyhw {
    pub x: i32,
    pub y: i32,
    pub w: i32,
    pub h: i32,
}

/// One of the four corners of a rectangle. Used to pick which corner follows the pointer
/// during a resize.
#[derive(Serialize, Deserialize, Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Corner {
    TopLeft,
    TopRight,
    BottomLeft,
    #[default]
    BottomRight,
}

impl Xyhw {
    #[must_use]
    pub const fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self { x, y, w, h }
    }

    /// Whether a point falls inside. The right and bottom edges are exclusive so that two
    /// touching rectangles never both claim the same point.
    #[must_use]
    pub const fn contains_point(&self, x: i32, y: i32) -> bool {
        (self.x <= x && x < self.x + self.w) && (self.y <= y && y < self.y + self.h)
    }

    #[must_use]
    pub const fn center(&self) -> (i32, i32) {
        (self.x + self.w / 2, self.y + self.h / 2)
    }

    /// Squared distance from the center of the rectangle to a point.
    #[must_use]
    pub const fn center_distance_sq(&self, x: i32, y: i32) -> i64 {
        let (cx, cy) = self.center();
        let dx = (cx - x) as i64;
        let dy = (cy - y) as i64;
        dx * dx + dy * dy
    }

    /// Which quadrant of the rectangle a point falls in, split by the midpoint lines.
    #[must_use]
    pub const fn corner_at(&self, x: i32, y: i32) -> Corner {
        let (cx, cy) = self.center();
        match (x < cx, y < cy) {
            (true, true) => Corner::TopLeft,
            (false, true) => Corner::TopRight,
            (true, false) => Corner::BottomLeft,
            (false, false) => Corner::BottomRight,
        }
    }

    /// Shrink the size so that the rectangle plus a border on every side fits in `outer`.
    pub fn clamp_size_within(&mut self, outer: &Self, border: i32) {
        self.w = self.w.min(outer.w - 2 * border).max(1);
        self.h = self.h.min(outer.h - 2 * border).max(1);
    }

    /// Move so that the rectangle plus its border sits in the middle of `outer`.
    pub fn center_relative(&mut self, outer: &Self, border: i32) {
        self.x = outer.x + (outer.w - self.w - 2 * border) / 2;
        self.y = outer.y + (outer.h - self.h - 2 * border) / 2;
    }

    /// Move so that the middle of the rectangle is at the given point.
    pub fn center_on(&mut self, x: i32, y: i32) {
        self.x = x - self.w / 2;
        self.y = y - self.h / 2;
    }

    /// The same rectangle with `border` pixels taken off every side.
    #[must_use]
    pub const fn shrink(&self, border: i32) -> Self {
        Self {
            x: self.x,
            y: self.y,
            w: self.w - 2 * border,
            h: self.h - 2 * border,
        }
    }

    #[must_use]
    pub const fn intersects(&self, other: &Self) -> bool {
        self.x < other.x + other.w
            && other.x < self.x + self.w
            && self.y < other.y + other.h
            && other.y < self.y + self.h
    }
}
