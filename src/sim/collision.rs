//! Axis-aligned box intersection
//!
//! Boxes are half-open: a box at `pos` with `size` covers
//! `[pos.x, pos.x + size.x) × [pos.y, pos.y + size.y)`. Two boxes that only
//! share an edge do not intersect.
//!
//! The test ignores approach direction. A player resting on a paddle keeps
//! overlapping it for several ticks; the bounce gate on the player, not this
//! predicate, limits that to one bounce per landing.

use glam::IVec2;
use serde::{Deserialize, Serialize};

/// An integer-pixel axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Rect {
    pub pos: IVec2,
    pub size: IVec2,
}

impl Rect {
    pub fn new(x: i32, y: i32, w: i32, h: i32) -> Self {
        Self {
            pos: IVec2::new(x, y),
            size: IVec2::new(w, h),
        }
    }

    /// A square box of side `size`
    pub fn square(pos: IVec2, size: i32) -> Self {
        Self {
            pos,
            size: IVec2::splat(size),
        }
    }

    #[inline]
    pub fn left(&self) -> i32 {
        self.pos.x
    }

    #[inline]
    pub fn right(&self) -> i32 {
        self.pos.x + self.size.x
    }

    #[inline]
    pub fn top(&self) -> i32 {
        self.pos.y
    }

    #[inline]
    pub fn bottom(&self) -> i32 {
        self.pos.y + self.size.y
    }

    /// Empty boxes never intersect anything
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.size.x <= 0 || self.size.y <= 0
    }

    pub fn center_x(&self) -> i32 {
        self.pos.x + self.size.x / 2
    }
}

/// Half-open box overlap test
pub fn intersects(a: &Rect, b: &Rect) -> bool {
    if a.is_empty() || b.is_empty() {
        return false;
    }
    a.left() < b.right() && b.left() < a.right() && a.top() < b.bottom() && b.top() < a.bottom()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_overlap() {
        let a = Rect::new(0, 0, 21, 21);
        let b = Rect::new(10, 20, 70, 10);
        assert!(intersects(&a, &b));
        assert!(intersects(&b, &a));
    }

    #[test]
    fn test_shared_edge_is_not_overlap() {
        let player = Rect::new(0, 0, 21, 21);
        // Paddle top exactly at player bottom
        let paddle = Rect::new(0, 21, 70, 10);
        assert!(!intersects(&player, &paddle));
        // Side by side
        let right = Rect::new(21, 0, 21, 21);
        assert!(!intersects(&player, &right));
    }

    #[test]
    fn test_containment() {
        let outer = Rect::new(0, 0, 100, 100);
        let inner = Rect::new(40, 40, 5, 5);
        assert!(intersects(&outer, &inner));
        assert!(intersects(&inner, &outer));
    }

    #[test]
    fn test_empty_box() {
        let a = Rect::new(0, 0, 0, 10);
        let b = Rect::new(0, 0, 10, 10);
        assert!(!intersects(&a, &b));
    }
}
