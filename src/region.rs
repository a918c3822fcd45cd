// src/region.rs

//! Rectangles, the current clip region, and the damage tracker.
//!
//! All rectangle coordinates are half-open: `right` and `bottom` are one
//! past the last covered pixel. Wire-format rectangles with inclusive
//! right/bottom edges are converted at the boundary via
//! [`Rect::from_inclusive`].

use serde::{Deserialize, Serialize};

/// An axis-aligned rectangle with exclusive right/bottom edges.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rect {
    pub left: i32,
    pub top: i32,
    pub right: i32,
    pub bottom: i32,
}

impl Rect {
    pub const fn new(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Rect {
            left,
            top,
            right,
            bottom,
        }
    }

    /// Builds a rectangle from an origin and extent. Saturates at the
    /// coordinate limits, so adversarial wire extents cannot overflow.
    pub const fn from_extents(x: i32, y: i32, width: i32, height: i32) -> Self {
        Rect {
            left: x,
            top: y,
            right: x.saturating_add(width),
            bottom: y.saturating_add(height),
        }
    }

    /// Builds a rectangle from wire coordinates where right/bottom are
    /// inclusive (the legacy protocol convention). Saturates at the
    /// coordinate limits.
    pub const fn from_inclusive(left: i32, top: i32, right: i32, bottom: i32) -> Self {
        Rect {
            left,
            top,
            right: right.saturating_add(1),
            bottom: bottom.saturating_add(1),
        }
    }

    pub const fn width(&self) -> i32 {
        self.right - self.left
    }

    pub const fn height(&self) -> i32 {
        self.bottom - self.top
    }

    pub const fn is_empty(&self) -> bool {
        self.right <= self.left || self.bottom <= self.top
    }

    /// Intersection with another rectangle, `None` when disjoint or empty.
    pub fn intersect(&self, other: &Rect) -> Option<Rect> {
        let r = Rect {
            left: self.left.max(other.left),
            top: self.top.max(other.top),
            right: self.right.min(other.right),
            bottom: self.bottom.min(other.bottom),
        };
        if r.is_empty() {
            None
        } else {
            Some(r)
        }
    }

    pub fn overlaps(&self, other: &Rect) -> bool {
        self.left < other.right
            && other.left < self.right
            && self.top < other.bottom
            && other.top < self.bottom
    }

    /// The smallest rectangle covering both.
    pub fn union(&self, other: &Rect) -> Rect {
        Rect {
            left: self.left.min(other.left),
            top: self.top.min(other.top),
            right: self.right.max(other.right),
            bottom: self.bottom.max(other.bottom),
        }
    }

    pub fn contains(&self, x: i32, y: i32) -> bool {
        x >= self.left && x < self.right && y >= self.top && y < self.bottom
    }
}

/// The current clip rectangle, or unbounded when `None`.
///
/// The effective clip is always the configured rectangle intersected with
/// the target surface bounds; callers never see writes outside either.
#[derive(Debug, Clone, Copy, Default)]
pub struct ClipRegion {
    rect: Option<Rect>,
}

impl ClipRegion {
    pub fn set(&mut self, rect: Option<Rect>) {
        self.rect = rect;
    }

    pub fn get(&self) -> Option<Rect> {
        self.rect
    }

    /// Intersects the clip (if any) with `bounds`. Returns `None` when the
    /// clip lies entirely outside the bounds.
    pub fn effective(&self, bounds: Rect) -> Option<Rect> {
        match self.rect {
            Some(r) => r.intersect(&bounds),
            None => {
                if bounds.is_empty() {
                    None
                } else {
                    Some(bounds)
                }
            }
        }
    }
}

/// Accumulated invalidated rectangles since the last flush.
///
/// Overlapping entries coalesce into their union. Once the configured
/// cardinality is exceeded the whole set collapses to a single bounding
/// rectangle, mirroring the fixed-size invalid-region array of the legacy
/// window code.
#[derive(Debug)]
pub struct DamageSet {
    rects: Vec<Rect>,
    capacity: usize,
}

impl DamageSet {
    pub fn new(capacity: usize) -> Self {
        DamageSet {
            rects: Vec::new(),
            capacity: capacity.max(1),
        }
    }

    pub fn add(&mut self, rect: Rect) {
        if rect.is_empty() {
            return;
        }
        let mut merged = rect;
        // Fold every overlapping entry into the incoming rectangle. A merge
        // can create new overlaps, so restart until stable.
        loop {
            let before = self.rects.len();
            self.rects.retain(|r| {
                if r.overlaps(&merged) {
                    merged = merged.union(r);
                    false
                } else {
                    true
                }
            });
            if self.rects.len() == before {
                break;
            }
        }
        self.rects.push(merged);
        if self.rects.len() > self.capacity {
            let all = self
                .rects
                .iter()
                .skip(1)
                .fold(self.rects[0], |acc, r| acc.union(r));
            self.rects.clear();
            self.rects.push(all);
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rects.is_empty()
    }

    /// Takes all pending damage, leaving the set empty.
    pub fn drain(&mut self) -> Vec<Rect> {
        std::mem::take(&mut self.rects)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_inclusive_conversion() {
        // Contract: wire rects with inclusive edges convert to half-open.
        let r = Rect::from_inclusive(0, 0, 7, 7);
        assert_eq!(r.width(), 8);
        assert_eq!(r.height(), 8);
    }

    #[test]
    fn test_construction_saturates_at_coordinate_limits() {
        // Contract: wire rectangles near i32::MAX construct without
        // overflow; the edge clamps instead of wrapping.
        let r = Rect::from_inclusive(0, 0, i32::MAX, i32::MAX);
        assert_eq!(r.right, i32::MAX);
        assert_eq!(r.bottom, i32::MAX);
        let r = Rect::from_extents(i32::MAX - 1, i32::MAX - 1, 10, 10);
        assert_eq!(r.right, i32::MAX);
        assert_eq!(r.bottom, i32::MAX);
        // Still well-formed for the usual intersection path.
        assert_eq!(
            r.intersect(&Rect::from_extents(0, 0, 100, 100)),
            None
        );
    }

    #[test]
    fn test_intersect_disjoint() {
        let a = Rect::from_extents(0, 0, 10, 10);
        let b = Rect::from_extents(20, 20, 5, 5);
        assert_eq!(a.intersect(&b), None);
    }

    #[test]
    fn test_intersect_partial() {
        let a = Rect::from_extents(0, 0, 10, 10);
        let b = Rect::from_extents(5, 5, 10, 10);
        assert_eq!(a.intersect(&b), Some(Rect::new(5, 5, 10, 10)));
    }

    #[test]
    fn test_clip_effective_unbounded() {
        // Contract: no clip means the surface bounds are the clip.
        let clip = ClipRegion::default();
        let bounds = Rect::from_extents(0, 0, 640, 480);
        assert_eq!(clip.effective(bounds), Some(bounds));
    }

    #[test]
    fn test_clip_effective_outside_bounds() {
        let mut clip = ClipRegion::default();
        clip.set(Some(Rect::from_extents(1000, 1000, 10, 10)));
        let bounds = Rect::from_extents(0, 0, 640, 480);
        assert_eq!(clip.effective(bounds), None);
    }

    #[test]
    fn test_damage_coalesces_overlaps() {
        let mut damage = DamageSet::new(32);
        damage.add(Rect::from_extents(0, 0, 10, 10));
        damage.add(Rect::from_extents(5, 5, 10, 10));
        let rects = damage.drain();
        assert_eq!(rects, vec![Rect::new(0, 0, 15, 15)]);
    }

    #[test]
    fn test_damage_keeps_disjoint_rects() {
        let mut damage = DamageSet::new(32);
        damage.add(Rect::from_extents(0, 0, 10, 10));
        damage.add(Rect::from_extents(100, 100, 10, 10));
        assert_eq!(damage.drain().len(), 2);
    }

    #[test]
    fn test_damage_collapses_past_capacity() {
        // Contract: beyond the cardinality limit the set degrades to one
        // bounding rectangle of all pending damage.
        let mut damage = DamageSet::new(2);
        damage.add(Rect::from_extents(0, 0, 1, 1));
        damage.add(Rect::from_extents(10, 0, 1, 1));
        damage.add(Rect::from_extents(0, 10, 1, 1));
        let rects = damage.drain();
        assert_eq!(rects, vec![Rect::new(0, 0, 11, 11)]);
    }

    #[test]
    fn test_damage_ignores_empty() {
        let mut damage = DamageSet::new(32);
        damage.add(Rect::from_extents(5, 5, 0, 0));
        assert!(damage.is_empty());
    }
}
