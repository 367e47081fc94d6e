//! Axis-aligned bounding boxes for projectile hits and play-area culling
//!
//! Everything on the lane is a rectangle: the attacker sprite, each
//! projectile and the visible screen. Hits are plain overlap tests
//! evaluated once per tick.

use glam::Vec2;
use serde::{Deserialize, Serialize};

/// Axis-aligned rectangle in screen space
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Aabb {
    pub min: Vec2,
    pub max: Vec2,
}

impl Aabb {
    pub fn new(min: Vec2, max: Vec2) -> Self {
        Self {
            min: min.min(max),
            max: min.max(max),
        }
    }

    /// Rectangle of `size` centered on `center`
    pub fn from_center(center: Vec2, size: Vec2) -> Self {
        let half = size.abs() / 2.0;
        Self {
            min: center - half,
            max: center + half,
        }
    }

    /// Rectangle anchored at the origin (the visible play area)
    pub fn from_size(size: Vec2) -> Self {
        Self::new(Vec2::ZERO, size)
    }

    #[inline]
    pub fn center(&self) -> Vec2 {
        (self.min + self.max) / 2.0
    }

    #[inline]
    pub fn size(&self) -> Vec2 {
        self.max - self.min
    }

    /// Point-in-rectangle test (edges inclusive)
    pub fn contains_point(&self, point: Vec2) -> bool {
        point.cmpge(self.min).all() && point.cmple(self.max).all()
    }

    /// Overlap test. Touching edges count as a hit.
    pub fn overlaps(&self, other: &Aabb) -> bool {
        self.min.x <= other.max.x
            && self.max.x >= other.min.x
            && self.min.y <= other.max.y
            && self.max.y >= other.min.y
    }

    /// True once `self` has fully left `area` through any edge
    pub fn is_outside(&self, area: &Aabb) -> bool {
        self.max.x < area.min.x
            || self.min.x > area.max.x
            || self.max.y < area.min.y
            || self.min.y > area.max.y
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_center() {
        let b = Aabb::from_center(Vec2::new(100.0, 50.0), Vec2::new(20.0, 10.0));
        assert_eq!(b.min, Vec2::new(90.0, 45.0));
        assert_eq!(b.max, Vec2::new(110.0, 55.0));
        assert_eq!(b.center(), Vec2::new(100.0, 50.0));
        assert_eq!(b.size(), Vec2::new(20.0, 10.0));
    }

    #[test]
    fn test_new_orders_corners() {
        let b = Aabb::new(Vec2::new(10.0, 10.0), Vec2::new(0.0, 0.0));
        assert_eq!(b.min, Vec2::ZERO);
        assert_eq!(b.max, Vec2::new(10.0, 10.0));
    }

    #[test]
    fn test_overlap() {
        let attacker = Aabb::from_center(Vec2::new(500.0, 384.0), Vec2::splat(90.0));

        // Projectile well inside
        let inside = Aabb::from_center(Vec2::new(480.0, 380.0), Vec2::splat(10.0));
        assert!(attacker.overlaps(&inside));
        assert!(inside.overlaps(&attacker));

        // Projectile just touching the left edge
        let touching = Aabb::from_center(Vec2::new(450.0, 384.0), Vec2::splat(10.0));
        assert!(attacker.overlaps(&touching));

        // Projectile short of the box
        let short = Aabb::from_center(Vec2::new(440.0, 384.0), Vec2::splat(10.0));
        assert!(!attacker.overlaps(&short));
    }

    #[test]
    fn test_contains_point() {
        let b = Aabb::from_size(Vec2::new(1024.0, 768.0));
        assert!(b.contains_point(Vec2::new(0.0, 0.0)));
        assert!(b.contains_point(Vec2::new(512.0, 384.0)));
        assert!(!b.contains_point(Vec2::new(-1.0, 10.0)));
        assert!(!b.contains_point(Vec2::new(10.0, 769.0)));
    }

    #[test]
    fn test_outside_each_edge() {
        let screen = Aabb::from_size(Vec2::new(1024.0, 768.0));
        let size = Vec2::splat(10.0);

        assert!(!Aabb::from_center(Vec2::new(512.0, 384.0), size).is_outside(&screen));
        // Straddling an edge is still inside
        assert!(!Aabb::from_center(Vec2::new(-4.0, 384.0), size).is_outside(&screen));

        assert!(Aabb::from_center(Vec2::new(-6.0, 384.0), size).is_outside(&screen));
        assert!(Aabb::from_center(Vec2::new(1030.0, 384.0), size).is_outside(&screen));
        assert!(Aabb::from_center(Vec2::new(512.0, -6.0), size).is_outside(&screen));
        assert!(Aabb::from_center(Vec2::new(512.0, 774.0), size).is_outside(&screen));
    }
}
