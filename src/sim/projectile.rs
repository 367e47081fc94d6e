//! Straight-line projectiles fired by defenders

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::defender::DefenderId;

/// A projectile in flight. Heading is fixed at spawn (no homing).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Projectile {
    pub id: u32,
    /// Defender that fired it
    pub owner: DefenderId,
    pub pos: Vec2,
    /// Unit heading (zero if fired at its own spawn point)
    pub dir: Vec2,
    /// Pixels per second
    pub speed: f32,
    pub damage: f32,
    pub size: Vec2,
}

impl Projectile {
    pub fn new(
        id: u32,
        owner: DefenderId,
        spawn: Vec2,
        target: Vec2,
        speed: f32,
        damage: f32,
        size: Vec2,
    ) -> Self {
        Self {
            id,
            owner,
            pos: spawn,
            dir: (target - spawn).normalize_or_zero(),
            speed,
            damage,
            size,
        }
    }

    #[inline]
    pub fn velocity(&self) -> Vec2 {
        self.dir * self.speed
    }

    /// Integrate position over `dt` seconds
    pub fn advance(&mut self, dt: f32) {
        self.pos += self.velocity() * dt;
    }

    pub fn bounds(&self) -> Aabb {
        Aabb::from_center(self.pos, self.size)
    }

    pub fn hits(&self, target: &Aabb) -> bool {
        self.bounds().overlaps(target)
    }

    /// True once the projectile has fully left the play area
    pub fn is_out_of_bounds(&self, area: &Aabb) -> bool {
        self.bounds().is_outside(area)
    }
}
