//! Defenders: placed units that shoot at the attacker and absorb melee

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::projectile::Projectile;
use crate::tuning::{DefenderTuning, StarCoefficients};

/// Stable identifier for a placed defender (the attacker's melee target key)
pub type DefenderId = u32;

/// What the player commits when placing a unit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DefenderBlueprint {
    pub name: String,
    pub base_damage: f32,
    /// 1 through 5
    #[serde(alias = "star")]
    pub star_rating: u8,
    /// Sprite lookup key for the renderer
    pub image_key: String,
}

impl DefenderBlueprint {
    pub fn new(name: &str, base_damage: f32, star_rating: u8, image_key: &str) -> Self {
        Self {
            name: name.to_string(),
            base_damage,
            star_rating,
            image_key: image_key.to_string(),
        }
    }
}

/// A placed defender
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Defender {
    pub id: DefenderId,
    pub name: String,
    pub image_key: String,
    pub base_damage: f32,
    pub star_rating: u8,
    pub damage_coefficient: f32,
    pub max_health: f32,
    pub current_health: f32,
    /// Seconds between shots
    pub attack_interval: f32,
    /// Simulation time of the last shot (`None` = ready)
    pub last_attack: Option<f64>,
    /// Screen-space center, set to the slot center on placement
    pub anchor: Vec2,
}

impl Defender {
    /// Build a defender from a blueprint. Star ratings are clamped to 1..=5.
    pub fn from_blueprint(
        id: DefenderId,
        blueprint: &DefenderBlueprint,
        tuning: &DefenderTuning,
        stars: &StarCoefficients,
    ) -> Self {
        let star_rating = blueprint.star_rating.clamp(1, 5);
        let max_health = tuning.health_for_stars(star_rating).max(0.0);
        Self {
            id,
            name: blueprint.name.clone(),
            image_key: blueprint.image_key.clone(),
            base_damage: blueprint.base_damage,
            star_rating,
            damage_coefficient: stars.coefficient(star_rating),
            max_health,
            current_health: max_health,
            attack_interval: tuning.attack_interval,
            last_attack: None,
            anchor: Vec2::ZERO,
        }
    }

    /// Damage per projectile
    pub fn attack_damage(&self) -> f32 {
        self.base_damage * self.damage_coefficient
    }

    pub fn can_attack(&self, now: f64) -> bool {
        match self.last_attack {
            None => true,
            Some(last) => now - last >= f64::from(self.attack_interval),
        }
    }

    /// Fire at `target` if the cooldown has elapsed.
    ///
    /// The projectile's heading is fixed here and never updated.
    pub fn emit_projectile(
        &mut self,
        next_id: &mut u32,
        now: f64,
        target: Vec2,
        tuning: &DefenderTuning,
    ) -> Option<Projectile> {
        if !self.can_attack(now) {
            return None;
        }

        let id = *next_id;
        *next_id = next_id.wrapping_add(1);
        self.last_attack = Some(now);

        Some(Projectile::new(
            id,
            self.id,
            self.anchor,
            target,
            tuning.projectile_speed,
            self.attack_damage(),
            tuning.projectile_size,
        ))
    }

    /// Apply damage, flooring health at zero. Returns true if the defender is dead.
    pub fn take_damage(&mut self, amount: f32) -> bool {
        self.current_health = (self.current_health - amount).min(self.max_health).max(0.0);
        self.current_health <= 0.0
    }

    pub fn is_alive(&self) -> bool {
        self.current_health > 0.0
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.current_health / self.max_health
        } else {
            0.0
        }
    }

    /// Short description for logs, e.g. `Doge (3★) - DMG: 15`
    pub fn details(&self) -> String {
        format!("{} ({}★) - DMG: {}", self.name, self.star_rating, self.attack_damage())
    }
}
