//! Data-driven battle balance
//!
//! Everything the engine reads as a parameter lives here so a round can be
//! reproduced from a tuning file and a level number. Loaded from JSON; every
//! section falls back to the defaults in [`crate::consts`].

use std::error::Error;
use std::fmt;

use glam::Vec2;
use serde::{Deserialize, Serialize};

use crate::consts::*;
use crate::sim::DefenderBlueprint;

/// Attacker balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AttackerTuning {
    pub base_health: f32,
    pub health_per_level: f32,
    /// Lane speed in slots per second before slowdown
    pub base_move_speed: f32,
    /// Floor applied after slowdown
    pub min_move_speed: f32,
    /// Fraction of speed lost per hit taken
    pub slow_down_rate: f32,
    /// Maximum cumulative slowdown (0.5 = never slower than half speed)
    pub max_slow_down: f32,
    pub attack_damage: f32,
    /// Seconds between melee strikes
    pub attack_interval: f32,
    /// Seconds between lane steps
    pub move_interval: f32,
    /// Bounding box used for projectile hits
    pub size: Vec2,
}

impl Default for AttackerTuning {
    fn default() -> Self {
        Self {
            base_health: ATTACKER_BASE_HEALTH,
            health_per_level: ATTACKER_HEALTH_PER_LEVEL,
            base_move_speed: ATTACKER_BASE_MOVE_SPEED,
            min_move_speed: ATTACKER_MIN_MOVE_SPEED,
            slow_down_rate: ATTACKER_SLOW_DOWN_RATE,
            max_slow_down: ATTACKER_MAX_SLOW_DOWN,
            attack_damage: ATTACKER_ATTACK_DAMAGE,
            attack_interval: ATTACKER_ATTACK_INTERVAL,
            move_interval: ATTACKER_MOVE_INTERVAL,
            size: Vec2::splat(ATTACKER_SIZE),
        }
    }
}

impl AttackerTuning {
    /// Health at a given level (level 1 = base health)
    pub fn health_for_level(&self, level: u32) -> f32 {
        self.base_health + level.saturating_sub(1) as f32 * self.health_per_level
    }

    /// Lowest slowdown factor the attacker can reach
    pub fn min_slow_down_factor(&self) -> f32 {
        1.0 - self.max_slow_down
    }
}

/// Defender and projectile balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DefenderTuning {
    pub base_health: f32,
    /// Extra health for each star above the first
    pub health_per_star: f32,
    /// Seconds between shots
    pub attack_interval: f32,
    /// Pixels per second
    pub projectile_speed: f32,
    pub projectile_size: Vec2,
}

impl Default for DefenderTuning {
    fn default() -> Self {
        Self {
            base_health: DEFENDER_BASE_HEALTH,
            health_per_star: DEFENDER_HEALTH_PER_STAR,
            attack_interval: DEFENDER_ATTACK_INTERVAL,
            projectile_speed: PROJECTILE_SPEED,
            projectile_size: Vec2::splat(PROJECTILE_SIZE),
        }
    }
}

impl DefenderTuning {
    pub fn health_for_stars(&self, stars: u8) -> f32 {
        self.base_health + stars.saturating_sub(1) as f32 * self.health_per_star
    }
}

/// Star rating -> damage coefficient table
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct StarCoefficients(pub [f32; 5]);

impl Default for StarCoefficients {
    fn default() -> Self {
        Self(STAR_COEFFICIENTS)
    }
}

impl StarCoefficients {
    /// Coefficient for a rating; ratings outside 1..=5 fall back to 1.0
    pub fn coefficient(&self, stars: u8) -> f32 {
        match stars {
            1..=5 => self.0[usize::from(stars - 1)],
            _ => 1.0,
        }
    }

    fn is_monotonic(&self) -> bool {
        self.0.windows(2).all(|pair| pair[0] <= pair[1])
    }
}

/// Lane geometry in screen space
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LaneLayout {
    pub slot_count: usize,
    /// The first `placeable_count` slots accept defenders
    pub placeable_count: usize,
    pub cell_size: Vec2,
    /// Top-left corner of slot 0
    pub board_origin: Vec2,
    /// Visible play area; projectiles leaving it are discarded
    pub screen_size: Vec2,
}

impl Default for LaneLayout {
    fn default() -> Self {
        Self {
            slot_count: NUM_SLOTS,
            placeable_count: PLACEABLE_SLOTS,
            cell_size: Vec2::new(CELL_WIDTH, CELL_HEIGHT),
            board_origin: Vec2::new(BOARD_START_X, BOARD_Y),
            screen_size: Vec2::new(SCREEN_WIDTH, SCREEN_HEIGHT),
        }
    }
}

impl LaneLayout {
    /// Lane index the attacker spawns at (last slot)
    pub fn spawn_index(&self) -> i32 {
        self.slot_count as i32 - 1
    }

    /// Lane index the attacker must reach to win
    pub fn win_index(&self) -> i32 {
        WIN_INDEX
    }

    /// Convert a lane coordinate (slot units, -1 = goal) to the screen-space
    /// center of that point on the lane.
    ///
    /// Slot centers, defender anchors and the attacker all go through this.
    pub fn lane_to_screen(&self, coord: f32) -> Vec2 {
        Vec2::new(
            self.board_origin.x + coord * self.cell_size.x + self.cell_size.x / 2.0,
            self.board_origin.y + self.cell_size.y / 2.0,
        )
    }
}

/// Complete battle balance, injected into [`crate::sim::BattleState`]
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BattleTuning {
    pub attacker: AttackerTuning,
    pub defender: DefenderTuning,
    pub stars: StarCoefficients,
    pub layout: LaneLayout,
    /// Units the player can acquire
    pub blueprints: Vec<DefenderBlueprint>,
}

impl Default for BattleTuning {
    fn default() -> Self {
        Self {
            attacker: AttackerTuning::default(),
            defender: DefenderTuning::default(),
            stars: StarCoefficients::default(),
            layout: LaneLayout::default(),
            blueprints: default_blueprints(),
        }
    }
}

/// Stock blueprint pool
pub fn default_blueprints() -> Vec<DefenderBlueprint> {
    vec![
        DefenderBlueprint::new("Pepe", 15.0, 4, "Pepe"),
        DefenderBlueprint::new("Doge", 10.0, 3, "Doge"),
        DefenderBlueprint::new("Stonks", 20.0, 5, "Stonks"),
        DefenderBlueprint::new("Grumpy Cat", 8.0, 2, "Grumpy Cat"),
        DefenderBlueprint::new("Distracted BF", 5.0, 1, "Distracted BF"),
    ]
}

impl BattleTuning {
    /// Parse and validate a JSON tuning file
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Self = serde_json::from_str(json).map_err(TuningError::Json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        serde_json::to_string_pretty(self).map_err(TuningError::Json)
    }

    /// Reject parameter sets the engine cannot run
    pub fn validate(&self) -> Result<(), TuningError> {
        let layout = &self.layout;
        if layout.slot_count == 0 {
            return Err(TuningError::EmptyTrack);
        }
        if layout.placeable_count > layout.slot_count {
            return Err(TuningError::TooManyPlaceable {
                placeable: layout.placeable_count,
                slots: layout.slot_count,
            });
        }

        let positive = [
            ("attacker.base_health", self.attacker.base_health),
            ("attacker.base_move_speed", self.attacker.base_move_speed),
            ("attacker.min_move_speed", self.attacker.min_move_speed),
            ("attacker.attack_damage", self.attacker.attack_damage),
            ("attacker.attack_interval", self.attacker.attack_interval),
            ("attacker.move_interval", self.attacker.move_interval),
            ("defender.base_health", self.defender.base_health),
            ("defender.attack_interval", self.defender.attack_interval),
            ("defender.projectile_speed", self.defender.projectile_speed),
        ];
        for (field, value) in positive {
            if !(value > 0.0) {
                return Err(TuningError::NotPositive { field, value });
            }
        }

        for (field, value) in [
            ("attacker.health_per_level", self.attacker.health_per_level),
            ("defender.health_per_star", self.defender.health_per_star),
        ] {
            if !(value >= 0.0) {
                return Err(TuningError::Negative { field, value });
            }
        }

        for (field, value) in [
            ("attacker.slow_down_rate", self.attacker.slow_down_rate),
            ("attacker.max_slow_down", self.attacker.max_slow_down),
        ] {
            if !(0.0..1.0).contains(&value) {
                return Err(TuningError::OutOfUnitRange { field, value });
            }
        }

        if !self.stars.is_monotonic() {
            return Err(TuningError::StarTableNotMonotonic(self.stars.0));
        }

        for blueprint in &self.blueprints {
            if !(1..=5).contains(&blueprint.star_rating) {
                return Err(TuningError::BadBlueprint {
                    name: blueprint.name.clone(),
                    reason: "star rating outside 1..=5",
                });
            }
            if !(blueprint.base_damage >= 0.0) {
                return Err(TuningError::BadBlueprint {
                    name: blueprint.name.clone(),
                    reason: "negative base damage",
                });
            }
        }

        Ok(())
    }
}

/// Reasons a tuning file is rejected
#[derive(Debug)]
pub enum TuningError {
    /// The file could not be (de)serialised.
    Json(serde_json::Error),
    /// The layout has no slots at all.
    EmptyTrack,
    /// More placeable slots than the track has.
    TooManyPlaceable { placeable: usize, slots: usize },
    /// A rate, speed, health or interval that must be positive is not.
    NotPositive { field: &'static str, value: f32 },
    /// A per-level or per-star increment is below zero.
    Negative { field: &'static str, value: f32 },
    /// A fraction that must lie in `[0, 1)` does not.
    OutOfUnitRange { field: &'static str, value: f32 },
    /// Higher star ratings must never deal less damage.
    StarTableNotMonotonic([f32; 5]),
    /// A pool blueprint the engine cannot field.
    BadBlueprint { name: String, reason: &'static str },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Json(error) => write!(f, "could not parse tuning: {error}"),
            Self::EmptyTrack => write!(f, "lane layout has no slots"),
            Self::TooManyPlaceable { placeable, slots } => {
                write!(f, "{placeable} placeable slots on a {slots}-slot track")
            }
            Self::NotPositive { field, value } => {
                write!(f, "{field} must be positive, got {value}")
            }
            Self::Negative { field, value } => {
                write!(f, "{field} must not be negative, got {value}")
            }
            Self::OutOfUnitRange { field, value } => {
                write!(f, "{field} must be in [0, 1), got {value}")
            }
            Self::StarTableNotMonotonic(table) => {
                write!(f, "star coefficients must be non-decreasing, got {table:?}")
            }
            Self::BadBlueprint { name, reason } => write!(f, "blueprint {name:?}: {reason}"),
        }
    }
}

impl Error for TuningError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Json(error) => Some(error),
            _ => None,
        }
    }
}
