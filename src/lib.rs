//! Lane Siege - a lane battle between one attacker and a row of defenders
//!
//! Core modules:
//! - `sim`: Deterministic battle engine (track, defenders, projectiles, attacker, tick)
//! - `tuning`: Data-driven battle balance and lane layout

pub mod sim;
pub mod tuning;

pub use tuning::{
    AttackerTuning, BattleTuning, DefenderTuning, LaneLayout, StarCoefficients, TuningError,
};

/// Game configuration constants
pub mod consts {
    /// Fixed simulation timestep (30 Hz, one tick per rendered frame)
    pub const SIM_DT: f32 = 1.0 / 30.0;
    /// Maximum substeps per frame to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Longest frame fed into the accumulator (slow frames are dropped, not replayed)
    pub const MAX_FRAME_DT: f32 = 0.25;

    /// Visible play area
    pub const SCREEN_WIDTH: f32 = 1024.0;
    pub const SCREEN_HEIGHT: f32 = 768.0;

    /// Lane geometry
    pub const NUM_SLOTS: usize = 7;
    pub const PLACEABLE_SLOTS: usize = 5;
    pub const CELL_WIDTH: f32 = 100.0;
    pub const CELL_HEIGHT: f32 = 100.0;
    /// Width of the goal area left of slot 0
    pub const GOAL_WIDTH: f32 = 120.0;
    pub const BOARD_START_X: f32 = GOAL_WIDTH + 20.0;
    pub const BOARD_Y: f32 = SCREEN_HEIGHT / 2.0 - CELL_HEIGHT / 2.0;

    /// Lane index the attacker must reach to win (one past slot 0)
    pub const WIN_INDEX: i32 = -1;

    /// Attacker defaults
    pub const ATTACKER_BASE_HEALTH: f32 = 100.0;
    pub const ATTACKER_HEALTH_PER_LEVEL: f32 = 50.0;
    /// Lane speed in slots per second
    pub const ATTACKER_BASE_MOVE_SPEED: f32 = 0.5;
    pub const ATTACKER_MIN_MOVE_SPEED: f32 = 0.15;
    /// Speed lost per hit (multiplicative)
    pub const ATTACKER_SLOW_DOWN_RATE: f32 = 0.05;
    /// Cap on cumulative slowdown (factor never drops below 1 - this)
    pub const ATTACKER_MAX_SLOW_DOWN: f32 = 0.5;
    pub const ATTACKER_ATTACK_DAMAGE: f32 = 15.0;
    pub const ATTACKER_ATTACK_INTERVAL: f32 = 1.0;
    /// Seconds between lane steps
    pub const ATTACKER_MOVE_INTERVAL: f32 = 4.0;
    pub const ATTACKER_SIZE: f32 = CELL_WIDTH - 10.0;

    /// Defender defaults
    pub const DEFENDER_BASE_HEALTH: f32 = 50.0;
    pub const DEFENDER_HEALTH_PER_STAR: f32 = 20.0;
    pub const DEFENDER_ATTACK_INTERVAL: f32 = 1.5;
    /// Projectile speed in pixels per second
    pub const PROJECTILE_SPEED: f32 = 300.0;
    pub const PROJECTILE_SIZE: f32 = 10.0;

    /// Damage coefficient per star rating (1 through 5)
    pub const STAR_COEFFICIENTS: [f32; 5] = [1.0, 1.2, 1.5, 2.0, 2.5];
}
