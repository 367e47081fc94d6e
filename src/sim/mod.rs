//! Deterministic simulation module
//!
//! All battle logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Simulated clock only (no wall time)
//! - Stable iteration order (slot order, then spawn order)
//! - No rendering or platform dependencies

pub mod attacker;
pub mod collision;
pub mod defender;
pub mod projectile;
pub mod snapshot;
pub mod state;
pub mod tick;
pub mod track;

pub use attacker::{Attacker, AttackerMode, DamageOutcome, MeleeOutcome};
pub use collision::Aabb;
pub use defender::{Defender, DefenderBlueprint, DefenderId};
pub use projectile::Projectile;
pub use snapshot::{AttackerView, BattleSnapshot, DefenderView};
pub use state::{BattleState, GameEvent, RoundOutcome, RoundPhase};
pub use tick::{PlacementRequest, TickInput, step_frame, tick};
pub use track::{Slot, Track};
