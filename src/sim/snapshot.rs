//! Read-only per-frame view for renderers and UI
//!
//! Built fresh each frame from [`BattleState`]; holding one never borrows
//! the state.

use glam::Vec2;
use serde::Serialize;

use super::attacker::AttackerMode;
use super::defender::DefenderId;
use super::state::{BattleState, RoundPhase};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AttackerView {
    pub position: Vec2,
    pub lane_coord: f32,
    pub logical_position: i32,
    pub health_fraction: f32,
    pub retreating: bool,
    pub mode: AttackerMode,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct DefenderView {
    pub slot: usize,
    pub id: DefenderId,
    pub name: String,
    pub image_key: String,
    pub star_rating: u8,
    pub health_fraction: f32,
    pub anchor: Vec2,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BattleSnapshot {
    pub level: u32,
    pub phase: RoundPhase,
    pub time_ticks: u64,
    pub attacker: Option<AttackerView>,
    /// Occupied slots only, in lane order
    pub defenders: Vec<DefenderView>,
    pub projectiles: Vec<Vec2>,
}

impl BattleState {
    pub fn snapshot(&self) -> BattleSnapshot {
        let layout = &self.tuning.layout;

        let attacker = self.attacker.as_ref().map(|a| AttackerView {
            position: a.screen_position(layout),
            lane_coord: a.lane_coord,
            logical_position: a.logical_position,
            health_fraction: a.health_fraction(),
            retreating: a.is_retreating,
            mode: a.mode(),
        });

        let defenders = self
            .track
            .defenders()
            .map(|(slot, d)| DefenderView {
                slot,
                id: d.id,
                name: d.name.clone(),
                image_key: d.image_key.clone(),
                star_rating: d.star_rating,
                health_fraction: d.health_fraction(),
                anchor: d.anchor,
            })
            .collect();

        BattleSnapshot {
            level: self.level,
            phase: self.phase,
            time_ticks: self.time_ticks,
            attacker,
            defenders,
            projectiles: self.projectiles.iter().map(|p| p.pos).collect(),
        }
    }
}
