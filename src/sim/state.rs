//! Battle state and round lifecycle
//!
//! `BattleState` owns every entity on the lane. Callers mutate it only
//! through placement, round lifecycle calls and [`super::tick::tick`].

use serde::{Deserialize, Serialize};

use super::attacker::Attacker;
use super::defender::{Defender, DefenderBlueprint, DefenderId};
use super::projectile::Projectile;
use super::track::Track;
use crate::tuning::BattleTuning;

/// How a round ended
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundOutcome {
    /// The attacker walked into the goal
    AttackerReachedGoal,
    /// The attacker was beaten and walked back off the lane
    AttackerRetreated,
}

/// Round lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RoundPhase {
    /// No round has been started yet
    Idle,
    Active,
    Ended(RoundOutcome),
    /// Stopped from outside at a tick boundary
    Aborted,
}

/// Things that happened during a tick, drained by the caller
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum GameEvent {
    RoundStarted { level: u32 },
    RoundEnded(RoundOutcome),
    RoundAborted,
    DefenderPlaced { defender: DefenderId, slot: usize },
    PlacementRejected { slot: usize },
    MeleeEngaged { defender: DefenderId, slot: usize },
    DefenderStruck { defender: DefenderId, damage: f32, health: f32 },
    /// Removed from its slot
    DefenderDefeated { defender: DefenderId, slot: usize },
    /// A defender on the attacker's own slot hit it at a step boundary
    OnSlotStrike { defender: DefenderId, damage: f32 },
    ProjectileFired { projectile: u32, defender: DefenderId },
    ProjectileHit { projectile: u32, damage: f32 },
    AttackerDamaged { damage: f32, health: f32 },
    AttackerRetreating,
}

/// Complete battle state
#[derive(Debug, Clone)]
pub struct BattleState {
    /// Balance and layout (immutable for the life of the state)
    pub tuning: BattleTuning,
    /// Level of the current (or last) round
    pub level: u32,
    pub phase: RoundPhase,
    /// Simulated seconds since the round started; the `now` for cooldowns
    pub clock: f64,
    /// Ticks processed this round
    pub time_ticks: u64,
    /// Seconds accumulated toward the attacker's next step
    pub move_timer: f32,
    pub track: Track,
    /// Present only once a round has been started
    pub attacker: Option<Attacker>,
    /// Projectiles in flight (in spawn order)
    pub projectiles: Vec<Projectile>,
    events: Vec<GameEvent>,
    /// Next entity ID (defenders and projectiles share the sequence)
    pub(crate) next_id: u32,
}

impl BattleState {
    /// Create an idle battle. No attacker exists until [`Self::start_round`].
    pub fn new(tuning: BattleTuning) -> Self {
        let track = Track::new(&tuning.layout);
        Self {
            tuning,
            level: 0,
            phase: RoundPhase::Idle,
            clock: 0.0,
            time_ticks: 0,
            move_timer: 0.0,
            track,
            attacker: None,
            projectiles: Vec::new(),
            events: Vec::new(),
            next_id: 1,
        }
    }

    /// Allocate a new entity ID
    pub fn next_entity_id(&mut self) -> u32 {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1);
        id
    }

    /// Reset the lane and spawn a fresh attacker for `level`
    pub fn start_round(&mut self, level: u32) {
        let layout = &self.tuning.layout;
        let attacker = Attacker::new(
            level,
            layout.spawn_index(),
            layout.win_index(),
            &self.tuning.attacker,
        );

        log::info!(
            "Level {} starting: attacker has {} HP",
            level,
            attacker.max_health
        );

        self.level = level;
        self.phase = RoundPhase::Active;
        self.clock = 0.0;
        self.time_ticks = 0;
        self.move_timer = 0.0;
        self.track.clear_all();
        self.projectiles.clear();
        self.attacker = Some(attacker);
        self.push_event(GameEvent::RoundStarted { level });
    }

    pub fn is_round_active(&self) -> bool {
        self.phase == RoundPhase::Active
    }

    /// Outcome of the last finished round
    pub fn outcome(&self) -> Option<RoundOutcome> {
        match self.phase {
            RoundPhase::Ended(outcome) => Some(outcome),
            _ => None,
        }
    }

    /// Stop the round between ticks. Entities are left as they were.
    pub fn abort_round(&mut self) -> bool {
        if !self.is_round_active() {
            return false;
        }
        log::info!("Level {} aborted after {} ticks", self.level, self.time_ticks);
        self.phase = RoundPhase::Aborted;
        self.push_event(GameEvent::RoundAborted);
        true
    }

    /// Finish the round with `outcome`. Only the first call per round counts.
    pub(crate) fn end_round(&mut self, outcome: RoundOutcome) {
        if !self.is_round_active() {
            return;
        }
        match outcome {
            RoundOutcome::AttackerReachedGoal => {
                log::info!("Level {}: attacker reached the goal", self.level)
            }
            RoundOutcome::AttackerRetreated => {
                log::info!("Level {} cleared: attacker retreated", self.level)
            }
        }
        self.phase = RoundPhase::Ended(outcome);
        self.push_event(GameEvent::RoundEnded(outcome));
    }

    /// Commit a placement. Only accepted during an active round, on an
    /// empty placeable slot.
    pub fn place_defender(&mut self, slot: usize, blueprint: &DefenderBlueprint) -> bool {
        if !self.is_round_active() {
            log::debug!("Placement on slot {} ignored: no active round", slot);
            self.push_event(GameEvent::PlacementRejected { slot });
            return false;
        }

        let id = self.next_id;
        let defender = Defender::from_blueprint(
            id,
            blueprint,
            &self.tuning.defender,
            &self.tuning.stars,
        );
        let details = defender.details();

        if self.track.place(slot, defender) {
            self.next_id = self.next_id.wrapping_add(1);
            log::debug!("Placed {} in slot {}", details, slot);
            self.push_event(GameEvent::DefenderPlaced { defender: id, slot });
            true
        } else {
            log::debug!("Could not place {} in slot {}", details, slot);
            self.push_event(GameEvent::PlacementRejected { slot });
            false
        }
    }

    /// Take a defender off the lane and clear any melee lock on it in the
    /// same call, so no stale target survives.
    pub fn remove_defender(&mut self, slot: usize) -> Option<Defender> {
        let defender = self.track.remove(slot)?;

        if let Some(attacker) = self.attacker.as_mut() {
            if attacker.target_defender == Some(defender.id) {
                attacker.disengage();
            }
        }

        log::debug!("{} in slot {} has been defeated", defender.name, slot);
        self.push_event(GameEvent::DefenderDefeated {
            defender: defender.id,
            slot,
        });
        Some(defender)
    }

    /// Remove every defender with no health left
    pub fn sweep_dead_defenders(&mut self) -> usize {
        let dead = self.track.dead_slots();
        for &slot in &dead {
            self.remove_defender(slot);
        }
        dead.len()
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Events queued since the last drain, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn blueprint() -> DefenderBlueprint {
        DefenderBlueprint::new("Doge", 10.0, 3, "Doge")
    }

    #[test]
    fn test_new_is_idle() {
        let state = BattleState::new(BattleTuning::default());
        assert_eq!(state.phase, RoundPhase::Idle);
        assert!(!state.is_round_active());
        assert!(state.attacker.is_none());
        assert_eq!(state.track.len(), 7);
    }

    #[test]
    fn test_start_round_resets() {
        let mut state = BattleState::new(BattleTuning::default());
        state.start_round(1);
        assert!(state.place_defender(0, &blueprint()));
        state.move_timer = 3.0;
        state.clock = 12.0;

        state.start_round(2);
        assert!(state.is_round_active());
        assert_eq!(state.level, 2);
        assert_eq!(state.track.occupied_count(), 0);
        assert_eq!(state.move_timer, 0.0);
        assert_eq!(state.clock, 0.0);
        let attacker = state.attacker.as_ref().unwrap();
        assert_eq!(attacker.logical_position, 6);
        assert_eq!(attacker.max_health, 150.0);
    }

    #[test]
    fn test_placement_needs_active_round() {
        let mut state = BattleState::new(BattleTuning::default());
        assert!(!state.place_defender(0, &blueprint()));
        assert_eq!(state.track.occupied_count(), 0);
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::PlacementRejected { slot: 0 }]
        );
    }

    #[test]
    fn test_rejected_placement_keeps_ids() {
        let mut state = BattleState::new(BattleTuning::default());
        state.start_round(1);
        assert!(state.place_defender(1, &blueprint()));
        let first = state.track.slot_at(1).unwrap().defender.as_ref().unwrap().id;
        assert!(!state.place_defender(1, &blueprint()));
        assert!(!state.place_defender(6, &blueprint()));
        assert!(state.place_defender(2, &blueprint()));
        let second = state.track.slot_at(2).unwrap().defender.as_ref().unwrap().id;
        assert_eq!(second, first + 1);
    }

    #[test]
    fn test_remove_defender_clears_target() {
        let mut state = BattleState::new(BattleTuning::default());
        state.start_round(1);
        assert!(state.place_defender(4, &blueprint()));
        let id = state.track.slot_at(4).unwrap().defender.as_ref().unwrap().id;
        assert!(state.attacker.as_mut().unwrap().engage(id));

        let removed = state.remove_defender(4).unwrap();
        assert_eq!(removed.id, id);
        let attacker = state.attacker.as_ref().unwrap();
        assert!(!attacker.is_attacking);
        assert!(attacker.target_defender.is_none());
        assert!(state.remove_defender(4).is_none());
    }

    #[test]
    fn test_sweep_dead_defenders() {
        let mut state = BattleState::new(BattleTuning::default());
        state.start_round(1);
        assert!(state.place_defender(0, &blueprint()));
        assert!(state.place_defender(3, &blueprint()));
        let slot = state.track.slot_at_mut(3).unwrap();
        slot.defender.as_mut().unwrap().take_damage(1_000.0);

        state.drain_events();
        assert_eq!(state.sweep_dead_defenders(), 1);
        assert!(state.track.slot_at(3).unwrap().is_empty());
        assert!(!state.track.slot_at(0).unwrap().is_empty());
        assert!(matches!(
            state.drain_events().as_slice(),
            [GameEvent::DefenderDefeated { slot: 3, .. }]
        ));
    }

    #[test]
    fn test_end_round_once() {
        let mut state = BattleState::new(BattleTuning::default());
        state.start_round(1);
        state.drain_events();
        state.end_round(RoundOutcome::AttackerReachedGoal);
        state.end_round(RoundOutcome::AttackerRetreated);
        assert_eq!(state.outcome(), Some(RoundOutcome::AttackerReachedGoal));
        assert_eq!(
            state.drain_events(),
            vec![GameEvent::RoundEnded(RoundOutcome::AttackerReachedGoal)]
        );
        assert!(!state.abort_round());
    }

    #[test]
    fn test_abort_round() {
        let mut state = BattleState::new(BattleTuning::default());
        assert!(!state.abort_round());
        state.start_round(1);
        assert!(state.abort_round());
        assert_eq!(state.phase, RoundPhase::Aborted);
        assert!(state.outcome().is_none());
        // The attacker is left untouched for the renderer
        assert!(state.attacker.is_some());
    }
}
