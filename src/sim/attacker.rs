//! The attacker: a single unit walking the lane toward the goal
//!
//! Position is held twice on purpose:
//! - `logical_position`: the slot index used for all combat decisions
//! - `lane_coord`: a continuous coordinate (slot units) for smooth motion
//!
//! They agree whenever the attacker is not moving. Screen space is derived
//! from `lane_coord` only, through [`LaneLayout::lane_to_screen`].

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::collision::Aabb;
use super::defender::{Defender, DefenderId};
use super::state::RoundOutcome;
use crate::tuning::{AttackerTuning, LaneLayout};

/// Derived view of the attacker's flags
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AttackerMode {
    /// Standing on a slot, free to engage or step
    Idle,
    /// Walking between two slots
    Moving,
    /// Locked in melee with the defender ahead
    MeleeEngaged,
    /// Out of health, walking back to spawn
    Retreating,
}

/// Result of a damage application
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DamageOutcome {
    /// Already retreating; nothing changed
    Ignored,
    Wounded,
    /// This hit emptied the health bar and started the retreat
    Routed,
}

/// Result of one melee resolution attempt
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum MeleeOutcome {
    /// Cooldown still running
    Waiting,
    Hit { damage: f32 },
    /// The target died from this strike; the attacker is disengaged
    Killed { damage: f32 },
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Attacker {
    pub level: u32,
    pub max_health: f32,
    pub current_health: f32,
    pub logical_position: i32,
    /// Destination slot while moving
    pub target_position: i32,
    /// Continuous lane coordinate in slot units
    pub lane_coord: f32,
    pub is_moving: bool,
    pub is_retreating: bool,
    pub is_attacking: bool,
    /// Melee target, by id only. Cleared on its death or removal.
    pub target_defender: Option<DefenderId>,
    /// Multiplier on move speed, shrinks with every hit taken
    pub slow_down_factor: f32,
    pub attack_damage: f32,
    pub attack_interval: f32,
    pub last_attack: Option<f64>,
    /// Lane index of the goal
    pub win_index: i32,
    /// Lane index of the spawn slot
    pub spawn_index: i32,
    tuning: AttackerTuning,
}

impl Attacker {
    pub fn new(level: u32, spawn_index: i32, win_index: i32, tuning: &AttackerTuning) -> Self {
        let max_health = tuning.health_for_level(level).max(0.0);
        Self {
            level,
            max_health,
            current_health: max_health,
            logical_position: spawn_index,
            target_position: spawn_index,
            lane_coord: spawn_index as f32,
            is_moving: false,
            is_retreating: false,
            is_attacking: false,
            target_defender: None,
            slow_down_factor: 1.0,
            attack_damage: tuning.attack_damage,
            attack_interval: tuning.attack_interval,
            last_attack: None,
            win_index,
            spawn_index,
            tuning: tuning.clone(),
        }
    }

    pub fn mode(&self) -> AttackerMode {
        if self.is_retreating {
            AttackerMode::Retreating
        } else if self.is_moving {
            AttackerMode::Moving
        } else if self.is_attacking {
            AttackerMode::MeleeEngaged
        } else {
            AttackerMode::Idle
        }
    }

    /// Standing still, not fighting, not retreating
    pub fn can_engage(&self) -> bool {
        !self.is_retreating && !self.is_moving && !self.is_attacking
    }

    /// Lane position of the slot directly ahead (toward the goal)
    pub fn ahead_position(&self) -> i32 {
        self.logical_position - 1
    }

    /// Lock onto a defender. Only valid while standing still.
    pub fn engage(&mut self, defender: DefenderId) -> bool {
        if !self.can_engage() {
            return false;
        }
        self.target_defender = Some(defender);
        self.is_attacking = true;
        true
    }

    pub fn disengage(&mut self) {
        self.target_defender = None;
        self.is_attacking = false;
    }

    pub fn can_attack(&self, now: f64) -> bool {
        match self.last_attack {
            None => true,
            Some(last) => now - last >= f64::from(self.attack_interval),
        }
    }

    /// Strike the current target if the cooldown allows.
    ///
    /// `defender` must be the one named by `target_defender`. A kill clears
    /// the engagement before returning.
    pub fn strike(&mut self, now: f64, defender: &mut Defender) -> MeleeOutcome {
        if !self.is_attacking || self.target_defender != Some(defender.id) {
            return MeleeOutcome::Waiting;
        }
        if !self.can_attack(now) {
            return MeleeOutcome::Waiting;
        }

        let damage = self.attack_damage;
        self.last_attack = Some(now);
        if defender.take_damage(damage) {
            self.disengage();
            MeleeOutcome::Killed { damage }
        } else {
            MeleeOutcome::Hit { damage }
        }
    }

    /// Pick the next slot and start walking. Returns false when there is
    /// nowhere to go (already at the goal or back at spawn) or when busy.
    pub fn begin_move(&mut self) -> bool {
        if self.is_moving || self.is_attacking {
            return false;
        }

        let next = if self.is_retreating {
            (self.logical_position < self.spawn_index).then(|| self.logical_position + 1)
        } else {
            (self.logical_position > self.win_index).then(|| self.logical_position - 1)
        };

        match next {
            Some(target) => {
                self.target_position = target;
                self.is_moving = true;
                true
            }
            None => false,
        }
    }

    /// Current lane speed in slots per second
    pub fn effective_speed(&self) -> f32 {
        (self.tuning.base_move_speed * self.slow_down_factor).max(self.tuning.min_move_speed)
    }

    /// Advance toward the target slot. Returns true on the tick of arrival.
    pub fn integrate(&mut self, dt: f32) -> bool {
        if !self.is_moving {
            return false;
        }

        let target = self.target_position as f32;
        let direction = (target - self.lane_coord).signum();
        self.lane_coord += direction * self.effective_speed() * dt;

        let arrived = if direction > 0.0 {
            self.lane_coord >= target
        } else {
            self.lane_coord <= target
        };

        if arrived {
            self.lane_coord = target;
            self.logical_position = self.target_position;
            self.is_moving = false;
        }
        arrived
    }

    /// Take a hit. Ignored while retreating. Slows the attacker, and an
    /// empty health bar starts the (permanent) retreat, which also breaks
    /// off any melee.
    pub fn take_damage(&mut self, amount: f32) -> DamageOutcome {
        if self.is_retreating {
            return DamageOutcome::Ignored;
        }

        self.current_health = (self.current_health - amount).min(self.max_health).max(0.0);
        self.slow_down_factor = (self.slow_down_factor * (1.0 - self.tuning.slow_down_rate))
            .max(self.tuning.min_slow_down_factor());

        if self.current_health <= 0.0 {
            self.is_retreating = true;
            self.disengage();
            DamageOutcome::Routed
        } else {
            DamageOutcome::Wounded
        }
    }

    /// Round result, if the attacker is parked at either end of the lane.
    /// Never decided mid-step.
    pub fn round_outcome(&self) -> Option<RoundOutcome> {
        if self.is_moving {
            return None;
        }
        if !self.is_retreating && self.logical_position <= self.win_index {
            Some(RoundOutcome::AttackerReachedGoal)
        } else if self.is_retreating && self.logical_position >= self.spawn_index {
            Some(RoundOutcome::AttackerRetreated)
        } else {
            None
        }
    }

    pub fn screen_position(&self, layout: &LaneLayout) -> Vec2 {
        layout.lane_to_screen(self.lane_coord)
    }

    pub fn bounds(&self, layout: &LaneLayout) -> Aabb {
        Aabb::from_center(self.screen_position(layout), self.tuning.size)
    }

    pub fn health_fraction(&self) -> f32 {
        if self.max_health > 0.0 {
            self.current_health / self.max_health
        } else {
            0.0
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::SIM_DT;
    use crate::sim::DefenderBlueprint;
    use crate::tuning::{DefenderTuning, StarCoefficients};
    use proptest::prelude::*;

    fn attacker() -> Attacker {
        Attacker::new(1, 6, -1, &AttackerTuning::default())
    }

    fn defender(id: DefenderId) -> Defender {
        let blueprint = DefenderBlueprint::new("Distracted BF", 5.0, 1, "Distracted BF");
        Defender::from_blueprint(
            id,
            &blueprint,
            &DefenderTuning::default(),
            &StarCoefficients::default(),
        )
    }

    #[test]
    fn test_spawn_state() {
        let a = Attacker::new(3, 6, -1, &AttackerTuning::default());
        assert_eq!(a.max_health, 200.0);
        assert_eq!(a.current_health, 200.0);
        assert_eq!(a.logical_position, 6);
        assert_eq!(a.lane_coord, 6.0);
        assert_eq!(a.slow_down_factor, 1.0);
        assert_eq!(a.mode(), AttackerMode::Idle);
        assert!(a.round_outcome().is_none());
    }

    #[test]
    fn test_single_hit_slows() {
        let mut a = attacker();
        assert_eq!(a.take_damage(15.0), DamageOutcome::Wounded);
        assert_eq!(a.current_health, 85.0);
        assert!((a.slow_down_factor - 0.95).abs() < 1e-6);
    }

    #[test]
    fn test_unvalidated_negative_health_never_shows() {
        let tuning = AttackerTuning {
            health_per_level: -50.0,
            ..AttackerTuning::default()
        };
        let mut a = Attacker::new(4, 6, -1, &tuning);
        assert_eq!(a.max_health, 0.0);
        assert_eq!(a.current_health, 0.0);

        // No panic from an inverted clamp range
        assert_eq!(a.take_damage(1.0), DamageOutcome::Routed);
        assert_eq!(a.current_health, 0.0);
        assert!(a.is_retreating);
    }

    #[test]
    fn test_lethal_hit_routs_and_disengages() {
        let mut a = attacker();
        assert!(a.engage(3));
        assert_eq!(a.take_damage(250.0), DamageOutcome::Routed);
        assert_eq!(a.current_health, 0.0);
        assert!(a.is_retreating);
        assert!(!a.is_attacking);
        assert!(a.target_defender.is_none());
        assert_eq!(a.mode(), AttackerMode::Retreating);

        // Further hits are no-ops
        let factor = a.slow_down_factor;
        assert_eq!(a.take_damage(10.0), DamageOutcome::Ignored);
        assert_eq!(a.slow_down_factor, factor);
        assert_eq!(a.current_health, 0.0);
    }

    #[test]
    fn test_begin_move_directions() {
        let mut a = attacker();
        assert!(a.begin_move());
        assert_eq!(a.target_position, 5);
        assert_eq!(a.mode(), AttackerMode::Moving);
        // Already moving
        assert!(!a.begin_move());

        let mut a = attacker();
        a.is_retreating = true;
        // At spawn there is nowhere to retreat to
        assert!(!a.begin_move());
        a.logical_position = 2;
        a.lane_coord = 2.0;
        assert!(a.begin_move());
        assert_eq!(a.target_position, 3);

        let mut a = attacker();
        a.logical_position = -1;
        a.lane_coord = -1.0;
        assert!(!a.begin_move());
    }

    #[test]
    fn test_no_move_while_attacking() {
        let mut a = attacker();
        assert!(a.engage(1));
        assert!(!a.begin_move());
        assert!(!a.is_moving);
        // And no engaging mid-step
        let mut a = attacker();
        assert!(a.begin_move());
        assert!(!a.engage(1));
    }

    #[test]
    fn test_integrate_snaps_on_arrival() {
        let mut a = attacker();
        assert!(a.begin_move());
        // 0.5 slots/s: two seconds for one slot
        let mut ticks = 0;
        while !a.integrate(SIM_DT) {
            ticks += 1;
            assert!(a.lane_coord > 5.0 && a.lane_coord < 6.0);
            assert_eq!(a.logical_position, 6);
            assert!(ticks < 100);
        }
        assert_eq!(a.lane_coord, 5.0);
        assert_eq!(a.logical_position, 5);
        assert!(!a.is_moving);
        assert!((55..=62).contains(&ticks));
    }

    #[test]
    fn test_retreat_integrates_backward() {
        let mut a = attacker();
        a.logical_position = 2;
        a.lane_coord = 2.0;
        a.is_retreating = true;
        assert!(a.begin_move());
        assert!(!a.integrate(0.5));
        assert!(a.lane_coord > 2.0);
        assert!(a.integrate(10.0));
        assert_eq!(a.lane_coord, 3.0);
        assert_eq!(a.logical_position, 3);
    }

    #[test]
    fn test_speed_floor() {
        let mut tuning = AttackerTuning::default();
        tuning.min_move_speed = 0.4;
        let mut a = Attacker::new(1, 6, -1, &tuning);
        for _ in 0..50 {
            a.take_damage(0.5);
        }
        // Factor bottoms out at 0.5, so 0.25 slots/s before the floor
        assert_eq!(a.slow_down_factor, 0.5);
        assert_eq!(a.effective_speed(), 0.4);
    }

    #[test]
    fn test_strike_until_kill() {
        let mut a = attacker();
        let mut d = defender(9);
        assert!(a.engage(9));

        assert_eq!(a.strike(0.0, &mut d), MeleeOutcome::Hit { damage: 15.0 });
        assert_eq!(a.strike(0.5, &mut d), MeleeOutcome::Waiting);
        assert_eq!(a.strike(1.0, &mut d), MeleeOutcome::Hit { damage: 15.0 });
        assert_eq!(a.strike(2.0, &mut d), MeleeOutcome::Hit { damage: 15.0 });
        assert_eq!(d.current_health, 5.0);
        assert_eq!(a.strike(3.0, &mut d), MeleeOutcome::Killed { damage: 15.0 });
        assert!(!a.is_attacking);
        assert!(a.target_defender.is_none());
        assert_eq!(a.mode(), AttackerMode::Idle);
    }

    #[test]
    fn test_strike_ignores_wrong_target() {
        let mut a = attacker();
        let mut d = defender(9);
        assert!(a.engage(4));
        assert_eq!(a.strike(0.0, &mut d), MeleeOutcome::Waiting);
        assert_eq!(d.current_health, d.max_health);
    }

    #[test]
    fn test_round_outcome() {
        let mut a = attacker();
        a.logical_position = -1;
        a.lane_coord = -1.0;
        assert_eq!(a.round_outcome(), Some(RoundOutcome::AttackerReachedGoal));

        // Not while mid-step
        a.is_moving = true;
        assert!(a.round_outcome().is_none());

        let mut a = attacker();
        a.take_damage(1000.0);
        assert_eq!(a.round_outcome(), Some(RoundOutcome::AttackerRetreated));
    }

    #[test]
    fn test_screen_position_follows_lane_coord() {
        let layout = LaneLayout::default();
        let mut a = attacker();
        assert_eq!(a.screen_position(&layout), Vec2::new(790.0, 384.0));
        a.lane_coord = 5.5;
        assert_eq!(a.screen_position(&layout), Vec2::new(740.0, 384.0));
        let bounds = a.bounds(&layout);
        assert_eq!(bounds.size(), Vec2::splat(90.0));
    }

    proptest! {
        #[test]
        fn prop_slow_down_monotonic(hits in proptest::collection::vec(0.0f32..30.0, 1..60)) {
            let mut a = Attacker::new(5, 6, -1, &AttackerTuning::default());
            let floor = AttackerTuning::default().min_slow_down_factor();
            let mut previous = a.slow_down_factor;
            for hit in hits {
                a.take_damage(hit);
                prop_assert!(a.slow_down_factor <= previous);
                prop_assert!(a.slow_down_factor >= floor);
                prop_assert!(a.current_health >= 0.0 && a.current_health <= a.max_health);
                previous = a.slow_down_factor;
            }
        }

        #[test]
        fn prop_retreat_is_one_way(hits in proptest::collection::vec(0.0f32..80.0, 1..40)) {
            let mut a = attacker();
            let mut seen = false;
            for hit in hits {
                a.take_damage(hit);
                if seen {
                    prop_assert!(a.is_retreating);
                }
                seen |= a.is_retreating;
                prop_assert!(!(a.is_moving && a.is_attacking));
            }
        }
    }
}
