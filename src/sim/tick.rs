//! Fixed timestep battle tick
//!
//! Core loop that advances a round deterministically. Each tick runs, in order:
//! 1. Engagement check (defender directly ahead of a standing attacker)
//! 2. Melee resolution (a kill frees the attacker in the same tick)
//! 3. Defender fire, aimed at the attacker's current screen position
//! 4. Projectile motion and hits (in-flight shots land before movement;
//!    shots fired this tick start moving on the next one)
//! 5. Movement trigger on the step timer
//! 6. Movement integration
//! 7. On-slot strike when a step was triggered from a defended slot
//! 8. Dead defender sweep
//! 9. Round end check

use super::attacker::{DamageOutcome, MeleeOutcome};
use super::collision::Aabb;
use super::defender::DefenderBlueprint;
use super::state::{BattleState, GameEvent};
use crate::consts::{MAX_FRAME_DT, MAX_SUBSTEPS, SIM_DT};

/// A placement committed by the player
#[derive(Debug, Clone, PartialEq)]
pub struct PlacementRequest {
    pub slot: usize,
    pub blueprint: DefenderBlueprint,
}

/// Input commands for a single tick (deterministic)
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Applied before any combat step
    pub placements: Vec<PlacementRequest>,
    /// End the round at this tick boundary (quit signal)
    pub abort: bool,
}

/// Advance the battle by one timestep of `dt` seconds
pub fn tick(state: &mut BattleState, input: &TickInput, dt: f32) {
    apply_input(state, input);

    // Nothing moves outside an active round
    if !state.is_round_active() || state.attacker.is_none() {
        return;
    }

    state.time_ticks += 1;
    state.clock += f64::from(dt);
    state.move_timer += dt;
    let now = state.clock;

    engage_ahead(state);
    resolve_melee(state, now);
    let fresh = fire_defenders(state, now);
    advance_projectiles(state, dt, fresh);
    let step_origin = trigger_movement(state);
    integrate_movement(state, dt);
    if let Some(origin) = step_origin {
        strike_on_slot(state, origin);
    }
    state.sweep_dead_defenders();
    check_round_end(state);
}

/// Feed one rendered frame into the fixed-step accumulator and run the
/// ticks it covers. Input is applied once, before the first tick.
///
/// Returns the number of ticks run.
pub fn step_frame(
    state: &mut BattleState,
    input: &TickInput,
    frame_dt: f32,
    accumulator: &mut f32,
) -> u32 {
    apply_input(state, input);

    *accumulator += frame_dt.clamp(0.0, MAX_FRAME_DT);

    let empty = TickInput::default();
    let mut substeps = 0;
    while *accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
        tick(state, &empty, SIM_DT);
        *accumulator -= SIM_DT;
        substeps += 1;
    }
    substeps
}

fn apply_input(state: &mut BattleState, input: &TickInput) {
    if input.abort {
        state.abort_round();
        return;
    }
    for request in &input.placements {
        state.place_defender(request.slot, &request.blueprint);
    }
}

/// Lock onto a living defender in the slot ahead
fn engage_ahead(state: &mut BattleState) {
    let Some(attacker) = state.attacker.as_mut() else {
        return;
    };
    if !attacker.can_engage() {
        return;
    }

    let ahead = attacker.ahead_position();
    let Some(defender) = state
        .track
        .slot_at_lane(ahead)
        .and_then(|slot| slot.living_defender())
    else {
        return;
    };

    let id = defender.id;
    log::debug!("Attacker encountered {} at slot {}", defender.name, ahead);
    if attacker.engage(id) {
        state.push_event(GameEvent::MeleeEngaged {
            defender: id,
            slot: ahead as usize,
        });
    }
}

/// Strike the engaged defender; remove it on the spot if it dies
fn resolve_melee(state: &mut BattleState, now: f64) {
    let Some(attacker) = state.attacker.as_mut() else {
        return;
    };
    if !attacker.is_attacking {
        return;
    }

    let target = attacker.target_defender;
    let Some(slot) = target.and_then(|id| state.track.find_defender(id)) else {
        // Target already gone; fall back to movement
        attacker.disengage();
        return;
    };
    let Some(defender) = state
        .track
        .slot_at_mut(slot)
        .and_then(|s| s.defender.as_mut())
    else {
        return;
    };

    let outcome = attacker.strike(now, defender);
    let (id, health, max_health) = (defender.id, defender.current_health, defender.max_health);

    match outcome {
        MeleeOutcome::Waiting => {}
        MeleeOutcome::Hit { damage } => {
            log::debug!(
                "Attacker hits defender {} for {} damage ({}/{})",
                id,
                damage,
                health,
                max_health
            );
            state.push_event(GameEvent::DefenderStruck {
                defender: id,
                damage,
                health,
            });
        }
        MeleeOutcome::Killed { damage } => {
            state.push_event(GameEvent::DefenderStruck {
                defender: id,
                damage,
                health,
            });
            state.remove_defender(slot);
        }
    }
}

/// Every ready defender fires at the attacker while it is still advancing.
/// Returns how many projectiles were appended.
fn fire_defenders(state: &mut BattleState, now: f64) -> usize {
    let Some(attacker) = state.attacker.as_ref() else {
        return 0;
    };
    if attacker.is_retreating {
        return 0;
    }

    let target = attacker.screen_position(&state.tuning.layout);
    let tuning = &state.tuning.defender;
    let mut fired = Vec::new();

    for slot in state.track.slots_mut() {
        let index = slot.index;
        let Some(defender) = slot.living_defender_mut() else {
            continue;
        };
        if let Some(projectile) = defender.emit_projectile(&mut state.next_id, now, target, tuning)
        {
            log::debug!("{} in slot {} fires", defender.name, index);
            fired.push(projectile);
        }
    }

    let count = fired.len();
    for projectile in fired {
        state.push_event(GameEvent::ProjectileFired {
            projectile: projectile.id,
            defender: projectile.owner,
        });
        state.projectiles.push(projectile);
    }
    count
}

/// Move every projectile, apply hits, drop the ones that left the screen.
/// The last `fresh` entries were fired this tick and are left in place.
fn advance_projectiles(state: &mut BattleState, dt: f32, fresh: usize) {
    let layout = &state.tuning.layout;
    let area = Aabb::from_size(layout.screen_size);
    let target = state.attacker.as_ref().map(|a| a.bounds(layout));

    let in_flight = state.projectiles.len().saturating_sub(fresh);
    let mut index = 0;
    let mut hits = Vec::new();
    state.projectiles.retain_mut(|projectile| {
        index += 1;
        if index > in_flight {
            return true;
        }
        projectile.advance(dt);
        if target.is_some_and(|bounds| projectile.hits(&bounds)) {
            hits.push((projectile.id, projectile.damage));
            return false;
        }
        !projectile.is_out_of_bounds(&area)
    });

    for (projectile, damage) in hits {
        state.push_event(GameEvent::ProjectileHit { projectile, damage });
        damage_attacker(state, damage);
    }
}

/// Route damage through the attacker and report what happened
fn damage_attacker(state: &mut BattleState, damage: f32) {
    let Some(attacker) = state.attacker.as_mut() else {
        return;
    };

    let outcome = attacker.take_damage(damage);
    let health = attacker.current_health;
    let speed = attacker.slow_down_factor;

    match outcome {
        DamageOutcome::Ignored => {}
        DamageOutcome::Wounded => {
            log::debug!(
                "Attacker took {} damage: health {}, speed {:.2}x",
                damage,
                health,
                speed
            );
            state.push_event(GameEvent::AttackerDamaged { damage, health });
        }
        DamageOutcome::Routed => {
            log::info!("Attacker's health is empty, turning back");
            state.push_event(GameEvent::AttackerDamaged { damage, health });
            state.push_event(GameEvent::AttackerRetreating);
        }
    }
}

/// Start the next step once the timer is due and the attacker is free.
/// Returns the slot the attacker was standing on when the timer reset.
fn trigger_movement(state: &mut BattleState) -> Option<i32> {
    let interval = state.tuning.attacker.move_interval;
    let attacker = state.attacker.as_mut()?;
    if state.move_timer < interval || attacker.is_moving || attacker.is_attacking {
        return None;
    }

    let origin = attacker.logical_position;
    if attacker.begin_move() {
        log::debug!(
            "Attacker steps {} -> {}",
            origin,
            attacker.target_position
        );
    }
    state.move_timer = 0.0;
    Some(origin)
}

fn integrate_movement(state: &mut BattleState, dt: f32) {
    if let Some(attacker) = state.attacker.as_mut() {
        if attacker.integrate(dt) {
            log::debug!("Attacker arrived at slot {}", attacker.logical_position);
        }
    }
}

/// A defender sharing the attacker's slot gets one hit in at each step
/// boundary. Skipped whenever the attacker was locked in melee, because the
/// step timer only resets when it is free.
fn strike_on_slot(state: &mut BattleState, origin: i32) {
    let Some(attacker) = state.attacker.as_ref() else {
        return;
    };
    if attacker.is_retreating {
        return;
    }
    let Some(defender) = state
        .track
        .slot_at_lane(origin)
        .and_then(|slot| slot.living_defender())
    else {
        return;
    };

    let (id, damage) = (defender.id, defender.attack_damage());
    log::debug!("{} in slot {} strikes the attacker", defender.name, origin);
    state.push_event(GameEvent::OnSlotStrike {
        defender: id,
        damage,
    });
    damage_attacker(state, damage);
}

fn check_round_end(state: &mut BattleState) {
    let outcome = state.attacker.as_ref().and_then(|a| a.round_outcome());
    if let Some(outcome) = outcome {
        state.end_round(outcome);
    }
}
