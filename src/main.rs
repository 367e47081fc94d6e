//! Lane Siege headless runner
//!
//! Plays a run of levels with a seeded player that draws defenders from the
//! blueprint pool and drops them on random free slots. Prints the tally as JSON.

use std::fs;
use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::Parser;
use rand::seq::IndexedRandom;
use rand::{Rng, SeedableRng};
use rand_pcg::Pcg32;
use serde::Serialize;

use lane_siege::BattleTuning;
use lane_siege::consts::SIM_DT;
use lane_siege::sim::{
    BattleSnapshot, BattleState, GameEvent, PlacementRequest, RoundOutcome, TickInput, tick,
};

#[derive(Parser, Debug)]
#[command(name = "lane-siege", version, about = "Headless lane battle runner")]
struct Cli {
    /// RNG seed for blueprint draws and slot choice
    #[arg(long, default_value_t = 1)]
    seed: u64,

    /// Number of levels to play
    #[arg(long, default_value_t = 5)]
    levels: u32,

    /// Defenders drawn at the start of each level
    #[arg(long, default_value_t = 3)]
    defenders: usize,

    /// Battle tuning JSON (stock balance when omitted)
    #[arg(long)]
    tuning: Option<PathBuf>,

    /// Simulated seconds before a round is aborted
    #[arg(long, default_value_t = 600.0)]
    max_seconds: f32,

    /// Include the final battle snapshot in the report
    #[arg(long)]
    snapshot: bool,
}

#[derive(Debug, Serialize)]
struct LevelReport {
    level: u32,
    /// `None` if the round hit the time cap
    outcome: Option<RoundOutcome>,
    ticks: u64,
    placed: usize,
    lost: usize,
}

#[derive(Debug, Serialize)]
struct RunReport {
    seed: u64,
    player_score: u32,
    attacker_score: u32,
    levels: Vec<LevelReport>,
    #[serde(skip_serializing_if = "Option::is_none")]
    snapshot: Option<BattleSnapshot>,
}

fn load_tuning(path: Option<&PathBuf>) -> Result<BattleTuning> {
    let Some(path) = path else {
        return Ok(BattleTuning::default());
    };
    let text = fs::read_to_string(path)
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let tuning = BattleTuning::from_json(&text)
        .with_context(|| format!("Invalid tuning file {}", path.display()))?;
    log::info!("Loaded tuning from {}", path.display());
    Ok(tuning)
}

/// Draw blueprints and pick distinct free placeable slots for them
fn draw_placements(
    rng: &mut Pcg32,
    state: &BattleState,
    count: usize,
) -> Vec<PlacementRequest> {
    let mut free: Vec<usize> = state
        .track
        .slots()
        .iter()
        .filter(|slot| slot.placeable && slot.is_empty())
        .map(|slot| slot.index)
        .collect();

    let mut placements = Vec::new();
    while placements.len() < count && !free.is_empty() {
        let Some(blueprint) = state.tuning.blueprints.choose(rng) else {
            break;
        };
        let slot = free.swap_remove(rng.random_range(0..free.len()));
        placements.push(PlacementRequest {
            slot,
            blueprint: blueprint.clone(),
        });
    }
    placements
}

fn play_level(
    state: &mut BattleState,
    rng: &mut Pcg32,
    level: u32,
    defenders: usize,
    max_ticks: u64,
) -> LevelReport {
    state.start_round(level);

    let mut input = TickInput {
        placements: draw_placements(rng, state, defenders),
        ..Default::default()
    };
    let mut placed = 0;
    let mut lost = 0;

    while state.is_round_active() {
        if state.time_ticks >= max_ticks {
            log::warn!("Level {} hit the time cap", level);
            input.abort = true;
        }
        tick(state, &input, SIM_DT);
        input = TickInput::default();

        for event in state.drain_events() {
            match event {
                GameEvent::DefenderPlaced { .. } => placed += 1,
                GameEvent::DefenderDefeated { .. } => lost += 1,
                _ => {}
            }
        }
    }

    LevelReport {
        level,
        outcome: state.outcome(),
        ticks: state.time_ticks,
        placed,
        lost,
    }
}

fn main() -> Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    if !(cli.max_seconds > 0.0) {
        bail!("--max-seconds must be positive, got {}", cli.max_seconds);
    }

    let tuning = load_tuning(cli.tuning.as_ref())?;
    tuning.validate().context("Tuning rejected")?;

    log::info!(
        "Lane Siege starting: seed {}, {} levels",
        cli.seed,
        cli.levels
    );

    let mut rng = Pcg32::seed_from_u64(cli.seed);
    let mut state = BattleState::new(tuning);
    let max_ticks = (cli.max_seconds / SIM_DT).ceil() as u64;

    let mut report = RunReport {
        seed: cli.seed,
        player_score: 0,
        attacker_score: 0,
        levels: Vec::new(),
        snapshot: None,
    };

    for level in 1..=cli.levels {
        let result = play_level(&mut state, &mut rng, level, cli.defenders, max_ticks);
        match result.outcome {
            Some(RoundOutcome::AttackerRetreated) => report.player_score += 1,
            Some(RoundOutcome::AttackerReachedGoal) => report.attacker_score += 1,
            None => {}
        }
        log::info!(
            "Score - Player: {}, Attacker: {}",
            report.player_score,
            report.attacker_score
        );
        report.levels.push(result);
    }

    if cli.snapshot {
        report.snapshot = Some(state.snapshot());
    }

    let json = serde_json::to_string_pretty(&report).context("Failed to encode report")?;
    println!("{json}");
    Ok(())
}
