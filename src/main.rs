//! Quill Simulator
//!
//! Plays one seeded run with the greedy autopilot, then replays the action
//! log and checks the final state hash.
//!
//! Usage: `quill-sim [seed] [difficulty] [rules.json]`

use anyhow::{bail, Context};
use tracing::{info, warn};
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use quill::{create_new_run, replay, run_autopilot, Catalog, MetaProgress, RulesConfig, RunStatus, VERSION};

/// Action cap for one simulated run.
const MAX_ACTIONS: usize = 20_000;

fn main() -> anyhow::Result<()> {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let subscriber = FmtSubscriber::builder().with_env_filter(filter).finish();
    tracing::subscriber::set_global_default(subscriber).context("failed to set tracing subscriber")?;

    let mut args = std::env::args().skip(1);
    let seed = args.next().unwrap_or_else(|| "quill-demo".to_string());
    let difficulty = match args.next() {
        Some(level) => level.parse().with_context(|| format!("invalid difficulty: {level}"))?,
        None => 0,
    };
    let rules = match args.next() {
        Some(path) => {
            let json = std::fs::read_to_string(&path).with_context(|| format!("reading {path}"))?;
            RulesConfig::from_json(&json)?
        }
        None => RulesConfig::default(),
    };

    info!("Quill Simulator v{}", VERSION);
    simulate(&seed, difficulty, rules)
}

fn simulate(seed: &str, difficulty: u32, rules: RulesConfig) -> anyhow::Result<()> {
    info!("=== Starting Run ===");
    let catalog = Catalog::builtin()?;
    let run_id = uuid::Uuid::new_v4().to_string();
    // Unlock everything requested so the demo can play any level
    let meta = MetaProgress {
        max_unlocked_level: difficulty,
        ..MetaProgress::default()
    };
    let initial = create_new_run(&run_id, seed, catalog.starter_deck(), difficulty, meta, &catalog, rules)?;
    info!(run_id = %run_id, seed, difficulty = initial.difficulty, "run created");

    let (end, log) = run_autopilot(initial.clone(), &catalog, MAX_ACTIONS)?;
    match end.status {
        RunStatus::Won => info!(floor = end.floor, hp = end.hp, gold = end.gold, "run won"),
        RunStatus::Lost => info!(floor = end.floor, gold = end.gold, "run lost"),
        RunStatus::InProgress => warn!(floor = end.floor, actions = log.len(), "run unfinished"),
    }
    info!(
        actions = log.len(),
        deck = end.deck.len(),
        relics = ?end.relics,
        "=== Run Results ==="
    );

    let hash = end.compute_hash()?;
    info!("Final State Hash: {}", hex::encode(hash));

    info!("=== Verifying Determinism ===");
    let replayed = replay(initial, &log, &catalog)?;
    let replay_hash = replayed.compute_hash()?;
    info!("Replay State Hash: {}", hex::encode(replay_hash));

    if hash != replay_hash {
        bail!("determinism failure: replay hash differs");
    }
    info!("DETERMINISM VERIFIED: Hashes match!");
    Ok(())
}
