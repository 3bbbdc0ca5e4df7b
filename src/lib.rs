//! # Quill Engine
//!
//! Deterministic rules engine for the Quill deck-building roguelike.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                       QUILL ENGINE                           │
//! ├─────────────────────────────────────────────────────────────┤
//! │  core/           - Deterministic primitives                  │
//! │  ├── rng.rs      - Seeded Xorshift128+ PRNG, sub-streams     │
//! │  └── hash.rs     - Seed derivation and state fingerprints    │
//! │                                                              │
//! │  content/        - Immutable definitions                     │
//! │  ├── cards.rs    - Cards, inked variants, upgrades           │
//! │  ├── actors.rs   - Enemies, allies, abilities, packs         │
//! │  ├── relics.rs   - Relics and usable items                   │
//! │  ├── events.rs   - Special-room events                       │
//! │  └── builtin.rs  - Built-in content set                      │
//! │                                                              │
//! │  combat/         - One fight                                 │
//! │  ├── piles.rs    - Draw/hand/discard/exhaust, disruption     │
//! │  ├── buffs.rs    - Buff stacking and round ticks             │
//! │  ├── damage.rs   - Damage and block math                     │
//! │  ├── resolver.rs - Effect routing                            │
//! │  ├── play.rs     - Card and item play                        │
//! │  ├── intent.rs   - Intents, forecasts, speed order           │
//! │  └── state.rs    - Turn state machine, ink powers            │
//! │                                                              │
//! │  run/            - Floors, rooms and economy                 │
//! │  ├── map.rs      - Floor map generation                      │
//! │  ├── rewards.rs  - Post-combat rewards                       │
//! │  ├── merchant.rs - Shop stock and purchases                  │
//! │  ├── events.rs   - Event resolution                          │
//! │  ├── difficulty.rs - Scaling and unlocks                     │
//! │  └── state.rs    - Run lifecycle                             │
//! │                                                              │
//! │  action.rs       - Action reducer and replay                 │
//! │  sim.rs          - Greedy autopilot                          │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Determinism Guarantee
//!
//! Everything below `action` is **100% deterministic**:
//! - No floating-point arithmetic in game logic
//! - No HashMap (uses BTreeMap for sorted iteration)
//! - No system time dependencies
//! - All randomness from seeded Xorshift128+ sub-streams
//!
//! Replaying the same action log against the same seed reaches the same
//! state, and the same state hash, on any platform.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod action;
pub mod combat;
pub mod config;
pub mod content;
pub mod core;
pub mod error;
pub mod run;
pub mod sim;

// Re-export commonly used types
pub use action::{apply_action, replay, Action};
pub use combat::{CombatPhase, CombatState};
pub use config::RulesConfig;
pub use content::Catalog;
pub use core::hash::StateHash;
pub use core::rng::SeededRng;
pub use error::{EngineError, Result};
pub use run::{create_new_run, MetaProgress, RunState, RunStatus};
pub use sim::{next_action, run_autopilot};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
