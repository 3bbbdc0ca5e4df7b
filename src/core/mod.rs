//! Core deterministic primitives.
//!
//! Everything downstream derives randomness only from [`rng::SeededRng`].

pub mod hash;
pub mod rng;

// Re-export core types
pub use hash::{hash_with_domain, StateHash, StateHasher};
pub use rng::{sub_seed, SeededRng};
