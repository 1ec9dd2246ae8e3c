//! Single-symbol matching engine
//!
//! A limit order book with continuous price-time priority matching: best
//! price first, ties broken by arrival order within a price level.
//!
//! **Key invariants:**
//! - Price-time priority strictly enforced
//! - Deterministic matching (same inputs → same outputs)
//! - The priority index, the level map, and the sorted price cache stay in
//!   lock-step through every add, match, and cancel
//! - Conservation of volume: a level's total always equals the sum of its
//!   orders' remaining volumes
//!
//! A book instance is exclusively owned by its caller; no operation
//! suspends, blocks, or yields.

pub mod book;
pub mod config;
pub mod engine;
pub mod matching;

pub use config::EngineConfig;
pub use engine::{CancelResult, MatchingEngine, SubmitResult};
