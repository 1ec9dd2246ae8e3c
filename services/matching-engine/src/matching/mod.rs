//! Matching logic: crossing predicates and trade execution

pub mod crossing;
pub mod executor;

pub use executor::MatchExecutor;
