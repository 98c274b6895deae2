//! Core types and contracts for the chess search engine
//!
//! This crate provides everything the search needs that is not the search
//! itself:
//! - `Square`, `Move`, `MoveKey`: geometric move identity, independent of
//!   board occupancy
//! - `GameState`: the contract a concrete rules engine implements
//! - `MoveIndex`: the fixed, reproducible bijection between canonical moves
//!   and slots of the policy vector
//!
//! The move index is built once from pure board geometry and is immutable
//! afterwards, so a single instance can back any number of concurrent
//! searches without synchronization.

pub mod game;
pub mod index;
pub mod moves;

// Re-export main types for convenience
pub use game::{Color, GameState, GameStatus};
pub use index::{MoveCounts, MoveIndex};
pub use moves::{Move, MoveFlag, MoveKey, Role, Square};
