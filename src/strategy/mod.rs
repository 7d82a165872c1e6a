//! Signal strategy logic.
//!
//! Contains:
//! - Dual moving-average crossover evaluation per instrument
//! - Coarse, fine and momentum universe screens

mod crossover;
mod universe;

pub use crossover::{
    CrossoverEvaluator, Direction, OrderingState, SecurityChanges, Signal, TrackedInstrument,
};
pub use universe::{diff, CoarseCandidate, FineCandidate, UniverseDiff, UniverseSelector};
