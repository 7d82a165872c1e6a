//! Replay of historical observations through the crossover evaluator.
//!
//! This module provides:
//! - CSV import of price observations and screening candidates
//! - A replay engine that derives universe changes from the data
//! - The `SignalSink` seam where emitted signals leave the crate
//!
//! # Example
//!
//! ```rust,ignore
//! use crossover_signals::replay::{CsvObservationLoader, ReplayEngine, TracingSink};
//!
//! let loader = CsvObservationLoader::new("data/prices.csv")?;
//! let mut engine = ReplayEngine::new(loader, &Config::default())?;
//!
//! let result = engine.run_all(&mut TracingSink)?;
//! println!("{}", result.summary());
//! ```

mod data;
mod engine;

pub use data::{CandidateSet, CsvObservationLoader, DataLoader, MarketSnapshot, SymbolPrice};
pub use engine::{ReplayEngine, ReplayResult, SignalSink, TracingSink};
