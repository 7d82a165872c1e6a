//! # Crossover Signals
//!
//! Dual moving-average crossover signals over rolling price windows, for
//! many instruments at once.
//!
//! ## Architecture
//!
//! - `config`: Configuration management and validation
//! - `error`: Typed errors raised by the signal core
//! - `indicators`: Rolling simple and exponential moving averages
//! - `strategy`: Crossover evaluation and universe screens
//! - `replay`: CSV import and historical replay through the evaluator
//! - `utils`: Shared utilities and decimal arithmetic

pub mod config;
pub mod error;
pub mod indicators;
pub mod replay;
pub mod strategy;
pub mod utils;

pub use config::Config;
pub use error::{SignalError, SignalResult};
pub use strategy::{CrossoverEvaluator, Direction, OrderingState, Signal};
