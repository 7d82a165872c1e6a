//! Streaming price indicators.
//!
//! Indicators here consume one observation at a time and keep only the state
//! they need, so they can be owned per instrument and reset cheaply.

mod moving_average;

pub use moving_average::{AverageMode, Observation, RollingAverage};
