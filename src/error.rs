//! Error types for the signal core.

use chrono::{DateTime, Utc};
use thiserror::Error;

/// Errors raised by moving-average trackers and the crossover evaluator.
///
/// All of these are local and recoverable. `DuplicateInstrument` is normally
/// absorbed by the evaluator, which resets the existing entry instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SignalError {
    /// Observation timestamp is earlier than the last accepted one.
    #[error("observation at {timestamp} precedes last accepted observation at {last_accepted}")]
    InvalidObservation {
        timestamp: DateTime<Utc>,
        last_accepted: DateTime<Utc>,
    },

    /// Value requested before the warm-up condition holds.
    #[error("average (period {period}) not ready: {samples}/{required} samples")]
    NotReady {
        period: usize,
        samples: usize,
        required: usize,
    },

    /// Observation for an instrument that is not being tracked.
    #[error("unknown instrument: {0}")]
    UnknownInstrument(String),

    /// Instrument added while already tracked.
    #[error("instrument already tracked: {0}")]
    DuplicateInstrument(String),

    /// A period or warm-up count of zero.
    #[error("invalid period: {0}")]
    InvalidPeriod(String),

    /// Observation would push a running value past the representable range.
    #[error("arithmetic overflow: {0}")]
    Overflow(String),
}

pub type SignalResult<T> = Result<T, SignalError>;
