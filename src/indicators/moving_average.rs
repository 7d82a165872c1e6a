//! Rolling simple and exponential moving averages.

use crate::error::{SignalError, SignalResult};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::VecDeque;

/// A single timestamped price.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Observation {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

impl Observation {
    pub fn new(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}

/// Smoothing applied by a [`RollingAverage`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AverageMode {
    /// Arithmetic mean of the last `period` prices.
    #[default]
    Simple,
    /// Exponential smoothing with factor `2 / (period + 1)`.
    Exponential,
}

/// A moving average over a fixed window of observations.
///
/// Observations must arrive with non-decreasing timestamps; anything earlier
/// than the last accepted observation is rejected and leaves the average
/// untouched.
#[derive(Debug, Clone)]
pub struct RollingAverage {
    mode: AverageMode,
    /// Window length (simple) or smoothing period (exponential)
    period: usize,
    /// Samples required before an exponential average reports ready
    warm_up: usize,
    /// Most recent prices, oldest first (simple mode only)
    window: VecDeque<Decimal>,
    /// Running sum of `window`
    sum: Decimal,
    /// Running smoothed value (exponential mode only)
    smoothed: Option<Decimal>,
    /// Observations accepted since construction or the last reset
    samples: usize,
    last_timestamp: Option<DateTime<Utc>>,
}

impl RollingAverage {
    /// Create an average of the given mode. Exponential averages warm up over
    /// `period` samples.
    pub fn new(mode: AverageMode, period: usize) -> SignalResult<Self> {
        Self::with_warm_up(mode, period, period)
    }

    /// Create a simple moving average over `period` observations.
    pub fn simple(period: usize) -> SignalResult<Self> {
        Self::new(AverageMode::Simple, period)
    }

    /// Create an exponential moving average with smoothing period `period`.
    pub fn exponential(period: usize) -> SignalResult<Self> {
        Self::new(AverageMode::Exponential, period)
    }

    /// Create an average with an explicit warm-up count.
    ///
    /// The warm-up count only affects exponential mode; a simple average is
    /// ready exactly when its window is full.
    pub fn with_warm_up(mode: AverageMode, period: usize, warm_up: usize) -> SignalResult<Self> {
        if period == 0 {
            return Err(SignalError::InvalidPeriod(
                "moving average period must be positive".to_string(),
            ));
        }
        if mode == AverageMode::Exponential && warm_up == 0 {
            return Err(SignalError::InvalidPeriod(
                "exponential warm-up must be at least one sample".to_string(),
            ));
        }

        Ok(Self {
            mode,
            period,
            warm_up,
            window: VecDeque::new(),
            sum: Decimal::ZERO,
            smoothed: None,
            samples: 0,
            last_timestamp: None,
        })
    }

    /// Feed one observation.
    pub fn update(&mut self, timestamp: DateTime<Utc>, price: Decimal) -> SignalResult<()> {
        self.check_timestamp(timestamp)?;

        match self.mode {
            AverageMode::Simple => {
                self.sum = self.next_sum(price)?;
                self.window.push_back(price);
                if self.window.len() > self.period {
                    self.window.pop_front();
                }
            }
            AverageMode::Exponential => {
                self.smoothed = Some(self.next_smoothed(price)?);
            }
        }

        self.samples += 1;
        self.last_timestamp = Some(timestamp);
        Ok(())
    }

    /// Check that `update` would accept this observation, without applying it.
    pub fn check_observation(&self, timestamp: DateTime<Utc>, price: Decimal) -> SignalResult<()> {
        self.check_timestamp(timestamp)?;

        match self.mode {
            AverageMode::Simple => self.next_sum(price).map(|_| ()),
            AverageMode::Exponential => self.next_smoothed(price).map(|_| ()),
        }
    }

    /// Reject observations older than the last accepted one.
    ///
    /// Equal timestamps are allowed.
    pub fn check_timestamp(&self, timestamp: DateTime<Utc>) -> SignalResult<()> {
        match self.last_timestamp {
            Some(last_accepted) if timestamp < last_accepted => {
                Err(SignalError::InvalidObservation {
                    timestamp,
                    last_accepted,
                })
            }
            _ => Ok(()),
        }
    }

    /// Window sum after pushing `price` and evicting the oldest entry if full.
    fn next_sum(&self, price: Decimal) -> SignalResult<Decimal> {
        let evicted = if self.window.len() >= self.period {
            self.window.front().copied()
        } else {
            None
        };

        self.sum
            .checked_sub(evicted.unwrap_or(Decimal::ZERO))
            .and_then(|sum| sum.checked_add(price))
            .ok_or_else(|| self.overflow(price))
    }

    fn next_smoothed(&self, price: Decimal) -> SignalResult<Decimal> {
        let Some(previous) = self.smoothed else {
            return Ok(price);
        };

        let alpha = self.smoothing_factor();
        price
            .checked_mul(alpha)
            .zip(previous.checked_mul(Decimal::ONE - alpha))
            .and_then(|(weighted, carried)| weighted.checked_add(carried))
            .ok_or_else(|| self.overflow(price))
    }

    fn overflow(&self, price: Decimal) -> SignalError {
        SignalError::Overflow(format!(
            "price {} overflows {:?} average (period {})",
            price, self.mode, self.period
        ))
    }

    /// Current average, or `NotReady` during warm-up.
    pub fn current_value(&self) -> SignalResult<Decimal> {
        if !self.is_ready() {
            return Err(SignalError::NotReady {
                period: self.period,
                samples: self.samples,
                required: self.required_samples(),
            });
        }

        match self.mode {
            AverageMode::Simple => Ok(self.sum / Decimal::from(self.window.len())),
            AverageMode::Exponential => self.smoothed.ok_or(SignalError::NotReady {
                period: self.period,
                samples: self.samples,
                required: self.required_samples(),
            }),
        }
    }

    pub fn is_ready(&self) -> bool {
        match self.mode {
            AverageMode::Simple => self.window.len() >= self.period,
            AverageMode::Exponential => self.smoothed.is_some() && self.samples >= self.warm_up,
        }
    }

    /// Drop all buffered state, including the last accepted timestamp.
    pub fn reset(&mut self) {
        self.window.clear();
        self.sum = Decimal::ZERO;
        self.smoothed = None;
        self.samples = 0;
        self.last_timestamp = None;
    }

    /// Smoothing factor `2 / (period + 1)` used in exponential mode.
    pub fn smoothing_factor(&self) -> Decimal {
        Decimal::TWO / (Decimal::from(self.period) + Decimal::ONE)
    }

    pub fn mode(&self) -> AverageMode {
        self.mode
    }

    pub fn period(&self) -> usize {
        self.period
    }

    /// Observations accepted since construction or the last reset.
    pub fn samples(&self) -> usize {
        self.samples
    }

    pub fn last_timestamp(&self) -> Option<DateTime<Utc>> {
        self.last_timestamp
    }

    fn required_samples(&self) -> usize {
        match self.mode {
            AverageMode::Simple => self.period,
            AverageMode::Exponential => self.warm_up,
        }
    }
}
