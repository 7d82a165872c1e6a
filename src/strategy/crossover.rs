//! Dual moving-average crossover evaluation across tracked instruments.
//!
//! Each tracked instrument owns a fast and a slow [`RollingAverage`]. Every
//! observation updates both; once both are ready the evaluator compares them
//! and emits a [`Signal`] only when the ordering flips:
//! - `Unknown -> FastAboveSlow | SlowAboveFast` on the first non-tie comparison
//! - `FastAboveSlow <-> SlowAboveFast` afterwards
//! - ties and repeated orderings never emit

use crate::config::CrossoverConfig;
use crate::error::{SignalError, SignalResult};
use crate::indicators::{Observation, RollingAverage};
use crate::utils::decimal::percentage_diff;
use chrono::{DateTime, Duration, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::HashMap;
use std::fmt;
use tracing::{debug, info, warn};

/// Relative position of the fast average to the slow one.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum OrderingState {
    /// At least one average is still warming up, or every comparison so far tied.
    #[default]
    Unknown,
    FastAboveSlow,
    SlowAboveFast,
}

/// Direction of an emitted signal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    /// Fast average crossed above the slow one (bullish).
    Up,
    /// Slow average crossed above the fast one (bearish).
    Down,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            Direction::Up => write!(f, "up"),
            Direction::Down => write!(f, "down"),
        }
    }
}

/// A crossover event for one instrument.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Signal {
    pub symbol: String,
    pub direction: Direction,
    /// Timestamp of the observation that caused the crossover
    pub timestamp: DateTime<Utc>,
    /// End of the prediction interval
    pub expires_at: DateTime<Utc>,
    pub fast_value: Decimal,
    pub slow_value: Decimal,
}

impl Signal {
    /// Whether `at` falls inside the signal's prediction interval.
    pub fn is_active_at(&self, at: DateTime<Utc>) -> bool {
        at >= self.timestamp && at < self.expires_at
    }

    /// Percentage gap of the fast average over the slow one.
    pub fn spread_pct(&self) -> Decimal {
        percentage_diff(self.fast_value, self.slow_value)
    }
}

/// Per-instrument averages and last known ordering.
#[derive(Debug, Clone)]
pub struct TrackedInstrument {
    symbol: String,
    fast: RollingAverage,
    slow: RollingAverage,
    state: OrderingState,
}

impl TrackedInstrument {
    fn new(symbol: String, fast: RollingAverage, slow: RollingAverage) -> Self {
        Self {
            symbol,
            fast,
            slow,
            state: OrderingState::Unknown,
        }
    }

    pub fn symbol(&self) -> &str {
        &self.symbol
    }

    pub fn fast(&self) -> &RollingAverage {
        &self.fast
    }

    pub fn slow(&self) -> &RollingAverage {
        &self.slow
    }

    pub fn state(&self) -> OrderingState {
        self.state
    }

    /// Both averages are warmed up.
    pub fn is_ready(&self) -> bool {
        self.fast.is_ready() && self.slow.is_ready()
    }

    fn reset(&mut self) {
        self.fast.reset();
        self.slow.reset();
        self.state = OrderingState::Unknown;
    }

    fn observe(
        &mut self,
        timestamp: DateTime<Utc>,
        price: Decimal,
        prediction_interval: Duration,
    ) -> SignalResult<Option<Signal>> {
        // Both averages must accept the observation or neither does.
        self.fast.check_observation(timestamp, price)?;
        self.slow.check_observation(timestamp, price)?;
        let expires_at = timestamp
            .checked_add_signed(prediction_interval)
            .ok_or_else(|| {
                SignalError::Overflow(format!(
                    "signal expiry {} + {} days is out of range",
                    timestamp,
                    prediction_interval.num_days()
                ))
            })?;

        self.fast.update(timestamp, price)?;
        self.slow.update(timestamp, price)?;

        if !self.is_ready() {
            return Ok(None);
        }

        let fast_value = self.fast.current_value()?;
        let slow_value = self.slow.current_value()?;

        let next = match fast_value.cmp(&slow_value) {
            Ordering::Greater => OrderingState::FastAboveSlow,
            Ordering::Less => OrderingState::SlowAboveFast,
            Ordering::Equal => return Ok(None),
        };

        if next == self.state {
            return Ok(None);
        }

        let previous = self.state;
        self.state = next;

        let direction = if next == OrderingState::FastAboveSlow {
            Direction::Up
        } else {
            Direction::Down
        };

        debug!(
            symbol = %self.symbol,
            ?previous,
            %direction,
            fast = %fast_value,
            slow = %slow_value,
            %timestamp,
            "Crossover signal"
        );

        Ok(Some(Signal {
            symbol: self.symbol.clone(),
            direction,
            timestamp,
            expires_at,
            fast_value,
            slow_value,
        }))
    }
}

/// Outcome of a universe change.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SecurityChanges {
    /// Newly tracked instruments
    pub added: Vec<String>,
    /// Instruments that were already tracked and have been reset
    pub reset: Vec<String>,
    /// Instruments no longer tracked
    pub removed: Vec<String>,
    /// Removals for instruments that were not tracked
    pub ignored: Vec<String>,
}

impl SecurityChanges {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty()
            && self.reset.is_empty()
            && self.removed.is_empty()
            && self.ignored.is_empty()
    }
}

/// Evaluates moving-average crossovers for a set of instruments.
///
/// Single-threaded: callers serialize access or shard instruments across
/// independent evaluators.
#[derive(Debug, Clone)]
pub struct CrossoverEvaluator {
    config: CrossoverConfig,
    /// Unused averages cloned for each new instrument
    fast_template: RollingAverage,
    slow_template: RollingAverage,
    prediction_interval: Duration,
    instruments: HashMap<String, TrackedInstrument>,
}

impl CrossoverEvaluator {
    /// Create an evaluator, failing on a zero period or warm-up count.
    pub fn new(config: CrossoverConfig) -> SignalResult<Self> {
        let fast_template = RollingAverage::with_warm_up(
            config.mode,
            config.fast_period,
            config.warm_up.unwrap_or(config.fast_period),
        )?;
        let slow_template = RollingAverage::with_warm_up(
            config.mode,
            config.slow_period,
            config.warm_up.unwrap_or(config.slow_period),
        )?;
        let prediction_interval = Duration::days(i64::from(config.prediction_interval_days));

        info!(
            fast = config.fast_period,
            slow = config.slow_period,
            mode = ?config.mode,
            "Crossover evaluator created"
        );

        Ok(Self {
            config,
            fast_template,
            slow_template,
            prediction_interval,
            instruments: HashMap::new(),
        })
    }

    pub fn config(&self) -> &CrossoverConfig {
        &self.config
    }

    /// Apply a universe change.
    ///
    /// Removals run first, so an id present in both sets ends up freshly
    /// tracked. Re-adding a tracked id resets it in place; removing an
    /// untracked id is a no-op.
    pub fn on_securities_changed<A, R>(&mut self, added: A, removed: R) -> SecurityChanges
    where
        A: IntoIterator,
        A::Item: AsRef<str>,
        R: IntoIterator,
        R::Item: AsRef<str>,
    {
        let mut changes = SecurityChanges::default();

        for symbol in removed {
            let symbol = symbol.as_ref();
            if self.untrack(symbol) {
                changes.removed.push(symbol.to_string());
            } else {
                debug!(%symbol, "Removal of untracked instrument ignored");
                changes.ignored.push(symbol.to_string());
            }
        }

        for symbol in added {
            let symbol = symbol.as_ref();
            match self.track(symbol) {
                Ok(()) => changes.added.push(symbol.to_string()),
                Err(err) => {
                    warn!(%symbol, error = %err, "Instrument re-added, averages reset");
                    changes.reset.push(symbol.to_string());
                }
            }
        }

        changes
    }

    /// Start tracking an instrument.
    ///
    /// If it is already tracked its averages and ordering are reset and
    /// `DuplicateInstrument` is returned.
    pub fn track(&mut self, symbol: &str) -> SignalResult<()> {
        if let Some(entry) = self.instruments.get_mut(symbol) {
            entry.reset();
            return Err(SignalError::DuplicateInstrument(symbol.to_string()));
        }

        self.instruments.insert(
            symbol.to_string(),
            TrackedInstrument::new(
                symbol.to_string(),
                self.fast_template.clone(),
                self.slow_template.clone(),
            ),
        );
        debug!(%symbol, "Tracking instrument");
        Ok(())
    }

    /// Stop tracking an instrument. Returns false if it was not tracked.
    pub fn untrack(&mut self, symbol: &str) -> bool {
        let removed = self.instruments.remove(symbol).is_some();
        if removed {
            debug!(%symbol, "Stopped tracking instrument");
        }
        removed
    }

    /// Feed one price observation for a tracked instrument.
    ///
    /// Returns a signal only when the fast/slow ordering changes.
    pub fn on_observation(
        &mut self,
        symbol: &str,
        timestamp: DateTime<Utc>,
        price: Decimal,
    ) -> SignalResult<Option<Signal>> {
        let prediction_interval = self.prediction_interval;
        let entry = self
            .instruments
            .get_mut(symbol)
            .ok_or_else(|| SignalError::UnknownInstrument(symbol.to_string()))?;

        entry.observe(timestamp, price, prediction_interval)
    }

    /// Prime an instrument with historical observations, tracking it first if
    /// needed.
    ///
    /// History goes through the normal observation path, so the ordering state
    /// is current afterwards. Signals raised while warming are returned; on an
    /// out-of-order entry the instrument keeps what was accepted before it.
    pub fn warm_up(&mut self, symbol: &str, history: &[Observation]) -> SignalResult<Vec<Signal>> {
        if !self.instruments.contains_key(symbol) {
            self.track(symbol)?;
        }

        let mut signals = Vec::new();
        for observation in history {
            if let Some(signal) =
                self.on_observation(symbol, observation.timestamp, observation.price)?
            {
                signals.push(signal);
            }
        }

        debug!(
            %symbol,
            observations = history.len(),
            signals = signals.len(),
            "Warmed up instrument"
        );

        Ok(signals)
    }

    /// Instruments whose fast average is currently above the slow one.
    pub fn bullish(&self) -> Vec<String> {
        self.with_state(OrderingState::FastAboveSlow)
    }

    /// Instruments whose slow average is currently above the fast one.
    pub fn bearish(&self) -> Vec<String> {
        self.with_state(OrderingState::SlowAboveFast)
    }

    fn with_state(&self, state: OrderingState) -> Vec<String> {
        let mut symbols: Vec<String> = self
            .instruments
            .values()
            .filter(|entry| entry.state == state)
            .map(|entry| entry.symbol.clone())
            .collect();
        symbols.sort();
        symbols
    }

    pub fn state(&self, symbol: &str) -> Option<OrderingState> {
        self.instruments.get(symbol).map(TrackedInstrument::state)
    }

    /// Whether both averages of a tracked instrument are warmed up.
    pub fn is_ready(&self, symbol: &str) -> SignalResult<bool> {
        self.instruments
            .get(symbol)
            .map(TrackedInstrument::is_ready)
            .ok_or_else(|| SignalError::UnknownInstrument(symbol.to_string()))
    }

    pub fn instrument(&self, symbol: &str) -> Option<&TrackedInstrument> {
        self.instruments.get(symbol)
    }

    pub fn contains(&self, symbol: &str) -> bool {
        self.instruments.contains_key(symbol)
    }

    /// Tracked instrument ids, sorted.
    pub fn symbols(&self) -> Vec<String> {
        let mut symbols: Vec<String> = self.instruments.keys().cloned().collect();
        symbols.sort();
        symbols
    }

    pub fn len(&self) -> usize {
        self.instruments.len()
    }

    pub fn is_empty(&self) -> bool {
        self.instruments.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::indicators::AverageMode;
    use chrono::TimeZone;
    use rust_decimal_macros::dec;

    fn ts(day: i64) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap() + Duration::days(day)
    }

    fn sma_config(fast: usize, slow: usize) -> CrossoverConfig {
        CrossoverConfig {
            fast_period: fast,
            slow_period: slow,
            mode: AverageMode::Simple,
            warm_up: None,
            prediction_interval_days: 5,
        }
    }

    fn evaluator_with(symbol: &str) -> CrossoverEvaluator {
        let mut evaluator = CrossoverEvaluator::new(sma_config(2, 4)).unwrap();
        evaluator.track(symbol).unwrap();
        evaluator
    }

    /// Feed prices on consecutive days starting at `start_day`.
    fn feed(
        evaluator: &mut CrossoverEvaluator,
        symbol: &str,
        start_day: i64,
        prices: &[Decimal],
    ) -> Vec<Option<Signal>> {
        prices
            .iter()
            .enumerate()
            .map(|(i, price)| {
                evaluator
                    .on_observation(symbol, ts(start_day + i as i64), *price)
                    .unwrap()
            })
            .collect()
    }

    #[test]
    fn test_zero_period_rejected() {
        let result = CrossoverEvaluator::new(sma_config(0, 4));
        assert!(matches!(result, Err(SignalError::InvalidPeriod(_))));
    }

    #[test]
    fn test_first_signal_is_up_after_slow_window_fills() {
        let mut evaluator = evaluator_with("SPY");
        let prices = [
            dec!(1), dec!(1), dec!(1), dec!(1),
            dec!(10), dec!(10), dec!(10), dec!(10),
        ];

        let results = feed(&mut evaluator, "SPY", 0, &prices);

        // Nothing before four observations; the fourth is a 1 == 1 tie
        assert!(results[..4].iter().all(Option::is_none));
        assert_eq!(evaluator.state("SPY"), Some(OrderingState::FastAboveSlow));

        let signal = results[4].as_ref().expect("crossover on fifth observation");
        assert_eq!(signal.direction, Direction::Up);
        assert_eq!(signal.timestamp, ts(4));
        assert_eq!(signal.fast_value, dec!(5.5));
        assert_eq!(signal.slow_value, dec!(3.25));

        // Ordering never flips afterwards
        assert!(results[5..].iter().all(Option::is_none));
    }

    #[test]
    fn test_flat_prices_after_crossover_never_signal_again() {
        let mut evaluator = evaluator_with("SPY");
        let mut prices = vec![dec!(1); 4];
        prices.extend(vec![dec!(10); 20]);

        let signals: Vec<Signal> = feed(&mut evaluator, "SPY", 0, &prices)
            .into_iter()
            .flatten()
            .collect();

        assert_eq!(signals.len(), 1);
        assert_eq!(signals[0].direction, Direction::Up);
        // Averages have converged to a tie, state is held
        assert_eq!(evaluator.state("SPY"), Some(OrderingState::FastAboveSlow));
    }

    #[test]
    fn test_down_crossover_after_up() {
        let mut evaluator = evaluator_with("QQQ");
        let prices = [
            dec!(1), dec!(1), dec!(1), dec!(1),
            dec!(10), dec!(10), dec!(10), dec!(10),
            dec!(1),
        ];

        let signals: Vec<Signal> = feed(&mut evaluator, "QQQ", 0, &prices)
            .into_iter()
            .flatten()
            .collect();

        assert_eq!(signals.len(), 2);
        assert_eq!(signals[0].direction, Direction::Up);
        assert_eq!(signals[1].direction, Direction::Down);
        // fast = (10 + 1) / 2, slow = (10 + 10 + 10 + 1) / 4
        assert_eq!(signals[1].fast_value, dec!(5.5));
        assert_eq!(signals[1].slow_value, dec!(7.75));
        assert_eq!(evaluator.state("QQQ"), Some(OrderingState::SlowAboveFast));
    }

    #[test]
    fn test_ties_keep_unknown_state() {
        let mut evaluator = evaluator_with("FLAT");
        let results = feed(&mut evaluator, "FLAT", 0, &[dec!(7); 10]);

        assert!(results.iter().all(Option::is_none));
        assert!(evaluator.is_ready("FLAT").unwrap());
        assert_eq!(evaluator.state("FLAT"), Some(OrderingState::Unknown));
    }

    #[test]
    fn test_unknown_instrument() {
        let mut evaluator = CrossoverEvaluator::new(sma_config(2, 4)).unwrap();
        let err = evaluator.on_observation("NOPE", ts(0), dec!(1)).unwrap_err();
        assert_eq!(err, SignalError::UnknownInstrument("NOPE".to_string()));
        assert!(evaluator.is_ready("NOPE").is_err());
    }

    #[test]
    fn test_out_of_order_observation_leaves_state_unchanged() {
        let mut evaluator = evaluator_with("SPY");
        feed(&mut evaluator, "SPY", 10, &[dec!(1), dec!(2), dec!(3)]);

        let err = evaluator.on_observation("SPY", ts(5), dec!(100)).unwrap_err();
        assert!(matches!(err, SignalError::InvalidObservation { .. }));

        let entry = evaluator.instrument("SPY").unwrap();
        assert_eq!(entry.fast().samples(), 3);
        assert_eq!(entry.slow().samples(), 3);
        assert_eq!(entry.fast().current_value().unwrap(), dec!(2.5));
    }

    #[test]
    fn test_readding_removed_instrument_starts_cold() {
        let mut evaluator = evaluator_with("SPY");
        feed(&mut evaluator, "SPY", 0, &[dec!(1), dec!(2), dec!(3), dec!(4)]);
        assert!(evaluator.is_ready("SPY").unwrap());

        let removed = evaluator.on_securities_changed(Vec::<String>::new(), ["SPY"]);
        assert_eq!(removed.removed, vec!["SPY".to_string()]);
        assert!(!evaluator.contains("SPY"));

        let added = evaluator.on_securities_changed(["SPY"], Vec::<String>::new());
        assert_eq!(added.added, vec!["SPY".to_string()]);
        assert!(!evaluator.is_ready("SPY").unwrap());
        assert_eq!(evaluator.state("SPY"), Some(OrderingState::Unknown));
    }

    #[test]
    fn test_duplicate_add_resets_in_place() {
        let mut evaluator = evaluator_with("SPY");
        let prices = [dec!(1), dec!(1), dec!(1), dec!(1), dec!(10)];
        feed(&mut evaluator, "SPY", 0, &prices);
        assert_eq!(evaluator.state("SPY"), Some(OrderingState::FastAboveSlow));

        let changes = evaluator.on_securities_changed(["SPY"], Vec::<String>::new());
        assert_eq!(changes.reset, vec!["SPY".to_string()]);
        assert!(changes.added.is_empty());

        assert_eq!(evaluator.len(), 1);
        assert!(!evaluator.is_ready("SPY").unwrap());
        assert_eq!(evaluator.state("SPY"), Some(OrderingState::Unknown));

        assert_eq!(
            evaluator.track("SPY"),
            Err(SignalError::DuplicateInstrument("SPY".to_string()))
        );
    }

    #[test]
    fn test_removing_untracked_is_noop() {
        let mut evaluator = evaluator_with("SPY");
        let changes = evaluator.on_securities_changed(Vec::<String>::new(), ["GHOST"]);

        assert_eq!(changes.ignored, vec!["GHOST".to_string()]);
        assert!(changes.removed.is_empty());
        assert_eq!(evaluator.symbols(), vec!["SPY".to_string()]);
    }

    #[test]
    fn test_removal_applied_before_addition() {
        let mut evaluator = evaluator_with("SPY");
        feed(&mut evaluator, "SPY", 0, &[dec!(1), dec!(2), dec!(3), dec!(4)]);

        let changes = evaluator.on_securities_changed(["SPY", "IWM"], ["SPY"]);

        assert_eq!(changes.removed, vec!["SPY".to_string()]);
        assert_eq!(changes.added, vec!["SPY".to_string(), "IWM".to_string()]);
        assert!(!evaluator.is_ready("SPY").unwrap());
        assert_eq!(evaluator.len(), 2);
    }

    #[test]
    fn test_signal_expiry_follows_prediction_interval() {
        let mut evaluator = evaluator_with("SPY");
        let prices = [dec!(1), dec!(1), dec!(1), dec!(1), dec!(10)];
        let signal = feed(&mut evaluator, "SPY", 0, &prices)
            .into_iter()
            .flatten()
            .next()
            .unwrap();

        assert_eq!(signal.expires_at, ts(4) + Duration::days(5));
        assert!(signal.is_active_at(ts(4)));
        assert!(signal.is_active_at(ts(8)));
        assert!(!signal.is_active_at(ts(9)));
        assert!(!signal.is_active_at(ts(3)));
        // (5.5 - 3.25) / 3.25 * 100
        assert!(signal.spread_pct() > dec!(69) && signal.spread_pct() < dec!(70));
    }

    #[test]
    fn test_warm_up_sets_ordering_from_history() {
        let mut evaluator = CrossoverEvaluator::new(sma_config(2, 4)).unwrap();
        let history: Vec<Observation> = [1, 1, 1, 1, 10, 10]
            .iter()
            .enumerate()
            .map(|(day, price)| Observation::new(ts(day as i64), Decimal::from(*price)))
            .collect();

        let signals = evaluator.warm_up("SPY", &history).unwrap();

        assert_eq!(signals.len(), 1);
        assert!(evaluator.is_ready("SPY").unwrap());
        assert_eq!(evaluator.bullish(), vec!["SPY".to_string()]);

        // Live data continuing the same trend does not repeat the signal
        let next = evaluator.on_observation("SPY", ts(6), dec!(10)).unwrap();
        assert!(next.is_none());
    }

    #[test]
    fn test_bullish_and_bearish_screens() {
        let mut evaluator = CrossoverEvaluator::new(sma_config(2, 4)).unwrap();
        for symbol in ["UP", "DOWN", "COLD"] {
            evaluator.track(symbol).unwrap();
        }

        feed(&mut evaluator, "UP", 0, &[dec!(1), dec!(1), dec!(1), dec!(1), dec!(5)]);
        feed(&mut evaluator, "DOWN", 0, &[dec!(5), dec!(5), dec!(5), dec!(5), dec!(1)]);
        feed(&mut evaluator, "COLD", 0, &[dec!(5)]);

        assert_eq!(evaluator.bullish(), vec!["UP".to_string()]);
        assert_eq!(evaluator.bearish(), vec!["DOWN".to_string()]);
        assert_eq!(evaluator.state("COLD"), Some(OrderingState::Unknown));
    }

    #[test]
    fn test_exponential_mode_crossover() {
        let config = CrossoverConfig {
            fast_period: 1,
            slow_period: 3,
            mode: AverageMode::Exponential,
            warm_up: None,
            prediction_interval_days: 5,
        };
        let mut evaluator = CrossoverEvaluator::new(config).unwrap();
        evaluator.track("BTC").unwrap();

        // slow: 2 -> 2 -> 2 (ready); fast tracks price exactly
        let results = feed(&mut evaluator, "BTC", 0, &[dec!(2), dec!(2), dec!(2), dec!(4)]);

        assert!(results[..3].iter().all(Option::is_none));
        let signal = results[3].as_ref().unwrap();
        assert_eq!(signal.direction, Direction::Up);
        assert_eq!(signal.fast_value, dec!(4));
        assert_eq!(signal.slow_value, dec!(3));
    }

    #[test]
    fn test_evaluator_is_send() {
        fn assert_send<T: Send>() {}
        assert_send::<CrossoverEvaluator>();
    }

    #[test]
    fn test_unrepresentable_expiry_rejected_without_side_effects() {
        let config = CrossoverConfig {
            prediction_interval_days: u32::MAX,
            ..sma_config(2, 4)
        };
        let mut evaluator = CrossoverEvaluator::new(config).unwrap();
        evaluator.track("SPY").unwrap();

        let err = evaluator.on_observation("SPY", ts(0), dec!(1)).unwrap_err();
        assert!(matches!(err, SignalError::Overflow(_)));

        let entry = evaluator.instrument("SPY").unwrap();
        assert_eq!(entry.fast().samples(), 0);
        assert_eq!(entry.slow().samples(), 0);
        assert_eq!(entry.state(), OrderingState::Unknown);
    }

    #[test]
    fn test_overflowing_price_keeps_averages_in_step() {
        let mut evaluator = CrossoverEvaluator::new(sma_config(1, 4)).unwrap();
        evaluator.track("SPY").unwrap();
        feed(&mut evaluator, "SPY", 0, &[Decimal::MAX]);

        // The one-slot fast window would accept it; the slow window cannot
        let err = evaluator.on_observation("SPY", ts(1), Decimal::MAX).unwrap_err();
        assert!(matches!(err, SignalError::Overflow(_)));

        let entry = evaluator.instrument("SPY").unwrap();
        assert_eq!(entry.fast().samples(), 1);
        assert_eq!(entry.slow().samples(), 1);
    }
}
