//! Replay engine.
//!
//! Plays historical snapshots through a crossover evaluator, deriving universe
//! changes from which symbols each snapshot carries.

use crate::config::{Config, ReplayConfig};
use crate::replay::DataLoader;
use crate::strategy::{diff, CrossoverEvaluator, Direction, Signal};
use crate::utils::decimal::round_to_precision;
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeSet;
use tracing::{debug, info, warn};

/// Consumer of emitted signals (order placement, alerting, storage).
#[cfg_attr(test, mockall::automock)]
pub trait SignalSink {
    fn on_signal(&mut self, signal: &Signal) -> Result<()>;
}

impl SignalSink for Vec<Signal> {
    fn on_signal(&mut self, signal: &Signal) -> Result<()> {
        self.push(signal.clone());
        Ok(())
    }
}

/// Logs every signal at info level.
#[derive(Debug, Default)]
pub struct TracingSink;

impl SignalSink for TracingSink {
    fn on_signal(&mut self, signal: &Signal) -> Result<()> {
        info!(
            symbol = %signal.symbol,
            direction = %signal.direction,
            timestamp = %signal.timestamp,
            fast = %signal.fast_value,
            slow = %signal.slow_value,
            "📈 Signal"
        );
        Ok(())
    }
}

/// Complete result of a replay run.
#[derive(Debug, Clone, Serialize)]
pub struct ReplayResult {
    pub signals: Vec<Signal>,
    pub start_time: DateTime<Utc>,
    pub end_time: DateTime<Utc>,
    pub snapshots_processed: usize,
    pub observations_accepted: usize,
    pub observations_rejected: usize,
    pub instruments_added: usize,
    pub instruments_reset: usize,
    pub instruments_removed: usize,
    /// Instruments with the fast average above the slow one at the end
    pub bullish: Vec<String>,
    /// Instruments with the slow average above the fast one at the end
    pub bearish: Vec<String>,
}

impl ReplayResult {
    fn count(&self, direction: Direction) -> usize {
        self.signals
            .iter()
            .filter(|s| s.direction == direction)
            .count()
    }

    /// Export emitted signals to CSV.
    pub fn signals_to_csv(&self, path: &str) -> Result<()> {
        use std::io::Write;
        let mut file = std::fs::File::create(path)
            .with_context(|| format!("Failed to create {}", path))?;
        writeln!(file, "timestamp,symbol,direction,fast,slow,spread_pct,expires_at")?;

        for signal in &self.signals {
            writeln!(
                file,
                "{},{},{},{},{},{},{}",
                signal.timestamp.to_rfc3339(),
                signal.symbol,
                signal.direction,
                signal.fast_value,
                signal.slow_value,
                round_to_precision(signal.spread_pct(), 4),
                signal.expires_at.to_rfc3339(),
            )?;
        }

        Ok(())
    }

    /// Get a summary string.
    pub fn summary(&self) -> String {
        format!(
            "Replay Period: {} to {}\nSnapshots: {}\nObservations: {} accepted, {} rejected\nInstruments: {} added, {} reset, {} removed\nSignals: {} ({} up, {} down)\nBullish at end: {}\nBearish at end: {}",
            self.start_time.format("%Y-%m-%d"),
            self.end_time.format("%Y-%m-%d"),
            self.snapshots_processed,
            self.observations_accepted,
            self.observations_rejected,
            self.instruments_added,
            self.instruments_reset,
            self.instruments_removed,
            self.signals.len(),
            self.count(Direction::Up),
            self.count(Direction::Down),
            self.bullish.join(", "),
            self.bearish.join(", "),
        )
    }
}

#[derive(Debug, Default)]
struct ReplayCounters {
    accepted: usize,
    rejected: usize,
    added: usize,
    reset: usize,
    removed: usize,
}

/// Drives a [`CrossoverEvaluator`] from a [`DataLoader`].
pub struct ReplayEngine<D: DataLoader> {
    data_loader: D,
    config: ReplayConfig,
    evaluator: CrossoverEvaluator,
    /// Symbols currently tracked by the evaluator
    universe: BTreeSet<String>,
}

impl<D: DataLoader> ReplayEngine<D> {
    /// Create a new replay engine.
    pub fn new(data_loader: D, config: &Config) -> Result<Self> {
        let evaluator = CrossoverEvaluator::new(config.crossover.clone())
            .context("Invalid crossover configuration")?;

        Ok(Self {
            data_loader,
            config: config.replay.clone(),
            evaluator,
            universe: BTreeSet::new(),
        })
    }

    pub fn evaluator(&self) -> &CrossoverEvaluator {
        &self.evaluator
    }

    /// Replay snapshots between `start` and `end` (inclusive).
    pub fn run(
        &mut self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
        sink: &mut dyn SignalSink,
    ) -> Result<ReplayResult> {
        info!(
            "Starting replay from {} to {}",
            start.format("%Y-%m-%d %H:%M"),
            end.format("%Y-%m-%d %H:%M")
        );

        let snapshots = self.data_loader.load_snapshots(start, end)?;
        let mut counters = ReplayCounters::default();
        let mut signals = Vec::new();

        for snapshot in &snapshots {
            let present = snapshot.symbols();
            let mut changes = diff(&self.universe, &present);
            if !self.config.drop_missing {
                changes.removed.clear();
            }

            if !changes.is_empty() {
                let applied = self
                    .evaluator
                    .on_securities_changed(&changes.added, &changes.removed);
                counters.added += applied.added.len();
                counters.reset += applied.reset.len();
                counters.removed += applied.removed.len();

                for symbol in &changes.removed {
                    self.universe.remove(symbol);
                }
                self.universe.extend(changes.added);
            }

            for entry in &snapshot.prices {
                match self
                    .evaluator
                    .on_observation(&entry.symbol, snapshot.timestamp, entry.price)
                {
                    Ok(Some(signal)) => {
                        counters.accepted += 1;
                        sink.on_signal(&signal).with_context(|| {
                            format!("Signal sink failed for {}", signal.symbol)
                        })?;
                        signals.push(signal);
                    }
                    Ok(None) => counters.accepted += 1,
                    Err(err) => {
                        warn!(symbol = %entry.symbol, error = %err, "Observation rejected");
                        counters.rejected += 1;
                    }
                }
            }

            debug!(
                timestamp = %snapshot.timestamp,
                tracked = self.evaluator.len(),
                "Processed snapshot"
            );
        }

        let result = ReplayResult {
            signals,
            start_time: start,
            end_time: end,
            snapshots_processed: snapshots.len(),
            observations_accepted: counters.accepted,
            observations_rejected: counters.rejected,
            instruments_added: counters.added,
            instruments_reset: counters.reset,
            instruments_removed: counters.removed,
            bullish: self.evaluator.bullish(),
            bearish: self.evaluator.bearish(),
        };

        info!(
            snapshots = result.snapshots_processed,
            signals = result.signals.len(),
            rejected = result.observations_rejected,
            "Replay complete"
        );

        Ok(result)
    }

    /// Replay every snapshot the loader holds.
    pub fn run_all(&mut self, sink: &mut dyn SignalSink) -> Result<ReplayResult> {
        let (start, end) = self
            .data_loader
            .available_range()
            .context("No data available to replay")?;
        self.run(start, end, sink)
    }
}
