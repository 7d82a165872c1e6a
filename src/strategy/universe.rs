//! Universe screens deciding which instruments the evaluator tracks.
//!
//! The screens are pure: they rank and filter candidate lists handed in by
//! the data feed and never touch subscriptions themselves.

use crate::config::UniverseConfig;
use crate::strategy::crossover::{CrossoverEvaluator, OrderingState};
use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use tracing::{debug, instrument};

/// Liquidity data used by the coarse screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CoarseCandidate {
    pub symbol: String,
    pub price: Decimal,
    pub dollar_volume: Decimal,
    pub has_fundamental_data: bool,
}

/// Fundamental data used by the fine screen.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct FineCandidate {
    pub symbol: String,
    pub market_cap: Decimal,
}

/// Instruments to start and stop tracking.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UniverseDiff {
    pub added: BTreeSet<String>,
    pub removed: BTreeSet<String>,
}

impl UniverseDiff {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Applies the coarse, fine and momentum screens.
pub struct UniverseSelector {
    config: UniverseConfig,
}

impl UniverseSelector {
    pub fn new(config: UniverseConfig) -> Self {
        Self { config }
    }

    /// Most liquid instruments with fundamental data and a price above the
    /// minimum, ranked by dollar volume.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub fn select_coarse(&self, candidates: &[CoarseCandidate]) -> Vec<String> {
        let mut eligible: Vec<&CoarseCandidate> = candidates
            .iter()
            .filter(|c| c.has_fundamental_data && c.price > self.config.min_price)
            .collect();

        eligible.sort_by(|a, b| b.dollar_volume.cmp(&a.dollar_volume));

        let selected: Vec<String> = eligible
            .into_iter()
            .take(self.config.coarse_count)
            .map(|c| c.symbol.clone())
            .collect();

        debug!(selected = selected.len(), "Coarse screen complete");
        selected
    }

    /// Small caps strictly inside the configured market-cap band, in input
    /// order.
    #[instrument(skip_all, fields(candidates = candidates.len()))]
    pub fn select_fine(&self, candidates: &[FineCandidate]) -> Vec<String> {
        let selected: Vec<String> = candidates
            .iter()
            .filter(|c| {
                c.market_cap > self.config.min_market_cap
                    && c.market_cap < self.config.max_market_cap
            })
            .take(self.config.fine_count)
            .map(|c| c.symbol.clone())
            .collect();

        debug!(selected = selected.len(), "Fine screen complete");
        selected
    }

    /// Ranked instruments whose fast average is above the slow one.
    pub fn select_momentum(&self, ranked: &[String], evaluator: &CrossoverEvaluator) -> Vec<String> {
        ranked
            .iter()
            .filter(|symbol| evaluator.state(symbol) == Some(OrderingState::FastAboveSlow))
            .take(self.config.momentum_count)
            .cloned()
            .collect()
    }

    /// Rebalance when the day of month is a multiple of the interval.
    pub fn is_rebalance_day(&self, at: DateTime<Utc>) -> bool {
        self.config.rebalance_interval_days > 0
            && at.day() % self.config.rebalance_interval_days == 0
    }
}

/// Changes needed to move from `current` to `next`.
pub fn diff<'a, C, N>(current: C, next: N) -> UniverseDiff
where
    C: IntoIterator<Item = &'a String>,
    N: IntoIterator<Item = &'a String>,
{
    let current: BTreeSet<String> = current.into_iter().cloned().collect();
    let next: BTreeSet<String> = next.into_iter().cloned().collect();

    UniverseDiff {
        added: next.difference(&current).cloned().collect(),
        removed: current.difference(&next).cloned().collect(),
    }
}
