//! Configuration management for crossover signals.
//!
//! Loads settings from environment variables and config files.

use crate::indicators::AverageMode;
use anyhow::{Context, Result};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// Main application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Moving-average crossover parameters
    #[serde(default)]
    pub crossover: CrossoverConfig,
    /// Universe screening criteria
    #[serde(default)]
    pub universe: UniverseConfig,
    /// Replay driver behaviour
    #[serde(default)]
    pub replay: ReplayConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CrossoverConfig {
    /// Period of the fast average
    #[serde(default = "default_fast_period")]
    pub fast_period: usize,
    /// Period of the slow average
    #[serde(default = "default_slow_period")]
    pub slow_period: usize,
    /// Simple or exponential smoothing
    #[serde(default = "default_mode")]
    pub mode: AverageMode,
    /// Samples before an exponential average is ready (defaults to its period)
    #[serde(default)]
    pub warm_up: Option<usize>,
    /// Days a signal stays active after emission
    #[serde(default = "default_prediction_interval_days")]
    pub prediction_interval_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UniverseConfig {
    /// Instruments kept by the coarse (liquidity) screen
    #[serde(default = "default_coarse_count")]
    pub coarse_count: usize,
    /// Coarse candidates must trade above this price
    #[serde(default = "default_min_price")]
    pub min_price: Decimal,
    /// Instruments kept by the fine (market cap) screen
    #[serde(default = "default_fine_count")]
    pub fine_count: usize,
    /// Exclusive lower market-cap bound for the fine screen
    #[serde(default = "default_min_market_cap")]
    pub min_market_cap: Decimal,
    /// Exclusive upper market-cap bound for the fine screen
    #[serde(default = "default_max_market_cap")]
    pub max_market_cap: Decimal,
    /// Instruments kept by the momentum (fast over slow) screen
    #[serde(default = "default_momentum_count")]
    pub momentum_count: usize,
    /// Rebalance when the day of month is divisible by this
    #[serde(default = "default_rebalance_interval_days")]
    pub rebalance_interval_days: u32,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ReplayConfig {
    /// Stop tracking instruments missing from a snapshot
    #[serde(default)]
    pub drop_missing: bool,
}

// Default value functions
fn default_fast_period() -> usize {
    5
}

fn default_slow_period() -> usize {
    25
}

fn default_mode() -> AverageMode {
    AverageMode::Exponential
}

fn default_prediction_interval_days() -> u32 {
    5
}

fn default_coarse_count() -> usize {
    500
}

fn default_min_price() -> Decimal {
    Decimal::new(5, 0) // $5
}

fn default_fine_count() -> usize {
    5
}

fn default_min_market_cap() -> Decimal {
    Decimal::new(300_000_000, 0) // $300M small-cap floor
}

fn default_max_market_cap() -> Decimal {
    Decimal::new(2_000_000_000, 0) // $2B small-cap ceiling
}

fn default_momentum_count() -> usize {
    10
}

fn default_rebalance_interval_days() -> u32 {
    5
}

impl Config {
    /// Load configuration from environment variables and config files.
    pub fn load() -> Result<Self> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(config::File::with_name("config").required(false))
            .add_source(config::Environment::default().separator("__").prefix("XSIG"))
            .build()
            .context("Failed to build configuration")?;

        config
            .try_deserialize()
            .context("Failed to deserialize configuration")
    }

    /// Validate configuration values.
    pub fn validate(&self) -> Result<()> {
        let crossover = &self.crossover;
        anyhow::ensure!(
            crossover.fast_period > 0 && crossover.slow_period > 0,
            "fast_period and slow_period must be positive"
        );

        anyhow::ensure!(
            crossover.fast_period < crossover.slow_period,
            "fast_period must be shorter than slow_period"
        );

        anyhow::ensure!(
            crossover.warm_up != Some(0),
            "warm_up must be at least one sample"
        );

        let universe = &self.universe;
        anyhow::ensure!(
            universe.coarse_count > 0 && universe.fine_count > 0 && universe.momentum_count > 0,
            "universe counts must be positive"
        );

        anyhow::ensure!(
            universe.min_market_cap >= Decimal::ZERO
                && universe.min_market_cap < universe.max_market_cap,
            "min_market_cap must be non-negative and below max_market_cap"
        );

        anyhow::ensure!(
            universe.rebalance_interval_days > 0,
            "rebalance_interval_days must be positive"
        );

        Ok(())
    }
}

impl Default for CrossoverConfig {
    fn default() -> Self {
        Self {
            fast_period: default_fast_period(),
            slow_period: default_slow_period(),
            mode: default_mode(),
            warm_up: None,
            prediction_interval_days: default_prediction_interval_days(),
        }
    }
}

impl Default for UniverseConfig {
    fn default() -> Self {
        Self {
            coarse_count: default_coarse_count(),
            min_price: default_min_price(),
            fine_count: default_fine_count(),
            min_market_cap: default_min_market_cap(),
            max_market_cap: default_max_market_cap(),
            momentum_count: default_momentum_count(),
            rebalance_interval_days: default_rebalance_interval_days(),
        }
    }
}

impl Default for ReplayConfig {
    fn default() -> Self {
        Self {
            drop_missing: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_is_valid() {
        let config = Config::default();
        assert!(config.validate().is_ok());
        assert_eq!(config.crossover.mode, AverageMode::Exponential);
    }

    #[test]
    fn test_fast_must_be_shorter_than_slow() {
        let mut config = Config::default();
        config.crossover.fast_period = 25;
        config.crossover.slow_period = 25;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_zero_warm_up_rejected() {
        let mut config = Config::default();
        config.crossover.warm_up = Some(0);
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_market_cap_bounds_must_be_ordered() {
        let mut config = Config::default();
        config.universe.min_market_cap = config.universe.max_market_cap;
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config: Config =
            serde_json::from_str(r#"{"crossover": {"fast_period": 2, "slow_period": 4, "mode": "simple"}}"#)
                .unwrap();

        assert_eq!(config.crossover.fast_period, 2);
        assert_eq!(config.crossover.mode, AverageMode::Simple);
        assert_eq!(config.crossover.prediction_interval_days, 5);
        assert_eq!(config.universe.fine_count, 5);
        assert!(!config.replay.drop_missing);
    }

    #[test]
    fn test_crossover_section_without_mode_stays_exponential() {
        let config: Config =
            serde_json::from_str(r#"{"crossover": {"fast_period": 3}}"#).unwrap();

        assert_eq!(config.crossover.fast_period, 3);
        assert_eq!(config.crossover.slow_period, 25);
        assert_eq!(config.crossover.mode, AverageMode::Exponential);
        assert_eq!(config.crossover.mode, CrossoverConfig::default().mode);
    }
}
