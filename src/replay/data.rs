//! Historical observation loading for replays and screens.
//!
//! Provides CSV import for price observations and screening candidates.

use crate::indicators::Observation;
use crate::strategy::{CoarseCandidate, FineCandidate};
use anyhow::{Context, Result};
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::collections::{BTreeSet, HashMap};
use std::path::Path;

/// All observations sharing one timestamp.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketSnapshot {
    pub timestamp: DateTime<Utc>,
    pub prices: Vec<SymbolPrice>,
}

impl MarketSnapshot {
    /// Create an empty snapshot at the given timestamp.
    pub fn new(timestamp: DateTime<Utc>) -> Self {
        Self {
            timestamp,
            prices: Vec::new(),
        }
    }

    /// Symbols present in this snapshot.
    pub fn symbols(&self) -> BTreeSet<String> {
        self.prices.iter().map(|p| p.symbol.clone()).collect()
    }

    /// Get the price entry for a symbol.
    pub fn get_symbol(&self, symbol: &str) -> Option<&SymbolPrice> {
        self.prices.iter().find(|p| p.symbol == symbol)
    }

    /// The snapshot entry for a symbol as an observation.
    pub fn observation(&self, symbol: &str) -> Option<Observation> {
        self.get_symbol(symbol)
            .map(|p| Observation::new(self.timestamp, p.price))
    }
}

/// Price of one instrument within a snapshot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SymbolPrice {
    pub symbol: String,
    pub price: Decimal,
}

/// Trait for loading historical observations.
pub trait DataLoader: Send + Sync {
    /// Load all snapshots in the given time range.
    fn load_snapshots(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MarketSnapshot>>;

    /// Get the available date range in the data.
    fn available_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)>;

    /// Get all available symbols.
    fn available_symbols(&self) -> Vec<String>;
}

/// CSV loader for price observations.
///
/// Expected CSV format:
/// ```csv
/// timestamp,symbol,price
/// 2024-01-02T00:00:00Z,SPY,472.65
/// ```
///
/// Rows may appear in any order; they are grouped into snapshots sorted by
/// timestamp. Within a snapshot, rows keep file order.
#[derive(Debug, Clone)]
pub struct CsvObservationLoader {
    /// Loaded snapshots sorted by timestamp
    snapshots: Vec<MarketSnapshot>,
    /// All available symbols
    symbols: Vec<String>,
}

impl CsvObservationLoader {
    /// Load data from a CSV file.
    pub fn new<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;

        Self::from_csv_content(&content)
    }

    /// Load data from CSV content string.
    pub fn from_csv_content(content: &str) -> Result<Self> {
        let mut by_timestamp: HashMap<DateTime<Utc>, Vec<SymbolPrice>> = HashMap::new();
        let mut all_symbols: BTreeSet<String> = BTreeSet::new();
        let mut rows = 0usize;

        for (line_num, line) in content.lines().enumerate() {
            // Skip header
            if line_num == 0 && line.starts_with("timestamp") {
                continue;
            }

            if line.trim().is_empty() {
                continue;
            }

            let row = ObservationRow::parse(line)
                .with_context(|| format!("Failed to parse line {}: {}", line_num + 1, line))?;

            all_symbols.insert(row.symbol.clone());
            by_timestamp
                .entry(row.timestamp)
                .or_default()
                .push(SymbolPrice {
                    symbol: row.symbol,
                    price: row.price,
                });
            rows += 1;
        }

        if rows == 0 {
            anyhow::bail!("CSV file contains no data rows");
        }

        let mut snapshots: Vec<MarketSnapshot> = by_timestamp
            .into_iter()
            .map(|(timestamp, prices)| MarketSnapshot { timestamp, prices })
            .collect();

        snapshots.sort_by_key(|s| s.timestamp);

        Ok(Self {
            snapshots,
            symbols: all_symbols.into_iter().collect(),
        })
    }

    /// Create a loader from in-memory snapshots.
    pub fn from_snapshots(mut snapshots: Vec<MarketSnapshot>) -> Self {
        snapshots.sort_by_key(|s| s.timestamp);

        let symbols: BTreeSet<String> = snapshots
            .iter()
            .flat_map(|s| s.prices.iter().map(|p| p.symbol.clone()))
            .collect();

        Self {
            snapshots,
            symbols: symbols.into_iter().collect(),
        }
    }

    /// Get total number of snapshots.
    pub fn len(&self) -> usize {
        self.snapshots.len()
    }

    /// Check if the loader has no data.
    pub fn is_empty(&self) -> bool {
        self.snapshots.is_empty()
    }

    /// All observations for one symbol in time order.
    pub fn history(&self, symbol: &str) -> Vec<Observation> {
        self.snapshots
            .iter()
            .filter_map(|s| s.observation(symbol))
            .collect()
    }
}

impl DataLoader for CsvObservationLoader {
    fn load_snapshots(
        &self,
        start: DateTime<Utc>,
        end: DateTime<Utc>,
    ) -> Result<Vec<MarketSnapshot>> {
        let filtered: Vec<MarketSnapshot> = self
            .snapshots
            .iter()
            .filter(|s| s.timestamp >= start && s.timestamp <= end)
            .cloned()
            .collect();

        Ok(filtered)
    }

    fn available_range(&self) -> Option<(DateTime<Utc>, DateTime<Utc>)> {
        let first = self.snapshots.first()?;
        let last = self.snapshots.last()?;
        Some((first.timestamp, last.timestamp))
    }

    fn available_symbols(&self) -> Vec<String> {
        self.symbols.clone()
    }
}

/// Internal struct for parsing observation rows.
#[derive(Debug)]
struct ObservationRow {
    timestamp: DateTime<Utc>,
    symbol: String,
    price: Decimal,
}

impl ObservationRow {
    fn parse(line: &str) -> Result<Self> {
        let parts: Vec<&str> = line.split(',').collect();
        if parts.len() < 3 {
            anyhow::bail!(
                "Expected 3 columns (timestamp,symbol,price), got {}",
                parts.len()
            );
        }

        let symbol = parts[1].trim();
        if symbol.is_empty() {
            anyhow::bail!("Empty symbol");
        }

        Ok(Self {
            timestamp: parts[0]
                .trim()
                .parse()
                .with_context(|| format!("Invalid timestamp: {}", parts[0]))?,
            symbol: symbol.to_string(),
            price: parts[2]
                .trim()
                .parse()
                .with_context(|| format!("Invalid price: {}", parts[2]))?,
        })
    }
}

/// Screening candidates loaded from CSV.
///
/// Expected CSV format:
/// ```csv
/// symbol,price,dollar_volume,has_fundamental_data,market_cap
/// ACME,12.50,25000000,true,850000000
/// ```
#[derive(Debug, Clone, Default)]
pub struct CandidateSet {
    pub coarse: Vec<CoarseCandidate>,
    pub fine: Vec<FineCandidate>,
}

impl CandidateSet {
    /// Load candidates from a CSV file.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read CSV file: {}", path.display()))?;

        Self::from_csv_content(&content)
    }

    /// Load candidates from CSV content string.
    pub fn from_csv_content(content: &str) -> Result<Self> {
        let mut set = Self::default();

        for (line_num, line) in content.lines().enumerate() {
            if line_num == 0 && line.starts_with("symbol") {
                continue;
            }

            if line.trim().is_empty() {
                continue;
            }

            let (coarse, fine) = parse_candidate(line)
                .with_context(|| format!("Failed to parse line {}: {}", line_num + 1, line))?;
            set.coarse.push(coarse);
            set.fine.push(fine);
        }

        if set.coarse.is_empty() {
            anyhow::bail!("CSV file contains no candidates");
        }

        Ok(set)
    }

    /// Fine candidates restricted to the given symbols, in that order.
    pub fn fine_for(&self, symbols: &[String]) -> Vec<FineCandidate> {
        symbols
            .iter()
            .filter_map(|symbol| self.fine.iter().find(|f| &f.symbol == symbol))
            .cloned()
            .collect()
    }
}

fn parse_candidate(line: &str) -> Result<(CoarseCandidate, FineCandidate)> {
    let parts: Vec<&str> = line.split(',').map(str::trim).collect();
    if parts.len() < 5 {
        anyhow::bail!(
            "Expected 5 columns (symbol,price,dollar_volume,has_fundamental_data,market_cap), got {}",
            parts.len()
        );
    }

    let symbol = parts[0].to_string();
    let coarse = CoarseCandidate {
        symbol: symbol.clone(),
        price: parts[1]
            .parse()
            .with_context(|| format!("Invalid price: {}", parts[1]))?,
        dollar_volume: parts[2]
            .parse()
            .with_context(|| format!("Invalid dollar_volume: {}", parts[2]))?,
        has_fundamental_data: parts[3]
            .parse()
            .with_context(|| format!("Invalid has_fundamental_data: {}", parts[3]))?,
    };
    let fine = FineCandidate {
        symbol,
        market_cap: parts[4]
            .parse()
            .with_context(|| format!("Invalid market_cap: {}", parts[4]))?,
    };

    Ok((coarse, fine))
}
