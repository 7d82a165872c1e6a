//! Crossover Signals - Main Entry Point
//!
//! Replays historical prices through the crossover evaluator and runs
//! universe screens from the command line.

use anyhow::{Context, Result};
use chrono::{DateTime, NaiveDate, Utc};
use clap::{Parser, Subcommand};
use crossover_signals::config::Config;
use crossover_signals::replay::{
    CandidateSet, CsvObservationLoader, DataLoader, ReplayEngine, TracingSink,
};
use crossover_signals::strategy::{Signal, UniverseSelector};
use tracing::{info, Level};
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

/// Crossover Signals CLI
#[derive(Parser)]
#[command(name = "crossover-signals")]
#[command(version, about = "Moving-average crossover signals over historical prices")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay a price CSV through the crossover evaluator
    Replay {
        /// Path to CSV data file (timestamp,symbol,price)
        #[arg(short, long)]
        data: String,

        /// Start date (YYYY-MM-DD), defaults to the first row
        #[arg(short, long)]
        start: Option<String>,

        /// End date (YYYY-MM-DD), defaults to the last row
        #[arg(short, long)]
        end: Option<String>,

        /// Override the fast period
        #[arg(long)]
        fast: Option<usize>,

        /// Override the slow period
        #[arg(long)]
        slow: Option<usize>,

        /// Stop tracking symbols missing from a snapshot
        #[arg(long)]
        drop_missing: bool,

        /// Output directory for signals.csv
        #[arg(short, long)]
        output: Option<String>,

        /// Print the result as JSON instead of a summary
        #[arg(long)]
        json: bool,
    },

    /// Run the coarse and fine universe screens
    Screen {
        /// Path to candidates CSV (symbol,price,dollar_volume,has_fundamental_data,market_cap)
        #[arg(short, long)]
        data: String,

        /// Price CSV used to apply the momentum screen to the coarse selection
        #[arg(short, long)]
        prices: Option<String>,
    },
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    init_logging()?;

    let mut config = Config::load()?;

    match cli.command {
        Commands::Replay {
            data,
            start,
            end,
            fast,
            slow,
            drop_missing,
            output,
            json,
        } => {
            if let Some(fast) = fast {
                config.crossover.fast_period = fast;
            }
            if let Some(slow) = slow {
                config.crossover.slow_period = slow;
            }
            config.replay.drop_missing |= drop_missing;
            config.validate()?;
            log_config(&config);

            run_replay(
                &config,
                &data,
                start.as_deref(),
                end.as_deref(),
                output.as_deref(),
                json,
            )
        }
        Commands::Screen { data, prices } => {
            config.validate()?;
            log_config(&config);

            run_screen(&config, &data, prices.as_deref())
        }
    }
}

/// Initialize logging to stdout and a daily rolling file.
fn init_logging() -> Result<()> {
    use tracing_subscriber::fmt::writer::MakeWriterExt;

    std::fs::create_dir_all("logs")?;

    let file_appender = tracing_appender::rolling::daily("logs", "crossover-signals.log");
    let (file_writer, guard) = tracing_appender::non_blocking(file_appender);

    // Keep the writer flushing for the whole run
    Box::leak(Box::new(guard));

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::from_default_env()
                .add_directive("crossover_signals=debug".parse()?)
                .add_directive(Level::INFO.into()),
        )
        .with_writer(std::io::stdout.and(file_writer))
        .with_target(true)
        .with_thread_ids(false)
        .with_file(true)
        .with_line_number(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .init();

    Ok(())
}

/// Log configuration on startup.
fn log_config(config: &Config) {
    info!("📋 Configuration:");
    info!(
        "   Averages: {:?} fast {} / slow {}",
        config.crossover.mode, config.crossover.fast_period, config.crossover.slow_period
    );
    if let Some(warm_up) = config.crossover.warm_up {
        info!("   Warm-up: {} samples", warm_up);
    }
    info!(
        "   Prediction Interval: {} days",
        config.crossover.prediction_interval_days
    );
    info!(
        "   Universe: coarse {}, fine {}, momentum {}",
        config.universe.coarse_count, config.universe.fine_count, config.universe.momentum_count
    );
    info!("   Drop Missing: {}", config.replay.drop_missing);
}

fn parse_date(value: &str, end_of_day: bool) -> Result<DateTime<Utc>> {
    let date = NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .map_err(|e| anyhow::anyhow!("Invalid date '{}': {}", value, e))?;
    let time = if end_of_day {
        date.and_hms_opt(23, 59, 59)
    } else {
        date.and_hms_opt(0, 0, 0)
    };

    time.map(|t| t.and_utc())
        .with_context(|| format!("Invalid time for date '{}'", value))
}

/// Replay a price file and report the emitted signals.
fn run_replay(
    config: &Config,
    data_path: &str,
    start: Option<&str>,
    end: Option<&str>,
    output_dir: Option<&str>,
    json: bool,
) -> Result<()> {
    info!("📊 Loading data from: {}", data_path);
    let loader = CsvObservationLoader::new(data_path)?;

    let (data_start, data_end) = loader
        .available_range()
        .context("Data file has no observations")?;
    info!(
        "   Data range: {} to {}",
        data_start.format("%Y-%m-%d"),
        data_end.format("%Y-%m-%d")
    );
    info!("   Symbols: {}", loader.available_symbols().len());
    info!("   Snapshots: {}", loader.len());

    let start = match start {
        Some(s) => parse_date(s, false)?,
        None => data_start,
    };
    let end = match end {
        Some(e) => parse_date(e, true)?,
        None => data_end,
    };
    anyhow::ensure!(start <= end, "start date must not be after end date");

    let mut engine = ReplayEngine::new(loader, config)?;
    let result = engine.run(start, end, &mut TracingSink)?;

    if json {
        println!("{}", serde_json::to_string_pretty(&result)?);
    } else {
        println!("\n{}", result.summary());
    }

    if let Some(dir) = output_dir {
        std::fs::create_dir_all(dir)?;

        let signals_path = format!("{}/signals.csv", dir);
        result.signals_to_csv(&signals_path)?;
        info!("📁 Signals saved to: {}", signals_path);
    }

    Ok(())
}

/// Run the universe screens over a candidate file.
fn run_screen(config: &Config, data_path: &str, prices_path: Option<&str>) -> Result<()> {
    let candidates = CandidateSet::load(data_path)?;
    let selector = UniverseSelector::new(config.universe.clone());

    let coarse = selector.select_coarse(&candidates.coarse);
    println!("Coarse ({}): {}", coarse.len(), coarse.join(", "));

    let fine = selector.select_fine(&candidates.fine_for(&coarse));
    println!("Fine ({}): {}", fine.len(), fine.join(", "));

    if let Some(path) = prices_path {
        let loader = CsvObservationLoader::new(path)?;
        let mut engine = ReplayEngine::new(loader, config)?;
        let mut signals: Vec<Signal> = Vec::new();
        engine.run_all(&mut signals)?;

        let momentum = selector.select_momentum(&coarse, engine.evaluator());
        println!("Momentum ({}): {}", momentum.len(), momentum.join(", "));
    }

    Ok(())
}
