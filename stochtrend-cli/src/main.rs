//! StochTrend CLI: offline replay of two bar files through the engine.
//!
//! Commands:
//! - `run`: replay slow and fast CSV bars, fill every intent on a paper
//!   account at the bar close, and write JSON lines
//! - `default-config`: print the default configuration as TOML

mod broker;
mod data;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use serde::Serialize;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use broker::PaperAccount;
use stochtrend_core::domain::{PositionSnapshot, RiskCounters, Timeframe};
use stochtrend_core::fingerprint::RunFingerprint;
use stochtrend_core::position_management::ResultEffect;
use stochtrend_core::{BarOutcome, Engine, StrategyConfig};

#[derive(Parser)]
#[command(
    name = "stochtrend",
    about = "StochTrend CLI: multi-timeframe Stochastic-RSI decision engine replay"
)]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay slow/fast bar files and write the decisions as JSON lines.
    Run {
        /// Path to a TOML config file. Defaults apply to every missing field.
        #[arg(long)]
        config: Option<PathBuf>,

        /// Slow-timeframe (trend) bars, CSV.
        #[arg(long)]
        slow: PathBuf,

        /// Fast-timeframe (signal) bars, CSV.
        #[arg(long)]
        fast: PathBuf,

        /// Starting cash of the paper account.
        #[arg(long, default_value_t = 10_000.0)]
        cash: f64,

        /// Write every fast-bar outcome, not only those with an intent.
        #[arg(long, default_value_t = false)]
        all_bars: bool,

        /// Output file. Defaults to stdout.
        #[arg(long)]
        output: Option<PathBuf>,
    },
    /// Print the default configuration as TOML.
    DefaultConfig,
}

/// One JSON line of replay output.
#[derive(Serialize)]
#[serde(tag = "record", rename_all = "snake_case")]
enum Record<'a> {
    Header {
        fingerprint: &'a RunFingerprint,
    },
    Outcome {
        outcome: &'a BarOutcome,
        #[serde(skip_serializing_if = "Option::is_none")]
        effect: Option<ResultEffect>,
    },
    Footer {
        position: PositionSnapshot,
        counters: &'a RiskCounters,
        intents: usize,
        rejected_bars: usize,
        cash: f64,
        units: f64,
    },
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run {
            config,
            slow,
            fast,
            cash,
            all_bars,
            output,
        } => run_replay(config.as_deref(), &slow, &fast, cash, all_bars, output.as_deref()),
        Commands::DefaultConfig => {
            print!("{}", StrategyConfig::default().to_toml_string()?);
            Ok(())
        }
    }
}

fn run_replay(
    config_path: Option<&Path>,
    slow_path: &Path,
    fast_path: &Path,
    cash: f64,
    all_bars: bool,
    output: Option<&Path>,
) -> Result<()> {
    let config = match config_path {
        Some(path) => StrategyConfig::load(path)
            .with_context(|| format!("failed to load config {}", path.display()))?,
        None => StrategyConfig::default(),
    };
    let slow = data::load_bars(slow_path)?;
    let fast = data::load_bars(fast_path)?;
    let fingerprint = RunFingerprint::new(&config, &slow, &fast)?;
    info!(
        config = fingerprint.config_hash.short(),
        slow_bars = slow.len(),
        fast_bars = fast.len(),
        "replay starting"
    );

    let mut engine = Engine::new(config).context("invalid strategy configuration")?;
    let mut account = PaperAccount::new(cash);

    let mut out: Box<dyn Write> = match output {
        Some(path) => Box::new(BufWriter::new(
            std::fs::File::create(path)
                .with_context(|| format!("failed to create {}", path.display()))?,
        )),
        None => Box::new(BufWriter::new(std::io::stdout().lock())),
    };
    write_record(&mut out, &Record::Header {
        fingerprint: &fingerprint,
    })?;

    let mut intents = 0;
    let mut rejected_bars = 0;
    let mut slow_iter = slow.into_iter().peekable();
    for bar in fast {
        while let Some(next) = slow_iter.next_if(|s| s.timestamp <= bar.timestamp) {
            if let Err(err) = engine.on_bar(Timeframe::Slow, next, &account) {
                warn!(%err, "slow bar skipped");
                rejected_bars += 1;
            }
        }

        let close = bar.close;
        account.mark(close);
        let outcome = match engine.on_bar(Timeframe::Fast, bar, &account) {
            Ok(outcome) => outcome,
            Err(err) => {
                warn!(%err, "fast bar skipped");
                rejected_bars += 1;
                continue;
            }
        };

        let effect = outcome.intent.as_ref().map(|intent| {
            intents += 1;
            let result = account.execute(intent, close);
            engine.on_order_result(&result)
        });
        if effect.is_some() || all_bars {
            write_record(&mut out, &Record::Outcome {
                outcome: &outcome,
                effect,
            })?;
        }
    }

    write_record(&mut out, &Record::Footer {
        position: engine.snapshot(),
        counters: engine.counters(),
        intents,
        rejected_bars,
        cash: account.cash(),
        units: account.units(),
    })?;
    out.flush()?;

    info!(intents, rejected_bars, "replay finished");
    Ok(())
}

fn write_record(out: &mut impl Write, record: &Record<'_>) -> Result<()> {
    serde_json::to_writer(&mut *out, record)?;
    out.write_all(b"\n")?;
    Ok(())
}

