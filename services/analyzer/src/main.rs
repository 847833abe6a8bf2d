//! TickScope analyzer service
//!
//! Command-line front end for the analytics engine:
//! - `run` replays feed events (JSONL file or stdin) through the
//!   liquidity engine and streams analyses to stdout
//! - `options` prints a nearby-strike Black-Scholes report
//! - `arb` replays two-exchange quotes through the arbitrage monitor

use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};

use analytics::{
    AnomalyConfig, AnomalyDetector, EventRouter, MetricsConfig, RouterConfig, console_summary,
    decode_fields, render_json,
};
use anyhow::{Context, Result};
use arb_monitor::{ArbConfig, ArbMonitor, QuoteUpdate, render_row, table_header};
use clap::{Parser, Subcommand};
use options_pricer::{console_report, nearby_strike_report};
use rustc_hash::FxHashMap;
use services_common::{FeedEvent, Settings};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, BufReader};
use tracing::{error, info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

const SERVICE_NAME: &str = "analyzer";

/// Events between replay progress log lines
const PROGRESS_INTERVAL: u64 = 50;

/// Fallback expiry when neither the flag nor the config supplies one
const DEFAULT_DAYS_TO_EXPIRY: f64 = 30.0;

/// TickScope service CLI
#[derive(Parser)]
#[clap(name = "analyzer")]
#[clap(about = "Market microstructure analytics over replayed feed data")]
struct Cli {
    /// Path to the key=value config file
    #[clap(long, global = true, default_value = "config.txt")]
    config: PathBuf,

    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Replay feed events and stream liquidity analyses
    Run {
        /// Input JSONL file; reads stdin when omitted
        #[clap(long)]
        input: Option<PathBuf>,
    },

    /// One-shot nearby-strike options report
    Options {
        /// Spot price of the underlying
        #[clap(long)]
        spot: f64,

        /// Implied volatility as a fraction
        #[clap(long, default_value = "0.8")]
        vol: f64,

        /// Days to expiry; `default_days_to_expiry` from config when omitted
        #[clap(long)]
        days: Option<f64>,
    },

    /// Replay two-exchange quote updates and print arbitrage evaluations
    Arb {
        /// Input JSONL file; reads stdin when omitted
        #[clap(long)]
        input: Option<PathBuf>,
    },
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let cli = Cli::parse();

    match cli.command {
        Commands::Run { input } => run_replay(&cli.config, input.as_deref()).await,
        Commands::Options { spot, vol, days } => run_options(&cli.config, spot, vol, days),
        Commands::Arb { input } => run_arb(&cli.config, input.as_deref()).await,
    }
}

fn init_tracing() {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                format!("{SERVICE_NAME}=info,analytics=info,arb_monitor=info").into()
            }),
        )
        .with(
            tracing_subscriber::fmt::layer()
                .with_target(true)
                .with_line_number(true),
        )
        .init();
}

/// Replay feed events through the router, emitting analyses as they fire
async fn run_replay(config_path: &Path, input: Option<&Path>) -> Result<()> {
    let settings = load_settings_or_default(config_path);
    let symbol = settings.get_string("liq_symbol", "BTCUSDT");
    let router = EventRouter::new(router_config_from(&settings));

    info!(%symbol, "Starting liquidity analysis replay");

    let mut reader = open_input(input).await?;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut line = String::new();
    let mut events_seen = 0u64;
    let mut last_event_ms = 0u64;

    loop {
        line.clear();
        let read = tokio::select! {
            read = reader.read_line(&mut line) => read.context("reading replay input")?,
            () = &mut shutdown => {
                info!("Shutdown requested, stopping replay");
                break;
            }
        };
        if read == 0 {
            break;
        }
        let Some(event) = decode_line(&line) else {
            continue;
        };

        events_seen += 1;
        if events_seen % PROGRESS_INTERVAL == 1 {
            info!(events = events_seen, "Replay progress");
        }

        match &event {
            FeedEvent::Trade { timestamp_ms, .. } | FeedEvent::Book { timestamp_ms, .. } => {
                last_event_ms = last_event_ms.max(*timestamp_ms);
            }
            FeedEvent::Unknown => {}
        }

        match router.on_event(event) {
            Ok(outcome) => {
                if let Some(flags) = outcome.anomalies {
                    if flags.any() {
                        warn!(
                            price = flags.price,
                            size = flags.size,
                            volatility = flags.volatility,
                            "Anomalous trade"
                        );
                    }
                    let trades = router.stats().trades;
                    if AnomalyDetector::is_stats_checkpoint(trades) {
                        log_detector_state(&router);
                    }
                }
                if let Some(metrics) = outcome.analysis {
                    println!("{}", render_json(&metrics));
                }
            }
            Err(err) => warn!(%err, "Rejected event"),
        }
    }

    let stats = router.stats();
    info!(
        trades = stats.trades,
        books = stats.books,
        unknown = stats.unknown,
        rejected = stats.rejected,
        analyses = stats.analyses,
        "Replay finished"
    );

    if stats.trades > 0 {
        let now_ms = if last_event_ms > 0 {
            last_event_ms
        } else {
            wall_clock_ms()
        };
        let metrics = router.analyze_now(now_ms);
        println!("{}", console_summary(&symbol, &metrics));
    }

    Ok(())
}

/// Price a synthetic call/put pair around the given spot
fn run_options(config_path: &Path, spot: f64, vol: f64, days: Option<f64>) -> Result<()> {
    let settings = load_settings(config_path)?;
    let rate = settings
        .require_f64("risk_free_rate")
        .context("the options command needs risk_free_rate in the config")?;
    let days =
        days.unwrap_or_else(|| settings.get_f64("default_days_to_expiry", DEFAULT_DAYS_TO_EXPIRY));
    let symbol = settings.get_string("options_symbol", "BTCUSDT");

    let report = nearby_strike_report(&symbol, spot, rate, vol, days)?;
    print!("{}", console_report(&report));

    Ok(())
}

/// Replay quote updates through the monitor, printing one table row per evaluation
async fn run_arb(config_path: &Path, input: Option<&Path>) -> Result<()> {
    let settings = load_settings(config_path)?;
    let config = ArbConfig {
        min_price_diff: settings.require_f64("arb_min_price_diff")?,
        profit_threshold: settings.require_f64("arb_profit_threshold")?,
    };
    let symbol = settings.require_string("arb_symbol")?;
    let first = settings.get_string("arb_first_exchange", "binance");
    let second = settings.get_string("arb_second_exchange", "bybit");
    let mut monitor = ArbMonitor::new(first, second, config);

    info!(
        %symbol,
        first = monitor.first_exchange(),
        second = monitor.second_exchange(),
        "Starting arbitrage replay"
    );
    println!(
        "{}",
        table_header(monitor.first_exchange(), monitor.second_exchange())
    );

    let mut reader = open_input(input).await?;
    let shutdown = shutdown_signal();
    tokio::pin!(shutdown);

    let mut line = String::new();
    loop {
        line.clear();
        let read = tokio::select! {
            read = reader.read_line(&mut line) => read.context("reading replay input")?,
            () = &mut shutdown => {
                info!("Shutdown requested, stopping replay");
                break;
            }
        };
        if read == 0 {
            break;
        }
        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        let update: QuoteUpdate = match serde_json::from_str(trimmed) {
            Ok(update) => update,
            Err(err) => {
                warn!(%err, "Skipping malformed quote line");
                continue;
            }
        };

        // Anchor quote ages at the update's own clock so replays are deterministic
        let now_ms = update.timestamp_ms;
        match monitor.apply(update, now_ms) {
            Ok(Some(report)) => println!(
                "{}",
                render_row(&report, monitor.first_exchange(), monitor.second_exchange())
            ),
            Ok(None) => {}
            Err(err) => warn!(%err, "Skipping quote"),
        }
    }

    info!("Arbitrage replay finished");

    Ok(())
}

fn load_settings(path: &Path) -> Result<Settings> {
    Settings::load(path).with_context(|| format!("loading config {}", path.display()))
}

fn load_settings_or_default(path: &Path) -> Settings {
    match Settings::load(path) {
        Ok(settings) => settings,
        Err(err) => {
            warn!(%err, "Config not loaded, using built-in defaults");
            Settings::default()
        }
    }
}

/// Build router tuning from the config file, library defaults filling the gaps
fn router_config_from(settings: &Settings) -> RouterConfig {
    let defaults = RouterConfig::default();
    RouterConfig {
        ledger_capacity: settings.get_usize("liq_ledger_capacity", defaults.ledger_capacity),
        analysis_interval: settings.get_u64("liq_analysis_interval", defaults.analysis_interval),
        metrics: MetricsConfig {
            depth_levels: settings.get_usize("liq_depth_levels", defaults.metrics.depth_levels),
            vwap_target_volume: settings
                .get_f64("liq_vwap_target_volume", defaults.metrics.vwap_target_volume),
            kyle_daily_window_ms: settings.get_u64(
                "liq_kyle_daily_window_ms",
                defaults.metrics.kyle_daily_window_ms,
            ),
            kyle_hourly_window_ms: settings.get_u64(
                "liq_kyle_hourly_window_ms",
                defaults.metrics.kyle_hourly_window_ms,
            ),
            amihud_periods_days: [
                settings.get_u64(
                    "liq_amihud_short_days",
                    defaults.metrics.amihud_periods_days[0],
                ),
                settings.get_u64(
                    "liq_amihud_medium_days",
                    defaults.metrics.amihud_periods_days[1],
                ),
                settings.get_u64(
                    "liq_amihud_long_days",
                    defaults.metrics.amihud_periods_days[2],
                ),
            ],
        },
        anomaly: AnomalyConfig {
            window: settings.get_usize("liq_anomaly_window", defaults.anomaly.window),
            min_samples: settings.get_usize("liq_min_samples", defaults.anomaly.min_samples),
            ewma_lambda: settings.get_f64("liq_ewma_lambda", defaults.anomaly.ewma_lambda),
            volatility_threshold: settings.get_f64(
                "liq_volatility_threshold",
                defaults.anomaly.volatility_threshold,
            ),
            size_multiplier: settings
                .get_f64("liq_size_multiplier", defaults.anomaly.size_multiplier),
            price_deviation_multiplier: settings.get_f64(
                "liq_price_deviation_multiplier",
                defaults.anomaly.price_deviation_multiplier,
            ),
        },
    }
}

async fn open_input(input: Option<&Path>) -> Result<Box<dyn AsyncBufRead + Unpin>> {
    match input {
        Some(path) => {
            let file = tokio::fs::File::open(path)
                .await
                .with_context(|| format!("opening {}", path.display()))?;
            Ok(Box::new(BufReader::new(file)))
        }
        None => Ok(Box::new(BufReader::new(tokio::io::stdin()))),
    }
}

/// Decode one replay line: pre-tagged event JSON first, flat field maps second
fn decode_line(line: &str) -> Option<FeedEvent> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return None;
    }
    if let Ok(event) = serde_json::from_str::<FeedEvent>(trimmed) {
        return Some(event);
    }
    let Ok(raw) = serde_json::from_str::<FxHashMap<String, serde_json::Value>>(trimmed) else {
        return Some(FeedEvent::Unknown);
    };

    let mut fields = FxHashMap::default();
    for (key, value) in raw {
        let text = match value {
            serde_json::Value::String(text) => text,
            other => other.to_string(),
        };
        fields.insert(key, text);
    }

    // Field maps carry the session receive time; fall back to the local clock
    let timestamp_ms = fields
        .get("EVENT_TIME")
        .and_then(|v| v.parse().ok())
        .unwrap_or_else(wall_clock_ms);
    Some(decode_fields(&fields, timestamp_ms))
}

fn log_detector_state(router: &EventRouter) {
    let stats = router.detector_stats();
    info!(
        trades = stats.trades_seen,
        window = stats.window_len,
        average_price = stats.average_price,
        average_size = stats.average_size,
        size_threshold = stats.size_threshold,
        price_move_threshold = stats.price_move_threshold,
        "Detector state"
    );
}

fn wall_clock_ms() -> u64 {
    SystemTime::now().duration_since(UNIX_EPOCH).map_or(0, |d| {
        u64::try_from(d.as_millis()).unwrap_or(u64::MAX)
    })
}

/// Resolves on Ctrl+C or SIGTERM
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            error!("Failed to install Ctrl+C handler: {e}");
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(e) => {
                error!("Failed to install SIGTERM handler: {e}");
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => info!("Received Ctrl+C, initiating graceful shutdown"),
        () = terminate => info!("Received SIGTERM, initiating graceful shutdown"),
    }
}
