//! Henhouse control core: command-line entry point.
//!
//! Replays JSON-lines telemetry (one envelope per line, from a file or
//! stdin) through the decision components and writes every outbound
//! message either as JSON lines on stdout or to the log.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                   Adapters (outer ring)                      │
//! │                                                              │
//! │  JsonFileConfig   SystemClock   JsonLinesSink  LogEventSink  │
//! │  (ConfigPort)     (Clock)       (EventSink)    (EventSink)   │
//! │                                                              │
//! │  ──────────────── Port Trait Boundary ─────────────────      │
//! │                                                              │
//! │  ┌────────────────────────────────────────────────────────┐  │
//! │  │  AlarmMonitor · LightingRegulator · FeedScheduler      │  │
//! │  └────────────────────────────────────────────────────────┘  │
//! │                                                              │
//! │  Runtime (mailboxes + LocalExecutor)                         │
//! └──────────────────────────────────────────────────────────────┘
//! ```

use std::fs::File;
use std::io::{self, BufRead, BufReader};
use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use clap::{Parser, ValueEnum};
use log::{info, warn};

use henhouse::adapters::config_file::JsonFileConfig;
use henhouse::adapters::json_lines::JsonLinesSink;
use henhouse::adapters::log_sink::LogEventSink;
use henhouse::adapters::time::SystemClock;
use henhouse::app::ports::{ConfigPort, EventSink};
use henhouse::config::SystemConfig;
use henhouse::runtime::Runtime;

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
enum Format {
    /// One JSON object per outbound message on stdout.
    Json,
    /// Outbound messages as log records.
    Log,
}

#[derive(Parser, Debug)]
#[command(name = "henhouse", version, about = "Henhouse lighting, feeding and alarm control core")]
struct Args {
    /// JSON config file (missing file = defaults)
    #[arg(short, long, default_value = "henhouse.json")]
    config: PathBuf,

    /// Telemetry input, one JSON envelope per line (default: stdin)
    #[arg(short, long)]
    input: Option<PathBuf>,

    /// Delay between input lines in milliseconds (0 = as fast as possible)
    #[arg(long, default_value_t = 0)]
    replay_interval_ms: u64,

    /// Output format for outbound messages
    #[arg(long, value_enum, default_value_t = Format::Json)]
    format: Format,

    /// Write the effective config back to the config file and exit
    #[arg(long, default_value_t = false)]
    write_config: bool,

    /// Enable verbose logging
    #[arg(short, long, default_value_t = false)]
    verbose: bool,
}

// ── Main ──────────────────────────────────────────────────────

fn main() -> Result<()> {
    let args = Args::parse();

    env_logger::Builder::from_default_env()
        .filter_level(if args.verbose {
            log::LevelFilter::Debug
        } else {
            log::LevelFilter::Info
        })
        .init();

    info!("henhouse v{}", env!("CARGO_PKG_VERSION"));

    // ── 1. Config ─────────────────────────────────────────────
    let store = JsonFileConfig::new(&args.config);
    let config = match store.load() {
        Ok(cfg) => cfg,
        Err(e) => {
            log::error!("Config {} rejected: {}", store.path().display(), e);
            return Err(e).with_context(|| format!("loading {}", store.path().display()));
        }
    };
    info!(
        "Config: {} entities, silo {}/{}, portion {}",
        config.entities.len(),
        config.feeding.initial_feed_level,
        config.feeding.silo_capacity,
        config.feeding.portion_size
    );

    if args.write_config {
        store
            .save(&config)
            .with_context(|| format!("writing {}", store.path().display()))?;
        return Ok(());
    }

    // ── 2. Input ──────────────────────────────────────────────
    let reader: Box<dyn BufRead> = match &args.input {
        Some(path) => Box::new(BufReader::new(
            File::open(path).with_context(|| format!("opening {}", path.display()))?,
        )),
        None => Box::new(BufReader::new(io::stdin())),
    };
    let lines = reader.lines().map_while(|line| {
        line.map_err(|e| warn!("IN | read failed, stopping: {}", e)).ok()
    });

    // ── 3. Run ────────────────────────────────────────────────
    let pace = Duration::from_millis(args.replay_interval_ms);
    match args.format {
        Format::Json => replay(&config, JsonLinesSink::new(io::stdout().lock()), pace, lines),
        Format::Log => replay(&config, LogEventSink::new(), pace, lines),
    }
    Ok(())
}

fn replay<S, I>(config: &SystemConfig, sink: S, pace: Duration, lines: I)
where
    S: EventSink,
    I: IntoIterator<Item = String>,
{
    let clock = SystemClock::new();
    let mut runtime = Runtime::new(config, clock, sink).with_pace(pace);
    runtime.run(lines);

    let feed = runtime.feed();
    info!(
        "Shutdown: feed {}/{}, uptime {}s",
        feed.level(),
        feed.capacity(),
        clock.uptime_secs()
    );
}
