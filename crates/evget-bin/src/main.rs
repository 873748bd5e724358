//! Thin demonstration entry point: wires a [`Scheduler`], a
//! [`DeviceRegistry`](evget_core::DeviceRegistry)-backed transformer, the
//! [`DatabaseManager`], and the JSON/stdout/DB sinks around a synthetic,
//! in-process event source (spec.md §1: the real platform driver is an
//! external collaborator, out of core scope, so this binary never touches
//! X11/Wayland/Win32). Configuration is a handful of env-driven knobs, not a
//! CLI surface — option parsing proper is explicitly out of scope.

mod synthetic;

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::{error, info};
use tracing_appender::non_blocking::WorkerGuard;

use evget_async::Scheduler;
use evget_core::{DatabaseManager, EventHandler, EventLoop, EventTransformer, Sink};
use evget_sink_db::DbSink;
use evget_sink_json::JsonFileSink;
use evget_sink_stdout::StdoutSink;

use synthetic::{SyntheticDeviceSnapshotSource, SyntheticEventSource};

/// Owns the rolling-file log guard for the lifetime of the process: the
/// guard must stay alive or the non-blocking writer stops flushing.
struct AppStartup {
    log_guard: Option<WorkerGuard>,
}

impl AppStartup {
    fn new() -> Self {
        Self { log_guard: None }
    }

    fn configure_logging(&mut self) -> Result<()> {
        let log_dir = std::path::Path::new(".");
        let file_appender = tracing_appender::rolling::never(log_dir, "evget.log");
        let (non_blocking, guard) = tracing_appender::non_blocking(file_appender);
        match tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_writer(non_blocking)
            .try_init()
        {
            Ok(()) => self.log_guard = Some(guard),
            Err(_) => {
                // A global subscriber is already installed (e.g. under a test
                // harness); drop the guard so the writer thread shuts down.
            }
        }
        Ok(())
    }
}

fn env_usize(name: &str, default: usize) -> usize {
    std::env::var(name).ok().and_then(|value| value.parse().ok()).unwrap_or(default)
}

fn env_duration_ms(name: &str, default_ms: u64) -> Duration {
    Duration::from_millis(std::env::var(name).ok().and_then(|value| value.parse().ok()).unwrap_or(default_ms))
}

fn main() -> Result<()> {
    let mut startup = AppStartup::new();
    startup.configure_logging()?;

    let scheduler = Scheduler::new().context("failed to build scheduler runtime")?;
    let handle = scheduler.handle();

    let size_threshold = env_usize("EVGET_FLUSH_SIZE", 32);
    let time_threshold = env_duration_ms("EVGET_FLUSH_INTERVAL_MS", 2_000);
    let synthetic_interval = env_duration_ms("EVGET_SYNTHETIC_INTERVAL_MS", 150);

    let mut sinks: Vec<Arc<dyn Sink>> = vec![Arc::new(StdoutSink::new())];

    if let Ok(json_path) = std::env::var("EVGET_JSON_PATH") {
        let sink = JsonFileSink::open(PathBuf::from(json_path)).context("failed to open JSON sink file")?;
        sinks.push(Arc::new(sink));
    }

    if let Ok(db_url) = std::env::var("EVGET_DB_URL") {
        let sink = handle.block_on(DbSink::connect(&db_url)).context("failed to connect DB sink")?;
        sinks.push(Arc::new(sink));
    }

    for sink in &sinks {
        handle.block_on(sink.init()).context("sink init failed")?;
    }

    info!(sinks = sinks.len(), size_threshold, ?time_threshold, "sinks ready");

    let manager = DatabaseManager::new(scheduler.clone(), sinks, size_threshold, time_threshold);

    let event_loop = Arc::new(EventLoop::new(SyntheticEventSource::new(synthetic_interval)));
    let transformer = EventTransformer::new(SyntheticDeviceSnapshotSource);
    let handler = EventHandler::new(transformer, manager);
    event_loop.register_listener(handler);

    let loop_for_task = event_loop.clone();
    let scheduler_for_completion = scheduler.clone();
    scheduler.spawn(
        async move { loop_for_task.start().await.err() },
        move |maybe_err: Option<evget_core::Error>| {
            if let Some(err) = maybe_err {
                error!(error = %err, "event loop terminated with an error");
            }
            scheduler_for_completion.stop();
        },
    );

    info!("evget demo pipeline running; press Ctrl+C to stop");
    handle.block_on(tokio::signal::ctrl_c()).context("failed to wait for shutdown signal")?;
    info!("shutdown signal received");

    scheduler.stop();
    event_loop.stop();
    scheduler.join();

    Ok(())
}
