//! Minimal stderr logger for the control loop.
//!
//! Lines look like `[elapsed LEVEL target] message`, where `target` is the
//! last path segment of the emitting module so per-cycle output stays short.
//! Use `init_with_level` to install it once at startup.

use std::io::Write;
use std::sync::OnceLock;
use std::time::Instant;

use log::{LevelFilter, Log, Metadata, Record};

#[cfg(feature = "tracing")]
use tracing_subscriber::fmt::format::FmtSpan;
#[cfg(feature = "tracing")]
use tracing_subscriber::util::SubscriberInitExt;
#[cfg(feature = "tracing")]
use tracing_subscriber::{fmt, EnvFilter};

struct CycleLogger {
    level: LevelFilter,
    started: Instant,
}

fn short_target(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

impl Log for CycleLogger {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }

        let elapsed = self.started.elapsed().as_secs_f64();
        let mut stderr = std::io::stderr().lock();
        let _ = writeln!(
            stderr,
            "[{:8.3}s {:>5} {}] {}",
            elapsed,
            record.level(),
            short_target(record.target()),
            record.args()
        );
    }

    fn flush(&self) {
        let _ = std::io::stderr().flush();
    }
}

static LOGGER: OnceLock<CycleLogger> = OnceLock::new();

/// Install the stderr logger with the provided level filter.
///
/// Calling this more than once is a no-op after the first successful
/// initialization.
pub fn init_with_level(level: LevelFilter) -> Result<(), log::SetLoggerError> {
    if LOGGER.get().is_none() {
        let logger = LOGGER.get_or_init(|| CycleLogger {
            level,
            started: Instant::now(),
        });
        log::set_logger(logger)?;
        log::set_max_level(level);
    }
    Ok(())
}

/// Crates whose spans and events share the CLI's level.
const WORKSPACE_TARGETS: [&str; 4] = [
    "rover_servo",
    "rover_servo_core",
    "rover_servo_vision",
    "rover_servo_approach",
];

/// Filter used when `RUST_LOG` is unset: dependencies at `warn`, the servo
/// crates at `level`.
pub fn default_directive(level: LevelFilter) -> String {
    let level = level.as_str().to_ascii_lowercase();
    WORKSPACE_TARGETS
        .iter()
        .fold(String::from("warn"), |mut acc, target| {
            acc.push_str(&format!(",{target}={level}"));
            acc
        })
}

/// Install a `tracing` subscriber that reports each control cycle as a span.
///
/// Span close events carry the `cycle` field and busy time. JSON output puts
/// the enclosing cycle span on every event. `RUST_LOG` replaces
/// [`default_directive`].
#[cfg(feature = "tracing")]
pub fn init_tracing(json: bool, level: LevelFilter) {
    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(default_directive(level)));
    let builder = fmt()
        .with_env_filter(filter)
        .with_span_events(FmtSpan::CLOSE)
        .with_writer(std::io::stderr);
    if json {
        let _ = builder
            .json()
            .with_current_span(true)
            .with_span_list(false)
            .flatten_event(true)
            .finish()
            .try_init();
    } else {
        let _ = builder
            .compact()
            .with_timer(fmt::time::Uptime::default())
            .finish()
            .try_init();
    }
}
