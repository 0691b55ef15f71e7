use std::fs;
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

const LOG_DIR: &str = "logs";
const LOG_FILE_PREFIX: &str = "tracker.log";
const DEFAULT_FILTER: &str = "chancay_tracker=info,warn";

/// Console output plus a daily-rotated JSON file under `logs/`.
///
/// `RUST_LOG` replaces the default filter when set.
pub fn init_logging() {
    if let Err(e) = fs::create_dir_all(LOG_DIR) {
        eprintln!("Cannot create {}: {}; file logging may fail", LOG_DIR, e);
    }

    let (file_writer, guard) =
        tracing_appender::non_blocking(tracing_appender::rolling::daily(LOG_DIR, LOG_FILE_PREFIX));

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_FILTER));

    tracing_subscriber::registry()
        .with(env_filter)
        .with(fmt::layer().json().with_writer(file_writer))
        .with(fmt::layer().with_target(true).with_writer(std::io::stdout))
        .init();

    // Flushing stops when the guard drops; the subscriber lives for the whole process
    std::mem::forget(guard);
}
