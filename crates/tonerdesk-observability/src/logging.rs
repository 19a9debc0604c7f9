use std::path::PathBuf;

use tracing_appender::non_blocking::WorkerGuard;
use tracing_appender::rolling::{RollingFileAppender, Rotation};
use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::basic_logging::default_filter;

/// Keeps the background log writers alive; drop it only at shutdown.
pub struct LogGuards {
    _guards: Vec<WorkerGuard>,
}

/// Directory for rolling log files, from `LOG_DIR` (default `storage/logs`).
pub fn log_dir() -> PathBuf {
    std::env::var("LOG_DIR")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from("storage/logs"))
}

/// Installs the global subscriber:
///
/// - compact console output filtered by `RUST_LOG` / `LOG_LEVEL`
/// - `tonerdesk.log`: errors only, plain text, rotated daily
/// - `tonerdesk.json`: info and above as JSON lines (ingestible by Loki)
///
/// If the log directory cannot be created, file layers are skipped and a
/// warning is emitted on the console.
pub fn init_tracing() -> LogGuards {
    let console_layer = fmt::layer()
        .with_target(false)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .compact()
        .with_filter(default_filter());

    let dir = log_dir();
    if let Err(e) = std::fs::create_dir_all(&dir) {
        tracing_subscriber::registry().with(console_layer).init();
        tracing::warn!(
            log_dir = %dir.display(),
            error = %e,
            "Could not create log directory, logging to console only"
        );
        return LogGuards { _guards: vec![] };
    }

    let (error_writer, error_guard) =
        tracing_appender::non_blocking(RollingFileAppender::new(Rotation::DAILY, &dir, "tonerdesk.log"));
    let file_layer = fmt::layer()
        .with_writer(error_writer)
        .with_target(false)
        .with_file(true)
        .with_line_number(true)
        .with_ansi(false)
        .with_filter(EnvFilter::new("error"));

    let (json_writer, json_guard) =
        tracing_appender::non_blocking(RollingFileAppender::new(Rotation::DAILY, &dir, "tonerdesk.json"));
    let json_layer = fmt::layer()
        .json()
        .with_writer(json_writer)
        .with_current_span(true)
        .with_span_list(true)
        .with_filter(EnvFilter::new("info"));

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .with(json_layer)
        .init();

    tracing::info!(log_dir = %dir.display(), "Tracing initialized with file logging");

    LogGuards {
        _guards: vec![error_guard, json_guard],
    }
}
