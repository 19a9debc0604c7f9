use tracing_subscriber::{EnvFilter, Layer, fmt, layer::SubscriberExt, util::SubscriberInitExt};

/// Default filter directives: `LOG_LEVEL` for our crates, quiet dependencies.
pub(crate) fn default_filter() -> EnvFilter {
    let log_level = std::env::var("LOG_LEVEL").unwrap_or_else(|_| "info".to_string());

    EnvFilter::try_from_default_env().unwrap_or_else(|_| {
        EnvFilter::new(format!(
            "tonerdesk={level},tonerdesk_cli={level},tonerdesk_db={level},tower_http=warn,hyper=warn,sqlx=warn",
            level = log_level
        ))
    })
}

/// Initialize compact console logging for short-lived processes like the CLI.
///
/// - **Log Level**: `LOG_LEVEL` (default: "info"), overridden by `RUST_LOG`
/// - **Format**: compact, with file and line numbers
/// - **Output**: stderr, so command output on stdout stays clean
pub fn init_basic_console_logging() {
    let console_layer = fmt::layer()
        .compact()
        .with_target(true)
        .with_thread_ids(false)
        .with_thread_names(false)
        .with_file(true)
        .with_line_number(true)
        .with_writer(std::io::stderr)
        .with_filter(default_filter());

    tracing_subscriber::registry().with(console_layer).init();
}
