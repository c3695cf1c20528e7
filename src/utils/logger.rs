//! Logging infrastructure
//!
//! Structured logging setup; level controlled via `RUST_LOG`.

/// Initialize the logger
pub fn init_logger() {
    init_logger_with_default("pizzaria_server=info,tower_http=info");
}

/// Initialize the logger with a fallback filter when `RUST_LOG` is unset
pub fn init_logger_with_default(default_filter: &str) {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with_target(false)
        .init();
}
