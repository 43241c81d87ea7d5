//! Utility functions.

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

/// Log filter used when none is configured or the configured one is invalid.
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Log filter used when verbose logging is requested.
pub const VERBOSE_LOG_FILTER: &str = "gitops_website=debug,info";

/// Pick the tracing filter directive for the given settings.
pub fn log_filter(rust_log: &str, verbose: bool) -> String {
    if verbose {
        return VERBOSE_LOG_FILTER.to_string();
    }
    match EnvFilter::try_new(rust_log) {
        Ok(_) => rust_log.to_string(),
        Err(_) => DEFAULT_LOG_FILTER.to_string(),
    }
}

/// Format used for the server time on the index page.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Current local time formatted for display.
pub fn local_timestamp() -> String {
    chrono::Local::now().format(TIMESTAMP_FORMAT).to_string()
}

/// Resolve when the process receives Ctrl+C or SIGTERM.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!("Failed to listen for Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("Failed to listen for SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received");
}
