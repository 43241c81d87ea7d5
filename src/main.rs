//! Website server entry point.

use std::sync::Arc;

use anyhow::Context;
use tracing::{error, info};
use tracing_subscriber::{fmt, prelude::*, EnvFilter};

use gitops_website::api::{AppState, SiteSettings};
use gitops_website::config::Config;
use gitops_website::metrics::MetricsCollector;
use gitops_website::probe::{DependencyProbe, PostgresProbe};
use gitops_website::utils::{log_filter, shutdown_signal, DEFAULT_LOG_FILTER};
use gitops_website::Server;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = match Config::load() {
        Ok(config) => config,
        Err(e) => {
            // Nothing configured the subscriber yet; log with the defaults.
            init_tracing(&log_filter(DEFAULT_LOG_FILTER, false), false);
            error!("Failed to load configuration: {}", e);
            return Err(e).context("failed to load configuration");
        }
    };

    init_tracing(&log_filter(&config.rust_log, config.verbose), config.log_json);

    if let Err(e) = config.validate() {
        error!("Invalid configuration: {}", e);
        return Err(e.into());
    }

    let metrics = MetricsCollector::new()?;
    let mut state = AppState::new(
        metrics,
        SiteSettings {
            heading: config.site_heading.clone(),
        },
    );

    match config.database() {
        Some(db) => {
            info!(host = %db.host, port = db.port, database = %db.name, "Database check enabled");
            let probe: Arc<dyn DependencyProbe> = Arc::new(PostgresProbe::connect(&db).await);
            state = state.with_probe(probe);
        }
        None => info!("DATABASE_HOST not set, database check disabled"),
    }

    let addr = config.listen_addr()?;
    let server = match Server::bind(addr, state).await {
        Ok(server) => server,
        Err(e) => {
            error!("Failed to start HTTP server: {}", e);
            return Err(e.into());
        }
    };

    if let Err(e) = server.run(shutdown_signal()).await {
        error!("HTTP server failed: {}", e);
        return Err(e.into());
    }

    Ok(())
}

fn init_tracing(filter: &str, json: bool) {
    let registry = tracing_subscriber::registry().with(EnvFilter::new(filter));
    if json {
        registry.with(fmt::layer().json()).init();
    } else {
        registry.with(fmt::layer()).init();
    }
}
