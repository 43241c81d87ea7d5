//! HTTP API handlers.

use std::sync::Arc;

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{Html, IntoResponse},
};

use crate::metrics::{MetricsCollector, EXPOSITION_CONTENT_TYPE};
use crate::page::{render_page, PageContext};
use crate::probe::DependencyProbe;
use crate::utils::local_timestamp;

/// Static settings for the index page.
#[derive(Debug, Clone)]
pub struct SiteSettings {
    /// Page heading.
    pub heading: String,
}

/// Application state shared with handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Metrics registry.
    pub metrics: MetricsCollector,
    /// Optional database connectivity check.
    pub probe: Option<Arc<dyn DependencyProbe>>,
    /// Page settings.
    pub site: Arc<SiteSettings>,
}

impl AppState {
    /// Create new app state.
    pub fn new(metrics: MetricsCollector, site: SiteSettings) -> Self {
        Self {
            metrics,
            probe: None,
            site: Arc::new(site),
        }
    }

    /// Attach a dependency probe shown on the index page.
    pub fn with_probe(mut self, probe: Arc<dyn DependencyProbe>) -> Self {
        self.probe = Some(probe);
        self
    }
}

/// Index page handler - always returns 200, even when the database is down.
pub async fn index(State(state): State<AppState>) -> Html<String> {
    let dependency = match &state.probe {
        Some(probe) => {
            let status = probe.check().await;
            state.metrics.record_probe(&status);
            Some(status)
        }
        None => None,
    };

    let ctx = PageContext {
        heading: state.site.heading.clone(),
        server_time: Some(local_timestamp()),
        dependency,
    };

    Html(render_page(&ctx))
}

/// Liveness handler - always returns 200 `ok` without checking anything.
pub async fn healthz() -> &'static str {
    "ok"
}

/// Metrics handler - renders the registry in Prometheus text format.
pub async fn metrics(State(state): State<AppState>) -> impl IntoResponse {
    (
        [(header::CONTENT_TYPE, EXPOSITION_CONTENT_TYPE)],
        state.metrics.render(),
    )
}

/// Fallback for unknown paths.
pub async fn not_found() -> impl IntoResponse {
    (StatusCode::NOT_FOUND, "not found")
}
