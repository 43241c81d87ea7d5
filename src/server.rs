//! HTTP listener lifecycle.
//!
//! A [`Server`] only exists once its socket is bound, so holding one means
//! the process is listening. [`Server::run`] consumes it and returns when the
//! listener fails or the shutdown future resolves.

use std::fmt;
use std::future::Future;
use std::net::SocketAddr;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::api::{create_router, AppState};
use crate::error::{AppError, Result};
use crate::metrics::{MetricsCollector, UPKEEP_INTERVAL};

/// A bound HTTP server.
pub struct Server {
    listener: TcpListener,
    router: Router,
    metrics: MetricsCollector,
}

impl fmt::Debug for Server {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Server")
            .field("local_addr", &self.listener.local_addr().ok())
            .finish_non_exhaustive()
    }
}

impl Server {
    /// Bind the listener. Fails immediately if the address is taken.
    pub async fn bind(addr: SocketAddr, state: AppState) -> Result<Self> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|source| AppError::Bind { addr, source })?;

        info!("HTTP server listening on {}", listener.local_addr()?);

        Ok(Self {
            listener,
            metrics: state.metrics.clone(),
            router: create_router(state),
        })
    }

    /// Address the listener is actually bound to.
    pub fn local_addr(&self) -> Result<SocketAddr> {
        Ok(self.listener.local_addr()?)
    }

    /// Serve requests until `shutdown` resolves or the listener fails.
    ///
    /// Metrics upkeep runs for as long as the server does.
    pub async fn run<F>(self, shutdown: F) -> Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let upkeep = self.metrics.spawn_upkeep(UPKEEP_INTERVAL);

        let served = axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await;
        upkeep.abort();
        served.map_err(AppError::Serve)?;

        info!("HTTP server stopped");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::SiteSettings;
    use crate::metrics::MetricsCollector;

    fn state() -> AppState {
        AppState::new(
            MetricsCollector::new().unwrap(),
            SiteSettings {
                heading: "davtrogr Website".to_string(),
            },
        )
    }

    #[tokio::test]
    async fn bind_to_ephemeral_port() {
        let server = Server::bind(SocketAddr::from(([127, 0, 0, 1], 0)), state())
            .await
            .unwrap();

        assert_ne!(server.local_addr().unwrap().port(), 0);
    }

    #[tokio::test]
    async fn second_bind_on_same_port_fails_fast() {
        let first = Server::bind(SocketAddr::from(([127, 0, 0, 1], 0)), state())
            .await
            .unwrap();
        let taken = first.local_addr().unwrap();

        let second = Server::bind(taken, state()).await;

        match second {
            Err(AppError::Bind { addr, source }) => {
                assert_eq!(addr, taken);
                assert_eq!(source.kind(), std::io::ErrorKind::AddrInUse);
            }
            other => panic!("expected bind error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn run_returns_after_shutdown() {
        let server = Server::bind(SocketAddr::from(([127, 0, 0, 1], 0)), state())
            .await
            .unwrap();

        server.run(async {}).await.unwrap();
    }
}
