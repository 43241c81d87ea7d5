//! Mock probe for unit testing.
//!
//! Returns a fixed status without touching the network and counts how
//! often it was asked.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;

use super::{DependencyProbe, DependencyStatus};

/// Mock dependency probe for testing.
#[derive(Debug, Clone)]
pub struct MockProbe {
    status: DependencyStatus,
    latency: Duration,
    calls: Arc<AtomicUsize>,
}

impl MockProbe {
    /// Probe that always reports the given status.
    pub fn new(status: DependencyStatus) -> Self {
        Self {
            status,
            latency: Duration::ZERO,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    /// Probe that always reports the dependency as reachable.
    pub fn reachable(server_time: impl Into<String>) -> Self {
        Self::new(DependencyStatus::Reachable {
            server_time: server_time.into(),
        })
    }

    /// Probe that always reports the dependency as unreachable.
    pub fn unreachable() -> Self {
        Self::new(DependencyStatus::Unreachable)
    }

    /// Delay every check by `latency`.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Number of checks performed so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl DependencyProbe for MockProbe {
    async fn check(&self) -> DependencyStatus {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
        self.status.clone()
    }
}
