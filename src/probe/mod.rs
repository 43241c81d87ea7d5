//! Best-effort connectivity checks against external dependencies.
//!
//! A probe only feeds the index page. Its result never changes a response
//! status code and `/healthz` never consults it.

pub mod mock;
pub mod postgres;

use async_trait::async_trait;
use strum::IntoStaticStr;

pub use mock::MockProbe;
pub use postgres::PostgresProbe;

/// Text shown on the page when the database cannot be queried.
pub const UNREACHABLE_TEXT: &str = "brak połączenia z bazą";

/// Outcome of a single probe, computed fresh for every request.
#[derive(Debug, Clone, PartialEq, Eq, IntoStaticStr)]
#[strum(serialize_all = "lowercase")]
pub enum DependencyStatus {
    /// The dependency answered; carries the time it reported.
    Reachable {
        /// Server-side timestamp returned by the dependency.
        server_time: String,
    },
    /// The dependency could not be queried.
    Unreachable,
}

impl DependencyStatus {
    /// Stable label (`reachable` / `unreachable`) for metrics and markup.
    pub fn label(&self) -> &'static str {
        self.into()
    }

    /// Human-readable text for the page.
    pub fn display_text(&self) -> &str {
        match self {
            DependencyStatus::Reachable { server_time } => server_time,
            DependencyStatus::Unreachable => UNREACHABLE_TEXT,
        }
    }
}

/// A connectivity check against one external dependency.
///
/// Implementations must not fail: any error is folded into
/// [`DependencyStatus::Unreachable`].
#[async_trait]
pub trait DependencyProbe: Send + Sync + std::fmt::Debug {
    /// Run one check.
    async fn check(&self) -> DependencyStatus;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn labels_are_lowercase() {
        let reachable = DependencyStatus::Reachable {
            server_time: "2024-05-01 10:00:00+00".to_string(),
        };
        assert_eq!(reachable.label(), "reachable");
        assert_eq!(DependencyStatus::Unreachable.label(), "unreachable");
    }

    #[test]
    fn display_text_falls_back_to_placeholder() {
        assert_eq!(DependencyStatus::Unreachable.display_text(), UNREACHABLE_TEXT);

        let reachable = DependencyStatus::Reachable {
            server_time: "2024-05-01 10:00:00+00".to_string(),
        };
        assert_eq!(reachable.display_text(), "2024-05-01 10:00:00+00");
    }
}
