//! Demo website served from a GitOps pipeline.
//!
//! The server renders one HTML page, answers a liveness probe and exposes
//! Prometheus metrics for every request it handles. When a database is
//! configured, the page also shows whether it can be reached; that check
//! never changes a response status.
//!
//! # Endpoints
//!
//! ```text
//! GET /          200 text/html   page (server time, optional database time)
//! GET /healthz   200 ok          unconditional liveness
//! GET /metrics   200             Prometheus text exposition
//! ```
//!
//! # Modules
//!
//! - [`config`]: Configuration loading from environment
//! - [`error`]: Unified error types
//! - [`metrics`]: Request counters and latency histograms
//! - [`page`]: Index page rendering
//! - [`probe`]: Database connectivity check
//! - [`api`]: HTTP handlers, router and instrumentation
//! - [`server`]: Listener lifecycle
//! - [`utils`]: Utility functions

pub mod api;
pub mod config;
pub mod error;
pub mod metrics;
pub mod page;
pub mod probe;
pub mod server;
pub mod utils;

pub use config::Config;
pub use error::{AppError, Result};
pub use server::Server;
