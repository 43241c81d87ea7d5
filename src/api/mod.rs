//! HTTP API module for the index page, health and metrics endpoints.

pub mod handlers;
pub mod middleware;
pub mod routes;

pub use handlers::{AppState, SiteSettings};
pub use middleware::{track_requests, ResponseRecord};
pub use routes::create_router;
