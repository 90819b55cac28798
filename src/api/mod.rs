//! Vetting API Module
//! REST surface over the vetting pipeline (scan, batch, tiers, health, stats)

pub mod handlers;
pub mod middleware;
pub mod routes;
pub mod types;

pub use handlers::AppState;
pub use middleware::{start_cleanup_task, RateLimitConfig, RateLimiter};
pub use routes::create_router;
pub use types::*;
