// backend/src/middleware/mod.rs
// Middleware modules

pub mod rate_limit;
pub mod request_context;

pub use rate_limit::{RateLimiter, rate_limit_middleware};
pub use request_context::request_context_middleware;
