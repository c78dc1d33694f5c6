//! HTTP middleware stack for the auth service.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Guest bag cookie (issue `sessionBagId` when missing)
//! 5. Route protection (`authorized` hooks)
//! 6. Rate limiting on credential endpoints (governor)

pub mod auth;
pub mod authorized;
pub mod guest_bag;
pub mod rate_limit;
pub mod request_id;

pub use auth::{AuthRejection, OptionalAuth, RequireAuth};
pub use authorized::authorized_middleware;
pub use guest_bag::guest_bag_middleware;
pub use rate_limit::credentials_rate_limiter;
pub use request_id::{RequestId, request_id_middleware};
