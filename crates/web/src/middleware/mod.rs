//! HTTP middleware stack for the portal.
//!
//! # Middleware Order (outermost first)
//!
//! 1. Sentry layers (capture errors, transactions)
//! 2. `TraceLayer` (request span with method, uri, status, latency)
//! 3. Request ID (recorded on the span and Sentry scope)
//! 4. Security headers
//! 5. Session layer (tower-sessions, signed cookie, `PostgreSQL` store)
//! 6. Login rate limiting (login form posts only)
//! 7. Auth extractors (per handler)

pub mod auth;
pub mod rate_limit;
pub mod request_id;
pub mod security_headers;
pub mod session;

pub use auth::{
    OptionalAuth, RequireAdmin, RequireAuth, RequireStaff, RequireVendor, clear_current_user,
    set_current_user,
};
pub use rate_limit::login_rate_limiter;
pub use request_id::request_id_middleware;
pub use security_headers::security_headers_middleware;
pub use session::{SessionKeyError, create_session_layer, session_layer};
