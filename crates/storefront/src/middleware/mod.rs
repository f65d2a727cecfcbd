//! HTTP middleware stack for the storefront.
//!
//! # Middleware Order (bottom to top in Router)
//!
//! 1. Sentry layers (hub per request, HTTP transaction)
//! 2. `TraceLayer` (request tracing)
//! 3. Request ID (add unique ID to each request)
//! 4. Session layer (tower-sessions with `PostgreSQL` store)
//!
//! Authentication is enforced per handler by the [`RequireAuth`] and
//! [`RequireStoreAdmin`] extractors.

pub mod auth;
pub mod request_id;
pub mod session;

pub use auth::{RequireAuth, RequireStoreAdmin};
pub use request_id::{RequestId, request_id_middleware};
pub use session::create_session_layer;
