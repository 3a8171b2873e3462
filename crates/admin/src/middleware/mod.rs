//! HTTP middleware and extractors for the admin app.
//!
//! Request tracing and Sentry layers are installed in `main`; this module
//! holds the session token extractor applied to every `/api` route.

pub mod auth;

pub use auth::{RequireShopSession, SessionTokenError, SessionTokenVerifier, ShopSession};
