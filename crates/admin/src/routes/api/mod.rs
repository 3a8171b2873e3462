//! JSON API route handlers.
//!
//! Every endpoint requires an App Bridge session token.

pub mod discounts;

use axum::Router;

use crate::state::AppState;

/// Build the complete API router.
pub fn router() -> Router<AppState> {
    Router::new().merge(discounts::router())
}
