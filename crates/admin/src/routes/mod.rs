//! HTTP route handlers for the admin app.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                                  - Liveness check
//! GET  /                                        - Embedded admin page
//!
//! # Discount runs (session token required)
//! POST /api/discountAllProductsExceptBundles    - Discount all non-bundle products
//! POST /api/resetPriceAllProductsExceptBundles  - Reset all non-bundle products
//! POST /api/discountAllBundles                  - Discount bundle products
//! POST /api/resetPriceAllBundles                - Reset bundle products
//! POST /api/discountAllProductsExceptTags       - Discount products outside a tag filter
//! POST /api/resetPriceAllProductsExceptTags     - Reset products outside a tag filter
//! POST /api/discountTags                        - Discount products inside a tag filter
//! POST /api/resetDiscountTags                   - Reset products inside a tag filter
//! POST /api/discountProduct                     - Discount variants of one product title
//! POST /api/resetDiscountProduct                - Reset variants of one product title
//! ```

pub mod api;
pub mod home;

use axum::{Router, routing::get};

use crate::state::AppState;

/// Build the complete application router.
pub fn routes() -> Router<AppState> {
    Router::new()
        .route("/health", get(health))
        .route("/", get(home::home))
        .merge(api::router())
}

/// Liveness health check endpoint.
///
/// Returns "ok" if the server is running. Does not check Shopify.
async fn health() -> &'static str {
    "ok"
}
