//! Discount and reset runs from the command line.
//!
//! # Usage
//!
//! ```bash
//! # Take 20% off every product except bundles
//! bd-cli apply --discount 20 --all-except-bundles
//!
//! # Take 15% off products tagged both Summer and Sale
//! bd-cli apply --discount 15 --tags "Summer, Sale" --match-all
//!
//! # Put one product back to its compare-at price
//! bd-cli reset --product "Blue Shirt"
//! ```
//!
//! # Environment Variables
//!
//! - `SHOPIFY_STORE` - Store domain (e.g., your-store.myshopify.com)
//! - `SHOPIFY_ACCESS_TOKEN` - Offline Admin API access token
//! - `SHOPIFY_API_VERSION` - REST Admin API version (default: 2025-01)
//! - `CATALOG_MAX_PAGES` - Product pages of 250 read per run (default: 1)

use std::sync::Arc;

use bulk_discount_admin::{
    DiscountEngine, EngineOptions,
    config::{ConfigError, EngineConfig, ShopifyConfig},
    shopify::RestCatalog,
};
use bulk_discount_core::{
    DiscountError, DiscountRequest, MutationResult, PriceAction, Selection, SelectionError,
};
use thiserror::Error;

/// Errors that can occur during a discount run.
#[derive(Debug, Error)]
pub enum DiscountCommandError {
    /// Configuration could not be loaded.
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    /// Discount percentage was invalid.
    #[error("{0}")]
    Discount(#[from] DiscountError),

    /// Selection was invalid.
    #[error("{0}")]
    Selection(#[from] SelectionError),

    /// The run stopped on a Shopify error.
    #[error("{message}: {error}")]
    Run {
        /// Summary including the count reached.
        message: String,
        /// Shopify error text.
        error: String,
    },
}

/// Apply `percent` off to the selected products.
///
/// # Errors
///
/// Returns an error if the percentage is invalid, configuration is missing,
/// or Shopify rejects an update.
pub async fn apply(
    percent: f64,
    selection: Selection,
) -> Result<MutationResult, DiscountCommandError> {
    let action = PriceAction::discount_from_f64(Some(percent))?;
    run(DiscountRequest::new(selection, action)).await
}

/// Reset the selected products to their compare-at prices.
///
/// # Errors
///
/// Returns an error if configuration is missing or Shopify rejects an update.
pub async fn reset(selection: Selection) -> Result<MutationResult, DiscountCommandError> {
    run(DiscountRequest::new(selection, PriceAction::Reset)).await
}

async fn run(request: DiscountRequest) -> Result<MutationResult, DiscountCommandError> {
    dotenvy::dotenv().ok();

    let shopify = ShopifyConfig::from_env()?;
    let engine_config = EngineConfig::from_env()?;

    tracing::info!(
        store = %shopify.store,
        selection = request.selection.label(),
        action = %request.action,
        "Starting discount run"
    );

    let catalog = RestCatalog::new(&shopify);
    let engine = DiscountEngine::new(Arc::new(catalog), EngineOptions::from(engine_config));
    let result = engine.run(&request).await;

    if result.success {
        Ok(result)
    } else {
        Err(DiscountCommandError::Run {
            message: result.message,
            error: result.error.unwrap_or_default(),
        })
    }
}
