//! Shopify catalog access (HIGH PRIVILEGE).
//!
//! # Security
//!
//! **This module holds the offline Admin API access token.** The token can
//! rewrite every product price in the store, so it never leaves the server
//! and is redacted from `Debug` output.
//!
//! # Architecture
//!
//! - [`Catalog`] is the seam the discount engine talks to
//! - [`RestCatalog`] implements it over the REST Admin API with `reqwest`
//! - Tests substitute an in-memory catalog
//!
//! # Example
//!
//! ```rust,ignore
//! use bulk_discount_admin::shopify::{Catalog, PageRequest, RestCatalog};
//!
//! let catalog = RestCatalog::new(&config.shopify);
//! let page = catalog.list_products(PageRequest::first(250)).await?;
//! ```

mod rest;
pub mod types;

pub use rest::RestCatalog;
pub use types::*;

use async_trait::async_trait;
use bulk_discount_core::ProductId;
use thiserror::Error;

/// Errors that can occur when talking to the Shopify Admin API.
#[derive(Debug, Error)]
pub enum CatalogError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed.
    #[error("JSON parse error: {0}")]
    Parse(#[from] serde_json::Error),

    /// Shopify answered with a non-success status.
    #[error("Shopify returned {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, as returned.
        body: String,
    },

    /// Rate limited by Shopify.
    #[error("Rate limited, retry after {0} seconds")]
    RateLimited(u64),

    /// Authentication/authorization failed.
    #[error("Unauthorized: {0}")]
    Unauthorized(String),
}

/// Read and write access to the store's products.
#[async_trait]
pub trait Catalog: Send + Sync {
    /// Fetch one page of products with their variants.
    async fn list_products(&self, page: PageRequest) -> Result<ProductPage, CatalogError>;

    /// Save a product with the given variant prices in one request.
    async fn save_product_variants(
        &self,
        product_id: ProductId,
        variants: &[VariantUpdate],
    ) -> Result<(), CatalogError>;

    /// Save a single variant's prices.
    async fn save_variant(&self, variant: &VariantUpdate) -> Result<(), CatalogError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_catalog_error_display() {
        let err = CatalogError::Status {
            status: 404,
            body: "{\"errors\":\"Not Found\"}".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Shopify returned 404: {\"errors\":\"Not Found\"}"
        );
    }

    #[test]
    fn test_rate_limited_error() {
        let err = CatalogError::RateLimited(2);
        assert_eq!(err.to_string(), "Rate limited, retry after 2 seconds");
    }

    #[test]
    fn test_unauthorized_error() {
        let err = CatalogError::Unauthorized("Invalid token".to_string());
        assert_eq!(err.to_string(), "Unauthorized: Invalid token");
    }
}
