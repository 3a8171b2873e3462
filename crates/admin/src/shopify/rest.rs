//! REST Admin API catalog client.
//!
//! Endpoints used, relative to `https://{store}/admin/api/{version}/`:
//!
//! - `GET products.json?fields=id,tags,variants,title&limit=250[&page_info=..]`
//! - `PUT products/{id}.json` with `{"product": {"id", "variants": [..]}}`
//! - `PUT variants/{id}.json` with `{"variant": {"id", "price", "compare_at_price"}}`

use std::sync::Arc;

use async_trait::async_trait;
use bulk_discount_core::ProductId;
use reqwest::header::LINK;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};
use tracing::instrument;
use url::Url;

use crate::config::ShopifyConfig;

use super::{Catalog, CatalogError, PageRequest, Product, ProductPage, VariantUpdate};

/// Fields requested for every product listing.
const PRODUCT_FIELDS: &str = "id,tags,variants,title";

/// Shopify REST Admin API catalog.
///
/// Cheap to clone; clones share one connection pool.
#[derive(Clone)]
pub struct RestCatalog {
    inner: Arc<RestCatalogInner>,
}

struct RestCatalogInner {
    client: reqwest::Client,
    store: String,
    api_version: String,
    access_token: SecretString,
}

#[derive(Debug, Deserialize)]
struct ProductsEnvelope {
    products: Vec<Product>,
}

#[derive(Debug, Serialize)]
struct ProductEnvelope<'a> {
    product: ProductVariantsBody<'a>,
}

#[derive(Debug, Serialize)]
struct ProductVariantsBody<'a> {
    id: ProductId,
    variants: &'a [VariantUpdate],
}

#[derive(Debug, Serialize)]
struct VariantEnvelope<'a> {
    variant: &'a VariantUpdate,
}

impl RestCatalog {
    /// Create a catalog client for the configured store.
    #[must_use]
    pub fn new(config: &ShopifyConfig) -> Self {
        Self {
            inner: Arc::new(RestCatalogInner {
                client: reqwest::Client::new(),
                store: config.store.clone(),
                api_version: config.api_version.clone(),
                access_token: config.access_token.clone(),
            }),
        }
    }

    /// Get the store domain.
    #[must_use]
    pub fn store(&self) -> &str {
        &self.inner.store
    }

    fn endpoint(&self, path: &str) -> String {
        format!(
            "https://{}/admin/api/{}/{path}",
            self.inner.store, self.inner.api_version
        )
    }

    /// Map non-success statuses onto [`CatalogError`].
    async fn check_status(response: reqwest::Response) -> Result<reqwest::Response, CatalogError> {
        let status = response.status();
        if status.is_success() {
            return Ok(response);
        }

        if status == reqwest::StatusCode::TOO_MANY_REQUESTS {
            let retry_after = response
                .headers()
                .get("Retry-After")
                .and_then(|v| v.to_str().ok())
                .and_then(|s| s.trim().parse::<f64>().ok())
                .map_or(2, |secs| {
                    #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
                    // Shopify sends small positive values like "2.0"
                    let secs = secs.ceil().max(0.0) as u64;
                    secs
                });
            return Err(CatalogError::RateLimited(retry_after));
        }

        if status == reqwest::StatusCode::UNAUTHORIZED || status == reqwest::StatusCode::FORBIDDEN {
            return Err(CatalogError::Unauthorized(
                "Invalid or expired access token".to_string(),
            ));
        }

        let body = response.text().await.unwrap_or_default();
        Err(CatalogError::Status {
            status: status.as_u16(),
            body,
        })
    }

    async fn put_json<T: Serialize + Sync>(&self, path: &str, body: &T) -> Result<(), CatalogError> {
        let response = self
            .inner
            .client
            .put(self.endpoint(path))
            .header("X-Shopify-Access-Token", self.inner.access_token.expose_secret())
            .json(body)
            .send()
            .await?;

        Self::check_status(response).await?;
        Ok(())
    }
}

#[async_trait]
impl Catalog for RestCatalog {
    #[instrument(skip(self), fields(limit = page.limit, has_cursor = page.page_info.is_some()))]
    async fn list_products(&self, page: PageRequest) -> Result<ProductPage, CatalogError> {
        let limit = page.limit.to_string();
        let mut query: Vec<(&str, &str)> = vec![("fields", PRODUCT_FIELDS), ("limit", &limit)];
        if let Some(page_info) = page.page_info.as_deref() {
            query.push(("page_info", page_info));
        }

        let response = self
            .inner
            .client
            .get(self.endpoint("products.json"))
            .header("X-Shopify-Access-Token", self.inner.access_token.expose_secret())
            .query(&query)
            .send()
            .await?;
        let response = Self::check_status(response).await?;

        let next_page_info = response
            .headers()
            .get(LINK)
            .and_then(|v| v.to_str().ok())
            .and_then(next_page_info);

        let text = response.text().await?;
        let envelope: ProductsEnvelope = serde_json::from_str(&text)?;

        tracing::debug!(products = envelope.products.len(), "Fetched product page");

        Ok(ProductPage {
            products: envelope.products,
            next_page_info,
        })
    }

    #[instrument(skip(self, variants), fields(product_id = %product_id, variants = variants.len()))]
    async fn save_product_variants(
        &self,
        product_id: ProductId,
        variants: &[VariantUpdate],
    ) -> Result<(), CatalogError> {
        let body = ProductEnvelope {
            product: ProductVariantsBody {
                id: product_id,
                variants,
            },
        };
        self.put_json(&format!("products/{product_id}.json"), &body)
            .await
    }

    #[instrument(skip(self, variant), fields(variant_id = %variant.id))]
    async fn save_variant(&self, variant: &VariantUpdate) -> Result<(), CatalogError> {
        let body = VariantEnvelope { variant };
        self.put_json(&format!("variants/{}.json", variant.id), &body)
            .await
    }
}

/// Extract the `page_info` cursor of the `rel="next"` entry of a `Link`
/// header.
///
/// ```text
/// <https://shop/admin/api/2025-01/products.json?limit=250&page_info=abc>; rel="next"
/// ```
pub fn next_page_info(link: &str) -> Option<String> {
    link.split(',').find_map(|entry| {
        let mut parts = entry.split(';');
        let target = parts.next()?.trim();
        let is_next = parts.any(|param| {
            let param = param.trim();
            param == "rel=\"next\"" || param == "rel=next"
        });
        if !is_next {
            return None;
        }

        let target = target.strip_prefix('<')?.strip_suffix('>')?;
        let url = Url::parse(target).ok()?;
        url.query_pairs()
            .find(|(key, _)| key == "page_info")
            .map(|(_, value)| value.into_owned())
    })
}
