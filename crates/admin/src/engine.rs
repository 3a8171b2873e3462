//! Catalog discount engine.
//!
//! A run walks the catalog once, selects products, reprices every variant of
//! each selected product, and saves the new prices back:
//!
//! - tag and bundle runs save one product (with all its variants) per request
//! - title runs save one variant per request
//!
//! The first remote error stops the run. Saves made before it stay applied,
//! and the result carries the count reached so far.

use std::pin::pin;
use std::sync::Arc;

use async_stream::try_stream;
use bulk_discount_core::{DiscountRequest, MutationResult};
use futures::{Stream, TryStreamExt};
use tokio::sync::Mutex;
use tracing::Instrument;

use crate::config::EngineConfig;
use crate::shopify::{Catalog, CatalogError, PageRequest, Product, VariantUpdate};

/// Largest page the REST Admin API serves.
pub const MAX_PAGE_SIZE: u32 = 250;

/// Engine tuning.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EngineOptions {
    /// Products requested per page.
    pub page_size: u32,
    /// Pages read per run. `1` reads only the first 250 products.
    pub max_pages: u32,
}

impl Default for EngineOptions {
    fn default() -> Self {
        Self {
            page_size: MAX_PAGE_SIZE,
            max_pages: 1,
        }
    }
}

impl From<EngineConfig> for EngineOptions {
    fn from(config: EngineConfig) -> Self {
        Self {
            max_pages: config.max_pages,
            ..Self::default()
        }
    }
}

/// Applies and resets discounts over a [`Catalog`].
pub struct DiscountEngine {
    catalog: Arc<dyn Catalog>,
    options: EngineOptions,
    /// Serializes runs so an apply and a reset never interleave.
    run_lock: Mutex<()>,
}

impl DiscountEngine {
    /// Create an engine over `catalog`.
    #[must_use]
    pub fn new(catalog: Arc<dyn Catalog>, options: EngineOptions) -> Self {
        Self {
            catalog,
            options,
            run_lock: Mutex::new(()),
        }
    }

    /// Run a discount or reset.
    ///
    /// Remote errors are folded into the returned [`MutationResult`].
    pub async fn run(&self, request: &DiscountRequest) -> MutationResult {
        let _guard = self.run_lock.lock().await;

        let span = tracing::info_span!(
            "discount_run",
            selection = request.selection.label(),
            action = %request.action,
        );
        self.run_exclusive(request).instrument(span).await
    }

    async fn run_exclusive(&self, request: &DiscountRequest) -> MutationResult {
        let discount = request.action.discount();
        let mut count = 0_usize;

        let mut products = pin!(product_stream(Arc::clone(&self.catalog), self.options));

        loop {
            let product = match products.try_next().await {
                Ok(Some(product)) => product,
                Ok(None) => break,
                Err(e) => return Self::abort(count, request, &e),
            };

            if !request.selection.selects(&product.title, &product.tag_set()) {
                continue;
            }

            // Saving an empty variant list would drop the product's variants.
            if product.variants.is_empty() {
                tracing::debug!(product_id = %product.id, "Skipping product without variants");
                continue;
            }

            let updates: Vec<VariantUpdate> = product
                .variants
                .iter()
                .map(|variant| variant.repriced(request.action))
                .collect();

            if request.selection.updates_variants_individually() {
                for update in &updates {
                    if let Err(e) = self.catalog.save_variant(update).await {
                        return Self::abort(count, request, &e);
                    }
                    count += 1;
                    tracing::info!(
                        product_id = %product.id,
                        variant_id = %update.id,
                        price = %update.price,
                        compare_at_price = %update.compare_at_price,
                        "Updated variant"
                    );
                }
            } else {
                if let Err(e) = self
                    .catalog
                    .save_product_variants(product.id, &updates)
                    .await
                {
                    return Self::abort(count, request, &e);
                }
                count += 1;
                tracing::info!(
                    product_id = %product.id,
                    title = %product.title,
                    variants = updates.len(),
                    "Updated product"
                );
            }
        }

        tracing::info!(count, "Discount run finished");
        MutationResult::completed(count, discount)
    }

    fn abort(count: usize, request: &DiscountRequest, error: &CatalogError) -> MutationResult {
        tracing::warn!(count, error = %error, "Discount run stopped by catalog error");
        MutationResult::failed(count, request.action.discount(), error.to_string())
    }
}

/// Products of the catalog, fetched a page at a time as the stream is polled.
fn product_stream(
    catalog: Arc<dyn Catalog>,
    options: EngineOptions,
) -> impl Stream<Item = Result<Product, CatalogError>> {
    try_stream! {
        let mut request = PageRequest::first(options.page_size);

        for page_number in 1..=options.max_pages {
            let page = catalog.list_products(request).await?;
            tracing::debug!(page = page_number, products = page.products.len(), "Read product page");

            for product in page.products {
                yield product;
            }

            match page.next_page_info {
                Some(cursor) => request = PageRequest::after(options.page_size, cursor),
                None => break,
            }
        }
    }
}
