//! Integration test harness for the bulk discount admin.
//!
//! Drives the real router in-process with `tower::ServiceExt::oneshot`
//! against an in-memory catalog, so no Shopify store or network is needed.
//!
//! # Running Tests
//!
//! ```bash
//! cargo test -p bulk-discount-integration-tests
//! ```

#![allow(clippy::missing_panics_doc)]

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
};
use bulk_discount_admin::{
    AppState, DiscountEngine, EngineOptions,
    middleware::SessionTokenVerifier,
    routes,
    shopify::{Catalog, CatalogError, PageRequest, Product, ProductPage, Variant, VariantUpdate},
};
use bulk_discount_core::{ProductId, VariantId};
use jsonwebtoken::{EncodingKey, Header, encode};
use secrecy::SecretString;
use tower::ServiceExt;

pub const TEST_SHOP: &str = "test-shop.myshopify.com";
pub const TEST_API_KEY: &str = "0a1b2c3d4e5f60718293a4b5c6d7e8f9";
pub const TEST_API_SECRET: &str = "9f8e7d6c5b4a39281706f5e4d3c2b1a0";

/// A catalog held in memory. Saves rewrite the stored prices.
#[derive(Default)]
pub struct MemoryCatalog {
    products: Mutex<Vec<Product>>,
    fail_on_save: Option<usize>,
    list_calls: Mutex<Vec<PageRequest>>,
    saves: Mutex<usize>,
}

impl MemoryCatalog {
    #[must_use]
    pub fn new(products: Vec<Product>) -> Self {
        Self {
            products: Mutex::new(products),
            ..Self::default()
        }
    }

    /// Fail the save with this zero-based index with a 404.
    #[must_use]
    pub const fn failing_on_save(mut self, index: usize) -> Self {
        self.fail_on_save = Some(index);
        self
    }

    /// Current state of a product.
    #[must_use]
    pub fn product(&self, id: i64) -> Product {
        self.products
            .lock()
            .expect("catalog lock")
            .iter()
            .find(|p| p.id == ProductId::new(id))
            .cloned()
            .expect("product exists")
    }

    /// Current `(price, compare_at_price)` of every variant of a product.
    #[must_use]
    pub fn prices(&self, id: i64) -> Vec<(Option<String>, Option<String>)> {
        self.product(id)
            .variants
            .into_iter()
            .map(|v| (v.price, v.compare_at_price))
            .collect()
    }

    /// Number of save requests received, failed ones included.
    #[must_use]
    pub fn save_count(&self) -> usize {
        *self.saves.lock().expect("saves lock")
    }

    /// Page requests received.
    #[must_use]
    pub fn list_calls(&self) -> Vec<PageRequest> {
        self.list_calls.lock().expect("list lock").clone()
    }

    fn begin_save(&self) -> Result<(), CatalogError> {
        let mut saves = self.saves.lock().expect("saves lock");
        let index = *saves;
        *saves += 1;
        if self.fail_on_save == Some(index) {
            return Err(CatalogError::Status {
                status: 404,
                body: "{\"errors\":\"Not Found\"}".to_string(),
            });
        }
        Ok(())
    }

    fn apply(&self, update: &VariantUpdate) {
        let mut products = self.products.lock().expect("catalog lock");
        if let Some(variant) = products
            .iter_mut()
            .flat_map(|p| p.variants.iter_mut())
            .find(|v| v.id == update.id)
        {
            variant.price = Some(update.price.to_string());
            variant.compare_at_price = Some(update.compare_at_price.to_string());
        }
    }
}

#[async_trait]
impl Catalog for MemoryCatalog {
    async fn list_products(&self, page: PageRequest) -> Result<ProductPage, CatalogError> {
        self.list_calls.lock().expect("list lock").push(page.clone());

        let products = self.products.lock().expect("catalog lock");
        let offset = page
            .page_info
            .as_deref()
            .and_then(|cursor| cursor.parse::<usize>().ok())
            .unwrap_or(0);
        let limit = usize::try_from(page.limit).unwrap_or(usize::MAX);
        let end = offset.saturating_add(limit).min(products.len());
        let slice = products.get(offset..end).unwrap_or_default().to_vec();

        Ok(ProductPage {
            products: slice,
            next_page_info: (end < products.len()).then(|| end.to_string()),
        })
    }

    async fn save_product_variants(
        &self,
        _product_id: ProductId,
        variants: &[VariantUpdate],
    ) -> Result<(), CatalogError> {
        self.begin_save()?;
        for update in variants {
            self.apply(update);
        }
        Ok(())
    }

    async fn save_variant(&self, variant: &VariantUpdate) -> Result<(), CatalogError> {
        self.begin_save()?;
        self.apply(variant);
        Ok(())
    }
}

/// Build a product whose variants have the given `(price, compare_at_price)`.
#[must_use]
pub fn product(id: i64, title: &str, tags: &str, prices: &[(&str, Option<&str>)]) -> Product {
    Product {
        id: ProductId::new(id),
        title: title.to_string(),
        tags: tags.to_string(),
        variants: prices
            .iter()
            .zip(0_i64..)
            .map(|((price, compare_at), i)| Variant {
                id: VariantId::new(id * 1000 + i),
                price: Some((*price).to_string()),
                compare_at_price: compare_at.map(str::to_string),
            })
            .collect(),
    }
}

/// Mint an App Bridge session token signed with [`TEST_API_SECRET`].
#[must_use]
pub fn mint_session_token(claims: &serde_json::Value) -> String {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(TEST_API_SECRET.as_bytes()),
    )
    .expect("HS256 encoding accepts any JSON claims")
}

/// Claims of a token valid for the next minute.
#[must_use]
pub fn valid_claims() -> serde_json::Value {
    let now = chrono::Utc::now().timestamp();
    serde_json::json!({
        "iss": format!("https://{TEST_SHOP}/admin"),
        "dest": format!("https://{TEST_SHOP}"),
        "aud": TEST_API_KEY,
        "sub": "1",
        "exp": now + 60,
        "nbf": now - 10,
        "iat": now - 10,
        "jti": "00000000-0000-0000-0000-000000000000",
        "sid": "session",
    })
}

/// A token valid for the next minute.
#[must_use]
pub fn valid_token() -> String {
    mint_session_token(&valid_claims())
}

/// Router plus the catalog behind it.
pub struct TestContext {
    pub router: Router,
    pub catalog: Arc<MemoryCatalog>,
}

impl TestContext {
    /// Router over `catalog` reading one page.
    #[must_use]
    pub fn new(catalog: MemoryCatalog) -> Self {
        Self::with_options(catalog, EngineOptions::default())
    }

    /// Router over `catalog` with custom engine options.
    #[must_use]
    pub fn with_options(catalog: MemoryCatalog, options: EngineOptions) -> Self {
        let catalog = Arc::new(catalog);
        let engine = DiscountEngine::new(Arc::clone(&catalog) as Arc<dyn Catalog>, options);
        let verifier = SessionTokenVerifier::new(
            TEST_API_KEY,
            &SecretString::from(TEST_API_SECRET),
            TEST_SHOP,
        );
        let state = AppState::new(engine, verifier, TEST_API_KEY, TEST_SHOP);

        Self {
            router: routes::routes().with_state(state),
            catalog,
        }
    }

    /// POST a JSON body with a valid session token.
    pub async fn post(&self, path: &str, body: &serde_json::Value) -> (StatusCode, serde_json::Value) {
        self.post_with_token(path, body, Some(&valid_token())).await
    }

    /// POST a JSON body with an explicit token (or none).
    pub async fn post_with_token(
        &self,
        path: &str,
        body: &serde_json::Value,
        token: Option<&str>,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            request = request.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = request
            .body(Body::from(body.to_string()))
            .expect("valid request");

        let (status, bytes) = self.send(request).await;
        let json = serde_json::from_slice(&bytes).expect("JSON response body");
        (status, json)
    }

    /// POST a raw body with a valid session token and optional content type.
    pub async fn post_raw(
        &self,
        path: &str,
        content_type: Option<&str>,
        body: &str,
    ) -> (StatusCode, serde_json::Value) {
        let mut request = Request::builder()
            .method("POST")
            .uri(path)
            .header(header::AUTHORIZATION, format!("Bearer {}", valid_token()));
        if let Some(content_type) = content_type {
            request = request.header(header::CONTENT_TYPE, content_type);
        }
        let request = request
            .body(Body::from(body.to_string()))
            .expect("valid request");

        let (status, bytes) = self.send(request).await;
        let json = serde_json::from_slice(&bytes).expect("JSON response body");
        (status, json)
    }

    /// GET a path and return the body as text.
    pub async fn get(&self, path: &str) -> (StatusCode, String) {
        let request = Request::builder()
            .uri(path)
            .body(Body::empty())
            .expect("valid request");
        let (status, bytes) = self.send(request).await;
        (status, String::from_utf8_lossy(&bytes).into_owned())
    }

    async fn send(&self, request: Request<Body>) -> (StatusCode, Vec<u8>) {
        let response = self
            .router
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");
        let status = response.status();
        let bytes = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("readable body");
        (status, bytes.to_vec())
    }
}
