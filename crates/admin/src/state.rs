//! Application state shared across handlers.

use std::sync::Arc;

use crate::engine::DiscountEngine;
use crate::middleware::SessionTokenVerifier;

/// Application state shared across all handlers.
///
/// Cheap to clone; every clone shares one engine, so discount runs are
/// serialized process-wide.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    engine: DiscountEngine,
    verifier: SessionTokenVerifier,
    api_key: String,
    shop: String,
}

impl AppState {
    /// Create the state from its parts.
    #[must_use]
    pub fn new(
        engine: DiscountEngine,
        verifier: SessionTokenVerifier,
        api_key: impl Into<String>,
        shop: impl Into<String>,
    ) -> Self {
        Self {
            inner: Arc::new(AppStateInner {
                engine,
                verifier,
                api_key: api_key.into(),
                shop: shop.into(),
            }),
        }
    }

    /// The discount engine.
    #[must_use]
    pub fn engine(&self) -> &DiscountEngine {
        &self.inner.engine
    }

    /// Session token verifier.
    #[must_use]
    pub fn verifier(&self) -> &SessionTokenVerifier {
        &self.inner.verifier
    }

    /// App API key, embedded in the admin page for App Bridge.
    #[must_use]
    pub fn api_key(&self) -> &str {
        &self.inner.api_key
    }

    /// Shop domain served by this process.
    #[must_use]
    pub fn shop(&self) -> &str {
        &self.inner.shop
    }
}
