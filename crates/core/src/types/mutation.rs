//! Discount run input and outcome.

use super::discount::{Discount, PriceAction};
use super::selection::Selection;

/// One discount or reset run over the catalog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscountRequest {
    /// Which products are touched.
    pub selection: Selection,
    /// Discount or reset.
    pub action: PriceAction,
}

impl DiscountRequest {
    /// Create a request.
    #[must_use]
    pub const fn new(selection: Selection, action: PriceAction) -> Self {
        Self { selection, action }
    }
}

/// Outcome of a run.
///
/// `count` is the number of products saved, or of variants saved for title
/// runs. On failure it is the count reached before the failing call; those
/// earlier updates stay applied.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationResult {
    /// Items updated.
    pub count: usize,
    /// Whether the run finished without a remote error.
    pub success: bool,
    /// Remote error text, if the run stopped early.
    pub error: Option<String>,
    /// Summary shown to the merchant.
    pub message: String,
}

impl MutationResult {
    /// A run that processed every selected product.
    #[must_use]
    pub fn completed(count: usize, discount: Discount) -> Self {
        Self {
            count,
            success: true,
            error: None,
            message: format!("Successfully updated {count} products to have {discount}% off"),
        }
    }

    /// A run stopped by a remote error after `count` updates.
    #[must_use]
    pub fn failed(count: usize, discount: Discount, error: impl Into<String>) -> Self {
        Self {
            count,
            success: false,
            error: Some(error.into()),
            message: format!("Failed after updating {count} products to have {discount}% off"),
        }
    }
}
