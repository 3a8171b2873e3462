//! Product and variant shapes of the REST Admin API.
//!
//! Only the fields a discount run reads (`id,tags,variants,title`) are
//! modelled. Prices travel as decimal strings in both directions.

use bulk_discount_core::{PriceAction, ProductId, TagSet, VariantId, reprice};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

/// A product as listed by `GET products.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: ProductId,
    #[serde(default)]
    pub title: String,
    /// Comma-separated tag string, e.g. `"Sale, Bundle"`.
    #[serde(default)]
    pub tags: String,
    #[serde(default)]
    pub variants: Vec<Variant>,
}

impl Product {
    /// The product's tags, trimmed.
    #[must_use]
    pub fn tag_set(&self) -> TagSet {
        TagSet::parse(&self.tags)
    }
}

/// A variant embedded in a product listing.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Variant {
    pub id: VariantId,
    #[serde(default)]
    pub price: Option<String>,
    #[serde(default)]
    pub compare_at_price: Option<String>,
}

impl Variant {
    /// New prices for this variant under `action`.
    #[must_use]
    pub fn repriced(&self, action: PriceAction) -> VariantUpdate {
        let repricing = reprice(
            self.compare_at_price.as_deref(),
            self.price.as_deref(),
            action,
        );
        VariantUpdate {
            id: self.id,
            price: repricing.price,
            compare_at_price: repricing.compare_at_price,
        }
    }
}

/// Prices written back for one variant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct VariantUpdate {
    pub id: VariantId,
    #[serde(with = "rust_decimal::serde::str")]
    pub price: Decimal,
    #[serde(with = "rust_decimal::serde::str")]
    pub compare_at_price: Decimal,
}

/// One request for a page of products.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PageRequest {
    /// Page size, at most 250.
    pub limit: u32,
    /// Cursor from the previous page's `Link` header.
    pub page_info: Option<String>,
}

impl PageRequest {
    /// The first page.
    #[must_use]
    pub const fn first(limit: u32) -> Self {
        Self {
            limit,
            page_info: None,
        }
    }

    /// The page after the one that returned `page_info`.
    #[must_use]
    pub const fn after(limit: u32, page_info: String) -> Self {
        Self {
            limit,
            page_info: Some(page_info),
        }
    }
}

/// A page of products plus the cursor to the next one.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ProductPage {
    pub products: Vec<Product>,
    pub next_page_info: Option<String>,
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use bulk_discount_core::Discount;

    #[test]
    fn test_product_deserializes_rest_listing() {
        let json = r#"{
            "id": 632910392,
            "title": "IPod Nano - 8GB",
            "tags": "Emotive, Flash Memory, MP3",
            "variants": [
                {"id": 808950810, "price": "199.00", "compare_at_price": null},
                {"id": 49148385, "price": "199.00"}
            ]
        }"#;

        let product: Product = serde_json::from_str(json).unwrap();
        assert_eq!(product.id, ProductId::new(632_910_392));
        assert_eq!(product.variants.len(), 2);
        assert_eq!(product.variants[0].compare_at_price, None);
        assert!(product.tag_set().contains("Flash Memory"));
    }

    #[test]
    fn test_product_without_variants_field() {
        let product: Product = serde_json::from_str(r#"{"id": 1}"#).unwrap();
        assert!(product.variants.is_empty());
        assert!(product.tag_set().is_empty());
    }

    #[test]
    fn test_variant_update_serializes_prices_as_strings() {
        let variant = Variant {
            id: VariantId::new(7),
            price: Some("20.00".to_string()),
            compare_at_price: None,
        };
        let update = variant.repriced(PriceAction::Discount(Discount::from_f64(10.0).unwrap()));
        let json = serde_json::to_value(update).unwrap();

        assert_eq!(json["id"], 7);
        assert_eq!(json["price"], "18.00");
        assert_eq!(json["compare_at_price"], "20.00");
    }
}
