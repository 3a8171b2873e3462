//! Core types for Bulk Discount.
//!
//! This module provides type-safe wrappers for the discount domain.

pub mod discount;
pub mod id;
pub mod mutation;
pub mod price;
pub mod selection;

pub use discount::{Discount, DiscountError, PriceAction};
pub use id::*;
pub use mutation::{DiscountRequest, MutationResult};
pub use price::{Repricing, baseline_price, parse_price, reprice};
pub use selection::{BUNDLE_TAG, Selection, SelectionError, TagFilter, TagMatch, TagSet};
