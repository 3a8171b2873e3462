//! Bulk Discount Core - Shared pricing and selection types.
//!
//! This crate provides the pure domain logic used by every Bulk Discount component:
//! - `admin` - Embedded admin server exposing the discount API
//! - `cli` - Command-line front end for the same engine
//!
//! # Architecture
//!
//! The core crate contains only types and pure functions - no I/O, no HTTP
//! clients. Deciding *which* products a run touches and *what* their new
//! prices are lives here; talking to Shopify lives in `admin`.
//!
//! # Modules
//!
//! - [`types`] - Type-safe IDs, discount percentages, price arithmetic,
//!   tag selection and run results

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
