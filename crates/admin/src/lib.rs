//! Bulk discount admin library.
//!
//! This crate provides the embedded admin app as a library, allowing it to
//! be tested in-process and reused by the CLI.
//!
//! # Security
//!
//! This crate holds the store's offline Admin API access token, which can
//! rewrite every product price. API routes require a verified App Bridge
//! session token.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod engine;
pub mod error;
pub mod middleware;
pub mod routes;
pub mod shopify;
pub mod state;

pub use engine::{DiscountEngine, EngineOptions};
pub use state::AppState;
