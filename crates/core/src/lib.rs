//! Pearl Treasure Core - Shared domain types.
//!
//! This crate provides the types shared by the Pearl Treasure components:
//! - `storefront` - Catalog, authentication and cart HTTP API
//! - `cli` - Command-line tools for migrations and seeding
//!
//! # Architecture
//!
//! The core crate contains only types - no I/O, no database access,
//! no HTTP clients. Validation happens at construction, so a value of one of
//! these types is always well-formed.
//!
//! # Modules
//!
//! - [`types`] - Typed ids, emails, prices, quantities, categories and tokens

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod types;

pub use types::*;
