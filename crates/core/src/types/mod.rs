//! Core types for Pearl Treasure.
//!
//! This module provides type-safe wrappers for common domain concepts.

pub mod category;
pub mod email;
pub mod id;
pub mod price;
pub mod quantity;
pub mod token;

pub use category::{CategoryError, PearlCategory};
pub use email::{Email, EmailError};
pub use id::*;
pub use price::{Price, PriceError};
pub use quantity::{Quantity, QuantityError};
pub use token::SessionToken;
