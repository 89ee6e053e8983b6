//! Cart documents and the priced cart view.

use chrono::{DateTime, Utc};
use serde::Serialize;

use pearl_treasure_core::{CartId, CartLineId, PearlId, Price, Quantity, UserId};

use super::Pearl;

/// One mutable cart per user, created lazily on first mutation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cart {
    pub id: CartId,
    /// Owner; at most one cart exists per user.
    pub user_id: UserId,
    /// Lines in insertion order. No two lines reference the same pearl.
    pub lines: Vec<CartLine>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Cart {
    /// An empty cart for `user_id`.
    #[must_use]
    pub fn empty(user_id: UserId, now: DateTime<Utc>) -> Self {
        Self {
            id: CartId::generate(),
            user_id,
            lines: Vec::new(),
            created_at: now,
            updated_at: now,
        }
    }

    /// Sum of quantities over every stored line, priced or not.
    #[must_use]
    pub fn item_count(&self) -> u64 {
        self.lines.iter().map(|l| u64::from(l.quantity.get())).sum()
    }
}

/// A (pearl, quantity) entry in a cart. The id is the external handle used
/// by update and remove.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CartLine {
    pub id: CartLineId,
    pub pearl_id: PearlId,
    pub quantity: Quantity,
    pub added_at: DateTime<Utc>,
}

impl CartLine {
    /// A new line with a fresh id.
    #[must_use]
    pub fn new(pearl_id: PearlId, quantity: Quantity, now: DateTime<Utc>) -> Self {
        Self {
            id: CartLineId::generate(),
            pearl_id,
            quantity,
            added_at: now,
        }
    }
}

/// A cart line joined with its live catalog entry.
#[derive(Debug, Clone, Serialize)]
pub struct CartLineView {
    pub id: CartLineId,
    pub pearl: Pearl,
    pub quantity: Quantity,
    /// Current price times quantity.
    #[serde(rename = "total")]
    pub subtotal: Price,
}

/// What `GET /cart` returns.
///
/// `total` covers only lines whose pearl still exists; `count` covers every
/// stored line. The two can diverge when a pearl has left the catalog.
#[derive(Debug, Clone, Serialize)]
pub struct CartView {
    pub items: Vec<CartLineView>,
    pub total: Price,
    pub count: u64,
}

impl CartView {
    /// The view of a cart that does not exist yet.
    #[must_use]
    pub const fn empty() -> Self {
        Self {
            items: Vec::new(),
            total: Price::ZERO,
            count: 0,
        }
    }
}
