//! Cart engine.
//!
//! A user's cart is created on the first add; until then reads return an
//! empty view without touching storage. Lines are priced at read time from
//! the live catalog, so price changes show up on the next read.

use chrono::Utc;
use thiserror::Error;

use pearl_treasure_core::{CartLineId, PearlId, Price, Quantity, QuantityError};

use crate::db::{CartRepository, PearlRepository, RepositoryError};
use crate::models::{CartLine, CartLineView, CartView, User};

/// Errors that can occur during cart operations.
#[derive(Debug, Error)]
pub enum CartError {
    /// The pearl being added is not in the catalog.
    #[error("pearl not found: {0}")]
    PearlNotFound(PearlId),

    /// The user has no cart to update.
    #[error("cart not found")]
    CartNotFound,

    /// Quantity out of range.
    #[error("invalid quantity: {0}")]
    InvalidQuantity(#[from] QuantityError),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

/// Reads and mutates one user's cart.
pub struct CartEngine<'a> {
    carts: &'a dyn CartRepository,
    pearls: &'a dyn PearlRepository,
}

impl<'a> CartEngine<'a> {
    /// Create a new cart engine.
    #[must_use]
    pub const fn new(carts: &'a dyn CartRepository, pearls: &'a dyn PearlRepository) -> Self {
        Self { carts, pearls }
    }

    /// The user's cart priced against the current catalog.
    ///
    /// Lines whose pearl has left the catalog are left out of `items` and
    /// `total` but still counted in `count`.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if storage fails.
    pub async fn view(&self, user: &User) -> Result<CartView, CartError> {
        let Some(cart) = self.carts.find_by_user(&user.id).await? else {
            return Ok(CartView::empty());
        };

        let count = cart.item_count();
        let mut items = Vec::with_capacity(cart.lines.len());
        for line in cart.lines {
            match self.pearls.get(&line.pearl_id).await? {
                Some(pearl) => items.push(CartLineView {
                    subtotal: pearl.price.times(line.quantity),
                    id: line.id,
                    pearl,
                    quantity: line.quantity,
                }),
                None => {
                    tracing::debug!(
                        cart_id = %cart.id,
                        pearl_id = %line.pearl_id,
                        "Skipping cart line for a pearl no longer in the catalog"
                    );
                }
            }
        }
        let total: Price = items.iter().map(|item| item.subtotal).sum();

        Ok(CartView {
            items,
            total,
            count,
        })
    }

    /// Add `quantity` of a pearl, merging into an existing line for it.
    ///
    /// The pearl is checked before anything is written; the cart is
    /// created if the user has none.
    ///
    /// # Errors
    ///
    /// Returns `CartError::PearlNotFound` if the pearl is not in the catalog.
    pub async fn add(
        &self,
        user: &User,
        pearl_id: &PearlId,
        quantity: Quantity,
    ) -> Result<CartLine, CartError> {
        if self.pearls.get(pearl_id).await?.is_none() {
            return Err(CartError::PearlNotFound(pearl_id.clone()));
        }

        let now = Utc::now();
        let cart_id = self.carts.get_or_create(&user.id, now).await?;
        let line = self
            .carts
            .add_or_merge_line(&cart_id, pearl_id, quantity, now)
            .await?;

        tracing::debug!(
            cart_id = %cart_id,
            line_id = %line.id,
            quantity = %line.quantity,
            "Added to cart"
        );
        Ok(line)
    }

    /// Set a line's quantity. A quantity of zero or less removes the line.
    ///
    /// Updating a line that is not in the cart succeeds without changes.
    ///
    /// # Errors
    ///
    /// Returns `CartError::CartNotFound` if the user has no cart (positive
    /// quantities only) and `CartError::InvalidQuantity` if the quantity is
    /// too large.
    pub async fn update(
        &self,
        user: &User,
        line_id: &CartLineId,
        quantity: i64,
    ) -> Result<(), CartError> {
        if quantity <= 0 {
            return self.remove(user, line_id).await;
        }
        let quantity = Quantity::new(quantity)?;

        let found = self
            .carts
            .set_line_quantity(&user.id, line_id, quantity, Utc::now())
            .await
            .map_err(|e| match e {
                RepositoryError::NotFound => CartError::CartNotFound,
                other => CartError::Repository(other),
            })?;

        if !found {
            tracing::debug!(line_id = %line_id, "Quantity update for a line not in the cart");
        }
        Ok(())
    }

    /// Remove a line. Removing a line (or from a cart) that does not exist
    /// is not an error.
    ///
    /// # Errors
    ///
    /// Returns `CartError::Repository` if storage fails.
    pub async fn remove(&self, user: &User, line_id: &CartLineId) -> Result<(), CartError> {
        let removed = self.carts.remove_line(&user.id, line_id, Utc::now()).await?;
        if !removed {
            tracing::debug!(line_id = %line_id, "Remove for a line not in the cart");
        }
        Ok(())
    }
}
