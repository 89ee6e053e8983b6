//! Cart repository.
//!
//! Each mutation is a single atomic primitive against one user's cart, so
//! concurrent adds of the same pearl merge instead of losing an update.
//! Setting a quantity by value is the one read-then-write at the service
//! level and is last-writer-wins.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;

use pearl_treasure_core::{CartId, CartLineId, PearlId, Quantity, UserId};

use super::RepositoryError;
use crate::models::{Cart, CartLine};

/// Storage operations for carts.
#[async_trait]
pub trait CartRepository: Send + Sync {
    /// The user's cart with its lines in insertion order, if it exists.
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>, RepositoryError>;

    /// The user's cart ID, creating an empty cart first if there is none.
    async fn get_or_create(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<CartId, RepositoryError>;

    /// Add `quantity` of `pearl_id` to the cart.
    ///
    /// If a line for the pearl already exists its quantity is increased,
    /// otherwise a new line is appended. Returns the resulting line.
    async fn add_or_merge_line(
        &self,
        cart_id: &CartId,
        pearl_id: &PearlId,
        quantity: Quantity,
        now: DateTime<Utc>,
    ) -> Result<CartLine, RepositoryError>;

    /// Set the quantity of one line and bump the cart's `updated_at`.
    ///
    /// Returns `Ok(false)` if the cart exists but has no such line, and
    /// `RepositoryError::NotFound` if the user has no cart.
    async fn set_line_quantity(
        &self,
        user_id: &UserId,
        line_id: &CartLineId,
        quantity: Quantity,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;

    /// Remove one line. Returns whether a line was removed; a missing cart
    /// or line is not an error.
    async fn remove_line(
        &self,
        user_id: &UserId,
        line_id: &CartLineId,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct CartRow {
    id: CartId,
    user_id: UserId,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

#[derive(sqlx::FromRow)]
struct CartLineRow {
    id: CartLineId,
    pearl_id: PearlId,
    quantity: i32,
    added_at: DateTime<Utc>,
}

impl TryFrom<CartLineRow> for CartLine {
    type Error = RepositoryError;

    fn try_from(row: CartLineRow) -> Result<Self, Self::Error> {
        let quantity = Quantity::new(i64::from(row.quantity)).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid quantity on cart line {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            pearl_id: row.pearl_id,
            quantity,
            added_at: row.added_at,
        })
    }
}

/// Quantity as bound to the `INTEGER` column.
fn quantity_param(quantity: Quantity) -> i32 {
    i32::try_from(quantity.get()).unwrap_or(i32::MAX)
}

/// `PostgreSQL` implementation of [`CartRepository`].
pub struct PgCartRepository {
    pool: PgPool,
}

impl PgCartRepository {
    /// Create a new cart repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CartRepository for PgCartRepository {
    async fn find_by_user(&self, user_id: &UserId) -> Result<Option<Cart>, RepositoryError> {
        let Some(cart) = sqlx::query_as::<_, CartRow>(
            r"
            SELECT id, user_id, created_at, updated_at
            FROM storefront.cart
            WHERE user_id = $1
            ",
        )
        .bind(user_id)
        .fetch_optional(&self.pool)
        .await?
        else {
            return Ok(None);
        };

        let lines = sqlx::query_as::<_, CartLineRow>(
            r"
            SELECT id, pearl_id, quantity, added_at
            FROM storefront.cart_line
            WHERE cart_id = $1
            ORDER BY seq
            ",
        )
        .bind(&cart.id)
        .fetch_all(&self.pool)
        .await?
        .into_iter()
        .map(CartLine::try_from)
        .collect::<Result<Vec<_>, _>>()?;

        Ok(Some(Cart {
            id: cart.id,
            user_id: cart.user_id,
            lines,
            created_at: cart.created_at,
            updated_at: cart.updated_at,
        }))
    }

    async fn get_or_create(
        &self,
        user_id: &UserId,
        now: DateTime<Utc>,
    ) -> Result<CartId, RepositoryError> {
        let inserted: Option<(CartId,)> = sqlx::query_as(
            r"
            INSERT INTO storefront.cart (id, user_id, created_at, updated_at)
            VALUES ($1, $2, $3, $3)
            ON CONFLICT (user_id) DO NOTHING
            RETURNING id
            ",
        )
        .bind(CartId::generate())
        .bind(user_id)
        .bind(now)
        .fetch_optional(&self.pool)
        .await?;

        if let Some((id,)) = inserted {
            return Ok(id);
        }

        let existing: Option<(CartId,)> =
            sqlx::query_as("SELECT id FROM storefront.cart WHERE user_id = $1")
                .bind(user_id)
                .fetch_optional(&self.pool)
                .await?;

        existing.map(|(id,)| id).ok_or(RepositoryError::NotFound)
    }

    async fn add_or_merge_line(
        &self,
        cart_id: &CartId,
        pearl_id: &PearlId,
        quantity: Quantity,
        now: DateTime<Utc>,
    ) -> Result<CartLine, RepositoryError> {
        let row = sqlx::query_as::<_, CartLineRow>(
            r"
            WITH line AS (
                INSERT INTO storefront.cart_line AS cl
                    (id, cart_id, pearl_id, quantity, added_at)
                VALUES ($1, $2, $3, $4, $5)
                ON CONFLICT (cart_id, pearl_id) DO UPDATE
                SET quantity = LEAST(cl.quantity::BIGINT + EXCLUDED.quantity, 2147483647)::INTEGER
                RETURNING id, pearl_id, quantity, added_at
            ), touched AS (
                UPDATE storefront.cart SET updated_at = $5 WHERE id = $2
            )
            SELECT id, pearl_id, quantity, added_at FROM line
            ",
        )
        .bind(CartLineId::generate())
        .bind(cart_id)
        .bind(pearl_id)
        .bind(quantity_param(quantity))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        CartLine::try_from(row)
    }

    async fn set_line_quantity(
        &self,
        user_id: &UserId,
        line_id: &CartLineId,
        quantity: Quantity,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let (carts, lines): (i64, i64) = sqlx::query_as(
            r"
            WITH cart AS (
                UPDATE storefront.cart SET updated_at = $4
                WHERE user_id = $1
                RETURNING id
            ), line AS (
                UPDATE storefront.cart_line SET quantity = $3
                WHERE id = $2 AND cart_id IN (SELECT id FROM cart)
                RETURNING id
            )
            SELECT (SELECT COUNT(*) FROM cart), (SELECT COUNT(*) FROM line)
            ",
        )
        .bind(user_id)
        .bind(line_id)
        .bind(quantity_param(quantity))
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        if carts == 0 {
            return Err(RepositoryError::NotFound);
        }
        Ok(lines > 0)
    }

    async fn remove_line(
        &self,
        user_id: &UserId,
        line_id: &CartLineId,
        now: DateTime<Utc>,
    ) -> Result<bool, RepositoryError> {
        let (removed,): (i64,) = sqlx::query_as(
            r"
            WITH cart AS (
                UPDATE storefront.cart SET updated_at = $3
                WHERE user_id = $1
                RETURNING id
            ), line AS (
                DELETE FROM storefront.cart_line
                WHERE id = $2 AND cart_id IN (SELECT id FROM cart)
                RETURNING id
            )
            SELECT COUNT(*) FROM line
            ",
        )
        .bind(user_id)
        .bind(line_id)
        .bind(now)
        .fetch_one(&self.pool)
        .await?;

        Ok(removed > 0)
    }
}
