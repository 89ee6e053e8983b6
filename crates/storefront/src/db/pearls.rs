//! Catalog repository.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;

use pearl_treasure_core::{PearlCategory, PearlId, Price};

use super::{RepositoryError, map_unique_violation};
use crate::models::pearl::LIST_LIMIT;
use crate::models::{Pearl, PearlQuery, PearlUpdate};

/// Storage operations for the catalog.
#[async_trait]
pub trait PearlRepository: Send + Sync {
    /// List in-stock pearls matching `query`, oldest first, at most
    /// [`LIST_LIMIT`] of them.
    async fn list(&self, query: &PearlQuery) -> Result<Vec<Pearl>, RepositoryError>;

    /// Get a pearl by ID.
    async fn get(&self, id: &PearlId) -> Result<Option<Pearl>, RepositoryError>;

    /// Insert a pearl. Returns `RepositoryError::Conflict` on a duplicate ID.
    async fn create(&self, pearl: &Pearl) -> Result<Pearl, RepositoryError>;

    /// Apply a partial update. Returns `None` if the pearl does not exist.
    async fn update(
        &self,
        id: &PearlId,
        update: PearlUpdate,
    ) -> Result<Option<Pearl>, RepositoryError>;

    /// Delete a pearl. Returns whether it existed.
    async fn delete(&self, id: &PearlId) -> Result<bool, RepositoryError>;

    /// Number of pearls in the catalog, in stock or not.
    async fn count(&self) -> Result<u64, RepositoryError>;
}

#[derive(sqlx::FromRow)]
struct PearlRow {
    id: PearlId,
    name: String,
    price: Decimal,
    category: String,
    image: String,
    description: String,
    size: String,
    origin: String,
    in_stock: bool,
    created_at: DateTime<Utc>,
}

impl TryFrom<PearlRow> for Pearl {
    type Error = RepositoryError;

    fn try_from(row: PearlRow) -> Result<Self, Self::Error> {
        let price = Price::new(row.price).map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid price for pearl {}: {e}", row.id))
        })?;
        let category = row.category.parse::<PearlCategory>().map_err(|e| {
            RepositoryError::DataCorruption(format!("invalid category for pearl {}: {e}", row.id))
        })?;

        Ok(Self {
            id: row.id,
            name: row.name,
            price,
            category,
            image: row.image,
            description: row.description,
            size: row.size,
            origin: row.origin,
            in_stock: row.in_stock,
            created_at: row.created_at,
        })
    }
}

/// Build an `ILIKE` pattern that matches `needle` literally anywhere.
fn contains_pattern(needle: &str) -> String {
    let mut pattern = String::with_capacity(needle.len() + 2);
    pattern.push('%');
    for c in needle.chars() {
        if matches!(c, '%' | '_' | '\\') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// `PostgreSQL` implementation of [`PearlRepository`].
pub struct PgPearlRepository {
    pool: PgPool,
}

impl PgPearlRepository {
    /// Create a new catalog repository.
    #[must_use]
    pub const fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PearlRepository for PgPearlRepository {
    async fn list(&self, query: &PearlQuery) -> Result<Vec<Pearl>, RepositoryError> {
        let rows = sqlx::query_as::<_, PearlRow>(
            r"
            SELECT id, name, price, category, image, description, size, origin,
                   in_stock, created_at
            FROM storefront.pearl
            WHERE in_stock
              AND ($1::TEXT IS NULL OR category = $1)
              AND ($2::TEXT IS NULL
                   OR name ILIKE $2 ESCAPE '\'
                   OR description ILIKE $2 ESCAPE '\')
            ORDER BY created_at, id
            LIMIT $3
            ",
        )
        .bind(query.category.map(|c| c.as_str()))
        .bind(query.search.as_deref().map(contains_pattern))
        .bind(i64::try_from(LIST_LIMIT).unwrap_or(i64::MAX))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(Pearl::try_from).collect()
    }

    async fn get(&self, id: &PearlId) -> Result<Option<Pearl>, RepositoryError> {
        sqlx::query_as::<_, PearlRow>(
            r"
            SELECT id, name, price, category, image, description, size, origin,
                   in_stock, created_at
            FROM storefront.pearl
            WHERE id = $1
            ",
        )
        .bind(id)
        .fetch_optional(&self.pool)
        .await?
        .map(Pearl::try_from)
        .transpose()
    }

    async fn create(&self, pearl: &Pearl) -> Result<Pearl, RepositoryError> {
        let row = sqlx::query_as::<_, PearlRow>(
            r"
            INSERT INTO storefront.pearl
                (id, name, price, category, image, description, size, origin,
                 in_stock, created_at)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            RETURNING id, name, price, category, image, description, size, origin,
                      in_stock, created_at
            ",
        )
        .bind(&pearl.id)
        .bind(&pearl.name)
        .bind(pearl.price.amount())
        .bind(pearl.category.as_str())
        .bind(&pearl.image)
        .bind(&pearl.description)
        .bind(&pearl.size)
        .bind(&pearl.origin)
        .bind(pearl.in_stock)
        .bind(pearl.created_at)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_unique_violation(e, "pearl id"))?;

        Pearl::try_from(row)
    }

    async fn update(
        &self,
        id: &PearlId,
        update: PearlUpdate,
    ) -> Result<Option<Pearl>, RepositoryError> {
        sqlx::query_as::<_, PearlRow>(
            r"
            UPDATE storefront.pearl
            SET name = COALESCE($2, name),
                price = COALESCE($3, price),
                category = COALESCE($4, category),
                image = COALESCE($5, image),
                description = COALESCE($6, description),
                size = COALESCE($7, size),
                origin = COALESCE($8, origin),
                in_stock = COALESCE($9, in_stock)
            WHERE id = $1
            RETURNING id, name, price, category, image, description, size, origin,
                      in_stock, created_at
            ",
        )
        .bind(id)
        .bind(update.name)
        .bind(update.price.map(|p| p.amount()))
        .bind(update.category.map(|c| c.as_str()))
        .bind(update.image)
        .bind(update.description)
        .bind(update.size)
        .bind(update.origin)
        .bind(update.in_stock)
        .fetch_optional(&self.pool)
        .await?
        .map(Pearl::try_from)
        .transpose()
    }

    async fn delete(&self, id: &PearlId) -> Result<bool, RepositoryError> {
        let result = sqlx::query("DELETE FROM storefront.pearl WHERE id = $1")
            .bind(id)
            .execute(&self.pool)
            .await?;

        Ok(result.rows_affected() > 0)
    }

    async fn count(&self) -> Result<u64, RepositoryError> {
        let (count,): (i64,) = sqlx::query_as("SELECT COUNT(*) FROM storefront.pearl")
            .fetch_one(&self.pool)
            .await?;

        u64::try_from(count)
            .map_err(|_| RepositoryError::DataCorruption(format!("negative row count {count}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_contains_pattern_escapes_wildcards() {
        assert_eq!(contains_pattern("ring"), "%ring%");
        assert_eq!(contains_pattern("100%"), "%100\\%%");
        assert_eq!(contains_pattern("a_b\\c"), "%a\\_b\\\\c%");
    }
}
