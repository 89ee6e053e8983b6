//! Catalog routes.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use tracing::instrument;

use pearl_treasure_core::PearlId;

use super::Ack;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::{NewPearl, Pearl, PearlUpdate};
use crate::state::AppState;

/// Query parameters for listing pearls.
#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    /// Category name, or `all`.
    pub category: Option<String>,
    /// Case-insensitive text to find in name or description.
    pub search: Option<String>,
}

/// List in-stock pearls.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<Json<Vec<Pearl>>> {
    let pearls = state
        .catalog()
        .list(query.category.as_deref(), query.search.as_deref())
        .await?;
    Ok(Json(pearls))
}

/// Get one pearl.
#[instrument(skip(state))]
pub async fn show(State(state): State<AppState>, Path(id): Path<String>) -> Result<Json<Pearl>> {
    Ok(Json(state.catalog().get(&PearlId::new(id)).await?))
}

/// Add a pearl to the catalog.
#[instrument(skip(state, user, new_pearl), fields(user_id = %user.id))]
pub async fn create(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    WithRejection(Json(new_pearl), _): WithRejection<Json<NewPearl>, AppError>,
) -> Result<Json<Pearl>> {
    Ok(Json(state.catalog().create(new_pearl).await?))
}

/// Partially update a pearl.
#[instrument(skip(state, user, update), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
    WithRejection(Json(update), _): WithRejection<Json<PearlUpdate>, AppError>,
) -> Result<Json<Pearl>> {
    Ok(Json(state.catalog().update(&PearlId::new(id), update).await?))
}

/// Remove a pearl from the catalog.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn delete(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(id): Path<String>,
) -> Result<Json<Ack>> {
    tracing::info!("Deleting pearl");
    state.catalog().delete(&PearlId::new(id)).await?;
    Ok(Json(Ack::new("Pearl deleted")))
}
