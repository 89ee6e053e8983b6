//! Cart routes. Every route requires an authenticated user.

use axum::{
    Json,
    extract::{Path, Query, State},
};
use axum_extra::extract::WithRejection;
use serde::Deserialize;
use tracing::instrument;

use pearl_treasure_core::{CartLineId, PearlId, Quantity};

use super::Ack;
use crate::error::{AppError, Result};
use crate::middleware::RequireUser;
use crate::models::CartView;
use crate::state::AppState;

/// Body for `POST /api/cart/add`.
#[derive(Debug, Deserialize)]
pub struct AddToCartRequest {
    pub pearl_id: String,
    /// Defaults to one.
    pub quantity: Option<i64>,
}

/// Query for `PUT /api/cart/{id}`.
#[derive(Debug, Deserialize)]
pub struct UpdateQuery {
    pub quantity: i64,
}

/// The caller's cart, priced from the live catalog.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn show(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
) -> Result<Json<CartView>> {
    Ok(Json(state.cart().view(&user).await?))
}

/// Add a pearl, merging with an existing line for it.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn add(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    WithRejection(Json(request), _): WithRejection<Json<AddToCartRequest>, AppError>,
) -> Result<Json<Ack>> {
    let quantity = request
        .quantity
        .map_or(Ok(Quantity::ONE), Quantity::new)
        .map_err(|e| AppError::BadRequest(e.to_string()))?;

    state
        .cart()
        .add(&user, &PearlId::new(request.pearl_id), quantity)
        .await?;
    Ok(Json(Ack::new("Item added to cart")))
}

/// Remove a line.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn remove(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(line_id): Path<String>,
) -> Result<Json<Ack>> {
    state.cart().remove(&user, &CartLineId::new(line_id)).await?;
    Ok(Json(Ack::new("Item removed from cart")))
}

/// Set a line's quantity; zero or less removes it.
#[instrument(skip(state, user), fields(user_id = %user.id))]
pub async fn update(
    State(state): State<AppState>,
    RequireUser(user): RequireUser,
    Path(line_id): Path<String>,
    WithRejection(Query(query), _): WithRejection<Query<UpdateQuery>, AppError>,
) -> Result<Json<Ack>> {
    let line_id = CartLineId::new(line_id);
    state.cart().update(&user, &line_id, query.quantity).await?;

    let message = if query.quantity <= 0 {
        "Item removed from cart"
    } else {
        "Cart updated"
    };
    Ok(Json(Ack::new(message)))
}
