//! Venue management API endpoints.
//!
//! - POST /api/venues - Create a venue (requires auth)
//! - GET /api/venues - List venues
//! - GET /api/venues/:id - Get venue details
//! - PUT /api/venues/:id - Update a venue (requires auth)
//! - DELETE /api/venues/:id - Delete a venue (requires auth, fails while
//!   events reference it)

use crate::auth::Principal;
use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use confplan_core::{NewVenue, Venue, VenueId, VenuePatch};
use uuid::Uuid;

/// Create a new venue.
pub async fn create_venue(
    State(state): State<AppState>,
    _principal: Principal,
    Json(body): Json<NewVenue>,
) -> Result<(StatusCode, Json<Venue>), AppError> {
    let venue = state.store.create_venue(body).await?;
    tracing::info!(venue_id = %venue.id, "venue created");
    Ok((StatusCode::CREATED, Json(venue)))
}

/// List all venues.
pub async fn list_venues(State(state): State<AppState>) -> Result<Json<Vec<Venue>>, AppError> {
    Ok(Json(state.store.venues().await?))
}

/// Get a venue by id.
pub async fn get_venue(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Venue>, AppError> {
    Ok(Json(state.store.venue(VenueId::from_uuid(id)).await?))
}

/// Apply a partial update to a venue.
pub async fn update_venue(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<Uuid>,
    Json(patch): Json<VenuePatch>,
) -> Result<Json<Venue>, AppError> {
    Ok(Json(
        state.store.update_venue(VenueId::from_uuid(id), patch).await?,
    ))
}

/// Delete a venue. Conflicts while events still reference it.
pub async fn delete_venue(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete_venue(VenueId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
