//! Track management API endpoints.
//!
//! - POST /api/tracks - Create a track (requires auth)
//! - GET /api/tracks - List tracks
//! - GET /api/tracks/:id - Get track details
//! - PUT /api/tracks/:id - Update a track (requires auth)
//! - DELETE /api/tracks/:id - Delete a track and its sessions (requires auth)

use crate::auth::Principal;
use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use confplan_core::{NewTrack, Track, TrackId, TrackPatch};
use uuid::Uuid;

/// Create a new track; its title must be unique within the event.
pub async fn create_track(
    State(state): State<AppState>,
    _principal: Principal,
    Json(body): Json<NewTrack>,
) -> Result<(StatusCode, Json<Track>), AppError> {
    let track = state.store.create_track(body).await?;
    Ok((StatusCode::CREATED, Json(track)))
}

/// List all tracks.
pub async fn list_tracks(State(state): State<AppState>) -> Result<Json<Vec<Track>>, AppError> {
    Ok(Json(state.store.tracks().await?))
}

/// Get a track by id.
pub async fn get_track(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Track>, AppError> {
    Ok(Json(state.store.track(TrackId::from_uuid(id)).await?))
}

/// Apply a partial update to a track.
pub async fn update_track(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<Uuid>,
    Json(patch): Json<TrackPatch>,
) -> Result<Json<Track>, AppError> {
    Ok(Json(
        state.store.update_track(TrackId::from_uuid(id), patch).await?,
    ))
}

/// Delete a track, cascading to its sessions.
pub async fn delete_track(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete_track(TrackId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
