//! Speaker management API endpoints.
//!
//! - POST /api/speakers - Create a speaker (requires auth)
//! - GET /api/speakers - List speakers
//! - GET /api/speakers/:id - Get speaker details
//! - PUT /api/speakers/:id - Update a speaker (requires auth)
//! - DELETE /api/speakers/:id - Delete a speaker, detaching its sessions
//!   (requires auth)

use crate::auth::Principal;
use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use confplan_core::{NewSpeaker, Speaker, SpeakerId, SpeakerPatch};
use uuid::Uuid;

/// Create a new speaker.
pub async fn create_speaker(
    State(state): State<AppState>,
    _principal: Principal,
    Json(body): Json<NewSpeaker>,
) -> Result<(StatusCode, Json<Speaker>), AppError> {
    let speaker = state.store.create_speaker(body).await?;
    Ok((StatusCode::CREATED, Json(speaker)))
}

/// List all speakers.
pub async fn list_speakers(State(state): State<AppState>) -> Result<Json<Vec<Speaker>>, AppError> {
    Ok(Json(state.store.speakers().await?))
}

/// Get a speaker by id.
pub async fn get_speaker(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Speaker>, AppError> {
    Ok(Json(state.store.speaker(SpeakerId::from_uuid(id)).await?))
}

/// Apply a partial update to a speaker.
pub async fn update_speaker(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<Uuid>,
    Json(patch): Json<SpeakerPatch>,
) -> Result<Json<Speaker>, AppError> {
    Ok(Json(
        state.store.update_speaker(SpeakerId::from_uuid(id), patch).await?,
    ))
}

/// Delete a speaker. Sessions keep running, just without a speaker.
pub async fn delete_speaker(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete_speaker(SpeakerId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
