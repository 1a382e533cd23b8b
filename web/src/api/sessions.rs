//! Session management API endpoints.
//!
//! - POST /api/sessions - Schedule a session (requires auth)
//! - GET /api/sessions - List sessions, filterable by track or event
//! - GET /api/sessions/:id - Get session details
//! - PUT /api/sessions/:id - Reschedule or edit a session (requires auth)
//! - DELETE /api/sessions/:id - Remove a session (requires auth)

use crate::auth::Principal;
use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, Query, State},
    http::StatusCode,
};
use confplan_core::{EventId, NewSession, Session, SessionFilter, SessionId, SessionPatch, TrackId};
use serde::Deserialize;
use uuid::Uuid;

/// Query parameters for listing sessions. `track` wins when both are given.
#[derive(Debug, Deserialize)]
pub struct ListSessionsQuery {
    /// Restrict to one track.
    pub track: Option<Uuid>,
    /// Restrict to any track of this event.
    pub event: Option<Uuid>,
}

/// Schedule a new session. Containment in the event span and non-overlap
/// with track siblings are checked before anything is persisted.
pub async fn create_session(
    State(state): State<AppState>,
    _principal: Principal,
    Json(body): Json<NewSession>,
) -> Result<(StatusCode, Json<Session>), AppError> {
    let session = state.store.create_session(body).await?;
    tracing::info!(session_id = %session.id, track_id = %session.track_id, "session scheduled");
    Ok((StatusCode::CREATED, Json(session)))
}

/// List sessions ordered by start time.
pub async fn list_sessions(
    State(state): State<AppState>,
    Query(query): Query<ListSessionsQuery>,
) -> Result<Json<Vec<Session>>, AppError> {
    let filter = SessionFilter {
        track_id: query.track.map(TrackId::from_uuid),
        event_id: query.event.map(EventId::from_uuid),
    };
    Ok(Json(state.store.sessions(filter).await?))
}

/// Get a session by id.
pub async fn get_session(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(state.store.session(SessionId::from_uuid(id)).await?))
}

/// Apply a partial update to a session; the full session validation
/// re-runs with the session's own id excluded.
pub async fn update_session(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<Uuid>,
    Json(patch): Json<SessionPatch>,
) -> Result<Json<Session>, AppError> {
    Ok(Json(
        state.store.update_session(SessionId::from_uuid(id), patch).await?,
    ))
}

/// Delete a session.
pub async fn delete_session(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete_session(SessionId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
