//! Event management API endpoints.
//!
//! - POST /api/events - Create an event (requires auth)
//! - GET /api/events - List events
//! - GET /api/events/:id - Get event details with registration count
//! - PUT /api/events/:id - Update an event (requires auth)
//! - DELETE /api/events/:id - Delete an event and everything under it
//!   (requires auth)

use crate::auth::Principal;
use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use confplan_core::{Event, EventId, EventPatch, NewEvent};
use serde::Serialize;
use uuid::Uuid;

/// Event details plus its current registration count.
#[derive(Debug, Serialize)]
pub struct EventResponse {
    /// The event record.
    #[serde(flatten)]
    pub event: Event,
    /// Registrations currently held against the event.
    pub registration_count: u32,
}

async fn with_count(state: &AppState, event: Event) -> Result<EventResponse, AppError> {
    let registration_count = state.store.registration_count(event.id).await?;
    Ok(EventResponse {
        event,
        registration_count,
    })
}

/// Create a new event. Validates the date span and the capacity against
/// the venue before anything is persisted.
pub async fn create_event(
    State(state): State<AppState>,
    _principal: Principal,
    Json(body): Json<NewEvent>,
) -> Result<(StatusCode, Json<EventResponse>), AppError> {
    let event = state.store.create_event(body).await?;
    tracing::info!(event_id = %event.id, venue_id = %event.venue_id, "event created");
    Ok((StatusCode::CREATED, Json(with_count(&state, event).await?)))
}

/// List all events, most recent start first.
pub async fn list_events(
    State(state): State<AppState>,
) -> Result<Json<Vec<EventResponse>>, AppError> {
    let events = state.store.events().await?;
    let mut out = Vec::with_capacity(events.len());
    for event in events {
        out.push(with_count(&state, event).await?);
    }
    Ok(Json(out))
}

/// Get an event by id.
pub async fn get_event(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<EventResponse>, AppError> {
    let event = state.store.event(EventId::from_uuid(id)).await?;
    Ok(Json(with_count(&state, event).await?))
}

/// Apply a partial update to an event; the full event validation re-runs
/// against the (possibly new) venue.
pub async fn update_event(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<Uuid>,
    Json(patch): Json<EventPatch>,
) -> Result<Json<EventResponse>, AppError> {
    let event = state.store.update_event(EventId::from_uuid(id), patch).await?;
    Ok(Json(with_count(&state, event).await?))
}

/// Delete an event, cascading to its tracks, sessions and registrations.
pub async fn delete_event(
    State(state): State<AppState>,
    _principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    state.store.delete_event(EventId::from_uuid(id)).await?;
    Ok(StatusCode::NO_CONTENT)
}
