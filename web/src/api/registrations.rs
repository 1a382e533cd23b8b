//! Registration API endpoints.
//!
//! All routes require auth and operate on the caller's own registrations;
//! someone else's registration answers 404, never 403, so ids are not
//! probeable. The attendee on a registration always comes from the bearer
//! token, request bodies only name the event.
//!
//! - POST /api/registrations - Register the caller for an event
//! - GET /api/registrations - List the caller's registrations
//! - GET /api/registrations/:id - Get one of the caller's registrations
//! - PUT /api/registrations/:id - Move a registration to another event
//! - DELETE /api/registrations/:id - Cancel a registration, freeing a seat

use crate::auth::Principal;
use crate::error::AppError;
use crate::server::state::AppState;
use axum::{
    Json,
    extract::{Path, State},
    http::StatusCode,
};
use confplan_core::{EventId, NewRegistration, Registration, RegistrationId};
use serde::Deserialize;
use uuid::Uuid;

/// Request to create or move a registration.
#[derive(Debug, Deserialize)]
pub struct RegistrationRequest {
    /// The target event.
    pub event_id: EventId,
}

/// Fetches a registration and hides it unless the caller owns it.
async fn owned_registration(
    state: &AppState,
    principal: Principal,
    id: RegistrationId,
) -> Result<Registration, AppError> {
    let registration = state.store.registration(id).await?;
    if registration.attendee_id != principal.attendee_id {
        return Err(AppError::not_found("registration", *id.as_uuid()));
    }
    Ok(registration)
}

/// Register the caller for an event. Duplicate registrations and full
/// events are rejected.
pub async fn create_registration(
    State(state): State<AppState>,
    principal: Principal,
    Json(body): Json<RegistrationRequest>,
) -> Result<(StatusCode, Json<Registration>), AppError> {
    let registration = state
        .store
        .create_registration(NewRegistration {
            attendee_id: principal.attendee_id,
            event_id: body.event_id,
        })
        .await?;
    tracing::info!(
        registration_id = %registration.id,
        event_id = %registration.event_id,
        "attendee registered"
    );
    Ok((StatusCode::CREATED, Json(registration)))
}

/// List the caller's registrations.
pub async fn list_registrations(
    State(state): State<AppState>,
    principal: Principal,
) -> Result<Json<Vec<Registration>>, AppError> {
    Ok(Json(
        state.store.registrations(Some(principal.attendee_id)).await?,
    ))
}

/// Get one of the caller's registrations by id.
pub async fn get_registration(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<Json<Registration>, AppError> {
    let registration =
        owned_registration(&state, principal, RegistrationId::from_uuid(id)).await?;
    Ok(Json(registration))
}

/// Move one of the caller's registrations to another event. Uniqueness and
/// capacity are revalidated against the target event.
pub async fn update_registration(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
    Json(body): Json<RegistrationRequest>,
) -> Result<Json<Registration>, AppError> {
    let id = RegistrationId::from_uuid(id);
    owned_registration(&state, principal, id).await?;
    Ok(Json(state.store.update_registration(id, body.event_id).await?))
}

/// Cancel one of the caller's registrations.
pub async fn delete_registration(
    State(state): State<AppState>,
    principal: Principal,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, AppError> {
    let id = RegistrationId::from_uuid(id);
    owned_registration(&state, principal, id).await?;
    state.store.delete_registration(id).await?;
    Ok(StatusCode::NO_CONTENT)
}
