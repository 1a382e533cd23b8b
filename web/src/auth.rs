//! Authenticated principal extraction.
//!
//! Token issuance lives in the identity service; this API only consumes
//! tokens. A bearer token carries the attendee id, and handlers that mutate
//! state take a [`Principal`] argument, which rejects unauthenticated
//! requests with 401 before the handler body runs.

use crate::error::AppError;
use axum::{async_trait, extract::FromRequestParts, http::header::AUTHORIZATION, http::request::Parts};
use confplan_core::AttendeeId;
use uuid::Uuid;

/// The authenticated caller of a request.
///
/// Registrations are always stamped with the principal's attendee id;
/// request bodies never carry it.
#[derive(Clone, Copy, Debug)]
pub struct Principal {
    /// The caller's attendee identity.
    pub attendee_id: AttendeeId,
}

#[async_trait]
impl<S> FromRequestParts<S> for Principal
where
    S: Send + Sync,
{
    type Rejection = AppError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let header = parts
            .headers
            .get(AUTHORIZATION)
            .and_then(|value| value.to_str().ok())
            .ok_or_else(|| AppError::unauthorized("Missing Authorization header"))?;
        let token = header
            .strip_prefix("Bearer ")
            .ok_or_else(|| AppError::unauthorized("Expected a Bearer token"))?;
        let attendee = Uuid::parse_str(token.trim())
            .map_err(|_| AppError::unauthorized("Invalid bearer token"))?;
        Ok(Self {
            attendee_id: AttendeeId::from_uuid(attendee),
        })
    }
}
