//! Error types for web handlers.
//!
//! Bridges domain errors into HTTP responses via Axum's `IntoResponse`.
//! Business-rule rejections map to 4xx; only storage faults become 5xx.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use confplan_core::{StoreError, error::ValidationError};
use serde::Serialize;
use std::fmt;

/// Application error type for web handlers.
///
/// Wraps domain errors and provides HTTP-friendly error responses.
///
/// # Examples
///
/// ```ignore
/// async fn handler(State(state): State<AppState>) -> Result<Json<Venue>, AppError> {
///     let venue = state.store.venue(id).await?;
///     Ok(Json(venue))
/// }
/// ```
#[derive(Debug)]
pub struct AppError {
    /// HTTP status code
    status: StatusCode,
    /// Error message (user-facing)
    message: String,
    /// Error code (for client error handling)
    code: String,
    /// Internal error (for logging, not exposed to client)
    #[allow(dead_code)]
    source: Option<anyhow::Error>,
}

impl AppError {
    /// Create a new application error.
    #[must_use]
    pub const fn new(status: StatusCode, message: String, code: String) -> Self {
        Self {
            status,
            message,
            code,
            source: None,
        }
    }

    /// Create a new error with a source error.
    #[must_use]
    pub fn with_source(mut self, source: anyhow::Error) -> Self {
        self.source = Some(source);
        self
    }

    /// Create a 400 Bad Request error.
    #[must_use]
    pub fn bad_request(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::BAD_REQUEST,
            message.into(),
            "BAD_REQUEST".to_string(),
        )
    }

    /// Create a 401 Unauthorized error.
    #[must_use]
    pub fn unauthorized(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNAUTHORIZED,
            message.into(),
            "UNAUTHORIZED".to_string(),
        )
    }

    /// Create a 404 Not Found error.
    #[must_use]
    pub fn not_found(resource: impl fmt::Display, id: impl fmt::Display) -> Self {
        Self::new(
            StatusCode::NOT_FOUND,
            format!("{resource} with id {id} not found"),
            "NOT_FOUND".to_string(),
        )
    }

    /// Create a 409 Conflict error.
    #[must_use]
    pub fn conflict(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::CONFLICT,
            message.into(),
            "CONFLICT".to_string(),
        )
    }

    /// Create a 422 Unprocessable Entity error.
    #[must_use]
    pub fn validation(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::UNPROCESSABLE_ENTITY,
            message.into(),
            "VALIDATION_ERROR".to_string(),
        )
    }

    /// Create a 500 Internal Server Error.
    #[must_use]
    pub fn internal(message: impl Into<String>) -> Self {
        Self::new(
            StatusCode::INTERNAL_SERVER_ERROR,
            message.into(),
            "INTERNAL_SERVER_ERROR".to_string(),
        )
    }
}

impl fmt::Display for AppError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}] {}", self.code, self.message)
    }
}

impl std::error::Error for AppError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn std::error::Error + 'static))
    }
}

/// Maps store errors onto the HTTP taxonomy.
///
/// - Structural validation failures (bad interval, bad capacity value,
///   session outside the event span) are 422.
/// - Relational conflicts (overlap, capacity hit, duplicates, venue still
///   referenced) are 409.
/// - Missing entities are 404, storage faults are 500.
impl From<StoreError> for AppError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::Validation(v) => match v {
                ValidationError::InvalidInterval { .. }
                | ValidationError::InvalidCapacity { .. }
                | ValidationError::OutOfBounds { .. } => Self::validation(v.to_string()),
                ValidationError::CapacityExceeded { scope: "event", .. } => {
                    Self::conflict("Event is full")
                }
                ValidationError::CapacityExceeded { .. }
                | ValidationError::OverlapConflict { .. }
                | ValidationError::DuplicateRegistration { .. } => Self::conflict(v.to_string()),
            },
            StoreError::NotFound { entity, id } => Self::not_found(entity, id),
            StoreError::DuplicateTrack { .. } | StoreError::VenueInUse { .. } => {
                Self::conflict(err.to_string())
            }
            StoreError::Storage(detail) => {
                Self::internal("An internal error occurred").with_source(anyhow::anyhow!(detail))
            }
        }
    }
}

/// Error response body (JSON).
#[derive(Debug, Serialize)]
struct ErrorResponse {
    /// Error code (for client error handling).
    code: String,
    /// Human-readable error message.
    message: String,
}

impl IntoResponse for AppError {
    fn into_response(self) -> Response {
        // Log internal errors
        if self.status.is_server_error() {
            if let Some(source) = &self.source {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    error = %source,
                    "Internal server error"
                );
            } else {
                tracing::error!(
                    status = %self.status,
                    code = %self.code,
                    message = %self.message,
                    "Internal server error"
                );
            }
        }

        let body = ErrorResponse {
            code: self.code,
            message: self.message,
        };

        (self.status, Json(body)).into_response()
    }
}

/// Convert `anyhow::Error` to `AppError`.
impl From<anyhow::Error> for AppError {
    fn from(err: anyhow::Error) -> Self {
        Self::internal("An internal error occurred").with_source(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use confplan_core::{AttendeeId, EventId};

    #[test]
    fn test_error_display() {
        let err = AppError::bad_request("Invalid input");
        assert_eq!(err.to_string(), "[BAD_REQUEST] Invalid input");
    }

    #[test]
    fn test_not_found_mapping() {
        let err: AppError = StoreError::not_found("event", uuid::Uuid::nil()).into();
        assert_eq!(err.status, StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_full_event_maps_to_conflict() {
        let err: AppError = StoreError::Validation(ValidationError::CapacityExceeded {
            scope: "event",
            limit: 2,
        })
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
        assert_eq!(err.message, "Event is full");
    }

    #[test]
    fn test_venue_bound_maps_to_conflict() {
        let err: AppError = StoreError::Validation(ValidationError::CapacityExceeded {
            scope: "venue",
            limit: 100,
        })
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }

    #[test]
    fn test_inverted_interval_maps_to_validation() {
        let err: AppError =
            StoreError::Validation(ValidationError::InvalidInterval { field: "end_time" }).into();
        assert_eq!(err.status, StatusCode::UNPROCESSABLE_ENTITY);
    }

    #[test]
    fn test_duplicate_registration_maps_to_conflict() {
        let err: AppError = StoreError::Validation(ValidationError::DuplicateRegistration {
            attendee: AttendeeId::new(),
            event: EventId::new(),
        })
        .into();
        assert_eq!(err.status, StatusCode::CONFLICT);
    }
}
