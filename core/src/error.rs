//! Error taxonomy for validation and persistence.
//!
//! Validation failures are ordinary values, never exceptions in disguise:
//! the orchestrator returns a [`ValidationError`] naming the kind and the
//! offending field or relation, the write gate wraps it in [`StoreError`],
//! and the HTTP boundary translates it exactly once.

use crate::types::{AttendeeId, EventId, SessionId, TimeSlot, TrackId, VenueId};
use thiserror::Error;
use uuid::Uuid;

/// Result type alias for write-gate operations.
pub type StoreResult<T> = Result<T, StoreError>;

/// A business-rule violation detected by the validation orchestrator.
///
/// Ordering of checks is part of the contract: structural failures
/// (`InvalidInterval`, `InvalidCapacity`) are reported before relational
/// ones (`OutOfBounds`, `OverlapConflict`, `CapacityExceeded`).
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// An interval's end is not strictly after its start.
    #[error("{field}: end must be after start")]
    InvalidInterval {
        /// The offending field pair, e.g. `"end_date"` or `"end_time"`.
        field: &'static str,
    },

    /// A capacity below the usable minimum of 1.
    #[error("capacity must be at least 1, got {capacity}")]
    InvalidCapacity {
        /// The rejected capacity value.
        capacity: u32,
    },

    /// A capacity bound was exceeded: either an event asks for more than its
    /// venue holds, or a registration would push an event over capacity.
    #[error("{scope} capacity limit of {limit} exceeded")]
    CapacityExceeded {
        /// The aggregate whose bound was hit (`"venue"` or `"event"`).
        scope: &'static str,
        /// The bound that would have been exceeded.
        limit: u32,
    },

    /// A session interval falls outside its parent event's span.
    #[error("session {session} not within event span {event_span}")]
    OutOfBounds {
        /// The proposed session interval.
        session: TimeSlot,
        /// The parent event's span.
        event_span: TimeSlot,
    },

    /// A session interval overlaps a sibling in the same track.
    #[error("session overlaps {conflicting} in track {track}")]
    OverlapConflict {
        /// The track in which the conflict occurred.
        track: TrackId,
        /// The existing session that overlaps the proposal.
        conflicting: SessionId,
    },

    /// The `(attendee, event)` pair already exists.
    #[error("attendee {attendee} is already registered for event {event}")]
    DuplicateRegistration {
        /// The registering attendee.
        attendee: AttendeeId,
        /// The target event.
        event: EventId,
    },
}

/// Failure of a validated write or a read against the store.
///
/// Validation failures abort the enclosing transaction; nothing is retried
/// inside the store. All variants are reported to the caller, none are fatal
/// to the process.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum StoreError {
    /// A business-rule violation; the transaction was rolled back.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The referenced entity does not exist.
    #[error("{entity} with id {id} not found")]
    NotFound {
        /// Entity kind, e.g. `"event"`.
        entity: &'static str,
        /// The identifier that failed to resolve.
        id: Uuid,
    },

    /// A track title collides with an existing track of the same event.
    #[error("track titled {title:?} already exists for event {event}")]
    DuplicateTrack {
        /// The event owning the tracks.
        event: EventId,
        /// The colliding title.
        title: String,
    },

    /// A venue cannot be deleted while events still reference it.
    #[error("venue {venue} still has events and cannot be deleted")]
    VenueInUse {
        /// The referenced venue.
        venue: VenueId,
    },

    /// The storage engine failed; the write may be retried by the caller.
    #[error("storage error: {0}")]
    Storage(String),
}

impl StoreError {
    /// Shorthand for a [`StoreError::NotFound`] against a typed id.
    #[must_use]
    pub const fn not_found(entity: &'static str, id: Uuid) -> Self {
        Self::NotFound { entity, id }
    }

    /// Whether this error is a business-rule rejection rather than a fault.
    ///
    /// Rejections map to 4xx at the HTTP boundary; only
    /// [`StoreError::Storage`] is a server-side fault.
    #[must_use]
    pub const fn is_rejection(&self) -> bool {
        !matches!(self, Self::Storage(_))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn capacity_exceeded_names_the_scope() {
        let err = ValidationError::CapacityExceeded {
            scope: "venue",
            limit: 200,
        };
        assert_eq!(err.to_string(), "venue capacity limit of 200 exceeded");
    }

    #[test]
    fn validation_error_converts_into_store_error() {
        let err: StoreError = ValidationError::InvalidCapacity { capacity: 0 }.into();
        assert!(matches!(
            err,
            StoreError::Validation(ValidationError::InvalidCapacity { capacity: 0 })
        ));
        assert!(err.is_rejection());
    }

    #[test]
    fn storage_error_is_not_a_rejection() {
        assert!(!StoreError::Storage("connection reset".to_string()).is_rejection());
    }
}
