//! Validation orchestrator: per-entity invariant composition.
//!
//! These functions are pure. The write gate reads dependent state (the
//! parent aggregate and the sibling set) inside its own transaction and
//! passes an explicit snapshot in, which is what makes every rule testable
//! with plain values. Checks stop at the first failure, ordered so the
//! cheaper structural failures surface before relational ones.

use crate::checks::{
    check_capacity, check_capacity_bound, check_contained, check_interval, check_no_overlap,
};
use crate::entities::{Registration, Session};
use crate::error::ValidationError;
use crate::types::{AttendeeId, EventId, RegistrationId, SessionId, TimeSlot, TrackId};

/// Validates an event draft against its venue.
///
/// Order: interval validity, capacity floor, venue capacity bound.
///
/// # Errors
///
/// The first of [`ValidationError::InvalidInterval`],
/// [`ValidationError::InvalidCapacity`] or
/// [`ValidationError::CapacityExceeded`] that applies.
pub fn validate_event(
    span: TimeSlot,
    capacity: u32,
    venue_capacity: u32,
) -> Result<(), ValidationError> {
    check_interval(span, "end_date")?;
    if capacity < 1 {
        return Err(ValidationError::InvalidCapacity { capacity });
    }
    check_capacity_bound(capacity, venue_capacity)
}

/// Validates a session slot against its event span and track siblings.
///
/// Order: interval validity, containment in the event span, overlap with
/// siblings. `excluding` removes the session's own id when re-validating an
/// update, so an unchanged session never conflicts with itself.
///
/// # Errors
///
/// The first of [`ValidationError::InvalidInterval`],
/// [`ValidationError::OutOfBounds`] or [`ValidationError::OverlapConflict`]
/// that applies.
pub fn validate_session(
    track: TrackId,
    slot: TimeSlot,
    event_span: TimeSlot,
    siblings: &[Session],
    excluding: Option<SessionId>,
) -> Result<(), ValidationError> {
    check_interval(slot, "end_time")?;
    check_contained(slot, event_span)?;
    let intervals: Vec<(SessionId, TimeSlot)> =
        siblings.iter().map(|s| (s.id, s.slot())).collect();
    check_no_overlap(track, slot, &intervals, excluding)
}

/// Validates a registration against the event's existing registrations.
///
/// Order: `(attendee, event)` uniqueness, then the capacity count.
/// `existing` is the event's persisted registration set read inside the
/// write gate's transaction; `excluding` removes the record being updated.
///
/// # Errors
///
/// [`ValidationError::DuplicateRegistration`] or
/// [`ValidationError::CapacityExceeded`].
pub fn validate_registration(
    attendee: AttendeeId,
    event: EventId,
    event_capacity: u32,
    existing: &[Registration],
    excluding: Option<RegistrationId>,
) -> Result<(), ValidationError> {
    let mut count: u32 = 0;
    for reg in existing {
        if Some(reg.id) == excluding {
            continue;
        }
        if reg.attendee_id == attendee {
            return Err(ValidationError::DuplicateRegistration { attendee, event });
        }
        count += 1;
    }
    check_capacity(event_capacity, count)
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 1, hour, min, 0).unwrap()
    }

    fn slot(sh: u32, sm: u32, eh: u32, em: u32) -> TimeSlot {
        TimeSlot::new(at(sh, sm), at(eh, em))
    }

    fn session(track: TrackId, sh: u32, sm: u32, eh: u32, em: u32) -> Session {
        Session {
            id: SessionId::new(),
            track_id: track,
            title: "Talk".to_string(),
            speaker_id: None,
            start_time: at(sh, sm),
            end_time: at(eh, em),
            room: None,
            created_at: Utc::now(),
        }
    }

    fn registration(event: EventId) -> Registration {
        Registration {
            id: RegistrationId::new(),
            attendee_id: AttendeeId::new(),
            event_id: event,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn event_checks_run_in_priority_order() {
        // A reversed interval with a zero capacity reports the interval
        // first: structural before relational.
        let err = validate_event(slot(17, 0, 9, 0), 0, 100).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidInterval { .. }));

        let err = validate_event(slot(9, 0, 17, 0), 0, 100).unwrap_err();
        assert!(matches!(err, ValidationError::InvalidCapacity { .. }));

        let err = validate_event(slot(9, 0, 17, 0), 101, 100).unwrap_err();
        assert!(matches!(err, ValidationError::CapacityExceeded { .. }));

        assert!(validate_event(slot(9, 0, 17, 0), 100, 100).is_ok());
    }

    #[test]
    fn session_out_of_bounds_reported_before_overlap() {
        let track = TrackId::new();
        let siblings = vec![session(track, 8, 0, 12, 0)];

        // 07:00-08:30 both escapes the 09:00-17:00 span and would overlap
        // a (hypothetical) sibling; containment wins.
        let err = validate_session(
            track,
            slot(7, 0, 8, 30),
            slot(9, 0, 17, 0),
            &siblings,
            None,
        )
        .unwrap_err();
        assert!(matches!(err, ValidationError::OutOfBounds { .. }));
    }

    #[test]
    fn session_update_excluding_self_is_idempotent() {
        let track = TrackId::new();
        let existing = session(track, 9, 0, 10, 0);
        let own_id = existing.id;
        let siblings = vec![existing];

        // Re-submitting identical values for the same record passes.
        assert!(
            validate_session(track, slot(9, 0, 10, 0), slot(9, 0, 17, 0), &siblings, Some(own_id))
                .is_ok()
        );
    }

    #[test]
    fn registration_duplicate_reported_before_capacity() {
        let event = EventId::new();
        let existing = registration(event);
        let attendee = existing.attendee_id;
        let regs = vec![existing];

        // Same attendee again: duplicate, even though capacity is also full.
        let err = validate_registration(attendee, event, 1, &regs, None).unwrap_err();
        assert!(matches!(err, ValidationError::DuplicateRegistration { .. }));

        // Different attendee: the capacity bound rejects.
        let err = validate_registration(AttendeeId::new(), event, 1, &regs, None).unwrap_err();
        assert!(matches!(err, ValidationError::CapacityExceeded { .. }));
    }

    #[test]
    fn registration_update_excludes_own_record_from_count() {
        let event = EventId::new();
        let existing = registration(event);
        let own = existing.id;
        let attendee = existing.attendee_id;
        let regs = vec![existing];

        // Updating the sole registration of a capacity-1 event in place
        // must not count itself.
        assert!(validate_registration(attendee, event, 1, &regs, Some(own)).is_ok());
    }
}
