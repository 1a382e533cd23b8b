//! Pure invariant checkers.
//!
//! Each checker decides a single invariant over values the caller has
//! already read; none of them touch storage. The validation orchestrator
//! in [`crate::validate`] composes them per entity.

use crate::error::ValidationError;
use crate::types::{SessionId, TimeSlot, TrackId};

/// Checks that an interval is well-formed (`end > start`).
///
/// `field` names the offending field pair in the error, e.g. `"end_date"`
/// for events or `"end_time"` for sessions.
///
/// # Errors
///
/// [`ValidationError::InvalidInterval`] when `end <= start`.
pub fn check_interval(slot: TimeSlot, field: &'static str) -> Result<(), ValidationError> {
    if slot.is_valid() {
        Ok(())
    } else {
        Err(ValidationError::InvalidInterval { field })
    }
}

/// Checks a static capacity bound: an event may not ask for more seats than
/// its venue holds.
///
/// # Errors
///
/// [`ValidationError::CapacityExceeded`] when `requested > limit`.
pub fn check_capacity_bound(requested: u32, limit: u32) -> Result<(), ValidationError> {
    if requested > limit {
        Err(ValidationError::CapacityExceeded {
            scope: "venue",
            limit,
        })
    } else {
        Ok(())
    }
}

/// Checks a counted capacity bound: one more registration must still fit
/// under the event's capacity.
///
/// `current_count` is the number of persisted registrations for the event,
/// excluding the record being updated (if any) — the caller counts inside
/// its transaction so the count cannot go stale under the write gate's lock.
///
/// # Errors
///
/// [`ValidationError::CapacityExceeded`] when `current_count >= limit`.
pub fn check_capacity(limit: u32, current_count: u32) -> Result<(), ValidationError> {
    if current_count >= limit {
        Err(ValidationError::CapacityExceeded {
            scope: "event",
            limit,
        })
    } else {
        Ok(())
    }
}

/// Checks that `child` lies fully inside `parent`, inclusive at both ends.
///
/// # Errors
///
/// [`ValidationError::OutOfBounds`] when any part of `child` falls outside.
pub fn check_contained(child: TimeSlot, parent: TimeSlot) -> Result<(), ValidationError> {
    if parent.contains(&child) {
        Ok(())
    } else {
        Err(ValidationError::OutOfBounds {
            session: child,
            event_span: parent,
        })
    }
}

/// Checks that `candidate` overlaps none of the sibling intervals in a
/// track, excluding the record being updated.
///
/// Overlap uses the strict rule `existing.start < candidate.end &&
/// existing.end > candidate.start`, so adjacency is permitted: back-to-back
/// sessions in the same track are fine.
///
/// # Errors
///
/// [`ValidationError::OverlapConflict`] naming the first conflicting
/// sibling.
pub fn check_no_overlap(
    track: TrackId,
    candidate: TimeSlot,
    siblings: &[(SessionId, TimeSlot)],
    excluding: Option<SessionId>,
) -> Result<(), ValidationError> {
    for (id, slot) in siblings {
        if Some(*id) == excluding {
            continue;
        }
        if slot.overlaps(&candidate) {
            return Err(ValidationError::OverlapConflict {
                track,
                conflicting: *id,
            });
        }
    }
    Ok(())
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use proptest::prelude::*;

    fn at(hour: u32, min: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 11, 1, hour, min, 0).unwrap()
    }

    fn slot(sh: u32, sm: u32, eh: u32, em: u32) -> TimeSlot {
        TimeSlot::new(at(sh, sm), at(eh, em))
    }

    #[test]
    fn interval_check_rejects_reversed_and_empty() {
        assert!(check_interval(slot(9, 0, 10, 0), "end_time").is_ok());
        assert_eq!(
            check_interval(slot(10, 0, 10, 0), "end_time"),
            Err(ValidationError::InvalidInterval { field: "end_time" })
        );
        assert!(check_interval(slot(11, 0, 10, 0), "end_time").is_err());
    }

    #[test]
    fn capacity_bound_allows_equality() {
        // Scenario A: event capacity 200 at a 200-capacity venue is fine,
        // 201 is not.
        assert!(check_capacity_bound(200, 200).is_ok());
        assert_eq!(
            check_capacity_bound(201, 200),
            Err(ValidationError::CapacityExceeded {
                scope: "venue",
                limit: 200
            })
        );
    }

    #[test]
    fn counted_capacity_rejects_at_limit() {
        assert!(check_capacity(1, 0).is_ok());
        assert_eq!(
            check_capacity(1, 1),
            Err(ValidationError::CapacityExceeded {
                scope: "event",
                limit: 1
            })
        );
    }

    #[test]
    fn overlap_check_allows_adjacency() {
        let track = TrackId::new();
        let existing = SessionId::new();
        let siblings = vec![(existing, slot(9, 0, 10, 0))];

        // Scenario B: 10:00-11:00 after a 09:00-10:00 session is allowed.
        assert!(check_no_overlap(track, slot(10, 0, 11, 0), &siblings, None).is_ok());
        // 09:30-10:30 conflicts.
        assert_eq!(
            check_no_overlap(track, slot(9, 30, 10, 30), &siblings, None),
            Err(ValidationError::OverlapConflict {
                track,
                conflicting: existing
            })
        );
    }

    #[test]
    fn overlap_check_excludes_self_on_update() {
        let track = TrackId::new();
        let own = SessionId::new();
        let siblings = vec![(own, slot(9, 0, 10, 0))];

        // Re-validating an unchanged session must not conflict with itself.
        assert!(check_no_overlap(track, slot(9, 0, 10, 0), &siblings, Some(own)).is_ok());
        assert!(check_no_overlap(track, slot(9, 0, 10, 0), &siblings, None).is_err());
    }

    #[test]
    fn containment_rejects_session_before_event_opens() {
        // Scenario C: event 09:00-17:00, session 08:00-09:30 is out of bounds.
        let event = slot(9, 0, 17, 0);
        let session = slot(8, 0, 9, 30);
        assert!(matches!(
            check_contained(session, event),
            Err(ValidationError::OutOfBounds { .. })
        ));
    }

    proptest! {
        /// Overlap is symmetric: a conflicts with b iff b conflicts with a.
        #[test]
        fn overlap_is_symmetric(s1 in 0i64..1000, d1 in 1i64..100, s2 in 0i64..1000, d2 in 1i64..100) {
            let base = at(0, 0);
            let a = TimeSlot::new(base + chrono::Duration::minutes(s1), base + chrono::Duration::minutes(s1 + d1));
            let b = TimeSlot::new(base + chrono::Duration::minutes(s2), base + chrono::Duration::minutes(s2 + d2));
            prop_assert_eq!(a.overlaps(&b), b.overlaps(&a));
        }

        /// Non-overlapping valid intervals satisfy the pairwise ordering
        /// property: one ends before (or exactly when) the other starts.
        #[test]
        fn disjoint_intervals_are_ordered(s1 in 0i64..1000, d1 in 1i64..100, s2 in 0i64..1000, d2 in 1i64..100) {
            let base = at(0, 0);
            let a = TimeSlot::new(base + chrono::Duration::minutes(s1), base + chrono::Duration::minutes(s1 + d1));
            let b = TimeSlot::new(base + chrono::Duration::minutes(s2), base + chrono::Duration::minutes(s2 + d2));
            if !a.overlaps(&b) {
                prop_assert!(a.start >= b.end || b.start >= a.end);
            }
        }
    }
}
