//! Scheduling scenarios against the in-memory store.
//!
//! These exercise the write gate end to end: every rejection observed here
//! must hold identically against the PostgreSQL store.

#![allow(clippy::unwrap_used)]

use confplan_testing::{MemoryStore, fixtures};

use confplan_core::{
    AttendeeId, EventPatch, NewRegistration, ScheduleStore, SessionPatch, StoreError,
    error::ValidationError,
};
use std::sync::Arc;

fn validation(err: &StoreError) -> &ValidationError {
    match err {
        StoreError::Validation(v) => v,
        other => panic!("expected validation error, got {other:?}"),
    }
}

// ============================================================================
// Event capacity against venue capacity
// ============================================================================

#[tokio::test]
async fn event_capacity_cannot_exceed_venue_capacity() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();

    let err = store
        .create_event(fixtures::event(venue.id, 150))
        .await
        .unwrap_err();
    assert!(matches!(
        validation(&err),
        ValidationError::CapacityExceeded { scope: "venue", limit: 100 }
    ));

    // Exactly at the venue limit is allowed.
    assert!(store.create_event(fixtures::event(venue.id, 100)).await.is_ok());
}

#[tokio::test]
async fn event_cannot_grow_past_venue_on_update() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let event = store
        .create_event(fixtures::event(venue.id, 80))
        .await
        .unwrap();

    let err = store
        .update_event(
            event.id,
            EventPatch {
                capacity: Some(120),
                ..EventPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        validation(&err),
        ValidationError::CapacityExceeded { scope: "venue", .. }
    ));

    // The event is unchanged after the rejection.
    let unchanged = store.event(event.id).await.unwrap();
    assert_eq!(unchanged.capacity, 80);
}

#[tokio::test]
async fn moving_event_to_smaller_venue_is_rejected() {
    let store = MemoryStore::new();
    let big = store.create_venue(fixtures::venue(100)).await.unwrap();
    let small = store.create_venue(fixtures::venue(40)).await.unwrap();
    let event = store.create_event(fixtures::event(big.id, 80)).await.unwrap();

    let err = store
        .update_event(
            event.id,
            EventPatch {
                venue_id: Some(small.id),
                ..EventPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        validation(&err),
        ValidationError::CapacityExceeded { scope: "venue", limit: 40 }
    ));
    assert_eq!(store.event(event.id).await.unwrap().venue_id, big.id);
}

#[tokio::test]
async fn inverted_event_dates_are_rejected() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let mut new = fixtures::event(venue.id, 50);
    new.start_date = fixtures::at(17, 0);
    new.end_date = fixtures::at(9, 0);

    let err = store.create_event(new).await.unwrap_err();
    assert!(matches!(
        validation(&err),
        ValidationError::InvalidInterval { .. }
    ));
}

// ============================================================================
// Session overlap within a track
// ============================================================================

#[tokio::test]
async fn overlapping_sessions_in_same_track_are_rejected() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let event = store.create_event(fixtures::event(venue.id, 50)).await.unwrap();
    let track = store
        .create_track(fixtures::track(event.id, "Backend"))
        .await
        .unwrap();

    let first = store
        .create_session(fixtures::session(track.id, 10, 12))
        .await
        .unwrap();

    let err = store
        .create_session(fixtures::session(track.id, 11, 13))
        .await
        .unwrap_err();
    match validation(&err) {
        ValidationError::OverlapConflict { track: t, conflicting } => {
            assert_eq!(*t, track.id);
            assert_eq!(*conflicting, first.id);
        }
        other => panic!("expected overlap conflict, got {other:?}"),
    }
}

#[tokio::test]
async fn back_to_back_sessions_are_allowed() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let event = store.create_event(fixtures::event(venue.id, 50)).await.unwrap();
    let track = store
        .create_track(fixtures::track(event.id, "Backend"))
        .await
        .unwrap();

    store
        .create_session(fixtures::session(track.id, 10, 12))
        .await
        .unwrap();
    // Ends exactly where the next begins.
    assert!(store
        .create_session(fixtures::session(track.id, 12, 14))
        .await
        .is_ok());
    assert!(store
        .create_session(fixtures::session(track.id, 9, 10))
        .await
        .is_ok());
}

#[tokio::test]
async fn same_slot_in_different_tracks_is_allowed() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let event = store.create_event(fixtures::event(venue.id, 50)).await.unwrap();
    let backend = store
        .create_track(fixtures::track(event.id, "Backend"))
        .await
        .unwrap();
    let frontend = store
        .create_track(fixtures::track(event.id, "Frontend"))
        .await
        .unwrap();

    store
        .create_session(fixtures::session(backend.id, 10, 12))
        .await
        .unwrap();
    assert!(store
        .create_session(fixtures::session(frontend.id, 10, 12))
        .await
        .is_ok());
}

#[tokio::test]
async fn rescheduling_a_session_ignores_its_own_slot() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let event = store.create_event(fixtures::event(venue.id, 50)).await.unwrap();
    let track = store
        .create_track(fixtures::track(event.id, "Backend"))
        .await
        .unwrap();
    let session = store
        .create_session(fixtures::session(track.id, 10, 12))
        .await
        .unwrap();

    // Shifting within its own current slot must not conflict with itself.
    let moved = store
        .update_session(
            session.id,
            SessionPatch {
                start_time: Some(fixtures::at(11, 0)),
                end_time: Some(fixtures::at(13, 0)),
                ..SessionPatch::default()
            },
        )
        .await
        .unwrap();
    assert_eq!(moved.start_time, fixtures::at(11, 0));
}

#[tokio::test]
async fn rescheduling_onto_a_sibling_is_rejected() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let event = store.create_event(fixtures::event(venue.id, 50)).await.unwrap();
    let track = store
        .create_track(fixtures::track(event.id, "Backend"))
        .await
        .unwrap();
    store
        .create_session(fixtures::session(track.id, 10, 12))
        .await
        .unwrap();
    let other = store
        .create_session(fixtures::session(track.id, 13, 14))
        .await
        .unwrap();

    let err = store
        .update_session(
            other.id,
            SessionPatch {
                start_time: Some(fixtures::at(11, 0)),
                end_time: Some(fixtures::at(12, 30)),
                ..SessionPatch::default()
            },
        )
        .await
        .unwrap_err();
    assert!(matches!(
        validation(&err),
        ValidationError::OverlapConflict { .. }
    ));
    // Unchanged after rejection.
    assert_eq!(
        store.session(other.id).await.unwrap().start_time,
        fixtures::at(13, 0)
    );
}

// ============================================================================
// Session containment in the event span
// ============================================================================

#[tokio::test]
async fn session_outside_event_span_is_rejected() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let event = store.create_event(fixtures::event(venue.id, 50)).await.unwrap();
    let track = store
        .create_track(fixtures::track(event.id, "Backend"))
        .await
        .unwrap();

    // Runs past the 17:00 close.
    let err = store
        .create_session(fixtures::session(track.id, 16, 18))
        .await
        .unwrap_err();
    assert!(matches!(
        validation(&err),
        ValidationError::OutOfBounds { .. }
    ));

    // Starts before the 09:00 open.
    let err = store
        .create_session(fixtures::session(track.id, 8, 10))
        .await
        .unwrap_err();
    assert!(matches!(
        validation(&err),
        ValidationError::OutOfBounds { .. }
    ));

    // Exactly the full span is contained.
    assert!(store
        .create_session(fixtures::session(track.id, 9, 17))
        .await
        .is_ok());
}

#[tokio::test]
async fn inverted_session_interval_is_rejected_before_bounds() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let event = store.create_event(fixtures::event(venue.id, 50)).await.unwrap();
    let track = store
        .create_track(fixtures::track(event.id, "Backend"))
        .await
        .unwrap();

    let err = store
        .create_session(fixtures::session(track.id, 12, 10))
        .await
        .unwrap_err();
    assert!(matches!(
        validation(&err),
        ValidationError::InvalidInterval { .. }
    ));
}

// ============================================================================
// Registration capacity and uniqueness
// ============================================================================

#[tokio::test]
async fn registrations_stop_at_event_capacity() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let event = store.create_event(fixtures::event(venue.id, 2)).await.unwrap();

    for _ in 0..2 {
        store
            .create_registration(NewRegistration {
                attendee_id: AttendeeId::new(),
                event_id: event.id,
            })
            .await
            .unwrap();
    }
    assert_eq!(store.registration_count(event.id).await.unwrap(), 2);

    let err = store
        .create_registration(NewRegistration {
            attendee_id: AttendeeId::new(),
            event_id: event.id,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        validation(&err),
        ValidationError::CapacityExceeded { scope: "event", limit: 2 }
    ));
    assert_eq!(store.registration_count(event.id).await.unwrap(), 2);
}

#[tokio::test]
async fn duplicate_registration_is_rejected() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let event = store.create_event(fixtures::event(venue.id, 50)).await.unwrap();
    let attendee = AttendeeId::new();

    store
        .create_registration(NewRegistration {
            attendee_id: attendee,
            event_id: event.id,
        })
        .await
        .unwrap();

    let err = store
        .create_registration(NewRegistration {
            attendee_id: attendee,
            event_id: event.id,
        })
        .await
        .unwrap_err();
    assert!(matches!(
        validation(&err),
        ValidationError::DuplicateRegistration { .. }
    ));
    assert_eq!(store.registration_count(event.id).await.unwrap(), 1);
}

#[tokio::test]
async fn cancelled_registration_frees_a_seat() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let event = store.create_event(fixtures::event(venue.id, 1)).await.unwrap();

    let registration = store
        .create_registration(NewRegistration {
            attendee_id: AttendeeId::new(),
            event_id: event.id,
        })
        .await
        .unwrap();
    store.delete_registration(registration.id).await.unwrap();

    assert!(store
        .create_registration(NewRegistration {
            attendee_id: AttendeeId::new(),
            event_id: event.id,
        })
        .await
        .is_ok());
}

#[tokio::test]
async fn moving_a_registration_respects_target_capacity() {
    let store = MemoryStore::new();
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let source = store.create_event(fixtures::event(venue.id, 10)).await.unwrap();
    let full = store.create_event(fixtures::event(venue.id, 1)).await.unwrap();

    store
        .create_registration(NewRegistration {
            attendee_id: AttendeeId::new(),
            event_id: full.id,
        })
        .await
        .unwrap();
    let registration = store
        .create_registration(NewRegistration {
            attendee_id: AttendeeId::new(),
            event_id: source.id,
        })
        .await
        .unwrap();

    let err = store
        .update_registration(registration.id, full.id)
        .await
        .unwrap_err();
    assert!(matches!(
        validation(&err),
        ValidationError::CapacityExceeded { scope: "event", .. }
    ));
    assert_eq!(
        store.registration(registration.id).await.unwrap().event_id,
        source.id
    );
}

// ============================================================================
// Concurrency
// ============================================================================

#[tokio::test]
async fn concurrent_registrations_for_last_seat_admit_exactly_one() {
    let store = Arc::new(MemoryStore::new());
    let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
    let event = store.create_event(fixtures::event(venue.id, 1)).await.unwrap();

    let a = {
        let store = Arc::clone(&store);
        let event_id = event.id;
        tokio::spawn(async move {
            store
                .create_registration(NewRegistration {
                    attendee_id: AttendeeId::new(),
                    event_id,
                })
                .await
        })
    };
    let b = {
        let store = Arc::clone(&store);
        let event_id = event.id;
        tokio::spawn(async move {
            store
                .create_registration(NewRegistration {
                    attendee_id: AttendeeId::new(),
                    event_id,
                })
                .await
        })
    };

    let (a, b) = tokio::join!(a, b);
    let results = [a.unwrap(), b.unwrap()];
    let admitted = results.iter().filter(|r| r.is_ok()).count();
    assert_eq!(admitted, 1);
    assert_eq!(store.registration_count(event.id).await.unwrap(), 1);
}
