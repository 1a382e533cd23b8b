//! Core domain model and scheduling invariants for Confplan.
//!
//! Confplan is an event-management backend: venues host events, events are
//! divided into tracks, sessions are scheduled inside tracks, and attendees
//! register for events. This crate holds the part with actual logic: the
//! scheduling-consistency and capacity-enforcement subsystem.
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │        Transactional Write Gate         │  ← ScheduleStore impls
//! │  (confplan-postgres, confplan-testing)  │  ← re-read state, lock scope
//! ├─────────────────────────────────────────┤
//! │        Validation Orchestrator          │  ← validate::* (pure)
//! │  - per-entity invariant composition     │
//! ├─────────────────────────────────────────┤
//! │           Invariant Checkers            │  ← checks::* (pure)
//! │  - capacity bounds                      │
//! │  - interval overlap (half-open)         │
//! │  - interval containment (inclusive)     │
//! └─────────────────────────────────────────┘
//! ```
//!
//! The orchestrator is pure: the write gate reads dependent state (parent
//! aggregate, sibling set) inside its transaction and passes an explicit
//! snapshot in. That keeps every invariant testable at memory speed with no
//! database in sight.
//!
//! # Invariants
//!
//! - `event.end_date > event.start_date` and `event.capacity >= 1`
//! - `event.capacity <= venue.capacity`
//! - session interval valid and contained in the parent event span (inclusive)
//! - no two sessions in the same track overlap; half-open intervals, so
//!   back-to-back sessions are allowed
//! - `(attendee, event)` registration pairs are unique
//! - registrations per event never exceed `event.capacity`
//!
//! No successful write through a [`store::ScheduleStore`] may leave any of
//! these violated.

pub mod checks;
pub mod entities;
pub mod error;
pub mod store;
pub mod types;
pub mod validate;

pub use entities::{
    Event, EventPatch, NewEvent, NewRegistration, NewSession, NewSpeaker, NewTrack, NewVenue,
    Registration, Session, SessionPatch, Speaker, SpeakerPatch, Track, TrackPatch, Venue,
    VenuePatch,
};
pub use error::{StoreError, StoreResult, ValidationError};
pub use store::{ScheduleStore, SessionFilter};
pub use types::{
    AttendeeId, EventId, RegistrationId, SessionId, SpeakerId, TimeSlot, TrackId, VenueId,
};
