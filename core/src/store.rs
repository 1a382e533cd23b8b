//! The transactional write gate contract.
//!
//! A [`ScheduleStore`] wraps "re-read dependent state → run the validation
//! orchestrator → persist" so the check-then-write sequence is atomic
//! against concurrent writers targeting the same aggregate scope (the track
//! for session overlap, the event for registration capacity).
//!
//! # Guarantees
//!
//! - No successful write leaves any scheduling invariant violated.
//! - On validation failure the transaction rolls back entirely; no partial
//!   persistence, errors surface as [`StoreError`](crate::error::StoreError)
//!   values.
//! - Writes must be serialized per scope: implementations either lock the
//!   scope (`SELECT ... FOR UPDATE`, a store-wide mutex) or provide
//!   serializable isolation before re-reading the sibling set or count.
//!   Read-committed isolation with no lock would let two concurrent
//!   registrations both pass a stale count and jointly overshoot capacity.
//!
//! # Implementations
//!
//! - `PostgresScheduleStore` (in `confplan-postgres`): production store,
//!   pessimistic row locks inside sqlx transactions.
//! - `MemoryStore` (in `confplan-testing`): a mutex-serialized in-memory
//!   store for tests and examples.
//!
//! All mutation goes through this trait; direct writes that bypass the
//! orchestrator are out of contract.

use crate::entities::{
    Event, EventPatch, NewEvent, NewRegistration, NewSession, NewSpeaker, NewTrack, NewVenue,
    Registration, Session, SessionPatch, Speaker, SpeakerPatch, Track, TrackPatch, Venue,
    VenuePatch,
};
use crate::error::StoreResult;
use crate::types::{
    AttendeeId, EventId, RegistrationId, SessionId, SpeakerId, TrackId, VenueId,
};
use async_trait::async_trait;

/// Filter for session listings.
#[derive(Clone, Copy, Debug, Default)]
pub struct SessionFilter {
    /// Restrict to sessions of this track.
    pub track_id: Option<TrackId>,
    /// Restrict to sessions of any track of this event. Ignored when
    /// `track_id` is set.
    pub event_id: Option<EventId>,
}

/// Validated, transactional persistence for the scheduling domain.
///
/// Every `create_*` and `update_*` method performs the full
/// read-validate-persist sequence described in the module docs. Read
/// methods reflect committed state only.
#[async_trait]
pub trait ScheduleStore: Send + Sync {
    // ── Venues ──────────────────────────────────────────────────────────

    /// Creates a venue.
    async fn create_venue(&self, new: NewVenue) -> StoreResult<Venue>;

    /// Fetches a venue by id.
    async fn venue(&self, id: VenueId) -> StoreResult<Venue>;

    /// Lists all venues.
    async fn venues(&self) -> StoreResult<Vec<Venue>>;

    /// Applies a partial update to a venue.
    async fn update_venue(&self, id: VenueId, patch: VenuePatch) -> StoreResult<Venue>;

    /// Deletes a venue. Fails with `VenueInUse` while events reference it.
    async fn delete_venue(&self, id: VenueId) -> StoreResult<()>;

    // ── Events ──────────────────────────────────────────────────────────

    /// Creates an event after validating its span and capacity against the
    /// venue.
    async fn create_event(&self, new: NewEvent) -> StoreResult<Event>;

    /// Fetches an event by id.
    async fn event(&self, id: EventId) -> StoreResult<Event>;

    /// Lists all events, most recent start first.
    async fn events(&self) -> StoreResult<Vec<Event>>;

    /// Applies a partial update to an event, re-running event validation
    /// against the (possibly new) venue.
    async fn update_event(&self, id: EventId, patch: EventPatch) -> StoreResult<Event>;

    /// Deletes an event, cascading to its tracks, sessions and
    /// registrations.
    async fn delete_event(&self, id: EventId) -> StoreResult<()>;

    /// Number of registrations currently held against an event.
    async fn registration_count(&self, event: EventId) -> StoreResult<u32>;

    // ── Tracks ──────────────────────────────────────────────────────────

    /// Creates a track; titles are unique per event.
    async fn create_track(&self, new: NewTrack) -> StoreResult<Track>;

    /// Fetches a track by id.
    async fn track(&self, id: TrackId) -> StoreResult<Track>;

    /// Lists all tracks.
    async fn tracks(&self) -> StoreResult<Vec<Track>>;

    /// Applies a partial update to a track.
    async fn update_track(&self, id: TrackId, patch: TrackPatch) -> StoreResult<Track>;

    /// Deletes a track, cascading to its sessions.
    async fn delete_track(&self, id: TrackId) -> StoreResult<()>;

    // ── Speakers ────────────────────────────────────────────────────────

    /// Creates a speaker.
    async fn create_speaker(&self, new: NewSpeaker) -> StoreResult<Speaker>;

    /// Fetches a speaker by id.
    async fn speaker(&self, id: SpeakerId) -> StoreResult<Speaker>;

    /// Lists all speakers.
    async fn speakers(&self) -> StoreResult<Vec<Speaker>>;

    /// Applies a partial update to a speaker.
    async fn update_speaker(&self, id: SpeakerId, patch: SpeakerPatch) -> StoreResult<Speaker>;

    /// Deletes a speaker, detaching it from any sessions.
    async fn delete_speaker(&self, id: SpeakerId) -> StoreResult<()>;

    // ── Sessions ────────────────────────────────────────────────────────

    /// Creates a session after validating its interval, containment in the
    /// event span, and non-overlap with track siblings.
    async fn create_session(&self, new: NewSession) -> StoreResult<Session>;

    /// Fetches a session by id.
    async fn session(&self, id: SessionId) -> StoreResult<Session>;

    /// Lists sessions matching the filter, ordered by start time.
    async fn sessions(&self, filter: SessionFilter) -> StoreResult<Vec<Session>>;

    /// Applies a partial update to a session, re-running the full session
    /// validation with the session's own id excluded.
    async fn update_session(&self, id: SessionId, patch: SessionPatch) -> StoreResult<Session>;

    /// Deletes a session.
    async fn delete_session(&self, id: SessionId) -> StoreResult<()>;

    // ── Registrations ───────────────────────────────────────────────────

    /// Registers an attendee for an event after validating uniqueness and
    /// the capacity count.
    async fn create_registration(&self, new: NewRegistration) -> StoreResult<Registration>;

    /// Fetches a registration by id.
    async fn registration(&self, id: RegistrationId) -> StoreResult<Registration>;

    /// Lists registrations, optionally scoped to one attendee.
    async fn registrations(&self, attendee: Option<AttendeeId>) -> StoreResult<Vec<Registration>>;

    /// Moves a registration to another event, re-running uniqueness and
    /// capacity validation with the registration's own id excluded.
    async fn update_registration(
        &self,
        id: RegistrationId,
        event: EventId,
    ) -> StoreResult<Registration>;

    /// Deletes a registration.
    async fn delete_registration(&self, id: RegistrationId) -> StoreResult<()>;
}
