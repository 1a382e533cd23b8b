//! Entity records and write payloads.
//!
//! Records are what the store hands back; `New*` payloads create entities
//! and `*Patch` payloads update them. Patch fields set to `None` are left
//! unchanged, mirroring HTTP `PUT` with partial bodies.

use crate::types::{
    AttendeeId, EventId, RegistrationId, SessionId, SpeakerId, TimeSlot, TrackId, VenueId,
};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

// ============================================================================
// Venue
// ============================================================================

/// A venue hosting events. Its capacity is the hard upper bound for the
/// capacity of every event scheduled there.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Venue {
    /// Venue identifier.
    pub id: VenueId,
    /// Venue name.
    pub name: String,
    /// Postal address, if known.
    pub address: Option<String>,
    /// Maximum number of people the venue holds.
    pub capacity: u32,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a venue.
#[derive(Clone, Debug, Deserialize)]
pub struct NewVenue {
    /// Venue name.
    pub name: String,
    /// Postal address, if known.
    pub address: Option<String>,
    /// Maximum number of people the venue holds.
    pub capacity: u32,
}

/// Partial update for a venue.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct VenuePatch {
    /// New name, if changing.
    pub name: Option<String>,
    /// New address, if changing.
    pub address: Option<String>,
    /// New capacity, if changing.
    pub capacity: Option<u32>,
}

// ============================================================================
// Event
// ============================================================================

/// An event (conference) held at a venue.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Event {
    /// Event identifier.
    pub id: EventId,
    /// Event title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// The hosting venue.
    pub venue_id: VenueId,
    /// Attendee capacity; never exceeds the venue's capacity.
    pub capacity: u32,
    /// Start of the event span.
    pub start_date: DateTime<Utc>,
    /// End of the event span.
    pub end_date: DateTime<Utc>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Event {
    /// The event's date range as a time slot.
    #[must_use]
    pub const fn span(&self) -> TimeSlot {
        TimeSlot::new(self.start_date, self.end_date)
    }
}

/// Payload for creating an event.
#[derive(Clone, Debug, Deserialize)]
pub struct NewEvent {
    /// Event title.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// The hosting venue.
    pub venue_id: VenueId,
    /// Attendee capacity.
    pub capacity: u32,
    /// Start of the event span.
    pub start_date: DateTime<Utc>,
    /// End of the event span.
    pub end_date: DateTime<Utc>,
}

/// Partial update for an event. Changing venue, capacity or dates re-runs
/// the full event validation.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct EventPatch {
    /// New title, if changing.
    pub title: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
    /// New venue, if moving.
    pub venue_id: Option<VenueId>,
    /// New capacity, if changing.
    pub capacity: Option<u32>,
    /// New start, if changing.
    pub start_date: Option<DateTime<Utc>>,
    /// New end, if changing.
    pub end_date: Option<DateTime<Utc>>,
}

// ============================================================================
// Track
// ============================================================================

/// A track within an event (e.g. "Backend", "Frontend"). Sessions are
/// scheduled inside tracks; titles are unique per event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Track {
    /// Track identifier.
    pub id: TrackId,
    /// The owning event.
    pub event_id: EventId,
    /// Track title, unique within the event.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a track.
#[derive(Clone, Debug, Deserialize)]
pub struct NewTrack {
    /// The owning event.
    pub event_id: EventId,
    /// Track title, unique within the event.
    pub title: String,
    /// Free-form description.
    pub description: Option<String>,
}

/// Partial update for a track.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct TrackPatch {
    /// New title, if changing; still unique within the event.
    pub title: Option<String>,
    /// New description, if changing.
    pub description: Option<String>,
}

// ============================================================================
// Speaker
// ============================================================================

/// A speaker that sessions may reference. Deleting a speaker detaches it
/// from its sessions rather than deleting them.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Speaker {
    /// Speaker identifier.
    pub id: SpeakerId,
    /// Display name.
    pub name: String,
    /// Short biography.
    pub bio: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a speaker.
#[derive(Clone, Debug, Deserialize)]
pub struct NewSpeaker {
    /// Display name.
    pub name: String,
    /// Short biography.
    pub bio: Option<String>,
}

/// Partial update for a speaker.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SpeakerPatch {
    /// New name, if changing.
    pub name: Option<String>,
    /// New biography, if changing.
    pub bio: Option<String>,
}

// ============================================================================
// Session
// ============================================================================

/// A session (talk) scheduled inside a track. Sessions in the same track
/// never overlap, and every session lies within its event's span.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Session {
    /// Session identifier.
    pub id: SessionId,
    /// The owning track.
    pub track_id: TrackId,
    /// Session title.
    pub title: String,
    /// Assigned speaker, if any.
    pub speaker_id: Option<SpeakerId>,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant (exclusive).
    pub end_time: DateTime<Utc>,
    /// Room label, if any.
    pub room: Option<String>,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

impl Session {
    /// The session's interval as a time slot.
    #[must_use]
    pub const fn slot(&self) -> TimeSlot {
        TimeSlot::new(self.start_time, self.end_time)
    }
}

/// Payload for creating a session.
#[derive(Clone, Debug, Deserialize)]
pub struct NewSession {
    /// The owning track.
    pub track_id: TrackId,
    /// Session title.
    pub title: String,
    /// Assigned speaker, if any.
    pub speaker_id: Option<SpeakerId>,
    /// Start instant.
    pub start_time: DateTime<Utc>,
    /// End instant (exclusive).
    pub end_time: DateTime<Utc>,
    /// Room label, if any.
    pub room: Option<String>,
}

/// Partial update for a session. Changing track or times re-runs the full
/// containment and overlap validation, excluding the session itself.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct SessionPatch {
    /// New track, if moving the session.
    pub track_id: Option<TrackId>,
    /// New title, if changing.
    pub title: Option<String>,
    /// New speaker, if changing.
    pub speaker_id: Option<SpeakerId>,
    /// New start, if changing.
    pub start_time: Option<DateTime<Utc>>,
    /// New end, if changing.
    pub end_time: Option<DateTime<Utc>>,
    /// New room label, if changing.
    pub room: Option<String>,
}

// ============================================================================
// Registration
// ============================================================================

/// An attendee's registration for an event.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Registration {
    /// Registration identifier.
    pub id: RegistrationId,
    /// The registered attendee, stamped from the authenticated principal.
    pub attendee_id: AttendeeId,
    /// The target event.
    pub event_id: EventId,
    /// Creation timestamp.
    pub created_at: DateTime<Utc>,
}

/// Payload for creating a registration. The attendee comes from the
/// authenticated principal, never from the request body.
#[derive(Clone, Debug)]
pub struct NewRegistration {
    /// The registering attendee.
    pub attendee_id: AttendeeId,
    /// The target event.
    pub event_id: EventId,
}
