//! In-memory `ScheduleStore` implementation.
//!
//! One `tokio::sync::Mutex` guards the whole state, so every write is fully
//! serialized: the pessimistic consistency strategy in its simplest form.
//! Two concurrent registrations for a capacity-1 event therefore resolve to
//! exactly one success and one `CapacityExceeded`, same as the row-locked
//! PostgreSQL store.

use async_trait::async_trait;
use chrono::Utc;
use confplan_core::{
    AttendeeId, Event, EventId, EventPatch, NewEvent, NewRegistration, NewSession, NewSpeaker,
    NewTrack, NewVenue, Registration, RegistrationId, ScheduleStore, Session, SessionFilter,
    SessionId, SessionPatch, Speaker, SpeakerId, SpeakerPatch, StoreError, StoreResult, TimeSlot,
    Track, TrackId, TrackPatch, Venue, VenueId, VenuePatch,
    validate::{validate_event, validate_registration, validate_session},
};
use std::collections::HashMap;
use tokio::sync::Mutex;

#[derive(Debug, Default)]
struct State {
    venues: HashMap<VenueId, Venue>,
    events: HashMap<EventId, Event>,
    tracks: HashMap<TrackId, Track>,
    speakers: HashMap<SpeakerId, Speaker>,
    sessions: HashMap<SessionId, Session>,
    registrations: HashMap<RegistrationId, Registration>,
}

impl State {
    fn venue(&self, id: VenueId) -> StoreResult<&Venue> {
        self.venues
            .get(&id)
            .ok_or(StoreError::not_found("venue", *id.as_uuid()))
    }

    fn event(&self, id: EventId) -> StoreResult<&Event> {
        self.events
            .get(&id)
            .ok_or(StoreError::not_found("event", *id.as_uuid()))
    }

    fn track(&self, id: TrackId) -> StoreResult<&Track> {
        self.tracks
            .get(&id)
            .ok_or(StoreError::not_found("track", *id.as_uuid()))
    }

    fn speaker(&self, id: SpeakerId) -> StoreResult<&Speaker> {
        self.speakers
            .get(&id)
            .ok_or(StoreError::not_found("speaker", *id.as_uuid()))
    }

    /// Sessions sharing a track, the overlap scope.
    fn track_sessions(&self, track: TrackId) -> Vec<Session> {
        let mut siblings: Vec<Session> = self
            .sessions
            .values()
            .filter(|s| s.track_id == track)
            .cloned()
            .collect();
        siblings.sort_by_key(|s| s.start_time);
        siblings
    }

    /// Registrations sharing an event, the capacity scope.
    fn event_registrations(&self, event: EventId) -> Vec<Registration> {
        self.registrations
            .values()
            .filter(|r| r.event_id == event)
            .cloned()
            .collect()
    }

    fn check_track_title(
        &self,
        event: EventId,
        title: &str,
        excluding: Option<TrackId>,
    ) -> StoreResult<()> {
        let clash = self.tracks.values().any(|t| {
            t.event_id == event && t.title == title && Some(t.id) != excluding
        });
        if clash {
            return Err(StoreError::DuplicateTrack {
                event,
                title: title.to_string(),
            });
        }
        Ok(())
    }
}

/// Mutex-serialized in-memory schedule store.
///
/// Intended for unit and HTTP tests; state is lost on drop.
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<State>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[async_trait]
impl ScheduleStore for MemoryStore {
    // ── Venues ──────────────────────────────────────────────────────────

    async fn create_venue(&self, new: NewVenue) -> StoreResult<Venue> {
        let mut state = self.inner.lock().await;
        let venue = Venue {
            id: VenueId::new(),
            name: new.name,
            address: new.address,
            capacity: new.capacity,
            created_at: Utc::now(),
        };
        state.venues.insert(venue.id, venue.clone());
        Ok(venue)
    }

    async fn venue(&self, id: VenueId) -> StoreResult<Venue> {
        let state = self.inner.lock().await;
        state.venue(id).cloned()
    }

    async fn venues(&self) -> StoreResult<Vec<Venue>> {
        let state = self.inner.lock().await;
        let mut all: Vec<Venue> = state.venues.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn update_venue(&self, id: VenueId, patch: VenuePatch) -> StoreResult<Venue> {
        let mut state = self.inner.lock().await;
        let mut venue = state.venue(id)?.clone();
        if let Some(name) = patch.name {
            venue.name = name;
        }
        if let Some(address) = patch.address {
            venue.address = Some(address);
        }
        if let Some(capacity) = patch.capacity {
            venue.capacity = capacity;
        }
        state.venues.insert(id, venue.clone());
        Ok(venue)
    }

    async fn delete_venue(&self, id: VenueId) -> StoreResult<()> {
        let mut state = self.inner.lock().await;
        state.venue(id)?;
        if state.events.values().any(|e| e.venue_id == id) {
            return Err(StoreError::VenueInUse { venue: id });
        }
        state.venues.remove(&id);
        Ok(())
    }

    // ── Events ──────────────────────────────────────────────────────────

    async fn create_event(&self, new: NewEvent) -> StoreResult<Event> {
        let mut state = self.inner.lock().await;
        let venue_capacity = state.venue(new.venue_id)?.capacity;
        let span = TimeSlot::new(new.start_date, new.end_date);
        validate_event(span, new.capacity, venue_capacity)?;
        let event = Event {
            id: EventId::new(),
            title: new.title,
            description: new.description,
            venue_id: new.venue_id,
            capacity: new.capacity,
            start_date: new.start_date,
            end_date: new.end_date,
            created_at: Utc::now(),
        };
        state.events.insert(event.id, event.clone());
        Ok(event)
    }

    async fn event(&self, id: EventId) -> StoreResult<Event> {
        let state = self.inner.lock().await;
        state.event(id).cloned()
    }

    async fn events(&self) -> StoreResult<Vec<Event>> {
        let state = self.inner.lock().await;
        let mut all: Vec<Event> = state.events.values().cloned().collect();
        all.sort_by(|a, b| b.start_date.cmp(&a.start_date));
        Ok(all)
    }

    async fn update_event(&self, id: EventId, patch: EventPatch) -> StoreResult<Event> {
        let mut state = self.inner.lock().await;
        let mut event = state.event(id)?.clone();
        if let Some(title) = patch.title {
            event.title = title;
        }
        if let Some(description) = patch.description {
            event.description = Some(description);
        }
        if let Some(venue_id) = patch.venue_id {
            event.venue_id = venue_id;
        }
        if let Some(capacity) = patch.capacity {
            event.capacity = capacity;
        }
        if let Some(start_date) = patch.start_date {
            event.start_date = start_date;
        }
        if let Some(end_date) = patch.end_date {
            event.end_date = end_date;
        }
        let venue_capacity = state.venue(event.venue_id)?.capacity;
        validate_event(event.span(), event.capacity, venue_capacity)?;
        state.events.insert(id, event.clone());
        Ok(event)
    }

    async fn delete_event(&self, id: EventId) -> StoreResult<()> {
        let mut state = self.inner.lock().await;
        state.event(id)?;
        let tracks: Vec<TrackId> = state
            .tracks
            .values()
            .filter(|t| t.event_id == id)
            .map(|t| t.id)
            .collect();
        state
            .sessions
            .retain(|_, s| !tracks.contains(&s.track_id));
        state.tracks.retain(|_, t| t.event_id != id);
        state.registrations.retain(|_, r| r.event_id != id);
        state.events.remove(&id);
        Ok(())
    }

    async fn registration_count(&self, event: EventId) -> StoreResult<u32> {
        let state = self.inner.lock().await;
        state.event(event)?;
        Ok(u32::try_from(state.event_registrations(event).len()).unwrap_or(u32::MAX))
    }

    // ── Tracks ──────────────────────────────────────────────────────────

    async fn create_track(&self, new: NewTrack) -> StoreResult<Track> {
        let mut state = self.inner.lock().await;
        state.event(new.event_id)?;
        state.check_track_title(new.event_id, &new.title, None)?;
        let track = Track {
            id: TrackId::new(),
            event_id: new.event_id,
            title: new.title,
            description: new.description,
            created_at: Utc::now(),
        };
        state.tracks.insert(track.id, track.clone());
        Ok(track)
    }

    async fn track(&self, id: TrackId) -> StoreResult<Track> {
        let state = self.inner.lock().await;
        state.track(id).cloned()
    }

    async fn tracks(&self) -> StoreResult<Vec<Track>> {
        let state = self.inner.lock().await;
        let mut all: Vec<Track> = state.tracks.values().cloned().collect();
        all.sort_by(|a, b| a.title.cmp(&b.title));
        Ok(all)
    }

    async fn update_track(&self, id: TrackId, patch: TrackPatch) -> StoreResult<Track> {
        let mut state = self.inner.lock().await;
        let mut track = state.track(id)?.clone();
        if let Some(title) = patch.title {
            state.check_track_title(track.event_id, &title, Some(id))?;
            track.title = title;
        }
        if let Some(description) = patch.description {
            track.description = Some(description);
        }
        state.tracks.insert(id, track.clone());
        Ok(track)
    }

    async fn delete_track(&self, id: TrackId) -> StoreResult<()> {
        let mut state = self.inner.lock().await;
        state.track(id)?;
        state.sessions.retain(|_, s| s.track_id != id);
        state.tracks.remove(&id);
        Ok(())
    }

    // ── Speakers ────────────────────────────────────────────────────────

    async fn create_speaker(&self, new: NewSpeaker) -> StoreResult<Speaker> {
        let mut state = self.inner.lock().await;
        let speaker = Speaker {
            id: SpeakerId::new(),
            name: new.name,
            bio: new.bio,
            created_at: Utc::now(),
        };
        state.speakers.insert(speaker.id, speaker.clone());
        Ok(speaker)
    }

    async fn speaker(&self, id: SpeakerId) -> StoreResult<Speaker> {
        let state = self.inner.lock().await;
        state.speaker(id).cloned()
    }

    async fn speakers(&self) -> StoreResult<Vec<Speaker>> {
        let state = self.inner.lock().await;
        let mut all: Vec<Speaker> = state.speakers.values().cloned().collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(all)
    }

    async fn update_speaker(&self, id: SpeakerId, patch: SpeakerPatch) -> StoreResult<Speaker> {
        let mut state = self.inner.lock().await;
        let mut speaker = state.speaker(id)?.clone();
        if let Some(name) = patch.name {
            speaker.name = name;
        }
        if let Some(bio) = patch.bio {
            speaker.bio = Some(bio);
        }
        state.speakers.insert(id, speaker.clone());
        Ok(speaker)
    }

    async fn delete_speaker(&self, id: SpeakerId) -> StoreResult<()> {
        let mut state = self.inner.lock().await;
        state.speaker(id)?;
        for session in state.sessions.values_mut() {
            if session.speaker_id == Some(id) {
                session.speaker_id = None;
            }
        }
        state.speakers.remove(&id);
        Ok(())
    }

    // ── Sessions ────────────────────────────────────────────────────────

    async fn create_session(&self, new: NewSession) -> StoreResult<Session> {
        let mut state = self.inner.lock().await;
        let track = state.track(new.track_id)?.clone();
        let event_span = state.event(track.event_id)?.span();
        if let Some(speaker) = new.speaker_id {
            state.speaker(speaker)?;
        }
        let slot = TimeSlot::new(new.start_time, new.end_time);
        let siblings = state.track_sessions(new.track_id);
        validate_session(new.track_id, slot, event_span, &siblings, None)?;
        let session = Session {
            id: SessionId::new(),
            track_id: new.track_id,
            title: new.title,
            speaker_id: new.speaker_id,
            start_time: new.start_time,
            end_time: new.end_time,
            room: new.room,
            created_at: Utc::now(),
        };
        state.sessions.insert(session.id, session.clone());
        Ok(session)
    }

    async fn session(&self, id: SessionId) -> StoreResult<Session> {
        let state = self.inner.lock().await;
        state
            .sessions
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("session", *id.as_uuid()))
    }

    async fn sessions(&self, filter: SessionFilter) -> StoreResult<Vec<Session>> {
        let state = self.inner.lock().await;
        let mut all: Vec<Session> = if let Some(track) = filter.track_id {
            state.track_sessions(track)
        } else if let Some(event) = filter.event_id {
            let tracks: Vec<TrackId> = state
                .tracks
                .values()
                .filter(|t| t.event_id == event)
                .map(|t| t.id)
                .collect();
            state
                .sessions
                .values()
                .filter(|s| tracks.contains(&s.track_id))
                .cloned()
                .collect()
        } else {
            state.sessions.values().cloned().collect()
        };
        all.sort_by_key(|s| s.start_time);
        Ok(all)
    }

    async fn update_session(&self, id: SessionId, patch: SessionPatch) -> StoreResult<Session> {
        let mut state = self.inner.lock().await;
        let mut session = state
            .sessions
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("session", *id.as_uuid()))?;
        if let Some(track_id) = patch.track_id {
            state.track(track_id)?;
            session.track_id = track_id;
        }
        if let Some(title) = patch.title {
            session.title = title;
        }
        if let Some(speaker_id) = patch.speaker_id {
            state.speaker(speaker_id)?;
            session.speaker_id = Some(speaker_id);
        }
        if let Some(start_time) = patch.start_time {
            session.start_time = start_time;
        }
        if let Some(end_time) = patch.end_time {
            session.end_time = end_time;
        }
        if let Some(room) = patch.room {
            session.room = Some(room);
        }
        let track = state.track(session.track_id)?.clone();
        let event_span = state.event(track.event_id)?.span();
        let siblings = state.track_sessions(session.track_id);
        validate_session(session.track_id, session.slot(), event_span, &siblings, Some(id))?;
        state.sessions.insert(id, session.clone());
        Ok(session)
    }

    async fn delete_session(&self, id: SessionId) -> StoreResult<()> {
        let mut state = self.inner.lock().await;
        state
            .sessions
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::not_found("session", *id.as_uuid()))
    }

    // ── Registrations ───────────────────────────────────────────────────

    async fn create_registration(&self, new: NewRegistration) -> StoreResult<Registration> {
        let mut state = self.inner.lock().await;
        let capacity = state.event(new.event_id)?.capacity;
        let existing = state.event_registrations(new.event_id);
        validate_registration(new.attendee_id, new.event_id, capacity, &existing, None)?;
        let registration = Registration {
            id: RegistrationId::new(),
            attendee_id: new.attendee_id,
            event_id: new.event_id,
            created_at: Utc::now(),
        };
        state.registrations.insert(registration.id, registration.clone());
        Ok(registration)
    }

    async fn registration(&self, id: RegistrationId) -> StoreResult<Registration> {
        let state = self.inner.lock().await;
        state
            .registrations
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("registration", *id.as_uuid()))
    }

    async fn registrations(&self, attendee: Option<AttendeeId>) -> StoreResult<Vec<Registration>> {
        let state = self.inner.lock().await;
        let mut all: Vec<Registration> = state
            .registrations
            .values()
            .filter(|r| attendee.is_none_or(|a| r.attendee_id == a))
            .cloned()
            .collect();
        all.sort_by_key(|r| r.created_at);
        Ok(all)
    }

    async fn update_registration(
        &self,
        id: RegistrationId,
        event: EventId,
    ) -> StoreResult<Registration> {
        let mut state = self.inner.lock().await;
        let mut registration = state
            .registrations
            .get(&id)
            .cloned()
            .ok_or(StoreError::not_found("registration", *id.as_uuid()))?;
        let capacity = state.event(event)?.capacity;
        let existing = state.event_registrations(event);
        validate_registration(registration.attendee_id, event, capacity, &existing, Some(id))?;
        registration.event_id = event;
        state.registrations.insert(id, registration.clone());
        Ok(registration)
    }

    async fn delete_registration(&self, id: RegistrationId) -> StoreResult<()> {
        let mut state = self.inner.lock().await;
        state
            .registrations
            .remove(&id)
            .map(|_| ())
            .ok_or(StoreError::not_found("registration", *id.as_uuid()))
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::fixtures;

    #[tokio::test]
    async fn venue_delete_is_protected_while_referenced() {
        let store = MemoryStore::new();
        let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
        let event = store
            .create_event(fixtures::event(venue.id, 50))
            .await
            .unwrap();

        let err = store.delete_venue(venue.id).await.unwrap_err();
        assert!(matches!(err, StoreError::VenueInUse { .. }));

        store.delete_event(event.id).await.unwrap();
        store.delete_venue(venue.id).await.unwrap();
    }

    #[tokio::test]
    async fn event_delete_cascades_to_tracks_sessions_and_registrations() {
        let store = MemoryStore::new();
        let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
        let event = store
            .create_event(fixtures::event(venue.id, 50))
            .await
            .unwrap();
        let track = store
            .create_track(fixtures::track(event.id, "Backend"))
            .await
            .unwrap();
        let session = store
            .create_session(fixtures::session(track.id, 9, 10))
            .await
            .unwrap();
        let registration = store
            .create_registration(NewRegistration {
                attendee_id: AttendeeId::new(),
                event_id: event.id,
            })
            .await
            .unwrap();

        store.delete_event(event.id).await.unwrap();

        assert!(store.track(track.id).await.is_err());
        assert!(store.session(session.id).await.is_err());
        assert!(store.registration(registration.id).await.is_err());
    }

    #[tokio::test]
    async fn duplicate_track_title_rejected_within_event() {
        let store = MemoryStore::new();
        let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
        let event = store
            .create_event(fixtures::event(venue.id, 50))
            .await
            .unwrap();
        store
            .create_track(fixtures::track(event.id, "Backend"))
            .await
            .unwrap();

        let err = store
            .create_track(fixtures::track(event.id, "Backend"))
            .await
            .unwrap_err();
        assert!(matches!(err, StoreError::DuplicateTrack { .. }));

        // Same title under a different event is fine.
        let other = store
            .create_event(fixtures::event(venue.id, 50))
            .await
            .unwrap();
        assert!(store
            .create_track(fixtures::track(other.id, "Backend"))
            .await
            .is_ok());
    }

    #[tokio::test]
    async fn deleting_speaker_detaches_sessions() {
        let store = MemoryStore::new();
        let venue = store.create_venue(fixtures::venue(100)).await.unwrap();
        let event = store
            .create_event(fixtures::event(venue.id, 50))
            .await
            .unwrap();
        let track = store
            .create_track(fixtures::track(event.id, "Backend"))
            .await
            .unwrap();
        let speaker = store
            .create_speaker(NewSpeaker {
                name: "Ada".to_string(),
                bio: None,
            })
            .await
            .unwrap();
        let mut new_session = fixtures::session(track.id, 9, 10);
        new_session.speaker_id = Some(speaker.id);
        let session = store.create_session(new_session).await.unwrap();

        store.delete_speaker(speaker.id).await.unwrap();

        let session = store.session(session.id).await.unwrap();
        assert_eq!(session.speaker_id, None);
    }
}
