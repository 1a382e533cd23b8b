//! Fixture builders shared across test suites.
//!
//! All time-based fixtures live on 2025-11-01 UTC; the default event spans
//! 09:00-17:00 so session fixtures can use bare hours.

use chrono::{DateTime, TimeZone, Utc};
use confplan_core::{EventId, NewEvent, NewSession, NewTrack, NewVenue, TrackId, VenueId};

/// An instant on the fixture day.
#[must_use]
pub fn at(hour: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(2025, 11, 1, hour, min, 0)
        .single()
        .unwrap_or_default()
}

/// A venue with the given capacity.
#[must_use]
pub fn venue(capacity: u32) -> NewVenue {
    NewVenue {
        name: "Convention Center".to_string(),
        address: Some("1 Main St".to_string()),
        capacity,
    }
}

/// An event at the venue spanning 09:00-17:00 on the fixture day.
#[must_use]
pub fn event(venue_id: VenueId, capacity: u32) -> NewEvent {
    NewEvent {
        title: "RustConf".to_string(),
        description: None,
        venue_id,
        capacity,
        start_date: at(9, 0),
        end_date: at(17, 0),
    }
}

/// A track under the event with the given title.
#[must_use]
pub fn track(event_id: EventId, title: &str) -> NewTrack {
    NewTrack {
        event_id,
        title: title.to_string(),
        description: None,
    }
}

/// A session in the track running from `start_hour` to `end_hour` on the
/// fixture day.
#[must_use]
pub fn session(track_id: TrackId, start_hour: u32, end_hour: u32) -> NewSession {
    NewSession {
        track_id,
        title: "Talk".to_string(),
        speaker_id: None,
        start_time: at(start_hour, 0),
        end_time: at(end_hour, 0),
        room: None,
    }
}
