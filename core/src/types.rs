//! Identifier newtypes and the time-interval value object.
//!
//! Every entity gets its own UUID-backed id type so a `SessionId` can never
//! be handed to an API expecting a `TrackId`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

/// Declares a UUID-backed identifier newtype with the standard constructors.
macro_rules! id_type {
    ($(#[$doc:meta])* $name:ident) => {
        $(#[$doc])*
        #[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Creates a new random identifier.
            #[must_use]
            pub fn new() -> Self {
                Self(Uuid::new_v4())
            }

            /// Wraps an existing `Uuid`.
            #[must_use]
            pub const fn from_uuid(uuid: Uuid) -> Self {
                Self(uuid)
            }

            /// Returns the inner `Uuid`.
            #[must_use]
            pub const fn as_uuid(&self) -> &Uuid {
                &self.0
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                write!(f, "{}", self.0)
            }
        }
    };
}

id_type!(
    /// Unique identifier for a venue.
    VenueId
);
id_type!(
    /// Unique identifier for an event.
    EventId
);
id_type!(
    /// Unique identifier for a track within an event.
    TrackId
);
id_type!(
    /// Unique identifier for a speaker.
    SpeakerId
);
id_type!(
    /// Unique identifier for a session within a track.
    SessionId
);
id_type!(
    /// Unique identifier for a registration.
    RegistrationId
);
id_type!(
    /// Identifier of an authenticated attendee (the acting principal).
    AttendeeId
);

/// A half-open time interval `[start, end)`.
///
/// The end point itself is excluded, which is what allows back-to-back
/// sessions in the same track: a session ending at 10:00 does not conflict
/// with one starting at 10:00.
///
/// A `TimeSlot` does not enforce `end > start` on construction; the
/// validation orchestrator reports that as
/// [`ValidationError::InvalidInterval`](crate::error::ValidationError::InvalidInterval)
/// so callers get a structured error instead of a panic.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    /// Interval start (inclusive).
    pub start: DateTime<Utc>,
    /// Interval end (exclusive).
    pub end: DateTime<Utc>,
}

impl TimeSlot {
    /// Creates a time slot from raw bounds.
    #[must_use]
    pub const fn new(start: DateTime<Utc>, end: DateTime<Utc>) -> Self {
        Self { start, end }
    }

    /// Whether the interval is well-formed (`end > start`).
    #[must_use]
    pub fn is_valid(&self) -> bool {
        self.end > self.start
    }

    /// Whether two intervals overlap.
    ///
    /// Uses the strict rule `other.start < self.end && other.end > self.start`:
    /// touching endpoints are not an overlap.
    #[must_use]
    pub fn overlaps(&self, other: &Self) -> bool {
        other.start < self.end && other.end > self.start
    }

    /// Whether `child` lies fully inside this interval, inclusive at both ends.
    #[must_use]
    pub fn contains(&self, child: &Self) -> bool {
        self.start <= child.start && child.end <= self.end
    }
}

impl fmt::Display for TimeSlot {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[{}, {})", self.start.to_rfc3339(), self.end.to_rfc3339())
    }
}
