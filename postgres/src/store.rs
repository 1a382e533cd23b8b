//! `ScheduleStore` over a `PostgreSQL` pool.
//!
//! Lock discipline: every validating write opens a transaction and takes a
//! `FOR UPDATE` lock on the scope row before re-reading dependent state, so
//! concurrent writers against the same scope serialize and the loser
//! revalidates against committed state.
//!
//! | Write                       | Locked row |
//! |-----------------------------|------------|
//! | create/update event         | venue      |
//! | create/update session       | track      |
//! | create/update registration  | event      |

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use confplan_core::{
    AttendeeId, Event, EventId, EventPatch, NewEvent, NewRegistration, NewSession, NewSpeaker,
    NewTrack, NewVenue, Registration, RegistrationId, ScheduleStore, Session, SessionFilter,
    SessionId, SessionPatch, Speaker, SpeakerId, SpeakerPatch, StoreError, StoreResult, TimeSlot,
    Track, TrackId, TrackPatch, Venue, VenueId, VenuePatch,
    error::ValidationError,
    validate::{validate_event, validate_registration, validate_session},
};
use sqlx::postgres::{PgConnection, PgPool, PgPoolOptions};
use uuid::Uuid;

use crate::schema;

type VenueRow = (Uuid, String, Option<String>, i64, DateTime<Utc>);
type EventRow = (
    Uuid,
    String,
    Option<String>,
    Uuid,
    i64,
    DateTime<Utc>,
    DateTime<Utc>,
    DateTime<Utc>,
);
type TrackRow = (Uuid, Uuid, String, Option<String>, DateTime<Utc>);
type SpeakerRow = (Uuid, String, Option<String>, DateTime<Utc>);
type SessionRow = (
    Uuid,
    Uuid,
    String,
    Option<Uuid>,
    DateTime<Utc>,
    DateTime<Utc>,
    Option<String>,
    DateTime<Utc>,
);
type RegistrationRow = (Uuid, Uuid, Uuid, DateTime<Utc>);

const SELECT_EVENT: &str = "SELECT id, title, description, venue_id, capacity, start_date, \
                            end_date, created_at FROM events";
const SELECT_SESSION: &str = "SELECT id, track_id, title, speaker_id, start_time, end_time, \
                              room, created_at FROM sessions";

fn storage(e: sqlx::Error) -> StoreError {
    StoreError::Storage(e.to_string())
}

/// Constraint name of a database error, if it is one.
fn violated_constraint(e: &sqlx::Error) -> Option<&str> {
    match e {
        sqlx::Error::Database(db) => db.constraint(),
        _ => None,
    }
}

fn capacity_from_db(value: i64) -> StoreResult<u32> {
    u32::try_from(value).map_err(|_| StoreError::Storage(format!("capacity out of range: {value}")))
}

fn venue_from(row: VenueRow) -> StoreResult<Venue> {
    let (id, name, address, capacity, created_at) = row;
    Ok(Venue {
        id: VenueId::from_uuid(id),
        name,
        address,
        capacity: capacity_from_db(capacity)?,
        created_at,
    })
}

fn event_from(row: EventRow) -> StoreResult<Event> {
    let (id, title, description, venue_id, capacity, start_date, end_date, created_at) = row;
    Ok(Event {
        id: EventId::from_uuid(id),
        title,
        description,
        venue_id: VenueId::from_uuid(venue_id),
        capacity: capacity_from_db(capacity)?,
        start_date,
        end_date,
        created_at,
    })
}

fn track_from(row: TrackRow) -> Track {
    let (id, event_id, title, description, created_at) = row;
    Track {
        id: TrackId::from_uuid(id),
        event_id: EventId::from_uuid(event_id),
        title,
        description,
        created_at,
    }
}

fn speaker_from(row: SpeakerRow) -> Speaker {
    let (id, name, bio, created_at) = row;
    Speaker {
        id: SpeakerId::from_uuid(id),
        name,
        bio,
        created_at,
    }
}

fn session_from(row: SessionRow) -> Session {
    let (id, track_id, title, speaker_id, start_time, end_time, room, created_at) = row;
    Session {
        id: SessionId::from_uuid(id),
        track_id: TrackId::from_uuid(track_id),
        title,
        speaker_id: speaker_id.map(SpeakerId::from_uuid),
        start_time,
        end_time,
        room,
        created_at,
    }
}

fn registration_from(row: RegistrationRow) -> Registration {
    let (id, attendee_id, event_id, created_at) = row;
    Registration {
        id: RegistrationId::from_uuid(id),
        attendee_id: AttendeeId::from_uuid(attendee_id),
        event_id: EventId::from_uuid(event_id),
        created_at,
    }
}

/// Locks the venue row and returns its capacity.
async fn lock_venue_capacity(conn: &mut PgConnection, venue: VenueId) -> StoreResult<u32> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT capacity FROM venues WHERE id = $1 FOR UPDATE")
        .bind(*venue.as_uuid())
        .fetch_optional(conn)
        .await
        .map_err(storage)?;
    let (capacity,) = row.ok_or(StoreError::not_found("venue", *venue.as_uuid()))?;
    capacity_from_db(capacity)
}

/// Locks the track row and returns its owning event.
async fn lock_track(conn: &mut PgConnection, track: TrackId) -> StoreResult<EventId> {
    let row: Option<(Uuid,)> = sqlx::query_as("SELECT event_id FROM tracks WHERE id = $1 FOR UPDATE")
        .bind(*track.as_uuid())
        .fetch_optional(conn)
        .await
        .map_err(storage)?;
    let (event_id,) = row.ok_or(StoreError::not_found("track", *track.as_uuid()))?;
    Ok(EventId::from_uuid(event_id))
}

/// Locks the event row and returns its capacity.
async fn lock_event_capacity(conn: &mut PgConnection, event: EventId) -> StoreResult<u32> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT capacity FROM events WHERE id = $1 FOR UPDATE")
        .bind(*event.as_uuid())
        .fetch_optional(conn)
        .await
        .map_err(storage)?;
    let (capacity,) = row.ok_or(StoreError::not_found("event", *event.as_uuid()))?;
    capacity_from_db(capacity)
}

async fn event_span(conn: &mut PgConnection, event: EventId) -> StoreResult<TimeSlot> {
    let row: Option<(DateTime<Utc>, DateTime<Utc>)> =
        sqlx::query_as("SELECT start_date, end_date FROM events WHERE id = $1")
            .bind(*event.as_uuid())
            .fetch_optional(conn)
            .await
            .map_err(storage)?;
    let (start, end) = row.ok_or(StoreError::not_found("event", *event.as_uuid()))?;
    Ok(TimeSlot::new(start, end))
}

async fn speaker_exists(conn: &mut PgConnection, speaker: SpeakerId) -> StoreResult<()> {
    let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM speakers WHERE id = $1)")
        .bind(*speaker.as_uuid())
        .fetch_one(conn)
        .await
        .map_err(storage)?;
    if exists {
        Ok(())
    } else {
        Err(StoreError::not_found("speaker", *speaker.as_uuid()))
    }
}

async fn track_siblings(conn: &mut PgConnection, track: TrackId) -> StoreResult<Vec<Session>> {
    let rows: Vec<SessionRow> =
        sqlx::query_as(&format!("{SELECT_SESSION} WHERE track_id = $1 ORDER BY start_time"))
            .bind(*track.as_uuid())
            .fetch_all(conn)
            .await
            .map_err(storage)?;
    Ok(rows.into_iter().map(session_from).collect())
}

async fn event_registrations(
    conn: &mut PgConnection,
    event: EventId,
) -> StoreResult<Vec<Registration>> {
    let rows: Vec<RegistrationRow> = sqlx::query_as(
        "SELECT id, attendee_id, event_id, created_at FROM registrations WHERE event_id = $1",
    )
    .bind(*event.as_uuid())
    .fetch_all(conn)
    .await
    .map_err(storage)?;
    Ok(rows.into_iter().map(registration_from).collect())
}

async fn track_title_taken(
    conn: &mut PgConnection,
    event: EventId,
    title: &str,
    excluding: Option<TrackId>,
) -> StoreResult<bool> {
    let (taken,): (bool,) = sqlx::query_as(
        "SELECT EXISTS(SELECT 1 FROM tracks WHERE event_id = $1 AND title = $2 AND id != $3)",
    )
    .bind(*event.as_uuid())
    .bind(title)
    .bind(excluding.map_or(Uuid::nil(), |t| *t.as_uuid()))
    .fetch_one(conn)
    .await
    .map_err(storage)?;
    Ok(taken)
}

/// `ScheduleStore` backed by `PostgreSQL`.
///
/// Wraps a connection pool; clone freely, all clones share the pool.
#[derive(Clone)]
pub struct PostgresScheduleStore {
    pool: PgPool,
}

impl PostgresScheduleStore {
    /// Connects to the given database and returns a store.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if the connection cannot be
    /// established.
    pub async fn new(database_url: &str) -> StoreResult<Self> {
        let pool = PgPoolOptions::new()
            .max_connections(10)
            .connect(database_url)
            .await
            .map_err(storage)?;
        Ok(Self::from_pool(pool))
    }

    /// Creates a store over an existing pool.
    #[must_use]
    pub const fn from_pool(pool: PgPool) -> Self {
        Self { pool }
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }

    /// Creates the schedule tables if they do not exist.
    ///
    /// # Errors
    ///
    /// Returns [`StoreError::Storage`] if a DDL statement fails.
    pub async fn migrate(&self) -> StoreResult<()> {
        schema::migrate(&self.pool).await.map_err(storage)
    }
}

#[async_trait]
impl ScheduleStore for PostgresScheduleStore {
    // ── Venues ──────────────────────────────────────────────────────────

    async fn create_venue(&self, new: NewVenue) -> StoreResult<Venue> {
        let venue = Venue {
            id: VenueId::new(),
            name: new.name,
            address: new.address,
            capacity: new.capacity,
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO venues (id, name, address, capacity, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*venue.id.as_uuid())
        .bind(&venue.name)
        .bind(&venue.address)
        .bind(i64::from(venue.capacity))
        .bind(venue.created_at)
        .execute(&self.pool)
        .await
        .map_err(storage)?;
        Ok(venue)
    }

    async fn venue(&self, id: VenueId) -> StoreResult<Venue> {
        let row: Option<VenueRow> = sqlx::query_as(
            "SELECT id, name, address, capacity, created_at FROM venues WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        venue_from(row.ok_or(StoreError::not_found("venue", *id.as_uuid()))?)
    }

    async fn venues(&self) -> StoreResult<Vec<Venue>> {
        let rows: Vec<VenueRow> = sqlx::query_as(
            "SELECT id, name, address, capacity, created_at FROM venues ORDER BY name",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        rows.into_iter().map(venue_from).collect()
    }

    async fn update_venue(&self, id: VenueId, patch: VenuePatch) -> StoreResult<Venue> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let row: Option<VenueRow> = sqlx::query_as(
            "SELECT id, name, address, capacity, created_at FROM venues WHERE id = $1 FOR UPDATE",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;
        let mut venue = venue_from(row.ok_or(StoreError::not_found("venue", *id.as_uuid()))?)?;
        if let Some(name) = patch.name {
            venue.name = name;
        }
        if let Some(address) = patch.address {
            venue.address = Some(address);
        }
        if let Some(capacity) = patch.capacity {
            venue.capacity = capacity;
        }
        sqlx::query("UPDATE venues SET name = $2, address = $3, capacity = $4 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(&venue.name)
            .bind(&venue.address)
            .bind(i64::from(venue.capacity))
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(venue)
    }

    async fn delete_venue(&self, id: VenueId) -> StoreResult<()> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        lock_venue_capacity(&mut tx, id).await?;
        let (in_use,): (bool,) =
            sqlx::query_as("SELECT EXISTS(SELECT 1 FROM events WHERE venue_id = $1)")
                .bind(*id.as_uuid())
                .fetch_one(&mut *tx)
                .await
                .map_err(storage)?;
        if in_use {
            return Err(StoreError::VenueInUse { venue: id });
        }
        sqlx::query("DELETE FROM venues WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                // FK RESTRICT is the backstop for a referencing event
                // committed after our existence check.
                if violated_constraint(&e) == Some("events_venue_id_fkey") {
                    StoreError::VenueInUse { venue: id }
                } else {
                    storage(e)
                }
            })?;
        tx.commit().await.map_err(storage)
    }

    // ── Events ──────────────────────────────────────────────────────────

    async fn create_event(&self, new: NewEvent) -> StoreResult<Event> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let venue_capacity = lock_venue_capacity(&mut tx, new.venue_id).await?;
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
        sqlx::query(
            "INSERT INTO events \
             (id, title, description, venue_id, capacity, start_date, end_date, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(*event.id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(*event.venue_id.as_uuid())
        .bind(i64::from(event.capacity))
        .bind(event.start_date)
        .bind(event.end_date)
        .bind(event.created_at)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(event)
    }

    async fn event(&self, id: EventId) -> StoreResult<Event> {
        let row: Option<EventRow> = sqlx::query_as(&format!("{SELECT_EVENT} WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        event_from(row.ok_or(StoreError::not_found("event", *id.as_uuid()))?)
    }

    async fn events(&self) -> StoreResult<Vec<Event>> {
        let rows: Vec<EventRow> = sqlx::query_as(&format!("{SELECT_EVENT} ORDER BY start_date DESC"))
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?;
        rows.into_iter().map(event_from).collect()
    }

    async fn update_event(&self, id: EventId, patch: EventPatch) -> StoreResult<Event> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let row: Option<EventRow> =
            sqlx::query_as(&format!("{SELECT_EVENT} WHERE id = $1 FOR UPDATE"))
                .bind(*id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage)?;
        let mut event = event_from(row.ok_or(StoreError::not_found("event", *id.as_uuid()))?)?;
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
        let venue_capacity = lock_venue_capacity(&mut tx, event.venue_id).await?;
        validate_event(event.span(), event.capacity, venue_capacity)?;
        sqlx::query(
            "UPDATE events SET title = $2, description = $3, venue_id = $4, capacity = $5, \
             start_date = $6, end_date = $7 WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .bind(&event.title)
        .bind(&event.description)
        .bind(*event.venue_id.as_uuid())
        .bind(i64::from(event.capacity))
        .bind(event.start_date)
        .bind(event.end_date)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(event)
    }

    async fn delete_event(&self, id: EventId) -> StoreResult<()> {
        // Tracks, sessions and registrations go with it via ON DELETE CASCADE.
        let result = sqlx::query("DELETE FROM events WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("event", *id.as_uuid()));
        }
        Ok(())
    }

    async fn registration_count(&self, event: EventId) -> StoreResult<u32> {
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
            .bind(*event.as_uuid())
            .fetch_one(&self.pool)
            .await
            .map_err(storage)?;
        if !exists {
            return Err(StoreError::not_found("event", *event.as_uuid()));
        }
        let (count,): (i64,) =
            sqlx::query_as("SELECT COUNT(*) FROM registrations WHERE event_id = $1")
                .bind(*event.as_uuid())
                .fetch_one(&self.pool)
                .await
                .map_err(storage)?;
        capacity_from_db(count)
    }

    // ── Tracks ──────────────────────────────────────────────────────────

    async fn create_track(&self, new: NewTrack) -> StoreResult<Track> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let (exists,): (bool,) = sqlx::query_as("SELECT EXISTS(SELECT 1 FROM events WHERE id = $1)")
            .bind(*new.event_id.as_uuid())
            .fetch_one(&mut *tx)
            .await
            .map_err(storage)?;
        if !exists {
            return Err(StoreError::not_found("event", *new.event_id.as_uuid()));
        }
        if track_title_taken(&mut tx, new.event_id, &new.title, None).await? {
            return Err(StoreError::DuplicateTrack {
                event: new.event_id,
                title: new.title,
            });
        }
        let track = Track {
            id: TrackId::new(),
            event_id: new.event_id,
            title: new.title,
            description: new.description,
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO tracks (id, event_id, title, description, created_at) \
             VALUES ($1, $2, $3, $4, $5)",
        )
        .bind(*track.id.as_uuid())
        .bind(*track.event_id.as_uuid())
        .bind(&track.title)
        .bind(&track.description)
        .bind(track.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violated_constraint(&e) == Some("tracks_event_title_unique") {
                StoreError::DuplicateTrack {
                    event: track.event_id,
                    title: track.title.clone(),
                }
            } else {
                storage(e)
            }
        })?;
        tx.commit().await.map_err(storage)?;
        Ok(track)
    }

    async fn track(&self, id: TrackId) -> StoreResult<Track> {
        let row: Option<TrackRow> = sqlx::query_as(
            "SELECT id, event_id, title, description, created_at FROM tracks WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        Ok(track_from(row.ok_or(StoreError::not_found("track", *id.as_uuid()))?))
    }

    async fn tracks(&self) -> StoreResult<Vec<Track>> {
        let rows: Vec<TrackRow> = sqlx::query_as(
            "SELECT id, event_id, title, description, created_at FROM tracks ORDER BY title",
        )
        .fetch_all(&self.pool)
        .await
        .map_err(storage)?;
        Ok(rows.into_iter().map(track_from).collect())
    }

    async fn update_track(&self, id: TrackId, patch: TrackPatch) -> StoreResult<Track> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let row: Option<TrackRow> = sqlx::query_as(
            "SELECT id, event_id, title, description, created_at FROM tracks \
             WHERE id = $1 FOR UPDATE",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;
        let mut track = track_from(row.ok_or(StoreError::not_found("track", *id.as_uuid()))?);
        if let Some(title) = patch.title {
            if track_title_taken(&mut tx, track.event_id, &title, Some(id)).await? {
                return Err(StoreError::DuplicateTrack {
                    event: track.event_id,
                    title,
                });
            }
            track.title = title;
        }
        if let Some(description) = patch.description {
            track.description = Some(description);
        }
        sqlx::query("UPDATE tracks SET title = $2, description = $3 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(&track.title)
            .bind(&track.description)
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if violated_constraint(&e) == Some("tracks_event_title_unique") {
                    StoreError::DuplicateTrack {
                        event: track.event_id,
                        title: track.title.clone(),
                    }
                } else {
                    storage(e)
                }
            })?;
        tx.commit().await.map_err(storage)?;
        Ok(track)
    }

    async fn delete_track(&self, id: TrackId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM tracks WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("track", *id.as_uuid()));
        }
        Ok(())
    }

    // ── Speakers ────────────────────────────────────────────────────────

    async fn create_speaker(&self, new: NewSpeaker) -> StoreResult<Speaker> {
        let speaker = Speaker {
            id: SpeakerId::new(),
            name: new.name,
            bio: new.bio,
            created_at: Utc::now(),
        };
        sqlx::query("INSERT INTO speakers (id, name, bio, created_at) VALUES ($1, $2, $3, $4)")
            .bind(*speaker.id.as_uuid())
            .bind(&speaker.name)
            .bind(&speaker.bio)
            .bind(speaker.created_at)
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        Ok(speaker)
    }

    async fn speaker(&self, id: SpeakerId) -> StoreResult<Speaker> {
        let row: Option<SpeakerRow> =
            sqlx::query_as("SELECT id, name, bio, created_at FROM speakers WHERE id = $1")
                .bind(*id.as_uuid())
                .fetch_optional(&self.pool)
                .await
                .map_err(storage)?;
        Ok(speaker_from(row.ok_or(StoreError::not_found("speaker", *id.as_uuid()))?))
    }

    async fn speakers(&self) -> StoreResult<Vec<Speaker>> {
        let rows: Vec<SpeakerRow> =
            sqlx::query_as("SELECT id, name, bio, created_at FROM speakers ORDER BY name")
                .fetch_all(&self.pool)
                .await
                .map_err(storage)?;
        Ok(rows.into_iter().map(speaker_from).collect())
    }

    async fn update_speaker(&self, id: SpeakerId, patch: SpeakerPatch) -> StoreResult<Speaker> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let row: Option<SpeakerRow> = sqlx::query_as(
            "SELECT id, name, bio, created_at FROM speakers WHERE id = $1 FOR UPDATE",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;
        let mut speaker = speaker_from(row.ok_or(StoreError::not_found("speaker", *id.as_uuid()))?);
        if let Some(name) = patch.name {
            speaker.name = name;
        }
        if let Some(bio) = patch.bio {
            speaker.bio = Some(bio);
        }
        sqlx::query("UPDATE speakers SET name = $2, bio = $3 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(&speaker.name)
            .bind(&speaker.bio)
            .execute(&mut *tx)
            .await
            .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(speaker)
    }

    async fn delete_speaker(&self, id: SpeakerId) -> StoreResult<()> {
        // Sessions are detached via ON DELETE SET NULL.
        let result = sqlx::query("DELETE FROM speakers WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("speaker", *id.as_uuid()));
        }
        Ok(())
    }

    // ── Sessions ────────────────────────────────────────────────────────

    async fn create_session(&self, new: NewSession) -> StoreResult<Session> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let event_id = lock_track(&mut tx, new.track_id).await?;
        let span = event_span(&mut tx, event_id).await?;
        if let Some(speaker) = new.speaker_id {
            speaker_exists(&mut tx, speaker).await?;
        }
        let slot = TimeSlot::new(new.start_time, new.end_time);
        let siblings = track_siblings(&mut tx, new.track_id).await?;
        validate_session(new.track_id, slot, span, &siblings, None)?;
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
        sqlx::query(
            "INSERT INTO sessions \
             (id, track_id, title, speaker_id, start_time, end_time, room, created_at) \
             VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
        )
        .bind(*session.id.as_uuid())
        .bind(*session.track_id.as_uuid())
        .bind(&session.title)
        .bind(session.speaker_id.map(|s| *s.as_uuid()))
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(&session.room)
        .bind(session.created_at)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(session)
    }

    async fn session(&self, id: SessionId) -> StoreResult<Session> {
        let row: Option<SessionRow> = sqlx::query_as(&format!("{SELECT_SESSION} WHERE id = $1"))
            .bind(*id.as_uuid())
            .fetch_optional(&self.pool)
            .await
            .map_err(storage)?;
        Ok(session_from(row.ok_or(StoreError::not_found("session", *id.as_uuid()))?))
    }

    async fn sessions(&self, filter: SessionFilter) -> StoreResult<Vec<Session>> {
        let rows: Vec<SessionRow> = if let Some(track) = filter.track_id {
            sqlx::query_as(&format!("{SELECT_SESSION} WHERE track_id = $1 ORDER BY start_time"))
                .bind(*track.as_uuid())
                .fetch_all(&self.pool)
                .await
                .map_err(storage)?
        } else if let Some(event) = filter.event_id {
            sqlx::query_as(
                "SELECT s.id, s.track_id, s.title, s.speaker_id, s.start_time, s.end_time, \
                 s.room, s.created_at FROM sessions s \
                 JOIN tracks t ON t.id = s.track_id \
                 WHERE t.event_id = $1 ORDER BY s.start_time",
            )
            .bind(*event.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?
        } else {
            sqlx::query_as(&format!("{SELECT_SESSION} ORDER BY start_time"))
                .fetch_all(&self.pool)
                .await
                .map_err(storage)?
        };
        Ok(rows.into_iter().map(session_from).collect())
    }

    async fn update_session(&self, id: SessionId, patch: SessionPatch) -> StoreResult<Session> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let row: Option<SessionRow> =
            sqlx::query_as(&format!("{SELECT_SESSION} WHERE id = $1 FOR UPDATE"))
                .bind(*id.as_uuid())
                .fetch_optional(&mut *tx)
                .await
                .map_err(storage)?;
        let mut session = session_from(row.ok_or(StoreError::not_found("session", *id.as_uuid()))?);
        if let Some(track_id) = patch.track_id {
            session.track_id = track_id;
        }
        if let Some(title) = patch.title {
            session.title = title;
        }
        if let Some(speaker_id) = patch.speaker_id {
            speaker_exists(&mut tx, speaker_id).await?;
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
        let event_id = lock_track(&mut tx, session.track_id).await?;
        let span = event_span(&mut tx, event_id).await?;
        let siblings = track_siblings(&mut tx, session.track_id).await?;
        validate_session(session.track_id, session.slot(), span, &siblings, Some(id))?;
        sqlx::query(
            "UPDATE sessions SET track_id = $2, title = $3, speaker_id = $4, start_time = $5, \
             end_time = $6, room = $7 WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .bind(*session.track_id.as_uuid())
        .bind(&session.title)
        .bind(session.speaker_id.map(|s| *s.as_uuid()))
        .bind(session.start_time)
        .bind(session.end_time)
        .bind(&session.room)
        .execute(&mut *tx)
        .await
        .map_err(storage)?;
        tx.commit().await.map_err(storage)?;
        Ok(session)
    }

    async fn delete_session(&self, id: SessionId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM sessions WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("session", *id.as_uuid()));
        }
        Ok(())
    }

    // ── Registrations ───────────────────────────────────────────────────

    async fn create_registration(&self, new: NewRegistration) -> StoreResult<Registration> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let capacity = lock_event_capacity(&mut tx, new.event_id).await?;
        let existing = event_registrations(&mut tx, new.event_id).await?;
        validate_registration(new.attendee_id, new.event_id, capacity, &existing, None)?;
        let registration = Registration {
            id: RegistrationId::new(),
            attendee_id: new.attendee_id,
            event_id: new.event_id,
            created_at: Utc::now(),
        };
        sqlx::query(
            "INSERT INTO registrations (id, attendee_id, event_id, created_at) \
             VALUES ($1, $2, $3, $4)",
        )
        .bind(*registration.id.as_uuid())
        .bind(*registration.attendee_id.as_uuid())
        .bind(*registration.event_id.as_uuid())
        .bind(registration.created_at)
        .execute(&mut *tx)
        .await
        .map_err(|e| {
            if violated_constraint(&e) == Some("registrations_attendee_event_unique") {
                StoreError::Validation(ValidationError::DuplicateRegistration {
                    attendee: registration.attendee_id,
                    event: registration.event_id,
                })
            } else {
                storage(e)
            }
        })?;
        tx.commit().await.map_err(storage)?;
        Ok(registration)
    }

    async fn registration(&self, id: RegistrationId) -> StoreResult<Registration> {
        let row: Option<RegistrationRow> = sqlx::query_as(
            "SELECT id, attendee_id, event_id, created_at FROM registrations WHERE id = $1",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;
        Ok(registration_from(
            row.ok_or(StoreError::not_found("registration", *id.as_uuid()))?,
        ))
    }

    async fn registrations(&self, attendee: Option<AttendeeId>) -> StoreResult<Vec<Registration>> {
        let rows: Vec<RegistrationRow> = if let Some(attendee) = attendee {
            sqlx::query_as(
                "SELECT id, attendee_id, event_id, created_at FROM registrations \
                 WHERE attendee_id = $1 ORDER BY created_at",
            )
            .bind(*attendee.as_uuid())
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?
        } else {
            sqlx::query_as(
                "SELECT id, attendee_id, event_id, created_at FROM registrations \
                 ORDER BY created_at",
            )
            .fetch_all(&self.pool)
            .await
            .map_err(storage)?
        };
        Ok(rows.into_iter().map(registration_from).collect())
    }

    async fn update_registration(
        &self,
        id: RegistrationId,
        event: EventId,
    ) -> StoreResult<Registration> {
        let mut tx = self.pool.begin().await.map_err(storage)?;
        let row: Option<RegistrationRow> = sqlx::query_as(
            "SELECT id, attendee_id, event_id, created_at FROM registrations \
             WHERE id = $1 FOR UPDATE",
        )
        .bind(*id.as_uuid())
        .fetch_optional(&mut *tx)
        .await
        .map_err(storage)?;
        let mut registration =
            registration_from(row.ok_or(StoreError::not_found("registration", *id.as_uuid()))?);
        let capacity = lock_event_capacity(&mut tx, event).await?;
        let existing = event_registrations(&mut tx, event).await?;
        validate_registration(registration.attendee_id, event, capacity, &existing, Some(id))?;
        registration.event_id = event;
        sqlx::query("UPDATE registrations SET event_id = $2 WHERE id = $1")
            .bind(*id.as_uuid())
            .bind(*event.as_uuid())
            .execute(&mut *tx)
            .await
            .map_err(|e| {
                if violated_constraint(&e) == Some("registrations_attendee_event_unique") {
                    StoreError::Validation(ValidationError::DuplicateRegistration {
                        attendee: registration.attendee_id,
                        event,
                    })
                } else {
                    storage(e)
                }
            })?;
        tx.commit().await.map_err(storage)?;
        Ok(registration)
    }

    async fn delete_registration(&self, id: RegistrationId) -> StoreResult<()> {
        let result = sqlx::query("DELETE FROM registrations WHERE id = $1")
            .bind(*id.as_uuid())
            .execute(&self.pool)
            .await
            .map_err(storage)?;
        if result.rows_affected() == 0 {
            return Err(StoreError::not_found("registration", *id.as_uuid()));
        }
        Ok(())
    }
}
