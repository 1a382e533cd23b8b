//! Schema creation.
//!
//! The unique constraints and foreign key actions mirror the store-level
//! checks: they are the backstop that holds even if a code path bypasses the
//! write gate. Constraint names are load-bearing; the store maps violations
//! of `tracks_event_title_unique` and `registrations_attendee_event_unique`
//! back to domain errors.

use sqlx::PgPool;

const DDL: &[&str] = &[
    r"
    CREATE TABLE IF NOT EXISTS venues (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        address TEXT,
        capacity BIGINT NOT NULL CHECK (capacity >= 0),
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS events (
        id UUID PRIMARY KEY,
        title TEXT NOT NULL,
        description TEXT,
        venue_id UUID NOT NULL REFERENCES venues(id) ON DELETE RESTRICT,
        capacity BIGINT NOT NULL CHECK (capacity >= 0),
        start_date TIMESTAMPTZ NOT NULL,
        end_date TIMESTAMPTZ NOT NULL,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CHECK (start_date < end_date)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_events_venue ON events(venue_id)",
    r"
    CREATE TABLE IF NOT EXISTS tracks (
        id UUID PRIMARY KEY,
        event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        description TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT tracks_event_title_unique UNIQUE (event_id, title)
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS speakers (
        id UUID PRIMARY KEY,
        name TEXT NOT NULL,
        bio TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now()
    )
    ",
    r"
    CREATE TABLE IF NOT EXISTS sessions (
        id UUID PRIMARY KEY,
        track_id UUID NOT NULL REFERENCES tracks(id) ON DELETE CASCADE,
        title TEXT NOT NULL,
        speaker_id UUID REFERENCES speakers(id) ON DELETE SET NULL,
        start_time TIMESTAMPTZ NOT NULL,
        end_time TIMESTAMPTZ NOT NULL,
        room TEXT,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CHECK (start_time < end_time)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_sessions_track ON sessions(track_id)",
    "CREATE INDEX IF NOT EXISTS idx_sessions_speaker ON sessions(speaker_id)",
    r"
    CREATE TABLE IF NOT EXISTS registrations (
        id UUID PRIMARY KEY,
        attendee_id UUID NOT NULL,
        event_id UUID NOT NULL REFERENCES events(id) ON DELETE CASCADE,
        created_at TIMESTAMPTZ NOT NULL DEFAULT now(),
        CONSTRAINT registrations_attendee_event_unique UNIQUE (attendee_id, event_id)
    )
    ",
    "CREATE INDEX IF NOT EXISTS idx_registrations_event ON registrations(event_id)",
];

/// Creates the schedule tables and indexes if they do not exist.
pub async fn migrate(pool: &PgPool) -> Result<(), sqlx::Error> {
    for statement in DDL {
        sqlx::query(statement).execute(pool).await?;
    }
    tracing::info!("schedule schema is up to date");
    Ok(())
}
