//! Router configuration for the Confplan API.

use super::health::{health_check, readiness_check};
use super::state::AppState;
use crate::api::{events, registrations, sessions, speakers, tracks, venues};
use axum::{
    Router,
    routing::{delete, get, post, put},
};
use tower_http::trace::TraceLayer;

/// Build the complete Axum router.
///
/// Health checks live at the root; everything else sits under `/api`.
/// Reads are public, writes require a bearer token.
pub fn build_router(state: AppState) -> Router {
    let api_routes = Router::new()
        // Venues
        .route("/venues", post(venues::create_venue))
        .route("/venues", get(venues::list_venues))
        .route("/venues/:id", get(venues::get_venue))
        .route("/venues/:id", put(venues::update_venue))
        .route("/venues/:id", delete(venues::delete_venue))
        // Events
        .route("/events", post(events::create_event))
        .route("/events", get(events::list_events))
        .route("/events/:id", get(events::get_event))
        .route("/events/:id", put(events::update_event))
        .route("/events/:id", delete(events::delete_event))
        // Tracks
        .route("/tracks", post(tracks::create_track))
        .route("/tracks", get(tracks::list_tracks))
        .route("/tracks/:id", get(tracks::get_track))
        .route("/tracks/:id", put(tracks::update_track))
        .route("/tracks/:id", delete(tracks::delete_track))
        // Speakers
        .route("/speakers", post(speakers::create_speaker))
        .route("/speakers", get(speakers::list_speakers))
        .route("/speakers/:id", get(speakers::get_speaker))
        .route("/speakers/:id", put(speakers::update_speaker))
        .route("/speakers/:id", delete(speakers::delete_speaker))
        // Sessions
        .route("/sessions", post(sessions::create_session))
        .route("/sessions", get(sessions::list_sessions))
        .route("/sessions/:id", get(sessions::get_session))
        .route("/sessions/:id", put(sessions::update_session))
        .route("/sessions/:id", delete(sessions::delete_session))
        // Registrations (always scoped to the authenticated attendee)
        .route("/registrations", post(registrations::create_registration))
        .route("/registrations", get(registrations::list_registrations))
        .route("/registrations/:id", get(registrations::get_registration))
        .route("/registrations/:id", put(registrations::update_registration))
        .route(
            "/registrations/:id",
            delete(registrations::delete_registration),
        );

    Router::new()
        .route("/health", get(health_check))
        .route("/ready", get(readiness_check))
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
