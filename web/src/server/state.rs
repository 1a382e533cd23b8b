//! Application state for the Confplan HTTP server.

use confplan_core::ScheduleStore;
use std::sync::Arc;

/// Application state shared across all HTTP handlers.
///
/// Cloned (cheaply via Arc) for each request. Handlers only see the
/// `ScheduleStore` trait, so tests run the same router over the in-memory
/// store.
#[derive(Clone)]
pub struct AppState {
    /// The transactional write gate and read source for all entities.
    pub store: Arc<dyn ScheduleStore>,
}

impl AppState {
    /// Create a new application state over the given store.
    #[must_use]
    pub fn new(store: Arc<dyn ScheduleStore>) -> Self {
        Self { store }
    }
}
