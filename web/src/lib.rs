//! Axum HTTP API for Confplan.
//!
//! The imperative shell over the scheduling core: handlers parse requests,
//! call the `ScheduleStore` write gate, and map domain errors to HTTP once,
//! in [`error::AppError`].
//!
//! ```text
//! ┌─────────────────────────────────────────┐
//! │         HTTP layer (this crate)         │  ← routing, auth, JSON
//! ├─────────────────────────────────────────┤
//! │     ScheduleStore (postgres/memory)     │  ← transactional write gate
//! ├─────────────────────────────────────────┤
//! │   confplan-core checks + orchestrator   │  ← pure, testable rules
//! └─────────────────────────────────────────┘
//! ```
//!
//! # Request Flow
//!
//! 1. **HTTP request** arrives at an Axum handler
//! 2. **Principal** is extracted from the bearer token on writes
//! 3. **Payload** deserializes straight into a core `New*`/`*Patch` type
//! 4. **Store call** runs validation and persistence in one transaction
//! 5. **Result** maps to JSON, errors map to the 4xx/5xx taxonomy

#![forbid(unsafe_code)]
#![warn(missing_docs, clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]

pub mod api;
pub mod auth;
pub mod config;
pub mod error;
pub mod server;

// Re-export key types for convenience
pub use auth::Principal;
pub use config::Config;
pub use error::AppError;
pub use server::{AppState, build_router};

/// Result type alias for web handlers.
pub type WebResult<T> = Result<T, AppError>;
