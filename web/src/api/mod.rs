//! REST endpoints for the scheduling domain.
//!
//! One module per resource. Reads are public; every mutation takes a
//! [`Principal`](crate::auth::Principal) and goes through the store's
//! validated write path, so no handler can bypass the scheduling rules.

pub mod events;
pub mod registrations;
pub mod sessions;
pub mod speakers;
pub mod tracks;
pub mod venues;
