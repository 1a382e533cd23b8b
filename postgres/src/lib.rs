//! `PostgreSQL` schedule store for Confplan.
//!
//! This crate provides a production `PostgreSQL`-backed implementation of the
//! `ScheduleStore` trait from `confplan-core`. Every write that could break a
//! scheduling invariant runs inside a transaction that first locks the scope
//! row with `SELECT ... FOR UPDATE`:
//!
//! - event writes lock the venue row (capacity bound),
//! - session writes lock the track row (overlap and containment),
//! - registration writes lock the event row (capacity and uniqueness).
//!
//! Concurrent conflicting writes therefore serialize at the database, and the
//! second writer revalidates against the first writer's committed state.
//!
//! # Example
//!
//! ```ignore
//! use confplan_postgres::PostgresScheduleStore;
//!
//! async fn example() -> Result<(), Box<dyn std::error::Error>> {
//!     let store = PostgresScheduleStore::new("postgres://localhost/confplan").await?;
//!     store.migrate().await?;
//!     Ok(())
//! }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod schema;
mod store;

pub use store::PostgresScheduleStore;
