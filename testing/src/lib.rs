//! Testing utilities for Confplan.
//!
//! Provides [`MemoryStore`], a fully invariant-enforcing in-memory
//! implementation of [`confplan_core::ScheduleStore`], plus fixture
//! builders. The memory store is the "in-memory fake" the validation
//! design calls for: every scheduling rule behaves exactly as in the
//! PostgreSQL store, at memory speed and with no external services.

pub mod fixtures;
pub mod memory;

pub use memory::MemoryStore;
