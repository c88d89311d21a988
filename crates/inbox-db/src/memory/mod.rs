//! Process-local repositories
//!
//! [`MemoryStore`] implements every repository trait over one lock so the
//! same invariants hold as in PostgreSQL: one conversation per unordered
//! pair, participant-checked inserts and conditional read updates.

mod store;

pub use store::MemoryStore;
