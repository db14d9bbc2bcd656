//! Persistence layer: PostgreSQL-backed user storage.
//!
//! The concrete implementation uses `sqlx::PgPool` for async PostgreSQL
//! access. The realtime registry is deliberately not persisted: it is
//! pure in-memory state, lost on restart, and reconnecting clients
//! simply re-register.

pub mod models;
pub mod postgres;

pub use models::UserRecord;
pub use postgres::UserRepository;
