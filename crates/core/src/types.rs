//! Shared primitive aliases.

/// Primary key of every persisted entity (PostgreSQL `BIGSERIAL`).
pub type DbId = i64;

/// UTC wall-clock instant used for lifecycle stamps and limit windows.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Site version number. Starts at 1 and increments per successful generation.
pub type VersionNumber = i32;
