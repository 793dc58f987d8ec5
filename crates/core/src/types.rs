/// All database primary keys are PostgreSQL BIGSERIAL.
pub type DbId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;

/// Version numbers are PostgreSQL INTEGER, starting at 1 per content key.
pub type VersionNumber = i32;
