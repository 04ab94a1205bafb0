/// Session identifiers are UUID v4 strings.
pub type SessionId = String;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
