/// Review item identifiers: creation timestamp in milliseconds plus a
/// batch-index tie-break.
pub type ItemId = i64;

/// All timestamps are UTC.
pub type Timestamp = chrono::DateTime<chrono::Utc>;
