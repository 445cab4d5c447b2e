/// Returns the current Unix timestamp in milliseconds.
pub fn current_unix_timestamp_ms() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_millis()
        .try_into()
        .unwrap_or(u64::MAX)
}

/// Returns the current Unix timestamp in seconds.
pub fn current_unix_timestamp() -> u64 {
    std::time::SystemTime::now()
        .duration_since(std::time::UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs()
}

/// Absolute distance in seconds between two signed Unix timestamps.
pub fn unix_skew_seconds(left: i64, right: i64) -> u64 {
    let delta = i128::from(left) - i128::from(right);
    u64::try_from(delta.unsigned_abs()).unwrap_or(u64::MAX)
}
