use std::sync::atomic::{AtomicU64, Ordering};

use crate::time_utils::current_unix_timestamp_ms;

static IDENTIFIER_COUNTER: AtomicU64 = AtomicU64::new(1);

/// Mints a process-unique identifier shaped `<prefix>-<unix_ms>-<sequence>`.
pub fn next_identifier(prefix: &str) -> String {
    let sequence = IDENTIFIER_COUNTER.fetch_add(1, Ordering::Relaxed);
    format!("{prefix}-{}-{sequence}", current_unix_timestamp_ms())
}
