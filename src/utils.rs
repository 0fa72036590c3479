//! Utility functions

/// Generate unique ID
///
/// Ids are process-wide and monotonic; the first id handed out is 1.
pub fn next_id() -> u64 {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(1);
    COUNTER.fetch_add(1, Ordering::Relaxed)
}

/// Name given to entities created without one
pub fn generated_name(serial: u64) -> String {
    format!("__name__{serial}")
}
