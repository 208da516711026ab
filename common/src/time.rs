use std::time::SystemTime;

/// Wall-clock time in milliseconds, used for slow-input adaptation timing.
///
/// Falls back to `0` on clock error rather than propagating a `Result` -
/// callers on the mutation hot path can't handle failure here and a stuck
/// clock only degrades the splice-timing heuristic, it doesn't corrupt
/// anything.
pub fn now_ms() -> u64 {
    SystemTime::now()
        .duration_since(SystemTime::UNIX_EPOCH)
        .map(|d| d.as_millis() as u64)
        .unwrap_or(0)
}
