const MILLIS_PER_SECOND: u64 = 1_000;
const MILLIS_PER_MINUTE: u64 = 60_000;
const MILLIS_PER_HOUR: u64 = 3_600_000;

/// A duration is usable once metadata has loaded and reports a non-zero length.
pub fn is_valid_duration(duration: Option<u64>) -> bool {
    matches!(duration, Some(ms) if ms > 0)
}

/// Formats milliseconds as `MM:SS`, or `HH:MM:SS` from one hour up.
/// Every field is truncated, never rounded.
pub fn format_time(ms: u64) -> String {
    let hours = ms / MILLIS_PER_HOUR;
    let minutes = (ms % MILLIS_PER_HOUR) / MILLIS_PER_MINUTE;
    let seconds = (ms % MILLIS_PER_MINUTE) / MILLIS_PER_SECOND;

    if ms >= MILLIS_PER_HOUR {
        format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
    } else {
        format!("{:02}:{:02}", minutes, seconds)
    }
}

/// The `current/total` text shown next to the seek bar.
pub fn format_progress(current_ms: u64, total_ms: u64) -> String {
    format!("{}/{}", format_time(current_ms), format_time(total_ms))
}
