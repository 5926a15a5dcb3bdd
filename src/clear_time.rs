//! Clear-time and keystone upgrade formatting.

const MS_PER_SECOND: u64 = 1_000;
const MS_PER_MINUTE: u64 = 60 * MS_PER_SECOND;
const MS_PER_HOUR: u64 = 60 * MS_PER_MINUTE;

const UPGRADE_MARKERS: [&str; 4] = ["", "+", "++", "+++"];

/// Formats elapsed milliseconds as `HH:MM:SS.mmm`.
///
/// Hours are not capped: 100 hours and above widen the hour field.
pub fn format_clear_time(elapsed_ms: u64) -> String {
    let hours = elapsed_ms / MS_PER_HOUR;
    let minutes = (elapsed_ms % MS_PER_HOUR) / MS_PER_MINUTE;
    let seconds = (elapsed_ms % MS_PER_MINUTE) / MS_PER_SECOND;
    let millis = elapsed_ms % MS_PER_SECOND;

    format!("{hours:02}:{minutes:02}:{seconds:02}.{millis:03}")
}

/// `+` per keystone upgrade; anything above 3 renders as `+++`.
pub fn keystone_upgrade_marker(upgrades: u8) -> &'static str {
    UPGRADE_MARKERS[usize::from(upgrades.min(3))]
}

pub fn is_timed(clear_time_ms: u64, par_time_ms: u64) -> bool {
    clear_time_ms < par_time_ms
}
