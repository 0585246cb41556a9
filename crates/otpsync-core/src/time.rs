//! Timezone helpers.

use chrono::{FixedOffset, Local, Offset};

/// Minutes west of UTC for the local timezone, the sign convention the watch
/// expects (UTC+2 is `-120`).
pub fn local_timezone_offset() -> i32 {
    offset_minutes_west(Local::now().offset().fix())
}

/// Convert a fixed offset into minutes west of UTC.
pub fn offset_minutes_west(offset: FixedOffset) -> i32 {
    -offset.local_minus_utc() / 60
}
