//! Wall-clock helpers.
//!
//! Every timestamp in the persisted state is milliseconds since the Unix
//! epoch, so the state blob stays compatible across time zones.

use chrono::{DateTime, Local, TimeZone, Utc};

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    Utc::now().timestamp_millis()
}

/// Convert epoch milliseconds into a zoned timestamp.
///
/// Out-of-range values clamp to the epoch rather than panicking.
pub fn from_ms<Tz: TimeZone>(ms: i64, tz: &Tz) -> DateTime<Tz> {
    DateTime::<Utc>::from_timestamp_millis(ms)
        .unwrap_or_default()
        .with_timezone(tz)
}

/// Whether `ms` falls inside the range chrono can represent.
pub fn is_representable(ms: i64) -> bool {
    DateTime::<Utc>::from_timestamp_millis(ms).is_some()
}

/// Epoch milliseconds rendered in the local time zone.
pub fn local(ms: i64) -> DateTime<Local> {
    from_ms(ms, &Local)
}
