//! Human-readable durations.

/// `HH:MM:SS`, used for live timers. Negative input renders as zero.
pub fn clock(ms: i64) -> String {
    let total_seconds = ms.max(0) / 1000;
    let h = total_seconds / 3600;
    let m = (total_seconds % 3600) / 60;
    let s = total_seconds % 60;
    format!("{h:02}:{m:02}:{s:02}")
}

/// `Xh Ym`, used for aggregates. Negative input renders as zero.
pub fn short(ms: i64) -> String {
    let total_minutes = ms.max(0) / 60_000;
    format!("{}h {}m", total_minutes / 60, total_minutes % 60)
}

/// `MM:SS` for a countdown.
pub fn countdown(ms: u64) -> String {
    let total_seconds = ms.div_ceil(1000);
    format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn clock_pads_and_truncates() {
        assert_eq!(clock(0), "00:00:00");
        assert_eq!(clock(3_661_999), "01:01:01");
        assert_eq!(clock(-5), "00:00:00");
        assert_eq!(clock(100 * 3_600_000), "100:00:00");
    }

    #[test]
    fn short_drops_seconds() {
        assert_eq!(short(8 * 3_600_000), "8h 0m");
        assert_eq!(short(8 * 3_600_000 / 7), "1h 8m");
        assert_eq!(short(59_999), "0h 0m");
    }

    #[test]
    fn countdown_rounds_up() {
        assert_eq!(countdown(1_500_000), "25:00");
        assert_eq!(countdown(1), "00:01");
        assert_eq!(countdown(0), "00:00");
    }
}
