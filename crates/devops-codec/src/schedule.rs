//! Polling interval to Jenkins schedule translation

const MINUTE_MILLIS: i64 = 60 * 1000;
const HOUR_MILLIS: i64 = 60 * MINUTE_MILLIS;

/// Upper interval bounds (inclusive, milliseconds) and the schedule used
/// for intervals up to that bound.
const SCHEDULE_STEPS: [(i64, &str); 6] = [
    (5 * MINUTE_MILLIS, "* * * * *"),
    (30 * MINUTE_MILLIS, "H/5 * * * *"),
    (HOUR_MILLIS, "H/15 * * * *"),
    (8 * HOUR_MILLIS, "H/30 * * * *"),
    (24 * HOUR_MILLIS, "H H/4 * * *"),
    (48 * HOUR_MILLIS, "H H/12 * * *"),
];

const FALLBACK_SCHEDULE: &str = "H H * * *";

/// Maps a folder-scan interval to the cron-like `spec` Jenkins stores next
/// to it. The mapping is one-way; only the interval is ever read back.
pub fn to_schedule(interval_millis: i64) -> &'static str {
    SCHEDULE_STEPS
        .iter()
        .find(|(bound, _)| interval_millis <= *bound)
        .map(|(_, schedule)| *schedule)
        .unwrap_or(FALLBACK_SCHEDULE)
}
