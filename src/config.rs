use chrono::{FixedOffset, NaiveDate, NaiveTime};
use serde::Serialize;

/// Acceptance window for a clock action, local time.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct ClockWindow {
    pub start: NaiveTime,
    pub end: NaiveTime,
}

impl ClockWindow {
    pub fn contains(&self, time: NaiveTime) -> bool {
        time >= self.start && time <= self.end
    }
}

/// Process configuration, resolved once at startup and threaded into
/// every call that needs it. The aggregation core never reads the
/// environment itself.
#[derive(Debug, Clone, Serialize)]
pub struct Settings {
    /// Months that ended before this date report all-zero rows.
    pub attendance_tracking_start: NaiveDate,
    pub annual_leave_quota_days: i64,
    pub clock_in_window: ClockWindow,
    pub clock_out_window: ClockWindow,
    /// Clock-ins after this local time are recorded as late.
    pub late_after: NaiveTime,
    /// Office offset from UTC; clock windows are judged in this zone.
    #[serde(skip)]
    pub work_offset: FixedOffset,
}

fn env_date(key: &str, fallback: NaiveDate) -> NaiveDate {
    match std::env::var(key) {
        Ok(raw) => NaiveDate::parse_from_str(raw.trim(), "%Y-%m-%d").unwrap_or_else(|_| {
            tracing::warn!("{key}={raw} is not a YYYY-MM-DD date, using {fallback}");
            fallback
        }),
        Err(_) => fallback,
    }
}

fn env_time(key: &str, fallback: NaiveTime) -> NaiveTime {
    match std::env::var(key) {
        Ok(raw) => NaiveTime::parse_from_str(raw.trim(), "%H:%M").unwrap_or_else(|_| {
            tracing::warn!("{key}={raw} is not a HH:MM time, using {fallback}");
            fallback
        }),
        Err(_) => fallback,
    }
}

fn env_i64(key: &str, fallback: i64) -> i64 {
    match std::env::var(key) {
        Ok(raw) => raw.trim().parse().unwrap_or_else(|_| {
            tracing::warn!("{key}={raw} is not a number, using {fallback}");
            fallback
        }),
        Err(_) => fallback,
    }
}

fn env_offset(key: &str) -> FixedOffset {
    let utc = FixedOffset::east_opt(0).unwrap();
    match std::env::var(key) {
        Ok(raw) => {
            let trimmed = raw.trim();
            let parsed = trimmed
                .parse::<i32>()
                .ok()
                .and_then(|hours| FixedOffset::east_opt(hours * 3600));
            parsed.unwrap_or_else(|| {
                tracing::warn!("{key}={raw} is not a whole-hour offset, using UTC");
                utc
            })
        }
        Err(_) => utc,
    }
}

impl Settings {
    pub fn from_env() -> Self {
        let time = |h, m| NaiveTime::from_hms_opt(h, m, 0).unwrap();
        Settings {
            attendance_tracking_start: env_date(
                "ATTENDANCE_TRACKING_START",
                NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
            ),
            annual_leave_quota_days: env_i64("ANNUAL_LEAVE_QUOTA_DAYS", 12),
            clock_in_window: ClockWindow {
                start: env_time("CLOCK_IN_START", time(6, 0)),
                end: env_time("CLOCK_IN_END", time(12, 0)),
            },
            clock_out_window: ClockWindow {
                start: env_time("CLOCK_OUT_START", time(16, 0)),
                end: env_time("CLOCK_OUT_END", time(23, 0)),
            },
            late_after: env_time("LATE_AFTER", time(8, 30)),
            work_offset: env_offset("WORK_UTC_OFFSET_HOURS"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn window_bounds_are_inclusive() {
        let window = ClockWindow {
            start: NaiveTime::from_hms_opt(6, 0, 0).unwrap(),
            end: NaiveTime::from_hms_opt(12, 0, 0).unwrap(),
        };
        assert!(window.contains(NaiveTime::from_hms_opt(6, 0, 0).unwrap()));
        assert!(window.contains(NaiveTime::from_hms_opt(12, 0, 0).unwrap()));
        assert!(!window.contains(NaiveTime::from_hms_opt(12, 0, 1).unwrap()));
        assert!(!window.contains(NaiveTime::from_hms_opt(5, 59, 59).unwrap()));
    }
}
