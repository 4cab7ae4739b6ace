use crate::domain::models::{AttendanceRecord, AttendanceStatus};
use chrono::{DateTime, Datelike, FixedOffset, NaiveDate, Utc, Weekday};
use serde::Serialize;

/// Per-day attendance breakdown for one group of employees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct DayClassification {
    pub present: usize,
    pub late: usize,
    pub early_leave: usize,
    pub on_time: usize,
    pub absent: usize,
}

/// Counts a day's records against the group headcount.
///
/// "Present" means any clock-in that day, late or not. On-time is
/// clamped at zero so a record flagged both late and early-leave by bad
/// input cannot push the count negative, and absent is clamped so a
/// headcount smaller than the record set cannot either.
pub fn classify_day(records: &[AttendanceRecord], employee_count: usize) -> DayClassification {
    let present = records.len();
    let late = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::Late)
        .count();
    let early_leave = records
        .iter()
        .filter(|r| r.status == AttendanceStatus::EarlyLeave)
        .count();

    DayClassification {
        present,
        late,
        early_leave,
        on_time: present.saturating_sub(late).saturating_sub(early_leave),
        absent: employee_count.saturating_sub(present),
    }
}

/// Weekdays in a month. Saturdays and Sundays are excluded; no holiday
/// calendar is consulted.
pub fn work_days_in_month(year: i32, month: u32) -> u32 {
    let Some(first) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return 0;
    };
    let mut day = first;
    let mut count = 0;
    while day.month() == month {
        if !matches!(day.weekday(), Weekday::Sat | Weekday::Sun) {
            count += 1;
        }
        day = match day.succ_opt() {
            Some(next) => next,
            None => break,
        };
    }
    count
}

/// The office-local calendar day a clock-in belongs to.
///
/// Timestamps are stored in UTC; every day bucket in the aggregation
/// layer is an office-local day, so the shift has to happen before the
/// date is taken.
pub fn local_day(clock_in: DateTime<Utc>, offset: FixedOffset) -> NaiveDate {
    clock_in.with_timezone(&offset).date_naive()
}

/// Attendance rate for a month as a percentage in [0, 100].
///
/// Denominator is headcount x weekday count; a zero denominator yields
/// 0.0 rather than a division error. Records outside the month are
/// skipped, not rejected.
pub fn monthly_attendance_rate(
    records: &[AttendanceRecord],
    employee_count: usize,
    year: i32,
    month: u32,
    offset: FixedOffset,
) -> f64 {
    let work_days = work_days_in_month(year, month);
    let denominator = employee_count as f64 * work_days as f64;
    if denominator == 0.0 {
        return 0.0;
    }

    let in_month = records
        .iter()
        .filter(|r| {
            let date = local_day(r.clock_in, offset);
            date.year() == year && date.month() == month
        })
        .count();

    (in_month as f64 / denominator * 100.0).clamp(0.0, 100.0)
}

/// Records whose clock-in falls on the given office-local date.
pub fn records_on(
    records: &[AttendanceRecord],
    date: NaiveDate,
    offset: FixedOffset,
) -> Vec<AttendanceRecord> {
    records
        .iter()
        .filter(|r| local_day(r.clock_in, offset) == date)
        .cloned()
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{DateTime, TimeZone, Utc};
    use uuid::Uuid;

    fn record(status: AttendanceStatus, clock_in: DateTime<Utc>) -> AttendanceRecord {
        AttendanceRecord {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            clock_in,
            clock_out: None,
            status,
            location: None,
            notes: None,
        }
    }

    fn at(y: i32, m: u32, d: u32, h: u32) -> DateTime<Utc> {
        Utc.with_ymd_and_hms(y, m, d, h, 0, 0).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn classify_day_matches_headcount_scenario() {
        // 10 employees, 6 clocked in, 2 late, 1 early leave.
        let mut records = vec![
            record(AttendanceStatus::Late, at(2024, 6, 10, 8)),
            record(AttendanceStatus::Late, at(2024, 6, 10, 8)),
            record(AttendanceStatus::EarlyLeave, at(2024, 6, 10, 7)),
        ];
        for _ in 0..3 {
            records.push(record(AttendanceStatus::Present, at(2024, 6, 10, 7)));
        }

        let day = classify_day(&records, 10);
        assert_eq!(day.present, 6);
        assert_eq!(day.late, 2);
        assert_eq!(day.early_leave, 1);
        assert_eq!(day.on_time, 3);
        assert_eq!(day.absent, 4);
    }

    #[test]
    fn absent_never_goes_negative() {
        let records = vec![
            record(AttendanceStatus::Present, at(2024, 6, 10, 7)),
            record(AttendanceStatus::Present, at(2024, 6, 10, 7)),
            record(AttendanceStatus::Present, at(2024, 6, 10, 7)),
        ];
        let day = classify_day(&records, 2);
        assert_eq!(day.present, 3);
        assert_eq!(day.absent, 0);
    }

    #[test]
    fn classify_day_is_pure() {
        let records = vec![record(AttendanceStatus::Late, at(2024, 6, 10, 9))];
        let first = classify_day(&records, 5);
        let second = classify_day(&records, 5);
        assert_eq!(first, second);
    }

    #[test]
    fn work_days_skip_weekends() {
        // June 2024: 30 days, starts on a Saturday, 20 weekdays.
        assert_eq!(work_days_in_month(2024, 6), 20);
        // February 2024 (leap): 29 days, 21 weekdays.
        assert_eq!(work_days_in_month(2024, 2), 21);
        assert_eq!(work_days_in_month(2024, 13), 0);
    }

    #[test]
    fn monthly_rate_zero_employees_is_zero() {
        let records = vec![record(AttendanceStatus::Present, at(2024, 6, 10, 7))];
        assert_eq!(monthly_attendance_rate(&records, 0, 2024, 6, utc()), 0.0);
    }

    #[test]
    fn monthly_rate_counts_only_the_given_month() {
        // 1 employee, June 2024 has 20 work days; 10 records in June
        // plus noise from May.
        let mut records = Vec::new();
        for day in 3..13 {
            records.push(record(AttendanceStatus::Present, at(2024, 6, day, 7)));
        }
        records.push(record(AttendanceStatus::Present, at(2024, 5, 20, 7)));

        let rate = monthly_attendance_rate(&records, 1, 2024, 6, utc());
        assert!((rate - 50.0).abs() < f64::EPSILON);
    }

    #[test]
    fn monthly_rate_clamped_to_hundred() {
        // Duplicate rows push the numerator past the denominator.
        let mut records = Vec::new();
        for _ in 0..50 {
            records.push(record(AttendanceStatus::Present, at(2024, 6, 10, 7)));
        }
        assert_eq!(monthly_attendance_rate(&records, 1, 2024, 6, utc()), 100.0);
    }

    #[test]
    fn records_bucket_on_the_office_local_day() {
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        // 23:30 UTC on the 9th is 06:30 on the 10th in the office.
        let early_morning = record(
            AttendanceStatus::Present,
            Utc.with_ymd_and_hms(2024, 6, 9, 23, 30, 0).unwrap(),
        );
        let records = vec![early_morning];

        let june_10 = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();
        assert_eq!(records_on(&records, june_10, jakarta).len(), 1);

        let june_9 = NaiveDate::from_ymd_opt(2024, 6, 9).unwrap();
        assert!(records_on(&records, june_9, jakarta).is_empty());
        assert_eq!(records_on(&records, june_9, utc()).len(), 1);
    }

    #[test]
    fn monthly_rate_respects_the_office_offset() {
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        // 17:00 UTC May 31 is already June 1 in the office.
        let records = vec![record(
            AttendanceStatus::Present,
            Utc.with_ymd_and_hms(2024, 5, 31, 17, 0, 0).unwrap(),
        )];
        assert!(monthly_attendance_rate(&records, 1, 2024, 6, jakarta) > 0.0);
        assert_eq!(monthly_attendance_rate(&records, 1, 2024, 6, utc()), 0.0);
    }
}
