use crate::domain::classifier::{classify_day, records_on};
use crate::domain::models::{AttendanceRecord, Employee};
use chrono::{Datelike, Duration, FixedOffset, NaiveDate, Weekday};
use serde::Serialize;

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DayTrendPoint {
    pub day: NaiveDate,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct WindowTrendPoint {
    pub label: String,
    pub start: NaiveDate,
    pub end: NaiveDate,
    pub present: usize,
    pub late: usize,
    pub absent: usize,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DepartmentCount {
    pub department: String,
    pub count: usize,
}

fn is_weekend(day: NaiveDate) -> bool {
    matches!(day.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Trailing 7-day attendance series ending on `end_date`, oldest first.
/// Days are office-local days, shifted by `offset`.
///
/// Output ordering and length do not depend on the input ordering.
/// Weekend rows keep their recorded presences but report zero absences,
/// non-working days are not counted against anyone.
pub fn weekly_trend(
    records: &[AttendanceRecord],
    employee_count: usize,
    end_date: NaiveDate,
    offset: FixedOffset,
) -> Vec<DayTrendPoint> {
    (0..7)
        .rev()
        .map(|back| {
            let day = end_date - Duration::days(back);
            let on_day = records_on(records, day, offset);
            let counts = classify_day(&on_day, employee_count);
            DayTrendPoint {
                day,
                present: counts.present,
                late: counts.late,
                absent: if is_weekend(day) { 0 } else { counts.absent },
            }
        })
        .collect()
}

/// Four fixed 7-day windows of the month, counted per day and summed.
///
/// Windows start from the 1st regardless of weekday; a window that has
/// not started yet (relative to `today`) is left out, so dashboards
/// early in the month show only the elapsed part. Days past the 28th
/// fall outside the four-bucket presentation.
pub fn monthly_trend(
    records: &[AttendanceRecord],
    employee_count: usize,
    year: i32,
    month: u32,
    today: NaiveDate,
    offset: FixedOffset,
) -> Vec<WindowTrendPoint> {
    let mut windows = Vec::new();
    for idx in 0..4u32 {
        let Some(start) = NaiveDate::from_ymd_opt(year, month, idx * 7 + 1) else {
            break;
        };
        if start > today {
            break;
        }
        let end = start + Duration::days(6);

        let mut present = 0;
        let mut late = 0;
        let mut absent = 0;
        let mut day = start;
        while day <= end && day.month() == month {
            let on_day = records_on(records, day, offset);
            let counts = classify_day(&on_day, employee_count);
            present += counts.present;
            late += counts.late;
            if !is_weekend(day) && day <= today {
                absent += counts.absent;
            }
            day += Duration::days(1);
        }

        windows.push(WindowTrendPoint {
            label: format!("Week {}", idx + 1),
            start,
            end,
            present,
            late,
            absent,
        });
    }
    windows
}

/// Headcount per department, sorted by name for stable output. Blank
/// departments collapse into an `unassigned` bucket the caller may
/// drop.
pub fn department_distribution(employees: &[Employee]) -> Vec<DepartmentCount> {
    let mut counts: std::collections::BTreeMap<String, usize> = std::collections::BTreeMap::new();
    for employee in employees {
        let department = employee
            .department
            .as_deref()
            .map(str::trim)
            .filter(|d| !d.is_empty())
            .unwrap_or("unassigned");
        *counts.entry(department.to_string()).or_default() += 1;
    }
    counts
        .into_iter()
        .map(|(department, count)| DepartmentCount { department, count })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::{AttendanceStatus, Role};
    use chrono::{TimeZone, Utc};
    use uuid::Uuid;

    fn record_on(day: NaiveDate, status: AttendanceStatus) -> AttendanceRecord {
        let clock_in = Utc
            .with_ymd_and_hms(day.year(), day.month(), day.day(), 8, 0, 0)
            .unwrap();
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

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn utc() -> FixedOffset {
        FixedOffset::east_opt(0).unwrap()
    }

    #[test]
    fn weekly_trend_is_seven_days_oldest_first() {
        // Records deliberately supplied newest-first.
        let end = date(2024, 6, 14); // a Friday
        let records = vec![
            record_on(date(2024, 6, 14), AttendanceStatus::Present),
            record_on(date(2024, 6, 10), AttendanceStatus::Late),
            record_on(date(2024, 6, 8), AttendanceStatus::Present),
        ];

        let trend = weekly_trend(&records, 5, end, utc());
        assert_eq!(trend.len(), 7);
        assert_eq!(trend[0].day, date(2024, 6, 8));
        assert_eq!(trend[6].day, end);
        for pair in trend.windows(2) {
            assert!(pair[0].day < pair[1].day);
        }

        // Monday the 10th: one late arrival out of five people.
        assert_eq!(trend[2].present, 1);
        assert_eq!(trend[2].late, 1);
        assert_eq!(trend[2].absent, 4);
    }

    #[test]
    fn weekend_days_report_zero_absent() {
        let end = date(2024, 6, 14);
        let trend = weekly_trend(&[], 5, end, utc());

        // June 8 and 9, 2024 are Saturday and Sunday.
        assert_eq!(trend[0].day, date(2024, 6, 8));
        assert_eq!(trend[0].absent, 0);
        assert_eq!(trend[1].absent, 0);
        // Weekdays still count the full headcount as absent.
        assert_eq!(trend[2].absent, 5);
    }

    #[test]
    fn weekly_trend_ignores_input_order() {
        let end = date(2024, 6, 14);
        let a = vec![
            record_on(date(2024, 6, 12), AttendanceStatus::Present),
            record_on(date(2024, 6, 13), AttendanceStatus::Late),
        ];
        let mut b = a.clone();
        b.reverse();
        assert_eq!(
            weekly_trend(&a, 3, end, utc()),
            weekly_trend(&b, 3, end, utc())
        );
    }

    #[test]
    fn weekly_trend_buckets_by_office_local_day() {
        let jakarta = FixedOffset::east_opt(7 * 3600).unwrap();
        // 23:30 UTC Sunday June 9 is 06:30 Monday June 10 in the
        // office; the presence belongs to Monday, not Sunday.
        let records = vec![AttendanceRecord {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            clock_in: Utc.with_ymd_and_hms(2024, 6, 9, 23, 30, 0).unwrap(),
            clock_out: None,
            status: AttendanceStatus::Present,
            location: None,
            notes: None,
        }];

        let trend = weekly_trend(&records, 1, date(2024, 6, 14), jakarta);
        let monday = trend.iter().find(|p| p.day == date(2024, 6, 10)).unwrap();
        assert_eq!(monday.present, 1);
        assert_eq!(monday.absent, 0);
        let sunday = trend.iter().find(|p| p.day == date(2024, 6, 9)).unwrap();
        assert_eq!(sunday.present, 0);
    }

    #[test]
    fn monthly_trend_excludes_future_windows() {
        let today = date(2024, 6, 9);
        let records = vec![record_on(date(2024, 6, 3), AttendanceStatus::Present)];
        let windows = monthly_trend(&records, 4, 2024, 6, today, utc());

        // Windows starting on the 15th and 22nd have not begun yet.
        assert_eq!(windows.len(), 2);
        assert_eq!(windows[0].label, "Week 1");
        assert_eq!(windows[0].present, 1);
        assert_eq!(windows[1].start, date(2024, 6, 8));
    }

    #[test]
    fn monthly_trend_does_not_count_future_days_absent() {
        // Mid-window today: only elapsed weekdays accrue absences.
        let today = date(2024, 6, 4); // Tuesday in window 1
        let windows = monthly_trend(&[], 2, 2024, 6, today, utc());
        assert_eq!(windows.len(), 1);
        // June 1-2 are weekend; June 3 and 4 are the only elapsed
        // weekdays, two employees each.
        assert_eq!(windows[0].absent, 4);
    }

    #[test]
    fn department_distribution_buckets_blanks() {
        let mk = |department: Option<&str>| Employee {
            id: Uuid::new_v4(),
            full_name: "Someone".to_string(),
            department: department.map(String::from),
            position: None,
            role: Role::Employee,
            is_active: true,
            joined_at: Utc::now(),
        };
        let employees = vec![
            mk(Some("Engineering")),
            mk(Some("Engineering")),
            mk(Some("  ")),
            mk(None),
            mk(Some("Finance")),
        ];

        let distribution = department_distribution(&employees);
        assert_eq!(
            distribution,
            vec![
                DepartmentCount { department: "Engineering".into(), count: 2 },
                DepartmentCount { department: "Finance".into(), count: 1 },
                DepartmentCount { department: "unassigned".into(), count: 2 },
            ]
        );
    }
}
