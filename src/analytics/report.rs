use crate::domain::classifier::local_day;
use crate::domain::models::{
    AttendanceRecord, AttendanceStatus, Employee, LeaveRequest, LeaveStatus,
};
use chrono::{Datelike, FixedOffset, NaiveDate};
use serde::Serialize;

/// One line of the per-employee monthly report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReportRow {
    pub employee_id: uuid::Uuid,
    pub name: String,
    pub department: Option<String>,
    pub total_attendance: usize,
    pub on_time: usize,
    pub late: usize,
    pub leave_days: i64,
}

fn last_day_of_month(year: i32, month: u32) -> Option<NaiveDate> {
    let first = NaiveDate::from_ymd_opt(year, month, 1)?;
    let next_month = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)?
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)?
    };
    next_month.pred_opt().filter(|d| *d >= first)
}

fn zero_row(employee: &Employee) -> ReportRow {
    ReportRow {
        employee_id: employee.id,
        name: employee.full_name.clone(),
        department: employee.department.clone(),
        total_attendance: 0,
        on_time: 0,
        late: 0,
        leave_days: 0,
    }
}

/// Joins attendance counts and approved leave days for one employee and
/// month.
///
/// Months that ended before attendance tracking began produce an
/// all-zero row instead of a query for data that was never recorded.
/// Approved leave spans are clipped to the month so a request crossing
/// a month boundary only contributes the days that fall inside it.
pub fn employee_report_row(
    employee: &Employee,
    records: &[AttendanceRecord],
    leave_requests: &[LeaveRequest],
    year: i32,
    month: u32,
    tracking_start: NaiveDate,
    offset: FixedOffset,
) -> ReportRow {
    let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return zero_row(employee);
    };
    let Some(month_end) = last_day_of_month(year, month) else {
        return zero_row(employee);
    };
    if month_end < tracking_start {
        return zero_row(employee);
    }

    let mut total = 0;
    let mut late = 0;
    let mut early_leave = 0;
    for record in records {
        if record.employee_id != employee.id {
            continue;
        }
        let day = local_day(record.clock_in, offset);
        if day.year() != year || day.month() != month {
            continue;
        }
        total += 1;
        match record.status {
            AttendanceStatus::Late => late += 1,
            AttendanceStatus::EarlyLeave => early_leave += 1,
            AttendanceStatus::Present => {}
        }
    }

    let leave_days: i64 = leave_requests
        .iter()
        .filter(|r| r.employee_id == employee.id && r.status == LeaveStatus::Approved)
        .map(|r| {
            let start = r.start_date.max(month_start);
            let end = r.end_date.min(month_end);
            if end < start {
                0
            } else {
                (end - start).num_days() + 1
            }
        })
        .sum();

    ReportRow {
        employee_id: employee.id,
        name: employee.full_name.clone(),
        department: employee.department.clone(),
        total_attendance: total,
        on_time: total.saturating_sub(late).saturating_sub(early_leave),
        late,
        leave_days,
    }
}
