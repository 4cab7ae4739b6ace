use crate::domain::models::{LeaveRequest, LeaveStatus, LeaveType};
use chrono::{Datelike, NaiveDate};
use serde::Serialize;

#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum LeaveError {
    #[error("end date precedes start date")]
    DatesReversed,
    #[error("reason must not be empty")]
    EmptyReason,
}

/// Annual-quota balance for one employee and calendar year.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct LeaveBalance {
    pub used: i64,
    pub remaining: i64,
}

/// Inclusive span in days: a single-day request counts as 1.
pub fn day_span(start: NaiveDate, end: NaiveDate) -> i64 {
    (end - start).num_days() + 1
}

pub fn validate_request(start: NaiveDate, end: NaiveDate, reason: &str) -> Result<(), LeaveError> {
    if end < start {
        return Err(LeaveError::DatesReversed);
    }
    if reason.trim().is_empty() {
        return Err(LeaveError::EmptyReason);
    }
    Ok(())
}

/// Quota consumption for a calendar year.
///
/// Only approved annual requests count; sick and permission leave never
/// touch the quota. Overlapping approved spans are summed as-is, the
/// approval flow is expected to prevent them. Remaining is clamped so
/// over-consumption reads as zero, not a negative balance.
pub fn leave_ledger(requests: &[LeaveRequest], quota: i64, year: i32) -> LeaveBalance {
    let used: i64 = requests
        .iter()
        .filter(|r| {
            r.status == LeaveStatus::Approved
                && r.leave_type == LeaveType::Annual
                && r.start_date.year() == year
        })
        .map(|r| day_span(r.start_date, r.end_date).max(0))
        .sum();

    LeaveBalance {
        used,
        remaining: (quota - used).max(0),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use uuid::Uuid;

    fn date(y: i32, m: u32, d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(y, m, d).unwrap()
    }

    fn request(
        leave_type: LeaveType,
        status: LeaveStatus,
        start: NaiveDate,
        end: NaiveDate,
    ) -> LeaveRequest {
        LeaveRequest {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            leave_type,
            start_date: start,
            end_date: end,
            reason: "family matters".to_string(),
            status,
            rejection_reason: None,
            approver_id: None,
            approved_at: None,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn single_day_span_is_one() {
        let d = date(2024, 6, 10);
        assert_eq!(day_span(d, d), 1);
    }

    #[test]
    fn quota_untouched_without_approved_requests() {
        let requests = vec![request(
            LeaveType::Annual,
            LeaveStatus::Pending,
            date(2024, 6, 10),
            date(2024, 6, 12),
        )];
        let balance = leave_ledger(&requests, 12, 2024);
        assert_eq!(balance.used, 0);
        assert_eq!(balance.remaining, 12);
    }

    #[test]
    fn three_day_request_against_twelve_day_quota() {
        let requests = vec![request(
            LeaveType::Annual,
            LeaveStatus::Approved,
            date(2024, 6, 10),
            date(2024, 6, 12),
        )];
        let balance = leave_ledger(&requests, 12, 2024);
        assert_eq!(balance, LeaveBalance { used: 3, remaining: 9 });
    }

    #[test]
    fn sick_and_permission_leave_do_not_consume_quota() {
        let requests = vec![
            request(
                LeaveType::Sick,
                LeaveStatus::Approved,
                date(2024, 3, 1),
                date(2024, 3, 5),
            ),
            request(
                LeaveType::Permission,
                LeaveStatus::Approved,
                date(2024, 4, 1),
                date(2024, 4, 1),
            ),
        ];
        assert_eq!(leave_ledger(&requests, 12, 2024).remaining, 12);
    }

    #[test]
    fn other_years_are_ignored() {
        let requests = vec![request(
            LeaveType::Annual,
            LeaveStatus::Approved,
            date(2023, 12, 28),
            date(2023, 12, 29),
        )];
        assert_eq!(leave_ledger(&requests, 12, 2024).used, 0);
    }

    #[test]
    fn remaining_clamps_at_zero() {
        let requests = vec![request(
            LeaveType::Annual,
            LeaveStatus::Approved,
            date(2024, 6, 1),
            date(2024, 6, 20),
        )];
        let balance = leave_ledger(&requests, 12, 2024);
        assert_eq!(balance.used, 20);
        assert_eq!(balance.remaining, 0);
    }

    #[test]
    fn reversed_dates_rejected() {
        assert_eq!(
            validate_request(date(2024, 6, 12), date(2024, 6, 10), "trip"),
            Err(LeaveError::DatesReversed)
        );
        assert_eq!(
            validate_request(date(2024, 6, 10), date(2024, 6, 12), "  "),
            Err(LeaveError::EmptyReason)
        );
        assert!(validate_request(date(2024, 6, 10), date(2024, 6, 12), "trip").is_ok());
    }
}
