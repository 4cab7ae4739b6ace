use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum Role {
    Admin,
    Manager,
    Employee,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Admin => "admin",
            Role::Manager => "manager",
            Role::Employee => "employee",
        }
    }

    /// Managers and admins review journals and leave requests; the
    /// capability is shared so both are "reviewers" everywhere below.
    pub fn is_reviewer(&self) -> bool {
        matches!(self, Role::Admin | Role::Manager)
    }
}

impl TryFrom<&str> for Role {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "admin" => Ok(Role::Admin),
            "manager" => Ok(Role::Manager),
            "employee" => Ok(Role::Employee),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct Employee {
    pub id: Uuid,
    pub full_name: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub role: Role,
    pub is_active: bool,
    pub joined_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum AttendanceStatus {
    Present,
    Late,
    EarlyLeave,
}

impl AttendanceStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            AttendanceStatus::Present => "present",
            AttendanceStatus::Late => "late",
            AttendanceStatus::EarlyLeave => "early_leave",
        }
    }
}

impl TryFrom<&str> for AttendanceStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "present" => Ok(AttendanceStatus::Present),
            "late" => Ok(AttendanceStatus::Late),
            "early_leave" | "early-leave" => Ok(AttendanceStatus::EarlyLeave),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub clock_in: DateTime<Utc>,
    pub clock_out: Option<DateTime<Utc>>,
    pub status: AttendanceStatus,
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum LeaveType {
    Annual,
    Sick,
    Permission,
}

impl LeaveType {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveType::Annual => "annual",
            LeaveType::Sick => "sick",
            LeaveType::Permission => "permission",
        }
    }
}

impl TryFrom<&str> for LeaveType {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "annual" => Ok(LeaveType::Annual),
            "sick" => Ok(LeaveType::Sick),
            "permission" => Ok(LeaveType::Permission),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum LeaveStatus {
    Pending,
    Approved,
    Rejected,
    Cancelled,
}

impl LeaveStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            LeaveStatus::Pending => "pending",
            LeaveStatus::Approved => "approved",
            LeaveStatus::Rejected => "rejected",
            LeaveStatus::Cancelled => "cancelled",
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct LeaveRequest {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub leave_type: LeaveType,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
    pub status: LeaveStatus,
    pub rejection_reason: Option<String>,
    pub approver_id: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum WorkResult {
    Completed,
    InProgress,
    Pending,
}

impl WorkResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            WorkResult::Completed => "completed",
            WorkResult::InProgress => "in_progress",
            WorkResult::Pending => "pending",
        }
    }
}

impl TryFrom<&str> for WorkResult {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "completed" | "done" => Ok(WorkResult::Completed),
            "in_progress" | "in-progress" | "inprogress" => Ok(WorkResult::InProgress),
            "pending" => Ok(WorkResult::Pending),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, sqlx::Type)]
#[serde(rename_all = "snake_case")]
#[sqlx(rename_all = "snake_case")]
pub enum VerificationStatus {
    Draft,
    Submitted,
    Read,
    NeedRevision,
    Approved,
}

impl VerificationStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            VerificationStatus::Draft => "draft",
            VerificationStatus::Submitted => "submitted",
            VerificationStatus::Read => "read",
            VerificationStatus::NeedRevision => "need_revision",
            VerificationStatus::Approved => "approved",
        }
    }
}

impl TryFrom<&str> for VerificationStatus {
    type Error = ();

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value.trim().to_lowercase().as_str() {
            "draft" => Ok(VerificationStatus::Draft),
            "submitted" => Ok(VerificationStatus::Submitted),
            "read" => Ok(VerificationStatus::Read),
            "need_revision" | "need-revision" => Ok(VerificationStatus::NeedRevision),
            "approved" => Ok(VerificationStatus::Approved),
            _ => Err(()),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, sqlx::FromRow)]
pub struct JournalEntry {
    pub id: Uuid,
    pub employee_id: Uuid,
    pub activity_date: NaiveDate,
    pub content: String,
    pub work_result: WorkResult,
    pub obstacles: Option<String>,
    pub mood: Option<String>,
    pub duration_minutes: i32,
    pub verification_status: VerificationStatus,
    pub manager_notes: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl JournalEntry {
    /// An entry written more than a day after the work it describes.
    /// Derived annotation only, never stored.
    pub fn is_backdated(&self) -> bool {
        (self.created_at.date_naive() - self.activity_date).num_days() > 1
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    fn entry_with_dates(activity: NaiveDate, created: DateTime<Utc>) -> JournalEntry {
        JournalEntry {
            id: Uuid::new_v4(),
            employee_id: Uuid::new_v4(),
            activity_date: activity,
            content: "daily report content".to_string(),
            work_result: WorkResult::Completed,
            obstacles: None,
            mood: None,
            duration_minutes: 480,
            verification_status: VerificationStatus::Draft,
            manager_notes: None,
            created_at: created,
            updated_at: created,
        }
    }

    #[test]
    fn backdated_only_after_one_full_day() {
        let activity = NaiveDate::from_ymd_opt(2024, 6, 10).unwrap();

        let same_day = Utc.with_ymd_and_hms(2024, 6, 10, 18, 0, 0).unwrap();
        assert!(!entry_with_dates(activity, same_day).is_backdated());

        let next_day = Utc.with_ymd_and_hms(2024, 6, 11, 9, 0, 0).unwrap();
        assert!(!entry_with_dates(activity, next_day).is_backdated());

        let two_days_later = Utc.with_ymd_and_hms(2024, 6, 12, 9, 0, 0).unwrap();
        assert!(entry_with_dates(activity, two_days_later).is_backdated());
    }

    #[test]
    fn role_parses_case_insensitively() {
        assert_eq!(Role::try_from("Manager"), Ok(Role::Manager));
        assert_eq!(Role::try_from(" admin "), Ok(Role::Admin));
        assert!(Role::try_from("supervisor").is_err());
    }

    #[test]
    fn verification_status_round_trips_through_str() {
        for status in [
            VerificationStatus::Draft,
            VerificationStatus::Submitted,
            VerificationStatus::Read,
            VerificationStatus::NeedRevision,
            VerificationStatus::Approved,
        ] {
            assert_eq!(VerificationStatus::try_from(status.as_str()), Ok(status));
        }
    }
}
