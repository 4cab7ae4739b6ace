pub mod seed;

use crate::domain::models::{
    AttendanceRecord, AttendanceStatus, Employee, JournalEntry, LeaveRequest, LeaveStatus,
    LeaveType, Role, VerificationStatus, WorkResult,
};
use anyhow::Result;
use chrono::{DateTime, NaiveDate, Utc};
use sqlx::PgPool;
use uuid::Uuid;

/// Credential row for login; the role comes from user_roles, never
/// from the profile itself.
#[derive(Debug, sqlx::FromRow)]
pub struct AuthProfile {
    pub id: Uuid,
    pub email: String,
    pub hash: String,
    pub role: Role,
    pub is_active: bool,
}

const EMPLOYEE_COLUMNS: &str = r#"
    p.id, p.full_name, p.department, p.position, r.role, p.is_active, p.joined_at
"#;

pub async fn find_auth_profile(pool: &PgPool, email: &str) -> Result<Option<AuthProfile>> {
    let profile = sqlx::query_as::<_, AuthProfile>(
        r#"
        SELECT p.id, p.email, p.hash, r.role, p.is_active
        FROM profiles p
        JOIN user_roles r ON r.employee_id = p.id
        WHERE lower(p.email) = lower($1)
        "#,
    )
    .bind(email)
    .fetch_optional(pool)
    .await?;
    Ok(profile)
}

pub async fn find_employee(pool: &PgPool, id: Uuid) -> Result<Option<Employee>> {
    let employee = sqlx::query_as::<_, Employee>(&format!(
        r#"
        SELECT {EMPLOYEE_COLUMNS}
        FROM profiles p
        JOIN user_roles r ON r.employee_id = p.id
        WHERE p.id = $1
        "#
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(employee)
}

pub async fn list_employees(pool: &PgPool, include_inactive: bool) -> Result<Vec<Employee>> {
    let filter = if include_inactive { "" } else { "WHERE p.is_active" };
    let employees = sqlx::query_as::<_, Employee>(&format!(
        r#"
        SELECT {EMPLOYEE_COLUMNS}
        FROM profiles p
        JOIN user_roles r ON r.employee_id = p.id
        {filter}
        ORDER BY p.full_name ASC
        "#
    ))
    .fetch_all(pool)
    .await?;
    Ok(employees)
}

pub async fn count_active_employees(pool: &PgPool) -> Result<i64> {
    let count: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM profiles WHERE is_active")
            .fetch_one(pool)
            .await?;
    Ok(count)
}

pub struct NewEmployee<'a> {
    pub full_name: &'a str,
    pub email: &'a str,
    pub hash: &'a str,
    pub department: Option<&'a str>,
    pub position: Option<&'a str>,
    pub role: Role,
}

/// Creates the profile and its role assignment in one transaction.
/// The role row is written exactly once here; profile updates can
/// never touch it.
pub async fn create_employee(pool: &PgPool, new: NewEmployee<'_>) -> Result<Employee> {
    let mut tx = pool.begin().await?;
    let id = Uuid::new_v4();

    sqlx::query(
        r#"
        INSERT INTO profiles (id, full_name, email, hash, department, position)
        VALUES ($1, $2, $3, $4, $5, $6)
        "#,
    )
    .bind(id)
    .bind(new.full_name)
    .bind(new.email)
    .bind(new.hash)
    .bind(new.department)
    .bind(new.position)
    .execute(&mut *tx)
    .await?;

    sqlx::query("INSERT INTO user_roles (employee_id, role) VALUES ($1, $2)")
        .bind(id)
        .bind(new.role.as_str())
        .execute(&mut *tx)
        .await?;

    tx.commit().await?;

    let employee = find_employee(pool, id)
        .await?
        .ok_or_else(|| anyhow::anyhow!("employee {id} missing after insert"))?;
    Ok(employee)
}

pub async fn update_employee_profile(
    pool: &PgPool,
    id: Uuid,
    full_name: &str,
    department: Option<&str>,
    position: Option<&str>,
) -> Result<Option<Employee>> {
    let updated = sqlx::query(
        r#"
        UPDATE profiles
        SET full_name = $2, department = $3, position = $4
        WHERE id = $1
        "#,
    )
    .bind(id)
    .bind(full_name)
    .bind(department)
    .bind(position)
    .execute(pool)
    .await?;

    if updated.rows_affected() == 0 {
        return Ok(None);
    }
    find_employee(pool, id).await
}

pub async fn set_employee_active(pool: &PgPool, id: Uuid, active: bool) -> Result<bool> {
    let updated = sqlx::query("UPDATE profiles SET is_active = $2 WHERE id = $1")
        .bind(id)
        .bind(active)
        .execute(pool)
        .await?;
    Ok(updated.rows_affected() > 0)
}

// ---------------------------------------------------------------------
// Attendance
// ---------------------------------------------------------------------

pub async fn find_open_attendance(
    pool: &PgPool,
    employee_id: Uuid,
) -> Result<Option<AttendanceRecord>> {
    let record = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, clock_in, clock_out, status, location, notes
        FROM attendance
        WHERE employee_id = $1 AND clock_out IS NULL
        "#,
    )
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

pub async fn insert_clock_in(
    pool: &PgPool,
    employee_id: Uuid,
    clock_in: DateTime<Utc>,
    status: AttendanceStatus,
    location: Option<&str>,
    notes: Option<&str>,
) -> Result<AttendanceRecord> {
    let record = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        INSERT INTO attendance (id, employee_id, clock_in, status, location, notes)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING id, employee_id, clock_in, clock_out, status, location, notes
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(employee_id)
    .bind(clock_in)
    .bind(status.as_str())
    .bind(location)
    .bind(notes)
    .fetch_one(pool)
    .await?;
    Ok(record)
}

pub async fn close_attendance(
    pool: &PgPool,
    record_id: Uuid,
    clock_out: DateTime<Utc>,
    status: AttendanceStatus,
    notes: Option<&str>,
) -> Result<Option<AttendanceRecord>> {
    let record = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        UPDATE attendance
        SET clock_out = $2, status = $3, notes = COALESCE($4, notes)
        WHERE id = $1 AND clock_out IS NULL
        RETURNING id, employee_id, clock_in, clock_out, status, location, notes
        "#,
    )
    .bind(record_id)
    .bind(clock_out)
    .bind(status.as_str())
    .bind(notes)
    .fetch_optional(pool)
    .await?;
    Ok(record)
}

/// Attendance whose clock-in falls inside [from, to], both UTC.
pub async fn list_attendance(
    pool: &PgPool,
    employee_id: Option<Uuid>,
    from: DateTime<Utc>,
    to: DateTime<Utc>,
) -> Result<Vec<AttendanceRecord>> {
    let records = sqlx::query_as::<_, AttendanceRecord>(
        r#"
        SELECT id, employee_id, clock_in, clock_out, status, location, notes
        FROM attendance
        WHERE clock_in >= $1 AND clock_in <= $2
          AND ($3::uuid IS NULL OR employee_id = $3)
        ORDER BY clock_in ASC
        "#,
    )
    .bind(from)
    .bind(to)
    .bind(employee_id)
    .fetch_all(pool)
    .await?;
    Ok(records)
}

// ---------------------------------------------------------------------
// Leave requests
// ---------------------------------------------------------------------

pub async fn insert_leave_request(
    pool: &PgPool,
    employee_id: Uuid,
    leave_type: LeaveType,
    start_date: NaiveDate,
    end_date: NaiveDate,
    reason: &str,
) -> Result<LeaveRequest> {
    let request = sqlx::query_as::<_, LeaveRequest>(
        r#"
        INSERT INTO leave_requests (id, employee_id, leave_type, start_date, end_date, reason, status)
        VALUES ($1, $2, $3, $4, $5, $6, 'pending')
        RETURNING id, employee_id, leave_type, start_date, end_date, reason, status,
                  rejection_reason, approver_id, approved_at, created_at
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(employee_id)
    .bind(leave_type.as_str())
    .bind(start_date)
    .bind(end_date)
    .bind(reason)
    .fetch_one(pool)
    .await?;
    Ok(request)
}

pub async fn find_leave_request(pool: &PgPool, id: Uuid) -> Result<Option<LeaveRequest>> {
    let request = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, employee_id, leave_type, start_date, end_date, reason, status,
               rejection_reason, approver_id, approved_at, created_at
        FROM leave_requests
        WHERE id = $1
        "#,
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(request)
}

pub async fn list_leave_requests(
    pool: &PgPool,
    employee_id: Option<Uuid>,
    status: Option<LeaveStatus>,
) -> Result<Vec<LeaveRequest>> {
    let requests = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, employee_id, leave_type, start_date, end_date, reason, status,
               rejection_reason, approver_id, approved_at, created_at
        FROM leave_requests
        WHERE ($1::uuid IS NULL OR employee_id = $1)
          AND ($2::text IS NULL OR status = $2)
        ORDER BY created_at DESC
        "#,
    )
    .bind(employee_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    Ok(requests)
}

/// Approved annual requests starting in the given calendar year, the
/// input set for the leave ledger.
pub async fn list_annual_leave_for_year(
    pool: &PgPool,
    employee_id: Uuid,
    year: i32,
) -> Result<Vec<LeaveRequest>> {
    let requests = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, employee_id, leave_type, start_date, end_date, reason, status,
               rejection_reason, approver_id, approved_at, created_at
        FROM leave_requests
        WHERE employee_id = $1
          AND status = 'approved'
          AND leave_type = 'annual'
          AND date_part('year', start_date) = $2
        ORDER BY start_date ASC
        "#,
    )
    .bind(employee_id)
    .bind(year as f64)
    .fetch_all(pool)
    .await?;
    Ok(requests)
}

/// Leave requests overlapping [from, to], for monthly report joins.
pub async fn list_leave_overlapping(
    pool: &PgPool,
    from: NaiveDate,
    to: NaiveDate,
) -> Result<Vec<LeaveRequest>> {
    let requests = sqlx::query_as::<_, LeaveRequest>(
        r#"
        SELECT id, employee_id, leave_type, start_date, end_date, reason, status,
               rejection_reason, approver_id, approved_at, created_at
        FROM leave_requests
        WHERE start_date <= $2 AND end_date >= $1
        ORDER BY start_date ASC
        "#,
    )
    .bind(from)
    .bind(to)
    .fetch_all(pool)
    .await?;
    Ok(requests)
}

/// Moves a pending request to approved or rejected. Cancellation goes
/// through `cancel_leave_request`; this guard keeps decided requests
/// decided.
pub async fn decide_leave_request(
    pool: &PgPool,
    id: Uuid,
    status: LeaveStatus,
    approver_id: Uuid,
    rejection_reason: Option<&str>,
) -> Result<Option<LeaveRequest>> {
    let request = sqlx::query_as::<_, LeaveRequest>(
        r#"
        UPDATE leave_requests
        SET status = $2, approver_id = $3, approved_at = NOW(), rejection_reason = $4
        WHERE id = $1 AND status = 'pending'
        RETURNING id, employee_id, leave_type, start_date, end_date, reason, status,
                  rejection_reason, approver_id, approved_at, created_at
        "#,
    )
    .bind(id)
    .bind(status.as_str())
    .bind(approver_id)
    .bind(rejection_reason)
    .fetch_optional(pool)
    .await?;
    Ok(request)
}

/// Soft cancel: the row stays, the status flips. Only pending requests
/// can be withdrawn.
pub async fn cancel_leave_request(
    pool: &PgPool,
    id: Uuid,
    employee_id: Uuid,
) -> Result<Option<LeaveRequest>> {
    let request = sqlx::query_as::<_, LeaveRequest>(
        r#"
        UPDATE leave_requests
        SET status = 'cancelled'
        WHERE id = $1 AND employee_id = $2 AND status = 'pending'
        RETURNING id, employee_id, leave_type, start_date, end_date, reason, status,
                  rejection_reason, approver_id, approved_at, created_at
        "#,
    )
    .bind(id)
    .bind(employee_id)
    .fetch_optional(pool)
    .await?;
    Ok(request)
}

// ---------------------------------------------------------------------
// Work journals
// ---------------------------------------------------------------------

const JOURNAL_COLUMNS: &str = r#"
    id, employee_id, activity_date, content, work_result, obstacles, mood,
    duration_minutes, verification_status, manager_notes, created_at, updated_at
"#;

pub struct NewJournalEntry<'a> {
    pub employee_id: Uuid,
    pub activity_date: NaiveDate,
    pub content: &'a str,
    pub work_result: WorkResult,
    pub obstacles: Option<&'a str>,
    pub mood: Option<&'a str>,
    pub duration_minutes: i32,
    pub verification_status: VerificationStatus,
}

pub async fn insert_journal(pool: &PgPool, new: NewJournalEntry<'_>) -> Result<JournalEntry> {
    let entry = sqlx::query_as::<_, JournalEntry>(&format!(
        r#"
        INSERT INTO work_journals
            (id, employee_id, activity_date, content, work_result, obstacles, mood,
             duration_minutes, verification_status)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)
        RETURNING {JOURNAL_COLUMNS}
        "#
    ))
    .bind(Uuid::new_v4())
    .bind(new.employee_id)
    .bind(new.activity_date)
    .bind(new.content)
    .bind(new.work_result.as_str())
    .bind(new.obstacles)
    .bind(new.mood)
    .bind(new.duration_minutes)
    .bind(new.verification_status.as_str())
    .fetch_one(pool)
    .await?;
    Ok(entry)
}

pub async fn find_journal(pool: &PgPool, id: Uuid) -> Result<Option<JournalEntry>> {
    let entry = sqlx::query_as::<_, JournalEntry>(&format!(
        "SELECT {JOURNAL_COLUMNS} FROM work_journals WHERE id = $1"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(entry)
}

/// The one-entry-per-day collision probe used before insert.
pub async fn find_journal_for_day(
    pool: &PgPool,
    employee_id: Uuid,
    activity_date: NaiveDate,
) -> Result<Option<JournalEntry>> {
    let entry = sqlx::query_as::<_, JournalEntry>(&format!(
        r#"
        SELECT {JOURNAL_COLUMNS}
        FROM work_journals
        WHERE employee_id = $1 AND activity_date = $2
        "#
    ))
    .bind(employee_id)
    .bind(activity_date)
    .fetch_optional(pool)
    .await?;
    Ok(entry)
}

pub async fn list_journals(
    pool: &PgPool,
    employee_id: Option<Uuid>,
    status: Option<VerificationStatus>,
) -> Result<Vec<JournalEntry>> {
    let entries = sqlx::query_as::<_, JournalEntry>(&format!(
        r#"
        SELECT {JOURNAL_COLUMNS}
        FROM work_journals
        WHERE ($1::uuid IS NULL OR employee_id = $1)
          AND ($2::text IS NULL OR verification_status = $2)
        ORDER BY activity_date DESC
        "#
    ))
    .bind(employee_id)
    .bind(status.map(|s| s.as_str()))
    .fetch_all(pool)
    .await?;
    Ok(entries)
}

pub async fn update_journal_content(
    pool: &PgPool,
    id: Uuid,
    content: &str,
    work_result: WorkResult,
    obstacles: Option<&str>,
    mood: Option<&str>,
    duration_minutes: i32,
) -> Result<Option<JournalEntry>> {
    let entry = sqlx::query_as::<_, JournalEntry>(&format!(
        r#"
        UPDATE work_journals
        SET content = $2, work_result = $3, obstacles = $4, mood = $5,
            duration_minutes = $6, updated_at = NOW()
        WHERE id = $1
        RETURNING {JOURNAL_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(content)
    .bind(work_result.as_str())
    .bind(obstacles)
    .bind(mood)
    .bind(duration_minutes)
    .fetch_optional(pool)
    .await?;
    Ok(entry)
}

pub async fn update_journal_status(
    pool: &PgPool,
    id: Uuid,
    status: VerificationStatus,
    manager_notes: Option<&str>,
) -> Result<Option<JournalEntry>> {
    let entry = sqlx::query_as::<_, JournalEntry>(&format!(
        r#"
        UPDATE work_journals
        SET verification_status = $2, manager_notes = COALESCE($3, manager_notes),
            updated_at = NOW()
        WHERE id = $1
        RETURNING {JOURNAL_COLUMNS}
        "#
    ))
    .bind(id)
    .bind(status.as_str())
    .bind(manager_notes)
    .fetch_optional(pool)
    .await?;
    Ok(entry)
}

/// Hard delete. Journals are the one place the product removes rows
/// outright instead of soft-cancelling; callers gate this on the
/// workflow permission table.
pub async fn delete_journal(pool: &PgPool, id: Uuid) -> Result<bool> {
    let deleted = sqlx::query("DELETE FROM work_journals WHERE id = $1")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(deleted.rows_affected() > 0)
}
