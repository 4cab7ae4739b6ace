use crate::db;
use crate::domain::classifier::{self, DayClassification};
use crate::domain::models::{AttendanceRecord, AttendanceStatus};
use crate::state::SharedState;
use crate::web::session::AuthSession;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{DateTime, Datelike, Duration, FixedOffset, NaiveDate, TimeZone, Utc};
use serde::{Deserialize, Serialize};

#[derive(Deserialize)]
pub struct ClockInRequest {
    pub location: Option<String>,
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct ClockOutRequest {
    pub notes: Option<String>,
}

#[derive(Deserialize)]
pub struct RangeQuery {
    pub from: Option<NaiveDate>,
    pub to: Option<NaiveDate>,
}

#[derive(Serialize)]
pub struct DayView {
    pub date: NaiveDate,
    pub counts: DayClassification,
    pub records: Vec<AttendanceRecord>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/clock-in", post(clock_in))
        .route("/clock-out", post(clock_out))
        .route("/me", get(my_attendance))
        .route("/day/:date", get(day_view))
        .with_state(state)
}

/// UTC bounds of one office-local calendar day.
pub fn day_bounds_utc(date: NaiveDate, offset: FixedOffset) -> (DateTime<Utc>, DateTime<Utc>) {
    let start = offset
        .from_local_datetime(&date.and_hms_opt(0, 0, 0).unwrap())
        .unwrap()
        .with_timezone(&Utc);
    (start, start + Duration::days(1) - Duration::seconds(1))
}

async fn clock_in(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Json(payload): Json<ClockInRequest>,
) -> Result<Json<AttendanceRecord>, StatusCode> {
    let now = Utc::now();
    let local = now.with_timezone(&state.settings.work_offset);

    if !state.settings.clock_in_window.contains(local.time()) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let open = db::find_open_attendance(&state.pool, claims.employee_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if open.is_some() {
        // One open record per employee; the partial unique index backs
        // this up if two requests race past the probe.
        return Err(StatusCode::CONFLICT);
    }

    let status = if local.time() > state.settings.late_after {
        AttendanceStatus::Late
    } else {
        AttendanceStatus::Present
    };

    let record = db::insert_clock_in(
        &state.pool,
        claims.employee_id,
        now,
        status,
        payload.location.as_deref(),
        payload.notes.as_deref(),
    )
    .await
    .map_err(|e| {
        tracing::error!("clock-in insert failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    tracing::info!(
        "employee {} clocked in as {}",
        claims.employee_id,
        status.as_str()
    );
    Ok(Json(record))
}

async fn clock_out(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Json(payload): Json<ClockOutRequest>,
) -> Result<Json<AttendanceRecord>, StatusCode> {
    let open = db::find_open_attendance(&state.pool, claims.employee_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::CONFLICT)?;

    let now = Utc::now();
    let local = now.with_timezone(&state.settings.work_offset);

    // Leaving before the clock-out window opens downgrades the day,
    // unless it was already marked late.
    let status = if local.time() < state.settings.clock_out_window.start
        && open.status != AttendanceStatus::Late
    {
        AttendanceStatus::EarlyLeave
    } else {
        open.status
    };

    let record = db::close_attendance(&state.pool, open.id, now, status, payload.notes.as_deref())
        .await
        .map_err(|e| {
            tracing::error!("clock-out update failed: {}", e);
            StatusCode::INTERNAL_SERVER_ERROR
        })?
        .ok_or(StatusCode::CONFLICT)?;

    Ok(Json(record))
}

async fn my_attendance(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Query(range): Query<RangeQuery>,
) -> Result<Json<Vec<AttendanceRecord>>, StatusCode> {
    let today = Utc::now()
        .with_timezone(&state.settings.work_offset)
        .date_naive();
    let from = range.from.unwrap_or_else(|| today.with_day0(0).unwrap_or(today));
    let to = range.to.unwrap_or(today);
    if to < from {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let (start, _) = day_bounds_utc(from, state.settings.work_offset);
    let (_, end) = day_bounds_utc(to, state.settings.work_offset);

    let records = db::list_attendance(&state.pool, Some(claims.employee_id), start, end)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(records))
}

async fn day_view(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(date): Path<NaiveDate>,
) -> Result<Json<DayView>, StatusCode> {
    if !claims.role.is_reviewer() {
        return Err(StatusCode::FORBIDDEN);
    }

    let (start, end) = day_bounds_utc(date, state.settings.work_offset);
    let records = db::list_attendance(&state.pool, None, start, end)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let headcount = db::count_active_employees(&state.pool)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    let counts = classifier::classify_day(&records, headcount.max(0) as usize);
    Ok(Json(DayView {
        date,
        counts,
        records,
    }))
}
