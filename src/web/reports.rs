use crate::analytics::report::{self, ReportRow};
use crate::db;
use crate::state::SharedState;
use crate::web::attendance::day_bounds_utc;
use crate::web::session::AuthSession;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::NaiveDate;

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/monthly/:year/:month", get(monthly_report))
        .with_state(state)
}

/// Per-employee rows for the month, one row per active employee even
/// when they have no data. Months that predate attendance tracking
/// come back all-zero, so exports stay shaped the same.
async fn monthly_report(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<Vec<ReportRow>>, StatusCode> {
    if !claims.role.is_reviewer() {
        return Err(StatusCode::FORBIDDEN);
    }

    let Some(month_start) = NaiveDate::from_ymd_opt(year, month, 1) else {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    };
    let month_end = if month == 12 {
        NaiveDate::from_ymd_opt(year + 1, 1, 1)
    } else {
        NaiveDate::from_ymd_opt(year, month + 1, 1)
    }
    .and_then(|d| d.pred_opt())
    .ok_or(StatusCode::UNPROCESSABLE_ENTITY)?;

    let employees = db::list_employees(&state.pool, false)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    // A failed fetch of either input degrades that column to zeros
    // rather than failing the whole report.
    let (start, _) = day_bounds_utc(month_start, state.settings.work_offset);
    let (_, end) = day_bounds_utc(month_end, state.settings.work_offset);
    let records = db::list_attendance(&state.pool, None, start, end)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("report attendance fetch failed, degrading to zeros: {}", e);
            Vec::new()
        });
    let leave = db::list_leave_overlapping(&state.pool, month_start, month_end)
        .await
        .unwrap_or_else(|e| {
            tracing::warn!("report leave fetch failed, degrading to zeros: {}", e);
            Vec::new()
        });

    let rows = employees
        .iter()
        .map(|employee| {
            report::employee_report_row(
                employee,
                &records,
                &leave,
                year,
                month,
                state.settings.attendance_tracking_start,
                state.settings.work_offset,
            )
        })
        .collect();

    Ok(Json(rows))
}
