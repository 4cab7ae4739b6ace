use crate::analytics::trend::{self, DayTrendPoint, DepartmentCount, WindowTrendPoint};
use crate::db;
use crate::domain::classifier::{self, DayClassification};
use crate::state::SharedState;
use crate::web::attendance::day_bounds_utc;
use crate::web::session::AuthSession;
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::get,
    Json, Router,
};
use chrono::{Datelike, Duration, NaiveDate, Utc};
use serde::Serialize;

#[derive(Serialize)]
pub struct TodaySummary {
    pub date: NaiveDate,
    pub headcount: usize,
    pub counts: DayClassification,
}

#[derive(Serialize)]
pub struct MonthlyRate {
    pub year: i32,
    pub month: u32,
    pub rate: f64,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/today", get(today_summary))
        .route("/weekly", get(weekly))
        .route("/monthly", get(monthly))
        .route("/departments", get(departments))
        .route("/rate/:year/:month", get(monthly_rate))
        .with_state(state)
}

fn local_today(state: &SharedState) -> NaiveDate {
    Utc::now()
        .with_timezone(&state.settings.work_offset)
        .date_naive()
}

async fn headcount(state: &SharedState) -> Result<usize, StatusCode> {
    let count = db::count_active_employees(&state.pool)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(count.max(0) as usize)
}

async fn today_summary(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
) -> Result<Json<TodaySummary>, StatusCode> {
    if !claims.role.is_reviewer() {
        return Err(StatusCode::FORBIDDEN);
    }

    let date = local_today(&state);
    let (start, end) = day_bounds_utc(date, state.settings.work_offset);
    let records = db::list_attendance(&state.pool, None, start, end)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let headcount = headcount(&state).await?;

    Ok(Json(TodaySummary {
        date,
        headcount,
        counts: classifier::classify_day(&records, headcount),
    }))
}

async fn weekly(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
) -> Result<Json<Vec<DayTrendPoint>>, StatusCode> {
    if !claims.role.is_reviewer() {
        return Err(StatusCode::FORBIDDEN);
    }

    let today = local_today(&state);
    let (start, _) = day_bounds_utc(today - Duration::days(6), state.settings.work_offset);
    let (_, end) = day_bounds_utc(today, state.settings.work_offset);

    let records = db::list_attendance(&state.pool, None, start, end)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let headcount = headcount(&state).await?;

    Ok(Json(trend::weekly_trend(
        &records,
        headcount,
        today,
        state.settings.work_offset,
    )))
}

async fn monthly(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
) -> Result<Json<Vec<WindowTrendPoint>>, StatusCode> {
    if !claims.role.is_reviewer() {
        return Err(StatusCode::FORBIDDEN);
    }

    let today = local_today(&state);
    let month_start = today.with_day(1).unwrap_or(today);
    let (start, _) = day_bounds_utc(month_start, state.settings.work_offset);
    let (_, end) = day_bounds_utc(today, state.settings.work_offset);

    let records = db::list_attendance(&state.pool, None, start, end)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let headcount = headcount(&state).await?;

    Ok(Json(trend::monthly_trend(
        &records,
        headcount,
        today.year(),
        today.month(),
        today,
        state.settings.work_offset,
    )))
}

async fn departments(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
) -> Result<Json<Vec<DepartmentCount>>, StatusCode> {
    if !claims.role.is_reviewer() {
        return Err(StatusCode::FORBIDDEN);
    }

    let employees = db::list_employees(&state.pool, false)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(trend::department_distribution(&employees)))
}

async fn monthly_rate(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path((year, month)): Path<(i32, u32)>,
) -> Result<Json<MonthlyRate>, StatusCode> {
    if !claims.role.is_reviewer() {
        return Err(StatusCode::FORBIDDEN);
    }
    if !(1..=12).contains(&month) {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
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
    .unwrap_or(month_start);

    let (start, _) = day_bounds_utc(month_start, state.settings.work_offset);
    let (_, end) = day_bounds_utc(month_end, state.settings.work_offset);

    let records = db::list_attendance(&state.pool, None, start, end)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    let headcount = headcount(&state).await?;

    Ok(Json(MonthlyRate {
        year,
        month,
        rate: classifier::monthly_attendance_rate(
            &records,
            headcount,
            year,
            month,
            state.settings.work_offset,
        ),
    }))
}
