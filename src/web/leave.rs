use crate::db;
use crate::domain::leave::{self, LeaveBalance};
use crate::domain::models::{LeaveRequest, LeaveStatus, LeaveType};
use crate::state::SharedState;
use crate::web::session::AuthSession;
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::{Datelike, NaiveDate, Utc};
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct SubmitLeaveRequest {
    pub leave_type: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub reason: String,
}

#[derive(Deserialize)]
pub struct RejectLeaveRequest {
    pub reason: Option<String>,
}

#[derive(Deserialize)]
pub struct LeaveListQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(submit).get(list))
        .route("/:id/cancel", post(cancel))
        .route("/:id/approve", post(approve))
        .route("/:id/reject", post(reject))
        .route("/balance/:year", get(balance))
        .with_state(state)
}

async fn submit(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Json(payload): Json<SubmitLeaveRequest>,
) -> Result<(StatusCode, Json<LeaveRequest>), StatusCode> {
    let leave_type = LeaveType::try_from(payload.leave_type.as_str())
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    leave::validate_request(payload.start_date, payload.end_date, &payload.reason)
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;

    let request = db::insert_leave_request(
        &state.pool,
        claims.employee_id,
        leave_type,
        payload.start_date,
        payload.end_date,
        payload.reason.trim(),
    )
    .await
    .map_err(|e| {
        tracing::error!("leave request insert failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((StatusCode::CREATED, Json(request)))
}

async fn list(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Query(query): Query<LeaveListQuery>,
) -> Result<Json<Vec<LeaveRequest>>, StatusCode> {
    // Employees only ever see their own requests; reviewers may scope
    // by employee or see everything.
    let employee_id = if claims.role.is_reviewer() {
        query.employee_id
    } else {
        Some(claims.employee_id)
    };

    let status = match query.status.as_deref() {
        Some(raw) => Some(parse_status(raw)?),
        None => None,
    };

    let requests = db::list_leave_requests(&state.pool, employee_id, status)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(requests))
}

async fn cancel(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaveRequest>, StatusCode> {
    let existing = db::find_leave_request(&state.pool, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;

    if existing.employee_id != claims.employee_id {
        return Err(StatusCode::FORBIDDEN);
    }
    if existing.status != LeaveStatus::Pending {
        return Err(StatusCode::CONFLICT);
    }

    let cancelled = db::cancel_leave_request(&state.pool, id, claims.employee_id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::CONFLICT)?;
    Ok(Json(cancelled))
}

async fn approve(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<LeaveRequest>, StatusCode> {
    decide(state, claims_reviewer(claims)?, id, LeaveStatus::Approved, None).await
}

async fn reject(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<RejectLeaveRequest>,
) -> Result<Json<LeaveRequest>, StatusCode> {
    decide(
        state,
        claims_reviewer(claims)?,
        id,
        LeaveStatus::Rejected,
        payload.reason,
    )
    .await
}

async fn balance(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(year): Path<i32>,
) -> Result<Json<LeaveBalance>, StatusCode> {
    if year < 2000 || year > Utc::now().year() + 1 {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let approved = db::list_annual_leave_for_year(&state.pool, claims.employee_id, year)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;

    Ok(Json(leave::leave_ledger(
        &approved,
        state.settings.annual_leave_quota_days,
        year,
    )))
}

fn claims_reviewer(
    claims: crate::web::session::SessionClaims,
) -> Result<crate::web::session::SessionClaims, StatusCode> {
    if claims.role.is_reviewer() {
        Ok(claims)
    } else {
        Err(StatusCode::FORBIDDEN)
    }
}

fn parse_status(raw: &str) -> Result<LeaveStatus, StatusCode> {
    match raw.trim().to_lowercase().as_str() {
        "pending" => Ok(LeaveStatus::Pending),
        "approved" => Ok(LeaveStatus::Approved),
        "rejected" => Ok(LeaveStatus::Rejected),
        "cancelled" => Ok(LeaveStatus::Cancelled),
        _ => Err(StatusCode::UNPROCESSABLE_ENTITY),
    }
}

async fn decide(
    state: SharedState,
    claims: crate::web::session::SessionClaims,
    id: Uuid,
    status: LeaveStatus,
    rejection_reason: Option<String>,
) -> Result<Json<LeaveRequest>, StatusCode> {
    let existing = db::find_leave_request(&state.pool, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)?;
    if existing.status != LeaveStatus::Pending {
        return Err(StatusCode::CONFLICT);
    }

    let decided = db::decide_leave_request(
        &state.pool,
        id,
        status,
        claims.employee_id,
        rejection_reason.as_deref().map(str::trim),
    )
    .await
    .map_err(|e| {
        tracing::error!("leave decision failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .ok_or(StatusCode::CONFLICT)?;

    tracing::info!(
        "leave request {} {} by {}",
        id,
        decided.status.as_str(),
        claims.employee_id
    );
    Ok(Json(decided))
}
