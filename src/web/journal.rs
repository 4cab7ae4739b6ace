use crate::db::{self, NewJournalEntry};
use crate::domain::journal::{self, JournalAction, JournalPermissions, WorkflowError};
use crate::domain::models::{JournalEntry, VerificationStatus, WorkResult};
use crate::state::SharedState;
use crate::web::session::{AuthSession, SessionClaims};
use axum::{
    extract::{Path, Query, State},
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

#[derive(Deserialize)]
pub struct CreateJournalRequest {
    pub activity_date: NaiveDate,
    pub content: String,
    pub work_result: String,
    pub obstacles: Option<String>,
    pub mood: Option<String>,
    pub duration_minutes: i32,
    /// Submit immediately instead of leaving a draft.
    #[serde(default)]
    pub submit: bool,
}

#[derive(Deserialize)]
pub struct UpdateJournalRequest {
    pub content: String,
    pub work_result: String,
    pub obstacles: Option<String>,
    pub mood: Option<String>,
    pub duration_minutes: i32,
}

#[derive(Deserialize)]
pub struct ReviewNoteRequest {
    pub note: Option<String>,
}

#[derive(Deserialize)]
pub struct JournalListQuery {
    pub employee_id: Option<Uuid>,
    pub status: Option<String>,
}

/// A journal entry as the caller sees it: the row plus the derived
/// backdated flag and what this actor may do with it.
#[derive(Serialize)]
pub struct JournalView {
    #[serde(flatten)]
    pub entry: JournalEntry,
    pub backdated: bool,
    pub permissions: JournalPermissions,
}

impl JournalView {
    fn for_actor(entry: JournalEntry, claims: &SessionClaims) -> Self {
        let backdated = entry.is_backdated();
        let permissions = journal::permissions(entry.verification_status, claims.role);
        JournalView {
            entry,
            backdated,
            permissions,
        }
    }
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/", post(create).get(list))
        .route("/:id", get(view).put(update).delete(remove))
        .route("/:id/submit", post(submit))
        .route("/:id/mark-read", post(mark_read))
        .route("/:id/approve", post(approve))
        .route("/:id/request-revision", post(request_revision))
        .with_state(state)
}

fn workflow_status(err: &WorkflowError) -> StatusCode {
    match err {
        WorkflowError::Validation(_) => StatusCode::UNPROCESSABLE_ENTITY,
        WorkflowError::IllegalTransition { .. } => StatusCode::CONFLICT,
        WorkflowError::NotPermitted(_) => StatusCode::FORBIDDEN,
    }
}

async fn load_entry(state: &SharedState, id: Uuid) -> Result<JournalEntry, StatusCode> {
    db::find_journal(&state.pool, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .ok_or(StatusCode::NOT_FOUND)
}

fn require_visible(entry: &JournalEntry, claims: &SessionClaims) -> Result<(), StatusCode> {
    if entry.employee_id == claims.employee_id || claims.role.is_reviewer() {
        Ok(())
    } else {
        Err(StatusCode::FORBIDDEN)
    }
}

async fn create(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Json(payload): Json<CreateJournalRequest>,
) -> Result<(StatusCode, Json<JournalView>), StatusCode> {
    let work_result = WorkResult::try_from(payload.work_result.as_str())
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    journal::validate_content(&payload.content).map_err(|e| workflow_status(&e))?;
    if payload.duration_minutes < 0 {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    // One entry per employee per day; the unique index is the final
    // arbiter if two creates race.
    let collision = db::find_journal_for_day(&state.pool, claims.employee_id, payload.activity_date)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if collision.is_some() {
        return Err(StatusCode::CONFLICT);
    }

    let status = if payload.submit {
        VerificationStatus::Submitted
    } else {
        VerificationStatus::Draft
    };

    let entry = db::insert_journal(
        &state.pool,
        NewJournalEntry {
            employee_id: claims.employee_id,
            activity_date: payload.activity_date,
            content: payload.content.trim(),
            work_result,
            obstacles: payload.obstacles.as_deref(),
            mood: payload.mood.as_deref(),
            duration_minutes: payload.duration_minutes,
            verification_status: status,
        },
    )
    .await
    .map_err(|e| {
        tracing::error!("journal insert failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?;

    Ok((
        StatusCode::CREATED,
        Json(JournalView::for_actor(entry, &claims)),
    ))
}

async fn list(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Query(query): Query<JournalListQuery>,
) -> Result<Json<Vec<JournalView>>, StatusCode> {
    let employee_id = if claims.role.is_reviewer() {
        query.employee_id
    } else {
        Some(claims.employee_id)
    };
    let status = match query.status.as_deref() {
        Some(raw) => {
            Some(VerificationStatus::try_from(raw).map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?)
        }
        None => None,
    };

    let entries = db::list_journals(&state.pool, employee_id, status)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(
        entries
            .into_iter()
            .map(|e| JournalView::for_actor(e, &claims))
            .collect(),
    ))
}

async fn view(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JournalView>, StatusCode> {
    let entry = load_entry(&state, id).await?;
    require_visible(&entry, &claims)?;
    Ok(Json(JournalView::for_actor(entry, &claims)))
}

async fn update(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateJournalRequest>,
) -> Result<Json<JournalView>, StatusCode> {
    let entry = load_entry(&state, id).await?;
    require_visible(&entry, &claims)?;

    let perms = journal::permissions(entry.verification_status, claims.role);
    if !perms.can_edit {
        return Err(StatusCode::CONFLICT);
    }

    let work_result = WorkResult::try_from(payload.work_result.as_str())
        .map_err(|_| StatusCode::UNPROCESSABLE_ENTITY)?;
    journal::validate_content(&payload.content).map_err(|e| workflow_status(&e))?;
    if payload.duration_minutes < 0 {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let updated = db::update_journal_content(
        &state.pool,
        id,
        payload.content.trim(),
        work_result,
        payload.obstacles.as_deref(),
        payload.mood.as_deref(),
        payload.duration_minutes,
    )
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(JournalView::for_actor(updated, &claims)))
}

async fn remove(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    let entry = load_entry(&state, id).await?;
    require_visible(&entry, &claims)?;

    let perms = journal::permissions(entry.verification_status, claims.role);
    if !perms.can_delete {
        return Err(StatusCode::CONFLICT);
    }

    // Journals are hard-deleted, unlike leave requests which soft
    // cancel. Both behaviors are intentional product decisions.
    let deleted = db::delete_journal(&state.pool, id)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if !deleted {
        return Err(StatusCode::NOT_FOUND);
    }
    tracing::info!("journal {} deleted by {}", id, claims.employee_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn submit(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JournalView>, StatusCode> {
    let entry = load_entry(&state, id).await?;
    // Submission is the owner's act even though reviewers can edit.
    if entry.employee_id != claims.employee_id {
        return Err(StatusCode::FORBIDDEN);
    }
    apply_transition(&state, entry, JournalAction::Submit, claims, None).await
}

async fn mark_read(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JournalView>, StatusCode> {
    let entry = load_entry(&state, id).await?;
    apply_transition(&state, entry, JournalAction::MarkRead, claims, None).await
}

async fn approve(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewNoteRequest>,
) -> Result<Json<JournalView>, StatusCode> {
    let entry = load_entry(&state, id).await?;
    apply_transition(&state, entry, JournalAction::Approve, claims, payload.note).await
}

async fn request_revision(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<ReviewNoteRequest>,
) -> Result<Json<JournalView>, StatusCode> {
    let entry = load_entry(&state, id).await?;
    apply_transition(
        &state,
        entry,
        JournalAction::RequestRevision,
        claims,
        payload.note,
    )
    .await
}

async fn apply_transition(
    state: &SharedState,
    entry: JournalEntry,
    action: JournalAction,
    claims: SessionClaims,
    note: Option<String>,
) -> Result<Json<JournalView>, StatusCode> {
    let next = journal::transition(&entry, action, claims.role, note.as_deref()).map_err(|e| {
        tracing::debug!("journal {} transition rejected: {}", entry.id, e);
        workflow_status(&e)
    })?;

    let persisted = db::update_journal_status(
        &state.pool,
        entry.id,
        next.verification_status,
        next.manager_notes.as_deref(),
    )
    .await
    .map_err(|e| {
        tracing::error!("journal status update failed: {}", e);
        StatusCode::INTERNAL_SERVER_ERROR
    })?
    .ok_or(StatusCode::NOT_FOUND)?;

    tracing::info!(
        "journal {} moved to {} by {}",
        entry.id,
        persisted.verification_status.as_str(),
        claims.employee_id
    );
    Ok(Json(JournalView::for_actor(persisted, &claims)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::models::Role;
    use chrono::{TimeZone, Utc};

    #[test]
    fn journal_view_flattens_entry_fields() {
        // Written the evening of the activity day, so not backdated.
        let written_at = Utc.with_ymd_and_hms(2024, 6, 10, 17, 30, 0).unwrap();
        let claims = SessionClaims {
            employee_id: Uuid::new_v4(),
            role: Role::Employee,
            exp: written_at.timestamp() + 3600,
        };
        let entry = JournalEntry {
            id: Uuid::new_v4(),
            employee_id: claims.employee_id,
            activity_date: NaiveDate::from_ymd_opt(2024, 6, 10).unwrap(),
            content: "set up the quarterly report".to_string(),
            work_result: WorkResult::Completed,
            obstacles: None,
            mood: Some("good".to_string()),
            duration_minutes: 480,
            verification_status: VerificationStatus::Approved,
            manager_notes: None,
            created_at: written_at,
            updated_at: written_at,
        };

        let value = serde_json::to_value(JournalView::for_actor(entry, &claims)).unwrap();
        assert_eq!(value["verification_status"], "approved");
        assert_eq!(value["permissions"]["is_locked"], true);
        assert_eq!(value["permissions"]["can_edit"], false);
        assert_eq!(value["backdated"], false);
    }
}
