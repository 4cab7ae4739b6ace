use crate::db::{self, NewEmployee};
use crate::domain::models::{Employee, Role};
use crate::state::SharedState;
use crate::web::session::AuthSession;
use argon2::{
    password_hash::{PasswordHasher, SaltString},
    Argon2,
};
use axum::{
    extract::{Path, State},
    http::StatusCode,
    routing::{get, post, put},
    Json, Router,
};
use rand_core::OsRng;
use serde::Deserialize;
use uuid::Uuid;

#[derive(Deserialize)]
pub struct CreateEmployeePayload {
    pub full_name: String,
    pub email: String,
    pub password: String,
    pub department: Option<String>,
    pub position: Option<String>,
    pub role: Option<Role>,
}

/// Role is deliberately absent here: it is assigned once at creation
/// and never through a profile update.
#[derive(Deserialize)]
pub struct UpdateEmployeePayload {
    pub full_name: String,
    pub department: Option<String>,
    pub position: Option<String>,
}

pub fn router(state: SharedState) -> Router {
    Router::new()
        .route("/employees", get(list_employees).post(create_employee))
        .route("/employees/:id", put(update_employee))
        .route("/employees/:id/deactivate", post(deactivate_employee))
        .route("/employees/:id/reactivate", post(reactivate_employee))
        .with_state(state)
}

fn require_admin(claims: &crate::web::session::SessionClaims) -> Result<(), StatusCode> {
    if claims.role == Role::Admin {
        Ok(())
    } else {
        Err(StatusCode::FORBIDDEN)
    }
}

/// A duplicate email trips the unique constraint and is the caller's
/// mistake; anything else (pool exhaustion, network) is a server fault.
fn create_failure_status(e: &anyhow::Error) -> StatusCode {
    let duplicate = e
        .downcast_ref::<sqlx::Error>()
        .and_then(|e| e.as_database_error())
        .is_some_and(|db| db.is_unique_violation());
    if duplicate {
        StatusCode::CONFLICT
    } else {
        StatusCode::INTERNAL_SERVER_ERROR
    }
}

async fn list_employees(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
) -> Result<Json<Vec<Employee>>, StatusCode> {
    require_admin(&claims)?;
    let employees = db::list_employees(&state.pool, true)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    Ok(Json(employees))
}

async fn create_employee(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Json(payload): Json<CreateEmployeePayload>,
) -> Result<(StatusCode, Json<Employee>), StatusCode> {
    require_admin(&claims)?;

    let full_name = payload.full_name.trim();
    let email = payload.email.trim();
    if full_name.is_empty() || email.is_empty() || !email.contains('@') {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }
    if payload.password.len() < 8 {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default()
        .hash_password(payload.password.as_bytes(), &salt)
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
        .to_string();

    let employee = db::create_employee(
        &state.pool,
        NewEmployee {
            full_name,
            email,
            hash: &hash,
            department: payload.department.as_deref().map(str::trim),
            position: payload.position.as_deref().map(str::trim),
            role: payload.role.unwrap_or(Role::Employee),
        },
    )
    .await
    .map_err(|e| {
        let status = create_failure_status(&e);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!("employee create failed: {}", e);
        }
        status
    })?;

    tracing::info!(
        "employee {} created with role {} by {}",
        employee.id,
        employee.role.as_str(),
        claims.employee_id
    );
    Ok((StatusCode::CREATED, Json(employee)))
}

async fn update_employee(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
    Json(payload): Json<UpdateEmployeePayload>,
) -> Result<Json<Employee>, StatusCode> {
    require_admin(&claims)?;

    let full_name = payload.full_name.trim();
    if full_name.is_empty() {
        return Err(StatusCode::UNPROCESSABLE_ENTITY);
    }

    let employee = db::update_employee_profile(
        &state.pool,
        id,
        full_name,
        payload.department.as_deref().map(str::trim),
        payload.position.as_deref().map(str::trim),
    )
    .await
    .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?
    .ok_or(StatusCode::NOT_FOUND)?;

    Ok(Json(employee))
}

async fn deactivate_employee(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    require_admin(&claims)?;
    if id == claims.employee_id {
        // Locking yourself out is never what was meant.
        return Err(StatusCode::CONFLICT);
    }

    let changed = db::set_employee_active(&state.pool, id, false)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if !changed {
        return Err(StatusCode::NOT_FOUND);
    }
    tracing::info!("employee {} deactivated by {}", id, claims.employee_id);
    Ok(StatusCode::NO_CONTENT)
}

async fn reactivate_employee(
    AuthSession(claims): AuthSession,
    State(state): State<SharedState>,
    Path(id): Path<Uuid>,
) -> Result<StatusCode, StatusCode> {
    require_admin(&claims)?;

    let changed = db::set_employee_active(&state.pool, id, true)
        .await
        .map_err(|_| StatusCode::INTERNAL_SERVER_ERROR)?;
    if !changed {
        return Err(StatusCode::NOT_FOUND);
    }
    tracing::info!("employee {} reactivated by {}", id, claims.employee_id);
    Ok(StatusCode::NO_CONTENT)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn transient_create_failures_are_not_conflicts() {
        let pool_error = anyhow::Error::from(sqlx::Error::PoolTimedOut);
        assert_eq!(
            create_failure_status(&pool_error),
            StatusCode::INTERNAL_SERVER_ERROR
        );

        let other = anyhow::anyhow!("connection reset");
        assert_eq!(
            create_failure_status(&other),
            StatusCode::INTERNAL_SERVER_ERROR
        );
    }
}
