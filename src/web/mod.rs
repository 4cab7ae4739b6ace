pub mod admin;
pub mod attendance;
pub mod auth;
pub mod dashboard;
pub mod journal;
pub mod leave;
pub mod reports;
pub mod session;

use crate::state::SharedState;
use axum::{routing::get, Router};

async fn health() -> &'static str {
    "OK"
}

pub fn routes(state: SharedState) -> Router {
    Router::new()
        .route("/health", get(health))
        .nest("/auth", auth::router(state.clone()))
        .nest("/attendance", attendance::router(state.clone()))
        .nest("/leave", leave::router(state.clone()))
        .nest("/journal", journal::router(state.clone()))
        .nest("/dashboard", dashboard::router(state.clone()))
        .nest("/reports", reports::router(state.clone()))
        .nest("/admin", admin::router(state))
}
