pub mod health;

use axum::{
    routing::{get, patch, post},
    Router,
};

use crate::candidates::handlers as candidates;
use crate::jobs::handlers as jobs;
use crate::matching::handlers as matches;
use crate::state::AppState;

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(health::health_handler))
        // Candidates
        .route("/api/v1/candidates", post(candidates::handle_upload_candidate))
        .route("/api/v1/candidates/:id", get(candidates::handle_get_candidate))
        .route(
            "/api/v1/candidates/:id/status",
            patch(candidates::handle_update_status),
        )
        // Job descriptions
        .route("/api/v1/jobs", post(jobs::handle_create_job))
        .route("/api/v1/jobs/:id", get(jobs::handle_get_job))
        // Match analyses
        .route("/api/v1/matches", post(matches::handle_create_match))
        .route("/api/v1/matches/:id", get(matches::handle_get_match))
        // Recruiter chat
        .route("/api/v1/chat", post(candidates::handle_chat))
        .with_state(state)
}
