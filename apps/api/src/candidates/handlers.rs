use axum::{
    extract::{Multipart, Path, State},
    Json,
};
use serde::Deserialize;
use tracing::info;
use uuid::Uuid;

use crate::candidates::chat::{chat_message, ChatOutcome};
use crate::candidates::ingest::{ingest_resume, read_upload, IngestResponse};
use crate::candidates::status::{apply_status_update, StatusUpdate};
use crate::errors::AppError;
use crate::llm_client::ChatTurn;
use crate::models::rows::{CandidateRow, JobRow, MatchRow};
use crate::state::AppState;
use crate::store::{get_candidate, get_job, get_match, latest_match_for, update_candidate_record};

async fn load_candidate(state: &AppState, id: Uuid) -> Result<CandidateRow, AppError> {
    get_candidate(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))
}

/// POST /api/v1/candidates
pub async fn handle_upload_candidate(
    State(state): State<AppState>,
    multipart: Multipart,
) -> Result<Json<IngestResponse>, AppError> {
    let upload = read_upload(multipart).await?;
    let response = ingest_resume(&state, upload).await?;
    Ok(Json(response))
}

/// GET /api/v1/candidates/:id
pub async fn handle_get_candidate(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<CandidateRow>, AppError> {
    Ok(Json(load_candidate(&state, id).await?))
}

/// PATCH /api/v1/candidates/:id/status
pub async fn handle_update_status(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
    Json(update): Json<StatusUpdate>,
) -> Result<Json<CandidateRow>, AppError> {
    let row = load_candidate(&state, id).await?;
    let updated = apply_status_update(&row.record.0, &update)
        .map_err(|e| AppError::UnprocessableEntity(e.to_string()))?;

    let row = update_candidate_record(&state.db, id, &updated)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {id} not found")))?;
    info!(candidate_id = %id, ?update, "candidate status updated");
    Ok(Json(row))
}

#[derive(Debug, Deserialize)]
pub struct ChatRequest {
    pub candidate_id: Uuid,
    pub job_id: Option<Uuid>,
    pub match_id: Option<Uuid>,
    pub message: String,
    #[serde(default)]
    pub history: Vec<ChatTurn>,
}

/// POST /api/v1/chat
pub async fn handle_chat(
    State(state): State<AppState>,
    Json(req): Json<ChatRequest>,
) -> Result<Json<ChatOutcome>, AppError> {
    if req.message.trim().is_empty() {
        return Err(AppError::Validation("message must not be empty".to_string()));
    }

    let candidate = load_candidate(&state, req.candidate_id).await?;

    let job: Option<JobRow> = match req.job_id {
        Some(job_id) => Some(
            get_job(&state.db, job_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Job {job_id} not found")))?,
        ),
        None => None,
    };

    let analysis: Option<MatchRow> = match req.match_id {
        Some(match_id) => Some(
            get_match(&state.db, match_id)
                .await?
                .ok_or_else(|| AppError::NotFound(format!("Match analysis {match_id} not found")))?,
        ),
        None => latest_match_for(&state.db, req.candidate_id, req.job_id).await?,
    };

    let outcome = chat_message(
        &state.llm,
        &candidate.record.0,
        job.as_ref().map(|j| &j.record.0),
        analysis.as_ref().map(|m| &m.record.0),
        &req.history,
        &req.message,
    )
    .await?;

    if let Some(updated) = &outcome.updated_record {
        update_candidate_record(&state.db, req.candidate_id, updated).await?;
    }

    Ok(Json(outcome))
}
