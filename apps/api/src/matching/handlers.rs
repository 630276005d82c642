use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use uuid::Uuid;

use crate::candidates::ingest::UPLOAD_DATE_FORMAT;
use crate::errors::AppError;
use crate::llm_client::UsageReport;
use crate::matching::analyze_match;
use crate::models::rows::MatchRow;
use crate::reconcile::Record;
use crate::state::AppState;
use crate::store::{get_candidate, get_job, get_match, insert_match, NewMatch};

#[derive(Debug, Deserialize)]
pub struct CreateMatchRequest {
    pub candidate_id: Uuid,
    pub job_id: Uuid,
}

#[derive(Debug, Serialize)]
pub struct CreateMatchResponse {
    pub match_id: Uuid,
    pub record: Record,
    pub analyzer: &'static str,
    pub usage: UsageReport,
}

/// POST /api/v1/matches
pub async fn handle_create_match(
    State(state): State<AppState>,
    Json(req): Json<CreateMatchRequest>,
) -> Result<Json<CreateMatchResponse>, AppError> {
    let candidate = get_candidate(&state.db, req.candidate_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Candidate {} not found", req.candidate_id)))?;
    let job = get_job(&state.db, req.job_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {} not found", req.job_id)))?;

    let outcome = analyze_match(state.analyzer.as_ref(), &candidate.record.0, &job.record.0).await?;
    let mut record = outcome.record;
    record.insert(
        "analysis_date".into(),
        json!(Utc::now().format(UPLOAD_DATE_FORMAT).to_string()),
    );

    let row = insert_match(
        &state.db,
        NewMatch {
            candidate_id: req.candidate_id,
            job_id: req.job_id,
            record: &record,
            analyzer: outcome.backend,
            usage: outcome.usage,
        },
    )
    .await?;

    Ok(Json(CreateMatchResponse {
        match_id: row.id,
        record,
        analyzer: outcome.backend,
        usage: outcome.usage,
    }))
}

/// GET /api/v1/matches/:id
pub async fn handle_get_match(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<MatchRow>, AppError> {
    let row = get_match(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Match analysis {id} not found")))?;
    Ok(Json(row))
}
