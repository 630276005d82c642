use axum::{
    extract::{Path, State},
    Json,
};
use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::candidates::ingest::UPLOAD_DATE_FORMAT;
use crate::errors::AppError;
use crate::extraction::extract_job;
use crate::llm_client::UsageReport;
use crate::models::rows::JobRow;
use crate::reconcile::Record;
use crate::state::AppState;
use crate::store::{get_job, insert_job};

#[derive(Debug, Deserialize)]
pub struct CreateJobRequest {
    pub jd_text: String,
}

#[derive(Debug, Serialize)]
pub struct CreateJobResponse {
    pub job_id: Uuid,
    pub record: Record,
    pub usage: UsageReport,
}

/// POST /api/v1/jobs
pub async fn handle_create_job(
    State(state): State<AppState>,
    Json(req): Json<CreateJobRequest>,
) -> Result<Json<CreateJobResponse>, AppError> {
    if req.jd_text.trim().is_empty() {
        return Err(AppError::Validation("jd_text must not be empty".to_string()));
    }

    let extracted = extract_job(&state.llm, &req.jd_text).await?;
    let mut record = extracted.record;
    record.insert(
        "upload_date".into(),
        json!(Utc::now().format(UPLOAD_DATE_FORMAT).to_string()),
    );

    let row = insert_job(&state.db, &record, &req.jd_text, extracted.usage).await?;
    info!(job_id = %row.id, tokens = extracted.usage.tokens, "job description stored");

    Ok(Json(CreateJobResponse {
        job_id: row.id,
        record,
        usage: extracted.usage,
    }))
}

/// GET /api/v1/jobs/:id
pub async fn handle_get_job(
    State(state): State<AppState>,
    Path(id): Path<Uuid>,
) -> Result<Json<JobRow>, AppError> {
    let row = get_job(&state.db, id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("Job {id} not found")))?;
    Ok(Json(row))
}
