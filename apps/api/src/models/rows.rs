use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sqlx::types::Json;
use sqlx::FromRow;
use uuid::Uuid;

use crate::reconcile::Record;

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct CandidateRow {
    pub id: Uuid,
    pub record: Json<Record>,
    pub resume_filename: String,
    pub resume_s3_key: Option<String>,
    pub tokens_used: i64,
    pub cost: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct JobRow {
    pub id: Uuid,
    pub record: Json<Record>,
    pub jd_text: String,
    pub tokens_used: i64,
    pub cost: f64,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize, FromRow)]
pub struct MatchRow {
    pub id: Uuid,
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub record: Json<Record>,
    pub analyzer: String,
    pub tokens_used: i64,
    pub cost: f64,
    pub created_at: DateTime<Utc>,
}
