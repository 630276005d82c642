//! Persistence for normalized records: Postgres rows holding the record as
//! JSONB, plus the S3 archive of uploaded source documents.

use aws_sdk_s3::primitives::ByteStream;
use sqlx::types::Json;
use sqlx::PgPool;
use tracing::info;
use uuid::Uuid;

use crate::errors::AppError;
use crate::llm_client::UsageReport;
use crate::models::rows::{CandidateRow, JobRow, MatchRow};
use crate::reconcile::Record;

// ────────────────────────────────────────────────────────────────────────────
// S3 archive
// ────────────────────────────────────────────────────────────────────────────

/// Object key for an uploaded resume. The filename is kept last so downloads
/// get a sensible name.
pub fn resume_key(candidate_id: Uuid, filename: &str) -> String {
    let safe: String = filename
        .chars()
        .map(|c| if c.is_ascii_alphanumeric() || c == '.' || c == '-' { c } else { '_' })
        .collect();
    format!("resumes/{candidate_id}/{safe}")
}

pub async fn archive_upload(
    s3: &aws_sdk_s3::Client,
    bucket: &str,
    key: &str,
    data: Vec<u8>,
    content_type: &str,
) -> Result<(), AppError> {
    s3.put_object()
        .bucket(bucket)
        .key(key)
        .body(ByteStream::from(data))
        .content_type(content_type)
        .send()
        .await
        .map_err(|e| AppError::S3(format!("S3 upload failed: {e}")))?;

    info!("Archived upload to s3://{bucket}/{key}");
    Ok(())
}

// ────────────────────────────────────────────────────────────────────────────
// Candidates
// ────────────────────────────────────────────────────────────────────────────

pub struct NewCandidate<'a> {
    pub id: Uuid,
    pub record: &'a Record,
    pub resume_filename: &'a str,
    pub resume_s3_key: Option<&'a str>,
    pub usage: UsageReport,
}

pub async fn insert_candidate(
    pool: &PgPool,
    candidate: NewCandidate<'_>,
) -> Result<CandidateRow, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        r#"
        INSERT INTO candidates (id, record, resume_filename, resume_s3_key, tokens_used, cost)
        VALUES ($1, $2, $3, $4, $5, $6)
        RETURNING *
        "#,
    )
    .bind(candidate.id)
    .bind(Json(candidate.record))
    .bind(candidate.resume_filename)
    .bind(candidate.resume_s3_key)
    .bind(i64::from(candidate.usage.tokens))
    .bind(candidate.usage.cost)
    .fetch_one(pool)
    .await
}

pub async fn get_candidate(pool: &PgPool, id: Uuid) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>("SELECT * FROM candidates WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

pub async fn update_candidate_record(
    pool: &PgPool,
    id: Uuid,
    record: &Record,
) -> Result<Option<CandidateRow>, sqlx::Error> {
    sqlx::query_as::<_, CandidateRow>(
        r#"
        UPDATE candidates
        SET record = $2, updated_at = now()
        WHERE id = $1
        RETURNING *
        "#,
    )
    .bind(id)
    .bind(Json(record))
    .fetch_optional(pool)
    .await
}

// ────────────────────────────────────────────────────────────────────────────
// Job descriptions
// ────────────────────────────────────────────────────────────────────────────

pub async fn insert_job(
    pool: &PgPool,
    record: &Record,
    jd_text: &str,
    usage: UsageReport,
) -> Result<JobRow, sqlx::Error> {
    sqlx::query_as::<_, JobRow>(
        r#"
        INSERT INTO job_descriptions (id, record, jd_text, tokens_used, cost)
        VALUES ($1, $2, $3, $4, $5)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(Json(record))
    .bind(jd_text)
    .bind(i64::from(usage.tokens))
    .bind(usage.cost)
    .fetch_one(pool)
    .await
}

pub async fn get_job(pool: &PgPool, id: Uuid) -> Result<Option<JobRow>, sqlx::Error> {
    sqlx::query_as::<_, JobRow>("SELECT * FROM job_descriptions WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

// ────────────────────────────────────────────────────────────────────────────
// Match analyses
// ────────────────────────────────────────────────────────────────────────────

pub struct NewMatch<'a> {
    pub candidate_id: Uuid,
    pub job_id: Uuid,
    pub record: &'a Record,
    pub analyzer: &'a str,
    pub usage: UsageReport,
}

pub async fn insert_match(pool: &PgPool, analysis: NewMatch<'_>) -> Result<MatchRow, sqlx::Error> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        INSERT INTO match_analyses (id, candidate_id, job_id, record, analyzer, tokens_used, cost)
        VALUES ($1, $2, $3, $4, $5, $6, $7)
        RETURNING *
        "#,
    )
    .bind(Uuid::new_v4())
    .bind(analysis.candidate_id)
    .bind(analysis.job_id)
    .bind(Json(analysis.record))
    .bind(analysis.analyzer)
    .bind(i64::from(analysis.usage.tokens))
    .bind(analysis.usage.cost)
    .fetch_one(pool)
    .await
}

pub async fn get_match(pool: &PgPool, id: Uuid) -> Result<Option<MatchRow>, sqlx::Error> {
    sqlx::query_as::<_, MatchRow>("SELECT * FROM match_analyses WHERE id = $1")
        .bind(id)
        .fetch_optional(pool)
        .await
}

/// Most recent analysis for a candidate, optionally against a specific job.
pub async fn latest_match_for(
    pool: &PgPool,
    candidate_id: Uuid,
    job_id: Option<Uuid>,
) -> Result<Option<MatchRow>, sqlx::Error> {
    sqlx::query_as::<_, MatchRow>(
        r#"
        SELECT * FROM match_analyses
        WHERE candidate_id = $1 AND ($2::uuid IS NULL OR job_id = $2)
        ORDER BY created_at DESC
        LIMIT 1
        "#,
    )
    .bind(candidate_id)
    .bind(job_id)
    .fetch_optional(pool)
    .await
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_resume_key_sanitizes_filename() {
        let id = Uuid::nil();
        assert_eq!(
            resume_key(id, "Ada Lovelace (final).pdf"),
            "resumes/00000000-0000-0000-0000-000000000000/Ada_Lovelace__final_.pdf"
        );
        assert!(resume_key(id, "../../etc/passwd").ends_with("/.._.._etc_passwd"));
    }
}
