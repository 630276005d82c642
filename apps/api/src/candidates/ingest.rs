use axum::extract::Multipart;
use chrono::{DateTime, Utc};
use serde::Serialize;
use serde_json::json;
use tracing::info;
use uuid::Uuid;

use crate::enrichment::enrich_experience;
use crate::errors::AppError;
use crate::extraction::document::{extract_text, DocumentKind};
use crate::extraction::extract_candidate;
use crate::llm_client::UsageReport;
use crate::reconcile::Record;
use crate::state::AppState;
use crate::store::{archive_upload, insert_candidate, resume_key, NewCandidate};

/// Multipart field carrying the resume.
pub const RESUME_FIELD: &str = "resume_file";

/// Timestamp format of the `upload_date` metadata key.
pub const UPLOAD_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

#[derive(Debug)]
pub struct Upload {
    pub filename: String,
    pub data: Vec<u8>,
}

#[derive(Debug, Serialize)]
pub struct IngestResponse {
    pub candidate_id: Uuid,
    pub record: Record,
    pub usage: UsageReport,
    pub enriched_companies: usize,
}

/// Reads the resume file out of a multipart body. Other fields are ignored.
pub async fn read_upload(mut multipart: Multipart) -> Result<Upload, AppError> {
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::Validation(format!("Multipart error: {e}")))?
    {
        if field.name() != Some(RESUME_FIELD) {
            continue;
        }
        let filename = field
            .file_name()
            .map(str::to_string)
            .ok_or_else(|| AppError::Validation("Resume upload has no filename".to_string()))?;
        let data = field
            .bytes()
            .await
            .map_err(|e| AppError::Validation(format!("Read error: {e}")))?
            .to_vec();
        return Ok(Upload { filename, data });
    }

    Err(AppError::Validation(format!(
        "Missing multipart field '{RESUME_FIELD}'"
    )))
}

/// Records where the candidate came from. Set after normalization, so the
/// keys ride along as metadata.
pub fn attach_upload_metadata(record: &mut Record, filename: &str, uploaded_at: DateTime<Utc>) {
    record.insert("resume_file".into(), json!(filename));
    record.insert(
        "upload_date".into(),
        json!(uploaded_at.format(UPLOAD_DATE_FORMAT).to_string()),
    );
}

/// Upload → text → archive → model extraction → normalize → enrich → persist.
pub async fn ingest_resume(state: &AppState, upload: Upload) -> Result<IngestResponse, AppError> {
    let kind = DocumentKind::from_filename(&upload.filename)?;
    let text = extract_text(&upload.data, &upload.filename).await?;
    info!(filename = %upload.filename, chars = text.len(), "resume text extracted");

    let candidate_id = Uuid::new_v4();
    let s3_key = resume_key(candidate_id, &upload.filename);
    archive_upload(
        &state.s3,
        &state.config.s3_bucket,
        &s3_key,
        upload.data,
        kind.content_type(),
    )
    .await?;

    let now = Utc::now();
    let extracted = extract_candidate(&state.llm, &text, now.date_naive()).await?;
    let mut record = extracted.record;
    attach_upload_metadata(&mut record, &upload.filename, now);

    let enriched_companies = enrich_experience(state.enricher.as_ref(), &mut record).await;

    let row = insert_candidate(
        &state.db,
        NewCandidate {
            id: candidate_id,
            record: &record,
            resume_filename: &upload.filename,
            resume_s3_key: Some(&s3_key),
            usage: extracted.usage,
        },
    )
    .await?;

    info!(
        candidate_id = %row.id,
        tokens = extracted.usage.tokens,
        enriched_companies,
        "candidate ingested"
    );

    Ok(IngestResponse {
        candidate_id: row.id,
        record,
        usage: extracted.usage,
        enriched_companies,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_upload_metadata_follows_standard_fields() {
        let mut record = Record::new();
        record.insert("CandidateFullName".into(), json!("Jane Doe"));
        let at = Utc.with_ymd_and_hms(2024, 3, 5, 9, 7, 1).unwrap();

        attach_upload_metadata(&mut record, "jane.pdf", at);
        let keys: Vec<&str> = record.keys().map(String::as_str).collect();
        assert_eq!(keys, ["CandidateFullName", "resume_file", "upload_date"]);
        assert_eq!(record["upload_date"], "2024-03-05 09:07:01");
    }
}
