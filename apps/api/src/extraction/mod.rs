//! Extraction: document text → model JSON → normalized record.

pub mod document;
pub mod prompts;

use chrono::NaiveDate;
use serde_json::Value;
use tracing::info;

use crate::errors::AppError;
use crate::llm_client::prompts::json_system;
use crate::llm_client::{LlmClient, UsageReport};
use crate::reconcile::{normalize_candidate, normalize_job, Record};

/// A normalized record plus what the model call cost.
#[derive(Debug)]
pub struct Extracted {
    pub record: Record,
    pub usage: UsageReport,
}

/// Resume text → normalized candidate record.
pub async fn extract_candidate(
    llm: &LlmClient,
    resume_text: &str,
    today: NaiveDate,
) -> Result<Extracted, AppError> {
    let output = llm
        .call_json::<Value>(
            &prompts::resume_prompt(resume_text),
            &json_system(prompts::RESUME_SYSTEM_ROLE),
        )
        .await
        .map_err(|e| AppError::Llm(format!("Failed to parse resume: {e}")))?;

    let record = normalize_candidate(&output.value, today);
    info!(tokens = output.usage.tokens, "resume extracted");
    Ok(Extracted {
        record,
        usage: output.usage,
    })
}

/// Job description text → normalized job record.
pub async fn extract_job(llm: &LlmClient, jd_text: &str) -> Result<Extracted, AppError> {
    let output = llm
        .call_json::<Value>(
            &prompts::job_prompt(jd_text),
            &json_system(prompts::JOB_SYSTEM_ROLE),
        )
        .await
        .map_err(|e| AppError::Llm(format!("Failed to parse job description: {e}")))?;

    let record = normalize_job(&output.value);
    info!(tokens = output.usage.tokens, "job description extracted");
    Ok(Extracted {
        record,
        usage: output.usage,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::llm_client::LlmSettings;
    use crate::reconcile::fields;
    use serde_json::json;
    use std::time::Duration;
    use wiremock::matchers::method;
    use wiremock::{Mock, MockServer, ResponseTemplate};

    async fn llm_replying(body: Value) -> (MockServer, LlmClient) {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": body.to_string()}],
                "usage": {"input_tokens": 800, "output_tokens": 200}
            })))
            .mount(&server)
            .await;

        let mut settings = LlmSettings::new("k");
        settings.api_url = server.uri();
        settings.retry_base_delay = Duration::from_millis(1);
        let client = LlmClient::new(settings).unwrap();
        (server, client)
    }

    #[tokio::test]
    async fn test_candidate_extraction_normalizes_model_output() {
        let (_server, llm) = llm_replying(json!({
            "name": "Ada Lovelace",
            "skills": "Python, Leadership",
            "work_experience": [{"company": "Analytical Engines", "duration": "2019 - 2021"}]
        }))
        .await;
        let today = NaiveDate::from_ymd_opt(2024, 1, 1).unwrap();

        let extracted = extract_candidate(&llm, "resume text", today).await.unwrap();
        assert_eq!(extracted.record[fields::CANDIDATE_FULL_NAME], "Ada Lovelace");
        assert_eq!(extracted.record[fields::SKILLS], json!(["Python", "Leadership"]));
        assert_eq!(extracted.record[fields::TOTAL_EXPERIENCE_YEARS], json!(2.0));
        assert_eq!(extracted.usage.tokens, 1000);
    }

    #[tokio::test]
    async fn test_job_extraction_splits_skills() {
        let (_server, llm) = llm_replying(json!({
            "job_title": "Data Engineer",
            "skills": ["SQL", "Stakeholder management"]
        }))
        .await;

        let extracted = extract_job(&llm, "jd text").await.unwrap();
        assert_eq!(extracted.record[fields::JOB_TITLE], "Data Engineer");
        assert_eq!(
            extracted.record[fields::REQUIRED_SKILLS],
            json!({"technical": ["SQL"], "soft": ["Stakeholder management"]})
        );
    }

    #[tokio::test]
    async fn test_non_json_reply_is_an_llm_error() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "content": [{"type": "text", "text": "Sorry, I cannot help with that."}],
                "usage": {"input_tokens": 1, "output_tokens": 1}
            })))
            .mount(&server)
            .await;
        let mut settings = LlmSettings::new("k");
        settings.api_url = server.uri();
        let llm = LlmClient::new(settings).unwrap();

        assert!(matches!(
            extract_job(&llm, "jd").await,
            Err(AppError::Llm(_))
        ));
    }
}
