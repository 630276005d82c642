//! Recruiter chat: optional status command, then a model reply grounded in the
//! candidate, job and analysis records.

use serde::Serialize;
use tracing::{info, warn};

use crate::candidates::status::{apply_status_update, parse_status_command, StatusUpdate};
use crate::errors::AppError;
use crate::extraction::prompts::{chat_context, CHAT_SYSTEM};
use crate::llm_client::{ChatTurn, LlmClient, UsageReport};
use crate::reconcile::Record;

const NOT_PROVIDED_YET: &str = "Not provided yet";

#[derive(Debug, Serialize)]
pub struct ChatOutcome {
    pub reply: String,
    /// The candidate record after a successful status command.
    pub updated_record: Option<Record>,
    /// Why a status command was refused, if it was.
    pub status_error: Option<String>,
    pub usage: UsageReport,
}

fn context_json(record: Option<&Record>) -> Result<String, AppError> {
    match record {
        Some(record) => serde_json::to_string(record).map_err(|e| AppError::Internal(e.into())),
        None => Ok(NOT_PROVIDED_YET.to_string()),
    }
}

/// Applies a status command found in `message`, if any. A refused command
/// leaves the record untouched and is reported back, not raised.
pub fn handle_status_command(
    candidate: &Record,
    message: &str,
) -> (Option<StatusUpdate>, Result<Option<Record>, String>) {
    let update = parse_status_command(message);
    if !update.has_changes() {
        return (None, Ok(None));
    }
    match apply_status_update(candidate, &update) {
        Ok(updated) => {
            info!(?update, "candidate status updated from chat");
            (Some(update), Ok(Some(updated)))
        }
        Err(e) => {
            warn!(?update, "status command refused: {e}");
            (Some(update), Err(e.to_string()))
        }
    }
}

pub async fn chat_message(
    llm: &LlmClient,
    candidate: &Record,
    job: Option<&Record>,
    analysis: Option<&Record>,
    history: &[ChatTurn],
    message: &str,
) -> Result<ChatOutcome, AppError> {
    let (_, status) = handle_status_command(candidate, message);
    let (updated_record, status_error) = match status {
        Ok(updated) => (updated, None),
        Err(reason) => (None, Some(reason)),
    };

    let context = chat_context(
        &context_json(Some(updated_record.as_ref().unwrap_or(candidate)))?,
        &context_json(job)?,
        &context_json(analysis)?,
        message,
    );

    let output = llm
        .chat(CHAT_SYSTEM, history, &context)
        .await
        .map_err(|e| AppError::Llm(format!("Chat request failed: {e}")))?;

    Ok(ChatOutcome {
        reply: output.value,
        updated_record,
        status_error,
        usage: output.usage,
    })
}
