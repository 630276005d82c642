//! Recruiter status commands: "shortlist Jane Doe (internal)",
//! "move to interview process", "reject john@example.com" and so on.
//!
//! Parsing is keyword-based and never fails; applying checks that every
//! identifier the command named belongs to the candidate being updated.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::json;
use thiserror::Error;

use crate::models::FinalResult;
use crate::reconcile::coerce::YES;
use crate::reconcile::fields::{
    CANDIDATE_FULL_NAME, CANDIDATE_JOINED, EMAIL_ADDRESS, FINAL_RESULT, INTERNAL_SHORTLISTED,
    INTERVIEW_IN_PROCESS, PHONE_NUMBER,
};
use crate::reconcile::Record;

static NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?:shortlist|interview|select|reject|joined|onboard)\s+([A-Za-z\s]+)(?:\s*\(|,|$)")
        .expect("valid name regex")
});

static EMAIL: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"([a-zA-Z0-9_.+-]+@[a-zA-Z0-9-]+\.[a-zA-Z0-9-.]+)").expect("valid email regex")
});

static PHONE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(\d{10}|\d{3}[-.\s]\d{3}[-.\s]\d{4}|\(\d{3}\)\s*\d{3}[-.\s]\d{4})")
        .expect("valid phone regex")
});

const INTERVIEW_PHRASES: &[&str] = &["interview process", "move to interview", "start interview"];

/// What a chat message asked to change, and who it named.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StatusUpdate {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    #[serde(default)]
    pub internal_shortlisted: bool,
    #[serde(default)]
    pub interview_in_process: bool,
    pub final_result: Option<FinalResult>,
    #[serde(default)]
    pub joined: bool,
}

impl StatusUpdate {
    /// True when the command changes at least one status field.
    pub fn has_changes(&self) -> bool {
        self.internal_shortlisted
            || self.interview_in_process
            || self.final_result.is_some()
            || self.joined
    }
}

#[derive(Debug, Error, PartialEq)]
pub enum StatusError {
    #[error("{field} in the command does not match the candidate record")]
    IdentityMismatch { field: &'static str },

    #[error("No status change requested")]
    NoChange,
}

pub fn parse_status_command(message: &str) -> StatusUpdate {
    let lower = message.to_lowercase();

    let name = NAME
        .captures(&lower)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
        .filter(|n| !n.is_empty());
    let email = EMAIL.captures(message).map(|c| c[1].to_string());
    let phone = PHONE.captures(message).map(|c| c[1].to_string());

    let final_result = if lower.contains("reject") {
        Some(FinalResult::Rejected)
    } else if lower.contains("select") || lower.contains("offer") {
        Some(FinalResult::Selected)
    } else {
        None
    };

    StatusUpdate {
        name,
        email,
        phone,
        internal_shortlisted: lower.contains("shortlist") && lower.contains("internal"),
        interview_in_process: INTERVIEW_PHRASES.iter().any(|p| lower.contains(p)),
        final_result,
        joined: lower.contains("joined") || lower.contains("onboard"),
    }
}

fn record_text<'a>(record: &'a Record, field: &str) -> &'a str {
    record.get(field).and_then(|v| v.as_str()).unwrap_or("").trim()
}

fn check_identity(record: &Record, update: &StatusUpdate) -> Result<(), StatusError> {
    if let Some(name) = &update.name {
        if !record_text(record, CANDIDATE_FULL_NAME).eq_ignore_ascii_case(name.trim()) {
            return Err(StatusError::IdentityMismatch { field: "Name" });
        }
    }
    if let Some(email) = &update.email {
        if !record_text(record, EMAIL_ADDRESS).eq_ignore_ascii_case(email.trim()) {
            return Err(StatusError::IdentityMismatch { field: "Email" });
        }
    }
    if let Some(phone) = &update.phone {
        if record_text(record, PHONE_NUMBER) != phone.trim() {
            return Err(StatusError::IdentityMismatch { field: "Phone" });
        }
    }
    Ok(())
}

/// Returns a copy of `record` with the requested flags set. Fields the
/// command did not mention keep their values.
pub fn apply_status_update(record: &Record, update: &StatusUpdate) -> Result<Record, StatusError> {
    if !update.has_changes() {
        return Err(StatusError::NoChange);
    }
    check_identity(record, update)?;

    let mut updated = record.clone();
    if update.internal_shortlisted {
        updated.insert(INTERNAL_SHORTLISTED.into(), json!(YES));
    }
    if update.interview_in_process {
        updated.insert(INTERVIEW_IN_PROCESS.into(), json!(YES));
    }
    if let Some(result) = &update.final_result {
        updated.insert(FINAL_RESULT.into(), json!(result));
    }
    if update.joined {
        updated.insert(CANDIDATE_JOINED.into(), json!(YES));
    }
    Ok(updated)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::normalize_candidate;
    use chrono::NaiveDate;

    fn record() -> Record {
        normalize_candidate(
            &json!({
                "name": "Jane Doe",
                "email": "Jane.Doe@example.com",
                "phone": "5551234567"
            }),
            NaiveDate::from_ymd_opt(2024, 1, 1).unwrap(),
        )
    }

    #[test]
    fn test_parse_internal_shortlist_with_name() {
        let update = parse_status_command("Please shortlist Jane Doe (internal)");
        assert_eq!(update.name.as_deref(), Some("jane doe"));
        assert!(update.internal_shortlisted);
        assert!(!update.interview_in_process);
        assert_eq!(update.final_result, None);

        let updated = apply_status_update(&record(), &update).unwrap();
        assert_eq!(updated[INTERNAL_SHORTLISTED], "Yes");
    }

    #[test]
    fn test_parse_identifiers() {
        let update = parse_status_command("Move to interview process: jane.doe@example.com, 555-123-4567");
        assert_eq!(update.email.as_deref(), Some("jane.doe@example.com"));
        assert_eq!(update.phone.as_deref(), Some("555-123-4567"));
        assert!(update.interview_in_process);
    }

    #[test]
    fn test_reject_wins_over_select() {
        let update = parse_status_command("We selected someone else, reject this one");
        assert_eq!(update.final_result, Some(FinalResult::Rejected));
        let update = parse_status_command("Send the offer");
        assert_eq!(update.final_result, Some(FinalResult::Selected));
    }

    #[test]
    fn test_joined_and_onboard() {
        assert!(parse_status_command("She has joined today").joined);
        assert!(parse_status_command("Onboard next Monday").joined);
        assert!(!parse_status_command("What are her skills?").has_changes());
    }

    #[test]
    fn test_apply_sets_flags_on_matching_candidate() {
        let update = parse_status_command("shortlist jane doe, internal and start interview");
        let updated = apply_status_update(&record(), &update).unwrap();
        assert_eq!(updated[INTERNAL_SHORTLISTED], "Yes");
        assert_eq!(updated[INTERVIEW_IN_PROCESS], "Yes");
        assert_eq!(updated[FINAL_RESULT], "Pending");
        assert_eq!(updated[CANDIDATE_JOINED], "No");
    }

    #[test]
    fn test_apply_matches_email_case_insensitively() {
        let update = parse_status_command("Offer for JANE.DOE@EXAMPLE.COM");
        let updated = apply_status_update(&record(), &update).unwrap();
        assert_eq!(updated[FINAL_RESULT], "Selected");
    }

    #[test]
    fn test_apply_refuses_mismatched_identity() {
        let update = parse_status_command("reject John Smith");
        assert_eq!(
            apply_status_update(&record(), &update),
            Err(StatusError::IdentityMismatch { field: "Name" })
        );

        let update = parse_status_command("joined, phone 555.123.4567");
        assert_eq!(
            apply_status_update(&record(), &update),
            Err(StatusError::IdentityMismatch { field: "Phone" })
        );
    }

    #[test]
    fn test_apply_without_changes_is_refused() {
        let update = parse_status_command("tell me about jane doe");
        assert_eq!(apply_status_update(&record(), &update), Err(StatusError::NoChange));
    }
}
