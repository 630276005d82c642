//! Match analyzers: pluggable, trait-based backends that compare a
//! normalized candidate with a normalized job description.
//!
//! Default: `LlmMatchAnalyzer` (the model writes the full analysis).
//! Alternative: `KeywordMatchAnalyzer` (pure-Rust, deterministic, no network).
//!
//! Both return raw JSON; the caller runs it through `normalize_match_analysis`,
//! so a backend only has to get the content right, not the exact shape.
//! `AppState` holds an `Arc<dyn MatchAnalyzer>`, chosen at startup via config.

use async_trait::async_trait;
use serde_json::{json, Map, Value};

use crate::errors::AppError;
use crate::extraction::prompts::{match_prompt, MATCH_SYSTEM_ROLE};
use crate::llm_client::prompts::json_system;
use crate::llm_client::{LlmClient, UsageReport};
use crate::models::{CandidateRecord, JobRecord};
use crate::reconcile::fields::*;
use crate::reconcile::normalizer::NOT_PROVIDED;
use crate::reconcile::Record;

// ────────────────────────────────────────────────────────────────────────────
// Trait definition
// ────────────────────────────────────────────────────────────────────────────

/// Un-normalized analysis plus what producing it cost.
#[derive(Debug)]
pub struct RawAnalysis {
    pub value: Value,
    pub usage: UsageReport,
}

/// Implement this to swap backends without touching the handler.
#[async_trait]
pub trait MatchAnalyzer: Send + Sync {
    async fn analyze(&self, candidate: &Record, job: &Record) -> Result<RawAnalysis, AppError>;

    /// Short backend name stored alongside each analysis.
    fn backend(&self) -> &'static str;
}

// ────────────────────────────────────────────────────────────────────────────
// LlmMatchAnalyzer
// ────────────────────────────────────────────────────────────────────────────

pub struct LlmMatchAnalyzer(pub LlmClient);

#[async_trait]
impl MatchAnalyzer for LlmMatchAnalyzer {
    async fn analyze(&self, candidate: &Record, job: &Record) -> Result<RawAnalysis, AppError> {
        let candidate_json = serde_json::to_string_pretty(candidate)
            .map_err(|e| AppError::Internal(e.into()))?;
        let job_json =
            serde_json::to_string_pretty(job).map_err(|e| AppError::Internal(e.into()))?;

        let output = self
            .0
            .call_json::<Value>(
                &match_prompt(&candidate_json, &job_json),
                &json_system(MATCH_SYSTEM_ROLE),
            )
            .await
            .map_err(|e| AppError::Llm(format!("Failed to analyze match: {e}")))?;

        Ok(RawAnalysis {
            value: output.value,
            usage: output.usage,
        })
    }

    fn backend(&self) -> &'static str {
        "llm"
    }
}

// ────────────────────────────────────────────────────────────────────────────
// KeywordMatchAnalyzer
// ────────────────────────────────────────────────────────────────────────────

/// Deterministic analyzer that scores candidate skills against the job's
/// required skills.
///
/// Algorithm:
/// 1. For each required skill (technical weighted 1.0, soft 0.5):
///    - exact skill match (case-insensitive) → strength 1.0
///    - substring either way, or mentioned in a position title → strength 0.6
///    - no match → strength 0.0
/// 2. score = Σ(strength × weight) / Σ(weight) × 100, rating = score / 10
/// 3. Skills under 0.4 become missing expectations.
pub struct KeywordMatchAnalyzer;

#[async_trait]
impl MatchAnalyzer for KeywordMatchAnalyzer {
    async fn analyze(&self, candidate: &Record, job: &Record) -> Result<RawAnalysis, AppError> {
        Ok(RawAnalysis {
            value: keyword_analysis(
                &CandidateRecord::from_normalized(candidate),
                &JobRecord::from_normalized(job),
            ),
            usage: UsageReport::default(),
        })
    }

    fn backend(&self) -> &'static str {
        "keyword"
    }
}

const TECHNICAL_WEIGHT: f32 = 1.0;
const SOFT_WEIGHT: f32 = 0.5;
const SHORTLIST_SCORE: u32 = 70;

/// Weighted skill coverage.
#[derive(Debug, Clone, PartialEq)]
pub struct SkillCoverage {
    /// 0 – 100
    pub score: u32,
    pub gaps: Vec<String>,
}

fn skill_strength(skill: &str, candidate: &CandidateRecord) -> f32 {
    let wanted = skill.to_lowercase();

    if candidate.skills.iter().any(|s| s.to_lowercase() == wanted) {
        return 1.0;
    }

    let partial = candidate.skills.iter().any(|s| {
        let have = s.to_lowercase();
        have.contains(&wanted) || wanted.contains(&have)
    }) || candidate
        .experience
        .iter()
        .any(|e| e.position.to_lowercase().contains(&wanted));

    if partial {
        0.6
    } else {
        0.0
    }
}

pub fn skill_coverage(candidate: &CandidateRecord, job: &JobRecord) -> SkillCoverage {
    let weighted = job
        .required_skills
        .technical
        .iter()
        .map(|s| (s, TECHNICAL_WEIGHT))
        .chain(job.required_skills.soft.iter().map(|s| (s, SOFT_WEIGHT)));

    let mut total_weight = 0.0_f32;
    let mut total_score = 0.0_f32;
    let mut gaps = Vec::new();

    for (skill, weight) in weighted {
        let strength = skill_strength(skill, candidate);
        total_weight += weight;
        total_score += strength * weight;
        if strength < 0.4 {
            gaps.push(skill.clone());
        }
    }

    let score = if total_weight > 0.0 {
        ((total_score / total_weight) * 100.0).round() as u32
    } else {
        0
    };
    SkillCoverage { score, gaps }
}

/// Builds a human-readable recommendation string from score and gaps.
fn build_recommendation(score: u32, gaps: &[String]) -> String {
    let top_gaps: Vec<&str> = gaps.iter().take(3).map(String::as_str).collect();

    if score >= 80 {
        "Strong fit. The candidate's skills cover the key job requirements.".to_string()
    } else if score >= 60 {
        format!(
            "Moderate fit ({score}/100). Probe during screening for: {}.",
            top_gaps.join(", ")
        )
    } else {
        format!(
            "Low fit ({score}/100). Significant gaps: {}.",
            top_gaps.join(", ")
        )
    }
}

/// "Match" when any past employer has the preferred kind, else "No match".
fn preference_match(preference: &str, observed: &[String]) -> String {
    if preference == NOT_PROVIDED || preference.trim().is_empty() {
        return "No preference stated".to_string();
    }
    let wanted = preference.to_lowercase();
    let hits = observed
        .iter()
        .filter(|kind| wanted.contains(&kind.to_lowercase()))
        .count();
    if hits > 0 {
        format!("Match ({hits} of {} roles)", observed.len())
    } else {
        "No match".to_string()
    }
}

fn stability_summary(candidate: &CandidateRecord) -> String {
    let roles = candidate.experience.len();
    if roles == 0 {
        return NOT_PROVIDED.to_string();
    }
    let average = candidate.total_experience_years / roles as f64;
    let verdict = if average >= 2.0 { "Stable" } else { "Frequent moves" };
    format!("{verdict}: average tenure {average:.1} years across {roles} roles")
}

fn keyword_analysis(candidate: &CandidateRecord, job: &JobRecord) -> Value {
    let coverage = skill_coverage(candidate, job);
    let rating = (coverage.score as f32 / 10.0).round() as u32;

    let recommendation = if job.required_skills.technical.is_empty()
        && job.required_skills.soft.is_empty()
    {
        "No required skills found in the job description; cannot score fit.".to_string()
    } else {
        build_recommendation(coverage.score, &coverage.gaps)
    };

    let company_types: Vec<String> = candidate
        .experience
        .iter()
        .filter_map(|e| e.company_type.clone().map(String::from))
        .collect();
    let business_types: Vec<String> = candidate
        .experience
        .iter()
        .filter_map(|e| e.business_type.clone().map(String::from))
        .collect();

    let company_analysis: Vec<Value> = candidate
        .experience
        .iter()
        .map(|e| {
            let mut entry = Map::new();
            entry.insert(COMPANY_NAME.into(), json!(e.company_name));
            if let Some(kind) = &e.company_type {
                entry.insert(COMPANY_TYPE.into(), json!(kind));
            }
            if let Some(model) = &e.business_type {
                entry.insert(BUSINESS_MODEL.into(), json!(model));
            }
            Value::Object(entry)
        })
        .collect();

    let universities: Vec<&str> = candidate
        .education
        .iter()
        .map(|e| e.college_university.as_str())
        .collect();
    let degrees: Vec<&str> = candidate
        .education
        .iter()
        .map(|e| e.course_degree.as_str())
        .collect();

    json!({
        SUGGESTED_ROLE: job.job_title,
        AI_RATING: rating,
        SHOULD_BE_SHORTLISTED: coverage.score >= SHORTLIST_SCORE,
        COMPANY_TYPE_MATCH: preference_match(&job.company_type_preference, &company_types),
        BUSINESS_TYPE_MATCH: preference_match(&job.business_type_preference, &business_types),
        STABILITY_ASSESSMENT: stability_summary(candidate),
        COMPANY_ANALYSIS: company_analysis,
        EDUCATION_ASSESSMENT: {
            UNIVERSITY_ASSESSMENT: universities.join(", "),
            COURSE_RELEVANCE: format!(
                "Required: {}; holds: {}",
                job.education_requirements,
                degrees.join(", ")
            ),
        },
        MISSING_EXPECTATIONS: coverage.gaps,
        OVERALL_RECOMMENDATION: recommendation,
    })
}

// ────────────────────────────────────────────────────────────────────────────
// Tests
// ────────────────────────────────────────────────────────────────────────────
