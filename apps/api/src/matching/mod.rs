//! Matching: candidate vs job analysis through a pluggable analyzer, always
//! finished by the match-analysis normalizer.

pub mod analyzer;
pub mod handlers;

use tracing::info;

use crate::errors::AppError;
use crate::llm_client::UsageReport;
use crate::models::MatchAnalysisRecord;
use crate::reconcile::{normalize_match_analysis, Record};

pub use analyzer::{KeywordMatchAnalyzer, LlmMatchAnalyzer, MatchAnalyzer};

#[derive(Debug)]
pub struct MatchOutcome {
    pub record: Record,
    pub usage: UsageReport,
    pub backend: &'static str,
}

/// Runs the analyzer and normalizes whatever it produced.
pub async fn analyze_match(
    analyzer: &dyn MatchAnalyzer,
    candidate: &Record,
    job: &Record,
) -> Result<MatchOutcome, AppError> {
    let raw = analyzer.analyze(candidate, job).await?;
    let record = normalize_match_analysis(&raw.value);

    let view = MatchAnalysisRecord::from_normalized(&record);
    info!(
        backend = analyzer.backend(),
        rating = view.ai_rating,
        final_result = %String::from(view.final_result),
        tokens = raw.usage.tokens,
        "match analysis complete"
    );
    Ok(MatchOutcome {
        record,
        usage: raw.usage,
        backend: analyzer.backend(),
    })
}
