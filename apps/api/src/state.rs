use std::sync::Arc;

use aws_sdk_s3::Client as S3Client;
use sqlx::PgPool;

use crate::config::Config;
use crate::enrichment::CompanyEnricher;
use crate::llm_client::LlmClient;
use crate::matching::MatchAnalyzer;

/// Shared application state injected into all route handlers via Axum extractors.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub s3: S3Client,
    pub llm: LlmClient,
    pub config: Config,
    /// Match backend. Default: LlmMatchAnalyzer. Swap via MATCH_ANALYZER.
    pub analyzer: Arc<dyn MatchAnalyzer>,
    /// Company fact lookup. NoopEnricher unless search credentials are set.
    pub enricher: Arc<dyn CompanyEnricher>,
}
