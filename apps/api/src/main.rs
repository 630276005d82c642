mod candidates;
mod config;
mod db;
mod enrichment;
mod errors;
mod extraction;
mod jobs;
mod llm_client;
mod matching;
mod models;
mod reconcile;
mod routes;
mod state;
mod store;

use anyhow::Result;
use aws_config::Region;
use aws_sdk_s3::config::Credentials;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use crate::config::{AnalyzerKind, Config};
use crate::db::{create_pool, run_migrations};
use crate::enrichment::{CompanyEnricher, NoopEnricher, SearchEnricher};
use crate::llm_client::LlmClient;
use crate::matching::{KeywordMatchAnalyzer, LlmMatchAnalyzer, MatchAnalyzer};
use crate::routes::build_router;
use crate::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Load configuration first (fails on missing required env vars)
    let config = Config::from_env()?;

    // Initialize structured logging
    tracing_subscriber::registry()
        .with(EnvFilter::try_from_default_env().unwrap_or_else(|_| {
            EnvFilter::new(format!("{}={}", env!("CARGO_PKG_NAME"), &config.rust_log))
        }))
        .with(tracing_subscriber::fmt::layer())
        .init();

    info!("Starting screener API v{}", env!("CARGO_PKG_VERSION"));

    // Initialize PostgreSQL
    let db = create_pool(&config.database_url).await?;
    run_migrations(&db).await?;

    // Initialize S3 / MinIO
    let s3 = build_s3_client(&config).await;
    info!("S3 client initialized");

    // Initialize LLM client
    let llm = LlmClient::new(config.llm_settings())?;
    info!("LLM client initialized (model: {})", llm.model());

    let analyzer: Arc<dyn MatchAnalyzer> = match config.match_analyzer {
        AnalyzerKind::Llm => Arc::new(LlmMatchAnalyzer(llm.clone())),
        AnalyzerKind::Keyword => Arc::new(KeywordMatchAnalyzer),
    };
    info!("Match analyzer: {}", analyzer.backend());

    let enricher: Arc<dyn CompanyEnricher> = match &config.search {
        Some(search) => {
            info!("Company enrichment enabled (Google Custom Search)");
            Arc::new(SearchEnricher::new(search)?)
        }
        None => {
            info!("Company enrichment disabled (no search credentials)");
            Arc::new(NoopEnricher)
        }
    };

    // Build app state
    let state = AppState {
        db,
        s3,
        llm,
        config: config.clone(),
        analyzer,
        enricher,
    };

    // Build router
    let app = build_router(state)
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive());

    let addr: SocketAddr = format!("0.0.0.0:{}", config.port).parse()?;
    info!("Listening on {addr}");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Constructs an S3 client configured for MinIO (local) or AWS (production).
async fn build_s3_client(config: &Config) -> aws_sdk_s3::Client {
    let credentials = Credentials::new(
        &config.aws_access_key_id,
        &config.aws_secret_access_key,
        None,
        None,
        "screener-static",
    );

    let s3_config = aws_config::defaults(aws_config::BehaviorVersion::latest())
        .region(Region::new("us-east-1"))
        .credentials_provider(credentials)
        .endpoint_url(&config.s3_endpoint)
        .load()
        .await;

    aws_sdk_s3::Client::new(&s3_config)
}
