use anyhow::{bail, Context, Result};

use crate::llm_client::{LlmSettings, DEFAULT_API_URL, DEFAULT_COST_PER_1K_TOKENS, DEFAULT_MODEL};

/// Which backend produces match analyses.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AnalyzerKind {
    Llm,
    Keyword,
}

impl AnalyzerKind {
    fn parse(value: &str) -> Result<Self> {
        match value.trim().to_lowercase().as_str() {
            "llm" => Ok(Self::Llm),
            "keyword" => Ok(Self::Keyword),
            other => bail!("MATCH_ANALYZER must be 'llm' or 'keyword', got '{other}'"),
        }
    }
}

/// Google Custom Search credentials; enrichment is off without them.
#[derive(Debug, Clone)]
pub struct SearchConfig {
    pub api_key: String,
    pub engine_id: String,
}

/// Application configuration loaded from environment variables.
/// Startup fails if required variables are missing.
#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub s3_bucket: String,
    pub s3_endpoint: String,
    pub aws_access_key_id: String,
    pub aws_secret_access_key: String,
    pub anthropic_api_key: String,
    pub port: u16,
    pub rust_log: String,
    pub llm_api_url: String,
    pub llm_model: String,
    pub llm_cost_per_1k_tokens: f64,
    pub match_analyzer: AnalyzerKind,
    pub search: Option<SearchConfig>,
}

impl Config {
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok(); // load .env if present; ignore if missing
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds the config from any key lookup so parsing can be tested
    /// without touching the process environment.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let require = |key: &str| {
            lookup(key).with_context(|| format!("Required environment variable '{key}' is not set"))
        };
        let optional = |key: &str, default: &str| lookup(key).unwrap_or_else(|| default.to_string());

        let search = match (lookup("GOOGLE_SEARCH_API_KEY"), lookup("GOOGLE_SEARCH_ENGINE_ID")) {
            (Some(api_key), Some(engine_id)) if !api_key.is_empty() && !engine_id.is_empty() => {
                Some(SearchConfig { api_key, engine_id })
            }
            _ => None,
        };

        Ok(Config {
            database_url: require("DATABASE_URL")?,
            s3_bucket: require("S3_BUCKET")?,
            s3_endpoint: require("S3_ENDPOINT")?,
            aws_access_key_id: require("AWS_ACCESS_KEY_ID")?,
            aws_secret_access_key: require("AWS_SECRET_ACCESS_KEY")?,
            anthropic_api_key: require("ANTHROPIC_API_KEY")?,
            port: optional("PORT", "8080")
                .parse::<u16>()
                .context("PORT must be a valid port number")?,
            rust_log: optional("RUST_LOG", "info"),
            llm_api_url: optional("LLM_API_URL", DEFAULT_API_URL),
            llm_model: optional("LLM_MODEL", DEFAULT_MODEL),
            llm_cost_per_1k_tokens: match lookup("LLM_COST_PER_1K_TOKENS") {
                Some(raw) => raw
                    .parse::<f64>()
                    .context("LLM_COST_PER_1K_TOKENS must be a number")?,
                None => DEFAULT_COST_PER_1K_TOKENS,
            },
            match_analyzer: AnalyzerKind::parse(&optional("MATCH_ANALYZER", "llm"))?,
            search,
        })
    }

    pub fn llm_settings(&self) -> LlmSettings {
        let mut settings = LlmSettings::new(self.anthropic_api_key.clone());
        settings.api_url = self.llm_api_url.clone();
        settings.model = self.llm_model.clone();
        settings.cost_per_1k_tokens = self.llm_cost_per_1k_tokens;
        settings
    }
}
