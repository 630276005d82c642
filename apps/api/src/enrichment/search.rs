use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::Deserialize;
use tracing::debug;

use crate::config::SearchConfig;
use crate::enrichment::{facts_from_snippets, CompanyEnricher, CompanyFacts, EnrichmentError};

pub const GOOGLE_SEARCH_URL: &str = "https://www.googleapis.com/customsearch/v1";

/// Results per query; the API caps a page at 10.
const RESULTS_PER_QUERY: u8 = 5;

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    items: Vec<SearchItem>,
}

#[derive(Debug, Deserialize)]
struct SearchItem {
    #[serde(default)]
    title: String,
    #[serde(default)]
    snippet: String,
}

/// Google Custom Search backed enricher.
#[derive(Clone)]
pub struct SearchEnricher {
    client: Client,
    base_url: String,
    api_key: String,
    engine_id: String,
}

impl SearchEnricher {
    pub fn new(config: &SearchConfig) -> Result<Self, EnrichmentError> {
        Self::with_base_url(config, GOOGLE_SEARCH_URL)
    }

    pub fn with_base_url(config: &SearchConfig, base_url: &str) -> Result<Self, EnrichmentError> {
        let client = Client::builder().timeout(Duration::from_secs(30)).build()?;
        Ok(Self {
            client,
            base_url: base_url.to_string(),
            api_key: config.api_key.clone(),
            engine_id: config.engine_id.clone(),
        })
    }

    fn query_for(company: &str) -> String {
        format!("{company} company employees revenue funding business model")
    }
}

#[async_trait]
impl CompanyEnricher for SearchEnricher {
    async fn lookup(&self, company: &str) -> Result<CompanyFacts, EnrichmentError> {
        let query = Self::query_for(company);
        let num = RESULTS_PER_QUERY.to_string();

        let response = self
            .client
            .get(&self.base_url)
            .query(&[
                ("key", self.api_key.as_str()),
                ("cx", self.engine_id.as_str()),
                ("q", query.as_str()),
                ("num", num.as_str()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EnrichmentError::Api {
                status: status.as_u16(),
                body,
            });
        }

        let results: SearchResponse = response.json().await?;
        debug!(company, results = results.items.len(), "company search complete");

        let snippets: Vec<String> = results
            .items
            .into_iter()
            .map(|item| format!("{}. {}", item.title, item.snippet))
            .collect();
        Ok(facts_from_snippets(&snippets))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use wiremock::matchers::{method, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn config() -> SearchConfig {
        SearchConfig {
            api_key: "g-key".into(),
            engine_id: "cx-1".into(),
        }
    }

    #[tokio::test]
    async fn test_lookup_sends_credentials_and_parses_snippets() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .and(query_param("key", "g-key"))
            .and(query_param("cx", "cx-1"))
            .and(query_param("num", "5"))
            .and(query_param(
                "q",
                "Acme company employees revenue funding business model",
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "items": [
                    {"title": "Acme - B2B logistics SaaS", "link": "https://acme.test",
                     "snippet": "Acme employs 250 people worldwide."},
                    {"title": "Acme raises $12 million", "link": "https://news.test",
                     "snippet": "The platform raised $12 million led by Example Ventures."}
                ]
            })))
            .expect(1)
            .mount(&server)
            .await;

        let enricher = SearchEnricher::with_base_url(&config(), &server.uri()).unwrap();
        let facts = enricher.lookup("Acme").await.unwrap();
        assert_eq!(facts.company_type.as_deref(), Some("Product"));
        assert_eq!(facts.business_type.as_deref(), Some("B2B"));
        assert_eq!(facts.number_of_employees.as_deref(), Some("250"));
        assert_eq!(facts.funding.as_deref(), Some("$12 million"));
    }

    #[tokio::test]
    async fn test_empty_result_set_is_not_an_error() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "searchInformation": {"totalResults": "0"}
            })))
            .mount(&server)
            .await;

        let enricher = SearchEnricher::with_base_url(&config(), &server.uri()).unwrap();
        assert_eq!(enricher.lookup("Nobody Inc").await.unwrap(), CompanyFacts::default());
    }

    #[tokio::test]
    async fn test_quota_error_is_reported() {
        let server = MockServer::start().await;
        Mock::given(method("GET"))
            .respond_with(ResponseTemplate::new(429).set_body_string("rate limited"))
            .mount(&server)
            .await;

        let enricher = SearchEnricher::with_base_url(&config(), &server.uri()).unwrap();
        assert!(matches!(
            enricher.lookup("Acme").await,
            Err(EnrichmentError::Api { status: 429, .. })
        ));
    }
}
