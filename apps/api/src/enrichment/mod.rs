//! Company enrichment: backfills company facts the resume did not state
//! (type, business model, headcount, revenue, funding) from web search
//! snippets.
//!
//! Enrichment runs after normalization and only fills facts that are null.
//! It never fails an ingest: lookup errors are logged and skipped.

pub mod search;

use async_trait::async_trait;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Map, Value};
use thiserror::Error;
use tracing::{debug, warn};

use crate::reconcile::coerce::{canonical_business_model, canonical_company_type};
use crate::reconcile::fields::{
    BUSINESS_TYPE, COMPANY_NAME, COMPANY_TYPE, EXPERIENCE, FUNDING, NUMBER_OF_EMPLOYEES, REVENUE,
};
use crate::reconcile::normalizer::NOT_FOUND;
use crate::reconcile::Record;

pub use search::SearchEnricher;

#[derive(Debug, Error)]
pub enum EnrichmentError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("Search API error {status}: {body}")]
    Api { status: u16, body: String },
}

/// Facts found for one company. `None` means nothing was found.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CompanyFacts {
    pub company_type: Option<String>,
    pub business_type: Option<String>,
    pub number_of_employees: Option<String>,
    pub revenue: Option<String>,
    pub funding: Option<String>,
}

impl CompanyFacts {
    fn pairs(&self) -> [(&'static str, Option<&String>); 5] {
        [
            (COMPANY_TYPE, self.company_type.as_ref()),
            (BUSINESS_TYPE, self.business_type.as_ref()),
            (NUMBER_OF_EMPLOYEES, self.number_of_employees.as_ref()),
            (REVENUE, self.revenue.as_ref()),
            (FUNDING, self.funding.as_ref()),
        ]
    }
}

#[async_trait]
pub trait CompanyEnricher: Send + Sync {
    async fn lookup(&self, company: &str) -> Result<CompanyFacts, EnrichmentError>;
}

/// Used when no search credentials are configured.
pub struct NoopEnricher;

#[async_trait]
impl CompanyEnricher for NoopEnricher {
    async fn lookup(&self, _company: &str) -> Result<CompanyFacts, EnrichmentError> {
        Ok(CompanyFacts::default())
    }
}

const FACT_FIELDS: [&str; 5] = [COMPANY_TYPE, BUSINESS_TYPE, NUMBER_OF_EMPLOYEES, REVENUE, FUNDING];

fn needs_enrichment(entry: &Map<String, Value>) -> bool {
    FACT_FIELDS
        .iter()
        .any(|field| entry.get(*field).map_or(true, Value::is_null))
}

fn fill_nulls(entry: &mut Map<String, Value>, facts: &CompanyFacts) -> bool {
    let mut filled = false;
    for (field, found) in facts.pairs() {
        let Some(found) = found else { continue };
        if entry.get(field).map_or(true, Value::is_null) {
            let value = match field {
                COMPANY_TYPE => canonical_company_type(&json!(found)),
                BUSINESS_TYPE => canonical_business_model(&json!(found)),
                _ => json!(found),
            };
            entry.insert(field.to_string(), value);
            filled = true;
        }
    }
    filled
}

/// Backfills null company facts on every experience entry of a normalized
/// candidate. Returns how many entries gained at least one fact.
pub async fn enrich_experience(enricher: &dyn CompanyEnricher, record: &mut Record) -> usize {
    let Some(Value::Array(entries)) = record.get_mut(EXPERIENCE) else {
        return 0;
    };

    let mut enriched = 0;
    for entry in entries.iter_mut().filter_map(Value::as_object_mut) {
        let company = match entry.get(COMPANY_NAME).and_then(Value::as_str) {
            Some(name) if !name.trim().is_empty() && name != NOT_FOUND => name.to_string(),
            _ => continue,
        };
        if !needs_enrichment(entry) {
            continue;
        }

        match enricher.lookup(&company).await {
            Ok(facts) => {
                if fill_nulls(entry, &facts) {
                    debug!(company = %company, ?facts, "company facts backfilled");
                    enriched += 1;
                }
            }
            Err(e) => warn!(company = %company, "company enrichment failed: {e}"),
        }
    }
    enriched
}

// ────────────────────────────────────────────────────────────────────────────
// Snippet heuristics
// ────────────────────────────────────────────────────────────────────────────

static BUSINESS_MODEL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\b(b2b2c|b2b|b2c)\b").expect("valid business model regex"));

static EMPLOYEES: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)(\d[\d,]*(?:\s*-\s*\d[\d,]*)?\+?)\s*(?:employees|staff|people)")
        .expect("valid employees regex")
});

const MONEY: &str = r"(\$\s?\d[\d,.]*\s*(?:billion|million|bn|mn|m|k)?)\b";

static REVENUE_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)revenues?[^.$]{{0,40}}?{MONEY}")).expect("valid revenue regex")
});

static FUNDING_AMOUNT: Lazy<Regex> = Lazy::new(|| {
    Regex::new(&format!(r"(?i)(?:raised|funding|investment)[^.$]{{0,40}}?{MONEY}"))
        .expect("valid funding regex")
});

const PRODUCT_MARKERS: &[&str] = &["saas", "platform", "product", "software company", "app "];
const SERVICE_MARKERS: &[&str] = &["services", "consulting", "consultancy", "outsourcing", "agency"];

fn count_markers(text: &str, markers: &[&str]) -> usize {
    markers.iter().map(|m| text.matches(m).count()).sum()
}

fn first_capture(re: &Regex, text: &str) -> Option<String> {
    re.captures(text)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().trim().to_string())
}

/// Reads company facts out of search result titles and snippets.
pub fn facts_from_snippets(snippets: &[String]) -> CompanyFacts {
    let text = snippets.join(" \n ");
    let lower = text.to_lowercase();

    let product = count_markers(&lower, PRODUCT_MARKERS);
    let service = count_markers(&lower, SERVICE_MARKERS);
    let company_type = match product.cmp(&service) {
        _ if product == 0 && service == 0 => None,
        std::cmp::Ordering::Greater => Some("Product".to_string()),
        std::cmp::Ordering::Less => Some("Service".to_string()),
        std::cmp::Ordering::Equal => None,
    };

    let business_type = first_capture(&BUSINESS_MODEL, &text).map(|m| m.to_uppercase());

    CompanyFacts {
        company_type,
        business_type,
        number_of_employees: first_capture(&EMPLOYEES, &text),
        revenue: first_capture(&REVENUE_AMOUNT, &text),
        funding: first_capture(&FUNDING_AMOUNT, &text),
    }
}
