//! Value Coercer: turns loosely-typed model output into canonical values.
//!
//! Every function here is total: unparseable input falls back to a documented
//! default or is returned verbatim, never an error.

use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::{json, Value};

pub const YES: &str = "Yes";
pub const NO: &str = "No";

pub const PENDING: &str = "Pending";
pub const SELECTED: &str = "Selected";
pub const REJECTED: &str = "Rejected";

pub const RATING_MIN: i64 = 0;
pub const RATING_MAX: i64 = 10;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit regex"));

static BUSINESS_MODEL_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(b2b2c|b2b|b2c)\b").expect("valid business model regex")
});

const TRUTHY: &[&str] = &["yes", "true", "1", "y", "recommended", "strongly recommended"];
const FALSY: &[&str] = &["no", "false", "0", "n", "not recommended"];

const UNKNOWN_MARKERS: &[&str] = &[
    "",
    "n/a",
    "na",
    "none",
    "null",
    "unknown",
    "not specified",
    "not found",
    "not available",
];

/// Terms that mark a required skill as technical (case-insensitive substring).
pub const TECHNICAL_INDICATORS: [&str; 30] = [
    "python",
    "java",
    "javascript",
    "c++",
    "machine learning",
    "deep learning",
    "data",
    "cloud",
    "database",
    "sql",
    "nosql",
    "tensorflow",
    "pytorch",
    "docker",
    "kubernetes",
    "aws",
    "gcp",
    "azure",
    "programming",
    "coding",
    "development",
    "algorithm",
    "nlp",
    "computer vision",
    "mlops",
    "devops",
    "framework",
    "react",
    "linux",
    "microservices",
];

// ────────────────────────────────────────────────────────────────────────────
// Ratings
// ────────────────────────────────────────────────────────────────────────────

/// Numeric reading of a rating, or `None` when no number can be recovered.
///
/// Numbers are taken as-is (floats rounded). Strings are parsed as integers
/// first, then the first run of digits is used ("7 out of 10" → 7).
pub fn strict_rating(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n
            .as_i64()
            .or_else(|| n.as_f64().map(|f| f.round() as i64)),
        Value::String(s) => {
            let trimmed = s.trim();
            trimmed.parse::<i64>().ok().or_else(|| {
                DIGIT_RUN
                    .find(trimmed)
                    .and_then(|m| m.as_str().parse::<i64>().ok())
            })
        }
        _ => None,
    }
}

/// Rating clamped to 0–10; anything unreadable becomes 0.
pub fn coerce_rating(value: &Value) -> i64 {
    strict_rating(value)
        .unwrap_or(RATING_MIN)
        .clamp(RATING_MIN, RATING_MAX)
}

// ────────────────────────────────────────────────────────────────────────────
// Yes / No
// ────────────────────────────────────────────────────────────────────────────

/// Maps truthy/falsy spellings onto "Yes"/"No". Ambiguous values ("Maybe")
/// are returned unchanged.
pub fn canonical_yes_no(value: &Value) -> Value {
    let token = match value {
        Value::Bool(true) => return json!(YES),
        Value::Bool(false) => return json!(NO),
        Value::String(s) => s.trim().to_lowercase(),
        Value::Number(n) => n.to_string(),
        other => return other.clone(),
    };

    if TRUTHY.contains(&token.as_str()) {
        json!(YES)
    } else if FALSY.contains(&token.as_str()) {
        json!(NO)
    } else {
        value.clone()
    }
}

/// "Yes" when the flag holds, "No" otherwise.
pub fn yes_no(flag: bool) -> Value {
    json!(if flag { YES } else { NO })
}

/// Pipeline stage spelled in any case becomes "Pending"/"Selected"/"Rejected".
/// Other values are returned unchanged.
pub fn canonical_final_result(value: &Value) -> Value {
    let Value::String(raw) = value else {
        return value.clone();
    };
    match raw.trim().to_lowercase().as_str() {
        "pending" => json!(PENDING),
        "selected" => json!(SELECTED),
        "rejected" => json!(REJECTED),
        _ => value.clone(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Skills
// ────────────────────────────────────────────────────────────────────────────

pub fn is_technical_skill(skill: &str) -> bool {
    let lower = skill.to_lowercase();
    TECHNICAL_INDICATORS
        .iter()
        .any(|indicator| lower.contains(indicator))
}

/// Splits required skills into `{"technical": [...], "soft": [...]}`.
///
/// Accepts a flat list, a dict of arbitrarily-named buckets (flattened, bucket
/// names discarded) or a delimited string. Order within each bucket follows
/// the input order.
pub fn split_required_skills(value: &Value) -> Value {
    let mut terms = Vec::new();
    collect_skill_terms(value, &mut terms);

    let (technical, soft): (Vec<String>, Vec<String>) =
        terms.into_iter().partition(|term| is_technical_skill(term));

    json!({ "technical": technical, "soft": soft })
}

/// Flattens a candidate's skills into a list of strings. Duplicates are kept.
pub fn skill_list(value: &Value) -> Value {
    let mut terms = Vec::new();
    collect_skill_terms(value, &mut terms);
    json!(terms)
}

/// Only a top-level string is treated as a delimited list. Items of a list or
/// bucket are whole skills, so "Python (Django, Flask)" stays one term.
fn collect_skill_terms(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::String(s) => out.extend(
            s.split([',', ';', '\n'])
                .map(str::trim)
                .filter(|term| !term.is_empty())
                .map(str::to_string),
        ),
        other => collect_skill_items(other, out),
    }
}

fn collect_skill_items(value: &Value, out: &mut Vec<String>) {
    match value {
        Value::Null => {}
        Value::String(s) => {
            let term = s.trim();
            if !term.is_empty() {
                out.push(term.to_string());
            }
        }
        Value::Array(items) => items.iter().for_each(|item| collect_skill_items(item, out)),
        Value::Object(buckets) => buckets
            .values()
            .for_each(|bucket| collect_skill_items(bucket, out)),
        other => out.push(other.to_string()),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Company facts
// ────────────────────────────────────────────────────────────────────────────

fn is_unknown_marker(lower: &str) -> bool {
    UNKNOWN_MARKERS.contains(&lower)
}

/// "Product" / "Service" / null, or the original text when it is something else.
pub fn canonical_company_type(value: &Value) -> Value {
    let Value::String(raw) = value else {
        return value.clone();
    };
    let lower = raw.trim().to_lowercase();
    if is_unknown_marker(&lower) {
        return Value::Null;
    }

    let product = lower.contains("product");
    let service = ["service", "consult", "outsourc"]
        .iter()
        .any(|marker| lower.contains(marker));

    match (product, service) {
        (true, false) => json!("Product"),
        (false, true) => json!("Service"),
        _ => value.clone(),
    }
}

/// Canonical "B2B" / "B2C" / "B2B2C" when the text names exactly one model.
/// Text naming several models is kept verbatim; unknown markers become null.
pub fn canonical_business_model(value: &Value) -> Value {
    let Value::String(raw) = value else {
        return value.clone();
    };
    let lower = raw.trim().to_lowercase();
    if is_unknown_marker(&lower) {
        return Value::Null;
    }

    let mut models: Vec<String> = Vec::new();
    for token in BUSINESS_MODEL_TOKEN.find_iter(raw) {
        let token = token.as_str().to_uppercase();
        if !models.contains(&token) {
            models.push(token);
        }
    }

    match models.as_slice() {
        [single] => json!(single),
        _ => value.clone(),
    }
}
