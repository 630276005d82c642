//! Duration Parser: best-effort extraction of a start/end interval from the
//! many shapes a model uses for employment dates.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::reconcile::mapper::map_fields;
use crate::reconcile::synonyms::{fields, DURATION_MAPPING};

pub const NOT_SPECIFIED: &str = "Not specified";
pub const PRESENT: &str = "Present";

const PRESENT_MARKERS: &[&str] = &["present", "current", "now", "ongoing", "till date", "to date"];

static MONTH_NAME: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)\b(jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)").expect("valid month regex")
});

/// A single date-like token: "Jan 2020", "Sept. 2019", "03/2021", "Present".
static DATE_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)\b(?:(?:jan|feb|mar|apr|may|jun|jul|aug|sep|oct|nov|dec)[a-z]*\.?[\s,'/-]*\d{2,4}|\d{1,2}/\d{2,4}|present|current|now|ongoing)\b",
    )
    .expect("valid date token regex")
});

static SPACED_HYPHEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)(?:\s+-\s*|\s*-\s+)(.+)$").expect("valid range regex"));

/// Start/end pair of loosely formatted dates. Unknown keys of a structured
/// duration ride along in `extra`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DateInterval {
    #[serde(rename = "StartDate")]
    pub start: String,
    #[serde(rename = "EndDate")]
    pub end: String,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl DateInterval {
    pub fn unspecified() -> Self {
        Self::new(NOT_SPECIFIED, NOT_SPECIFIED)
    }

    fn new(start: impl Into<String>, end: impl Into<String>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
            extra: Map::new(),
        }
    }

    /// Splits into trimmed halves. Empty halves become "Not specified" and a
    /// present marker on the end becomes "Present".
    fn from_halves(start: &str, end: &str) -> Self {
        Self::new(side_or_unspecified(start), canonical_end(end))
    }

    fn open_ended(whole: &str) -> Self {
        Self::new(whole.trim(), NOT_SPECIFIED)
    }

    /// `{"StartDate", "EndDate", ..extra}` in that order.
    pub fn to_map(&self) -> Map<String, Value> {
        let mut map = Map::with_capacity(2 + self.extra.len());
        map.insert(fields::START_DATE.into(), Value::String(self.start.clone()));
        map.insert(fields::END_DATE.into(), Value::String(self.end.clone()));
        for (key, value) in &self.extra {
            map.insert(key.clone(), value.clone());
        }
        map
    }

    pub fn to_value(&self) -> Value {
        Value::Object(self.to_map())
    }
}

pub fn is_present_marker(text: &str) -> bool {
    let lower = text.trim().to_lowercase();
    PRESENT_MARKERS.contains(&lower.as_str())
}

/// False for empty text and the "Not specified" sentinel.
pub fn is_specified(text: &str) -> bool {
    let trimmed = text.trim();
    !trimmed.is_empty() && !trimmed.eq_ignore_ascii_case(NOT_SPECIFIED)
}

fn side_or_unspecified(text: &str) -> String {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        NOT_SPECIFIED.to_string()
    } else {
        trimmed.to_string()
    }
}

fn canonical_end(text: &str) -> String {
    if is_present_marker(text) {
        PRESENT.to_string()
    } else {
        side_or_unspecified(text)
    }
}

/// Renders one side of a structured duration as text; null is "missing".
fn side_text(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}

/// Parses any JSON shape into a [`DateInterval`]. Never fails.
pub fn parse_duration(value: &Value) -> DateInterval {
    match value {
        Value::Null => DateInterval::unspecified(),
        Value::String(text) => parse_duration_text(text),
        Value::Object(raw) => parse_duration_object(raw),
        other => DateInterval::new(other.to_string(), NOT_SPECIFIED),
    }
}

fn parse_duration_object(raw: &Map<String, Value>) -> DateInterval {
    let mut mapped = map_fields(raw, &DURATION_MAPPING);
    let start = side_text(mapped.get(fields::START_DATE));
    let end = side_text(mapped.get(fields::END_DATE));
    mapped.shift_remove(fields::START_DATE);
    mapped.shift_remove(fields::END_DATE);

    let mut interval = DateInterval::from_halves(&start, &end);
    interval.extra = mapped;
    interval
}

pub fn parse_duration_text(text: &str) -> DateInterval {
    let text = text.trim().replace(['\u{2013}', '\u{2014}'], "-");
    if text.is_empty() {
        return DateInterval::unspecified();
    }

    let lower = text.to_ascii_lowercase();
    if lower.contains(" to ") {
        return split_once_exactly(&text, &lower, " to ");
    }
    if text.contains(" - ") {
        return split_once_exactly(&text, &text, " - ");
    }
    if text.contains('-') {
        return split_bare_hyphen(&text);
    }

    DateInterval::open_ended(&text)
}

/// Splits on the separator when it occurs exactly once. `haystack` is `text`
/// or an ASCII-lowercased copy of it, so byte offsets line up.
fn split_once_exactly(text: &str, haystack: &str, separator: &str) -> DateInterval {
    let mut hits = haystack.match_indices(separator).map(|(index, _)| index);
    match (hits.next(), hits.next()) {
        (Some(index), None) => {
            DateInterval::from_halves(&text[..index], &text[index + separator.len()..])
        }
        _ => DateInterval::open_ended(text),
    }
}

fn split_bare_hyphen(text: &str) -> DateInterval {
    if !MONTH_NAME.is_match(text) {
        let parts: Vec<&str> = text.split('-').collect();
        return match parts.as_slice() {
            [start, end] => DateInterval::from_halves(start, end),
            _ => DateInterval::open_ended(text),
        };
    }

    // Month names may carry their own hyphen ("Jan-2020"), so split on tokens
    // rather than on the character.
    let tokens: Vec<&str> = DATE_TOKEN.find_iter(text).map(|m| m.as_str()).collect();
    if let [start, end] = tokens.as_slice() {
        return DateInterval::from_halves(start, end);
    }

    if let Some(caps) = SPACED_HYPHEN.captures(text) {
        return DateInterval::from_halves(&caps[1], &caps[2]);
    }

    DateInterval::open_ended(text)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn pair(interval: &DateInterval) -> (&str, &str) {
        (interval.start.as_str(), interval.end.as_str())
    }

    #[test]
    fn test_spaced_hyphen_with_present() {
        let parsed = parse_duration(&json!("Jan 2020 - Present"));
        assert_eq!(pair(&parsed), ("Jan 2020", "Present"));
    }

    #[test]
    fn test_bare_hyphen_years() {
        let parsed = parse_duration(&json!("2018-2020"));
        assert_eq!(pair(&parsed), ("2018", "2020"));
    }

    #[test]
    fn test_empty_and_null_are_unspecified() {
        assert_eq!(parse_duration(&json!("")), DateInterval::unspecified());
        assert_eq!(parse_duration(&json!("   ")), DateInterval::unspecified());
        assert_eq!(parse_duration(&Value::Null), DateInterval::unspecified());
    }

    #[test]
    fn test_to_separator_is_case_insensitive() {
        let parsed = parse_duration(&json!("Mar 2019 TO current"));
        assert_eq!(pair(&parsed), ("Mar 2019", "Present"));
    }

    #[test]
    fn test_en_dash_is_normalized() {
        let parsed = parse_duration(&json!("Jan 2018\u{2013}Dec 2019"));
        assert_eq!(pair(&parsed), ("Jan 2018", "Dec 2019"));
    }

    #[test]
    fn test_hyphenated_month_tokens_are_not_broken() {
        let parsed = parse_duration(&json!("Jan-2020-Mar-2021"));
        assert_eq!(pair(&parsed), ("Jan-2020", "Mar-2021"));

        let single = parse_duration(&json!("Jan-2020"));
        assert_eq!(pair(&single), ("Jan-2020", NOT_SPECIFIED));
    }

    #[test]
    fn test_month_text_falls_back_to_spaced_hyphen() {
        let parsed = parse_duration(&json!("Joined June 2019 -still there"));
        assert_eq!(pair(&parsed), ("Joined June 2019", "still there"));
    }

    #[test]
    fn test_ambiguous_splits_keep_the_whole_string() {
        let repeated = parse_duration(&json!("2015 to 2017 to 2019"));
        assert_eq!(pair(&repeated), ("2015 to 2017 to 2019", NOT_SPECIFIED));

        let iso = parse_duration(&json!("2018-01-15"));
        assert_eq!(pair(&iso), ("2018-01-15", NOT_SPECIFIED));

        let no_separator = parse_duration(&json!("Since 2019"));
        assert_eq!(pair(&no_separator), ("Since 2019", NOT_SPECIFIED));
    }

    #[test]
    fn test_empty_half_becomes_unspecified() {
        let parsed = parse_duration(&json!("2019 - "));
        assert_eq!(pair(&parsed), ("2019", NOT_SPECIFIED));
    }

    #[test]
    fn test_structured_duration_maps_keys_and_keeps_extras() {
        let parsed = parse_duration(&json!({
            "start_date": "Feb 2017",
            "end": "now",
            "note": "contract"
        }));
        assert_eq!(pair(&parsed), ("Feb 2017", "Present"));
        assert_eq!(parsed.extra["note"], "contract");
    }

    #[test]
    fn test_structured_duration_fills_missing_sides() {
        let parsed = parse_duration(&json!({"from": 2016, "to": null}));
        assert_eq!(pair(&parsed), ("2016", NOT_SPECIFIED));
        assert!(parsed.extra.is_empty());
    }

    #[test]
    fn test_other_types_become_open_ended_text() {
        let parsed = parse_duration(&json!(2019));
        assert_eq!(pair(&parsed), ("2019", NOT_SPECIFIED));
    }

    #[test]
    fn test_normalized_interval_parses_to_itself() {
        let first = parse_duration(&json!({"Start": "Jan 2020", "End": "Present", "remote": true}));
        let second = parse_duration(&first.to_value());
        assert_eq!(first, second);
        assert_eq!(
            first.to_value(),
            json!({"StartDate": "Jan 2020", "EndDate": "Present", "remote": true})
        );
    }
}
