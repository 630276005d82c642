//! Experience Aggregator: total tenure in years across experience entries.

use chrono::{Datelike, NaiveDate};
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;
use tracing::trace;

use crate::reconcile::duration::{is_present_marker, is_specified, parse_duration};
use crate::reconcile::synonyms::fields;

const DAYS_PER_YEAR: f64 = 365.25;

/// Month + year shapes; parsed as the first day of that month.
const MONTH_YEAR_FORMATS: [&str; 7] = ["%b %Y", "%B %Y", "%b, %Y", "%b-%Y", "%m/%Y", "%m-%Y", "%Y-%m"];

const FULL_DATE_FORMATS: [&str; 6] = [
    "%Y-%m-%d",
    "%d/%m/%Y",
    "%d-%m-%Y",
    "%d %b %Y",
    "%d %B %Y",
    "%b %d, %Y",
];

/// chrono's `%Y` also takes one or two digits ("Jan 20" as year 20), so
/// parsed dates outside this range fall through to the bare-year reading.
const PLAUSIBLE_YEARS: std::ops::RangeInclusive<i32> = 1900..=2100;

static DIGIT_RUN: Lazy<Regex> = Lazy::new(|| Regex::new(r"\d+").expect("valid digit regex"));

fn plausible(date: NaiveDate) -> Option<NaiveDate> {
    PLAUSIBLE_YEARS.contains(&date.year()).then_some(date)
}

/// First format that parses to a year in [1900, 2100] wins.
pub fn parse_date(text: &str) -> Option<NaiveDate> {
    let text = text.trim();
    let first_of_month = format!("1 {text}");

    MONTH_YEAR_FORMATS
        .iter()
        .find_map(|format| {
            NaiveDate::parse_from_str(&first_of_month, &format!("%d {format}"))
                .ok()
                .and_then(plausible)
        })
        .or_else(|| {
            FULL_DATE_FORMATS.iter().find_map(|format| {
                NaiveDate::parse_from_str(text, format)
                    .ok()
                    .and_then(plausible)
            })
        })
}

/// Last four-digit year in [1900, 2100]. Without any four-digit run, the last
/// two-digit run is a short year taken as 20xx ("05/19" is 2019).
fn bare_year(text: &str) -> Option<i32> {
    let runs: Vec<&str> = DIGIT_RUN.find_iter(text).map(|m| m.as_str()).collect();

    if runs.iter().any(|run| run.len() == 4) {
        return runs
            .iter()
            .rev()
            .filter(|run| run.len() == 4)
            .filter_map(|run| run.parse::<i32>().ok())
            .find(|year| PLAUSIBLE_YEARS.contains(year));
    }

    runs.iter()
        .rev()
        .find(|run| run.len() == 2)
        .and_then(|run| run.parse::<i32>().ok())
        .map(|year| 2000 + year)
}

fn resolve_side(text: &str, today: NaiveDate) -> Option<NaiveDate> {
    if is_present_marker(text) {
        Some(today)
    } else {
        parse_date(text)
    }
}

fn resolve_year(text: &str, today: NaiveDate) -> Option<i32> {
    resolve_side(text, today)
        .map(|date| date.year())
        .or_else(|| bare_year(text))
}

/// Years covered by one entry's `Duration`, or `None` when it cannot be read.
fn entry_years(entry: &Value, today: NaiveDate) -> Option<f64> {
    let interval = parse_duration(entry.get(fields::DURATION)?);
    if !is_specified(&interval.start) || !is_specified(&interval.end) {
        return None;
    }

    if let (Some(start), Some(end)) = (
        resolve_side(&interval.start, today),
        resolve_side(&interval.end, today),
    ) {
        return Some((end - start).num_days() as f64 / DAYS_PER_YEAR);
    }

    let start = resolve_year(&interval.start, today)?;
    let end = resolve_year(&interval.end, today)?;
    Some(f64::from(end - start))
}

/// Sum of all readable intervals, floored at zero and rounded to one decimal.
/// Entries whose dates cannot be read contribute nothing. A reversed entry
/// (end before start) counts as 0 rather than reducing the total.
pub fn total_experience_years(entries: &[Value], today: NaiveDate) -> f64 {
    let total: f64 = entries
        .iter()
        .filter_map(|entry| {
            let years = entry_years(entry, today);
            if years.is_none() {
                trace!(?entry, "experience entry skipped in tenure total");
            }
            years
        })
        .map(|years| years.max(0.0))
        .sum();

    (total.max(0.0) * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn entry(start: &str, end: &str) -> Value {
        json!({"Duration": {"StartDate": start, "EndDate": end}})
    }

    #[test]
    fn test_two_entries_with_present_end() {
        let entries = [entry("Jan 2018", "Dec 2019"), entry("Jan 2020", "Present")];
        assert_eq!(total_experience_years(&entries, today()), 5.9);
    }

    #[test]
    fn test_date_formats() {
        let expected = NaiveDate::from_ymd_opt(2021, 3, 1);
        for text in ["Mar 2021", "March 2021", "Mar, 2021", "Mar-2021", "03/2021", "03-2021", "2021-03"] {
            assert_eq!(parse_date(text), expected, "{text}");
        }
        let day = NaiveDate::from_ymd_opt(2021, 3, 15);
        for text in ["2021-03-15", "15/03/2021", "15-03-2021", "15 Mar 2021", "15 March 2021", "Mar 15, 2021"] {
            assert_eq!(parse_date(text), day, "{text}");
        }
        assert_eq!(parse_date("sometime"), None);
    }

    #[test]
    fn test_bare_year_fallback() {
        assert_eq!(total_experience_years(&[entry("20", "22")], today()), 2.0);
        assert_eq!(
            total_experience_years(&[entry("Sept 2016", "Summer 2019")], today()),
            3.0
        );
    }

    #[test]
    fn test_short_years_are_not_read_as_ancient_dates() {
        assert_eq!(parse_date("Jan 20"), None);
        assert_eq!(parse_date("05/19"), None);
        assert_eq!(parse_date("1/1/24"), None);

        let range = [json!({"Duration": "Jan 20 - Present"})];
        assert_eq!(total_experience_years(&range, today()), 4.0);

        let split = [entry("05/19", "Present")];
        assert_eq!(total_experience_years(&split, today()), 5.0);
    }

    #[test]
    fn test_reversed_entry_does_not_reduce_total() {
        let entries = [entry("2022", "2019"), entry("Jan 2023", "Jan 2024")];
        assert_eq!(total_experience_years(&entries, today()), 1.0);
    }

    #[test]
    fn test_present_marker_with_unparsed_start_uses_years() {
        assert_eq!(
            total_experience_years(&[entry("early 2021", "current")], today()),
            3.0
        );
    }

    #[test]
    fn test_unreadable_entries_contribute_nothing() {
        let entries = [
            entry("Not specified", "Present"),
            entry("Jan 2022", "Not specified"),
            json!({"CompanyName": "Acme"}),
            json!("free text"),
            entry("whenever", "later"),
            entry("Jan 2023", "Jan 2024"),
        ];
        assert_eq!(total_experience_years(&entries, today()), 1.0);
    }

    #[test]
    fn test_total_is_never_negative() {
        assert_eq!(total_experience_years(&[entry("2022", "2019")], today()), 0.0);
        assert_eq!(total_experience_years(&[], today()), 0.0);
    }

    #[test]
    fn test_string_duration_is_parsed_on_the_fly() {
        let entries = [json!({"Duration": "2018-2020"})];
        assert_eq!(total_experience_years(&entries, today()), 2.0);
    }
}
