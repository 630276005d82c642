//! Record Normalizer: per-entity orchestration of mapping, recovery, coercion,
//! default fill, status derivation and metadata passthrough.
//!
//! Output key order is fixed: standard fields in schema order, then any
//! unrecognized raw keys in their original order. Running a normalizer on its
//! own output returns the same map.

use chrono::NaiveDate;
use serde_json::{json, Map, Value};
use tracing::debug;

use crate::reconcile::coerce::{
    canonical_business_model, canonical_company_type, canonical_final_result, canonical_yes_no,
    coerce_rating, skill_list, split_required_skills, strict_rating, yes_no, NO, PENDING,
    REJECTED, SELECTED,
};
use crate::reconcile::duration::{is_specified, parse_duration};
use crate::reconcile::experience::total_experience_years;
use crate::reconcile::mapper::{map_each_entry, map_fields, map_fields_with};
use crate::reconcile::synonyms::{
    fields::*, SynonymTable, CANDIDATE, COMPANY_ANALYSIS_ENTRY, EDUCATION_ASSESSMENT_OBJECT,
    EDUCATION_ENTRY, EXPERIENCE_ENTRY, JOB, MATCH_ANALYSIS,
};
use crate::reconcile::Record;

pub const NOT_FOUND: &str = "Not found";
pub const NOT_PROVIDED: &str = "Not provided";
pub const UNKNOWN: &str = "Unknown";

const SHORTLIST_THRESHOLD: i64 = 7;
const SELECTED_THRESHOLD: i64 = 8;
const REJECTED_THRESHOLD: i64 = 4;

/// Standard candidate fields in output order.
pub const CANDIDATE_FIELDS: &[&str] = &[
    CANDIDATE_FULL_NAME,
    EMAIL_ADDRESS,
    PHONE_NUMBER,
    SKILLS,
    EXPERIENCE,
    EDUCATION,
    STABILITY_ASSESSMENT,
    TOTAL_EXPERIENCE_YEARS,
    AI_RATING,
    AI_SHORTLISTED,
    INTERNAL_SHORTLISTED,
    INTERVIEW_IN_PROCESS,
    FINAL_RESULT,
    CANDIDATE_JOINED,
];

pub const EXPERIENCE_FIELDS: &[&str] = &[
    COMPANY_NAME,
    POSITION,
    DURATION,
    COMPANY_TYPE,
    BUSINESS_TYPE,
    NUMBER_OF_EMPLOYEES,
    REVENUE,
    FUNDING,
    LOCATION,
];

pub const EDUCATION_FIELDS: &[&str] = &[COLLEGE_UNIVERSITY, COURSE_DEGREE, GRADUATION_YEAR];

pub const JOB_FIELDS: &[&str] = &[
    COMPANY_NAME,
    JOB_TITLE,
    LOCATION,
    REQUIRED_SKILLS,
    YEARS_OF_EXPERIENCE_REQUIRED,
    EDUCATION_REQUIREMENTS,
    COMPANY_TYPE_PREFERENCE,
    BUSINESS_TYPE_PREFERENCE,
    PREFERRED_STABILITY,
    OTHER_IMPORTANT_REQUIREMENTS,
];

pub const MATCH_FIELDS: &[&str] = &[
    SUGGESTED_ROLE,
    AI_RATING,
    SHOULD_BE_SHORTLISTED,
    COMPANY_TYPE_MATCH,
    BUSINESS_TYPE_MATCH,
    STABILITY_ASSESSMENT,
    COMPANY_ANALYSIS,
    EDUCATION_ASSESSMENT,
    MISSING_EXPECTATIONS,
    OVERALL_RECOMMENDATION,
    AI_SHORTLISTED,
    INTERNAL_SHORTLISTED,
    INTERVIEW_IN_PROCESS,
    FINAL_RESULT,
    CANDIDATE_JOINED,
];

pub const COMPANY_ANALYSIS_FIELDS: &[&str] = &[
    COMPANY_NAME,
    COMPANY_TYPE,
    INDUSTRY_SECTOR,
    BUSINESS_MODEL,
    NOTABLE_ACHIEVEMENTS,
];

// ────────────────────────────────────────────────────────────────────────────
// Shared helpers
// ────────────────────────────────────────────────────────────────────────────

fn as_object(raw: &Value) -> Map<String, Value> {
    match raw {
        Value::Object(map) => map.clone(),
        _ => Map::new(),
    }
}

/// Last-chance recovery for standard fields the exact mapping missed: a
/// passthrough key whose loose form matches the field is moved onto it.
fn recover_missing(mapped: &mut Map<String, Value>, table: &SynonymTable, standard: &[&str]) {
    for &field in standard {
        if mapped.contains_key(field) {
            continue;
        }
        let candidate = mapped
            .keys()
            .find(|key| table.lookup(key).is_none() && table.lookup_loose(key) == Some(field))
            .cloned();

        if let Some(raw_key) = candidate {
            debug!(table = table.name, raw_key = %raw_key, field, "recovered field from loose key");
            if let Some(value) = mapped.shift_remove(&raw_key) {
                mapped.insert(field.to_string(), value);
            }
        }
    }
}

/// The value unless it is missing, null or blank text.
fn text_or(value: Option<Value>, default: &str) -> Value {
    match value {
        None | Some(Value::Null) => json!(default),
        Some(Value::String(s)) if s.trim().is_empty() => json!(default),
        Some(other) => other,
    }
}

/// The value unless missing; null stays null.
fn fact_or_null(value: Option<Value>) -> Value {
    value.unwrap_or(Value::Null)
}

/// Sequence view: null or missing is empty, a scalar or lone object becomes a
/// one-element sequence.
fn as_list(value: Option<Value>) -> Value {
    match value {
        None | Some(Value::Null) => json!([]),
        Some(Value::Array(items)) => Value::Array(items),
        Some(other) => json!([other]),
    }
}

/// Appends whatever is left in `mapped` (unrecognized raw keys) after the
/// standard fields.
fn append_passthrough(out: &mut Map<String, Value>, mapped: Map<String, Value>) {
    for (key, value) in mapped {
        out.entry(key).or_insert(value);
    }
}

fn present_or(value: Option<Value>, canonicalize: fn(&Value) -> Value, default: Value) -> Value {
    match value {
        None | Some(Value::Null) => default,
        Some(v) => canonicalize(&v),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate
// ────────────────────────────────────────────────────────────────────────────

/// Normalizes an extracted resume. `today` resolves "Present" end dates when
/// computing `TotalExperienceYears`.
pub fn normalize_candidate(raw: &Value, today: NaiveDate) -> Record {
    let source = as_object(raw);
    let mut mapped = map_fields(&source, &CANDIDATE);
    recover_missing(&mut mapped, &CANDIDATE, CANDIDATE_FIELDS);

    let mut out = Map::new();
    for field in [CANDIDATE_FULL_NAME, EMAIL_ADDRESS, PHONE_NUMBER] {
        out.insert(field.into(), text_or(mapped.shift_remove(field), NOT_FOUND));
    }

    let skills = mapped.shift_remove(SKILLS).unwrap_or(Value::Null);
    out.insert(SKILLS.into(), skill_list(&skills));

    let experience = map_each_entry(
        &as_list(mapped.shift_remove(EXPERIENCE)),
        normalize_experience_entry,
    );
    let education = map_each_entry(
        &as_list(mapped.shift_remove(EDUCATION)),
        normalize_education_entry,
    );
    out.insert(EXPERIENCE.into(), experience);
    out.insert(EDUCATION.into(), education);

    out.insert(
        STABILITY_ASSESSMENT.into(),
        text_or(mapped.shift_remove(STABILITY_ASSESSMENT), NOT_FOUND),
    );

    // Always recomputed; a model-supplied figure is discarded.
    mapped.shift_remove(TOTAL_EXPERIENCE_YEARS);
    let entries = out[EXPERIENCE].as_array().map(Vec::as_slice).unwrap_or_default();
    let total = total_experience_years(entries, today);
    out.insert(TOTAL_EXPERIENCE_YEARS.into(), json!(total));

    let rating = mapped.shift_remove(AI_RATING).unwrap_or(Value::Null);
    out.insert(AI_RATING.into(), json!(coerce_rating(&rating)));
    for flag in [AI_SHORTLISTED, INTERNAL_SHORTLISTED, INTERVIEW_IN_PROCESS] {
        out.insert(
            flag.into(),
            present_or(mapped.shift_remove(flag), canonical_yes_no, json!(NO)),
        );
    }
    out.insert(
        FINAL_RESULT.into(),
        present_or(
            mapped.shift_remove(FINAL_RESULT),
            canonical_final_result,
            json!(PENDING),
        ),
    );
    out.insert(
        CANDIDATE_JOINED.into(),
        present_or(mapped.shift_remove(CANDIDATE_JOINED), canonical_yes_no, json!(NO)),
    );

    append_passthrough(&mut out, mapped);
    out
}

fn normalize_experience_entry(entry: &Map<String, Value>) -> Map<String, Value> {
    let mut mapped = map_fields(entry, &EXPERIENCE_ENTRY);
    recover_missing(&mut mapped, &EXPERIENCE_ENTRY, EXPERIENCE_FIELDS);

    let mut interval = parse_duration(&mapped.shift_remove(DURATION).unwrap_or(Value::Null));
    let flat_start = mapped.shift_remove(START_DATE);
    let flat_end = mapped.shift_remove(END_DATE);
    if flat_start.is_some() || flat_end.is_some() {
        let flat = parse_duration(&json!({
            START_DATE: flat_start.unwrap_or(Value::Null),
            END_DATE: flat_end.unwrap_or(Value::Null),
        }));
        if !is_specified(&interval.start) {
            interval.start = flat.start;
        }
        if !is_specified(&interval.end) {
            interval.end = flat.end;
        }
    }

    let mut out = Map::new();
    out.insert(COMPANY_NAME.into(), text_or(mapped.shift_remove(COMPANY_NAME), NOT_FOUND));
    out.insert(POSITION.into(), text_or(mapped.shift_remove(POSITION), NOT_FOUND));
    out.insert(DURATION.into(), interval.to_value());
    out.insert(
        COMPANY_TYPE.into(),
        canonical_company_type(&fact_or_null(mapped.shift_remove(COMPANY_TYPE))),
    );
    out.insert(
        BUSINESS_TYPE.into(),
        canonical_business_model(&fact_or_null(mapped.shift_remove(BUSINESS_TYPE))),
    );
    for fact in [NUMBER_OF_EMPLOYEES, REVENUE, FUNDING] {
        out.insert(fact.into(), fact_or_null(mapped.shift_remove(fact)));
    }
    out.insert(LOCATION.into(), text_or(mapped.shift_remove(LOCATION), NOT_FOUND));

    append_passthrough(&mut out, mapped);
    out
}

fn normalize_education_entry(entry: &Map<String, Value>) -> Map<String, Value> {
    let mut mapped = map_fields(entry, &EDUCATION_ENTRY);
    recover_missing(&mut mapped, &EDUCATION_ENTRY, EDUCATION_FIELDS);

    let mut out = Map::new();
    for &field in EDUCATION_FIELDS {
        out.insert(field.into(), text_or(mapped.shift_remove(field), NOT_FOUND));
    }
    append_passthrough(&mut out, mapped);
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Job description
// ────────────────────────────────────────────────────────────────────────────

pub fn normalize_job(raw: &Value) -> Record {
    let source = as_object(raw);
    let mut mapped = map_fields(&source, &JOB);
    recover_missing(&mut mapped, &JOB, JOB_FIELDS);

    let mut out = Map::new();
    for field in [COMPANY_NAME, JOB_TITLE, LOCATION] {
        out.insert(field.into(), text_or(mapped.shift_remove(field), NOT_PROVIDED));
    }

    let skills = mapped.shift_remove(REQUIRED_SKILLS).unwrap_or(Value::Null);
    out.insert(REQUIRED_SKILLS.into(), split_required_skills(&skills));

    for field in [
        YEARS_OF_EXPERIENCE_REQUIRED,
        EDUCATION_REQUIREMENTS,
        COMPANY_TYPE_PREFERENCE,
        BUSINESS_TYPE_PREFERENCE,
        PREFERRED_STABILITY,
    ] {
        out.insert(field.into(), text_or(mapped.shift_remove(field), NOT_PROVIDED));
    }
    out.insert(
        OTHER_IMPORTANT_REQUIREMENTS.into(),
        as_list(mapped.shift_remove(OTHER_IMPORTANT_REQUIREMENTS)),
    );

    append_passthrough(&mut out, mapped);
    out
}

// ────────────────────────────────────────────────────────────────────────────
// Match analysis
// ────────────────────────────────────────────────────────────────────────────

/// Two spellings of the rating in one response: keep the larger when both
/// read as numbers, otherwise keep what was there first.
fn merge_rating(field: &str, existing: Value, incoming: Value) -> Value {
    if field != AI_RATING {
        return incoming;
    }
    match (strict_rating(&existing), strict_rating(&incoming)) {
        (Some(a), Some(b)) => {
            debug!(existing = a, incoming = b, "consolidating duplicate rating fields");
            json!(a.max(b))
        }
        _ => existing,
    }
}

fn final_result_for(rating: i64) -> &'static str {
    if rating >= SELECTED_THRESHOLD {
        SELECTED
    } else if rating <= REJECTED_THRESHOLD {
        REJECTED
    } else {
        PENDING
    }
}

pub fn normalize_match_analysis(raw: &Value) -> Record {
    let source = as_object(raw);
    let mut mapped = map_fields_with(&source, &MATCH_ANALYSIS, merge_rating);
    recover_missing(&mut mapped, &MATCH_ANALYSIS, MATCH_FIELDS);
    mapped.shift_remove(LEGACY_MATCH_SCORE);
    mapped.shift_remove(LEGACY_OVERALL_RATING);

    let mut out = Map::new();
    out.insert(
        SUGGESTED_ROLE.into(),
        text_or(mapped.shift_remove(SUGGESTED_ROLE), NOT_PROVIDED),
    );

    let rating = coerce_rating(&mapped.shift_remove(AI_RATING).unwrap_or(Value::Null));
    out.insert(AI_RATING.into(), json!(rating));

    let shortlist = present_or(
        mapped.shift_remove(SHOULD_BE_SHORTLISTED),
        canonical_yes_no,
        json!(NO),
    );
    out.insert(SHOULD_BE_SHORTLISTED.into(), shortlist.clone());

    for field in [COMPANY_TYPE_MATCH, BUSINESS_TYPE_MATCH, STABILITY_ASSESSMENT] {
        out.insert(field.into(), text_or(mapped.shift_remove(field), NOT_PROVIDED));
    }

    let companies = map_each_entry(
        &as_list(mapped.shift_remove(COMPANY_ANALYSIS)),
        normalize_company_analysis_entry,
    );
    out.insert(COMPANY_ANALYSIS.into(), companies);

    let education = match mapped.shift_remove(EDUCATION_ASSESSMENT) {
        None | Some(Value::Null) => json!({
            UNIVERSITY_ASSESSMENT: NOT_PROVIDED,
            COURSE_RELEVANCE: NOT_PROVIDED,
        }),
        Some(Value::Object(assessment)) => {
            Value::Object(map_fields(&assessment, &EDUCATION_ASSESSMENT_OBJECT))
        }
        Some(other) => other,
    };
    out.insert(EDUCATION_ASSESSMENT.into(), education);

    out.insert(
        MISSING_EXPECTATIONS.into(),
        as_list(mapped.shift_remove(MISSING_EXPECTATIONS)),
    );
    out.insert(
        OVERALL_RECOMMENDATION.into(),
        text_or(mapped.shift_remove(OVERALL_RECOMMENDATION), NOT_PROVIDED),
    );

    out.insert(
        AI_SHORTLISTED.into(),
        present_or(
            mapped.shift_remove(AI_SHORTLISTED),
            canonical_yes_no,
            yes_no(rating >= SHORTLIST_THRESHOLD),
        ),
    );
    for flag in [INTERNAL_SHORTLISTED, INTERVIEW_IN_PROCESS] {
        out.insert(
            flag.into(),
            present_or(mapped.shift_remove(flag), canonical_yes_no, shortlist.clone()),
        );
    }
    out.insert(
        FINAL_RESULT.into(),
        present_or(
            mapped.shift_remove(FINAL_RESULT),
            canonical_final_result,
            json!(final_result_for(rating)),
        ),
    );
    out.insert(
        CANDIDATE_JOINED.into(),
        present_or(
            mapped.shift_remove(CANDIDATE_JOINED),
            canonical_yes_no,
            json!(UNKNOWN),
        ),
    );

    append_passthrough(&mut out, mapped);
    out
}

fn normalize_company_analysis_entry(entry: &Map<String, Value>) -> Map<String, Value> {
    let mut mapped = map_fields(entry, &COMPANY_ANALYSIS_ENTRY);
    recover_missing(&mut mapped, &COMPANY_ANALYSIS_ENTRY, COMPANY_ANALYSIS_FIELDS);

    let mut out = Map::new();
    for &field in COMPANY_ANALYSIS_FIELDS {
        out.insert(field.into(), text_or(mapped.shift_remove(field), NOT_PROVIDED));
    }
    append_passthrough(&mut out, mapped);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    fn keys(record: &Record) -> Vec<&str> {
        record.keys().map(String::as_str).collect()
    }

    // ── candidate ──────────────────────────────────────────────────────────

    #[test]
    fn test_empty_candidate_gets_every_default() {
        let record = normalize_candidate(&json!({}), today());
        assert_eq!(keys(&record), CANDIDATE_FIELDS.to_vec());
        assert_eq!(record[CANDIDATE_FULL_NAME], NOT_FOUND);
        assert_eq!(record[SKILLS], json!([]));
        assert_eq!(record[EXPERIENCE], json!([]));
        assert_eq!(record[TOTAL_EXPERIENCE_YEARS], json!(0.0));
        assert_eq!(record[AI_RATING], 0);
        assert_eq!(record[INTERNAL_SHORTLISTED], "No");
        assert_eq!(record[FINAL_RESULT], "Pending");
        assert_eq!(record[CANDIDATE_JOINED], "No");
    }

    #[test]
    fn test_non_object_input_is_treated_as_empty() {
        for raw in [json!(null), json!("text"), json!([1, 2]), json!(7)] {
            assert_eq!(
                normalize_candidate(&raw, today()),
                normalize_candidate(&json!({}), today())
            );
            assert_eq!(normalize_job(&raw), normalize_job(&json!({})));
            assert_eq!(
                normalize_match_analysis(&raw),
                normalize_match_analysis(&json!({}))
            );
        }
    }

    #[test]
    fn test_synonym_spellings_converge() {
        let a = normalize_candidate(&json!({"full_name": "Ada", "email": "a@x.io"}), today());
        let b = normalize_candidate(&json!({"Candidate Name": "Ada", "E-mail": "a@x.io"}), today());
        let c = normalize_candidate(
            &json!({"CandidateFullName": "Ada", "EmailAddress": "a@x.io"}),
            today(),
        );
        assert_eq!(a, b);
        assert_eq!(b, c);
    }

    #[test]
    fn test_candidate_experience_is_normalized_and_totalled() {
        let raw = json!({
            "name": "Grace",
            "work_experience": [
                {"company": "Acme", "role": "Engineer", "duration": "Jan 2018 - Dec 2019",
                 "product_or_service": "product company", "business_model": "b2b"},
                {"employer": "Globex", "title": "Lead", "start_date": "Jan 2020", "end_date": "current"},
                "Freelance work"
            ],
            "total_experience": "12 years"
        });
        let record = normalize_candidate(&raw, today());
        let experience = record[EXPERIENCE].as_array().unwrap();

        assert_eq!(experience[0][COMPANY_NAME], "Acme");
        assert_eq!(experience[0][POSITION], "Engineer");
        assert_eq!(experience[0][COMPANY_TYPE], "Product");
        assert_eq!(experience[0][BUSINESS_TYPE], "B2B");
        assert_eq!(experience[0][FUNDING], Value::Null);
        assert_eq!(experience[0][LOCATION], NOT_FOUND);
        assert_eq!(
            experience[1][DURATION],
            json!({"StartDate": "Jan 2020", "EndDate": "Present"})
        );
        assert_eq!(experience[2], "Freelance work");
        assert_eq!(record[TOTAL_EXPERIENCE_YEARS], json!(5.9));
    }

    #[test]
    fn test_single_experience_object_becomes_a_list() {
        let raw = json!({"experience": {"company": "Initech"}});
        let record = normalize_candidate(&raw, today());
        let experience = record[EXPERIENCE].as_array().unwrap();
        assert_eq!(experience.len(), 1);
        assert_eq!(experience[0][COMPANY_NAME], "Initech");
        assert_eq!(
            experience[0][DURATION],
            json!({"StartDate": "Not specified", "EndDate": "Not specified"})
        );
    }

    #[test]
    fn test_education_defaults_per_entry() {
        let raw = json!({"education": [{"university": "MIT"}]});
        let record = normalize_candidate(&raw, today());
        assert_eq!(
            record[EDUCATION],
            json!([{"CollegeUniversity": "MIT", "CourseDegree": NOT_FOUND, "GraduationYear": NOT_FOUND}])
        );
    }

    #[test]
    fn test_loose_key_recovery() {
        let raw = json!({"1) Candidate-Full-Name": "Linus", "Phone  Number:": "555"});
        let record = normalize_candidate(&raw, today());
        assert_eq!(record[CANDIDATE_FULL_NAME], "Linus");
        assert_eq!(record[PHONE_NUMBER], "555");
        assert!(!record.contains_key("1) Candidate-Full-Name"));
        assert!(!record.contains_key("Phone  Number:"));
    }

    #[test]
    fn test_unknown_keys_pass_through_after_standard_fields() {
        let raw = json!({"linkedin": "in/ada", "name": "Ada", "resume_file": "ada.pdf"});
        let record = normalize_candidate(&raw, today());
        let tail: Vec<&str> = keys(&record)[CANDIDATE_FIELDS.len()..].to_vec();
        assert_eq!(tail, vec!["linkedin", "resume_file"]);
    }

    #[test]
    fn test_candidate_status_values_are_canonicalized() {
        let raw = json!({"ai_rating": "8/10", "internal_shortlisted": true, "final_result": "selected"});
        let record = normalize_candidate(&raw, today());
        assert_eq!(record[AI_RATING], 8);
        assert_eq!(record[INTERNAL_SHORTLISTED], "Yes");
        assert_eq!(record[FINAL_RESULT], "Selected");
    }

    #[test]
    fn test_candidate_normalization_is_idempotent() {
        let raw = json!({
            "Name": "Ada",
            "skills": "Rust, Go; SQL",
            "experience": [{"company": "Acme", "dates": {"from": "2019", "to": "now"}, "team": "core"}],
            "education": {"college": "ETH", "year": 2015},
            "notes": {"source": "referral"}
        });
        let once = normalize_candidate(&raw, today());
        let twice = normalize_candidate(&Value::Object(once.clone()), today());
        assert_eq!(once, twice);
    }

    // ── job ────────────────────────────────────────────────────────────────

    #[test]
    fn test_job_defaults_and_skill_split() {
        let raw = json!({
            "title": "Backend Engineer",
            "required skills": ["Python", "Communication"],
            "other_requirements": "Willing to travel"
        });
        let record = normalize_job(&raw);
        assert_eq!(keys(&record), JOB_FIELDS.to_vec());
        assert_eq!(record[JOB_TITLE], "Backend Engineer");
        assert_eq!(record[COMPANY_NAME], NOT_PROVIDED);
        assert_eq!(
            record[REQUIRED_SKILLS],
            json!({"technical": ["Python"], "soft": ["Communication"]})
        );
        assert_eq!(record[OTHER_IMPORTANT_REQUIREMENTS], json!(["Willing to travel"]));
    }

    #[test]
    fn test_job_normalization_is_idempotent() {
        let raw = json!({
            "company": "Acme",
            "skills": {"core": "AWS, Terraform", "bonus": ["Mentoring"]},
            "experience": "5+ years",
            "perks": ["remote"]
        });
        let once = normalize_job(&raw);
        assert_eq!(normalize_job(&Value::Object(once.clone())), once);
    }

    // ── match analysis ─────────────────────────────────────────────────────

    #[test]
    fn test_rating_consolidation_keeps_maximum() {
        let record = normalize_match_analysis(&json!({"Match score": 6, "Overall rating": 9}));
        assert_eq!(record[AI_RATING], 9);
        assert!(!record.contains_key(LEGACY_MATCH_SCORE));
        assert!(!record.contains_key(LEGACY_OVERALL_RATING));
    }

    #[test]
    fn test_legacy_rating_keys_never_survive() {
        let record = normalize_match_analysis(&json!({"MatchScore": "7", "OverallRating": 5}));
        assert_eq!(record[AI_RATING], 7);
        assert!(!record.contains_key(LEGACY_MATCH_SCORE));
        assert!(!record.contains_key(LEGACY_OVERALL_RATING));
    }

    #[test]
    fn test_unreadable_rating_conflict_keeps_first_value() {
        let record = normalize_match_analysis(&json!({"score": "n/a", "rating": 9}));
        assert_eq!(record[AI_RATING], 0);
    }

    #[test]
    fn test_shortlist_canonicalization() {
        let yes = normalize_match_analysis(&json!({"Should be shortlisted": "Recommended"}));
        let no = normalize_match_analysis(&json!({"shortlist": "Not recommended"}));
        let maybe = normalize_match_analysis(&json!({"shortlist": "Maybe"}));
        assert_eq!(yes[SHOULD_BE_SHORTLISTED], "Yes");
        assert_eq!(no[SHOULD_BE_SHORTLISTED], "No");
        assert_eq!(maybe[SHOULD_BE_SHORTLISTED], "Maybe");
        assert_eq!(maybe[INTERNAL_SHORTLISTED], "Maybe");
    }

    #[test]
    fn test_status_fields_derive_from_rating() {
        let strong = normalize_match_analysis(&json!({"rating": 8, "shortlist": "yes"}));
        assert_eq!(strong[AI_SHORTLISTED], "Yes");
        assert_eq!(strong[INTERNAL_SHORTLISTED], "Yes");
        assert_eq!(strong[INTERVIEW_IN_PROCESS], "Yes");
        assert_eq!(strong[FINAL_RESULT], "Selected");
        assert_eq!(strong[CANDIDATE_JOINED], "Unknown");

        let middling = normalize_match_analysis(&json!({"rating": "7 out of 10"}));
        assert_eq!(middling[AI_SHORTLISTED], "Yes");
        assert_eq!(middling[FINAL_RESULT], "Pending");

        let weak = normalize_match_analysis(&json!({"rating": 4}));
        assert_eq!(weak[AI_SHORTLISTED], "No");
        assert_eq!(weak[FINAL_RESULT], "Rejected");
    }

    #[test]
    fn test_existing_status_values_win_over_derivation() {
        let record = normalize_match_analysis(&json!({
            "rating": 9,
            "ai_shortlisted": "no",
            "final_result": "pending",
            "candidate_joined": "y"
        }));
        assert_eq!(record[AI_SHORTLISTED], "No");
        assert_eq!(record[FINAL_RESULT], "Pending");
        assert_eq!(record[CANDIDATE_JOINED], "Yes");
    }

    #[test]
    fn test_education_assessment_defaults_as_a_unit() {
        let absent = normalize_match_analysis(&json!({}));
        assert_eq!(
            absent[EDUCATION_ASSESSMENT],
            json!({"UniversityAssessment": NOT_PROVIDED, "CourseRelevance": NOT_PROVIDED})
        );

        let partial = normalize_match_analysis(&json!({
            "education assessment": {"university assessment": "Tier 1"}
        }));
        assert_eq!(
            partial[EDUCATION_ASSESSMENT],
            json!({"UniversityAssessment": "Tier 1"})
        );
    }

    #[test]
    fn test_company_analysis_entries_and_missing_expectations() {
        let record = normalize_match_analysis(&json!({
            "7. Company Analysis": [{"name": "Acme", "industry": "Fintech"}, "n/a"],
            "missing skills": "Kubernetes"
        }));
        let companies = record[COMPANY_ANALYSIS].as_array().unwrap();
        assert_eq!(companies[0][COMPANY_NAME], "Acme");
        assert_eq!(companies[0][INDUSTRY_SECTOR], "Fintech");
        assert_eq!(companies[0][NOTABLE_ACHIEVEMENTS], NOT_PROVIDED);
        assert_eq!(companies[1], "n/a");
        assert_eq!(record[MISSING_EXPECTATIONS], json!(["Kubernetes"]));
    }

    #[test]
    fn test_match_normalization_is_idempotent() {
        let raw = json!({
            "1. Suggested role": "Staff Engineer",
            "2. Match Score": "8",
            "9. Overall Rating": 6,
            "3. Shortlist recommendation": "strongly recommended",
            "company analysis": {"company": "Acme"},
            "education": "Strong",
            "model_version": "v2"
        });
        let once = normalize_match_analysis(&raw);
        assert_eq!(once[AI_RATING], 8);
        assert_eq!(normalize_match_analysis(&Value::Object(once.clone())), once);
        assert_eq!(once["model_version"], "v2");
    }
}
