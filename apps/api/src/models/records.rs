//! Typed views over normalized records.
//!
//! The normalizers produce `serde_json` maps so unrecognized keys survive.
//! These structs give handlers and collaborators named fields to work with.
//! `from_normalized` never fails: anything a field cannot hold is rendered
//! as text, and keys outside the schema land in `metadata`. Serializing a
//! view writes the canonical keys back in schema order, then the metadata.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::reconcile::coerce::{coerce_rating, NO, PENDING, REJECTED, SELECTED, YES};
use crate::reconcile::fields::*;
use crate::reconcile::normalizer::{
    CANDIDATE_FIELDS, COMPANY_ANALYSIS_FIELDS, EDUCATION_FIELDS, EXPERIENCE_FIELDS, JOB_FIELDS,
    MATCH_FIELDS, UNKNOWN,
};
use crate::reconcile::{parse_duration, DateInterval, Record};

// ────────────────────────────────────────────────────────────────────────────
// Canonical enums
// ────────────────────────────────────────────────────────────────────────────

/// A pipeline flag. Values the normalizer kept verbatim stay in `Other`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum YesNo {
    Yes,
    No,
    Unknown,
    Other(String),
}

impl From<String> for YesNo {
    fn from(value: String) -> Self {
        match value.as_str() {
            YES => Self::Yes,
            NO => Self::No,
            UNKNOWN => Self::Unknown,
            _ => Self::Other(value),
        }
    }
}

impl From<YesNo> for String {
    fn from(value: YesNo) -> Self {
        match value {
            YesNo::Yes => YES.to_string(),
            YesNo::No => NO.to_string(),
            YesNo::Unknown => UNKNOWN.to_string(),
            YesNo::Other(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum FinalResult {
    Pending,
    Selected,
    Rejected,
    Other(String),
}

impl From<String> for FinalResult {
    fn from(value: String) -> Self {
        match value.as_str() {
            PENDING => Self::Pending,
            SELECTED => Self::Selected,
            REJECTED => Self::Rejected,
            _ => Self::Other(value),
        }
    }
}

impl From<FinalResult> for String {
    fn from(value: FinalResult) -> Self {
        match value {
            FinalResult::Pending => PENDING.to_string(),
            FinalResult::Selected => SELECTED.to_string(),
            FinalResult::Rejected => REJECTED.to_string(),
            FinalResult::Other(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum CompanyType {
    Product,
    Service,
    /// Mixed or unrecognized descriptions, verbatim.
    Other(String),
}

impl From<String> for CompanyType {
    fn from(value: String) -> Self {
        match value.as_str() {
            "Product" => Self::Product,
            "Service" => Self::Service,
            _ => Self::Other(value),
        }
    }
}

impl From<CompanyType> for String {
    fn from(value: CompanyType) -> Self {
        match value {
            CompanyType::Product => "Product".to_string(),
            CompanyType::Service => "Service".to_string(),
            CompanyType::Other(text) => text,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum BusinessModel {
    B2B,
    B2C,
    B2B2C,
    /// Several models or free text, verbatim.
    Other(String),
}

impl From<String> for BusinessModel {
    fn from(value: String) -> Self {
        match value.as_str() {
            "B2B" => Self::B2B,
            "B2C" => Self::B2C,
            "B2B2C" => Self::B2B2C,
            _ => Self::Other(value),
        }
    }
}

impl From<BusinessModel> for String {
    fn from(value: BusinessModel) -> Self {
        match value {
            BusinessModel::B2B => "B2B".to_string(),
            BusinessModel::B2C => "B2C".to_string(),
            BusinessModel::B2B2C => "B2B2C".to_string(),
            BusinessModel::Other(text) => text,
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Field readers
// ────────────────────────────────────────────────────────────────────────────

fn text(map: &Map<String, Value>, key: &str) -> String {
    opt_text(map, key).unwrap_or_default()
}

fn opt_text(map: &Map<String, Value>, key: &str) -> Option<String> {
    match map.get(key) {
        None | Some(Value::Null) => None,
        Some(Value::String(s)) => Some(s.clone()),
        Some(other) => Some(other.to_string()),
    }
}

fn string_list(value: Option<&Value>) -> Vec<String> {
    let render = |v: &Value| match v {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    };
    match value {
        None | Some(Value::Null) => Vec::new(),
        Some(Value::Array(items)) => items.iter().map(render).collect(),
        Some(other) => vec![render(other)],
    }
}

/// Object elements of a list field. Bare strings in an entry list carry no
/// named fields and are skipped.
fn entries<T>(map: &Map<String, Value>, key: &str, build: fn(&Map<String, Value>) -> T) -> Vec<T> {
    match map.get(key) {
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_object)
            .map(build)
            .collect(),
        Some(Value::Object(single)) => vec![build(single)],
        _ => Vec::new(),
    }
}

fn metadata(map: &Map<String, Value>, known: &[&str]) -> Map<String, Value> {
    map.iter()
        .filter(|(key, _)| !known.contains(&key.as_str()))
        .map(|(key, value)| (key.clone(), value.clone()))
        .collect()
}

fn rating(map: &Map<String, Value>) -> u8 {
    map.get(AI_RATING).map(coerce_rating).unwrap_or(0) as u8
}

fn flag(map: &Map<String, Value>, key: &str, default: YesNo) -> YesNo {
    opt_text(map, key).map(YesNo::from).unwrap_or(default)
}

fn to_record<T: Serialize>(view: &T) -> Record {
    match serde_json::to_value(view) {
        Ok(Value::Object(map)) => map,
        _ => Record::new(),
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Candidate
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateRecord {
    #[serde(rename = "CandidateFullName")]
    pub full_name: String,
    #[serde(rename = "EmailAddress")]
    pub email: String,
    #[serde(rename = "PhoneNumber")]
    pub phone: String,
    #[serde(rename = "Skills")]
    pub skills: Vec<String>,
    #[serde(rename = "Experience")]
    pub experience: Vec<ExperienceEntry>,
    #[serde(rename = "Education")]
    pub education: Vec<EducationEntry>,
    #[serde(rename = "StabilityAssessment")]
    pub stability_assessment: String,
    #[serde(rename = "TotalExperienceYears")]
    pub total_experience_years: f64,
    #[serde(rename = "AIRating")]
    pub ai_rating: u8,
    #[serde(rename = "AIShortlisted")]
    pub ai_shortlisted: YesNo,
    #[serde(rename = "InternalShortlisted")]
    pub internal_shortlisted: YesNo,
    #[serde(rename = "InterviewInProcess")]
    pub interview_in_process: YesNo,
    #[serde(rename = "FinalResult")]
    pub final_result: FinalResult,
    #[serde(rename = "CandidateJoined")]
    pub candidate_joined: YesNo,
    /// Keys outside the schema, e.g. `resume_file` and `upload_date`.
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl CandidateRecord {
    pub fn from_normalized(map: &Record) -> Self {
        Self {
            full_name: text(map, CANDIDATE_FULL_NAME),
            email: text(map, EMAIL_ADDRESS),
            phone: text(map, PHONE_NUMBER),
            skills: string_list(map.get(SKILLS)),
            experience: entries(map, EXPERIENCE, ExperienceEntry::from_normalized),
            education: entries(map, EDUCATION, EducationEntry::from_normalized),
            stability_assessment: text(map, STABILITY_ASSESSMENT),
            total_experience_years: map
                .get(TOTAL_EXPERIENCE_YEARS)
                .and_then(Value::as_f64)
                .unwrap_or(0.0),
            ai_rating: rating(map),
            ai_shortlisted: flag(map, AI_SHORTLISTED, YesNo::No),
            internal_shortlisted: flag(map, INTERNAL_SHORTLISTED, YesNo::No),
            interview_in_process: flag(map, INTERVIEW_IN_PROCESS, YesNo::No),
            final_result: opt_text(map, FINAL_RESULT)
                .map(FinalResult::from)
                .unwrap_or(FinalResult::Pending),
            candidate_joined: flag(map, CANDIDATE_JOINED, YesNo::No),
            metadata: metadata(map, CANDIDATE_FIELDS),
        }
    }

    pub fn to_record(&self) -> Record {
        to_record(self)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperienceEntry {
    #[serde(rename = "CompanyName")]
    pub company_name: String,
    #[serde(rename = "Position")]
    pub position: String,
    #[serde(rename = "Duration")]
    pub duration: DateInterval,
    #[serde(rename = "CompanyType")]
    pub company_type: Option<CompanyType>,
    #[serde(rename = "BusinessType")]
    pub business_type: Option<BusinessModel>,
    #[serde(rename = "NumberOfEmployees")]
    pub number_of_employees: Option<String>,
    #[serde(rename = "Revenue")]
    pub revenue: Option<String>,
    #[serde(rename = "Funding")]
    pub funding: Option<String>,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl ExperienceEntry {
    pub fn from_normalized(map: &Map<String, Value>) -> Self {
        Self {
            company_name: text(map, COMPANY_NAME),
            position: text(map, POSITION),
            duration: parse_duration(map.get(DURATION).unwrap_or(&Value::Null)),
            company_type: opt_text(map, COMPANY_TYPE).map(CompanyType::from),
            business_type: opt_text(map, BUSINESS_TYPE).map(BusinessModel::from),
            number_of_employees: opt_text(map, NUMBER_OF_EMPLOYEES),
            revenue: opt_text(map, REVENUE),
            funding: opt_text(map, FUNDING),
            location: text(map, LOCATION),
            metadata: metadata(map, EXPERIENCE_FIELDS),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EducationEntry {
    #[serde(rename = "CollegeUniversity")]
    pub college_university: String,
    #[serde(rename = "CourseDegree")]
    pub course_degree: String,
    #[serde(rename = "GraduationYear")]
    pub graduation_year: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl EducationEntry {
    pub fn from_normalized(map: &Map<String, Value>) -> Self {
        Self {
            college_university: text(map, COLLEGE_UNIVERSITY),
            course_degree: text(map, COURSE_DEGREE),
            graduation_year: text(map, GRADUATION_YEAR),
            metadata: metadata(map, EDUCATION_FIELDS),
        }
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Job description
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct RequiredSkills {
    pub technical: Vec<String>,
    pub soft: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobRecord {
    #[serde(rename = "CompanyName")]
    pub company_name: String,
    #[serde(rename = "JobTitle")]
    pub job_title: String,
    #[serde(rename = "Location")]
    pub location: String,
    #[serde(rename = "RequiredSkills")]
    pub required_skills: RequiredSkills,
    #[serde(rename = "YearsOfExperienceRequired")]
    pub years_of_experience_required: String,
    #[serde(rename = "EducationRequirements")]
    pub education_requirements: String,
    #[serde(rename = "CompanyTypePreference")]
    pub company_type_preference: String,
    #[serde(rename = "BusinessTypePreference")]
    pub business_type_preference: String,
    #[serde(rename = "PreferredStability")]
    pub preferred_stability: String,
    #[serde(rename = "OtherImportantRequirements")]
    pub other_important_requirements: Vec<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl JobRecord {
    pub fn from_normalized(map: &Record) -> Self {
        let skills = map.get(REQUIRED_SKILLS).and_then(Value::as_object);
        let required_skills = RequiredSkills {
            technical: string_list(skills.and_then(|s| s.get("technical"))),
            soft: string_list(skills.and_then(|s| s.get("soft"))),
        };
        Self {
            company_name: text(map, COMPANY_NAME),
            job_title: text(map, JOB_TITLE),
            location: text(map, LOCATION),
            required_skills,
            years_of_experience_required: text(map, YEARS_OF_EXPERIENCE_REQUIRED),
            education_requirements: text(map, EDUCATION_REQUIREMENTS),
            company_type_preference: text(map, COMPANY_TYPE_PREFERENCE),
            business_type_preference: text(map, BUSINESS_TYPE_PREFERENCE),
            preferred_stability: text(map, PREFERRED_STABILITY),
            other_important_requirements: string_list(map.get(OTHER_IMPORTANT_REQUIREMENTS)),
            metadata: metadata(map, JOB_FIELDS),
        }
    }

    pub fn to_record(&self) -> Record {
        to_record(self)
    }
}

// ────────────────────────────────────────────────────────────────────────────
// Match analysis
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CompanyAnalysisEntry {
    #[serde(rename = "CompanyName")]
    pub company_name: String,
    #[serde(rename = "CompanyType")]
    pub company_type: String,
    #[serde(rename = "IndustrySector")]
    pub industry_sector: String,
    #[serde(rename = "BusinessModel")]
    pub business_model: String,
    #[serde(rename = "NotableAchievements")]
    pub notable_achievements: String,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl CompanyAnalysisEntry {
    pub fn from_normalized(map: &Map<String, Value>) -> Self {
        Self {
            company_name: text(map, COMPANY_NAME),
            company_type: text(map, COMPANY_TYPE),
            industry_sector: text(map, INDUSTRY_SECTOR),
            business_model: text(map, BUSINESS_MODEL),
            notable_achievements: text(map, NOTABLE_ACHIEVEMENTS),
            metadata: metadata(map, COMPANY_ANALYSIS_FIELDS),
        }
    }
}

/// A free-text assessment is kept in `university_assessment`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EducationAssessment {
    #[serde(
        rename = "UniversityAssessment",
        skip_serializing_if = "Option::is_none"
    )]
    pub university_assessment: Option<String>,
    #[serde(rename = "CourseRelevance", skip_serializing_if = "Option::is_none")]
    pub course_relevance: Option<String>,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl EducationAssessment {
    pub fn from_normalized(value: Option<&Value>) -> Self {
        match value {
            Some(Value::Object(map)) => Self {
                university_assessment: opt_text(map, UNIVERSITY_ASSESSMENT),
                course_relevance: opt_text(map, COURSE_RELEVANCE),
                metadata: metadata(map, &[UNIVERSITY_ASSESSMENT, COURSE_RELEVANCE]),
            },
            Some(Value::String(text)) => Self {
                university_assessment: Some(text.clone()),
                ..Self::default()
            },
            _ => Self::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchAnalysisRecord {
    #[serde(rename = "SuggestedRole")]
    pub suggested_role: String,
    #[serde(rename = "AIRating")]
    pub ai_rating: u8,
    #[serde(rename = "ShouldBeShortlisted")]
    pub should_be_shortlisted: YesNo,
    #[serde(rename = "CompanyTypeMatch")]
    pub company_type_match: String,
    #[serde(rename = "BusinessTypeMatch")]
    pub business_type_match: String,
    #[serde(rename = "StabilityAssessment")]
    pub stability_assessment: String,
    #[serde(rename = "CompanyAnalysis")]
    pub company_analysis: Vec<CompanyAnalysisEntry>,
    #[serde(rename = "EducationAssessment")]
    pub education_assessment: EducationAssessment,
    #[serde(rename = "MissingExpectations")]
    pub missing_expectations: Vec<String>,
    #[serde(rename = "OverallRecommendation")]
    pub overall_recommendation: String,
    #[serde(rename = "AIShortlisted")]
    pub ai_shortlisted: YesNo,
    #[serde(rename = "InternalShortlisted")]
    pub internal_shortlisted: YesNo,
    #[serde(rename = "InterviewInProcess")]
    pub interview_in_process: YesNo,
    #[serde(rename = "FinalResult")]
    pub final_result: FinalResult,
    #[serde(rename = "CandidateJoined")]
    pub candidate_joined: YesNo,
    #[serde(flatten)]
    pub metadata: Map<String, Value>,
}

impl MatchAnalysisRecord {
    pub fn from_normalized(map: &Record) -> Self {
        Self {
            suggested_role: text(map, SUGGESTED_ROLE),
            ai_rating: rating(map),
            should_be_shortlisted: flag(map, SHOULD_BE_SHORTLISTED, YesNo::No),
            company_type_match: text(map, COMPANY_TYPE_MATCH),
            business_type_match: text(map, BUSINESS_TYPE_MATCH),
            stability_assessment: text(map, STABILITY_ASSESSMENT),
            company_analysis: entries(map, COMPANY_ANALYSIS, CompanyAnalysisEntry::from_normalized),
            education_assessment: EducationAssessment::from_normalized(
                map.get(EDUCATION_ASSESSMENT),
            ),
            missing_expectations: string_list(map.get(MISSING_EXPECTATIONS)),
            overall_recommendation: text(map, OVERALL_RECOMMENDATION),
            ai_shortlisted: flag(map, AI_SHORTLISTED, YesNo::No),
            internal_shortlisted: flag(map, INTERNAL_SHORTLISTED, YesNo::No),
            interview_in_process: flag(map, INTERVIEW_IN_PROCESS, YesNo::No),
            final_result: opt_text(map, FINAL_RESULT)
                .map(FinalResult::from)
                .unwrap_or(FinalResult::Pending),
            candidate_joined: flag(map, CANDIDATE_JOINED, YesNo::Unknown),
            metadata: metadata(map, MATCH_FIELDS),
        }
    }

    pub fn to_record(&self) -> Record {
        to_record(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::reconcile::{normalize_candidate, normalize_job, normalize_match_analysis};
    use chrono::NaiveDate;
    use serde_json::json;

    fn today() -> NaiveDate {
        NaiveDate::from_ymd_opt(2024, 1, 1).unwrap()
    }

    #[test]
    fn test_candidate_view_round_trips_normalized_output() {
        let normalized = normalize_candidate(
            &json!({
                "name": "Ada Lovelace",
                "email": "ada@example.com",
                "skills": ["Python", "Leadership"],
                "experience": [{
                    "company": "Analytical Engines",
                    "title": "Engineer",
                    "duration": "Jan 2020 - Present",
                    "company_type": "product company",
                    "business_model": "b2b saas"
                }],
                "education": [{"university": "Cambridge", "degree": "BSc", "year": "2015"}],
                "resume_file": "ada.pdf"
            }),
            today(),
        );

        let view = CandidateRecord::from_normalized(&normalized);
        assert_eq!(view.full_name, "Ada Lovelace");
        assert_eq!(view.experience[0].company_type, Some(CompanyType::Product));
        assert_eq!(view.experience[0].business_type, Some(BusinessModel::B2B));
        assert_eq!(view.experience[0].duration.end, "Present");
        assert_eq!(view.final_result, FinalResult::Pending);
        assert_eq!(view.metadata["resume_file"], "ada.pdf");

        assert_eq!(view.to_record(), normalized);
    }

    #[test]
    fn test_candidate_view_of_empty_map_is_total() {
        let view = CandidateRecord::from_normalized(&Record::new());
        assert!(view.skills.is_empty());
        assert_eq!(view.ai_rating, 0);
        assert_eq!(view.internal_shortlisted, YesNo::No);
    }

    #[test]
    fn test_verbatim_flags_survive_as_other() {
        let normalized = normalize_match_analysis(&json!({
            "rating": 6,
            "should_be_shortlisted": "Maybe"
        }));
        let view = MatchAnalysisRecord::from_normalized(&normalized);
        assert_eq!(view.should_be_shortlisted, YesNo::Other("Maybe".into()));
        assert_eq!(view.candidate_joined, YesNo::Unknown);
        assert_eq!(view.to_record()[SHOULD_BE_SHORTLISTED], "Maybe");
    }

    #[test]
    fn test_match_view_round_trips_normalized_output() {
        let normalized = normalize_match_analysis(&json!({
            "suggested_role": "Backend Engineer",
            "ai_rating": 8,
            "company_analysis": [{"company_name": "Acme", "industry": "Fintech"}],
            "education_assessment": {"university_assessment": "Tier 1"},
            "missing_expectations": ["Kubernetes"]
        }));
        let view = MatchAnalysisRecord::from_normalized(&normalized);
        assert_eq!(view.final_result, FinalResult::Selected);
        assert_eq!(view.company_analysis[0].company_name, "Acme");
        assert_eq!(view.to_record(), normalized);
    }

    #[test]
    fn test_job_view_reads_skill_groups() {
        let normalized = normalize_job(&json!({
            "title": "Data Engineer",
            "skills": ["SQL", "Communication"],
            "other_requirements": "Night shifts"
        }));
        let view = JobRecord::from_normalized(&normalized);
        assert_eq!(view.required_skills.technical, vec!["SQL"]);
        assert_eq!(view.required_skills.soft, vec!["Communication"]);
        assert_eq!(view.other_important_requirements, vec!["Night shifts"]);
        assert_eq!(view.to_record(), normalized);
    }

    #[test]
    fn test_free_text_education_assessment() {
        let assessment = EducationAssessment::from_normalized(Some(&json!("Strong")));
        assert_eq!(assessment.university_assessment.as_deref(), Some("Strong"));
        assert_eq!(assessment.course_relevance, None);
    }
}
