//! Synonym tables: static data mapping lower-cased key spellings to canonical field names.
//!
//! One table per entity. Tables are pure data: adding a spelling the model started
//! emitting is a one-line change here and never touches the normalizer.

use once_cell::sync::Lazy;
use regex::Regex;

/// Canonical field names shared by the normalizer, the typed records and the tests.
pub mod fields {
    // Candidate
    pub const CANDIDATE_FULL_NAME: &str = "CandidateFullName";
    pub const EMAIL_ADDRESS: &str = "EmailAddress";
    pub const PHONE_NUMBER: &str = "PhoneNumber";
    pub const SKILLS: &str = "Skills";
    pub const EXPERIENCE: &str = "Experience";
    pub const EDUCATION: &str = "Education";
    pub const STABILITY_ASSESSMENT: &str = "StabilityAssessment";
    pub const TOTAL_EXPERIENCE_YEARS: &str = "TotalExperienceYears";

    // Experience entry
    pub const COMPANY_NAME: &str = "CompanyName";
    pub const POSITION: &str = "Position";
    pub const DURATION: &str = "Duration";
    pub const START_DATE: &str = "StartDate";
    pub const END_DATE: &str = "EndDate";
    pub const COMPANY_TYPE: &str = "CompanyType";
    pub const BUSINESS_TYPE: &str = "BusinessType";
    pub const NUMBER_OF_EMPLOYEES: &str = "NumberOfEmployees";
    pub const REVENUE: &str = "Revenue";
    pub const FUNDING: &str = "Funding";
    pub const LOCATION: &str = "Location";

    // Education entry
    pub const COLLEGE_UNIVERSITY: &str = "CollegeUniversity";
    pub const COURSE_DEGREE: &str = "CourseDegree";
    pub const GRADUATION_YEAR: &str = "GraduationYear";

    // Job description
    pub const JOB_TITLE: &str = "JobTitle";
    pub const REQUIRED_SKILLS: &str = "RequiredSkills";
    pub const YEARS_OF_EXPERIENCE_REQUIRED: &str = "YearsOfExperienceRequired";
    pub const EDUCATION_REQUIREMENTS: &str = "EducationRequirements";
    pub const COMPANY_TYPE_PREFERENCE: &str = "CompanyTypePreference";
    pub const BUSINESS_TYPE_PREFERENCE: &str = "BusinessTypePreference";
    pub const PREFERRED_STABILITY: &str = "PreferredStability";
    pub const OTHER_IMPORTANT_REQUIREMENTS: &str = "OtherImportantRequirements";

    // Match analysis
    pub const SUGGESTED_ROLE: &str = "SuggestedRole";
    pub const AI_RATING: &str = "AIRating";
    pub const SHOULD_BE_SHORTLISTED: &str = "ShouldBeShortlisted";
    pub const COMPANY_TYPE_MATCH: &str = "CompanyTypeMatch";
    pub const BUSINESS_TYPE_MATCH: &str = "BusinessTypeMatch";
    pub const COMPANY_ANALYSIS: &str = "CompanyAnalysis";
    pub const EDUCATION_ASSESSMENT: &str = "EducationAssessment";
    pub const MISSING_EXPECTATIONS: &str = "MissingExpectations";
    pub const OVERALL_RECOMMENDATION: &str = "OverallRecommendation";
    pub const INDUSTRY_SECTOR: &str = "IndustrySector";
    pub const BUSINESS_MODEL: &str = "BusinessModel";
    pub const NOTABLE_ACHIEVEMENTS: &str = "NotableAchievements";
    pub const UNIVERSITY_ASSESSMENT: &str = "UniversityAssessment";
    pub const COURSE_RELEVANCE: &str = "CourseRelevance";

    // Pipeline status
    pub const AI_SHORTLISTED: &str = "AIShortlisted";
    pub const INTERNAL_SHORTLISTED: &str = "InternalShortlisted";
    pub const INTERVIEW_IN_PROCESS: &str = "InterviewInProcess";
    pub const FINAL_RESULT: &str = "FinalResult";
    pub const CANDIDATE_JOINED: &str = "CandidateJoined";

    // Legacy rating keys folded into AIRating
    pub const LEGACY_MATCH_SCORE: &str = "MatchScore";
    pub const LEGACY_OVERALL_RATING: &str = "OverallRating";
}

use fields::*;

/// A per-entity synonym table.
///
/// Lookup order: substring groups (`contains`) first, then exact lower-cased
/// synonyms, then the canonical names themselves (case-insensitive), so that an
/// already-normalized record maps onto itself.
#[derive(Debug)]
pub struct SynonymTable {
    pub name: &'static str,
    pub synonyms: &'static [(&'static str, &'static str)],
    pub contains: &'static [(&'static str, &'static str)],
}

static ENUMERATION_PREFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^\s*\d+\s*[.):-]\s*").expect("valid enumeration regex"));

/// Returns false for keys that cannot be looked up meaningfully: empty,
/// whitespace-only, purely numeric, or a stringified null.
pub fn is_lookup_key(key: &str) -> bool {
    let trimmed = key.trim();
    !trimmed.is_empty()
        && !trimmed.chars().all(|c| c.is_ascii_digit())
        && !trimmed.eq_ignore_ascii_case("null")
}

/// Loose key form used for last-chance recovery: lower-cased, leading
/// enumeration ("2. ") dropped, everything but letters and digits removed.
pub fn loose_key(key: &str) -> String {
    let lowered = key.to_lowercase();
    ENUMERATION_PREFIX
        .replace(&lowered, "")
        .chars()
        .filter(|c| c.is_alphanumeric())
        .collect()
}

impl SynonymTable {
    /// Exact (case-insensitive) lookup. Returns `None` for unmapped or invalid keys.
    pub fn lookup(&self, key: &str) -> Option<&'static str> {
        if !is_lookup_key(key) {
            return None;
        }
        let lower = key.trim().to_lowercase();

        if let Some((_, canonical)) = self
            .contains
            .iter()
            .find(|(needle, _)| lower.contains(needle))
        {
            return Some(*canonical);
        }

        if let Some((_, canonical)) = self.synonyms.iter().find(|(synonym, _)| *synonym == lower) {
            return Some(*canonical);
        }

        self.canonical_names()
            .find(|canonical| canonical.to_lowercase() == lower)
    }

    /// Loose lookup: compares punctuation- and enumeration-insensitive forms.
    pub fn lookup_loose(&self, key: &str) -> Option<&'static str> {
        if !is_lookup_key(key) {
            return None;
        }
        let loose = loose_key(key);
        if loose.is_empty() {
            return None;
        }

        self.synonyms
            .iter()
            .find(|(synonym, _)| loose_key(synonym) == loose)
            .map(|(_, canonical)| *canonical)
            .or_else(|| {
                self.canonical_names()
                    .find(|canonical| loose_key(canonical) == loose)
            })
    }

    /// True when the exact lookup maps the key.
    pub fn recognizes(&self, key: &str) -> bool {
        self.lookup(key).is_some()
    }

    fn canonical_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.synonyms
            .iter()
            .chain(self.contains.iter())
            .map(|(_, canonical)| *canonical)
    }
}

pub static CANDIDATE: SynonymTable = SynonymTable {
    name: "candidate",
    synonyms: &[
        ("candidate_full_name", CANDIDATE_FULL_NAME),
        ("candidate full name", CANDIDATE_FULL_NAME),
        ("candidate_name", CANDIDATE_FULL_NAME),
        ("candidate name", CANDIDATE_FULL_NAME),
        ("full_name", CANDIDATE_FULL_NAME),
        ("full name", CANDIDATE_FULL_NAME),
        ("name", CANDIDATE_FULL_NAME),
        ("candidate", CANDIDATE_FULL_NAME),
        ("email_address", EMAIL_ADDRESS),
        ("email address", EMAIL_ADDRESS),
        ("email", EMAIL_ADDRESS),
        ("e-mail", EMAIL_ADDRESS),
        ("phone_number", PHONE_NUMBER),
        ("phone number", PHONE_NUMBER),
        ("phone", PHONE_NUMBER),
        ("mobile", PHONE_NUMBER),
        ("mobile_number", PHONE_NUMBER),
        ("contact", PHONE_NUMBER),
        ("contact_number", PHONE_NUMBER),
        ("skills", SKILLS),
        ("technical_skills", SKILLS),
        ("technical skills", SKILLS),
        ("skill_set", SKILLS),
        ("key_skills", SKILLS),
        ("work_experience", EXPERIENCE),
        ("work experience", EXPERIENCE),
        ("experience", EXPERIENCE),
        ("professional_experience", EXPERIENCE),
        ("employment_history", EXPERIENCE),
        ("work_history", EXPERIENCE),
        ("companies", EXPERIENCE),
        ("education_details", EDUCATION),
        ("education", EDUCATION),
        ("educational_background", EDUCATION),
        ("academic_background", EDUCATION),
        ("academic_details", EDUCATION),
        ("overall_stability_assessment", STABILITY_ASSESSMENT),
        ("overall stability assessment", STABILITY_ASSESSMENT),
        ("stability_assessment", STABILITY_ASSESSMENT),
        ("stability assessment", STABILITY_ASSESSMENT),
        ("stability", STABILITY_ASSESSMENT),
        ("total_experience", TOTAL_EXPERIENCE_YEARS),
        ("total experience", TOTAL_EXPERIENCE_YEARS),
        ("total_experience_years", TOTAL_EXPERIENCE_YEARS),
        ("ai_rating", AI_RATING),
        ("ai rating", AI_RATING),
        ("ai_shortlisted", AI_SHORTLISTED),
        ("internal_shortlisted", INTERNAL_SHORTLISTED),
        ("interview_in_process", INTERVIEW_IN_PROCESS),
        ("final_result", FINAL_RESULT),
        ("candidate_joined", CANDIDATE_JOINED),
    ],
    contains: &[],
};

pub static EXPERIENCE_ENTRY: SynonymTable = SynonymTable {
    name: "experience",
    synonyms: &[
        ("company_name", COMPANY_NAME),
        ("company name", COMPANY_NAME),
        ("company", COMPANY_NAME),
        ("employer", COMPANY_NAME),
        ("organization", COMPANY_NAME),
        ("organisation", COMPANY_NAME),
        ("position", POSITION),
        ("role", POSITION),
        ("job_title", POSITION),
        ("job title", POSITION),
        ("title", POSITION),
        ("designation", POSITION),
        ("duration", DURATION),
        ("period", DURATION),
        ("tenure", DURATION),
        ("dates", DURATION),
        ("date_range", DURATION),
        ("start_date", START_DATE),
        ("start date", START_DATE),
        ("from", START_DATE),
        ("end_date", END_DATE),
        ("end date", END_DATE),
        ("to", END_DATE),
        ("until", END_DATE),
        ("product_or_service", COMPANY_TYPE),
        ("company_type", COMPANY_TYPE),
        ("company type", COMPANY_TYPE),
        ("business_type", BUSINESS_TYPE),
        ("business type", BUSINESS_TYPE),
        ("business_model", BUSINESS_TYPE),
        ("business model", BUSINESS_TYPE),
        ("number_of_employees", NUMBER_OF_EMPLOYEES),
        ("number of employees", NUMBER_OF_EMPLOYEES),
        ("employee_count", NUMBER_OF_EMPLOYEES),
        ("employees", NUMBER_OF_EMPLOYEES),
        ("company_size", NUMBER_OF_EMPLOYEES),
        ("headcount", NUMBER_OF_EMPLOYEES),
        ("size", NUMBER_OF_EMPLOYEES),
        ("revenue", REVENUE),
        ("annual_revenue", REVENUE),
        ("company_revenue", REVENUE),
        ("funding_received", FUNDING),
        ("funding received", FUNDING),
        ("funding", FUNDING),
        ("investment", FUNDING),
        ("company_location", LOCATION),
        ("company location", LOCATION),
        ("location", LOCATION),
        ("headquarters", LOCATION),
    ],
    contains: &[],
};

pub static EDUCATION_ENTRY: SynonymTable = SynonymTable {
    name: "education",
    synonyms: &[
        ("college_university_name", COLLEGE_UNIVERSITY),
        ("college_university", COLLEGE_UNIVERSITY),
        ("college/university", COLLEGE_UNIVERSITY),
        ("university", COLLEGE_UNIVERSITY),
        ("college", COLLEGE_UNIVERSITY),
        ("institution", COLLEGE_UNIVERSITY),
        ("school", COLLEGE_UNIVERSITY),
        ("course_degree", COURSE_DEGREE),
        ("course/degree", COURSE_DEGREE),
        ("degree", COURSE_DEGREE),
        ("qualification", COURSE_DEGREE),
        ("course", COURSE_DEGREE),
        ("program", COURSE_DEGREE),
        ("programme", COURSE_DEGREE),
        ("graduation_year", GRADUATION_YEAR),
        ("graduation year", GRADUATION_YEAR),
        ("year", GRADUATION_YEAR),
        ("completion_year", GRADUATION_YEAR),
        ("year_of_graduation", GRADUATION_YEAR),
        ("passing_year", GRADUATION_YEAR),
    ],
    contains: &[],
};

/// Keys of a structured duration. Any key mentioning "start" or "end" wins
/// over the exact entries.
pub static DURATION_MAPPING: SynonymTable = SynonymTable {
    name: "duration",
    synonyms: &[
        ("from", START_DATE),
        ("since", START_DATE),
        ("to", END_DATE),
        ("till", END_DATE),
        ("until", END_DATE),
    ],
    contains: &[("start", START_DATE), ("end", END_DATE)],
};

pub static JOB: SynonymTable = SynonymTable {
    name: "job",
    synonyms: &[
        ("company_name", COMPANY_NAME),
        ("company name", COMPANY_NAME),
        ("company", COMPANY_NAME),
        ("hiring_company", COMPANY_NAME),
        ("organization", COMPANY_NAME),
        ("employer", COMPANY_NAME),
        ("job_title", JOB_TITLE),
        ("job title", JOB_TITLE),
        ("title", JOB_TITLE),
        ("position", JOB_TITLE),
        ("role", JOB_TITLE),
        ("designation", JOB_TITLE),
        ("location", LOCATION),
        ("job_location", LOCATION),
        ("job location", LOCATION),
        ("work_location", LOCATION),
        ("required skills", REQUIRED_SKILLS),
        ("required_skills", REQUIRED_SKILLS),
        ("skills", REQUIRED_SKILLS),
        ("skill_requirements", REQUIRED_SKILLS),
        ("technical_skills", REQUIRED_SKILLS),
        ("years of experience required", YEARS_OF_EXPERIENCE_REQUIRED),
        ("years_of_experience_required", YEARS_OF_EXPERIENCE_REQUIRED),
        ("years of experience", YEARS_OF_EXPERIENCE_REQUIRED),
        ("years_of_experience", YEARS_OF_EXPERIENCE_REQUIRED),
        ("experience_required", YEARS_OF_EXPERIENCE_REQUIRED),
        ("experience", YEARS_OF_EXPERIENCE_REQUIRED),
        ("education requirements", EDUCATION_REQUIREMENTS),
        ("education_requirements", EDUCATION_REQUIREMENTS),
        ("education", EDUCATION_REQUIREMENTS),
        ("qualification", EDUCATION_REQUIREMENTS),
        ("qualifications", EDUCATION_REQUIREMENTS),
        ("company type preference", COMPANY_TYPE_PREFERENCE),
        ("company_type_preference", COMPANY_TYPE_PREFERENCE),
        ("company_type", COMPANY_TYPE_PREFERENCE),
        ("business type preference", BUSINESS_TYPE_PREFERENCE),
        ("business_type_preference", BUSINESS_TYPE_PREFERENCE),
        ("business_type", BUSINESS_TYPE_PREFERENCE),
        ("preferred stability", PREFERRED_STABILITY),
        ("preferred_stability", PREFERRED_STABILITY),
        ("stability", PREFERRED_STABILITY),
        ("other important requirements", OTHER_IMPORTANT_REQUIREMENTS),
        ("other_important_requirements", OTHER_IMPORTANT_REQUIREMENTS),
        ("other_requirements", OTHER_IMPORTANT_REQUIREMENTS),
        ("additional_requirements", OTHER_IMPORTANT_REQUIREMENTS),
        ("other", OTHER_IMPORTANT_REQUIREMENTS),
    ],
    contains: &[],
};

pub static MATCH_ANALYSIS: SynonymTable = SynonymTable {
    name: "match_analysis",
    synonyms: &[
        ("1. suggested role for the candidate", SUGGESTED_ROLE),
        ("1. suggested role", SUGGESTED_ROLE),
        ("suggested role", SUGGESTED_ROLE),
        ("suggested_role", SUGGESTED_ROLE),
        ("role suggestion", SUGGESTED_ROLE),
        ("best role", SUGGESTED_ROLE),
        // Every historical rating spelling lands on the consolidated rating.
        ("2. match score", AI_RATING),
        ("2. score", AI_RATING),
        ("match score", AI_RATING),
        ("match_score", AI_RATING),
        ("matchscore", AI_RATING),
        ("score", AI_RATING),
        ("9. overall rating", AI_RATING),
        ("9. rating", AI_RATING),
        ("overall rating", AI_RATING),
        ("overall_rating", AI_RATING),
        ("overallrating", AI_RATING),
        ("rating", AI_RATING),
        ("ai rating", AI_RATING),
        ("ai_rating", AI_RATING),
        ("3. whether the candidate should be shortlisted", SHOULD_BE_SHORTLISTED),
        ("3. shortlist recommendation", SHOULD_BE_SHORTLISTED),
        ("should be shortlisted", SHOULD_BE_SHORTLISTED),
        ("should_be_shortlisted", SHOULD_BE_SHORTLISTED),
        ("shortlist", SHOULD_BE_SHORTLISTED),
        ("shortlist_recommendation", SHOULD_BE_SHORTLISTED),
        ("4. company type match", COMPANY_TYPE_MATCH),
        ("4. company match", COMPANY_TYPE_MATCH),
        ("company type match", COMPANY_TYPE_MATCH),
        ("company match", COMPANY_TYPE_MATCH),
        ("company_type_match", COMPANY_TYPE_MATCH),
        ("5. business type match", BUSINESS_TYPE_MATCH),
        ("5. business match", BUSINESS_TYPE_MATCH),
        ("business type match", BUSINESS_TYPE_MATCH),
        ("business match", BUSINESS_TYPE_MATCH),
        ("business_type_match", BUSINESS_TYPE_MATCH),
        ("6. stability assessment", STABILITY_ASSESSMENT),
        ("6. stability", STABILITY_ASSESSMENT),
        ("stability assessment", STABILITY_ASSESSMENT),
        ("stability_assessment", STABILITY_ASSESSMENT),
        ("stability", STABILITY_ASSESSMENT),
        ("7. analysis of each company in the candidate's resume", COMPANY_ANALYSIS),
        ("7. company analysis", COMPANY_ANALYSIS),
        ("company analysis", COMPANY_ANALYSIS),
        ("company_analysis", COMPANY_ANALYSIS),
        ("analysis of companies", COMPANY_ANALYSIS),
        ("8. education assessment", EDUCATION_ASSESSMENT),
        ("8. education", EDUCATION_ASSESSMENT),
        ("education assessment", EDUCATION_ASSESSMENT),
        ("education_assessment", EDUCATION_ASSESSMENT),
        ("education", EDUCATION_ASSESSMENT),
        ("10. anything missing as per expectations in the jd", MISSING_EXPECTATIONS),
        ("10. missing skills", MISSING_EXPECTATIONS),
        ("anything missing", MISSING_EXPECTATIONS),
        ("missing skills", MISSING_EXPECTATIONS),
        ("missing_expectations", MISSING_EXPECTATIONS),
        ("missing expectations", MISSING_EXPECTATIONS),
        ("11. overall recommendation", OVERALL_RECOMMENDATION),
        ("11. recommendation", OVERALL_RECOMMENDATION),
        ("overall recommendation", OVERALL_RECOMMENDATION),
        ("overall_recommendation", OVERALL_RECOMMENDATION),
        ("recommendation", OVERALL_RECOMMENDATION),
        ("ai_shortlisted", AI_SHORTLISTED),
        ("ai shortlisted", AI_SHORTLISTED),
        ("internal_shortlisted", INTERNAL_SHORTLISTED),
        ("internally shortlisted", INTERNAL_SHORTLISTED),
        ("interview_in_process", INTERVIEW_IN_PROCESS),
        ("interview in process", INTERVIEW_IN_PROCESS),
        ("final_result", FINAL_RESULT),
        ("final result", FINAL_RESULT),
        ("candidate_joined", CANDIDATE_JOINED),
        ("candidate joined", CANDIDATE_JOINED),
    ],
    contains: &[],
};

pub static COMPANY_ANALYSIS_ENTRY: SynonymTable = SynonymTable {
    name: "company_analysis",
    synonyms: &[
        ("companyname", COMPANY_NAME),
        ("company name", COMPANY_NAME),
        ("company_name", COMPANY_NAME),
        ("company", COMPANY_NAME),
        ("name", COMPANY_NAME),
        ("company type", COMPANY_TYPE),
        ("company_type", COMPANY_TYPE),
        ("type", COMPANY_TYPE),
        ("industry sector", INDUSTRY_SECTOR),
        ("industry_sector", INDUSTRY_SECTOR),
        ("industry", INDUSTRY_SECTOR),
        ("sector", INDUSTRY_SECTOR),
        ("business model", BUSINESS_MODEL),
        ("business_model", BUSINESS_MODEL),
        ("business", BUSINESS_MODEL),
        ("model", BUSINESS_MODEL),
        ("notable achievements", NOTABLE_ACHIEVEMENTS),
        ("notable_achievements", NOTABLE_ACHIEVEMENTS),
        ("achievements", NOTABLE_ACHIEVEMENTS),
        ("accomplishments", NOTABLE_ACHIEVEMENTS),
    ],
    contains: &[],
};

pub static EDUCATION_ASSESSMENT_OBJECT: SynonymTable = SynonymTable {
    name: "education_assessment",
    synonyms: &[
        ("college/university assessment", UNIVERSITY_ASSESSMENT),
        ("university assessment", UNIVERSITY_ASSESSMENT),
        ("university_assessment", UNIVERSITY_ASSESSMENT),
        ("college assessment", UNIVERSITY_ASSESSMENT),
        ("course relevance", COURSE_RELEVANCE),
        ("course_relevance", COURSE_RELEVANCE),
        ("degree relevance", COURSE_RELEVANCE),
        ("education relevance", COURSE_RELEVANCE),
    ],
    contains: &[],
};
