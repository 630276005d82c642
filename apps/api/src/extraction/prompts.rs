// Extraction prompt templates for resumes, job descriptions and match analysis.
// The requested shapes use canonical keys, but the reconciliation layer does not
// rely on the model following them.

pub const RESUME_SYSTEM_ROLE: &str = "You are an expert resume parser.";

pub const RESUME_PROMPT: &str = r#"Extract the following information from the resume below:
1. Candidate's full name
2. Email address
3. Phone number
4. Skills (all technical and soft skills)
5. For each company in the work history:
   - Company name
   - Position / role
   - Duration (start date and end date)
   - Whether it is a product or service company
   - Business type (B2B, B2C or B2B2C if discernible)
   - Number of employees (if mentioned or can be inferred)
   - Revenue (if mentioned)
   - Funding received and type of funding (if mentioned)
   - Company main location
6. Education details: college/university, course/degree, graduation year
7. Overall stability assessment (how long the candidate stayed at previous companies)

RESUME:
{resume_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "CandidateFullName": "string",
  "EmailAddress": "string",
  "PhoneNumber": "string",
  "Skills": ["string"],
  "Experience": [
    {
      "CompanyName": "string",
      "Position": "string",
      "Duration": {"StartDate": "string", "EndDate": "string"},
      "CompanyType": "Product" | "Service" | null,
      "BusinessType": "B2B" | "B2C" | "B2B2C" | null,
      "NumberOfEmployees": "string" | null,
      "Revenue": "string" | null,
      "Funding": "string" | null,
      "Location": "string"
    }
  ],
  "Education": [
    {"CollegeUniversity": "string", "CourseDegree": "string", "GraduationYear": "string"}
  ],
  "StabilityAssessment": "string"
}"#;

pub const JOB_SYSTEM_ROLE: &str = "You are an expert job description analyst.";

pub const JOB_PROMPT: &str = r#"Extract the following information from the job description below:
1. Hiring company name
2. Job title
3. Job location
4. Required skills, split into technical and soft skills
5. Years of experience required
6. Education requirements
7. Company type preference (Product/Service if mentioned)
8. Business type preference (B2B/B2C if mentioned)
9. Preferred stability (years in previous companies if mentioned)
10. Other important requirements

JOB DESCRIPTION:
{jd_text}

OUTPUT SCHEMA (return exactly this structure):
{
  "CompanyName": "string",
  "JobTitle": "string",
  "Location": "string",
  "RequiredSkills": {"technical": ["string"], "soft": ["string"]},
  "YearsOfExperienceRequired": "string",
  "EducationRequirements": "string",
  "CompanyTypePreference": "string" | null,
  "BusinessTypePreference": "string" | null,
  "PreferredStability": "string" | null,
  "OtherImportantRequirements": ["string"]
}"#;

pub const MATCH_SYSTEM_ROLE: &str = "You are an expert recruitment assistant. \
Analyze how well the candidate matches the job description.";

pub const MATCH_PROMPT: &str = r#"Compare the candidate with the job description and provide:
1. Suggested role for the candidate (e.g. Frontend, Backend, DevOps)
2. Rating of the overall fit from 0 to 10
3. Whether the candidate should be shortlisted (Yes/No)
4. Company type match (Product/Service)
5. Business type match (B2B/B2C)
6. Stability assessment (based on years in previous companies)
7. Analysis of each company in the candidate's resume: name, type, industry
   sector, business model and notable achievements
8. Education assessment: college/university assessment and course relevance
9. Anything missing compared to the expectations in the job description
10. Overall recommendation (detailed assessment)

CANDIDATE:
{candidate_json}

JOB DESCRIPTION:
{job_json}

OUTPUT SCHEMA (return exactly this structure):
{
  "SuggestedRole": "string",
  "AIRating": number,
  "ShouldBeShortlisted": "Yes" | "No",
  "CompanyTypeMatch": "string",
  "BusinessTypeMatch": "string",
  "StabilityAssessment": "string",
  "CompanyAnalysis": [
    {
      "CompanyName": "string",
      "CompanyType": "string",
      "IndustrySector": "string",
      "BusinessModel": "string",
      "NotableAchievements": "string"
    }
  ],
  "EducationAssessment": {"UniversityAssessment": "string", "CourseRelevance": "string"},
  "MissingExpectations": ["string"],
  "OverallRecommendation": "string"
}"#;

pub const CHAT_SYSTEM: &str = "\
You are a helpful recruitment assistant that helps analyze resumes and job descriptions. \
Answer the user's questions using the candidate, job and analysis context provided. \
If the user updated a candidate's status (for example \"mark as internally shortlisted\" \
or \"move to interview process\"), acknowledge the update and confirm the new status. \
Keep responses concise and focused on recruitment.";

pub const CHAT_CONTEXT: &str = r#"Candidate information: {candidate_json}

Job description information: {job_json}

Analysis information: {analysis_json}

User message: {message}"#;

pub fn resume_prompt(resume_text: &str) -> String {
    RESUME_PROMPT.replace("{resume_text}", resume_text)
}

pub fn job_prompt(jd_text: &str) -> String {
    JOB_PROMPT.replace("{jd_text}", jd_text)
}

pub fn match_prompt(candidate_json: &str, job_json: &str) -> String {
    MATCH_PROMPT
        .replace("{candidate_json}", candidate_json)
        .replace("{job_json}", job_json)
}

pub fn chat_context(candidate_json: &str, job_json: &str, analysis_json: &str, message: &str) -> String {
    CHAT_CONTEXT
        .replace("{candidate_json}", candidate_json)
        .replace("{job_json}", job_json)
        .replace("{analysis_json}", analysis_json)
        .replace("{message}", message)
}
