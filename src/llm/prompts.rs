//! Prompt templates for CV extraction and candidate scoring

use crate::processing::profile::{CandidateProfile, JobContext};
use aho_corasick::AhoCorasick;
use serde::{Deserialize, Serialize};

/// Prompt templates with `{placeholder}` slots
#[derive(Debug, Clone)]
pub struct PromptTemplates {
    pub extraction: String,
    pub scoring: String,
    pub scoring_system: String,
}

impl Default for PromptTemplates {
    fn default() -> Self {
        Self {
            extraction: EXTRACTION_TEMPLATE.to_string(),
            scoring: SCORING_TEMPLATE.to_string(),
            scoring_system: SCORING_SYSTEM_PROMPT.to_string(),
        }
    }
}

/// Parameters for the extraction prompt
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ExtractionParams {
    pub job_title: String,
    pub job_description: String,
    pub cv_text: String,
}

impl ExtractionParams {
    pub fn new(job: &JobContext, cv_text: &str) -> Self {
        Self {
            job_title: job.job_title.clone(),
            job_description: job.job_description.clone(),
            cv_text: cv_text.to_string(),
        }
    }
}

impl PromptTemplates {
    pub fn render_extraction(&self, params: &ExtractionParams) -> String {
        fill_slots(
            &self.extraction,
            &[
                ("{job_title}", params.job_title.as_str()),
                ("{job_description}", params.job_description.as_str()),
                ("{cv_text}", params.cv_text.as_str()),
            ],
        )
    }

    pub fn render_scoring(&self, profile: &CandidateProfile, job: &JobContext) -> String {
        fill_slots(
            &self.scoring,
            &[
                ("{job_title}", job.job_title.as_str()),
                ("{job_description}", job.job_description.as_str()),
                ("{candidate}", render_candidate(profile).as_str()),
            ],
        )
    }
}

/// Single pass over the template: substituted values are never scanned for slots.
fn fill_slots(template: &str, slots: &[(&str, &str)]) -> String {
    let (names, values): (Vec<&str>, Vec<&str>) = slots.iter().copied().unzip();
    AhoCorasick::new(&names)
        .expect("Invalid prompt slot patterns")
        .replace_all(template, &values)
}

/// Condensed text rendering of a profile for the scoring prompt.
pub fn render_candidate(profile: &CandidateProfile) -> String {
    let skills: Vec<&str> = profile
        .must_have_skills
        .iter()
        .chain(&profile.nice_to_have_skills)
        .map(String::as_str)
        .collect();

    format!(
        "Candidate: {}\n\
         Current Title: {}\n\
         Total Experience: {} years\n\
         Relevant Experience: {} years\n\
         Summary: {}\n\
         Key Skills: {}\n\
         Experience Highlights: {}\n\
         Strengths: {}",
        profile.candidate_name,
        profile.current_title,
        profile.total_years,
        profile.relevant_years,
        profile.summary,
        skills.join(", "),
        profile.experience_highlights.join(", "),
        profile.strengths.join(", "),
    )
}

const EXTRACTION_TEMPLATE: &str = r#"You are an experienced HR analyst. Read the CV below and describe the candidate with respect to the job.

JOB:
Title: {job_title}
Description: {job_description}

Reply with a single JSON object and nothing else, using exactly these keys:

{
    "candidate_name": "full name as written on the CV",
    "current_title": "current or most recent job title",
    "total_years": 0.0,
    "relevant_years": 0.0,
    "summary": "2-3 sentences on qualifications and fit for this role",
    "must_have_skills": ["skills that match the job requirements"],
    "nice_to_have_skills": ["complementary skills"],
    "experience_highlights": ["up to 3 of the most relevant achievements"],
    "strengths": ["up to 3 key strengths"],
    "confidence_notes": "short assessment of fit, concerns or standout qualities"
}

Rules:
- total_years counts the whole career; relevant_years counts only experience relevant to this job.
- Put a skill in must_have_skills only if the job asks for it.
- Be honest and concise, and fill every key.

CV:
{cv_text}"#;

const SCORING_SYSTEM_PROMPT: &str = "You are an expert recruiter with deep knowledge of technical roles \
and candidate evaluation. Provide honest, detailed and consistent scoring.";

const SCORING_TEMPLATE: &str = r#"Score this candidate against the job on a 0-100 scale.

JOB:
Title: {job_title}
Description: {job_description}

CANDIDATE:
{candidate}

Weighted rubric:
1. Relevant experience match (40%): alignment with the requirements, depth, career progression
2. Required skills coverage (30%): must-have skills and evidence of proficiency
3. Nice-to-have skills (15%): additional valuable skills and qualifications
4. Education and certifications (10%)
5. Overall fit and potential (5%): growth potential, communication evident in the CV

Score bands:
- 90-100: exceptional match
- 80-89: strong match
- 70-79: good match
- 60-69: moderate match, consider with reservations
- 50-59: weak match
- 0-49: poor match, not recommended

Reply with a single JSON object:
{
    "score": 85,
    "reasoning": "why this score, naming matched and missing requirements",
    "brief_summary": "1-2 sentences: current role, key experience, standout skills for this job",
    "experience_match": 88,
    "skills_coverage": 82,
    "nice_to_have": 70,
    "education": 85,
    "overall_fit": 90
}"#;
