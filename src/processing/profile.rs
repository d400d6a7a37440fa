//! Candidate profile, job context and ranking records

use serde::{Deserialize, Serialize};

pub const UNKNOWN_CANDIDATE: &str = "Unknown Candidate";
pub const NOT_SPECIFIED: &str = "Not specified";
pub const NO_SUMMARY: &str = "No summary available";
pub const NO_ASSESSMENT: &str = "No assessment notes";

/// The role being hired for, supplied once per analysis run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JobContext {
    pub job_title: String,
    pub job_description: String,
}

impl JobContext {
    pub fn new(job_title: impl Into<String>, job_description: impl Into<String>) -> Self {
        Self {
            job_title: job_title.into(),
            job_description: job_description.into(),
        }
    }
}

/// Structured record extracted from one CV document.
///
/// Built once per document; only `score` is filled in afterwards, by the scorer.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CandidateProfile {
    pub source_file: String,
    pub candidate_name: String,
    pub current_title: String,
    pub total_years: f64,
    pub relevant_years: f64,
    pub summary: String,
    pub must_have_skills: Vec<String>,
    pub nice_to_have_skills: Vec<String>,
    pub experience_highlights: Vec<String>,
    pub strengths: Vec<String>,
    pub confidence_notes: String,
    /// Absent until the scoring step has run
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub score: Option<ScoreCard>,
}

impl CandidateProfile {
    pub fn is_scored(&self) -> bool {
        self.score.is_some()
    }

    /// Attach the scoring result, consuming the unscored profile.
    pub fn with_score(mut self, score: ScoreCard) -> Self {
        self.score = Some(score);
        self
    }
}

/// Scorer output for one candidate.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoreCard {
    /// Always within [0, 100]
    pub ai_score: f64,
    pub ai_reasoning: String,
    pub brief_summary: String,
    /// True when the deterministic fallback produced this card
    pub fallback: bool,
}

/// One row of the final ranking.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RankedCandidate {
    pub score: f64,
    pub profile: CandidateProfile,
}
