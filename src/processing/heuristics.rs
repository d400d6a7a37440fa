//! Deterministic offline fallback: profile heuristics and the fallback score
//!
//! Used whenever the reasoning service is unconfigured or a call fails. Output
//! depends only on the input text, so repeated runs are byte-identical.
//!
//! The numeric constants below are policy values, not derived quantities;
//! changing any of them changes fallback rankings.

use crate::processing::profile::{CandidateProfile, NOT_SPECIFIED, UNKNOWN_CANDIDATE};
use aho_corasick::AhoCorasick;
use regex::Regex;
use std::collections::BTreeSet;
use std::ops::RangeInclusive;

/// Words that mark a line as a job title
pub const ROLE_WORDS: [&str; 6] = ["developer", "engineer", "manager", "analyst", "consultant", "specialist"];

/// Vocabulary intersected with the CV text, in priority order
pub const COMMON_SKILLS: [&str; 10] = [
    "python", "java", "javascript", "react", "node", "sql", "aws", "docker", "kubernetes", "git",
];

const NAME_EXCLUSIONS: [&str; 4] = ["email", "phone", "address", "@"];

const NAME_SCAN_LINES: usize = 5;
const TITLE_SCAN_LINES: usize = 10;
const MAX_NAME_WORDS: usize = 4;
/// A name line must be longer than this.
const NAME_LENGTH_FLOOR: usize = 5;
const MAX_NAME_CHARS: usize = 50;
const MAX_TITLE_CHARS: usize = 100;
const MUST_HAVE_COUNT: usize = 5;
const NICE_TO_HAVE_COUNT: usize = 5;

pub const YEAR_RANGE: RangeInclusive<u32> = 2000..=2024;
pub const YEARS_PER_DATED_LINE: f64 = 1.2;
pub const MIN_ESTIMATED_YEARS: f64 = 1.0;
pub const MAX_ESTIMATED_YEARS: f64 = 15.0;
pub const RELEVANT_YEARS_SHARE: f64 = 0.7;

pub const TOTAL_YEARS_WEIGHT: f64 = 8.0;
pub const RELEVANT_YEARS_WEIGHT: f64 = 12.0;
pub const BASE_SCORE_FLOOR: f64 = 20.0;
pub const BASE_SCORE_CEILING: f64 = 95.0;
pub const MUST_HAVE_SKILL_BONUS: f64 = 3.0;
pub const NICE_TO_HAVE_SKILL_BONUS: f64 = 1.5;

pub struct HeuristicExtractor {
    role_words: AhoCorasick,
    skills: AhoCorasick,
    name_exclusions: AhoCorasick,
    digit_run: Regex,
}

impl Default for HeuristicExtractor {
    fn default() -> Self {
        Self::new()
    }
}

impl HeuristicExtractor {
    pub fn new() -> Self {
        let case_insensitive = |patterns: &[&str]| {
            AhoCorasick::builder()
                .ascii_case_insensitive(true)
                .build(patterns)
                .expect("Invalid vocabulary automaton")
        };

        Self {
            role_words: case_insensitive(&ROLE_WORDS[..]),
            skills: case_insensitive(&COMMON_SKILLS[..]),
            name_exclusions: case_insensitive(&NAME_EXCLUSIONS[..]),
            digit_run: Regex::new(r"\d+").expect("Invalid digit regex"),
        }
    }

    /// Approximate profile from text alone.
    pub fn extract(&self, cv_text: &str, filename: &str) -> CandidateProfile {
        let lines: Vec<&str> = cv_text
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .collect();

        let total_years = self.estimate_years(&lines);
        let skills = self.find_skills(cv_text);
        let must_have_skills: Vec<String> = skills.iter().take(MUST_HAVE_COUNT).cloned().collect();
        let nice_to_have_skills: Vec<String> = skills
            .iter()
            .skip(MUST_HAVE_COUNT)
            .take(NICE_TO_HAVE_COUNT)
            .cloned()
            .collect();

        CandidateProfile {
            source_file: filename.to_string(),
            candidate_name: self.candidate_name(&lines),
            current_title: self.current_title(&lines),
            total_years,
            relevant_years: total_years * RELEVANT_YEARS_SHARE,
            summary: format!(
                "Candidate with approximately {:.0} years of experience. Basic analysis only - \
                 the reasoning service is required for detailed insights.",
                total_years
            ),
            must_have_skills,
            nice_to_have_skills,
            experience_highlights: vec![
                "Basic analysis only - full details require the reasoning service".to_string(),
            ],
            strengths: vec!["Analysis requires a reasoning service API key".to_string()],
            confidence_notes: "Limited analysis - configure the reasoning service API key for a \
                               comprehensive evaluation"
                .to_string(),
            score: None,
        }
    }

    fn candidate_name(&self, lines: &[&str]) -> String {
        lines
            .iter()
            .take(NAME_SCAN_LINES)
            .find(|line| {
                line.split_whitespace().count() <= MAX_NAME_WORDS
                    && line.chars().count() > NAME_LENGTH_FLOOR
                    && !self.name_exclusions.is_match(**line)
            })
            .map(|line| line.chars().take(MAX_NAME_CHARS).collect())
            .unwrap_or_else(|| UNKNOWN_CANDIDATE.to_string())
    }

    fn current_title(&self, lines: &[&str]) -> String {
        lines
            .iter()
            .take(TITLE_SCAN_LINES)
            .find(|line| self.role_words.is_match(**line))
            .map(|line| line.chars().take(MAX_TITLE_CHARS).collect())
            .unwrap_or_else(|| NOT_SPECIFIED.to_string())
    }

    /// Lines mentioning a plausible year, scaled and clamped into a career length.
    fn estimate_years(&self, lines: &[&str]) -> f64 {
        let dated_lines = lines.iter().filter(|line| self.mentions_year(line)).count();
        (dated_lines as f64 * YEARS_PER_DATED_LINE).clamp(MIN_ESTIMATED_YEARS, MAX_ESTIMATED_YEARS)
    }

    fn mentions_year(&self, line: &str) -> bool {
        self.digit_run.find_iter(line).any(|run| {
            run.as_str().len() == 4
                && run
                    .as_str()
                    .parse::<u32>()
                    .map(|year| YEAR_RANGE.contains(&year))
                    .unwrap_or(false)
        })
    }

    /// Vocabulary terms occurring anywhere in the text, in vocabulary order.
    fn find_skills(&self, text: &str) -> Vec<String> {
        let found: BTreeSet<usize> = self
            .skills
            .find_overlapping_iter(text)
            .map(|m| m.pattern().as_usize())
            .collect();

        found.into_iter().map(|index| COMMON_SKILLS[index].to_string()).collect()
    }
}

/// Deterministic score used when the reasoning service cannot score a candidate.
pub fn fallback_score(profile: &CandidateProfile) -> f64 {
    let base = (profile.total_years * TOTAL_YEARS_WEIGHT + profile.relevant_years * RELEVANT_YEARS_WEIGHT)
        .clamp(BASE_SCORE_FLOOR, BASE_SCORE_CEILING);
    let skill_bonus = profile.must_have_skills.len() as f64 * MUST_HAVE_SKILL_BONUS
        + profile.nice_to_have_skills.len() as f64 * NICE_TO_HAVE_SKILL_BONUS;

    (base + skill_bonus).clamp(0.0, 100.0)
}

/// One-line summary built from title, relevant years and up to three must-have skills.
pub fn fallback_brief_summary(profile: &CandidateProfile) -> String {
    let mut summary = format!(
        "{} with {:.1}y relevant experience.",
        profile.current_title, profile.relevant_years
    );

    if !profile.must_have_skills.is_empty() {
        let skills: Vec<&str> = profile.must_have_skills.iter().take(3).map(String::as_str).collect();
        summary.push_str(&format!(" Skills: {}.", skills.join(", ")));
    }

    summary
}
