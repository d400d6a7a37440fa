//! Structured CV extraction
//!
//! [`CvExtractor::extract`] always returns a profile. The service path decodes
//! the reply in two stages: [`parse_json_object`] may fail and triggers the
//! heuristic fallback, [`profile_from_json`] is total and coerces every field.

use crate::config::ServiceConfig;
use crate::error::Result;
use crate::llm::client::{CompletionRequest, ReasoningService};
use crate::llm::decode::parse_json_object;
use crate::llm::prompts::{ExtractionParams, PromptTemplates};
use crate::processing::coerce::{coerce_list, coerce_string, coerce_years};
use crate::processing::heuristics::HeuristicExtractor;
use crate::processing::profile::{
    CandidateProfile, JobContext, NOT_SPECIFIED, NO_ASSESSMENT, NO_SUMMARY, UNKNOWN_CANDIDATE,
};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::sync::Arc;

pub struct CvExtractor {
    service: Option<Arc<dyn ReasoningService>>,
    templates: PromptTemplates,
    heuristics: HeuristicExtractor,
    temperature: f32,
    max_tokens: u32,
}

impl CvExtractor {
    pub fn new(service: Option<Arc<dyn ReasoningService>>, settings: &ServiceConfig) -> Self {
        Self {
            service,
            templates: PromptTemplates::default(),
            heuristics: HeuristicExtractor::new(),
            temperature: settings.extraction_temperature,
            max_tokens: settings.extraction_max_tokens,
        }
    }

    pub async fn extract(&self, cv_text: &str, filename: &str, job: &JobContext) -> CandidateProfile {
        let Some(service) = &self.service else {
            return self.fallback(cv_text, filename);
        };

        match self.extract_with_service(service.as_ref(), cv_text, filename, job).await {
            Ok(profile) => profile,
            Err(e) => {
                warn!("Extraction failed for {}, using heuristics: {}", filename, e);
                self.fallback(cv_text, filename)
            }
        }
    }

    /// Heuristic profile with no external call.
    pub fn fallback(&self, cv_text: &str, filename: &str) -> CandidateProfile {
        self.heuristics.extract(cv_text, filename)
    }

    async fn extract_with_service(
        &self,
        service: &dyn ReasoningService,
        cv_text: &str,
        filename: &str,
        job: &JobContext,
    ) -> Result<CandidateProfile> {
        let prompt = self
            .templates
            .render_extraction(&ExtractionParams::new(job, cv_text));
        debug!("Requesting extraction for {} ({} prompt chars)", filename, prompt.len());

        let reply = service
            .complete(&CompletionRequest {
                system: None,
                prompt,
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            })
            .await?;

        let fields = parse_json_object(&reply)?;
        Ok(profile_from_json(&fields, filename))
    }
}

/// Build a profile from decoded service output; never fails.
pub fn profile_from_json(fields: &Map<String, Value>, filename: &str) -> CandidateProfile {
    CandidateProfile {
        source_file: filename.to_string(),
        candidate_name: coerce_string(fields.get("candidate_name"), UNKNOWN_CANDIDATE),
        current_title: coerce_string(fields.get("current_title"), NOT_SPECIFIED),
        total_years: coerce_years(fields.get("total_years")),
        relevant_years: coerce_years(fields.get("relevant_years")),
        summary: coerce_string(fields.get("summary"), NO_SUMMARY),
        must_have_skills: coerce_list(fields.get("must_have_skills")),
        nice_to_have_skills: coerce_list(fields.get("nice_to_have_skills")),
        experience_highlights: coerce_list(fields.get("experience_highlights")),
        strengths: coerce_list(fields.get("strengths")),
        confidence_notes: coerce_string(fields.get("confidence_notes"), NO_ASSESSMENT),
        score: None,
    }
}
