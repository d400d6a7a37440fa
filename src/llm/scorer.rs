//! Candidate scoring against the job rubric

use crate::config::ServiceConfig;
use crate::error::{Result, ScreenerError};
use crate::llm::client::{CompletionRequest, ReasoningService};
use crate::llm::decode::parse_json_object;
use crate::llm::prompts::PromptTemplates;
use crate::processing::coerce::coerce_string;
use crate::processing::heuristics::{fallback_brief_summary, fallback_score};
use crate::processing::profile::{CandidateProfile, JobContext, ScoreCard};
use log::{debug, warn};
use serde_json::{Map, Value};
use std::sync::Arc;

pub const UNCONFIGURED_REASONING: &str = "Fallback scoring used (no reasoning service configured)";
pub const FAILED_REASONING: &str = "Fallback scoring used (reasoning service call failed)";
const NO_REASONING: &str = "No reasoning provided";

/// Why the deterministic formula was used
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FallbackReason {
    Unconfigured,
    ServiceFailed,
}

pub struct CandidateScorer {
    service: Option<Arc<dyn ReasoningService>>,
    templates: PromptTemplates,
    temperature: f32,
    max_tokens: u32,
}

impl CandidateScorer {
    pub fn new(service: Option<Arc<dyn ReasoningService>>, settings: &ServiceConfig) -> Self {
        Self {
            service,
            templates: PromptTemplates::default(),
            temperature: settings.scoring_temperature,
            max_tokens: settings.scoring_max_tokens,
        }
    }

    /// Score one profile; the result is always within [0, 100].
    pub async fn score(&self, profile: &CandidateProfile, job: &JobContext) -> ScoreCard {
        let Some(service) = &self.service else {
            return fallback_card(profile, FallbackReason::Unconfigured);
        };

        match self.score_with_service(service.as_ref(), profile, job).await {
            Ok(card) => card,
            Err(e) => {
                warn!(
                    "Scoring failed for {}, using fallback formula: {}",
                    profile.source_file, e
                );
                fallback_card(profile, FallbackReason::ServiceFailed)
            }
        }
    }

    async fn score_with_service(
        &self,
        service: &dyn ReasoningService,
        profile: &CandidateProfile,
        job: &JobContext,
    ) -> Result<ScoreCard> {
        let reply = service
            .complete(&CompletionRequest {
                system: Some(self.templates.scoring_system.clone()),
                prompt: self.templates.render_scoring(profile, job),
                temperature: self.temperature,
                max_tokens: self.max_tokens,
            })
            .await?;

        let fields = parse_json_object(&reply)?;
        let card = score_card_from_json(&fields, profile)?;
        debug!("Scored {}: {:.1}", profile.source_file, card.ai_score);
        Ok(card)
    }
}

/// Decode a scoring reply. A missing or non-numeric `score` is an error; the
/// text fields have defaults.
pub fn score_card_from_json(fields: &Map<String, Value>, profile: &CandidateProfile) -> Result<ScoreCard> {
    let score = match fields.get("score") {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    }
    .filter(|score| score.is_finite())
    .ok_or_else(|| ScreenerError::MalformedResponse("reply has no numeric score".to_string()))?;

    let default_summary = format!(
        "{} with {}y experience",
        profile.current_title, profile.relevant_years
    );

    Ok(ScoreCard {
        // + 0.0 folds -0.0 into 0.0
        ai_score: score.clamp(0.0, 100.0) + 0.0,
        ai_reasoning: coerce_string(fields.get("reasoning"), NO_REASONING),
        brief_summary: coerce_string(fields.get("brief_summary"), &default_summary),
        fallback: false,
    })
}

/// Deterministic score card with no external call.
pub fn fallback_card(profile: &CandidateProfile, reason: FallbackReason) -> ScoreCard {
    let reasoning = match reason {
        FallbackReason::Unconfigured => UNCONFIGURED_REASONING,
        FallbackReason::ServiceFailed => FAILED_REASONING,
    };

    ScoreCard {
        ai_score: fallback_score(profile),
        ai_reasoning: reasoning.to_string(),
        brief_summary: fallback_brief_summary(profile),
        fallback: true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::llm::mock::ScriptedService;
    use crate::processing::heuristics::HeuristicExtractor;

    fn profile() -> CandidateProfile {
        let mut profile = HeuristicExtractor::new().extract("", "cv.txt");
        profile.current_title = "Data Engineer".to_string();
        profile.total_years = 5.0;
        profile.relevant_years = 3.0;
        profile.must_have_skills = vec!["a".to_string(), "b".to_string()];
        profile.nice_to_have_skills = vec!["c".to_string()];
        profile
    }

    fn job() -> JobContext {
        JobContext::new("Data Engineer", "Pipelines")
    }

    async fn score_reply(reply: &str) -> ScoreCard {
        let service: Arc<dyn ReasoningService> = Arc::new(ScriptedService::replying(reply));
        CandidateScorer::new(Some(service), &Config::default().service)
            .score(&profile(), &job())
            .await
    }

    #[tokio::test]
    async fn test_score_is_clamped() {
        let high = score_reply(r#"{"score": 140, "reasoning": "great", "brief_summary": "b"}"#).await;
        assert_eq!(high.ai_score, 100.0);
        assert!(!high.fallback);

        let low = score_reply(r#"{"score": -10, "reasoning": "poor", "brief_summary": "b"}"#).await;
        assert_eq!(low.ai_score, 0.0);

        let negative_zero = score_reply(r#"{"score": -0.0, "reasoning": "none", "brief_summary": "b"}"#).await;
        assert!(negative_zero.ai_score.is_sign_positive());
    }

    #[tokio::test]
    async fn test_fenced_reply_with_sub_scores() {
        let card = score_reply(
            "```json\n{\"score\": 78.5, \"reasoning\": \"Solid\", \"brief_summary\": \"Good fit\", \"experience_match\": 80}\n```",
        )
        .await;

        assert_eq!(card.ai_score, 78.5);
        assert_eq!(card.ai_reasoning, "Solid");
        assert_eq!(card.brief_summary, "Good fit");
    }

    #[tokio::test]
    async fn test_missing_text_fields_get_defaults() {
        let card = score_reply(r#"{"score": "64"}"#).await;
        assert_eq!(card.ai_score, 64.0);
        assert_eq!(card.ai_reasoning, NO_REASONING);
        assert_eq!(card.brief_summary, "Data Engineer with 3y experience");
    }

    #[tokio::test]
    async fn test_garbage_reply_uses_formula() {
        let card = score_reply("Score: eighty").await;
        assert_eq!(card.ai_score, 83.5);
        assert_eq!(card.ai_reasoning, FAILED_REASONING);
        assert!(card.fallback);

        let no_score = score_reply(r#"{"reasoning": "forgot the number"}"#).await;
        assert_eq!(no_score.ai_score, 83.5);
    }

    #[tokio::test]
    async fn test_service_error_uses_formula() {
        let service: Arc<dyn ReasoningService> = Arc::new(ScriptedService::failing());
        let card = CandidateScorer::new(Some(service), &Config::default().service)
            .score(&profile(), &job())
            .await;
        assert_eq!(card, fallback_card(&profile(), FallbackReason::ServiceFailed));
    }

    #[tokio::test]
    async fn test_unconfigured_uses_formula() {
        let scorer = CandidateScorer::new(None, &Config::default().service);
        let card = scorer.score(&profile(), &job()).await;

        assert_eq!(card.ai_score, 83.5);
        assert_eq!(card.ai_reasoning, UNCONFIGURED_REASONING);
        assert_eq!(card.brief_summary, "Data Engineer with 3.0y relevant experience. Skills: a, b.");
    }

    #[tokio::test]
    async fn test_scoring_request_settings() {
        let service = Arc::new(ScriptedService::replying(r#"{"score": 50}"#));
        let scorer = CandidateScorer::new(
            Some(service.clone() as Arc<dyn ReasoningService>),
            &Config::default().service,
        );
        scorer.score(&profile(), &job()).await;

        let requests = service.requests.lock().unwrap();
        assert_eq!(requests[0].temperature, 0.1);
        assert_eq!(requests[0].max_tokens, 1000);
        assert!(requests[0].system.as_deref().unwrap_or("").contains("expert recruiter"));
    }
}
