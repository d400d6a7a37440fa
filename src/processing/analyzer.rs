//! Analysis engine: documents in, ranked candidates out
//!
//! Each document runs through normalize -> extract -> score as its own tokio
//! task, at most `max_concurrency` at a time. Results are collected in
//! extraction order regardless of completion order, so the stable ranking
//! sort sees the same input sequence a sequential run would produce.

use crate::config::Config;
use crate::error::{Result, ScreenerError};
use crate::input::{ExtractedDocument, InputManager, UploadedBlob};
use crate::llm::scorer::{fallback_card, FallbackReason};
use crate::llm::{CandidateScorer, CvExtractor, OpenAiClient, ReasoningService};
use crate::processing::profile::{CandidateProfile, JobContext, RankedCandidate};
use crate::processing::ranking::rank_candidates;
use crate::processing::text_processor::TextProcessor;
use indicatif::ProgressBar;
use log::{error, info};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Semaphore;

/// Result of one analysis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AnalysisOutcome {
    pub job: JobContext,
    /// Every scored candidate, best first; display truncation happens later
    pub ranked: Vec<RankedCandidate>,
    pub documents_found: usize,
    /// Model name when a reasoning service was configured
    pub service_used: Option<String>,
}

/// Per-candidate steps shared by all tasks.
struct CandidatePipeline {
    cleaner: TextProcessor,
    extractor: CvExtractor,
    scorer: CandidateScorer,
}

impl CandidatePipeline {
    async fn process(&self, document: &ExtractedDocument, job: &JobContext) -> (f64, CandidateProfile) {
        let text = self.cleaner.clean_text(&document.text);
        let profile = self.extractor.extract(&text, &document.name, job).await;
        let card = self.scorer.score(&profile, job).await;
        (card.ai_score, profile.with_score(card))
    }

    /// Fully offline result for a candidate whose task died.
    fn offline(&self, document: &ExtractedDocument) -> (f64, CandidateProfile) {
        let text = self.cleaner.clean_text(&document.text);
        let profile = self.extractor.fallback(&text, &document.name);
        let card = fallback_card(&profile, FallbackReason::ServiceFailed);
        (card.ai_score, profile.with_score(card))
    }
}

/// Main analysis engine that coordinates input, extraction and scoring
pub struct AnalysisEngine {
    input: Arc<InputManager>,
    pipeline: Arc<CandidatePipeline>,
    service_name: Option<String>,
    max_concurrency: usize,
    progress: Option<ProgressBar>,
}

impl AnalysisEngine {
    /// Uses the OpenAI-compatible client when an API key is available.
    pub fn new(config: &Config) -> Result<Self> {
        let service = OpenAiClient::from_config(config)?.map(|client| Arc::new(client) as Arc<dyn ReasoningService>);
        Ok(Self::with_service(config, service))
    }

    pub fn with_service(config: &Config, service: Option<Arc<dyn ReasoningService>>) -> Self {
        let service_name = service.as_ref().map(|s| s.name().to_string());

        Self {
            input: Arc::new(InputManager::new()),
            pipeline: Arc::new(CandidatePipeline {
                cleaner: TextProcessor::new(),
                extractor: CvExtractor::new(service.clone(), &config.service),
                scorer: CandidateScorer::new(service, &config.service),
            }),
            service_name,
            max_concurrency: config.processing.max_concurrency.max(1),
            progress: None,
        }
    }

    /// Advance `progress` once per finished candidate.
    pub fn with_progress(mut self, progress: ProgressBar) -> Self {
        self.progress = Some(progress);
        self
    }

    pub fn is_service_configured(&self) -> bool {
        self.service_name.is_some()
    }

    /// Full run over uploaded blobs.
    pub async fn analyze(&self, blobs: Vec<UploadedBlob>, job: &JobContext) -> Result<AnalysisOutcome> {
        let input = Arc::clone(&self.input);
        let documents = tokio::task::spawn_blocking(move || input.extract_all(&blobs))
            .await
            .map_err(std::io::Error::other)?;

        self.analyze_documents(documents, job).await
    }

    /// Run over documents whose text is already extracted.
    pub async fn analyze_documents(
        &self,
        documents: Vec<ExtractedDocument>,
        job: &JobContext,
    ) -> Result<AnalysisOutcome> {
        if documents.is_empty() {
            return Err(ScreenerError::NoValidDocuments);
        }

        let start_time = Instant::now();
        let documents_found = documents.len();
        info!(
            "Analyzing {} documents for '{}' (concurrency {})",
            documents_found, job.job_title, self.max_concurrency
        );

        if let Some(progress) = &self.progress {
            progress.set_length(documents_found as u64);
        }

        let semaphore = Arc::new(Semaphore::new(self.max_concurrency));
        let documents: Vec<Arc<ExtractedDocument>> = documents.into_iter().map(Arc::new).collect();

        let handles: Vec<_> = documents
            .iter()
            .map(|document| {
                let document = Arc::clone(document);
                let pipeline = Arc::clone(&self.pipeline);
                let semaphore = Arc::clone(&semaphore);
                let progress = self.progress.clone();
                let job = job.clone();

                tokio::spawn(async move {
                    let _permit = semaphore.acquire_owned().await.ok();
                    let result = pipeline.process(&document, &job).await;
                    if let Some(progress) = progress {
                        progress.set_message(document.name.clone());
                        progress.inc(1);
                    }
                    result
                })
            })
            .collect();

        let mut scored = Vec::with_capacity(documents_found);
        for (document, handle) in documents.iter().zip(handles) {
            match handle.await {
                Ok(result) => scored.push(result),
                Err(e) => {
                    error!("Processing task for {} failed: {}", document.name, e);
                    scored.push(self.pipeline.offline(document));
                }
            }
        }

        if scored.is_empty() {
            return Err(ScreenerError::NoCandidatesScored);
        }

        let ranked = rank_candidates(scored);
        info!(
            "Ranked {} candidates in {}ms",
            ranked.len(),
            start_time.elapsed().as_millis()
        );

        Ok(AnalysisOutcome {
            job: job.clone(),
            ranked,
            documents_found,
            service_used: self.service_name.clone(),
        })
    }
}
