//! Screening report assembled from an analysis run

use crate::market::MarketRate;
use crate::processing::analyzer::AnalysisOutcome;
use crate::processing::profile::{CandidateProfile, JobContext};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Everything the formatters render
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScreeningReport {
    pub job: JobContext,
    pub generated_at: DateTime<Utc>,
    pub documents_found: usize,
    pub candidates_scored: usize,
    /// Model name, or `None` for an offline run
    pub service_used: Option<String>,
    pub market: Option<MarketBand>,
    /// Top rows only; `candidates_scored` counts all of them
    pub candidates: Vec<CandidateRow>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MarketBand {
    pub location: String,
    pub rate: MarketRate,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CandidateRow {
    /// 1-based position in the full ranking
    pub rank: usize,
    pub score: f64,
    pub profile: CandidateProfile,
}

impl CandidateRow {
    pub fn is_fallback(&self) -> bool {
        self.profile.score.as_ref().map(|card| card.fallback).unwrap_or(true)
    }

    pub fn brief_summary(&self) -> &str {
        self.profile
            .score
            .as_ref()
            .map(|card| card.brief_summary.as_str())
            .unwrap_or("")
    }

    pub fn reasoning(&self) -> &str {
        self.profile
            .score
            .as_ref()
            .map(|card| card.ai_reasoning.as_str())
            .unwrap_or("")
    }
}

impl ScreeningReport {
    /// Keep the best `limit` candidates of `outcome` for display.
    pub fn from_outcome(outcome: AnalysisOutcome, limit: usize) -> Self {
        let candidates_scored = outcome.ranked.len();
        let candidates = outcome
            .ranked
            .into_iter()
            .take(limit)
            .enumerate()
            .map(|(index, ranked)| CandidateRow {
                rank: index + 1,
                score: ranked.score,
                profile: ranked.profile,
            })
            .collect();

        Self {
            job: outcome.job,
            generated_at: Utc::now(),
            documents_found: outcome.documents_found,
            candidates_scored,
            service_used: outcome.service_used,
            market: None,
            candidates,
        }
    }

    pub fn with_market(mut self, location: impl Into<String>, rate: MarketRate) -> Self {
        self.market = Some(MarketBand {
            location: location.into(),
            rate,
        });
        self
    }

    /// Candidates scored but left out of the display
    pub fn hidden_count(&self) -> usize {
        self.candidates_scored.saturating_sub(self.candidates.len())
    }
}
