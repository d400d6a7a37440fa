//! Ranking of scored candidates

use crate::processing::profile::{CandidateProfile, RankedCandidate};

/// Order candidates by score, highest first.
///
/// The sort is stable: equal scores keep their extraction order. Nothing is
/// truncated here. `-0.0` ranks as `0.0`.
pub fn rank_candidates(scored: Vec<(f64, CandidateProfile)>) -> Vec<RankedCandidate> {
    let mut ranked: Vec<RankedCandidate> = scored
        .into_iter()
        .map(|(score, profile)| RankedCandidate {
            score: score + 0.0,
            profile,
        })
        .collect();

    ranked.sort_by(|a, b| b.score.total_cmp(&a.score));
    ranked
}
