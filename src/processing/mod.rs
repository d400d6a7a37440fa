//! Candidate processing: normalization, profiles, heuristics and ranking

pub mod analyzer;
pub mod coerce;
pub mod heuristics;
pub mod profile;
pub mod ranking;
pub mod text_processor;
