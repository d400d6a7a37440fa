//! CV screener library
//!
//! Extracts text from uploaded CVs, structures each one into a
//! [`CandidateProfile`] with a reasoning service (or offline heuristics),
//! scores it against a job and ranks the batch.

pub mod cli;
pub mod config;
pub mod error;
pub mod input;
pub mod llm;
pub mod market;
pub mod output;
pub mod processing;

pub use config::Config;
pub use error::{Result, ScreenerError};
pub use processing::analyzer::{AnalysisEngine, AnalysisOutcome};
pub use processing::profile::{CandidateProfile, JobContext, RankedCandidate, ScoreCard};
