//! CLI interface for the CV screener

use crate::config::OutputFormat;
use clap::{ArgGroup, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "cv-screener")]
#[command(about = "Rank candidate CVs against a job description")]
#[command(
    long_about = "Extract text from CV files (PDF, DOCX, TXT, ZIP), structure each CV into a candidate profile with a reasoning service, and rank the candidates against the job. Without an API key the tool falls back to deterministic offline heuristics."
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Configuration file path
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Screen and rank CVs for a job
    #[command(group(ArgGroup::new("job_description").required(true).args(["description", "description_file"])))]
    Analyze {
        /// Job title
        #[arg(short, long)]
        title: String,

        /// Job description text
        #[arg(short, long)]
        description: Option<String>,

        /// Read the job description from a file
        #[arg(long)]
        description_file: Option<PathBuf>,

        /// Location for the salary market-rate lookup
        #[arg(short, long)]
        location: Option<String>,

        /// Output format: console, json, markdown
        #[arg(short, long)]
        output: Option<String>,

        /// Save output to file
        #[arg(short, long)]
        save: Option<PathBuf>,

        /// Number of candidates to display
        #[arg(long)]
        top: Option<usize>,

        /// Skip the reasoning service even if an API key is set
        #[arg(long)]
        offline: bool,

        /// Include full profiles and scoring reasoning
        #[arg(long)]
        detailed: bool,

        /// CV files, archives or directories
        #[arg(required = true)]
        files: Vec<PathBuf>,
    },

    /// Show or reset configuration
    Config {
        #[command(subcommand)]
        action: Option<ConfigAction>,
    },
}

#[derive(Subcommand)]
pub enum ConfigAction {
    /// Show current configuration
    Show,

    /// Reset configuration to defaults
    Reset,

    /// Print the configuration file path
    Path,
}

/// Parse and validate output format
pub fn parse_output_format(format: &str) -> Result<OutputFormat, String> {
    match format.to_lowercase().as_str() {
        "console" => Ok(OutputFormat::Console),
        "json" => Ok(OutputFormat::Json),
        "markdown" | "md" => Ok(OutputFormat::Markdown),
        _ => Err(format!(
            "Invalid output format: {}. Supported: console, json, markdown",
            format
        )),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_output_format() {
        assert_eq!(parse_output_format("JSON"), Ok(OutputFormat::Json));
        assert_eq!(parse_output_format("md"), Ok(OutputFormat::Markdown));
        assert!(parse_output_format("html").is_err());
    }

    #[test]
    fn test_analyze_requires_a_description() {
        let missing = Cli::try_parse_from(["cv-screener", "analyze", "--title", "Engineer", "cv.pdf"]);
        assert!(missing.is_err());

        let cli = Cli::try_parse_from([
            "cv-screener",
            "analyze",
            "--title",
            "Engineer",
            "--description",
            "Rust services",
            "--top",
            "10",
            "a.pdf",
            "b.zip",
        ])
        .unwrap();

        match cli.command {
            Commands::Analyze { files, top, offline, .. } => {
                assert_eq!(files.len(), 2);
                assert_eq!(top, Some(10));
                assert!(!offline);
            }
            _ => panic!("expected analyze"),
        }
    }

    #[test]
    fn test_description_sources_conflict() {
        let both = Cli::try_parse_from([
            "cv-screener",
            "analyze",
            "-t",
            "Engineer",
            "-d",
            "text",
            "--description-file",
            "job.txt",
            "cv.pdf",
        ]);
        assert!(both.is_err());
    }
}
