//! Output formatters: console, JSON and Markdown renderings of a screening report

use crate::config::OutputFormat;
use crate::error::Result;
use crate::market::MarketRate;
use crate::output::report::{CandidateRow, ScreeningReport};
use colored::{Color, Colorize};
use std::path::Path;

/// Trait for rendering screening reports
pub trait OutputFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String>;
    fn supports_format(&self) -> OutputFormat;
}

/// Console formatter with optional colors
pub struct ConsoleFormatter {
    use_colors: bool,
    detailed: bool,
}

pub struct JsonFormatter {
    pretty: bool,
}

pub struct MarkdownFormatter {
    include_metadata: bool,
    detailed: bool,
}

/// Report generator that dispatches to the formatter for a format
pub struct ReportGenerator {
    console_formatter: ConsoleFormatter,
    json_formatter: JsonFormatter,
    markdown_formatter: MarkdownFormatter,
}

/// Label for a score, following the bands of the scoring rubric.
pub fn score_band(score: f64) -> &'static str {
    match score {
        s if s >= 90.0 => "EXCEPTIONAL",
        s if s >= 80.0 => "STRONG",
        s if s >= 70.0 => "GOOD",
        s if s >= 60.0 => "MODERATE",
        s if s >= 50.0 => "WEAK",
        _ => "POOR",
    }
}

fn market_line(rate: &MarketRate) -> String {
    match rate {
        MarketRate::Stats {
            min,
            max,
            average,
            count,
        } => format!(
            "{:.0} - {:.0} (average {:.0}, {} samples)",
            min, max, average, count
        ),
        MarketRate::NoData => "no data".to_string(),
    }
}

impl ConsoleFormatter {
    pub fn new(use_colors: bool, detailed: bool) -> Self {
        Self { use_colors, detailed }
    }

    fn colorize(&self, text: &str, color: Color) -> String {
        if self.use_colors {
            text.color(color).to_string()
        } else {
            text.to_string()
        }
    }

    fn format_header(&self, title: &str) -> String {
        if self.use_colors {
            format!("\n{} {}\n", "█".blue().bold(), title.blue().bold())
        } else {
            format!("\n█ {}\n", title)
        }
    }

    fn format_score_badge(&self, score: f64) -> String {
        let band = score_band(score);
        let color = match band {
            "EXCEPTIONAL" => Color::Green,
            "STRONG" => Color::BrightGreen,
            "GOOD" => Color::Yellow,
            "MODERATE" => Color::BrightYellow,
            "WEAK" => Color::Red,
            _ => Color::BrightRed,
        };

        if self.use_colors {
            format!("[{}]", band.color(color).bold())
        } else {
            format!("[{}]", band)
        }
    }

    fn format_row(&self, row: &CandidateRow) -> String {
        let profile = &row.profile;
        let mut output = String::new();

        let name = if self.use_colors {
            profile.candidate_name.bold().to_string()
        } else {
            profile.candidate_name.clone()
        };
        output.push_str(&format!(
            "\n#{:<3} {}  {:.1} {}{}\n",
            row.rank,
            name,
            row.score,
            self.format_score_badge(row.score),
            if row.is_fallback() {
                self.colorize(" (offline estimate)", Color::BrightBlack)
            } else {
                String::new()
            }
        ));
        output.push_str(&format!(
            "     {} | {:.1}y total, {:.1}y relevant | {}\n",
            profile.current_title, profile.total_years, profile.relevant_years, profile.source_file
        ));
        output.push_str(&format!("     {}\n", self.colorize(row.brief_summary(), Color::Cyan)));

        if !profile.must_have_skills.is_empty() {
            output.push_str(&format!("     Skills: {}\n", profile.must_have_skills.join(", ")));
        }

        if self.detailed {
            if !profile.nice_to_have_skills.is_empty() {
                output.push_str(&format!("     Also: {}\n", profile.nice_to_have_skills.join(", ")));
            }
            output.push_str(&format!("     Summary: {}\n", profile.summary));
            for highlight in &profile.experience_highlights {
                output.push_str(&format!("       • {}\n", highlight));
            }
            if !profile.strengths.is_empty() {
                output.push_str(&format!("     Strengths: {}\n", profile.strengths.join("; ")));
            }
            output.push_str(&format!("     Reasoning: {}\n", row.reasoning()));
            output.push_str(&format!("     Notes: {}\n", profile.confidence_notes));
        }

        output
    }
}

impl OutputFormatter for ConsoleFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&self.format_header(&format!("CANDIDATE RANKING: {}", report.job.job_title)));
        output.push_str(&format!(
            "Generated: {} | Documents: {} | Scored: {}\n",
            report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
            report.documents_found,
            report.candidates_scored
        ));

        match &report.service_used {
            Some(model) => output.push_str(&format!("Reasoning service: {}\n", model)),
            None => output.push_str(&format!(
                "{}\n",
                self.colorize("Offline mode: heuristic extraction and fallback scoring", Color::Yellow)
            )),
        }

        if let Some(band) = &report.market {
            output.push_str(&format!("Market rate ({}): {}\n", band.location, market_line(&band.rate)));
        }

        for row in &report.candidates {
            output.push_str(&self.format_row(row));
        }

        let hidden = report.hidden_count();
        if hidden > 0 {
            output.push_str(&format!("\n... and {} more candidates not shown\n", hidden));
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Console
    }
}

impl JsonFormatter {
    pub fn new(pretty: bool) -> Self {
        Self { pretty }
    }
}

impl OutputFormatter for JsonFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        if self.pretty {
            Ok(serde_json::to_string_pretty(report)?)
        } else {
            Ok(serde_json::to_string(report)?)
        }
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Json
    }
}

impl MarkdownFormatter {
    pub fn new(include_metadata: bool, detailed: bool) -> Self {
        Self {
            include_metadata,
            detailed,
        }
    }

    fn escape_cell(text: &str) -> String {
        text.replace('|', "\\|").replace('\n', " ")
    }
}

impl OutputFormatter for MarkdownFormatter {
    fn format_report(&self, report: &ScreeningReport) -> Result<String> {
        let mut output = String::new();

        output.push_str(&format!("# Candidate Ranking: {}\n\n", report.job.job_title));

        if self.include_metadata {
            output.push_str(&format!(
                "**Generated:** {} | **Documents:** {} | **Scored:** {}\n\n",
                report.generated_at.format("%Y-%m-%d %H:%M:%S UTC"),
                report.documents_found,
                report.candidates_scored
            ));
            output.push_str(&format!(
                "**Reasoning service:** {}\n\n",
                report.service_used.as_deref().unwrap_or("offline")
            ));
            if let Some(band) = &report.market {
                output.push_str(&format!(
                    "**Market rate ({}):** {}\n\n",
                    band.location,
                    market_line(&band.rate)
                ));
            }
        }

        output.push_str("| Rank | Candidate | Current Title | Score | Relevant Years | File |\n");
        output.push_str("|------|-----------|---------------|-------|----------------|------|\n");
        for row in &report.candidates {
            output.push_str(&format!(
                "| {} | {} | {} | {:.1} {} | {:.1} | `{}` |\n",
                row.rank,
                Self::escape_cell(&row.profile.candidate_name),
                Self::escape_cell(&row.profile.current_title),
                row.score,
                score_band(row.score),
                row.profile.relevant_years,
                row.profile.source_file
            ));
        }

        let hidden = report.hidden_count();
        if hidden > 0 {
            output.push_str(&format!("\n_{} more candidates not shown._\n", hidden));
        }

        if self.detailed {
            for row in &report.candidates {
                let profile = &row.profile;
                output.push_str(&format!("\n## {}. {}\n\n", row.rank, profile.candidate_name));
                output.push_str(&format!("{}\n\n", row.brief_summary()));
                output.push_str(&format!("**Summary:** {}\n\n", profile.summary));
                if !profile.must_have_skills.is_empty() {
                    output.push_str(&format!("**Skills:** {}\n\n", profile.must_have_skills.join(", ")));
                }
                if !profile.nice_to_have_skills.is_empty() {
                    output.push_str(&format!(
                        "**Additional skills:** {}\n\n",
                        profile.nice_to_have_skills.join(", ")
                    ));
                }
                if !profile.experience_highlights.is_empty() {
                    output.push_str("**Highlights:**\n\n");
                    for highlight in &profile.experience_highlights {
                        output.push_str(&format!("- {}\n", highlight));
                    }
                    output.push('\n');
                }
                output.push_str(&format!("**Reasoning:** {}\n\n", row.reasoning()));
                output.push_str(&format!("**Notes:** {}\n", profile.confidence_notes));
            }
        }

        Ok(output)
    }

    fn supports_format(&self) -> OutputFormat {
        OutputFormat::Markdown
    }
}

impl ReportGenerator {
    pub fn new() -> Self {
        Self::with_options(true, false, true, true)
    }

    pub fn with_options(use_colors: bool, detailed: bool, pretty_json: bool, include_metadata: bool) -> Self {
        Self {
            console_formatter: ConsoleFormatter::new(use_colors, detailed),
            json_formatter: JsonFormatter::new(pretty_json),
            markdown_formatter: MarkdownFormatter::new(include_metadata, detailed),
        }
    }

    pub fn generate_report(&self, report: &ScreeningReport, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Console => self.console_formatter.format_report(report),
            OutputFormat::Json => self.json_formatter.format_report(report),
            OutputFormat::Markdown => self.markdown_formatter.format_report(report),
        }
    }
}

impl Default for ReportGenerator {
    fn default() -> Self {
        Self::new()
    }
}

pub fn save_report_to_file(content: &str, file_path: &Path) -> Result<()> {
    if let Some(parent) = file_path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    std::fs::write(file_path, content)?;
    Ok(())
}
