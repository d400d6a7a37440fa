//! CV screener: rank candidate CVs against a job description

use anyhow::{bail, Context};
use clap::Parser;
use cv_screener::cli::{self, Cli, Commands, ConfigAction};
use cv_screener::input::InputManager;
use cv_screener::market::{HttpMarketRates, MarketRateLookup};
use cv_screener::output::formatter::save_report_to_file;
use cv_screener::output::{ReportGenerator, ScreeningReport};
use cv_screener::{AnalysisEngine, Config, JobContext, ScreenerError};
use indicatif::{ProgressBar, ProgressStyle};
use log::{error, info, warn};
use std::path::{Path, PathBuf};
use std::process;

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(log_level)).init();

    if let Err(e) = run(cli).await {
        error!("{:#}", e);
        process::exit(1);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config_path = cli.config.clone().unwrap_or_else(Config::config_path);

    match cli.command {
        Commands::Config { action } => run_config(action, &config_path),
        Commands::Analyze {
            title,
            description,
            description_file,
            location,
            output,
            save,
            top,
            offline,
            detailed,
            files,
        } => {
            let config = load_config(cli.config.as_deref())?;

            let description = match (description, description_file) {
                (Some(text), _) => text,
                (None, Some(path)) => std::fs::read_to_string(&path)
                    .with_context(|| format!("Failed to read job description from {}", path.display()))?,
                (None, None) => String::new(),
            };
            let job = validate_job(&title, &description)?;

            let format = match output {
                Some(format) => cli::parse_output_format(&format).map_err(anyhow::Error::msg)?,
                None => config.output.format,
            };

            let request = AnalyzeRequest {
                job,
                location,
                files,
                save,
                top: top.unwrap_or(config.output.max_display),
                offline,
                detailed: detailed || config.output.detailed,
                format,
            };
            run_analyze(request, &config).await
        }
    }
}

struct AnalyzeRequest {
    job: JobContext,
    location: Option<String>,
    files: Vec<PathBuf>,
    save: Option<PathBuf>,
    top: usize,
    offline: bool,
    detailed: bool,
    format: cv_screener::config::OutputFormat,
}

fn load_config(path: Option<&Path>) -> anyhow::Result<Config> {
    match path {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load configuration from {}", path.display())),
        None => Config::load().context("Failed to load configuration"),
    }
}

/// Title and description must both be non-blank.
fn validate_job(title: &str, description: &str) -> Result<JobContext, ScreenerError> {
    if title.trim().is_empty() {
        return Err(ScreenerError::InvalidInput("job title must not be empty".to_string()));
    }
    if description.trim().is_empty() {
        return Err(ScreenerError::InvalidInput(
            "job description must not be empty".to_string(),
        ));
    }
    Ok(JobContext::new(title.trim(), description.trim()))
}

async fn run_analyze(request: AnalyzeRequest, config: &Config) -> anyhow::Result<()> {
    info!("Screening CVs for '{}'", request.job.job_title);

    let blobs = InputManager::new().read_paths(&request.files).await?;
    info!("Read {} uploaded files", blobs.len());

    let engine = if request.offline {
        AnalysisEngine::with_service(config, None)
    } else {
        AnalysisEngine::new(config)?
    };

    if !engine.is_service_configured() {
        warn!(
            "No reasoning service configured (set {} or drop --offline); using offline heuristics and fallback scoring",
            config.service.api_key_env
        );
    }

    let progress = ProgressBar::new(0);
    progress.set_style(
        ProgressStyle::with_template("{spinner:.green} [{bar:30.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar()),
    );
    let engine = engine.with_progress(progress.clone());

    let outcome = match engine.analyze(blobs, &request.job).await {
        Ok(outcome) => outcome,
        Err(ScreenerError::NoValidDocuments) => {
            progress.finish_and_clear();
            bail!("No valid CV documents found. Supported formats: PDF, DOCX, TXT and ZIP archives of them.");
        }
        Err(e) => {
            progress.finish_and_clear();
            return Err(e.into());
        }
    };
    progress.finish_and_clear();

    let mut report = ScreeningReport::from_outcome(outcome, request.top);

    if let Some(location) = request.location.as_deref() {
        match HttpMarketRates::from_config(&config.market)? {
            Some(lookup) => match lookup.lookup(&request.job.job_title, location).await {
                Ok(rate) => report = report.with_market(location, rate),
                Err(e) => warn!("Market-rate lookup failed: {}", e),
            },
            None => info!("No market-rate service configured, skipping salary lookup"),
        }
    }

    let generator = ReportGenerator::with_options(
        config.output.color_output && request.save.is_none(),
        request.detailed,
        true,
        true,
    );
    let rendered = generator.generate_report(&report, request.format)?;

    match &request.save {
        Some(path) => {
            save_report_to_file(&rendered, path)?;
            info!("Report saved to {}", path.display());
        }
        None => println!("{}", rendered),
    }

    Ok(())
}

fn run_config(action: Option<ConfigAction>, path: &Path) -> anyhow::Result<()> {
    match action {
        Some(ConfigAction::Show) | None => {
            let config = if path.exists() {
                Config::load_from(path)?
            } else {
                Config::default()
            };
            let rendered = toml::to_string_pretty(&config).context("Failed to render configuration")?;
            println!("# {}\n{}", path.display(), rendered);
            println!(
                "API key ({}): {}",
                config.service.api_key_env,
                if config.api_key().is_some() { "set" } else { "not set" }
            );
        }
        Some(ConfigAction::Reset) => {
            Config::default().save_to(path)?;
            println!("Configuration reset to defaults at {}", path.display());
        }
        Some(ConfigAction::Path) => println!("{}", path.display()),
    }
    Ok(())
}
