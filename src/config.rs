//! Configuration management for the CV screener

use crate::error::{Result, ScreenerError};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    pub service: ServiceConfig,
    pub processing: ProcessingConfig,
    pub output: OutputConfig,
    #[serde(default)]
    pub market: MarketConfig,
}

/// Settings for the OpenAI-compatible reasoning service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    pub base_url: String,
    pub model: String,
    /// Name of the environment variable holding the API key
    pub api_key_env: String,
    pub timeout_secs: u64,
    pub extraction_temperature: f32,
    pub extraction_max_tokens: u32,
    pub scoring_temperature: f32,
    pub scoring_max_tokens: u32,
    pub json_response_format: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProcessingConfig {
    /// Candidates processed at once; 1 keeps the pipeline strictly sequential
    pub max_concurrency: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct OutputConfig {
    pub format: OutputFormat,
    pub max_display: usize,
    pub color_output: bool,
    pub detailed: bool,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct MarketConfig {
    pub base_url: Option<String>,
    #[serde(default = "default_market_timeout")]
    pub timeout_secs: u64,
}

fn default_market_timeout() -> u64 {
    10
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum OutputFormat {
    Console,
    Json,
    Markdown,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            service: ServiceConfig {
                base_url: "https://api.openai.com/v1".to_string(),
                model: "gpt-4o-mini".to_string(),
                api_key_env: "OPENAI_API_KEY".to_string(),
                timeout_secs: 60,
                extraction_temperature: 0.3,
                extraction_max_tokens: 1500,
                scoring_temperature: 0.1,
                scoring_max_tokens: 1000,
                json_response_format: true,
            },
            processing: ProcessingConfig { max_concurrency: 4 },
            output: OutputConfig {
                format: OutputFormat::Console,
                max_display: 50,
                color_output: true,
                detailed: false,
            },
            market: MarketConfig {
                base_url: None,
                timeout_secs: default_market_timeout(),
            },
        }
    }
}

impl Config {
    /// Load from the default location, writing the defaults there on first run.
    pub fn load() -> Result<Self> {
        let config_path = Self::config_path();

        if config_path.exists() {
            Self::load_from(&config_path)
        } else {
            let config = Self::default();
            config.save()?;
            Ok(config)
        }
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)?;
        toml::from_str(&content).map_err(|e| {
            ScreenerError::Configuration(format!("Failed to parse config '{}': {}", path.display(), e))
        })
    }

    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path())
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)
            .map_err(|e| ScreenerError::Configuration(format!("Failed to serialize config: {}", e)))?;

        std::fs::write(path, content)?;
        Ok(())
    }

    pub fn config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| dirs::home_dir().unwrap_or_else(|| PathBuf::from(".")))
            .join("cv-screener")
            .join("config.toml")
    }

    /// API key for the reasoning service, if one is set and non-blank.
    pub fn api_key(&self) -> Option<String> {
        std::env::var(&self.service.api_key_env)
            .ok()
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_values() {
        let config = Config::default();
        assert_eq!(config.service.model, "gpt-4o-mini");
        assert_eq!(config.output.max_display, 50);
        assert!(config.market.base_url.is_none());
        assert!(config.service.scoring_temperature < config.service.extraction_temperature);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("config.toml");

        let mut config = Config::default();
        config.processing.max_concurrency = 1;
        config.output.format = OutputFormat::Markdown;
        config.save_to(&path).unwrap();

        let loaded = Config::load_from(&path).unwrap();
        assert_eq!(loaded.processing.max_concurrency, 1);
        assert_eq!(loaded.output.format, OutputFormat::Markdown);
    }

    #[test]
    fn test_invalid_config_is_configuration_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "service = 12").unwrap();

        let err = Config::load_from(&path).unwrap_err();
        assert!(matches!(err, ScreenerError::Configuration(_)));
    }

    #[test]
    fn test_blank_api_key_is_not_configured() {
        let mut config = Config::default();
        config.service.api_key_env = "CV_SCREENER_TEST_BLANK_KEY".to_string();
        std::env::set_var("CV_SCREENER_TEST_BLANK_KEY", "   ");
        assert!(config.api_key().is_none());

        std::env::set_var("CV_SCREENER_TEST_BLANK_KEY", " sk-test ");
        assert_eq!(config.api_key().as_deref(), Some("sk-test"));
    }
}
