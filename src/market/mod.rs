//! Salary market-rate lookup
//!
//! Informational only: nothing in scoring or ranking reads these numbers.

use crate::config::MarketConfig;
use crate::error::{Result, ScreenerError};
use async_trait::async_trait;
use log::debug;
use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Salary band for a role, or an explicit absence of data
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum MarketRate {
    Stats {
        min: f64,
        max: f64,
        average: f64,
        count: u32,
    },
    NoData,
}

#[async_trait]
pub trait MarketRateLookup: Send + Sync {
    async fn lookup(&self, job_title: &str, location: &str) -> Result<MarketRate>;
}

#[derive(Debug, Default, Deserialize)]
struct RateBody {
    min: Option<f64>,
    max: Option<f64>,
    average: Option<f64>,
    #[serde(default)]
    count: u32,
}

impl RateBody {
    fn into_rate(self) -> MarketRate {
        match (self.min, self.max, self.average) {
            (Some(min), Some(max), Some(average)) if self.count > 0 => MarketRate::Stats {
                min,
                max,
                average,
                count: self.count,
            },
            _ => MarketRate::NoData,
        }
    }
}

/// Key-value HTTP lookup: `GET {base_url}?title=..&location=..`
pub struct HttpMarketRates {
    client: Client,
    base_url: String,
}

impl HttpMarketRates {
    pub fn new(base_url: impl Into<String>, timeout_secs: u64) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(timeout_secs))
            .build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
        })
    }

    /// `None` when no lookup URL is configured.
    pub fn from_config(config: &MarketConfig) -> Result<Option<Self>> {
        match config.base_url.as_deref().map(str::trim) {
            Some(url) if !url.is_empty() => Ok(Some(Self::new(url, config.timeout_secs)?)),
            _ => Ok(None),
        }
    }
}

#[async_trait]
impl MarketRateLookup for HttpMarketRates {
    async fn lookup(&self, job_title: &str, location: &str) -> Result<MarketRate> {
        let response = self
            .client
            .get(&self.base_url)
            .query(&[("title", job_title), ("location", location)])
            .send()
            .await?;

        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            debug!("No market data for '{}' in '{}'", job_title, location);
            return Ok(MarketRate::NoData);
        }
        if !status.is_success() {
            return Err(ScreenerError::MarketRate(format!(
                "lookup returned status {}",
                status.as_u16()
            )));
        }

        let body = response.text().await?;
        parse_rate(&body)
    }
}

fn parse_rate(body: &str) -> Result<MarketRate> {
    if body.trim().is_empty() {
        return Ok(MarketRate::NoData);
    }
    let parsed: RateBody = serde_json::from_str(body)?;
    Ok(parsed.into_rate())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_stats_body() {
        let rate = parse_rate(r#"{"min": 55000, "max": 90000.5, "average": 72000, "count": 14}"#).unwrap();
        assert_eq!(
            rate,
            MarketRate::Stats {
                min: 55000.0,
                max: 90000.5,
                average: 72000.0,
                count: 14
            }
        );
    }

    #[test]
    fn test_zero_count_or_missing_stats_is_no_data() {
        assert_eq!(
            parse_rate(r#"{"min": 1, "max": 2, "average": 1.5, "count": 0}"#).unwrap(),
            MarketRate::NoData
        );
        assert_eq!(parse_rate(r#"{"count": 3}"#).unwrap(), MarketRate::NoData);
        assert_eq!(parse_rate("").unwrap(), MarketRate::NoData);
    }

    #[test]
    fn test_invalid_body_is_an_error() {
        assert!(parse_rate("<html>oops</html>").is_err());
    }

    #[test]
    fn test_disabled_without_url() {
        let config = MarketConfig {
            base_url: Some("  ".to_string()),
            timeout_secs: 10,
        };
        assert!(HttpMarketRates::from_config(&config).unwrap().is_none());
        assert!(HttpMarketRates::from_config(&MarketConfig::default()).unwrap().is_none());
    }
}
