//! Reasoning-service client
//!
//! Everything that talks to the external text-generation service goes through
//! [`ReasoningService`]. [`OpenAiClient`] is the production implementation for
//! OpenAI-compatible chat-completion endpoints; tests plug in scripted services.

use crate::config::{Config, ServiceConfig};
use crate::error::{Result, ScreenerError};
use async_trait::async_trait;
use log::debug;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// One prompt round-trip.
#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub system: Option<String>,
    pub prompt: String,
    pub temperature: f32,
    pub max_tokens: u32,
}

#[async_trait]
pub trait ReasoningService: Send + Sync {
    /// Model or provider name, for logs and reports.
    fn name(&self) -> &str;

    /// Single attempt; returns the raw text reply.
    async fn complete(&self, request: &CompletionRequest) -> Result<String>;
}

#[derive(Debug, Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    choices: Vec<Choice>,
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ApiError {
    error: ApiErrorBody,
}

#[derive(Debug, Deserialize)]
struct ApiErrorBody {
    message: String,
}

/// Chat-completions client for OpenAI and compatible providers.
#[derive(Clone)]
pub struct OpenAiClient {
    client: Client,
    endpoint: String,
    api_key: String,
    model: String,
    json_response_format: bool,
}

impl OpenAiClient {
    pub fn new(api_key: String, settings: &ServiceConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(settings.timeout_secs))
            .build()?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", settings.base_url.trim_end_matches('/')),
            api_key,
            model: settings.model.clone(),
            json_response_format: settings.json_response_format,
        })
    }

    /// `None` when no API key is configured.
    pub fn from_config(config: &Config) -> Result<Option<Self>> {
        match config.api_key() {
            Some(api_key) => Ok(Some(Self::new(api_key, &config.service)?)),
            None => Ok(None),
        }
    }

    fn build_body<'a>(&'a self, request: &'a CompletionRequest) -> ChatRequest<'a> {
        let mut messages = Vec::with_capacity(2);
        if let Some(system) = &request.system {
            messages.push(ChatMessage {
                role: "system",
                content: system,
            });
        }
        messages.push(ChatMessage {
            role: "user",
            content: &request.prompt,
        });

        ChatRequest {
            model: &self.model,
            messages,
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            response_format: self
                .json_response_format
                .then_some(ResponseFormat { kind: "json_object" }),
        }
    }
}

fn first_content(response: ChatResponse) -> Result<String> {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .unwrap_or_default();

    if text.is_empty() {
        Err(ScreenerError::EmptyResponse)
    } else {
        Ok(text)
    }
}

#[async_trait]
impl ReasoningService for OpenAiClient {
    fn name(&self) -> &str {
        &self.model
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String> {
        let response = self
            .client
            .post(&self.endpoint)
            .bearer_auth(&self.api_key)
            .json(&self.build_body(request))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = serde_json::from_str::<ApiError>(&body)
                .map(|e| e.error.message)
                .unwrap_or(body);
            return Err(ScreenerError::ReasoningService {
                status: status.as_u16(),
                message,
            });
        }

        let chat: ChatResponse = response.json().await?;
        if let Some(usage) = &chat.usage {
            debug!(
                "Completion succeeded: prompt_tokens={}, completion_tokens={}",
                usage.prompt_tokens, usage.completion_tokens
            );
        }

        first_content(chat)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn client(json_mode: bool) -> OpenAiClient {
        let mut settings = Config::default().service;
        settings.base_url = "http://localhost:9999/v1/".to_string();
        settings.json_response_format = json_mode;
        OpenAiClient::new("sk-test".to_string(), &settings).unwrap()
    }

    #[test]
    fn test_endpoint_joins_base_url() {
        assert_eq!(client(true).endpoint, "http://localhost:9999/v1/chat/completions");
    }

    #[test]
    fn test_request_body_shape() {
        let request = CompletionRequest {
            system: Some("You are a recruiter.".to_string()),
            prompt: "Score this".to_string(),
            temperature: 0.1,
            max_tokens: 1000,
        };

        let json_client = client(true);
        let body = serde_json::to_value(json_client.build_body(&request)).unwrap();
        assert_eq!(body["model"], "gpt-4o-mini");
        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Score this");
        assert_eq!(body["response_format"]["type"], "json_object");
        assert_eq!(body["max_tokens"], 1000);

        let plain = client(false);
        let body = serde_json::to_value(plain.build_body(&request)).unwrap();
        assert!(body.get("response_format").is_none());
    }

    #[test]
    fn test_first_content_extraction() {
        let response: ChatResponse = serde_json::from_str(
            r#"{"choices":[{"message":{"role":"assistant","content":"  {\"score\": 80}\n"}}]}"#,
        )
        .unwrap();
        assert_eq!(first_content(response).unwrap(), "{\"score\": 80}");

        let empty: ChatResponse = serde_json::from_str(r#"{"choices":[]}"#).unwrap();
        assert!(matches!(first_content(empty), Err(ScreenerError::EmptyResponse)));
    }

    #[test]
    fn test_from_config_without_key_is_none() {
        let mut config = Config::default();
        config.service.api_key_env = "CV_SCREENER_TEST_UNSET_KEY".to_string();
        std::env::remove_var("CV_SCREENER_TEST_UNSET_KEY");
        assert!(OpenAiClient::from_config(&config).unwrap().is_none());
    }
}
