//! Reasoning-service integration: client, prompts, reply decoding and the
//! extraction/scoring steps built on them

pub mod client;
pub mod decode;
pub mod extractor;
pub mod prompts;
pub mod scorer;

pub use client::{CompletionRequest, OpenAiClient, ReasoningService};
pub use extractor::CvExtractor;
pub use scorer::CandidateScorer;

#[cfg(test)]
pub(crate) mod mock {
    use super::{CompletionRequest, ReasoningService};
    use crate::error::{Result, ScreenerError};
    use async_trait::async_trait;
    use std::sync::Mutex;

    /// Answers every call with the same canned reply, or fails when `reply` is `None`.
    pub struct ScriptedService {
        reply: Option<String>,
        pub requests: Mutex<Vec<CompletionRequest>>,
    }

    impl ScriptedService {
        pub fn replying(reply: &str) -> Self {
            Self {
                reply: Some(reply.to_string()),
                requests: Mutex::new(Vec::new()),
            }
        }

        pub fn failing() -> Self {
            Self {
                reply: None,
                requests: Mutex::new(Vec::new()),
            }
        }
    }

    #[async_trait]
    impl ReasoningService for ScriptedService {
        fn name(&self) -> &str {
            "scripted"
        }

        async fn complete(&self, request: &CompletionRequest) -> Result<String> {
            self.requests.lock().unwrap().push(request.clone());
            self.reply.clone().ok_or(ScreenerError::ReasoningService {
                status: 503,
                message: "service unavailable".to_string(),
            })
        }
    }
}
