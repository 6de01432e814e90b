//! AI text-completion service used for fact extraction.
//!
//! The service is a black box: it takes an instruction prompt plus meeting
//! context and returns free text, which [`crate::prompt::parse_response`]
//! interprets.

mod gemini;

pub use gemini::GeminiClient;

use crate::error::AiResult;
use crate::models::Meeting;
use async_trait::async_trait;

#[async_trait]
pub trait AiService: Send + Sync {
    /// Run `prompt` against the meeting and return the raw response text.
    async fn extract(&self, prompt: &str, meeting: &Meeting) -> AiResult<String>;
}
