use super::AiService;
use crate::config::Config;
use crate::error::{AiError, AiResult};
use crate::metrics::HttpTimer;
use crate::metrics::Metrics;
use crate::models::Meeting;
use async_trait::async_trait;
use serde::Deserialize;
use serde_json::json;
use std::sync::Arc;
use std::time::Duration;

#[derive(Debug, Deserialize)]
struct GenerateResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: Option<CandidateContent>,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<Part>,
}

#[derive(Debug, Deserialize)]
struct Part {
    #[serde(default)]
    text: Option<String>,
}

/// Google Gemini `generateContent` client.
#[derive(Clone)]
pub struct GeminiClient {
    base_url: String,
    model: String,
    api_key: Option<String>,
    agent: Arc<ureq::Agent>,
    metrics: Metrics,
}

impl GeminiClient {
    pub fn new(config: &Config, metrics: Metrics) -> Self {
        Self::with_base_url(
            config.gemini_api_url.clone(),
            config.gemini_model.clone(),
            config.gemini_api_key.clone(),
            Duration::from_secs(config.request_timeout.max(30)),
            metrics,
        )
    }

    /// Create a client with an explicit endpoint (useful for testing).
    pub fn with_base_url(
        base_url: String,
        model: String,
        api_key: Option<String>,
        timeout: Duration,
        metrics: Metrics,
    ) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            base_url,
            model,
            api_key,
            agent: Arc::new(agent),
            metrics,
        }
    }

    fn generate(&self, text: &str) -> AiResult<String> {
        let api_key = self.api_key.as_deref().ok_or(AiError::MissingApiKey)?;
        let url = format!(
            "{}/v1beta/models/{}:generateContent?key={}",
            self.base_url.trim_end_matches('/'),
            self.model,
            urlencoding::encode(api_key)
        );
        let body = json!({
            "contents": [{ "role": "user", "parts": [{ "text": text }] }],
            "generationConfig": { "temperature": 0.0 }
        });

        tracing::debug!("POST {}/v1beta/models/{}:generateContent", self.base_url, self.model);
        let timer = HttpTimer::new(self.metrics.clone());
        let response = match self
            .agent
            .post(&url)
            .set("Content-Type", "application/json")
            .send_json(&body)
        {
            Ok(response) => {
                timer.complete();
                response
            }
            Err(e) => {
                timer.complete_with_error();
                return Err(map_error(e));
            }
        };

        let parsed: GenerateResponse = response
            .into_json()
            .map_err(|e| AiError::HttpError(e.to_string()))?;

        parsed
            .candidates
            .into_iter()
            .next()
            .and_then(|c| c.content)
            .and_then(|c| c.parts.into_iter().find_map(|p| p.text))
            .filter(|text| !text.trim().is_empty())
            .ok_or(AiError::EmptyResponse)
    }
}

fn map_error(error: ureq::Error) -> AiError {
    match error {
        ureq::Error::Status(status, response) => AiError::ApiError {
            status,
            message: response
                .into_string()
                .unwrap_or_else(|_| "Unknown error".to_string()),
        },
        ureq::Error::Transport(transport) => AiError::HttpError(transport.to_string()),
    }
}

#[async_trait]
impl AiService for GeminiClient {
    async fn extract(&self, prompt: &str, meeting: &Meeting) -> AiResult<String> {
        if self.api_key.is_none() {
            return Err(AiError::MissingApiKey);
        }
        let text = format!("{}\n\n{}", prompt, meeting.to_context());
        let client = self.clone();

        tokio::task::spawn_blocking(move || client.generate(&text))
            .await
            .map_err(|e| AiError::HttpError(format!("Task join error: {}", e)))?
    }
}
