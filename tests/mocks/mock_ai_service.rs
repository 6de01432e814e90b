use async_trait::async_trait;
use crm_sync::ai::AiService;
use crm_sync::error::{AiError, AiResult};
use crm_sync::models::Meeting;
use std::sync::{Arc, Mutex};

/// Mock AI service returning a canned response.
#[derive(Clone)]
pub struct MockAiService {
    response: Arc<Mutex<Option<String>>>,
    prompts: Arc<Mutex<Vec<String>>>,
}

impl MockAiService {
    /// Always answer with `response`.
    pub fn returning(response: &str) -> Self {
        Self {
            response: Arc::new(Mutex::new(Some(response.to_string()))),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Always fail with a 503.
    pub fn failing() -> Self {
        Self {
            response: Arc::new(Mutex::new(None)),
            prompts: Arc::new(Mutex::new(Vec::new())),
        }
    }

    pub fn prompts(&self) -> Vec<String> {
        self.prompts.lock().unwrap().clone()
    }
}

#[async_trait]
impl AiService for MockAiService {
    async fn extract(&self, prompt: &str, _meeting: &Meeting) -> AiResult<String> {
        self.prompts.lock().unwrap().push(prompt.to_string());
        self.response
            .lock()
            .unwrap()
            .clone()
            .ok_or(AiError::ApiError {
                status: 503,
                message: "model overloaded".to_string(),
            })
    }
}
