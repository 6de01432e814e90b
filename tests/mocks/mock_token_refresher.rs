use async_trait::async_trait;
use crm_sync::auth::{RefreshedToken, TokenRefresher};
use crm_sync::error::{CrmError, CrmResult};
use crm_sync::models::Credential;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Mock refresher issuing `<credential id>-refreshed-<n>` tokens valid for one hour.
#[derive(Clone, Default)]
pub struct MockTokenRefresher {
    failing: Arc<Mutex<HashSet<String>>>,
    calls: Arc<Mutex<HashMap<String, usize>>>,
    delay: Arc<Mutex<Option<Duration>>>,
    rotate: Arc<Mutex<bool>>,
}

impl MockTokenRefresher {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make refreshes of this credential fail.
    pub fn fail_for(&self, credential_id: &str) {
        self.failing
            .lock()
            .unwrap()
            .insert(credential_id.to_string());
    }

    /// Wait this long before answering each refresh.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    /// Issue `<credential id>-rotated-<n>` refresh tokens.
    pub fn rotate_refresh_tokens(&self) {
        *self.rotate.lock().unwrap() = true;
    }

    pub fn calls_for(&self, credential_id: &str) -> usize {
        *self.calls.lock().unwrap().get(credential_id).unwrap_or(&0)
    }

    pub fn total_calls(&self) -> usize {
        self.calls.lock().unwrap().values().sum()
    }
}

#[async_trait]
impl TokenRefresher for MockTokenRefresher {
    async fn refresh(&self, credential: &Credential) -> CrmResult<RefreshedToken> {
        let n = {
            let mut calls = self.calls.lock().unwrap();
            let n = calls.entry(credential.id.clone()).or_insert(0);
            *n += 1;
            *n
        };

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        if self.failing.lock().unwrap().contains(&credential.id) {
            return Err(CrmError::RefreshFailed("invalid_grant".to_string()));
        }

        Ok(RefreshedToken {
            access_token: format!("{}-refreshed-{}", credential.id, n),
            refresh_token: self
                .rotate
                .lock()
                .unwrap()
                .then(|| format!("{}-rotated-{}", credential.id, n)),
            expires_in: Some(3600),
            instance_url: None,
        })
    }
}
