use crate::client::HttpTransport;
use crate::config::ProviderConfig;
use crate::error::{CrmError, CrmResult};
use crate::models::{Credential, ProviderId, INSTANCE_URL_KEY};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use serde::Deserialize;

/// Lifetime assumed when the token endpoint omits `expires_in` (Salesforce).
pub const DEFAULT_TOKEN_LIFETIME_SECS: i64 = 7200;

/// Upper bound on a reported lifetime (one year).
pub const MAX_TOKEN_LIFETIME_SECS: i64 = 365 * 24 * 3600;

/// Result of one refresh-token exchange.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct RefreshedToken {
    pub access_token: String,

    /// Present only when the provider rotates refresh tokens
    #[serde(default)]
    pub refresh_token: Option<String>,

    #[serde(default)]
    pub expires_in: Option<i64>,

    /// Salesforce may move an org to a new host
    #[serde(default)]
    pub instance_url: Option<String>,
}

impl RefreshedToken {
    /// Apply this token to a credential, returning the updated copy.
    ///
    /// The new expiry is never earlier than `now` and never more than
    /// [`MAX_TOKEN_LIFETIME_SECS`] after it.
    pub fn apply(&self, credential: &Credential, now: DateTime<Utc>) -> Credential {
        let lifetime = self
            .expires_in
            .unwrap_or(DEFAULT_TOKEN_LIFETIME_SECS)
            .clamp(0, MAX_TOKEN_LIFETIME_SECS);

        let mut updated = credential.clone();
        updated.token = self.access_token.clone();
        updated.expires_at = now + Duration::seconds(lifetime);
        if let Some(refresh_token) = self.refresh_token.as_ref().filter(|t| !t.is_empty()) {
            updated.refresh_token = Some(refresh_token.clone());
        }
        if let Some(instance_url) = self.instance_url.as_ref().filter(|u| !u.is_empty()) {
            updated
                .extras
                .insert(INSTANCE_URL_KEY.to_string(), instance_url.clone());
        }
        updated
    }
}

/// Performs the refresh-token exchange for one provider.
#[async_trait]
pub trait TokenRefresher: Send + Sync {
    async fn refresh(&self, credential: &Credential) -> CrmResult<RefreshedToken>;
}

/// Standard OAuth 2.0 `grant_type=refresh_token` exchange.
#[derive(Clone)]
pub struct OAuthTokenRefresher {
    provider: ProviderId,
    config: ProviderConfig,
    transport: HttpTransport,
}

impl OAuthTokenRefresher {
    pub fn new(provider: ProviderId, config: ProviderConfig, transport: HttpTransport) -> Self {
        Self {
            provider,
            config,
            transport,
        }
    }

    fn exchange(&self, refresh_token: &str) -> CrmResult<RefreshedToken> {
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
            ("client_id", self.config.client_id.as_str()),
            ("client_secret", self.config.client_secret.as_str()),
        ];

        let body = self
            .transport
            .post_form(&self.config.token_url, &form)
            .map_err(|e| CrmError::RefreshFailed(format!("{}: {}", self.provider, e)))?;

        let token: RefreshedToken = serde_json::from_value(body).map_err(|e| {
            CrmError::RefreshFailed(format!("{}: malformed token response: {}", self.provider, e))
        })?;
        if token.access_token.is_empty() {
            return Err(CrmError::RefreshFailed(format!(
                "{}: empty access token",
                self.provider
            )));
        }
        Ok(token)
    }
}

#[async_trait]
impl TokenRefresher for OAuthTokenRefresher {
    async fn refresh(&self, credential: &Credential) -> CrmResult<RefreshedToken> {
        let refresh_token = credential
            .refresh_token
            .clone()
            .filter(|t| !t.is_empty())
            .ok_or_else(|| CrmError::MissingRefreshToken(credential.id.clone()))?;
        let this = self.clone();

        tokio::task::spawn_blocking(move || this.exchange(&refresh_token))
            .await
            .map_err(|e| CrmError::RefreshFailed(format!("Task join error: {}", e)))?
    }
}
