use super::TokenRefresher;
use crate::config::MAX_REFRESH_WINDOW_SECS;
use crate::error::{CrmError, CrmResult};
use crate::metrics::Metrics;
use crate::models::{Credential, ProviderId};
use crate::repositories::CredentialStore;
use chrono::{Duration, Utc};
use std::collections::HashMap;
use std::sync::Arc;

/// Keeps credentials usable: refreshes tokens that are about to expire and
/// persists the result.
///
/// Two callers may refresh the same credential concurrently. Each exchange
/// yields a valid token and the store replaces the record whole, so the
/// last write wins with a usable token.
pub struct TokenManager {
    store: Arc<dyn CredentialStore>,
    refreshers: HashMap<ProviderId, Arc<dyn TokenRefresher>>,
    buffer: Duration,
    metrics: Metrics,
}

impl TokenManager {
    /// `buffer_secs` is the lazy-check margin before expiry.
    pub fn new(store: Arc<dyn CredentialStore>, buffer_secs: u64, metrics: Metrics) -> Self {
        Self {
            store,
            refreshers: HashMap::new(),
            buffer: Duration::seconds(buffer_secs.min(MAX_REFRESH_WINDOW_SECS) as i64),
            metrics,
        }
    }

    /// Register the refresher for a provider.
    pub fn with_refresher(mut self, provider: ProviderId, refresher: Arc<dyn TokenRefresher>) -> Self {
        self.refreshers.insert(provider, refresher);
        self
    }

    pub fn store(&self) -> &Arc<dyn CredentialStore> {
        &self.store
    }

    /// Return a credential whose token outlives the buffer, refreshing first if needed.
    ///
    /// A credential already valid past the buffer is returned unchanged with
    /// no refresh call. Refresh failures are returned to the caller.
    pub async fn ensure_valid_token(&self, credential: &Credential) -> CrmResult<Credential> {
        if !credential.expires_within(self.buffer, Utc::now()) {
            return Ok(credential.clone());
        }

        if !credential.can_refresh() {
            tracing::warn!(
                provider = %credential.provider,
                credential_id = %credential.id,
                "Token expiring and no refresh token available"
            );
            return Err(CrmError::MissingRefreshToken(credential.id.clone()));
        }

        tracing::debug!(
            provider = %credential.provider,
            credential_id = %credential.id,
            expires_at = %credential.expires_at,
            "Refreshing token before use"
        );
        self.refresh(credential).await
    }

    /// Exchange the refresh token and persist the new token unconditionally.
    ///
    /// The exchange and the write run as one detached task: once the provider
    /// has consumed the old refresh token, the result is stored even if the
    /// caller is cancelled.
    pub async fn refresh(&self, credential: &Credential) -> CrmResult<Credential> {
        let refresher = self
            .refreshers
            .get(&credential.provider)
            .cloned()
            .ok_or_else(|| {
                CrmError::RefreshFailed(format!(
                    "No token refresher configured for {}",
                    credential.provider
                ))
            })?;

        let task = tokio::spawn(exchange_and_persist(
            refresher,
            self.store.clone(),
            self.metrics.clone(),
            credential.clone(),
        ));
        task.await
            .map_err(|e| CrmError::RefreshFailed(format!("Refresh task failed: {}", e)))?
    }
}

async fn exchange_and_persist(
    refresher: Arc<dyn TokenRefresher>,
    store: Arc<dyn CredentialStore>,
    metrics: Metrics,
    credential: Credential,
) -> CrmResult<Credential> {
    let token = match refresher.refresh(&credential).await {
        Ok(token) => token,
        Err(e) => {
            metrics.record_token_refresh(false);
            return Err(match e {
                e @ (CrmError::RefreshFailed(_) | CrmError::MissingRefreshToken(_)) => e,
                other => CrmError::RefreshFailed(other.to_string()),
            });
        }
    };

    let updated = token.apply(&credential, Utc::now());
    if let Err(e) = store.update(&updated).await {
        metrics.record_token_refresh(false);
        tracing::error!(
            provider = %credential.provider,
            credential_id = %credential.id,
            "Failed to persist refreshed token: {}",
            e
        );
        return Err(e.into());
    }

    metrics.record_token_refresh(true);
    tracing::info!(
        provider = %updated.provider,
        credential_id = %updated.id,
        expires_at = %updated.expires_at,
        "Token refreshed"
    );
    Ok(updated)
}
