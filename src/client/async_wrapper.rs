//! Async wrapper around the synchronous provider clients.
//!
//! Every call first passes the credential through
//! [`TokenManager::ensure_valid_token`], then runs the blocking HTTP work on
//! the `spawn_blocking` pool so the async runtime is never blocked.

use crate::auth::TokenManager;
use crate::client::{BlockingCrmClient, CrmProvider};
use crate::error::{CrmError, CrmResult};
use crate::models::{Credential, ProviderContact, ProviderId};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;

/// Async, token-aware adapter over a [`BlockingCrmClient`].
pub struct AsyncCrmClient<C> {
    client: Arc<C>,
    tokens: Arc<TokenManager>,
}

impl<C> Clone for AsyncCrmClient<C> {
    fn clone(&self) -> Self {
        Self {
            client: self.client.clone(),
            tokens: self.tokens.clone(),
        }
    }
}

impl<C: BlockingCrmClient> AsyncCrmClient<C> {
    pub fn new(client: C, tokens: Arc<TokenManager>) -> Self {
        Self {
            client: Arc::new(client),
            tokens,
        }
    }

    async fn valid(&self, credential: &Credential) -> CrmResult<Credential> {
        if credential.provider != self.client.provider() {
            return Err(CrmError::InvalidRequest(format!(
                "Credential {} belongs to {}, not {}",
                credential.id,
                credential.provider,
                self.client.provider()
            )));
        }
        self.tokens.ensure_valid_token(credential).await
    }
}

fn join_error(e: tokio::task::JoinError) -> CrmError {
    CrmError::HttpError(format!("Task join error: {}", e))
}

#[async_trait]
impl<C: BlockingCrmClient> CrmProvider for AsyncCrmClient<C> {
    fn id(&self) -> ProviderId {
        self.client.provider()
    }

    async fn search_contacts(
        &self,
        credential: &Credential,
        query: &str,
    ) -> CrmResult<Vec<ProviderContact>> {
        let credential = self.valid(credential).await?;
        let client = self.client.clone();
        let query = query.to_string();

        tokio::task::spawn_blocking(move || client.search_contacts(&credential, &query))
            .await
            .map_err(join_error)?
    }

    async fn get_contact(
        &self,
        credential: &Credential,
        contact_id: &str,
    ) -> CrmResult<ProviderContact> {
        let credential = self.valid(credential).await?;
        let client = self.client.clone();
        let contact_id = contact_id.to_string();

        tokio::task::spawn_blocking(move || client.get_contact(&credential, &contact_id))
            .await
            .map_err(join_error)?
    }

    async fn update_contact(
        &self,
        credential: &Credential,
        contact_id: &str,
        updates: &Map<String, Value>,
    ) -> CrmResult<ProviderContact> {
        let credential = self.valid(credential).await?;
        let client = self.client.clone();
        let contact_id = contact_id.to_string();
        let updates = updates.clone();

        tokio::task::spawn_blocking(move || {
            client.update_contact(&credential, &contact_id, &updates)
        })
        .await
        .map_err(join_error)?
    }
}
