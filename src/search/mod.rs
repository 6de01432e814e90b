//! Concurrent contact search across local storage and connected CRMs.
//!
//! One task per source is spawned and all of them share a single deadline.
//! Whatever has not finished by then is aborted and contributes nothing;
//! errors and panics contribute nothing either. The merged, name-sorted
//! result is always returned.

mod merge;

pub use merge::{merge_candidates, sort_by_name};

use crate::client::CrmProvider;
use crate::metrics::Metrics;
use crate::models::{CanonicalContact, Credential};
use crate::repositories::{CredentialStore, LocalContactStore};
use futures::future::join_all;
use std::sync::Arc;
use std::time::Duration;
use tokio::task::JoinHandle;
use tokio::time::{timeout_at, Instant};

pub struct ContactSearch {
    local: Arc<dyn LocalContactStore>,
    credentials: Arc<dyn CredentialStore>,
    providers: Vec<Arc<dyn CrmProvider>>,
    timeout: Duration,
    metrics: Metrics,
}

impl ContactSearch {
    pub fn new(
        local: Arc<dyn LocalContactStore>,
        credentials: Arc<dyn CredentialStore>,
        providers: Vec<Arc<dyn CrmProvider>>,
        timeout: Duration,
        metrics: Metrics,
    ) -> Self {
        Self {
            local,
            credentials,
            providers,
            timeout,
            metrics,
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Search every source the user has, within one overall time budget.
    pub async fn search(&self, user_id: &str, query: &str) -> Vec<CanonicalContact> {
        let deadline = Instant::now() + self.timeout;
        let mut tasks: Vec<(String, JoinHandle<Vec<CanonicalContact>>)> = Vec::new();

        tasks.push(("local".to_string(), self.spawn_local(user_id, query)));

        for (provider, credential) in self.connected(user_id, deadline).await {
            let source = provider.id().to_string();
            tasks.push((source, self.spawn_provider(provider, credential, query)));
        }

        let results = join_all(tasks.into_iter().map(|(source, mut handle)| {
            let metrics = self.metrics.clone();
            async move {
                match timeout_at(deadline, &mut handle).await {
                    Ok(Ok(contacts)) => contacts,
                    Ok(Err(e)) => {
                        metrics.record_search_source_dropped();
                        tracing::warn!(source = %source, "Search task failed: {}", e);
                        Vec::new()
                    }
                    Err(_) => {
                        handle.abort();
                        metrics.record_search_source_dropped();
                        tracing::warn!(source = %source, "Search task timed out");
                        Vec::new()
                    }
                }
            }
        }))
        .await;

        let mut merged = merge_candidates(results.into_iter().flatten().collect());
        sort_by_name(&mut merged);
        merged
    }

    /// Providers the user has a credential for, paired with that credential.
    async fn connected(
        &self,
        user_id: &str,
        deadline: Instant,
    ) -> Vec<(Arc<dyn CrmProvider>, Credential)> {
        let credentials = match timeout_at(deadline, self.credentials.list_for_user(user_id)).await {
            Ok(Ok(credentials)) => credentials,
            Ok(Err(e)) => {
                tracing::warn!("Could not load credentials for search: {}", e);
                return Vec::new();
            }
            Err(_) => {
                tracing::warn!("Credential lookup timed out");
                return Vec::new();
            }
        };

        self.providers
            .iter()
            .filter_map(|provider| {
                credentials
                    .iter()
                    .find(|c| c.provider == provider.id())
                    .map(|c| (provider.clone(), c.clone()))
            })
            .collect()
    }

    fn spawn_local(&self, user_id: &str, query: &str) -> JoinHandle<Vec<CanonicalContact>> {
        let local = self.local.clone();
        let metrics = self.metrics.clone();
        let user_id = user_id.to_string();
        let query = query.to_string();

        tokio::spawn(async move {
            match local.search(&user_id, &query).await {
                Ok(contacts) => contacts.iter().map(CanonicalContact::from_local).collect(),
                Err(e) => {
                    metrics.record_search_source_dropped();
                    tracing::warn!(source = "local", "Local search failed: {}", e);
                    Vec::new()
                }
            }
        })
    }

    fn spawn_provider(
        &self,
        provider: Arc<dyn CrmProvider>,
        credential: Credential,
        query: &str,
    ) -> JoinHandle<Vec<CanonicalContact>> {
        let metrics = self.metrics.clone();
        let query = query.to_string();

        tokio::spawn(async move {
            match provider.search_contacts(&credential, &query).await {
                Ok(contacts) => contacts.iter().map(CanonicalContact::from_provider).collect(),
                Err(e) => {
                    metrics.record_search_source_dropped();
                    tracing::warn!(
                        source = %provider.id(),
                        credential_id = %credential.id,
                        "Provider search failed: {}",
                        e
                    );
                    Vec::new()
                }
            }
        })
    }
}
