use crate::error::{StoreError, StoreResult};
use crate::models::{Credential, ProviderId};
use crate::repositories::traits::CredentialStore;
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::sync::RwLock;
use tokio::sync::Mutex;

/// Credential store kept in memory and optionally mirrored to a JSON file.
///
/// The file holds a JSON array of credentials. When a path is set, every
/// [`update`](CredentialStore::update) rewrites it first and only changes the
/// in-memory entry once the write has succeeded.
#[derive(Debug, Default)]
pub struct InMemoryCredentialStore {
    credentials: RwLock<HashMap<String, Credential>>,
    path: Option<PathBuf>,
    // Serializes updates so file writes land in order.
    write_gate: Mutex<()>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Vec<Credential>) -> Self {
        Self {
            credentials: RwLock::new(
                credentials
                    .into_iter()
                    .map(|c| (c.id.clone(), c))
                    .collect(),
            ),
            path: None,
            write_gate: Mutex::new(()),
        }
    }

    /// Load from a JSON file. A missing file yields an empty store bound to that path.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        let credentials: Vec<Credential> = if path.exists() {
            serde_json::from_str(&std::fs::read_to_string(path)?)?
        } else {
            tracing::info!("Credential file {} not found, starting empty", path.display());
            Vec::new()
        };

        tracing::info!("Loaded {} credential(s)", credentials.len());
        let mut store = Self::with_credentials(credentials);
        store.path = Some(path.to_path_buf());
        Ok(store)
    }

    /// Insert or replace a credential without persisting.
    pub fn insert(&self, credential: Credential) {
        let mut credentials = self.credentials.write().unwrap_or_else(|e| e.into_inner());
        credentials.insert(credential.id.clone(), credential);
    }

    fn snapshot(&self) -> Vec<Credential> {
        let credentials = self.credentials.read().unwrap_or_else(|e| e.into_inner());
        let mut all: Vec<Credential> = credentials.values().cloned().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        all
    }

    async fn persist(path: PathBuf, credentials: HashMap<String, Credential>) -> StoreResult<()> {
        let mut all: Vec<Credential> = credentials.into_values().collect();
        all.sort_by(|a, b| a.id.cmp(&b.id));
        let body = serde_json::to_string_pretty(&all)?;

        tokio::task::spawn_blocking(move || std::fs::write(path, body))
            .await
            .map_err(|e| StoreError::Io(std::io::Error::other(e.to_string())))??;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for InMemoryCredentialStore {
    async fn get(&self, id: &str) -> StoreResult<Credential> {
        let credentials = self.credentials.read().unwrap_or_else(|e| e.into_inner());
        credentials
            .get(id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("credential {}", id)))
    }

    async fn get_for_user(
        &self,
        user_id: &str,
        provider: ProviderId,
    ) -> StoreResult<Option<Credential>> {
        Ok(self
            .snapshot()
            .into_iter()
            .find(|c| c.user_id == user_id && c.provider == provider))
    }

    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<Credential>> {
        let mut found: Vec<Credential> = self
            .snapshot()
            .into_iter()
            .filter(|c| c.user_id == user_id)
            .collect();
        found.sort_by(|a, b| a.provider.cmp(&b.provider).then_with(|| a.id.cmp(&b.id)));
        Ok(found)
    }

    async fn update(&self, credential: &Credential) -> StoreResult<()> {
        let _gate = self.write_gate.lock().await;

        let pending = {
            let credentials = self.credentials.read().unwrap_or_else(|e| e.into_inner());
            if !credentials.contains_key(&credential.id) {
                return Err(StoreError::NotFound(format!("credential {}", credential.id)));
            }
            self.path.clone().map(|path| (path, credentials.clone()))
        };

        if let Some((path, mut next)) = pending {
            next.insert(credential.id.clone(), credential.clone());
            Self::persist(path, next).await?;
        }

        let mut credentials = self.credentials.write().unwrap_or_else(|e| e.into_inner());
        credentials.insert(credential.id.clone(), credential.clone());
        Ok(())
    }

    async fn list_expiring(
        &self,
        provider: ProviderId,
        before: DateTime<Utc>,
    ) -> StoreResult<Vec<Credential>> {
        Ok(self
            .snapshot()
            .into_iter()
            .filter(|c| c.provider == provider && c.expires_at < before && c.can_refresh())
            .collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;
    use std::collections::BTreeMap;

    fn credential(id: &str, provider: ProviderId, expires_in: i64, refresh: bool) -> Credential {
        Credential {
            id: id.to_string(),
            provider,
            uid: format!("uid-{}", id),
            token: format!("token-{}", id),
            refresh_token: refresh.then(|| format!("refresh-{}", id)),
            expires_at: Utc::now() + Duration::seconds(expires_in),
            user_id: "user-1".to_string(),
            extras: BTreeMap::new(),
        }
    }

    #[tokio::test]
    async fn test_list_expiring_skips_unrefreshable() {
        let store = InMemoryCredentialStore::with_credentials(vec![
            credential("a", ProviderId::Hubspot, 60, true),
            credential("b", ProviderId::Hubspot, 60, false),
            credential("c", ProviderId::Hubspot, 7200, true),
            credential("d", ProviderId::Salesforce, 60, true),
        ]);

        let expiring = store
            .list_expiring(ProviderId::Hubspot, Utc::now() + Duration::seconds(600))
            .await
            .unwrap();

        let ids: Vec<&str> = expiring.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids, vec!["a"]);
    }

    #[tokio::test]
    async fn test_get_for_user_and_list() {
        let store = InMemoryCredentialStore::with_credentials(vec![
            credential("h", ProviderId::Hubspot, 60, true),
            credential("s", ProviderId::Salesforce, 60, true),
        ]);

        let found = store
            .get_for_user("user-1", ProviderId::Salesforce)
            .await
            .unwrap();
        assert_eq!(found.map(|c| c.id), Some("s".to_string()));
        assert!(store
            .get_for_user("user-2", ProviderId::Salesforce)
            .await
            .unwrap()
            .is_none());

        let all = store.list_for_user("user-1").await.unwrap();
        assert_eq!(all[0].provider, ProviderId::Salesforce);
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_update_unknown_credential_fails() {
        let store = InMemoryCredentialStore::new();
        let result = store
            .update(&credential("x", ProviderId::Hubspot, 60, true))
            .await;
        assert!(matches!(result, Err(StoreError::NotFound(_))));
    }

    #[tokio::test]
    async fn test_update_persists_to_file() {
        let path = std::env::temp_dir().join(format!(
            "crm-sync-credentials-{}.json",
            std::process::id()
        ));
        std::fs::write(
            &path,
            serde_json::to_string(&vec![credential("a", ProviderId::Hubspot, 60, true)]).unwrap(),
        )
        .unwrap();

        let store = InMemoryCredentialStore::load(&path).unwrap();
        let mut updated = store.get("a").await.unwrap();
        updated.token = "rotated".to_string();
        store.update(&updated).await.unwrap();

        let reloaded = InMemoryCredentialStore::load(&path).unwrap();
        assert_eq!(reloaded.get("a").await.unwrap().token, "rotated");

        std::fs::remove_file(&path).ok();
    }

    #[tokio::test]
    async fn test_failed_write_keeps_previous_credential() {
        let path = std::env::temp_dir()
            .join(format!("crm-sync-missing-dir-{}", std::process::id()))
            .join("credentials.json");
        let store = InMemoryCredentialStore::load(&path).unwrap();
        store.insert(credential("a", ProviderId::Hubspot, 60, true));

        let mut updated = store.get("a").await.unwrap();
        updated.token = "rotated".to_string();
        let result = store.update(&updated).await;

        assert!(matches!(result, Err(StoreError::Io(_))));
        assert_eq!(store.get("a").await.unwrap().token, "token-a");
        assert!(!path.exists());
    }
}
