use crate::error::{StoreError, StoreResult};
use crate::matching::ContactMatcher;
use crate::models::LocalContact;
use crate::repositories::traits::LocalContactStore;
use async_trait::async_trait;
use std::path::Path;

/// Maximum local results per search.
const MAX_RESULTS: usize = 20;

/// Minimum fuzzy confidence for a local match.
const MIN_CONFIDENCE: u8 = 30;

/// Read-only local contact store backed by a vector.
#[derive(Debug, Default)]
pub struct InMemoryContactStore {
    contacts: Vec<LocalContact>,
    matcher: ContactMatcher,
}

impl InMemoryContactStore {
    pub fn new(contacts: Vec<LocalContact>) -> Self {
        Self {
            contacts,
            matcher: ContactMatcher::new(),
        }
    }

    /// Load a JSON array of contacts. A missing file yields an empty store.
    pub fn load(path: impl AsRef<Path>) -> StoreResult<Self> {
        let path = path.as_ref();
        if !path.exists() {
            tracing::info!("Contact file {} not found, starting empty", path.display());
            return Ok(Self::default());
        }
        let contacts: Vec<LocalContact> = serde_json::from_str(&std::fs::read_to_string(path)?)?;
        tracing::info!("Loaded {} local contact(s)", contacts.len());
        Ok(Self::new(contacts))
    }

    pub fn len(&self) -> usize {
        self.contacts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.contacts.is_empty()
    }
}

#[async_trait]
impl LocalContactStore for InMemoryContactStore {
    async fn search(&self, user_id: &str, query: &str) -> StoreResult<Vec<LocalContact>> {
        let owned: Vec<LocalContact> = self
            .contacts
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect();

        Ok(self
            .matcher
            .find_matches(query, &owned, MAX_RESULTS, MIN_CONFIDENCE)
            .into_iter()
            .map(|m| m.contact)
            .collect())
    }

    async fn get(&self, id: i64) -> StoreResult<LocalContact> {
        self.contacts
            .iter()
            .find(|c| c.id == id)
            .cloned()
            .ok_or_else(|| StoreError::NotFound(format!("contact {}", id)))
    }
}
