use async_trait::async_trait;
use crm_sync::client::CrmProvider;
use crm_sync::error::{CrmError, CrmResult};
use crm_sync::models::{Credential, ProviderContact, ProviderId};
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// How `search_contacts` behaves.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchBehavior {
    /// Return the stored contacts matching the query
    Return,
    /// Return an API error
    Fail,
    /// Panic inside the task
    Panic,
    /// Never resolve
    Hang,
}

/// Mock CRM provider backed by a map of contacts.
///
/// Tracks method calls and recorded updates for verification.
#[derive(Clone)]
pub struct MockCrmProvider {
    id: ProviderId,
    contacts: Arc<Mutex<HashMap<String, ProviderContact>>>,
    behavior: Arc<Mutex<SearchBehavior>>,
    delay: Arc<Mutex<Option<Duration>>>,
    fail_get: Arc<Mutex<bool>>,
    fail_update: Arc<Mutex<bool>>,
    updates: Arc<Mutex<Vec<(String, Map<String, Value>)>>>,
    call_counts: Arc<Mutex<HashMap<String, usize>>>,
}

impl MockCrmProvider {
    pub fn new(id: ProviderId) -> Self {
        Self {
            id,
            contacts: Arc::new(Mutex::new(HashMap::new())),
            behavior: Arc::new(Mutex::new(SearchBehavior::Return)),
            delay: Arc::new(Mutex::new(None)),
            fail_get: Arc::new(Mutex::new(false)),
            fail_update: Arc::new(Mutex::new(false)),
            updates: Arc::new(Mutex::new(Vec::new())),
            call_counts: Arc::new(Mutex::new(HashMap::new())),
        }
    }

    pub fn add_contact(&self, contact: ProviderContact) {
        self.contacts
            .lock()
            .unwrap()
            .insert(contact.id.clone(), contact);
    }

    pub fn set_behavior(&self, behavior: SearchBehavior) {
        *self.behavior.lock().unwrap() = behavior;
    }

    /// Sleep before answering a search.
    pub fn set_delay(&self, delay: Duration) {
        *self.delay.lock().unwrap() = Some(delay);
    }

    pub fn fail_get(&self) {
        *self.fail_get.lock().unwrap() = true;
    }

    pub fn fail_update(&self) {
        *self.fail_update.lock().unwrap() = true;
    }

    pub fn updates(&self) -> Vec<(String, Map<String, Value>)> {
        self.updates.lock().unwrap().clone()
    }

    pub fn get_call_count(&self, method: &str) -> usize {
        *self.call_counts.lock().unwrap().get(method).unwrap_or(&0)
    }

    fn track_call(&self, method: &str) {
        let mut counts = self.call_counts.lock().unwrap();
        *counts.entry(method.to_string()).or_insert(0) += 1;
    }
}

#[async_trait]
impl CrmProvider for MockCrmProvider {
    fn id(&self) -> ProviderId {
        self.id
    }

    async fn search_contacts(
        &self,
        _credential: &Credential,
        query: &str,
    ) -> CrmResult<Vec<ProviderContact>> {
        self.track_call("search_contacts");

        let delay = *self.delay.lock().unwrap();
        if let Some(delay) = delay {
            tokio::time::sleep(delay).await;
        }

        let behavior = *self.behavior.lock().unwrap();
        match behavior {
            SearchBehavior::Return => {
                let query = query.to_lowercase();
                let mut found: Vec<ProviderContact> = self
                    .contacts
                    .lock()
                    .unwrap()
                    .values()
                    .filter(|c| {
                        c.display_name().to_lowercase().contains(&query)
                            || c.email()
                                .map(|e| e.to_lowercase().contains(&query))
                                .unwrap_or(false)
                    })
                    .cloned()
                    .collect();
                found.sort_by(|a, b| a.id.cmp(&b.id));
                Ok(found)
            }
            SearchBehavior::Fail => Err(CrmError::ApiError {
                status: 503,
                message: "service unavailable".to_string(),
            }),
            SearchBehavior::Panic => panic!("provider exploded"),
            SearchBehavior::Hang => futures::future::pending().await,
        }
    }

    async fn get_contact(
        &self,
        _credential: &Credential,
        contact_id: &str,
    ) -> CrmResult<ProviderContact> {
        self.track_call("get_contact");

        if *self.fail_get.lock().unwrap() {
            return Err(CrmError::ApiError {
                status: 500,
                message: "fetch failed".to_string(),
            });
        }
        self.contacts
            .lock()
            .unwrap()
            .get(contact_id)
            .cloned()
            .ok_or_else(|| CrmError::NotFound(format!("Contact {} not found", contact_id)))
    }

    async fn update_contact(
        &self,
        _credential: &Credential,
        contact_id: &str,
        updates: &Map<String, Value>,
    ) -> CrmResult<ProviderContact> {
        self.track_call("update_contact");

        if *self.fail_update.lock().unwrap() {
            return Err(CrmError::RateLimitExceeded);
        }
        self.updates
            .lock()
            .unwrap()
            .push((contact_id.to_string(), updates.clone()));

        let mut contacts = self.contacts.lock().unwrap();
        let contact = contacts
            .get_mut(contact_id)
            .ok_or_else(|| CrmError::NotFound(format!("Contact {} not found", contact_id)))?;
        for (key, value) in updates {
            contact.fields.insert(key.clone(), value.clone());
        }
        Ok(contact.clone())
    }
}
