//! In-memory test doubles for the provider, AI and token-refresh seams.

#![allow(dead_code, unused_imports)]

mod mock_ai_service;
mod mock_crm_provider;
mod mock_token_refresher;

pub use mock_ai_service::MockAiService;
pub use mock_crm_provider::{MockCrmProvider, SearchBehavior};
pub use mock_token_refresher::MockTokenRefresher;

use chrono::{Duration, Utc};
use crm_sync::models::{Credential, LocalContact, ProviderContact, ProviderId, INSTANCE_URL_KEY};
use std::collections::BTreeMap;

/// A credential for `user-1` expiring `expires_in_secs` from now.
pub fn credential(id: &str, provider: ProviderId, expires_in_secs: i64, refreshable: bool) -> Credential {
    let mut extras = BTreeMap::new();
    if provider == ProviderId::Salesforce {
        extras.insert(INSTANCE_URL_KEY.to_string(), "https://example.my.salesforce.com".to_string());
    }
    Credential {
        id: id.to_string(),
        provider,
        uid: format!("uid-{}", id),
        token: format!("token-{}", id),
        refresh_token: refreshable.then(|| format!("refresh-{}", id)),
        expires_at: Utc::now() + Duration::seconds(expires_in_secs),
        user_id: "user-1".to_string(),
        extras,
    }
}

pub fn provider_contact(provider: ProviderId, id: &str, fields: serde_json::Value) -> ProviderContact {
    ProviderContact {
        provider,
        id: id.to_string(),
        fields: fields.as_object().cloned().unwrap_or_default(),
    }
}

pub fn local_contact(id: i64, name: &str, email: Option<&str>) -> LocalContact {
    LocalContact {
        id,
        user_id: "user-1".to_string(),
        name: name.to_string(),
        email: email.map(String::from),
        ..Default::default()
    }
}
