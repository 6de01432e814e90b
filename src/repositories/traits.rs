use crate::error::StoreResult;
use crate::models::{Credential, LocalContact, ProviderId};
use async_trait::async_trait;
use chrono::{DateTime, Utc};

/// Storage for OAuth credentials.
///
/// Implementations must replace a credential atomically in [`update`]:
/// readers see either the old or the new token, never a mix.
///
/// [`update`]: CredentialStore::update
#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Retrieve a credential by id.
    async fn get(&self, id: &str) -> StoreResult<Credential>;

    /// The user's credential for one provider, if connected.
    async fn get_for_user(
        &self,
        user_id: &str,
        provider: ProviderId,
    ) -> StoreResult<Option<Credential>>;

    /// Every credential the user holds, in provider order.
    async fn list_for_user(&self, user_id: &str) -> StoreResult<Vec<Credential>>;

    /// Replace a stored credential.
    async fn update(&self, credential: &Credential) -> StoreResult<()>;

    /// Credentials of `provider` expiring before `before` that carry a refresh token.
    async fn list_expiring(
        &self,
        provider: ProviderId,
        before: DateTime<Utc>,
    ) -> StoreResult<Vec<Credential>>;
}

/// The product's own contact storage.
#[async_trait]
pub trait LocalContactStore: Send + Sync {
    /// Contacts owned by `user_id` matching a free-text query.
    async fn search(&self, user_id: &str, query: &str) -> StoreResult<Vec<LocalContact>>;

    /// Retrieve a contact by id.
    async fn get(&self, id: i64) -> StoreResult<LocalContact>;
}
