//! HTTP clients for the CRM provider APIs.
//!
//! Provider clients are synchronous (`ureq`) and implement [`BlockingCrmClient`].
//! [`AsyncCrmClient`] lifts them into the async [`CrmProvider`] trait by running
//! each call on `tokio::task::spawn_blocking`, after making sure the
//! credential's access token is still usable.

mod async_wrapper;
pub mod hubspot;
pub mod salesforce;

pub use async_wrapper::AsyncCrmClient;
pub use hubspot::HubspotClient;
pub use salesforce::SalesforceClient;

use crate::error::{CrmError, CrmResult};
use crate::fields::{catalog, FieldCatalog};
use crate::metrics::Metrics;
use crate::models::{Credential, ProviderContact, ProviderId};
use async_trait::async_trait;
use serde_json::{Map, Value};
use std::sync::Arc;
use std::time::{Duration, Instant};

/// Maximum number of records a provider search returns.
pub const SEARCH_LIMIT: usize = 10;

/// Async access to one CRM provider's contacts.
///
/// Field names crossing this boundary are canonical; implementations
/// translate to and from provider API names.
#[async_trait]
pub trait CrmProvider: Send + Sync {
    /// Which provider this is.
    fn id(&self) -> ProviderId;

    /// The provider's field catalogue.
    fn fields(&self) -> &'static FieldCatalog {
        catalog(self.id())
    }

    async fn search_contacts(
        &self,
        credential: &Credential,
        query: &str,
    ) -> CrmResult<Vec<ProviderContact>>;

    async fn get_contact(&self, credential: &Credential, contact_id: &str)
        -> CrmResult<ProviderContact>;

    /// Write canonical-name updates and return the contact as stored afterwards.
    async fn update_contact(
        &self,
        credential: &Credential,
        contact_id: &str,
        updates: &Map<String, Value>,
    ) -> CrmResult<ProviderContact>;
}

/// Blocking provider client operating on an already-valid credential.
pub trait BlockingCrmClient: Send + Sync + 'static {
    fn provider(&self) -> ProviderId;

    fn search_contacts(&self, credential: &Credential, query: &str)
        -> CrmResult<Vec<ProviderContact>>;

    fn get_contact(&self, credential: &Credential, contact_id: &str) -> CrmResult<ProviderContact>;

    fn update_contact(
        &self,
        credential: &Credential,
        contact_id: &str,
        updates: &Map<String, Value>,
    ) -> CrmResult<ProviderContact>;
}

/// Shared blocking HTTP plumbing: one `ureq` agent, JSON bodies, error
/// mapping and request metrics.
#[derive(Clone)]
pub struct HttpTransport {
    agent: Arc<ureq::Agent>,
    metrics: Metrics,
}

impl HttpTransport {
    pub fn new(timeout: Duration, metrics: Metrics) -> Self {
        let agent = ureq::AgentBuilder::new().timeout(timeout).build();
        Self {
            agent: Arc::new(agent),
            metrics,
        }
    }

    pub fn metrics(&self) -> &Metrics {
        &self.metrics
    }

    /// GET with bearer auth, returning the parsed JSON body.
    pub fn get_json(&self, url: &str, token: &str) -> CrmResult<Value> {
        self.execute("GET", url, || {
            self.agent
                .get(url)
                .set("Authorization", &format!("Bearer {}", token))
                .set("Accept", "application/json")
                .call()
        })
    }

    /// POST a JSON body with bearer auth.
    pub fn post_json(&self, url: &str, token: &str, body: &Value) -> CrmResult<Value> {
        tracing::debug!(
            "Request body: {}",
            serde_json::to_string(body).unwrap_or_else(|_| "<invalid json>".to_string())
        );
        self.execute("POST", url, || {
            self.agent
                .post(url)
                .set("Authorization", &format!("Bearer {}", token))
                .set("Content-Type", "application/json")
                .send_json(body)
        })
    }

    /// PATCH a JSON body with bearer auth. An empty response (204) yields `Value::Null`.
    pub fn patch_json(&self, url: &str, token: &str, body: &Value) -> CrmResult<Value> {
        self.execute("PATCH", url, || {
            self.agent
                .request("PATCH", url)
                .set("Authorization", &format!("Bearer {}", token))
                .set("Content-Type", "application/json")
                .send_json(body)
        })
    }

    /// POST an url-encoded form without auth (OAuth token endpoint).
    pub fn post_form(&self, url: &str, form: &[(&str, &str)]) -> CrmResult<Value> {
        self.execute("POST", url, || {
            self.agent
                .post(url)
                .set("Accept", "application/json")
                .send_form(form)
        })
    }

    fn execute<F>(&self, method: &str, url: &str, send: F) -> CrmResult<Value>
    where
        F: FnOnce() -> Result<ureq::Response, ureq::Error>,
    {
        let start = Instant::now();
        tracing::debug!("{} {}", method, redact(url));

        let result = send().map_err(map_error).and_then(read_body);

        let duration = start.elapsed();
        self.metrics.record_http_request(duration);
        match &result {
            Ok(_) => tracing::debug!("{} {} - ok in {:?}", method, redact(url), duration),
            Err(e) => {
                self.metrics.record_http_error();
                tracing::debug!("{} {} - error: {}", method, redact(url), e);
            }
        }

        result
    }
}

fn read_body(response: ureq::Response) -> CrmResult<Value> {
    let body = response
        .into_string()
        .map_err(|e| CrmError::HttpError(e.to_string()))?;
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(&body)?)
}

/// Map a ureq error to a CrmError.
pub fn map_error(error: ureq::Error) -> CrmError {
    match error {
        ureq::Error::Status(code, response) => {
            let message = response
                .into_string()
                .unwrap_or_else(|_| "Unknown error".to_string());

            match code {
                401 => CrmError::Unauthorized,
                404 => CrmError::NotFound(message),
                429 => CrmError::RateLimitExceeded,
                _ => CrmError::ApiError {
                    status: code,
                    message,
                },
            }
        }
        ureq::Error::Transport(transport) => match transport.kind() {
            ureq::ErrorKind::ConnectionFailed => {
                CrmError::HttpError("Connection failed".to_string())
            }
            ureq::ErrorKind::Io => CrmError::Timeout,
            _ => CrmError::HttpError(transport.to_string()),
        },
    }
}

/// Drop the query string so API keys and SOQL never reach the logs.
fn redact(url: &str) -> &str {
    url.split('?').next().unwrap_or(url)
}

/// Join a base URL and a path with exactly one slash.
pub(crate) fn join_url(base: &str, path: &str) -> String {
    format!(
        "{}/{}",
        base.trim_end_matches('/'),
        path.trim_start_matches('/')
    )
}
