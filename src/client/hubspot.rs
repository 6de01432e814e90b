//! HubSpot CRM v3 client for contact objects.

use super::{join_url, BlockingCrmClient, HttpTransport, SEARCH_LIMIT};
use crate::error::{CrmError, CrmResult};
use crate::fields::{catalog, FieldCatalog};
use crate::models::{Credential, ProviderContact, ProviderId};
use serde::Deserialize;
use serde_json::{json, Map, Value};

const CONTACTS_PATH: &str = "crm/v3/objects/contacts";

/// A contact object as returned by the v3 objects API.
#[derive(Debug, Deserialize)]
struct HubspotObject {
    id: String,
    #[serde(default)]
    properties: Map<String, Value>,
}

#[derive(Debug, Deserialize)]
struct SearchResponse {
    #[serde(default)]
    results: Vec<HubspotObject>,
}

/// Blocking HubSpot client.
#[derive(Clone)]
pub struct HubspotClient {
    transport: HttpTransport,
    base_url: String,
}

impl HubspotClient {
    pub fn new(transport: HttpTransport, base_url: impl Into<String>) -> Self {
        Self {
            transport,
            base_url: base_url.into(),
        }
    }

    fn catalog(&self) -> &'static FieldCatalog {
        catalog(ProviderId::Hubspot)
    }

    fn contact_url(&self, contact_id: &str) -> String {
        join_url(
            &self.base_url,
            &format!("{}/{}", CONTACTS_PATH, urlencoding::encode(contact_id)),
        )
    }

    fn to_contact(&self, object: HubspotObject) -> ProviderContact {
        ProviderContact {
            provider: ProviderId::Hubspot,
            id: object.id,
            fields: self.catalog().to_canonical(object.properties),
        }
    }

    fn parse_object(&self, body: Value) -> CrmResult<ProviderContact> {
        let object: HubspotObject = serde_json::from_value(body)?;
        Ok(self.to_contact(object))
    }
}

impl BlockingCrmClient for HubspotClient {
    fn provider(&self) -> ProviderId {
        ProviderId::Hubspot
    }

    fn search_contacts(
        &self,
        credential: &Credential,
        query: &str,
    ) -> CrmResult<Vec<ProviderContact>> {
        let url = join_url(&self.base_url, &format!("{}/search", CONTACTS_PATH));
        let body = json!({
            "query": query.trim(),
            "properties": self.catalog().request_fields(),
            "limit": SEARCH_LIMIT,
        });

        let response: SearchResponse =
            serde_json::from_value(self.transport.post_json(&url, &credential.token, &body)?)?;
        let contacts: Vec<ProviderContact> = response
            .results
            .into_iter()
            .map(|object| self.to_contact(object))
            .collect();

        self.transport.metrics().record_contacts_fetched(contacts.len());
        Ok(contacts)
    }

    fn get_contact(&self, credential: &Credential, contact_id: &str) -> CrmResult<ProviderContact> {
        let url = format!(
            "{}?properties={}",
            self.contact_url(contact_id),
            self.catalog().request_fields().join(",")
        );

        let contact = self.parse_object(self.transport.get_json(&url, &credential.token)?)?;
        self.transport.metrics().record_contacts_fetched(1);
        Ok(contact)
    }

    fn update_contact(
        &self,
        credential: &Credential,
        contact_id: &str,
        updates: &Map<String, Value>,
    ) -> CrmResult<ProviderContact> {
        if updates.is_empty() {
            return Err(CrmError::InvalidRequest("No fields to update".to_string()));
        }
        let body = json!({ "properties": self.catalog().map_fields(updates) });

        let response =
            self.transport
                .patch_json(&self.contact_url(contact_id), &credential.token, &body)?;
        tracing::info!(
            provider = "hubspot",
            contact_id,
            fields = updates.len(),
            "Contact updated"
        );

        self.parse_object(response)
    }
}
