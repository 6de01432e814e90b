//! Salesforce REST client for Contact records.
//!
//! Requests go to the credential's `instance_url`; the org host is only known
//! after the OAuth grant, so there is no fixed base URL.

use super::{join_url, BlockingCrmClient, HttpTransport, SEARCH_LIMIT};
use crate::error::{CrmError, CrmResult};
use crate::fields::{catalog, FieldCatalog};
use crate::models::{Credential, ProviderContact, ProviderId};
use serde_json::{Map, Value};

/// Blocking Salesforce client.
#[derive(Clone)]
pub struct SalesforceClient {
    transport: HttpTransport,
    api_version: String,
}

impl SalesforceClient {
    pub fn new(transport: HttpTransport, api_version: impl Into<String>) -> Self {
        Self {
            transport,
            api_version: api_version.into(),
        }
    }

    fn catalog(&self) -> &'static FieldCatalog {
        catalog(ProviderId::Salesforce)
    }

    fn data_url(&self, credential: &Credential, path: &str) -> CrmResult<String> {
        let instance_url = credential.instance_url().ok_or_else(|| {
            CrmError::InvalidRequest(format!(
                "Salesforce credential {} has no instance_url",
                credential.id
            ))
        })?;
        Ok(join_url(
            instance_url,
            &format!("services/data/{}/{}", self.api_version, path),
        ))
    }

    fn contact_url(&self, credential: &Credential, contact_id: &str) -> CrmResult<String> {
        self.data_url(
            credential,
            &format!("sobjects/Contact/{}", urlencoding::encode(contact_id)),
        )
    }

    /// SOQL for a name/email substring search.
    pub fn build_search_query(&self, query: &str) -> String {
        let term = escape_soql(query.trim());
        format!(
            "SELECT Id, {} FROM Contact WHERE Name LIKE '%{}%' OR Email LIKE '%{}%' LIMIT {}",
            self.catalog().request_fields().join(", "),
            term,
            term,
            SEARCH_LIMIT
        )
    }

    /// Convert one sObject record into a canonical-keyed contact.
    fn record_to_contact(&self, record: Value) -> CrmResult<ProviderContact> {
        let mut object = match record {
            Value::Object(object) => object,
            other => {
                return Err(CrmError::Other(format!(
                    "Unexpected Salesforce record: {}",
                    other
                )))
            }
        };
        object.remove("attributes");
        let id = object
            .remove("Id")
            .and_then(|v| v.as_str().map(String::from))
            .ok_or_else(|| CrmError::Other("Salesforce record without Id".to_string()))?;

        Ok(ProviderContact {
            provider: ProviderId::Salesforce,
            id,
            fields: self.catalog().to_canonical(object),
        })
    }
}

/// Escape a value for use inside a single-quoted SOQL `LIKE` literal.
fn escape_soql(value: &str) -> String {
    let mut escaped = String::with_capacity(value.len());
    for c in value.chars() {
        match c {
            '\\' => escaped.push_str("\\\\"),
            '\'' => escaped.push_str("\\'"),
            '"' => escaped.push_str("\\\""),
            '\n' => escaped.push_str("\\n"),
            '\r' => escaped.push_str("\\r"),
            '\t' => escaped.push_str("\\t"),
            '%' => escaped.push_str("\\%"),
            '_' => escaped.push_str("\\_"),
            c => escaped.push(c),
        }
    }
    escaped
}

impl BlockingCrmClient for SalesforceClient {
    fn provider(&self) -> ProviderId {
        ProviderId::Salesforce
    }

    fn search_contacts(
        &self,
        credential: &Credential,
        query: &str,
    ) -> CrmResult<Vec<ProviderContact>> {
        let soql = self.build_search_query(query);
        let url = format!(
            "{}?q={}",
            self.data_url(credential, "query")?,
            urlencoding::encode(&soql)
        );

        let body = self.transport.get_json(&url, &credential.token)?;
        let records = match body.get("records") {
            Some(Value::Array(records)) => records.clone(),
            _ => Vec::new(),
        };

        let contacts = records
            .into_iter()
            .map(|record| self.record_to_contact(record))
            .collect::<CrmResult<Vec<_>>>()?;

        self.transport.metrics().record_contacts_fetched(contacts.len());
        Ok(contacts)
    }

    fn get_contact(&self, credential: &Credential, contact_id: &str) -> CrmResult<ProviderContact> {
        let url = format!(
            "{}?fields={}",
            self.contact_url(credential, contact_id)?,
            self.catalog().request_fields().join(",")
        );

        let body = self.transport.get_json(&url, &credential.token)?;
        let contact = self.record_to_contact(body)?;
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
        let url = self.contact_url(credential, contact_id)?;
        let body = Value::Object(self.catalog().map_fields(updates));

        // Salesforce answers a successful PATCH with 204 No Content
        self.transport.patch_json(&url, &credential.token, &body)?;
        tracing::info!(
            provider = "salesforce",
            contact_id,
            fields = updates.len(),
            "Contact updated"
        );

        self.get_contact(credential, contact_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_soql() {
        assert_eq!(escape_soql("o'brien"), "o\\'brien");
        assert_eq!(escape_soql(r"a\b"), r"a\\b");
        assert_eq!(escape_soql("alice"), "alice");
    }

    #[test]
    fn test_escape_soql_like_wildcards() {
        assert_eq!(escape_soql("a_b%"), "a\\_b\\%");
        assert_eq!(escape_soql("100%"), r"100\%");
    }

    #[test]
    fn test_search_query_uses_api_names() {
        let client = SalesforceClient::new(
            HttpTransport::new(std::time::Duration::from_secs(1), Default::default()),
            "v59.0",
        );
        let soql = client.build_search_query(" o'neil ");

        assert!(soql.starts_with("SELECT Id, FirstName, LastName, Email"));
        assert!(soql.contains("MobilePhone"));
        assert!(soql.contains("Name LIKE '%o\\'neil%'"));
        assert!(soql.ends_with("LIMIT 10"));
    }
}
