//! Contact shapes: local records, raw provider records and the merged
//! canonical record returned by search.

use crate::fields::catalog;
use crate::models::credential::ProviderId;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;

/// Where a search result came from.
///
/// The discriminants are the merge priority: when several sources hold the
/// same email, the highest rank wins. Adding a provider means giving it a
/// rank here, so the order stays explicit and total.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContactSource {
    Local = 1,
    Hubspot = 2,
    Salesforce = 3,
}

impl ContactSource {
    /// Merge rank; higher wins.
    pub fn priority(self) -> u8 {
        self as u8
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ContactSource::Local => "local",
            ContactSource::Hubspot => "hubspot",
            ContactSource::Salesforce => "salesforce",
        }
    }
}

impl From<ProviderId> for ContactSource {
    fn from(provider: ProviderId) -> Self {
        match provider {
            ProviderId::Salesforce => ContactSource::Salesforce,
            ProviderId::Hubspot => ContactSource::Hubspot,
        }
    }
}

impl fmt::Display for ContactSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A contact held in the product's own storage.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
#[serde(default)]
pub struct LocalContact {
    /// Local primary key
    pub id: i64,

    /// Owning user
    pub user_id: String,

    /// Display name
    pub name: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub company: Option<String>,
}

/// A contact as returned by a CRM provider, keyed by canonical field names.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProviderContact {
    /// Which provider the record lives in
    pub provider: ProviderId,

    /// Provider-native record id
    pub id: String,

    /// Field values keyed by canonical name (unknown provider keys kept as-is)
    pub fields: Map<String, Value>,
}

impl ProviderContact {
    /// Raw value of a field by canonical name.
    pub fn get(&self, field: &str) -> Option<&Value> {
        self.fields.get(field)
    }

    /// Field value rendered as a string; `None` for missing, null or blank values.
    pub fn value_as_string(&self, field: &str) -> Option<String> {
        self.get(field).and_then(value_to_string)
    }

    /// "First Last" from the provider's name fields, falling back to `Name`.
    pub fn display_name(&self) -> String {
        let fields = catalog(self.provider);
        let parts: Vec<String> = [fields.first_name_field(), fields.last_name_field()]
            .iter()
            .filter_map(|field| self.value_as_string(field))
            .map(|part| part.trim().to_string())
            .collect();

        if parts.is_empty() {
            self.value_as_string("Name")
                .or_else(|| self.value_as_string("name"))
                .unwrap_or_default()
        } else {
            parts.join(" ")
        }
    }

    pub fn email(&self) -> Option<String> {
        self.value_as_string(catalog(self.provider).email_field())
    }
}

/// Render a JSON scalar as a plain string. Null and blank strings become `None`.
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::String(s) if s.trim().is_empty() => None,
        Value::String(s) => Some(s.clone()),
        other => Some(other.to_string()),
    }
}

/// The merged, source-tagged record returned by multi-source search.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CanonicalContact {
    /// Composite identifier, "source:external-id"
    pub id: String,

    /// Local contact id, present when a local record took part in the merge
    #[serde(skip_serializing_if = "Option::is_none")]
    pub contact_id: Option<i64>,

    /// Which source this record's payload came from
    pub source: ContactSource,

    /// Display name
    pub name: String,

    /// Merge key
    #[serde(skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,

    /// Original fields of the winning record
    #[serde(default)]
    pub fields: Map<String, Value>,
}

impl CanonicalContact {
    /// Build the composite identifier for a source record.
    pub fn composite_id(source: ContactSource, external_id: &str) -> String {
        format!("{}:{}", source.as_str(), external_id)
    }

    /// Normalize a local record. Only local records populate `contact_id`.
    pub fn from_local(contact: &LocalContact) -> Self {
        let mut fields = Map::new();
        fields.insert("name".to_string(), Value::String(contact.name.clone()));
        if let Some(email) = &contact.email {
            fields.insert("email".to_string(), Value::String(email.clone()));
        }
        if let Some(phone) = &contact.phone {
            fields.insert("phone".to_string(), Value::String(phone.clone()));
        }
        if let Some(company) = &contact.company {
            fields.insert("company".to_string(), Value::String(company.clone()));
        }

        Self {
            id: Self::composite_id(ContactSource::Local, &contact.id.to_string()),
            contact_id: Some(contact.id),
            source: ContactSource::Local,
            name: contact.name.clone(),
            email: contact.email.clone().filter(|e| !e.trim().is_empty()),
            fields,
        }
    }

    /// Normalize a provider record.
    pub fn from_provider(contact: &ProviderContact) -> Self {
        let source = ContactSource::from(contact.provider);
        Self {
            id: Self::composite_id(source, &contact.id),
            contact_id: None,
            source,
            name: contact.display_name(),
            email: contact.email(),
            fields: contact.fields.clone(),
        }
    }

    /// Lower-cased email used for grouping, if any.
    pub fn merge_key(&self) -> Option<String> {
        self.email
            .as_deref()
            .map(|e| e.trim().to_lowercase())
            .filter(|e| !e.is_empty())
    }
}
