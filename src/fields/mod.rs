//! Provider field catalogues and canonical ↔ provider name mapping.
//!
//! Each provider declares one ordered list of [`FieldDescriptor`]s through
//! [`FieldConfig`]. Everything else (labels, API-name maps, the reverse map
//! used to read provider responses, category grouping for prompts) is
//! derived from that list by [`FieldCatalog`], so adding a provider never
//! duplicates mapping logic.

pub mod hubspot;
pub mod salesforce;

pub use hubspot::HubspotFields;
pub use salesforce::SalesforceFields;

use crate::models::ProviderId;
use once_cell::sync::Lazy;
use serde::Serialize;
use serde_json::{Map, Value};
use std::collections::HashMap;
use std::fmt;

/// Prompt grouping for a field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldCategory {
    Basic,
    Phone,
    Work,
    Address,
    Online,
    Other,
}

impl FieldCategory {
    /// Fixed presentation order. Prompts iterate this, never a hash map.
    pub const ORDER: [FieldCategory; 6] = [
        FieldCategory::Basic,
        FieldCategory::Phone,
        FieldCategory::Work,
        FieldCategory::Address,
        FieldCategory::Online,
        FieldCategory::Other,
    ];

    /// Heading used in prompts.
    pub fn heading(self) -> &'static str {
        match self {
            FieldCategory::Basic => "Basic information",
            FieldCategory::Phone => "Phone numbers",
            FieldCategory::Work => "Work information",
            FieldCategory::Address => "Address",
            FieldCategory::Online => "Online presence",
            FieldCategory::Other => "Other",
        }
    }
}

impl fmt::Display for FieldCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.heading())
    }
}

/// Static description of one contact field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FieldDescriptor {
    /// Canonical name used inside the system and in AI prompts/responses
    pub name: &'static str,

    /// Human label
    pub label: &'static str,

    /// Provider-native API name; defaults to `name`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_name: Option<&'static str>,

    /// Prompt grouping; ungrouped fields land under "Other"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub category: Option<FieldCategory>,
}

impl FieldDescriptor {
    pub const fn new(name: &'static str, label: &'static str) -> Self {
        Self {
            name,
            label,
            api_name: None,
            category: None,
        }
    }

    pub const fn api(self, api_name: &'static str) -> Self {
        Self {
            api_name: Some(api_name),
            ..self
        }
    }

    pub const fn category(self, category: FieldCategory) -> Self {
        Self {
            category: Some(category),
            ..self
        }
    }

    /// The name to send to the provider.
    pub fn provider_name(&self) -> &'static str {
        self.api_name.unwrap_or(self.name)
    }
}

/// Per-provider field declaration.
pub trait FieldConfig {
    /// Provider this catalogue belongs to.
    const PROVIDER: ProviderId;

    /// Canonical names holding first name, last name and email.
    const FIRST_NAME: &'static str;
    const LAST_NAME: &'static str;
    const EMAIL: &'static str;

    /// Ordered field list. Must be pure: same output on every call.
    fn fields() -> Vec<FieldDescriptor>;
}

/// A provider's field list plus every lookup derived from it.
#[derive(Debug, Clone)]
pub struct FieldCatalog {
    provider: ProviderId,
    descriptors: Vec<FieldDescriptor>,
    labels: HashMap<&'static str, &'static str>,
    api_names: HashMap<&'static str, &'static str>,
    canonical_names: HashMap<&'static str, &'static str>,
    first_name_field: &'static str,
    last_name_field: &'static str,
    email_field: &'static str,
}

impl FieldCatalog {
    /// Build the catalogue for a provider declaration.
    pub fn from_config<C: FieldConfig>() -> Self {
        Self::new(
            C::PROVIDER,
            C::fields(),
            C::FIRST_NAME,
            C::LAST_NAME,
            C::EMAIL,
        )
    }

    /// Build a catalogue from an explicit descriptor list.
    ///
    /// Later duplicates of a canonical name are dropped so names stay unique.
    pub fn new(
        provider: ProviderId,
        fields: Vec<FieldDescriptor>,
        first_name_field: &'static str,
        last_name_field: &'static str,
        email_field: &'static str,
    ) -> Self {
        let mut descriptors: Vec<FieldDescriptor> = Vec::with_capacity(fields.len());
        for field in fields {
            if descriptors.iter().any(|d| d.name == field.name) {
                tracing::warn!(
                    provider = %provider,
                    field = field.name,
                    "Duplicate field name ignored"
                );
                continue;
            }
            descriptors.push(field);
        }

        let labels = descriptors.iter().map(|d| (d.name, d.label)).collect();
        let api_names = descriptors
            .iter()
            .filter(|d| d.provider_name() != d.name)
            .map(|d| (d.name, d.provider_name()))
            .collect();
        let canonical_names = descriptors
            .iter()
            .map(|d| (d.provider_name(), d.name))
            .collect();

        Self {
            provider,
            descriptors,
            labels,
            api_names,
            canonical_names,
            first_name_field,
            last_name_field,
            email_field,
        }
    }

    pub fn provider(&self) -> ProviderId {
        self.provider
    }

    /// All descriptors in declaration order.
    pub fn descriptors(&self) -> &[FieldDescriptor] {
        &self.descriptors
    }

    /// Canonical names in declaration order.
    pub fn field_names(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(|d| d.name).collect()
    }

    /// Canonical name → label.
    pub fn labels(&self) -> &HashMap<&'static str, &'static str> {
        &self.labels
    }

    /// Label for a canonical name, if the field is catalogued.
    pub fn label(&self, name: &str) -> Option<&'static str> {
        self.labels.get(name).copied()
    }

    /// Canonical name → API name, only where the two differ.
    pub fn api_name_map(&self) -> &HashMap<&'static str, &'static str> {
        &self.api_names
    }

    /// API name for a canonical name; identity when unmapped.
    pub fn api_name<'a>(&self, name: &'a str) -> &'a str {
        self.api_names.get(name).copied().unwrap_or(name)
    }

    /// API names to request from the provider, in declaration order.
    pub fn request_fields(&self) -> Vec<&'static str> {
        self.descriptors.iter().map(|d| d.provider_name()).collect()
    }

    /// API name → canonical name.
    pub fn reverse_map(&self) -> &HashMap<&'static str, &'static str> {
        &self.canonical_names
    }

    /// Canonical name for an API name, if catalogued.
    pub fn canonical_name(&self, api_name: &str) -> Option<&'static str> {
        self.canonical_names.get(api_name).copied()
    }

    /// Descriptors grouped by category in [`FieldCategory::ORDER`]; empty groups are skipped.
    pub fn grouped(&self) -> Vec<(FieldCategory, Vec<&FieldDescriptor>)> {
        FieldCategory::ORDER
            .iter()
            .filter_map(|category| {
                let fields: Vec<&FieldDescriptor> = self
                    .descriptors
                    .iter()
                    .filter(|d| d.category.unwrap_or(FieldCategory::Other) == *category)
                    .collect();
                if fields.is_empty() {
                    None
                } else {
                    Some((*category, fields))
                }
            })
            .collect()
    }

    /// Re-key a canonical-name map with provider API names.
    ///
    /// Unknown keys pass through unchanged; nothing is ever dropped.
    pub fn map_fields(&self, updates: &Map<String, Value>) -> Map<String, Value> {
        updates
            .iter()
            .map(|(key, value)| (self.api_name(key).to_string(), value.clone()))
            .collect()
    }

    /// Re-key a provider payload with canonical names; unknown keys pass through.
    pub fn to_canonical(&self, raw: Map<String, Value>) -> Map<String, Value> {
        raw.into_iter()
            .map(|(key, value)| match self.canonical_name(&key) {
                Some(canonical) => (canonical.to_string(), value),
                None => (key, value),
            })
            .collect()
    }

    pub fn first_name_field(&self) -> &'static str {
        self.first_name_field
    }

    pub fn last_name_field(&self) -> &'static str {
        self.last_name_field
    }

    pub fn email_field(&self) -> &'static str {
        self.email_field
    }
}

static SALESFORCE_CATALOG: Lazy<FieldCatalog> =
    Lazy::new(FieldCatalog::from_config::<SalesforceFields>);
static HUBSPOT_CATALOG: Lazy<FieldCatalog> = Lazy::new(FieldCatalog::from_config::<HubspotFields>);

/// The catalogue for a provider.
pub fn catalog(provider: ProviderId) -> &'static FieldCatalog {
    match provider {
        ProviderId::Salesforce => &SALESFORCE_CATALOG,
        ProviderId::Hubspot => &HUBSPOT_CATALOG,
    }
}

/// Translate canonical-name updates into the provider's API names.
pub fn map_fields_for_provider(
    provider: ProviderId,
    updates: &Map<String, Value>,
) -> Map<String, Value> {
    catalog(provider).map_fields(updates)
}
