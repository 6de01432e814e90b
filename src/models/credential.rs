//! OAuth credential model shared by every CRM provider.

use chrono::{DateTime, Duration, Utc};
use schemars::JsonSchema;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;

/// Extra key under which Salesforce stores the org-specific REST host.
pub const INSTANCE_URL_KEY: &str = "instance_url";

/// A CRM provider this layer can talk to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, JsonSchema)]
#[serde(rename_all = "lowercase")]
pub enum ProviderId {
    Salesforce,
    Hubspot,
}

impl ProviderId {
    /// Every supported provider, in a stable order.
    pub const ALL: [ProviderId; 2] = [ProviderId::Salesforce, ProviderId::Hubspot];

    pub fn as_str(&self) -> &'static str {
        match self {
            ProviderId::Salesforce => "salesforce",
            ProviderId::Hubspot => "hubspot",
        }
    }

    /// Human readable provider name.
    pub fn display_name(&self) -> &'static str {
        match self {
            ProviderId::Salesforce => "Salesforce",
            ProviderId::Hubspot => "HubSpot",
        }
    }
}

impl fmt::Display for ProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProviderId {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "salesforce" => Ok(ProviderId::Salesforce),
            "hubspot" => Ok(ProviderId::Hubspot),
            other => Err(format!("Unknown provider: {}", other)),
        }
    }
}

/// One OAuth grant for one provider for one user.
///
/// Created at grant time, mutated in place on every successful refresh and
/// never deleted by this layer.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Credential {
    /// Storage identifier
    pub id: String,

    /// Which provider issued the grant
    pub provider: ProviderId,

    /// The provider-side account/user id
    pub uid: String,

    /// Current access token
    pub token: String,

    /// Refresh token; credentials without one are never proactively refreshed
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,

    /// Absolute expiry of `token`
    pub expires_at: DateTime<Utc>,

    /// Owning user
    pub user_id: String,

    /// Provider-specific extras (e.g. Salesforce `instance_url`)
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub extras: BTreeMap<String, String>,
}

impl Credential {
    /// True when the token expires before `now + buffer`.
    pub fn expires_within(&self, buffer: Duration, now: DateTime<Utc>) -> bool {
        self.expires_at < now + buffer
    }

    /// True when a refresh token is present and non-empty.
    pub fn can_refresh(&self) -> bool {
        self.refresh_token
            .as_deref()
            .map(|t| !t.is_empty())
            .unwrap_or(false)
    }

    /// Salesforce instance URL, when recorded.
    pub fn instance_url(&self) -> Option<&str> {
        self.extras.get(INSTANCE_URL_KEY).map(String::as_str)
    }
}
