//! Proposed field updates derived from meeting content.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// One extracted fact as parsed from the AI response, before any diff.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SuggestionDraft {
    /// Canonical field name
    pub field: String,

    /// Proposed value
    pub value: String,

    /// Transcript excerpt explaining where the value came from
    #[serde(default)]
    pub context: Option<String>,

    /// Position of the excerpt in the transcript (e.g. "12:34")
    #[serde(default)]
    pub timestamp: Option<String>,
}

/// A single proposed field update.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, JsonSchema)]
pub struct Suggestion {
    /// Canonical field name
    pub field: String,

    /// Human label from the provider's field catalogue
    pub label: String,

    /// Value currently stored in the CRM
    pub current_value: Option<String>,

    /// Value proposed from the meeting
    pub new_value: String,

    /// Transcript excerpt explaining the provenance
    #[serde(default)]
    pub context: String,

    /// Position of the excerpt in the transcript
    #[serde(default)]
    pub timestamp: Option<String>,

    /// Whether the update should be applied
    #[serde(default = "default_selected")]
    pub selected: bool,

    /// Whether `new_value` differs from `current_value`
    #[serde(default)]
    pub differs: bool,
}

fn default_selected() -> bool {
    true
}
