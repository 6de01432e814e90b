//! Provider-agnostic suggestion flow.
//!
//! One [`SuggestionEngine`] serves every provider: the provider only
//! contributes its field catalogue and contact I/O through [`CrmProvider`].
//! Nothing is written until [`SuggestionEngine::apply_suggestions`] is called.

use crate::ai::AiService;
use crate::client::CrmProvider;
use crate::error::{SuggestionError, SuggestionResult};
use crate::fields::{catalog, FieldCatalog};
use crate::models::{Credential, Meeting, ProviderContact, ProviderId, Suggestion, SuggestionDraft};
use crate::prompt::{build_prompt, parse_response};
use serde::Serialize;
use serde_json::{Map, Value};
use std::sync::Arc;

/// A fetched contact with the updates proposed for it.
#[derive(Debug, Clone, Serialize)]
pub struct SuggestionSet {
    pub contact: ProviderContact,
    pub suggestions: Vec<Suggestion>,
}

pub struct SuggestionEngine {
    ai: Arc<dyn AiService>,
}

impl SuggestionEngine {
    pub fn new(ai: Arc<dyn AiService>) -> Self {
        Self { ai }
    }

    /// Propose updates for an existing provider contact.
    ///
    /// The contact fetch and the AI extraction run concurrently. A failed
    /// fetch fails the whole operation; only suggestions whose value differs
    /// from the stored one are returned.
    pub async fn generate_suggestions(
        &self,
        provider: &dyn CrmProvider,
        credential: &Credential,
        contact_id: &str,
        meeting: &Meeting,
    ) -> SuggestionResult<SuggestionSet> {
        let (contact, drafts) = tokio::join!(
            provider.get_contact(credential, contact_id),
            self.extract_drafts(provider.fields(), meeting)
        );
        let contact = contact.map_err(SuggestionError::ContactFetch)?;
        let drafts = drafts?;

        let suggestions = diff_drafts(provider.fields(), &drafts, &contact);
        tracing::debug!(
            provider = %provider.id(),
            contact_id,
            drafts = drafts.len(),
            suggestions = suggestions.len(),
            "Suggestions generated"
        );

        Ok(SuggestionSet {
            contact,
            suggestions,
        })
    }

    /// Extraction results before any contact is chosen: no current values,
    /// every suggestion marked as differing.
    pub async fn generate_suggestions_preview(
        &self,
        provider: ProviderId,
        meeting: &Meeting,
    ) -> SuggestionResult<Vec<Suggestion>> {
        let fields = catalog(provider);
        let drafts = self.extract_drafts(fields, meeting).await?;

        Ok(drafts
            .iter()
            .filter_map(|draft| build_suggestion(fields, draft, None))
            .collect())
    }

    /// Fetch a different contact and re-diff existing suggestions against it.
    pub async fn rematch_suggestions(
        &self,
        provider: &dyn CrmProvider,
        credential: &Credential,
        contact_id: &str,
        suggestions: Vec<Suggestion>,
    ) -> SuggestionResult<SuggestionSet> {
        let contact = provider
            .get_contact(credential, contact_id)
            .await
            .map_err(SuggestionError::ContactFetch)?;
        let suggestions = merge_with_contact(suggestions, &contact);

        Ok(SuggestionSet {
            contact,
            suggestions,
        })
    }

    /// Commit the selected suggestions to the provider.
    pub async fn apply_suggestions(
        &self,
        provider: &dyn CrmProvider,
        credential: &Credential,
        contact_id: &str,
        suggestions: &[Suggestion],
    ) -> SuggestionResult<ProviderContact> {
        let updates = selected_updates(suggestions);
        if updates.is_empty() {
            return Err(SuggestionError::NothingSelected);
        }

        provider
            .update_contact(credential, contact_id, &updates)
            .await
            .map_err(|e| {
                tracing::error!(
                    provider = %provider.id(),
                    contact_id,
                    "Failed to apply {} update(s): {}",
                    updates.len(),
                    e
                );
                SuggestionError::Update(e)
            })
    }

    async fn extract_drafts(
        &self,
        fields: &FieldCatalog,
        meeting: &Meeting,
    ) -> SuggestionResult<Vec<SuggestionDraft>> {
        let prompt = build_prompt(fields);
        let raw = self.ai.extract(&prompt, meeting).await?;
        Ok(parse_response(&raw)?)
    }
}

/// Re-diff suggestions against a newly chosen contact.
///
/// Uses the same rules as [`SuggestionEngine::generate_suggestions`];
/// each suggestion keeps its `selected` flag.
pub fn merge_with_contact(suggestions: Vec<Suggestion>, contact: &ProviderContact) -> Vec<Suggestion> {
    suggestions
        .into_iter()
        .filter_map(|mut suggestion| {
            let current = contact.value_as_string(&suggestion.field);
            suggestion.differs = differs(current.as_deref(), &suggestion.new_value);
            suggestion.current_value = current;
            suggestion.differs.then_some(suggestion)
        })
        .collect()
}

/// Selected suggestions as a canonical-name update map. Later entries win.
pub fn selected_updates(suggestions: &[Suggestion]) -> Map<String, Value> {
    suggestions
        .iter()
        .filter(|s| s.selected)
        .map(|s| (s.field.clone(), Value::String(s.new_value.clone())))
        .collect()
}

fn diff_drafts(
    fields: &FieldCatalog,
    drafts: &[SuggestionDraft],
    contact: &ProviderContact,
) -> Vec<Suggestion> {
    drafts
        .iter()
        .filter_map(|draft| {
            let current = contact.value_as_string(&draft.field);
            build_suggestion(fields, draft, Some(current))
        })
        .filter(|s| s.differs)
        .collect()
}

/// `baseline` is `None` in preview mode and `Some(current)` once a contact is known.
fn build_suggestion(
    fields: &FieldCatalog,
    draft: &SuggestionDraft,
    baseline: Option<Option<String>>,
) -> Option<Suggestion> {
    let new_value = draft.value.trim();
    if new_value.is_empty() {
        return None;
    }

    let (current_value, differs) = match baseline {
        Some(current) => {
            let d = differs(current.as_deref(), new_value);
            (current, d)
        }
        None => (None, true),
    };

    Some(Suggestion {
        field: draft.field.clone(),
        label: fields
            .label(&draft.field)
            .map(String::from)
            .unwrap_or_else(|| draft.field.clone()),
        current_value,
        new_value: new_value.to_string(),
        context: draft.context.clone().unwrap_or_default(),
        timestamp: draft.timestamp.clone(),
        selected: true,
        differs,
    })
}

fn differs(current: Option<&str>, new_value: &str) -> bool {
    match current {
        Some(current) => current.trim() != new_value.trim(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn contact(fields: Value) -> ProviderContact {
        ProviderContact {
            provider: ProviderId::Hubspot,
            id: "101".to_string(),
            fields: fields.as_object().cloned().unwrap_or_default(),
        }
    }

    fn draft(field: &str, value: &str) -> SuggestionDraft {
        SuggestionDraft {
            field: field.to_string(),
            value: value.to_string(),
            context: Some("said in the meeting".to_string()),
            timestamp: Some("02:10".to_string()),
        }
    }

    #[test]
    fn test_changed_value_is_suggested() {
        let fields = catalog(ProviderId::Hubspot);
        let suggestions = diff_drafts(
            fields,
            &[draft("jobtitle", "CTO")],
            &contact(json!({"jobtitle": "Engineer"})),
        );

        assert_eq!(suggestions.len(), 1);
        let s = &suggestions[0];
        assert_eq!(s.label, "Job Title");
        assert_eq!(s.current_value.as_deref(), Some("Engineer"));
        assert_eq!(s.new_value, "CTO");
        assert!(s.differs);
        assert!(s.selected);
    }

    #[test]
    fn test_unchanged_value_is_not_suggested() {
        let fields = catalog(ProviderId::Hubspot);
        let suggestions = diff_drafts(
            fields,
            &[draft("jobtitle", "Engineer")],
            &contact(json!({"jobtitle": "Engineer"})),
        );
        assert!(suggestions.is_empty());
    }

    #[test]
    fn test_missing_or_null_current_value_differs() {
        let fields = catalog(ProviderId::Hubspot);
        let suggestions = diff_drafts(
            fields,
            &[draft("city", "Berlin"), draft("zip", "10115")],
            &contact(json!({"city": null})),
        );
        assert_eq!(suggestions.len(), 2);
        assert!(suggestions.iter().all(|s| s.current_value.is_none()));
    }

    #[test]
    fn test_unknown_field_keeps_its_name_as_label() {
        let fields = catalog(ProviderId::Hubspot);
        let s = build_suggestion(fields, &draft("favorite_color", "blue"), None).unwrap();
        assert_eq!(s.label, "favorite_color");
        assert!(s.differs);
    }

    #[test]
    fn test_merge_with_new_contact_rediffs() {
        let fields = catalog(ProviderId::Hubspot);
        let first = diff_drafts(
            fields,
            &[draft("jobtitle", "CTO"), draft("city", "Berlin")],
            &contact(json!({"jobtitle": "Engineer"})),
        );
        assert_eq!(first.len(), 2);

        let mut first = first;
        first[1].selected = false;
        let merged = merge_with_contact(first, &contact(json!({"jobtitle": "CTO", "city": "Paris"})));

        assert_eq!(merged.len(), 1);
        assert_eq!(merged[0].field, "city");
        assert_eq!(merged[0].current_value.as_deref(), Some("Paris"));
        assert!(!merged[0].selected);
    }

    #[test]
    fn test_selected_updates_skips_unselected() {
        let fields = catalog(ProviderId::Hubspot);
        let mut suggestions = vec![
            build_suggestion(fields, &draft("city", "Berlin"), None).unwrap(),
            build_suggestion(fields, &draft("zip", "10115"), None).unwrap(),
        ];
        suggestions[1].selected = false;

        let updates = selected_updates(&suggestions);
        assert_eq!(updates.len(), 1);
        assert_eq!(updates["city"], "Berlin");
    }
}
