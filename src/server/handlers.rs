//! MCP tool handlers for the CRM sync server.
//!
//! This module implements all the MCP tools using the rmcp SDK's tool_router pattern.

use crate::client::CrmProvider;
use crate::error::SuggestionError;
use crate::fields::catalog;
use crate::models::{Credential, Meeting, ProviderId, Suggestion};
use crate::repositories::CredentialStore;
use crate::search::ContactSearch;
use crate::suggestions::SuggestionEngine;
use rmcp::handler::server::tool::ToolRouter;
use rmcp::handler::server::wrapper::Parameters;
use rmcp::model::*;
use rmcp::{tool, tool_handler, tool_router, ErrorData as McpError, ServerHandler};
use schemars::JsonSchema;
use serde::Deserialize;
use std::borrow::Cow;
use std::collections::HashMap;
use std::sync::Arc;

/// MCP server exposing contact search and meeting-driven CRM updates.
#[derive(Clone)]
pub struct CrmSyncServer {
    search: Arc<ContactSearch>,
    engine: Arc<SuggestionEngine>,
    credentials: Arc<dyn CredentialStore>,
    providers: HashMap<ProviderId, Arc<dyn CrmProvider>>,
    tool_router: ToolRouter<Self>,
}

#[tool_handler]
impl ServerHandler for CrmSyncServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities {
                tools: Some(Default::default()),
                ..Default::default()
            },
            server_info: Implementation {
                name: "crm-sync".into(),
                version: env!("CARGO_PKG_VERSION").into(),
                icons: None,
                title: None,
                website_url: None,
            },
            instructions: Some("CRM sync server - searches contacts across local storage, Salesforce and HubSpot, and proposes contact updates extracted from meeting transcripts.".into()),
        }
    }
}

#[derive(Debug, Deserialize, JsonSchema)]
struct SearchContactsParams {
    user_id: String,
    query: String,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct PreviewSuggestionsParams {
    provider: ProviderId,
    meeting: Meeting,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct GenerateSuggestionsParams {
    user_id: String,
    provider: ProviderId,
    contact_id: String,
    meeting: Meeting,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ContactSuggestionsParams {
    user_id: String,
    provider: ProviderId,
    contact_id: String,
    suggestions: Vec<Suggestion>,
}

#[derive(Debug, Deserialize, JsonSchema)]
struct ProviderParams {
    provider: ProviderId,
}

// Helper function to convert errors to MCP errors
fn to_mcp_error(e: impl std::fmt::Display) -> McpError {
    McpError {
        code: ErrorCode::INTERNAL_ERROR,
        message: Cow::from(e.to_string()),
        data: None,
    }
}

fn invalid_params(message: String) -> McpError {
    McpError {
        code: ErrorCode::INVALID_PARAMS,
        message: Cow::from(message),
        data: None,
    }
}

/// Stable machine-readable tag for each suggestion failure kind.
fn suggestion_error_kind(e: &SuggestionError) -> &'static str {
    match e {
        SuggestionError::ContactFetch(_) => "contact_fetch_failed",
        SuggestionError::Extraction(_) => "extraction_failed",
        SuggestionError::Parse(_) => "invalid_ai_response",
        SuggestionError::Update(_) => "update_failed",
        SuggestionError::NothingSelected => "nothing_selected",
    }
}

fn suggestion_error(e: SuggestionError) -> McpError {
    McpError {
        code: ErrorCode::INTERNAL_ERROR,
        message: Cow::from(e.to_string()),
        data: Some(serde_json::json!({ "kind": suggestion_error_kind(&e) })),
    }
}

fn json_result(value: &impl serde::Serialize) -> Result<CallToolResult, McpError> {
    Ok(CallToolResult::success(vec![Content::text(
        serde_json::to_string_pretty(value).map_err(to_mcp_error)?,
    )]))
}

#[tool_router]
impl CrmSyncServer {
    pub fn new(
        search: Arc<ContactSearch>,
        engine: Arc<SuggestionEngine>,
        credentials: Arc<dyn CredentialStore>,
        providers: Vec<Arc<dyn CrmProvider>>,
    ) -> Self {
        Self {
            search,
            engine,
            credentials,
            providers: providers.into_iter().map(|p| (p.id(), p)).collect(),
            tool_router: Self::tool_router(),
        }
    }

    /// Resolve the provider adapter and the user's credential for it.
    async fn connection(
        &self,
        user_id: &str,
        provider_id: ProviderId,
    ) -> Result<(Arc<dyn CrmProvider>, Credential), McpError> {
        let provider = self.providers.get(&provider_id).cloned().ok_or_else(|| {
            invalid_params(format!("{} is not configured", provider_id.display_name()))
        })?;
        let credential = self
            .credentials
            .get_for_user(user_id, provider_id)
            .await
            .map_err(to_mcp_error)?
            .ok_or_else(|| {
                invalid_params(format!(
                    "User {} has not connected {}",
                    user_id,
                    provider_id.display_name()
                ))
            })?;
        Ok((provider, credential))
    }

    /// Search contacts across local storage and every connected CRM.
    #[tool(
        description = "Search a user's contacts across local storage and every connected CRM (Salesforce, HubSpot). Results are merged by email and sorted by name; slow or failing sources are skipped."
    )]
    async fn search_contacts(
        &self,
        params: Parameters<SearchContactsParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: search_contacts called");

        let results = self.search.search(&params.user_id, &params.query).await;

        json_result(&serde_json::json!({
            "query": params.query,
            "result_count": results.len(),
            "results": results,
        }))
    }

    /// Extract suggestions from a meeting before a contact is chosen.
    #[tool(
        description = "Preview contact updates extracted from a meeting transcript for a provider, before a contact is selected. Every suggestion is marked as differing."
    )]
    async fn preview_suggestions(
        &self,
        params: Parameters<PreviewSuggestionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: preview_suggestions called");

        let suggestions = self
            .engine
            .generate_suggestions_preview(params.provider, &params.meeting)
            .await
            .map_err(suggestion_error)?;

        json_result(&serde_json::json!({
            "provider": params.provider,
            "status": if suggestions.is_empty() { "no_suggestions" } else { "ok" },
            "suggestions": suggestions,
        }))
    }

    /// Compare facts from a meeting against a provider contact.
    #[tool(
        description = "Generate suggested updates for a CRM contact from a meeting transcript. Only values that differ from the contact's current values are returned."
    )]
    async fn generate_suggestions(
        &self,
        params: Parameters<GenerateSuggestionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: generate_suggestions called");

        let (provider, credential) = self.connection(&params.user_id, params.provider).await?;
        let set = self
            .engine
            .generate_suggestions(provider.as_ref(), &credential, &params.contact_id, &params.meeting)
            .await
            .map_err(suggestion_error)?;

        json_result(&serde_json::json!({
            "status": if set.suggestions.is_empty() { "no_suggestions" } else { "ok" },
            "contact": set.contact,
            "suggestions": set.suggestions,
        }))
    }

    /// Re-check suggestions against a different contact.
    #[tool(
        description = "Re-compare previously generated suggestions against a different CRM contact, dropping those that match the contact's current values."
    )]
    async fn rematch_suggestions(
        &self,
        params: Parameters<ContactSuggestionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: rematch_suggestions called");

        let (provider, credential) = self.connection(&params.user_id, params.provider).await?;
        let set = self
            .engine
            .rematch_suggestions(provider.as_ref(), &credential, &params.contact_id, params.suggestions)
            .await
            .map_err(suggestion_error)?;

        json_result(&set)
    }

    /// Write the selected suggestions to the CRM.
    #[tool(
        description = "Apply the selected suggestions to a CRM contact. Unselected suggestions are ignored."
    )]
    async fn apply_suggestions(
        &self,
        params: Parameters<ContactSuggestionsParams>,
    ) -> Result<CallToolResult, McpError> {
        let params = params.0;
        tracing::info!("MCP Handler: apply_suggestions called");
        tracing::debug!(
            "Parameters: provider={}, contact_id={}, suggestions={}",
            params.provider,
            params.contact_id,
            params.suggestions.len()
        );

        let (provider, credential) = self.connection(&params.user_id, params.provider).await?;
        let contact = self
            .engine
            .apply_suggestions(provider.as_ref(), &credential, &params.contact_id, &params.suggestions)
            .await
            .map_err(suggestion_error)?;

        json_result(&contact)
    }

    /// List a provider's catalogued fields by category.
    #[tool(description = "List the contact fields known for a CRM provider, grouped by category")]
    async fn list_provider_fields(
        &self,
        params: Parameters<ProviderParams>,
    ) -> Result<CallToolResult, McpError> {
        let fields = catalog(params.0.provider);

        let groups: Vec<serde_json::Value> = fields
            .grouped()
            .into_iter()
            .map(|(category, descriptors)| {
                serde_json::json!({
                    "category": category,
                    "heading": category.heading(),
                    "fields": descriptors,
                })
            })
            .collect();

        json_result(&serde_json::json!({
            "provider": fields.provider(),
            "groups": groups,
        }))
    }
}
