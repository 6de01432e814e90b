//! CRM Sync - contact reconciliation and meeting-driven updates for Salesforce and HubSpot.
//!
//! This library searches a user's contacts across local storage and every
//! connected CRM at once, merges duplicates by email, proposes field updates
//! extracted from meeting transcripts and keeps OAuth tokens fresh.
//!
//! # Architecture
//!
//! - **models**: Credentials, contacts, meetings and suggestions
//! - **error**: Error types per concern
//! - **config**: Configuration from environment variables
//! - **fields**: Per-provider field catalogues and canonical ↔ API name mapping
//! - **prompt**: Extraction prompt construction and AI response parsing
//! - **client**: Salesforce and HubSpot HTTP clients
//! - **ai**: AI text-completion service
//! - **auth**: Token refresh, lazy and scheduled
//! - **repositories**: Credential and local contact storage
//! - **matching**: Fuzzy matching for local contact search
//! - **search**: Concurrent multi-source contact search and merge
//! - **suggestions**: Suggestion generation, re-diffing and application
//! - **server**: MCP protocol server

pub mod ai;
pub mod auth;
pub mod client;
pub mod config;
pub mod error;
pub mod fields;
pub mod matching;
pub mod metrics;
pub mod models;
pub mod prompt;
pub mod repositories;
pub mod search;
pub mod server;
pub mod suggestions;

pub use ai::{AiService, GeminiClient};
pub use auth::{ProactiveRefreshScheduler, SweepReport, TokenManager, TokenRefresher};
pub use client::{AsyncCrmClient, CrmProvider, HubspotClient, SalesforceClient};
pub use config::Config;
pub use error::{AiError, ConfigError, CrmError, ParseError, StoreError, SuggestionError};
pub use fields::{catalog, map_fields_for_provider, FieldCatalog, FieldCategory, FieldDescriptor};
pub use metrics::{HttpTimer, Metrics, MetricsSummary};
pub use models::{
    CanonicalContact, ContactSource, Credential, LocalContact, Meeting, ProviderContact,
    ProviderId, Suggestion,
};
pub use search::ContactSearch;
pub use server::CrmSyncServer;
pub use suggestions::{SuggestionEngine, SuggestionSet};
