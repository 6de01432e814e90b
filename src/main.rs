//! CRM Sync - Main entry point
//!
//! Loads configuration, wires the stores, provider clients and token
//! lifecycle together, starts one proactive refresh sweep per configured
//! provider and serves the MCP tools over stdio.

use anyhow::Result;
use crm_sync::auth::OAuthTokenRefresher;
use crm_sync::client::HttpTransport;
use crm_sync::repositories::{
    CredentialStore, InMemoryContactStore, InMemoryCredentialStore, LocalContactStore,
};
use crm_sync::{
    AsyncCrmClient, Config, ContactSearch, CrmProvider, CrmSyncServer, GeminiClient,
    HubspotClient, Metrics, ProactiveRefreshScheduler, ProviderId, SalesforceClient,
    SuggestionEngine, TokenManager,
};
use std::sync::Arc;
use std::time::Duration;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // Configuration first so LOG_LEVEL can seed the filter
    let config = Config::from_env();

    let default_level = config
        .as_ref()
        .map(|c| c.log_level.clone())
        .unwrap_or_else(|_| "error".to_string());
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    // stderr only: stdout carries the MCP protocol
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    let config = match config {
        Ok(cfg) => {
            info!("Configuration loaded successfully");
            cfg
        }
        Err(e) => {
            error!("Failed to load configuration: {}", e);
            return Err(e.into());
        }
    };

    let metrics = Metrics::new();
    let transport = HttpTransport::new(Duration::from_secs(config.request_timeout), metrics.clone());

    let credential_store = match &config.credentials_path {
        Some(path) => InMemoryCredentialStore::load(path)?,
        None => {
            warn!("CREDENTIALS_PATH not set, credentials will not be persisted");
            InMemoryCredentialStore::new()
        }
    };
    let credentials = Arc::new(credential_store) as Arc<dyn CredentialStore>;

    let local_contacts = match &config.local_contacts_path {
        Some(path) => InMemoryContactStore::load(path)?,
        None => InMemoryContactStore::default(),
    };
    let local = Arc::new(local_contacts) as Arc<dyn LocalContactStore>;

    let mut tokens = TokenManager::new(
        credentials.clone(),
        config.token_refresh_buffer_secs,
        metrics.clone(),
    );
    if let Some(salesforce) = &config.salesforce {
        tokens = tokens.with_refresher(
            ProviderId::Salesforce,
            Arc::new(OAuthTokenRefresher::new(
                ProviderId::Salesforce,
                salesforce.clone(),
                transport.clone(),
            )),
        );
    }
    if let Some(hubspot) = &config.hubspot {
        tokens = tokens.with_refresher(
            ProviderId::Hubspot,
            Arc::new(OAuthTokenRefresher::new(
                ProviderId::Hubspot,
                hubspot.clone(),
                transport.clone(),
            )),
        );
    }
    let tokens = Arc::new(tokens);

    let mut providers: Vec<Arc<dyn CrmProvider>> = Vec::new();
    if config.salesforce.is_some() {
        let client = SalesforceClient::new(transport.clone(), config.salesforce_api_version.clone());
        providers.push(Arc::new(AsyncCrmClient::new(client, tokens.clone())));
    }
    if let Some(hubspot) = &config.hubspot {
        let client = HubspotClient::new(transport.clone(), hubspot.api_base_url.clone());
        providers.push(Arc::new(AsyncCrmClient::new(client, tokens.clone())));
    }
    if providers.is_empty() {
        warn!("No CRM provider configured, search will only cover local contacts");
    }

    let sweeps: Vec<_> = providers
        .iter()
        .map(|provider| {
            info!("Starting proactive token refresh for {}", provider.id());
            ProactiveRefreshScheduler::new(
                provider.id(),
                tokens.clone(),
                config.proactive_refresh_threshold_secs,
                Duration::from_secs(config.proactive_refresh_interval_secs),
            )
            .spawn()
        })
        .collect();

    if config.gemini_api_key.is_none() {
        warn!("GEMINI_API_KEY not set, suggestion tools will fail");
    }
    let ai = Arc::new(GeminiClient::new(&config, metrics.clone()));
    let engine = Arc::new(SuggestionEngine::new(ai));

    let search = Arc::new(ContactSearch::new(
        local,
        credentials.clone(),
        providers.clone(),
        config.search_timeout(),
        metrics.clone(),
    ));

    let server = CrmSyncServer::new(search, engine, credentials, providers);

    info!("Starting MCP server with stdio transport");
    let result = crm_sync::server::run_server(server).await;

    for sweep in sweeps {
        sweep.abort();
    }
    info!(metrics = ?metrics.summary(), "CRM sync server shutdown complete");
    result
}
