//! MCP server exposing the CRM sync layer.
//!
//! This module provides the MCP protocol server that lets AI assistants
//! search contacts and drive meeting-based contact updates.

pub mod handlers;

pub use handlers::CrmSyncServer;

use anyhow::Result;
use rmcp::transport::io::stdio;
use rmcp::ServiceExt;

/// Run the MCP server over stdio until the client disconnects.
pub async fn run_server(server: CrmSyncServer) -> Result<()> {
    let service = server.serve(stdio()).await?;
    service.waiting().await?;
    Ok(())
}
