//! Firewall system tools
//!
//! System information and the server health check.

use std::sync::Arc;

use super::{format, ServerDetails, ToolModule};
use crate::panos::{PanosApiClient, PanosApiError};

#[derive(Clone)]
pub struct SystemTools {
    client: Arc<PanosApiClient>,
    server: ServerDetails,
}

impl SystemTools {
    pub fn new(client: Arc<PanosApiClient>, server: ServerDetails) -> Self {
        Self { client, server }
    }

    pub async fn show_system_info(&self) -> Result<String, PanosApiError> {
        tracing::info!("Retrieving firewall system information");
        let info = self.client.get_system_info().await?;
        tracing::info!(hostname = %info.hostname, version = %info.version, "Retrieved system information");
        Ok(format::system_info(&info))
    }

    pub async fn check_health(&self) -> String {
        tracing::info!(target_firewall = %self.server.target, "Performing health check");
        let status = self.client.get_system_info().await;
        if let Err(err) = &status {
            Self::log_failure("complete health check", err);
        }
        format::health_report(&self.server, &status)
    }
}

impl ToolModule for SystemTools {}
