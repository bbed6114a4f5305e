//! Firewall object tools
//!
//! Address objects, security zones and security policies, fetched across
//! every location the firewall reports.

use std::sync::Arc;

use super::format;
use crate::panos::{PanosApiClient, PanosApiError};

#[derive(Clone)]
pub struct ObjectTools {
    client: Arc<PanosApiClient>,
}

impl ObjectTools {
    pub fn new(client: Arc<PanosApiClient>) -> Self {
        Self { client }
    }

    pub async fn retrieve_address_objects(&self) -> Result<String, PanosApiError> {
        tracing::info!("Retrieving address objects");
        let objects = self.client.get_address_objects().await?;
        if objects.is_empty() {
            tracing::info!("No address objects found. Returning standard message.");
        }
        Ok(format::address_objects(&objects))
    }

    pub async fn retrieve_security_zones(&self) -> Result<String, PanosApiError> {
        tracing::info!("Retrieving security zones");
        let zones = self.client.get_security_zones().await?;
        if zones.is_empty() {
            tracing::info!("No security zones found. Returning standard message.");
        }
        Ok(format::security_zones(&zones))
    }

    pub async fn retrieve_security_policies(&self) -> Result<String, PanosApiError> {
        tracing::info!("Retrieving security policies");
        let policies = self.client.get_security_policies().await?;
        if policies.is_empty() {
            tracing::info!("No security policies found. Returning standard message.");
        }
        Ok(format::security_policies(&policies))
    }
}
