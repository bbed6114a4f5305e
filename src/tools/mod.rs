//! Tools module for the PAN-OS MCP Server
//!
//! Each submodule groups the tools for one area of the firewall. [`PanosTools`]
//! is the registry that maps an [`Operation`] onto the module that serves it.

pub mod format;
pub mod objects;
pub mod system;

use std::sync::Arc;

use rmcp::model::{CallToolResult, Content};
use rmcp::Error as McpError;

use crate::panos::{PanosApiClient, PanosApiError};
use objects::ObjectTools;
use system::SystemTools;

pub const SHOW_SYSTEM_INFO_DESCRIPTION: &str = "Get system information from the Palo Alto Networks firewall: hostname, management addressing, time, uptime and software versions.";

pub const RETRIEVE_ADDRESS_OBJECTS_DESCRIPTION: &str = "Get the address objects configured on the Palo Alto Networks firewall, grouped by location (shared, vsys or device group).";

pub const RETRIEVE_SECURITY_ZONES_DESCRIPTION: &str = "Get the security zones configured on the Palo Alto Networks firewall, with their interfaces and identification settings.";

pub const RETRIEVE_SECURITY_POLICIES_DESCRIPTION: &str = "Get the security policy rules configured on the Palo Alto Networks firewall, in rulebase order per vsys.";

pub const CHECK_HEALTH_DESCRIPTION: &str =
    "Check the health of the MCP server and its connectivity to the PAN-OS firewall.";

pub trait ToolModule {
    fn success_result(text: String) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::success(vec![Content::text(text)]))
    }

    fn error_result(err: &PanosApiError) -> Result<CallToolResult, McpError> {
        Ok(CallToolResult::error(vec![Content::text(format::error_report(err))]))
    }

    fn log_failure(operation: &str, err: &PanosApiError) {
        tracing::error!(
            error_type = err.kind().as_str(),
            details = ?err.details(),
            "Failed to {}: {}",
            operation,
            err
        );
    }
}

/// Static facts about this server shown by the health check.
#[derive(Debug, Clone)]
pub struct ServerDetails {
    pub version: &'static str,
    pub target: String,
    pub debug: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    ShowSystemInfo,
    RetrieveAddressObjects,
    RetrieveSecurityZones,
    RetrieveSecurityPolicies,
    CheckHealth,
}

impl Operation {
    pub const ALL: [Operation; 5] = [
        Operation::ShowSystemInfo,
        Operation::RetrieveAddressObjects,
        Operation::RetrieveSecurityZones,
        Operation::RetrieveSecurityPolicies,
        Operation::CheckHealth,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            Operation::ShowSystemInfo => "show_system_info",
            Operation::RetrieveAddressObjects => "retrieve_address_objects",
            Operation::RetrieveSecurityZones => "retrieve_security_zones",
            Operation::RetrieveSecurityPolicies => "retrieve_security_policies",
            Operation::CheckHealth => "check_health",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Operation::ShowSystemInfo => SHOW_SYSTEM_INFO_DESCRIPTION,
            Operation::RetrieveAddressObjects => RETRIEVE_ADDRESS_OBJECTS_DESCRIPTION,
            Operation::RetrieveSecurityZones => RETRIEVE_SECURITY_ZONES_DESCRIPTION,
            Operation::RetrieveSecurityPolicies => RETRIEVE_SECURITY_POLICIES_DESCRIPTION,
            Operation::CheckHealth => CHECK_HEALTH_DESCRIPTION,
        }
    }

    pub fn from_name(name: &str) -> Option<Operation> {
        Operation::ALL.into_iter().find(|op| op.name() == name)
    }
}

#[derive(Clone)]
pub struct PanosTools {
    system: SystemTools,
    objects: ObjectTools,
}

impl PanosTools {
    pub fn new(client: Arc<PanosApiClient>, server: ServerDetails) -> Self {
        Self {
            system: SystemTools::new(client.clone(), server),
            objects: ObjectTools::new(client),
        }
    }

    /// Runs `op` and returns its report, or the first error it hit.
    pub async fn invoke(&self, op: Operation) -> Result<String, PanosApiError> {
        match op {
            Operation::ShowSystemInfo => self.system.show_system_info().await,
            Operation::RetrieveAddressObjects => self.objects.retrieve_address_objects().await,
            Operation::RetrieveSecurityZones => self.objects.retrieve_security_zones().await,
            Operation::RetrieveSecurityPolicies => self.objects.retrieve_security_policies().await,
            Operation::CheckHealth => Ok(self.system.check_health().await),
        }
    }

    /// Runs `op` and packages the outcome for an MCP client. Appliance failures
    /// become an error result carrying the rendered error block.
    pub async fn call(&self, op: Operation) -> Result<CallToolResult, McpError> {
        match self.invoke(op).await {
            Ok(report) => Self::success_result(report),
            Err(err) => {
                Self::log_failure(op.name(), &err);
                Self::error_result(&err)
            }
        }
    }
}

impl ToolModule for PanosTools {}
