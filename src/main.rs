//
// Purpose:
//
// This Rust application implements an MCP (Model Context Protocol) server that acts as a
// read-only bridge to a Palo Alto Networks firewall. It exposes PAN-OS XML API queries as
// tools that can be invoked by MCP clients (e.g., AI models, automation scripts).
//
// Structure:
// - `main()`: Entry point of the application. Loads configuration, initializes logging
//   (tracing), sets up the `PanosToolsServer`, and serves MCP over stdio.
//
// - `PanosToolsServer`: The core struct that implements the `rmcp::ServerHandler` trait
//   and the `#[tool(tool_box)]` attribute. Each `#[tool(...)]` method forwards to the
//   `PanosTools` registry in the library crate.
//
// - `panos` module (library):
//   - `PanosApiClient`: Issues authenticated GET requests against the XML API.
//   - `parser`: Maps XML responses onto `SystemInfo`, `AddressObject`, `SecurityZone` and
//     `SecurityPolicy`.
//
// Workflow:
// 1. Server starts and listens for MCP requests on stdio.
// 2. MCP client sends a `call_tool` request.
// 3. `PanosToolsServer` dispatches to the `Operation` named by the tool.
// 4. The operation queries the firewall, parses the XML and renders a markdown report.
// 5. Failures are rendered as an error block and returned with `isError: true`.
//
// Configuration:
// The server requires `PANOS_HOSTNAME` and `PANOS_API_KEY`. `PANOS_DEBUG`, `PANOS_TIMEOUT`
// and `PANOS_VERIFY_SSL` are optional. Logging is controlled by `RUST_LOG`.

use std::sync::Arc;

use anyhow::Context;
use clap::Parser;
use dotenv::dotenv;
use rmcp::{
    model::{CallToolResult, Implementation, ProtocolVersion, ServerCapabilities, ServerInfo},
    tool,
    transport::stdio,
    Error as McpError, ServerHandler, ServiceExt,
};

use mcp_server_panos::tools::{
    ServerDetails, CHECK_HEALTH_DESCRIPTION, RETRIEVE_ADDRESS_OBJECTS_DESCRIPTION,
    RETRIEVE_SECURITY_POLICIES_DESCRIPTION, RETRIEVE_SECURITY_ZONES_DESCRIPTION,
    SHOW_SYSTEM_INFO_DESCRIPTION,
};
use mcp_server_panos::{Operation, PanosApiClient, PanosConfig, PanosTools};

#[derive(Parser, Debug)]
#[command(name = "mcp-server-panos")]
#[command(about = "Palo Alto Networks PAN-OS MCP Server", version)]
struct Args {
    /// Enable debug logging (same as PANOS_DEBUG=true)
    #[arg(long)]
    debug: bool,
}

#[derive(Clone)]
struct PanosToolsServer {
    tools: PanosTools,
}

#[tool(tool_box)]
impl PanosToolsServer {
    fn new(config: &PanosConfig) -> Result<Self, anyhow::Error> {
        let client = PanosApiClient::new(config)
            .map_err(|e| anyhow::anyhow!("Error creating PAN-OS client: {}", e))?;

        let server = ServerDetails {
            version: env!("CARGO_PKG_VERSION"),
            target: config.hostname.clone(),
            debug: config.debug,
        };

        Ok(Self {
            tools: PanosTools::new(Arc::new(client), server),
        })
    }

    #[tool(
        name = "show_system_info",
        description = SHOW_SYSTEM_INFO_DESCRIPTION
    )]
    async fn show_system_info(&self) -> Result<CallToolResult, McpError> {
        self.tools.call(Operation::ShowSystemInfo).await
    }

    #[tool(
        name = "retrieve_address_objects",
        description = RETRIEVE_ADDRESS_OBJECTS_DESCRIPTION
    )]
    async fn retrieve_address_objects(&self) -> Result<CallToolResult, McpError> {
        self.tools.call(Operation::RetrieveAddressObjects).await
    }

    #[tool(
        name = "retrieve_security_zones",
        description = RETRIEVE_SECURITY_ZONES_DESCRIPTION
    )]
    async fn retrieve_security_zones(&self) -> Result<CallToolResult, McpError> {
        self.tools.call(Operation::RetrieveSecurityZones).await
    }

    #[tool(
        name = "retrieve_security_policies",
        description = RETRIEVE_SECURITY_POLICIES_DESCRIPTION
    )]
    async fn retrieve_security_policies(&self) -> Result<CallToolResult, McpError> {
        self.tools.call(Operation::RetrieveSecurityPolicies).await
    }

    #[tool(
        name = "check_health",
        description = CHECK_HEALTH_DESCRIPTION
    )]
    async fn check_health(&self) -> Result<CallToolResult, McpError> {
        self.tools.call(Operation::CheckHealth).await
    }
}

#[tool(tool_box)]
impl ServerHandler for PanosToolsServer {
    fn get_info(&self) -> ServerInfo {
        let tool_lines: Vec<String> = Operation::ALL
            .iter()
            .map(|op| format!("- '{}': {}", op.name(), op.description()))
            .collect();

        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(format!(
                "This server provides read-only tools for a Palo Alto Networks firewall via the PAN-OS XML API.\n\
                 Available tools:\n{}",
                tool_lines.join("\n")
            )),
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let args = Args::parse();
    dotenv().ok();

    let mut config = PanosConfig::from_env().context(
        "Error loading configuration. Set PANOS_HOSTNAME and PANOS_API_KEY \
         (optional: PANOS_DEBUG, PANOS_TIMEOUT, PANOS_VERIFY_SSL)",
    )?;
    config.debug |= args.debug;

    let level = if config.debug {
        tracing::Level::DEBUG
    } else {
        tracing::Level::INFO
    };
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env().add_directive(level.into()))
        .with_writer(std::io::stderr)
        .init();

    tracing::info!(?config, "Starting PAN-OS MCP Server...");

    let server = PanosToolsServer::new(&config)?;

    tracing::info!("Using stdio transport");
    let service = server.serve(stdio()).await.inspect_err(|e| {
        tracing::error!("serving error: {:?}", e);
    })?;

    service.waiting().await?;
    Ok(())
}
