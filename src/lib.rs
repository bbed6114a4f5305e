// Library half of the PAN-OS MCP server: configuration, the XML API client and
// the tool registry. The binary in main.rs wires these into an rmcp server.

pub mod config;
pub mod panos;
pub mod tools;

pub use config::PanosConfig;
pub use panos::client::PanosApiClient;
pub use panos::error::PanosApiError;
pub use tools::{Operation, PanosTools};
