use std::time::Duration;

use reqwest::{Client, Url};
use roxmltree::Document;
use tracing::{debug, error, info, warn};

use super::error::PanosApiError;
use super::models::{AddressObject, SecurityPolicy, SecurityZone, SystemInfo};
use super::parser;
use crate::config::PanosConfig;

pub const SYSTEM_INFO_CMD: &str = "<show><system><info></info></system></show>";

pub const ADDRESS_XPATH: &str = "/config/shared/address\
|/config/devices/entry[@name='localhost.localdomain']/vsys\
|/config/devices/entry[@name='localhost.localdomain']/device-group/entry";

pub const ZONE_XPATH: &str = "/config/devices/entry[@name='localhost.localdomain']/vsys/entry/zone";

pub const SECURITY_RULES_XPATH: &str =
    "/config/devices/entry[@name='localhost.localdomain']/vsys/entry/rulebase/security/rules";

/// Envelope error codes that mean the key was rejected rather than the command.
const AUTH_ERROR_CODES: &[&str] = &["403", "16", "22"];

/// Client for the PAN-OS XML API.
///
/// Holds one `reqwest::Client` whose connection pool is shared by every
/// request issued through this value (and its clones, via `Arc`), and
/// released when the last owner is dropped.
pub struct PanosApiClient {
    api_key: String,
    base_url: Url,
    host: String,
    port: u16,
    timeout: Duration,
    http_client: Client,
}

impl PanosApiClient {
    pub fn new(config: &PanosConfig) -> Result<Self, PanosApiError> {
        let base_url = format!("https://{}/api/", config.hostname);
        Self::with_base_url(config, &base_url)
    }

    /// Builds a client against an explicit API endpoint, e.g. a local test double.
    pub fn with_base_url(config: &PanosConfig, base_url: &str) -> Result<Self, PanosApiError> {
        let base_url = Url::parse(base_url).map_err(|e| {
            PanosApiError::connection(format!("Invalid firewall address: {}", e))
                .with_detail("host", config.hostname.clone())
        })?;
        let host = base_url.host_str().unwrap_or_default().to_string();
        let port = base_url.port_or_known_default().unwrap_or(443);

        let http_client = Client::builder()
            .danger_accept_invalid_certs(!config.verify_ssl)
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                PanosApiError::connection(format!("Failed to create HTTP client: {}", e))
                    .with_detail("host", host.clone())
                    .with_detail("port", port)
            })?;

        Ok(Self {
            api_key: config.api_key.clone(),
            base_url,
            host,
            port,
            timeout: config.timeout,
            http_client,
        })
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_str()
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub async fn get_system_info(&self) -> Result<SystemInfo, PanosApiError> {
        info!("Retrieving system information");
        let body = self.request(&[("type", "op"), ("cmd", SYSTEM_INFO_CMD)]).await?;
        let doc = open_envelope(&body)?;
        parser::system_info(&doc)
    }

    pub async fn get_address_objects(&self) -> Result<Vec<AddressObject>, PanosApiError> {
        info!("Retrieving address objects");
        let body = self.config_get(ADDRESS_XPATH).await?;
        let doc = open_envelope(&body)?;
        let objects = parser::address_objects(&doc)?;
        info!(count = objects.len(), "Parsed address objects");
        Ok(objects)
    }

    pub async fn get_security_zones(&self) -> Result<Vec<SecurityZone>, PanosApiError> {
        info!("Retrieving security zones");
        let body = self.config_get(ZONE_XPATH).await?;
        let doc = open_envelope(&body)?;
        let zones = parser::security_zones(&doc)?;
        info!(count = zones.len(), "Parsed security zones");
        Ok(zones)
    }

    pub async fn get_security_policies(&self) -> Result<Vec<SecurityPolicy>, PanosApiError> {
        info!("Retrieving security policies");
        let body = self.config_get(SECURITY_RULES_XPATH).await?;
        let doc = open_envelope(&body)?;
        let policies = parser::security_policies(&doc)?;
        info!(count = policies.len(), "Parsed security policies");
        Ok(policies)
    }

    async fn config_get(&self, xpath: &str) -> Result<String, PanosApiError> {
        self.request(&[("type", "config"), ("action", "get"), ("xpath", xpath)])
            .await
    }

    /// Sends one GET and returns the body of a 2xx response.
    async fn request(&self, params: &[(&str, &str)]) -> Result<String, PanosApiError> {
        // Logged before the key is appended.
        debug!(url = %self.base_url, ?params, "Sending PAN-OS API request");

        let response = self
            .http_client
            .get(self.base_url.clone())
            .query(params)
            .query(&[("key", self.api_key.as_str())])
            .send()
            .await
            .map_err(|e| self.transport_error(e))?;

        let status = response.status();
        if !status.is_success() {
            error!(status = status.as_u16(), host = %self.host, "PAN-OS API returned an HTTP error");
            return Err(PanosApiError::connection(format!(
                "Firewall returned HTTP status {}",
                status
            ))
            .with_detail("status_code", status.as_u16())
            .with_detail("host", self.host.clone())
            .with_detail("port", self.port));
        }

        let body = response.text().await.map_err(|e| self.transport_error(e))?;
        debug!(bytes = body.len(), "Received PAN-OS API response");
        Ok(body)
    }

    fn transport_error(&self, err: reqwest::Error) -> PanosApiError {
        // The request URL carries the key as a query parameter.
        let err = err.without_url();
        let message = if err.is_timeout() {
            format!(
                "Request to firewall timed out after {} seconds",
                self.timeout.as_secs_f64()
            )
        } else if err.is_connect() {
            format!("Failed to connect to firewall: {}", error_chain(&err))
        } else {
            format!("Request to firewall failed: {}", error_chain(&err))
        };
        error!(host = %self.host, port = self.port, "{}", message);

        PanosApiError::connection(message)
            .with_detail("host", self.host.clone())
            .with_detail("port", self.port)
            .with_detail("timeout_seconds", self.timeout.as_secs_f64())
    }
}

fn error_chain(err: &dyn std::error::Error) -> String {
    let mut text = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        text.push_str(": ");
        text.push_str(&cause.to_string());
        source = cause.source();
    }
    text
}

/// Parses the response body and checks the `status` attribute of the envelope.
pub fn open_envelope(body: &str) -> Result<Document<'_>, PanosApiError> {
    if body.trim().is_empty() {
        return Err(PanosApiError::configuration("Empty response from firewall")
            .with_detail("path", "response"));
    }

    let doc = Document::parse(body)?;
    let root = doc.root_element();
    if !root.has_tag_name("response") {
        return Err(PanosApiError::configuration(format!(
            "Unexpected root element <{}>",
            root.tag_name().name()
        ))
        .with_detail("path", "response"));
    }

    let status = root.attribute("status").unwrap_or_default().to_string();
    match status.as_str() {
        "success" => Ok(doc),
        "error" => Err(envelope_error(&doc)),
        other => Err(PanosApiError::configuration(format!(
            "Unexpected response status '{}'",
            other
        ))
        .with_detail("path", "response/@status")),
    }
}

fn envelope_error(doc: &Document) -> PanosApiError {
    let root = doc.root_element();
    let code = root.attribute("code").unwrap_or_default();
    let message = root
        .descendants()
        .find(|n| n.has_tag_name("msg"))
        .map(|msg| {
            msg.descendants()
                .filter(|n| n.is_text())
                .filter_map(|n| n.text())
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .collect::<Vec<_>>()
                .join(" ")
        })
        .filter(|m| !m.is_empty())
        .unwrap_or_else(|| "Unknown error".to_string());

    let is_auth = AUTH_ERROR_CODES.contains(&code)
        || message.to_lowercase().contains("invalid credential");

    let err = if is_auth {
        warn!(code, "PAN-OS API rejected the API key");
        PanosApiError::authentication(format!("Authentication failed: {}", message))
    } else {
        warn!(code, %message, "PAN-OS API reported an error");
        PanosApiError::operation(format!("API error: {}", message))
    };

    let err = if code.is_empty() {
        err
    } else {
        err.with_detail("code", code)
    };
    err.with_detail("error", message)
}
