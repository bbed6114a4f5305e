//! Markdown rendering of PAN-OS records and errors.
//!
//! Every function here is pure: the same records always produce the same text.
//! Optional strings that are absent render as `None`, empty lists as `[]`.

use std::fmt::Write;

use super::ServerDetails;
use crate::panos::{AddressObject, PanosApiError, SecurityPolicy, SecurityZone, SystemInfo};

const ABSENT: &str = "None";
const EMPTY_LIST: &str = "[]";

pub fn system_info(info: &SystemInfo) -> String {
    let mut out = String::from("# Palo Alto Networks Firewall System Information\n\n");
    let fields: [(&str, &str); 9] = [
        ("Hostname", info.hostname.as_str()),
        ("IP Address", info.ip_address.as_str()),
        ("Netmask", info.netmask.as_str()),
        ("Default Gateway", info.default_gateway.as_str()),
        ("MAC Address", info.mac_address.as_str()),
        ("Time", info.time.as_str()),
        ("Uptime", info.uptime.as_str()),
        ("PAN-OS Version", info.version.as_str()),
        ("GlobalProtect Version", optional(&info.gp_version)),
    ];
    for (label, value) in fields {
        let _ = writeln!(out, "**{}**: {}", label, value);
    }
    out
}

pub fn address_objects(objects: &[AddressObject]) -> String {
    if objects.is_empty() {
        return "No address objects found on the firewall.".to_string();
    }

    let mut out = String::from("# Palo Alto Networks Firewall Address Objects\n\n");
    for (location, group) in group_by_location(objects, |o| o.location.as_str()) {
        let _ = writeln!(out, "## {} Address Objects\n", capitalize(location));
        for obj in group {
            let _ = writeln!(out, "### {}", obj.name);
            let _ = writeln!(out, "- **Type**: {}", obj.address_type);
            let _ = writeln!(out, "- **Value**: {}", obj.value);
            let _ = writeln!(out, "- **Description**: {}", optional(&obj.description));
            let _ = writeln!(out, "- **Location**: {}", obj.location);
            let _ = writeln!(out, "- **Tags**: {}", list(&obj.tags));
            out.push('\n');
        }
    }
    out
}

pub fn security_zones(zones: &[SecurityZone]) -> String {
    if zones.is_empty() {
        return "No security zones found on the firewall.".to_string();
    }

    let mut out = String::from("# Palo Alto Networks Firewall Security Zones\n\n");
    for (location, group) in group_by_location(zones, |z| z.location.as_str()) {
        let _ = writeln!(out, "## {} Security Zones\n", capitalize(location));
        for zone in group {
            let _ = writeln!(out, "### {}", zone.name);
            let _ = writeln!(out, "- **Type**: {}", zone.zone_type);
            let _ = writeln!(out, "- **Location**: {}", zone.location);
            let _ = writeln!(out, "- **Interfaces**: {}", list(&zone.interfaces));
            let _ = writeln!(out, "- **User Identification**: {}", enabled(zone.user_identification));
            let _ = writeln!(out, "- **Device Identification**: {}", enabled(zone.device_identification));
            let _ = writeln!(
                out,
                "- **Packet Buffer Protection**: {}",
                enabled(zone.packet_buffer_protection)
            );
            out.push('\n');
        }
    }
    out
}

pub fn security_policies(policies: &[SecurityPolicy]) -> String {
    if policies.is_empty() {
        return "No security policies found on the firewall.".to_string();
    }

    let mut out = String::from("# Palo Alto Networks Firewall Security Policies\n\n");
    for (location, group) in group_by_location(policies, |p| p.location.as_str()) {
        let _ = writeln!(out, "## {} Security Policies\n", capitalize(location));
        for policy in group {
            let _ = writeln!(out, "### {}", policy.name);
            let _ = writeln!(out, "- **Action**: {}", policy.action);
            let _ = writeln!(out, "- **Status**: {}", enabled(policy.enabled));
            let _ = writeln!(out, "- **Source Zones**: {}", list(&policy.source_zones));
            let _ = writeln!(out, "- **Source Addresses**: {}", list(&policy.source_addresses));
            let _ = writeln!(out, "- **Destination Zones**: {}", list(&policy.destination_zones));
            let _ = writeln!(
                out,
                "- **Destination Addresses**: {}",
                list(&policy.destination_addresses)
            );
            let _ = writeln!(out, "- **Applications**: {}", list(&policy.applications));
            let _ = writeln!(out, "- **Services**: {}", list(&policy.services));
            let _ = writeln!(out, "- **Description**: {}", optional(&policy.description));
            let _ = writeln!(out, "- **Location**: {}", policy.location);
            out.push('\n');
        }
    }
    out
}

/// Renders an error as the block returned to MCP clients in place of a report.
pub fn error_report(err: &PanosApiError) -> String {
    let mut out = format!("Error ({}): {}\n", err.kind(), err.message());
    if !err.details().is_empty() {
        out.push_str("\nDetails:\n");
        for (key, value) in err.details().iter() {
            let _ = writeln!(out, "- {}: {}", key, value);
        }
    }
    out
}

/// Renders the health check: server settings followed by either the firewall
/// identity or the failure that prevented reading it.
pub fn health_report(server: &ServerDetails, status: &Result<SystemInfo, PanosApiError>) -> String {
    let mut out = String::from("# PAN-OS MCP Server Health Check\n\n");
    let _ = writeln!(out, "- **MCP Server Version**: {}", server.version);
    let _ = writeln!(out, "- **Target Firewall**: {}", server.target);
    let _ = writeln!(out, "- **Debug Mode**: {}", enabled(server.debug));

    match status {
        Ok(info) => {
            out.push_str("\n## Firewall Information\n");
            let _ = writeln!(out, "- **Hostname**: {}", info.hostname);
            let _ = writeln!(out, "- **PAN-OS Version**: {}", info.version);
            let _ = writeln!(out, "- **Uptime**: {}", info.uptime);
            let _ = writeln!(out, "- **Connection Status**: Connected");
            let _ = writeln!(out, "- **GlobalProtect Version**: {}", optional(&info.gp_version));
        }
        Err(err) => {
            out.push_str("\n## Connection Status\n");
            let _ = writeln!(out, "- **Status**: Failed");
            let _ = writeln!(out, "- **Error Type**: {}", err.kind());
            let _ = writeln!(out, "- **Error**: {}", err.message());
        }
    }
    out
}

/// Groups records by location, keeping locations in first-seen order and
/// records in source order within each location.
fn group_by_location<'a, T>(
    records: &'a [T],
    location: impl Fn(&'a T) -> &'a str,
) -> Vec<(&'a str, Vec<&'a T>)> {
    let mut groups: Vec<(&str, Vec<&T>)> = Vec::new();
    for record in records {
        let loc = location(record);
        match groups.iter_mut().find(|(l, _)| *l == loc) {
            Some((_, members)) => members.push(record),
            None => groups.push((loc, vec![record])),
        }
    }
    groups
}

fn capitalize(s: &str) -> String {
    let mut chars = s.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

fn optional(value: &Option<String>) -> &str {
    value.as_deref().unwrap_or(ABSENT)
}

fn list(values: &[String]) -> String {
    if values.is_empty() {
        EMPTY_LIST.to_string()
    } else {
        values.join(", ")
    }
}

fn enabled(flag: bool) -> &'static str {
    if flag {
        "Enabled"
    } else {
        "Disabled"
    }
}
