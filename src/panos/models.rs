//! Validated records produced from PAN-OS XML API responses.

use std::fmt;
use std::str::FromStr;

/// Location identifier used for objects defined in the global `shared` scope.
pub const SHARED_LOCATION: &str = "shared";

/// Location identifier used for zones and rules that are not tied to a named vsys.
pub const DEFAULT_VSYS: &str = "vsys1";

/// Identity and status snapshot of the firewall.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SystemInfo {
    pub hostname: String,
    pub ip_address: String,
    pub netmask: String,
    pub default_gateway: String,
    pub mac_address: String,
    pub time: String,
    pub uptime: String,
    pub version: String,
    /// Absent when the GlobalProtect client package is not installed.
    pub gp_version: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddressType {
    IpNetmask,
    IpRange,
    Fqdn,
}

impl AddressType {
    pub const ALL: [AddressType; 3] = [AddressType::IpNetmask, AddressType::IpRange, AddressType::Fqdn];

    pub fn as_str(&self) -> &'static str {
        match self {
            AddressType::IpNetmask => "ip-netmask",
            AddressType::IpRange => "ip-range",
            AddressType::Fqdn => "fqdn",
        }
    }
}

impl fmt::Display for AddressType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AddressType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AddressType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// A named network-address definition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AddressObject {
    pub name: String,
    pub address_type: AddressType,
    pub value: String,
    pub description: Option<String>,
    pub location: String,
    pub tags: Vec<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ZoneType {
    Layer3,
    Layer2,
    VirtualWire,
    Tap,
}

impl ZoneType {
    pub const ALL: [ZoneType; 4] = [
        ZoneType::Layer3,
        ZoneType::Layer2,
        ZoneType::VirtualWire,
        ZoneType::Tap,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            ZoneType::Layer3 => "layer3",
            ZoneType::Layer2 => "layer2",
            ZoneType::VirtualWire => "virtual-wire",
            ZoneType::Tap => "tap",
        }
    }
}

impl fmt::Display for ZoneType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ZoneType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ZoneType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| s.to_string())
    }
}

/// A named traffic-segmentation boundary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityZone {
    pub name: String,
    pub zone_type: ZoneType,
    pub location: String,
    pub interfaces: Vec<String>,
    pub user_identification: bool,
    pub device_identification: bool,
    pub packet_buffer_protection: bool,
}

/// What a security rule does with matching traffic.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PolicyAction {
    Allow,
    Deny,
    Drop,
    Reset,
}

impl PolicyAction {
    pub const ALL: [PolicyAction; 4] = [
        PolicyAction::Allow,
        PolicyAction::Deny,
        PolicyAction::Drop,
        PolicyAction::Reset,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            PolicyAction::Allow => "allow",
            PolicyAction::Deny => "deny",
            PolicyAction::Drop => "drop",
            PolicyAction::Reset => "reset",
        }
    }
}

impl fmt::Display for PolicyAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PolicyAction {
    type Err = String;

    /// The appliance spells resets by direction (`reset-client`, `reset-server`,
    /// `reset-both`); all of them map to [`PolicyAction::Reset`].
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "reset-client" | "reset-server" | "reset-both" => Ok(PolicyAction::Reset),
            _ => PolicyAction::ALL
                .into_iter()
                .find(|a| a.as_str() == s)
                .ok_or_else(|| s.to_string()),
        }
    }
}

/// A security rule from a vsys rulebase, in rulebase order.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SecurityPolicy {
    pub name: String,
    pub source_zones: Vec<String>,
    pub source_addresses: Vec<String>,
    pub destination_zones: Vec<String>,
    pub destination_addresses: Vec<String>,
    pub applications: Vec<String>,
    pub services: Vec<String>,
    pub action: PolicyAction,
    pub description: Option<String>,
    pub enabled: bool,
    pub location: String,
}
