//! Maps PAN-OS XML API `<result>` subtrees onto the validated records in
//! [`models`](super::models).
//!
//! Parsing is lenient about elements it does not know and strict about the
//! ones it does: a missing required element or an unrecognised enumerated
//! value is a [`PanosApiError::ConfigurationError`].

use roxmltree::{Document, Node};
use tracing::debug;

use super::error::PanosApiError;
use super::models::{
    AddressObject, AddressType, PolicyAction, SecurityPolicy, SecurityZone, SystemInfo, ZoneType,
    DEFAULT_VSYS, SHARED_LOCATION,
};

/// Address types the appliance knows about but this client does not model.
const UNSUPPORTED_ADDRESS_TYPES: &[&str] = &["ip-wildcard"];

/// Zone types the appliance knows about but this client does not model.
const UNSUPPORTED_ZONE_TYPES: &[&str] = &["tunnel", "external"];

/// Location label for objects scoped to a Panorama device group.
pub fn device_group_location(name: &str) -> String {
    format!("device-group:{}", name)
}

pub fn system_info(doc: &Document) -> Result<SystemInfo, PanosApiError> {
    let result = result_node(doc)?;
    // Some releases wrap the fields in <system>, others put them directly under <result>.
    let (system, path) = match child(result, "system") {
        Some(system) => (system, "response/result/system"),
        None => (result, "response/result"),
    };

    let required = |tag: &str| -> Result<String, PanosApiError> {
        child(system, tag)
            .map(|node| node.text().unwrap_or_default().to_string())
            .ok_or_else(|| missing_field(tag, path, "system info"))
    };

    let gp_version = child(system, "global-protect-client-package-version")
        .and_then(optional_text)
        .filter(|version| version != "0.0.0");

    Ok(SystemInfo {
        hostname: required("hostname")?,
        ip_address: required("ip-address")?,
        netmask: required("netmask")?,
        default_gateway: required("default-gateway")?,
        mac_address: required("mac-address")?,
        time: required("time")?,
        uptime: required("uptime")?,
        version: required("sw-version")?,
        gp_version,
    })
}

pub fn address_objects(doc: &Document) -> Result<Vec<AddressObject>, PanosApiError> {
    let result = result_node(doc)?;
    let mut objects = Vec::new();

    for (section, location) in sections(result, "address", SHARED_LOCATION, device_group_location) {
        debug!(%location, "Parsing address section");
        for entry in section.children().filter(|n| n.has_tag_name("entry")) {
            objects.push(address_object(entry, &location)?);
        }
    }

    Ok(objects)
}

pub fn security_zones(doc: &Document) -> Result<Vec<SecurityZone>, PanosApiError> {
    let result = result_node(doc)?;
    let mut zones = Vec::new();

    for (section, location) in sections(result, "zone", DEFAULT_VSYS, str::to_string) {
        debug!(%location, "Parsing zone section");
        for entry in section.children().filter(|n| n.has_tag_name("entry")) {
            zones.push(security_zone(entry, &location)?);
        }
    }

    Ok(zones)
}

pub fn security_policies(doc: &Document) -> Result<Vec<SecurityPolicy>, PanosApiError> {
    let result = result_node(doc)?;
    let mut policies = Vec::new();

    for (section, location) in sections(result, "rules", DEFAULT_VSYS, str::to_string) {
        debug!(%location, "Parsing security rule section");
        for entry in section.children().filter(|n| n.has_tag_name("entry")) {
            policies.push(security_policy(entry, &location)?);
        }
    }

    Ok(policies)
}

fn address_object(entry: Node, location: &str) -> Result<AddressObject, PanosApiError> {
    let name = entry_name(entry, "address")?;
    let path = format!("address/entry[@name='{}']", name);

    let type_node = entry
        .children()
        .filter(Node::is_element)
        .find(|n| {
            let tag = n.tag_name().name();
            tag.parse::<AddressType>().is_ok() || UNSUPPORTED_ADDRESS_TYPES.contains(&tag)
        })
        .ok_or_else(|| missing_field("ip-netmask|ip-range|fqdn", &path, "address object"))?;

    let address_type = type_node
        .tag_name()
        .name()
        .parse::<AddressType>()
        .map_err(|value| unrecognized_value("address type", &value, &path))?;

    let value = optional_text(type_node)
        .ok_or_else(|| missing_field(address_type.as_str(), &path, "address object"))?;

    Ok(AddressObject {
        name,
        address_type,
        value,
        description: child(entry, "description").and_then(optional_text),
        location: location.to_string(),
        tags: child(entry, "tag").map(members).unwrap_or_default(),
    })
}

fn security_zone(entry: Node, location: &str) -> Result<SecurityZone, PanosApiError> {
    let name = entry_name(entry, "zone")?;
    let path = format!("zone/entry[@name='{}']", name);

    let network = child(entry, "network")
        .ok_or_else(|| missing_field("network", &path, "security zone"))?;
    let network_path = format!("{}/network", path);

    let type_node = network
        .children()
        .filter(Node::is_element)
        .find(|n| {
            let tag = n.tag_name().name();
            tag.parse::<ZoneType>().is_ok() || UNSUPPORTED_ZONE_TYPES.contains(&tag)
        })
        .ok_or_else(|| {
            missing_field("layer3|layer2|virtual-wire|tap", &network_path, "security zone")
        })?;

    let zone_type = type_node
        .tag_name()
        .name()
        .parse::<ZoneType>()
        .map_err(|value| unrecognized_value("zone type", &value, &network_path))?;

    Ok(SecurityZone {
        name,
        zone_type,
        location: location.to_string(),
        interfaces: members(type_node),
        user_identification: yes_no(entry, "enable-user-identification", &path)?,
        device_identification: yes_no(entry, "enable-device-identification", &path)?,
        packet_buffer_protection: yes_no(
            network,
            "enable-packet-buffer-protection",
            &network_path,
        )?,
    })
}

fn security_policy(entry: Node, location: &str) -> Result<SecurityPolicy, PanosApiError> {
    let name = entry_name(entry, "rules")?;
    let path = format!("rules/entry[@name='{}']", name);
    let list = |tag: &str| child(entry, tag).map(members).unwrap_or_default();

    let action = child(entry, "action")
        .and_then(optional_text)
        .ok_or_else(|| missing_field("action", &path, "security policy"))?
        .parse::<PolicyAction>()
        .map_err(|value| unrecognized_value("action", &value, &path))?;

    Ok(SecurityPolicy {
        name,
        source_zones: list("from"),
        source_addresses: list("source"),
        destination_zones: list("to"),
        destination_addresses: list("destination"),
        applications: list("application"),
        services: list("service"),
        action,
        description: child(entry, "description").and_then(optional_text),
        enabled: !yes_no(entry, "disabled", &path)?,
        location: location.to_string(),
    })
}

fn result_node<'a, 'input>(doc: &'a Document<'input>) -> Result<Node<'a, 'input>, PanosApiError> {
    doc.root_element()
        .descendants()
        .find(|n| n.has_tag_name("result"))
        .ok_or_else(|| {
            PanosApiError::configuration("Response envelope has no <result> element")
                .with_detail("path", "response/result")
        })
}

/// Collects every `container` element below `root` together with the
/// location it belongs to. Containers are not searched for nested containers.
///
/// A container with no named `<entry>` ancestor belongs to `global`. One
/// inside a vsys entry takes the vsys name, one inside a device-group entry
/// takes [`device_group_location`]; an entry that sits directly under
/// `<result>` is labelled with `bare_entry`.
fn sections<'a, 'input>(
    root: Node<'a, 'input>,
    container: &str,
    global: &str,
    bare_entry: fn(&str) -> String,
) -> Vec<(Node<'a, 'input>, String)> {
    let mut found = Vec::new();
    let mut stack: Vec<Node> = root.children().filter(Node::is_element).collect();
    stack.reverse();

    while let Some(node) = stack.pop() {
        if node.has_tag_name(container) {
            found.push((node, section_location(node, global, bare_entry)));
            continue;
        }
        let before = stack.len();
        stack.extend(node.children().filter(Node::is_element));
        stack[before..].reverse();
    }

    found
}

fn section_location(section: Node, global: &str, bare_entry: fn(&str) -> String) -> String {
    for ancestor in section.ancestors().skip(1) {
        if ancestor.has_tag_name("result") {
            break;
        }
        let Some(name) = ancestor
            .has_tag_name("entry")
            .then(|| ancestor.attribute("name"))
            .flatten()
        else {
            continue;
        };
        match ancestor.parent_element().map(|p| p.tag_name().name()) {
            Some("vsys") => return name.to_string(),
            Some("device-group") => return device_group_location(name),
            Some("result") => return bare_entry(name),
            _ => {}
        }
    }
    global.to_string()
}

fn child<'a, 'input>(node: Node<'a, 'input>, tag: &str) -> Option<Node<'a, 'input>> {
    node.children().find(|n| n.has_tag_name(tag))
}

fn optional_text(node: Node) -> Option<String> {
    node.text()
        .map(str::trim)
        .filter(|text| !text.is_empty())
        .map(str::to_string)
}

fn members(node: Node) -> Vec<String> {
    node.children()
        .filter(|n| n.has_tag_name("member"))
        .filter_map(optional_text)
        .collect()
}

fn entry_name(entry: Node, kind: &str) -> Result<String, PanosApiError> {
    entry
        .attribute("name")
        .map(str::to_string)
        .ok_or_else(|| {
            PanosApiError::configuration(format!("Found {} entry without a name attribute", kind))
                .with_detail("field", "name")
                .with_detail("path", format!("{}/entry/@name", kind))
        })
}

fn yes_no(parent: Node, tag: &str, path: &str) -> Result<bool, PanosApiError> {
    let Some(node) = child(parent, tag) else {
        return Ok(false);
    };
    match node.text().unwrap_or_default().trim() {
        "yes" => Ok(true),
        "no" | "" => Ok(false),
        other => Err(unrecognized_value(tag, other, path)),
    }
}

fn missing_field(field: &str, path: &str, record: &str) -> PanosApiError {
    PanosApiError::configuration(format!(
        "Missing required field '{}' in {} response",
        field, record
    ))
    .with_detail("field", field)
    .with_detail("path", format!("{}/{}", path, field))
}

fn unrecognized_value(field: &str, value: &str, path: &str) -> PanosApiError {
    PanosApiError::configuration(format!("Unrecognized {} '{}'", field, value))
        .with_detail("field", field)
        .with_detail("value", value)
        .with_detail("path", path)
}
