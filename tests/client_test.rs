//! Integration tests for the PAN-OS XML API client and tool registry
//!
//! These tests drive `PanosApiClient` and `PanosTools` against a mock firewall
//! and cover success paths, transport failures, envelope errors and parse failures.

use std::net::TcpListener;
use std::sync::Arc;
use std::time::Duration;

use mcp_server_panos::panos::client::{ADDRESS_XPATH, SECURITY_RULES_XPATH, ZONE_XPATH};
use mcp_server_panos::panos::{AddressType, DetailValue, ErrorKind, PolicyAction, ZoneType};
use mcp_server_panos::tools::{format, ServerDetails};
use mcp_server_panos::{Operation, PanosApiClient, PanosConfig, PanosTools};

use mock_panos_server::{
    MockPanosServer, ADDRESS_XML, API_KEY, INVALID_KEY_XML, POLICY_XML, SYSTEM_INFO_XML,
    ZONE_XML,
};

fn find_available_port() -> u16 {
    let listener = TcpListener::bind("127.0.0.1:0").expect("Failed to bind to random port");
    let port = listener
        .local_addr()
        .expect("Failed to get local address")
        .port();
    drop(listener);
    port
}

fn tools_for(client: PanosApiClient) -> PanosTools {
    PanosTools::new(
        Arc::new(client),
        ServerDetails {
            version: "0.1.0",
            target: "fw01.example.com".to_string(),
            debug: false,
        },
    )
}

fn detail(err: &mcp_server_panos::PanosApiError, key: &str) -> Option<String> {
    err.details().get(key).map(DetailValue::to_string)
}

#[tokio::test]
async fn test_system_info_report_end_to_end() {
    let server = MockPanosServer::start().await;
    let mock = server.system_info(200, SYSTEM_INFO_XML).await;
    let tools = tools_for(server.client());

    let report = tools.invoke(Operation::ShowSystemInfo).await.unwrap();

    mock.assert_async().await;
    let expected = "# Palo Alto Networks Firewall System Information\n\n\
        **Hostname**: fw01.example.com\n\
        **IP Address**: 192.0.2.10\n\
        **Netmask**: 255.255.255.0\n\
        **Default Gateway**: 192.0.2.1\n\
        **MAC Address**: 00:1b:17:00:01:02\n\
        **Time**: Mon Apr 14 10:21:33 2025\n\
        **Uptime**: 12 days, 3:04:05\n\
        **PAN-OS Version**: 10.2.3\n\
        **GlobalProtect Version**: None\n";
    assert_eq!(report, expected);
}

#[tokio::test]
async fn test_address_objects_from_every_location() {
    let server = MockPanosServer::start().await;
    let mock = server.config_get(ADDRESS_XPATH, 200, ADDRESS_XML).await;
    let client = server.client();

    let objects = client.get_address_objects().await.unwrap();

    mock.assert_async().await;
    assert_eq!(objects.len(), 4);
    assert_eq!(objects[0].name, "web-server");
    assert_eq!(objects[0].location, "shared");
    assert_eq!(objects[0].tags, vec!["web", "dmz"]);
    assert_eq!(objects[1].address_type, AddressType::Fqdn);
    assert!(objects[1].tags.is_empty());
    assert_eq!(objects[2].name, "app-server");
    assert_eq!(objects[2].location, "vsys1");
    assert_eq!(objects[2].value, "172.16.5.20/32");
    assert_eq!(objects[3].location, "device-group:branch-offices");
    assert_eq!(objects[3].address_type, AddressType::IpRange);

    let report = format::address_objects(&objects);
    assert!(report.contains("## Shared Address Objects"));
    assert!(report.contains("## Vsys1 Address Objects\n\n### app-server\n"));
    assert!(report.contains("## Device-group:branch-offices Address Objects"));
    assert_eq!(report, format::address_objects(&objects));
}

#[tokio::test]
async fn test_security_zones() {
    let server = MockPanosServer::start().await;
    let mock = server.config_get(ZONE_XPATH, 200, ZONE_XML).await;
    let client = server.client();

    let zones = client.get_security_zones().await.unwrap();

    mock.assert_async().await;
    assert_eq!(zones.len(), 2);
    assert_eq!(zones[0].name, "trust");
    assert_eq!(zones[0].zone_type, ZoneType::Layer3);
    assert_eq!(zones[0].location, "vsys1");
    assert!(zones[0].user_identification);
    assert!(!zones[0].packet_buffer_protection);
    assert!(!zones[1].user_identification);
    assert!(zones[1].packet_buffer_protection);
}

#[tokio::test]
async fn test_vsys_only_address_objects() {
    let server = MockPanosServer::start().await;
    server
        .config_get(
            ADDRESS_XPATH,
            200,
            r#"<response status="success" code="19"><result total-count="1" count="1">
                <vsys><entry name="vsys1"><address>
                    <entry name="app-server"><ip-netmask>172.16.5.20/32</ip-netmask></entry>
                </address></entry></vsys>
            </result></response>"#,
        )
        .await;
    let tools = tools_for(server.client());

    let report = tools.invoke(Operation::RetrieveAddressObjects).await.unwrap();

    assert_ne!(report, "No address objects found on the firewall.");
    assert!(report.contains("### app-server\n"));
    assert!(report.contains("- **Location**: vsys1\n"));
}

#[tokio::test]
async fn test_security_policies_end_to_end() {
    let server = MockPanosServer::start().await;
    let mock = server.config_get(SECURITY_RULES_XPATH, 200, POLICY_XML).await;
    let client = server.client();

    let policies = client.get_security_policies().await.unwrap();

    mock.assert_async().await;
    assert_eq!(policies.len(), 2);
    assert_eq!(policies[0].name, "allow-outbound-web");
    assert_eq!(policies[0].action, PolicyAction::Allow);
    assert_eq!(policies[0].applications, vec!["web-browsing", "ssl"]);
    assert!(policies[0].enabled);
    assert_eq!(policies[0].location, "vsys1");
    assert_eq!(policies[1].action, PolicyAction::Deny);
    assert!(!policies[1].enabled);

    let tools = tools_for(server.client());
    let report = tools.invoke(Operation::RetrieveSecurityPolicies).await.unwrap();
    assert!(report.starts_with(
        "# Palo Alto Networks Firewall Security Policies\n\n## Vsys1 Security Policies\n"
    ));
    assert!(report.contains("### deny-all\n- **Action**: deny\n- **Status**: Disabled\n"));
}

#[tokio::test]
async fn test_empty_policy_rulebase() {
    let server = MockPanosServer::start().await;
    server
        .config_get(
            SECURITY_RULES_XPATH,
            200,
            r#"<response status="success" code="7"><result/></response>"#,
        )
        .await;
    let tools = tools_for(server.client());

    let report = tools.invoke(Operation::RetrieveSecurityPolicies).await.unwrap();
    assert_eq!(report, "No security policies found on the firewall.");
}

#[tokio::test]
async fn test_unknown_policy_action_is_tool_error() {
    let server = MockPanosServer::start().await;
    let body = POLICY_XML.replace("<action>deny</action>", "<action>redirect</action>");
    server.config_get(SECURITY_RULES_XPATH, 200, &body).await;
    let tools = tools_for(server.client());

    let result = tools.call(Operation::RetrieveSecurityPolicies).await.unwrap();
    assert_eq!(result.is_error, Some(true));

    let err = tools
        .invoke(Operation::RetrieveSecurityPolicies)
        .await
        .unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(detail(&err, "value").as_deref(), Some("redirect"));
}

#[tokio::test]
async fn test_system_info_values_are_not_normalised() {
    let server = MockPanosServer::start().await;
    let body = SYSTEM_INFO_XML.replace(
        "<time>Mon Apr 14 10:21:33 2025</time>",
        "<time>  Mon Apr 14 10:21:33 2025 </time>",
    );
    server.system_info(200, &body).await;
    let client = server.client();

    let info = client.get_system_info().await.unwrap();
    assert_eq!(info.time, "  Mon Apr 14 10:21:33 2025 ");
}

#[tokio::test]
async fn test_empty_zone_list() {
    let server = MockPanosServer::start().await;
    server
        .config_get(ZONE_XPATH, 200, r#"<response status="success" code="7"><result/></response>"#)
        .await;
    let tools = tools_for(server.client());

    let report = tools.invoke(Operation::RetrieveSecurityZones).await.unwrap();
    assert_eq!(report, "No security zones found on the firewall.");
}

#[tokio::test]
async fn test_http_error_status_is_connection_error() {
    let server = MockPanosServer::start().await;
    server.system_info(500, "Internal Server Error").await;
    let client = server.client();

    let err = client.get_system_info().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(detail(&err, "status_code").as_deref(), Some("500"));
    assert_eq!(detail(&err, "host").as_deref(), Some("127.0.0.1"));
    assert!(detail(&err, "port").is_some());
}

#[tokio::test]
async fn test_connection_refused_is_connection_error() {
    let port = find_available_port();
    let mut config = PanosConfig::new(format!("127.0.0.1:{}", port), API_KEY);
    config.timeout = Duration::from_secs(3);
    let client =
        PanosApiClient::with_base_url(&config, &format!("http://127.0.0.1:{}/api/", port)).unwrap();
    let tools = tools_for(client);

    let err = tools.invoke(Operation::ShowSystemInfo).await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert_eq!(detail(&err, "host").as_deref(), Some("127.0.0.1"));
    assert_eq!(detail(&err, "port"), Some(port.to_string()));
    assert_eq!(detail(&err, "timeout_seconds").as_deref(), Some("3"));
    assert!(!err.message().contains(API_KEY));

    let report = format::error_report(&err);
    assert!(report.starts_with("Error (ConnectionError): "));
    assert!(report.contains("\nDetails:\n- host: 127.0.0.1\n"));
    assert!(!report.contains("PAN-OS Version"));
}

#[tokio::test]
async fn test_timeout_is_connection_error() {
    let server = MockPanosServer::start().await;
    server.slow_system_info(Duration::from_secs(3)).await;
    let client = server.client_with_timeout(Duration::from_secs(1));

    let err = client.get_system_info().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Connection);
    assert!(err.message().contains("timed out"));
    assert_eq!(detail(&err, "timeout_seconds").as_deref(), Some("1"));
}

#[tokio::test]
async fn test_invalid_key_is_authentication_error() {
    let server = MockPanosServer::start().await;
    server.system_info(200, INVALID_KEY_XML).await;
    let client = server.client();

    let err = client.get_system_info().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Authentication);
    assert_eq!(detail(&err, "code").as_deref(), Some("403"));
    assert_eq!(detail(&err, "error").as_deref(), Some("Invalid credentials."));
}

#[tokio::test]
async fn test_command_failure_is_operation_error() {
    let server = MockPanosServer::start().await;
    server
        .config_get(
            ADDRESS_XPATH,
            200,
            r#"<response status="error" code="6"><msg><line>Bad Xpath</line></msg></response>"#,
        )
        .await;
    let client = server.client();

    let err = client.get_address_objects().await.unwrap_err();

    assert_eq!(err.kind(), ErrorKind::Operation);
    assert_eq!(detail(&err, "error").as_deref(), Some("Bad Xpath"));
}

#[tokio::test]
async fn test_malformed_xml_is_configuration_error() {
    let server = MockPanosServer::start().await;
    server
        .system_info(200, r#"<response status="success"><result><system>"#)
        .await;
    let client = server.client();

    let err = client.get_system_info().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
}

#[tokio::test]
async fn test_missing_required_field_is_configuration_error() {
    let server = MockPanosServer::start().await;
    let body = SYSTEM_INFO_XML.replace("<sw-version>10.2.3</sw-version>", "");
    server.system_info(200, &body).await;
    let client = server.client();

    let err = client.get_system_info().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert_eq!(detail(&err, "field").as_deref(), Some("sw-version"));
}

#[tokio::test]
async fn test_unknown_address_type_is_configuration_error() {
    let server = MockPanosServer::start().await;
    server
        .config_get(
            ADDRESS_XPATH,
            200,
            r#"<response status="success"><result><address>
                <entry name="wild"><ip-wildcard>10.0.0.0/0.0.255.0</ip-wildcard></entry>
            </address></result></response>"#,
        )
        .await;
    let tools = tools_for(server.client());

    let err = tools.invoke(Operation::RetrieveAddressObjects).await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Configuration);
    assert!(format::error_report(&err).starts_with("Error (ConfigurationError): "));
}

#[tokio::test]
async fn test_concurrent_operations_share_one_client() {
    let server = MockPanosServer::start().await;
    let info_mock = server.system_info(200, SYSTEM_INFO_XML).await;
    let address_mock = server.config_get(ADDRESS_XPATH, 200, ADDRESS_XML).await;
    let zone_mock = server.config_get(ZONE_XPATH, 200, ZONE_XML).await;
    let tools = tools_for(server.client());

    let (info, addresses, zones, again) = tokio::join!(
        tools.invoke(Operation::ShowSystemInfo),
        tools.invoke(Operation::RetrieveAddressObjects),
        tools.invoke(Operation::RetrieveSecurityZones),
        tools.invoke(Operation::ShowSystemInfo),
    );

    assert!(info.unwrap().contains("fw01.example.com"));
    let addresses = addresses.unwrap();
    assert!(addresses.contains("### branch-pool"));
    assert!(addresses.contains("### app-server"));
    assert!(zones.unwrap().contains("### untrust"));
    assert!(again.is_ok());

    info_mock.assert_hits_async(2).await;
    address_mock.assert_async().await;
    zone_mock.assert_async().await;
}

#[tokio::test]
async fn test_health_check_connected() {
    let server = MockPanosServer::start().await;
    server.system_info(200, SYSTEM_INFO_XML).await;
    let tools = tools_for(server.client());

    let report = tools.invoke(Operation::CheckHealth).await.unwrap();

    assert!(report.contains("- **Target Firewall**: fw01.example.com"));
    assert!(report.contains("- **PAN-OS Version**: 10.2.3"));
    assert!(report.contains("- **Connection Status**: Connected"));
}

#[tokio::test]
async fn test_call_marks_failures_as_tool_errors() {
    let server = MockPanosServer::start().await;
    server.system_info(200, INVALID_KEY_XML).await;
    let tools = tools_for(server.client());

    let failed = tools.call(Operation::ShowSystemInfo).await.unwrap();
    assert_eq!(failed.is_error, Some(true));

    let health = tools.call(Operation::CheckHealth).await.unwrap();
    assert_eq!(health.is_error, Some(false));
}
