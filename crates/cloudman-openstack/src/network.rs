//! Neutron (network) client
//!
//! Networks, server ports, floating IPs and security groups, all under the
//! `/v2.0` API root.

use crate::error::Result;
use crate::provider::OpenStack;
use async_trait::async_trait;
use cloudman_gateway::{FloatingIp, Network, NetworkApi, Port, SecurityGroup};
use serde::Deserialize;
use serde_json::json;

#[async_trait]
impl NetworkApi for OpenStack {
    async fn list_networks(&self) -> cloudman_gateway::Result<Vec<Network>> {
        let base = &self.session().endpoints().network;
        let response: NetworksResponse = self
            .session()
            .get_json(&format!("{base}/v2.0/networks"))
            .await?;
        Ok(response.networks)
    }

    async fn list_ports(&self, device_id: &str) -> cloudman_gateway::Result<Vec<Port>> {
        let base = &self.session().endpoints().network;
        let response: PortsResponse = self
            .session()
            .get_json(&format!("{base}/v2.0/ports?device_id={device_id}"))
            .await?;
        Ok(response.ports.into_iter().map(Port::from).collect())
    }

    async fn list_floating_ips(&self) -> cloudman_gateway::Result<Vec<FloatingIp>> {
        let base = &self.session().endpoints().network;
        let response: FloatingIpsResponse = self
            .session()
            .get_json(&format!("{base}/v2.0/floatingips"))
            .await?;
        Ok(response
            .floatingips
            .into_iter()
            .map(FloatingIp::from)
            .collect())
    }

    async fn allocate_floating_ip(
        &self,
        external_network_id: &str,
    ) -> cloudman_gateway::Result<FloatingIp> {
        let base = &self.session().endpoints().network;
        let body = json!({
            "floatingip": { "floating_network_id": external_network_id }
        });

        let response: FloatingIpResponse = self
            .session()
            .post_json(&format!("{base}/v2.0/floatingips"), &body)
            .await?;
        Ok(response.floatingip.into())
    }

    async fn bind_floating_ip(
        &self,
        id: &str,
        port_id: &str,
    ) -> cloudman_gateway::Result<FloatingIp> {
        Ok(self.update_floating_ip_port(id, Some(port_id)).await?)
    }

    async fn unbind_floating_ip(&self, id: &str) -> cloudman_gateway::Result<FloatingIp> {
        Ok(self.update_floating_ip_port(id, None).await?)
    }

    async fn release_floating_ip(&self, id: &str) -> cloudman_gateway::Result<()> {
        let base = &self.session().endpoints().network;
        self.session()
            .delete(&format!("{base}/v2.0/floatingips/{id}"))
            .await?;
        Ok(())
    }

    async fn list_security_groups(&self) -> cloudman_gateway::Result<Vec<SecurityGroup>> {
        let base = &self.session().endpoints().network;
        let response: SecurityGroupsResponse = self
            .session()
            .get_json(&format!("{base}/v2.0/security-groups"))
            .await?;
        Ok(response.security_groups)
    }
}

impl OpenStack {
    /// `PUT` with an explicit `port_id: null` is how Neutron unbinds.
    async fn update_floating_ip_port(&self, id: &str, port_id: Option<&str>) -> Result<FloatingIp> {
        let base = &self.session().endpoints().network;
        let body = json!({ "floatingip": { "port_id": port_id } });

        let response: FloatingIpResponse = self
            .session()
            .put_json(&format!("{base}/v2.0/floatingips/{id}"), &body)
            .await?;
        Ok(response.floatingip.into())
    }
}

// ============ Wire types ============

#[derive(Debug, Deserialize)]
struct NetworksResponse {
    networks: Vec<Network>,
}

#[derive(Debug, Deserialize)]
struct PortsResponse {
    ports: Vec<PortWire>,
}

#[derive(Debug, Deserialize)]
struct PortWire {
    id: String,
    #[serde(default)]
    network_id: Option<String>,
}

impl From<PortWire> for Port {
    fn from(wire: PortWire) -> Self {
        Port {
            id: wire.id,
            network_id: wire.network_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct FloatingIpsResponse {
    floatingips: Vec<FloatingIpWire>,
}

#[derive(Debug, Deserialize)]
struct FloatingIpResponse {
    floatingip: FloatingIpWire,
}

#[derive(Debug, Deserialize)]
struct FloatingIpWire {
    id: String,
    floating_ip_address: String,
    #[serde(default)]
    port_id: Option<String>,
}

impl From<FloatingIpWire> for FloatingIp {
    fn from(wire: FloatingIpWire) -> Self {
        FloatingIp {
            id: wire.id,
            address: wire.floating_ip_address,
            port_id: wire.port_id,
        }
    }
}

#[derive(Debug, Deserialize)]
struct SecurityGroupsResponse {
    security_groups: Vec<SecurityGroup>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_floating_ip_null_port_means_unattached() {
        let raw = r#"{"floatingips": [
            {"id": "fip-1", "floating_ip_address": "192.0.2.5", "port_id": null},
            {"id": "fip-2", "floating_ip_address": "192.0.2.6", "port_id": "port-9"}
        ]}"#;

        let response: FloatingIpsResponse = serde_json::from_str(raw).unwrap();
        let fips: Vec<FloatingIp> = response.floatingips.into_iter().map(Into::into).collect();

        assert!(!fips[0].is_attached());
        assert!(fips[1].is_attached());
        assert_eq!(fips[1].port_id.as_deref(), Some("port-9"));
    }

    #[test]
    fn test_unbind_body_serializes_null_port() {
        let body = json!({ "floatingip": { "port_id": Option::<&str>::None } });
        assert_eq!(body.to_string(), r#"{"floatingip":{"port_id":null}}"#);
    }

    #[test]
    fn test_network_listing() {
        let raw = r#"{"networks": [
            {"id": "science-net", "name": "Science", "status": "ACTIVE"}
        ]}"#;
        let response: NetworksResponse = serde_json::from_str(raw).unwrap();
        assert_eq!(response.networks[0].id, "science-net");
        assert_eq!(response.networks[0].name, "Science");
    }
}
