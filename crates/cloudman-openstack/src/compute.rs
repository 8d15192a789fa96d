//! Nova (compute) client
//!
//! Servers and flavors. Server listings use the `detail` view so status,
//! tenant and the `OS-EXT-*` extension attributes are present.

use crate::provider::OpenStack;
use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use chrono::{DateTime, Utc};
use cloudman_gateway::{
    AddressKind, ComputeApi, CreateServerRequest, Flavor, FlavorSpec, Vm, VmAddress, VmFault,
    VmStatus,
};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

#[async_trait]
impl ComputeApi for OpenStack {
    async fn list_servers(&self, all_tenants: bool) -> cloudman_gateway::Result<Vec<Vm>> {
        let base = &self.session().endpoints().compute;
        let url = if all_tenants {
            format!("{base}/servers/detail?all_tenants=1")
        } else {
            format!("{base}/servers/detail")
        };

        let response: ServersResponse = self.session().get_json(&url).await?;
        Ok(response.servers.into_iter().map(Vm::from).collect())
    }

    async fn get_server(&self, id: &str) -> cloudman_gateway::Result<Vm> {
        let base = &self.session().endpoints().compute;
        let response: ServerResponse = self
            .session()
            .get_json(&format!("{base}/servers/{id}"))
            .await?;
        Ok(response.server.into())
    }

    async fn create_server(&self, request: &CreateServerRequest) -> cloudman_gateway::Result<Vm> {
        let base = &self.session().endpoints().compute;
        let body = CreateServerBody {
            server: CreateServerWire {
                name: &request.name,
                image_ref: &request.image_id,
                flavor_ref: &request.flavor_id,
                key_name: request.key_name.as_deref(),
                networks: request
                    .networks
                    .iter()
                    .map(|uuid| NetworkRefWire { uuid })
                    .collect(),
                user_data: request.user_data.as_deref().map(|s| BASE64.encode(s)),
            },
        };

        let created: CreatedServerResponse = self
            .session()
            .post_json(&format!("{base}/servers"), &body)
            .await?;

        // The creation response is a stub; fetch the detail view so the
        // caller gets status and addresses.
        self.get_server(&created.server.id).await
    }

    async fn delete_server(&self, id: &str) -> cloudman_gateway::Result<()> {
        let base = &self.session().endpoints().compute;
        self.session()
            .delete(&format!("{base}/servers/{id}"))
            .await?;
        Ok(())
    }

    async fn list_flavors(&self) -> cloudman_gateway::Result<Vec<Flavor>> {
        let base = &self.session().endpoints().compute;
        let response: FlavorsResponse = self
            .session()
            .get_json(&format!("{base}/flavors/detail"))
            .await?;
        Ok(response.flavors.into_iter().map(Flavor::from).collect())
    }

    async fn create_flavor(&self, spec: &FlavorSpec) -> cloudman_gateway::Result<Flavor> {
        let base = &self.session().endpoints().compute;
        let body = serde_json::json!({
            "flavor": {
                "name": spec.flavor_name(),
                "ram": spec.ram_mb(),
                "vcpus": spec.vcpus,
                "disk": spec.disk_gb,
            }
        });

        let response: FlavorResponse = self
            .session()
            .post_json(&format!("{base}/flavors"), &body)
            .await?;
        Ok(response.flavor.into())
    }
}

// ============ Wire types ============

#[derive(Debug, Deserialize)]
struct ServersResponse {
    servers: Vec<ServerWire>,
}

#[derive(Debug, Deserialize)]
struct ServerResponse {
    server: ServerWire,
}

#[derive(Debug, Deserialize)]
struct ServerWire {
    id: String,
    #[serde(default)]
    name: String,
    #[serde(default)]
    status: String,
    #[serde(default)]
    tenant_id: String,
    #[serde(default)]
    addresses: HashMap<String, Vec<AddressWire>>,
    #[serde(default)]
    fault: Option<FaultWire>,
    #[serde(default, rename = "OS-EXT-SRV-ATTR:host")]
    host: Option<String>,
    #[serde(default)]
    created: Option<DateTime<Utc>>,
}

#[derive(Debug, Deserialize)]
struct AddressWire {
    addr: String,
    #[serde(default, rename = "OS-EXT-IPS:type")]
    kind: Option<String>,
}

#[derive(Debug, Deserialize)]
struct FaultWire {
    #[serde(default)]
    code: Option<i64>,
    #[serde(default)]
    message: Option<String>,
    #[serde(default)]
    details: Option<String>,
}

impl From<ServerWire> for Vm {
    fn from(wire: ServerWire) -> Self {
        let addresses = wire
            .addresses
            .into_iter()
            .map(|(network, entries)| {
                let mapped = entries
                    .into_iter()
                    .map(|a| VmAddress {
                        addr: a.addr,
                        kind: a
                            .kind
                            .as_deref()
                            .map(AddressKind::parse)
                            .unwrap_or(AddressKind::Unknown),
                    })
                    .collect();
                (network, mapped)
            })
            .collect();

        Vm {
            id: wire.id,
            name: wire.name,
            status: VmStatus::parse(&wire.status),
            project_id: wire.tenant_id,
            addresses,
            fault: wire.fault.map(|f| VmFault {
                code: f.code,
                message: f.message,
                details: f.details,
            }),
            hypervisor_host: wire.host,
            created: wire.created,
        }
    }
}

#[derive(Debug, Deserialize)]
struct CreatedServerResponse {
    server: CreatedServerWire,
}

#[derive(Debug, Deserialize)]
struct CreatedServerWire {
    id: String,
}

#[derive(Debug, Serialize)]
struct CreateServerBody<'a> {
    server: CreateServerWire<'a>,
}

#[derive(Debug, Serialize)]
struct CreateServerWire<'a> {
    name: &'a str,
    #[serde(rename = "imageRef")]
    image_ref: &'a str,
    #[serde(rename = "flavorRef")]
    flavor_ref: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    key_name: Option<&'a str>,
    networks: Vec<NetworkRefWire<'a>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    user_data: Option<String>,
}

#[derive(Debug, Serialize)]
struct NetworkRefWire<'a> {
    uuid: &'a str,
}

#[derive(Debug, Deserialize)]
struct FlavorsResponse {
    flavors: Vec<FlavorWire>,
}

#[derive(Debug, Deserialize)]
struct FlavorResponse {
    flavor: FlavorWire,
}

#[derive(Debug, Deserialize)]
struct FlavorWire {
    id: String,
    name: String,
    vcpus: u32,
    ram: u32,
    disk: u32,
}

impl From<FlavorWire> for Flavor {
    fn from(wire: FlavorWire) -> Self {
        Flavor {
            id: wire.id,
            name: wire.name,
            vcpus: wire.vcpus,
            ram_mb: wire.ram,
            disk_gb: wire.disk,
        }
    }
}
