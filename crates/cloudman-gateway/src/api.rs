//! Control-plane service traits
//!
//! One trait per upstream service surface (compute, network, image,
//! identity), mirroring the four independent clients the gateway is built
//! on. A concrete binding implements all four plus [`ControlPlane::rescope`],
//! which rebuilds the session against a different project scope.

use crate::config::CloudCredentials;
use crate::error::Result;
use crate::types::{
    CreateServerRequest, Flavor, FlavorSpec, FloatingIp, Image, Network, Port, Project,
    SecurityGroup, Vm,
};
use async_trait::async_trait;

/// Compute service: server and flavor lifecycle
#[async_trait]
pub trait ComputeApi: Send + Sync {
    /// List servers; `all_tenants` requires elevated privilege.
    async fn list_servers(&self, all_tenants: bool) -> Result<Vec<Vm>>;

    async fn get_server(&self, id: &str) -> Result<Vm>;

    async fn create_server(&self, request: &CreateServerRequest) -> Result<Vm>;

    /// Fire-and-forget deletion; completion is not polled.
    async fn delete_server(&self, id: &str) -> Result<()>;

    async fn list_flavors(&self) -> Result<Vec<Flavor>>;

    async fn create_flavor(&self, spec: &FlavorSpec) -> Result<Flavor>;
}

/// Network service: networks, ports, floating IPs, security groups
#[async_trait]
pub trait NetworkApi: Send + Sync {
    async fn list_networks(&self) -> Result<Vec<Network>>;

    /// Ports attached to the given server (device) id.
    async fn list_ports(&self, device_id: &str) -> Result<Vec<Port>>;

    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>>;

    /// Allocate a new, unattached floating IP on an external network.
    async fn allocate_floating_ip(&self, external_network_id: &str) -> Result<FloatingIp>;

    async fn bind_floating_ip(&self, id: &str, port_id: &str) -> Result<FloatingIp>;

    /// Unbind without destroying the resource.
    async fn unbind_floating_ip(&self, id: &str) -> Result<FloatingIp>;

    /// Destroy the floating IP resource, returning it to the pool.
    async fn release_floating_ip(&self, id: &str) -> Result<()>;

    async fn list_security_groups(&self) -> Result<Vec<SecurityGroup>>;
}

/// Image service: catalog lookups
#[async_trait]
pub trait ImageApi: Send + Sync {
    async fn list_images(&self) -> Result<Vec<Image>>;
}

/// Identity service: project listing (requires elevated privilege)
#[async_trait]
pub trait IdentityApi: Send + Sync {
    async fn list_projects(&self) -> Result<Vec<Project>>;
}

/// The full control plane a gateway operates against
#[async_trait]
pub trait ControlPlane: ComputeApi + NetworkApi + ImageApi + IdentityApi {
    /// Build a sibling handle authenticated against the project scope in
    /// `credentials`. The receiver is left untouched.
    async fn rescope(&self, credentials: &CloudCredentials) -> Result<Self>
    where
        Self: Sized;
}
