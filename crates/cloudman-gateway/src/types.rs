//! Entities owned by the cloud control plane
//!
//! The gateway never persists any of these between calls; every value is a
//! transient snapshot of what the control plane returned.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// A Keystone project (tenant)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Project {
    pub id: String,
    pub name: String,
}

/// Provisioning status of a server as reported by the compute service
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum VmStatus {
    Build,
    Active,
    Error,
    Deleted,
    #[serde(other)]
    Unknown,
}

impl VmStatus {
    /// Map a raw status string from the compute API.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "BUILD" => VmStatus::Build,
            "ACTIVE" => VmStatus::Active,
            "ERROR" => VmStatus::Error,
            "DELETED" => VmStatus::Deleted,
            _ => VmStatus::Unknown,
        }
    }
}

impl std::fmt::Display for VmStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            VmStatus::Build => write!(f, "BUILD"),
            VmStatus::Active => write!(f, "ACTIVE"),
            VmStatus::Error => write!(f, "ERROR"),
            VmStatus::Deleted => write!(f, "DELETED"),
            VmStatus::Unknown => write!(f, "UNKNOWN"),
        }
    }
}

/// Address role on a server interface
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressKind {
    Fixed,
    Floating,
    #[serde(other)]
    Unknown,
}

impl AddressKind {
    pub fn parse(raw: &str) -> Self {
        match raw {
            "fixed" => AddressKind::Fixed,
            "floating" => AddressKind::Floating,
            _ => AddressKind::Unknown,
        }
    }
}

/// One address entry under a server's network attachments
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmAddress {
    pub addr: String,
    pub kind: AddressKind,
}

/// Fault detail attached to a server in ERROR state
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VmFault {
    pub code: Option<i64>,
    pub message: Option<String>,
    pub details: Option<String>,
}

impl std::fmt::Display for VmFault {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if let Some(code) = self.code {
            write!(f, "code {code}: ")?;
        }
        match &self.message {
            Some(message) => write!(f, "{message}")?,
            None => write!(f, "no fault detail reported")?,
        }
        if let Some(details) = &self.details {
            write!(f, " ({details})")?;
        }
        Ok(())
    }
}

/// A virtual machine as reported by the compute service
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vm {
    pub id: String,
    pub name: String,
    pub status: VmStatus,
    /// Owning project (tenant) id
    pub project_id: String,
    /// Addresses keyed by network name
    pub addresses: HashMap<String, Vec<VmAddress>>,
    pub fault: Option<VmFault>,
    /// Hypervisor host, only visible with elevated privilege
    pub hypervisor_host: Option<String>,
    pub created: Option<DateTime<Utc>>,
}

impl Vm {
    /// Iterate over the floating addresses attached to this server.
    pub fn floating_addresses(&self) -> impl Iterator<Item = &str> {
        self.addresses
            .values()
            .flatten()
            .filter(|a| a.kind == AddressKind::Floating)
            .map(|a| a.addr.as_str())
    }

    pub fn has_floating_address(&self, address: &str) -> bool {
        self.floating_addresses().any(|a| a == address)
    }
}

/// A floating IP; `port_id == None` means unattached
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FloatingIp {
    pub id: String,
    pub address: String,
    pub port_id: Option<String>,
}

impl FloatingIp {
    pub fn is_attached(&self) -> bool {
        self.port_id.is_some()
    }
}

/// A network port on a server
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Port {
    pub id: String,
    pub network_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Network {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Image {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SecurityGroup {
    pub id: String,
    pub name: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Flavor {
    pub id: String,
    pub name: String,
    pub vcpus: u32,
    pub ram_mb: u32,
    pub disk_gb: u32,
}

/// Request handed to the compute service to boot a server
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CreateServerRequest {
    pub name: String,
    pub image_id: String,
    pub flavor_id: String,
    pub key_name: Option<String>,
    /// Network ids for the server's NICs
    pub networks: Vec<String>,
    /// Cloud-init user data, passed verbatim (encoding is the binding's job)
    pub user_data: Option<String>,
}

/// Sizing for a new flavor; the flavor name is derived from it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FlavorSpec {
    pub vcpus: u32,
    pub ram_gb: u32,
    pub disk_gb: u32,
}

impl FlavorSpec {
    /// Flavor naming convention: `{vcpus}cpu{ram}gb.{disk}g`
    pub fn flavor_name(&self) -> String {
        format!("{}cpu{}gb.{}g", self.vcpus, self.ram_gb, self.disk_gb)
    }

    pub fn ram_mb(&self) -> u32 {
        self.ram_gb * 1024
    }
}

/// Reference to a project by exactly one of name or id
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ProjectRef<'a> {
    Name(&'a str),
    Id(&'a str),
}
