//! CloudMan provisioning gateway
//!
//! A thin orchestration façade over an OpenStack-style control plane: VM
//! lifecycle (create / list / delete / wait-for-active), floating-IP
//! allocation and attachment, image and flavor lookup, and project (tenant)
//! switching.
//!
//! # Architecture
//!
//! ```text
//! ┌────────────────────────────────────────────┐
//! │                caller (CLI, automation)     │
//! └──────────────────┬─────────────────────────┘
//!                    │
//! ┌──────────────────▼─────────────────────────┐
//! │             cloudman-gateway                │
//! │  CloudGateway<P: ControlPlane>              │
//! │  ┌──────────┬──────────┬───────┬─────────┐ │
//! │  │ Compute  │ Network  │ Image │ Identity│ │
//! │  │   Api    │   Api    │  Api  │   Api   │ │
//! │  └──────────┴──────────┴───────┴─────────┘ │
//! └──────────────────┬─────────────────────────┘
//!                    │
//! ┌──────────────────▼─────────────────────────┐
//! │            cloudman-openstack               │
//! │   Keystone session + Nova/Neutron/Glance    │
//! └────────────────────────────────────────────┘
//! ```
//!
//! The gateway holds one project-scoped session. `change_project` returns a
//! freshly scoped handle instead of mutating shared state, so a handle is
//! safe to share once constructed.

pub mod api;
pub mod config;
pub mod error;
pub mod gateway;
pub mod types;

// Re-exports
pub use api::{ComputeApi, ControlPlane, IdentityApi, ImageApi, NetworkApi};
pub use config::{
    CloudCredentials, GatewayOptions, PollPolicy, DEFAULT_EXTERNAL_NETWORK_ID,
    DEFAULT_FALLBACK_NETWORK_ID,
};
pub use error::{CloudError, Result};
pub use gateway::CloudGateway;
pub use types::{
    AddressKind, CreateServerRequest, Flavor, FlavorSpec, FloatingIp, Image, Network, Port,
    Project, ProjectRef, SecurityGroup, Vm, VmAddress, VmFault, VmStatus,
};
