//! OpenStack binding for the CloudMan gateway
//!
//! Implements the gateway's four service traits against the Keystone, Nova,
//! Neutron and Glance REST APIs. Authentication is Keystone v3 password auth
//! scoped to a project; endpoints come from the service catalog.
//!
//! ```rust,no_run
//! use cloudman_gateway::GatewayOptions;
//!
//! # async fn run() -> cloudman_gateway::Result<()> {
//! let gateway = cloudman_openstack::connect_from_env(GatewayOptions::default()).await?;
//! let _science = gateway.change_project(cloudman_gateway::ProjectRef::Name("Science")).await?;
//! # Ok(()) }
//! ```

mod compute;
mod identity;
mod image;
mod network;
mod session;

pub mod error;
pub mod provider;

pub use error::{OpenStackError, Result};
pub use provider::OpenStack;

use cloudman_gateway::{CloudCredentials, CloudGateway, GatewayOptions};

/// Build a gateway from the `OS_*` environment variables.
///
/// Credentials are validated before any network traffic; the first missing
/// variable fails construction with its name.
pub async fn connect_from_env(
    options: GatewayOptions,
) -> cloudman_gateway::Result<CloudGateway<OpenStack>> {
    let credentials = CloudCredentials::from_env()?;
    let plane = OpenStack::connect(&credentials).await?;
    CloudGateway::new(plane, credentials, options).await
}
