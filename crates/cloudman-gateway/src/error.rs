//! Gateway error types

use crate::types::VmFault;
use thiserror::Error;

/// Errors surfaced by the gateway and its control-plane bindings
#[derive(Error, Debug)]
pub enum CloudError {
    #[error("environment variable {0} is not set")]
    MissingEnvVar(String),

    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("project not found: {0}")]
    ProjectNotFound(String),

    #[error("VM not found: {0}")]
    VmNotFound(String),

    #[error("multiple VMs named {0} found")]
    AmbiguousHostname(String),

    #[error("image not found: {0}")]
    ImageNotFound(String),

    #[error("floating IP not found: {0}")]
    FloatingIpNotFound(String),

    #[error("no floating IP bound to VM {0}")]
    NoBoundFloatingIp(String),

    #[error("no unattached floating IP available in project {0}")]
    NoFloatingIpAvailable(String),

    #[error("VM {0} has no network port")]
    NoPort(String),

    #[error("VM entered ERROR state during provisioning: {0}")]
    VmFault(VmFault),

    #[error("server {hostname} did not become ACTIVE after {attempts} poll attempts")]
    ProvisionTimeout { hostname: String, attempts: u32 },

    #[error("authentication failed: {0}")]
    AuthenticationFailed(String),

    #[error("API error: {0}")]
    Api(String),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, CloudError>;
