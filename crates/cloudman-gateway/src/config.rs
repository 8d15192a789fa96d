//! Credentials and gateway configuration
//!
//! Credentials are read once from the `OS_*` environment variables and then
//! carried as a plain value; nothing writes back to the process environment.
//! Rescoping to another project produces a new value via [`CloudCredentials::with_project`].

use crate::error::{CloudError, Result};
use std::path::PathBuf;
use std::time::Duration;

pub const OS_USERNAME: &str = "OS_USERNAME";
pub const OS_PASSWORD: &str = "OS_PASSWORD";
pub const OS_AUTH_URL: &str = "OS_AUTH_URL";
pub const OS_PROJECT_NAME: &str = "OS_PROJECT_NAME";
pub const OS_PROJECT_DOMAIN_NAME: &str = "OS_PROJECT_DOMAIN_NAME";
pub const OS_USER_DOMAIN_NAME: &str = "OS_USER_DOMAIN_NAME";
pub const OS_CACERT: &str = "OS_CACERT";

/// Credentials for one project-scoped session
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloudCredentials {
    pub auth_url: String,
    pub username: String,
    pub password: String,
    pub project_name: String,
    pub project_domain_name: String,
    pub user_domain_name: String,
    /// CA bundle for the identity endpoint; `None` uses system trust
    pub cacert: Option<PathBuf>,
}

impl CloudCredentials {
    /// Read credentials from the `OS_*` environment variables.
    ///
    /// Fails on the first missing required variable, naming it. No network
    /// traffic is involved.
    pub fn from_env() -> Result<Self> {
        let username = require(OS_USERNAME)?;
        let password = require(OS_PASSWORD)?;
        let auth_url = require(OS_AUTH_URL)?;
        let project_name = require(OS_PROJECT_NAME)?;
        let project_domain_name = require(OS_PROJECT_DOMAIN_NAME)?;
        let user_domain_name = require(OS_USER_DOMAIN_NAME)?;
        let cacert = std::env::var_os(OS_CACERT).map(PathBuf::from);

        Ok(Self {
            auth_url,
            username,
            password,
            project_name,
            project_domain_name,
            user_domain_name,
            cacert,
        })
    }

    /// Same credentials scoped to a different project.
    pub fn with_project(&self, project_name: impl Into<String>) -> Self {
        Self {
            project_name: project_name.into(),
            ..self.clone()
        }
    }
}

fn require(name: &str) -> Result<String> {
    std::env::var(name).map_err(|_| CloudError::MissingEnvVar(name.to_string()))
}

/// Fixed-interval poll with a bounded attempt budget
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PollPolicy {
    pub interval: Duration,
    pub max_attempts: u32,
}

impl Default for PollPolicy {
    fn default() -> Self {
        // 1s x 600 covers the provisioning times seen in practice (tens of
        // seconds to minutes) while still terminating.
        Self {
            interval: Duration::from_secs(1),
            max_attempts: 600,
        }
    }
}

/// External network used when a project holds no floating IPs at all.
pub const DEFAULT_EXTERNAL_NETWORK_ID: &str = "bb005c60-fb45-481a-97fb-f746033e1c5d";

/// Fallback when no network matches a faculty name.
pub const DEFAULT_FALLBACK_NETWORK_ID: &str = "41117794-0b4c-4dd3-8f2b-7d9bb458e968";

const DEFAULT_KEY_NAME: &str = "newmaster";

/// Per-gateway settings that are not credentials
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GatewayOptions {
    /// Boot script read once at construction and reused as cloud-init user
    /// data for every VM created through this gateway
    pub boot_script: Option<PathBuf>,

    /// SSH key name injected into every created server
    pub key_name: String,

    /// Network floating IPs are allocated against
    pub external_network_id: String,

    /// Returned by the faculty lookup when no network name matches
    pub fallback_network_id: String,

    pub poll: PollPolicy,
}

impl Default for GatewayOptions {
    fn default() -> Self {
        Self {
            boot_script: None,
            key_name: DEFAULT_KEY_NAME.to_string(),
            external_network_id: DEFAULT_EXTERNAL_NETWORK_ID.to_string(),
            fallback_network_id: DEFAULT_FALLBACK_NETWORK_ID.to_string(),
            poll: PollPolicy::default(),
        }
    }
}

impl GatewayOptions {
    pub fn with_boot_script(mut self, path: impl Into<PathBuf>) -> Self {
        self.boot_script = Some(path.into());
        self
    }

    pub fn with_key_name(mut self, name: impl Into<String>) -> Self {
        self.key_name = name.into();
        self
    }

    pub fn with_external_network(mut self, id: impl Into<String>) -> Self {
        self.external_network_id = id.into();
        self
    }

    pub fn with_fallback_network(mut self, id: impl Into<String>) -> Self {
        self.fallback_network_id = id.into();
        self
    }

    pub fn with_poll(mut self, poll: PollPolicy) -> Self {
        self.poll = poll;
        self
    }
}
