//! The OpenStack control plane
//!
//! One [`OpenStack`] value is one authenticated, project-scoped session over
//! the four service APIs. Rescoping authenticates a fresh session and leaves
//! the receiver untouched.

use crate::error::Result;
use crate::session::Session;
use async_trait::async_trait;
use cloudman_gateway::{CloudCredentials, ControlPlane};

pub struct OpenStack {
    session: Session,
}

impl OpenStack {
    /// Authenticate against Keystone and discover the service endpoints.
    pub async fn connect(credentials: &CloudCredentials) -> Result<Self> {
        let session = Session::authenticate(credentials).await?;
        tracing::info!(
            project = %credentials.project_name,
            auth_url = %credentials.auth_url,
            "authenticated against OpenStack"
        );
        Ok(Self { session })
    }

    pub(crate) fn session(&self) -> &Session {
        &self.session
    }
}

#[async_trait]
impl ControlPlane for OpenStack {
    async fn rescope(&self, credentials: &CloudCredentials) -> cloudman_gateway::Result<Self> {
        Ok(OpenStack::connect(credentials).await?)
    }
}
