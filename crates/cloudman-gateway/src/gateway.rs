//! The provisioning gateway
//!
//! [`CloudGateway`] is a façade over one project-scoped control-plane
//! session. Switching projects never mutates an existing gateway; it yields
//! a new handle, so concurrent callers holding distinct handles cannot
//! observe each other's project context.

use crate::api::ControlPlane;
use crate::config::{CloudCredentials, GatewayOptions};
use crate::error::{CloudError, Result};
use crate::types::{
    CreateServerRequest, Flavor, FlavorSpec, FloatingIp, Image, Network, Port, Project,
    ProjectRef, SecurityGroup, Vm, VmStatus,
};

#[derive(Debug)]
pub struct CloudGateway<P> {
    plane: P,
    credentials: CloudCredentials,
    options: GatewayOptions,
    /// Boot script loaded once at construction, reused for every VM
    user_data: Option<String>,
    /// One-time snapshot taken at construction; never refreshed, so projects
    /// created after startup are not visible to `change_project`
    projects: Vec<Project>,
}

impl<P: ControlPlane> CloudGateway<P> {
    /// Build a gateway over an already-authenticated control plane.
    ///
    /// Reads the boot script (if configured) and snapshots the project list.
    pub async fn new(
        plane: P,
        credentials: CloudCredentials,
        options: GatewayOptions,
    ) -> Result<Self> {
        let user_data = match &options.boot_script {
            Some(path) => {
                let script = tokio::fs::read_to_string(path).await.map_err(|e| {
                    CloudError::Config(format!("cannot read boot script {}: {e}", path.display()))
                })?;
                Some(script)
            }
            None => None,
        };

        let projects = plane.list_projects().await?;
        tracing::debug!(projects = projects.len(), "cached project snapshot");

        Ok(Self {
            plane,
            credentials,
            options,
            user_data,
            projects,
        })
    }

    /// The project this gateway's session is scoped to.
    pub fn project_name(&self) -> &str {
        &self.credentials.project_name
    }

    /// The project snapshot taken at construction.
    pub fn projects(&self) -> &[Project] {
        &self.projects
    }

    fn resolve_project(&self, project: ProjectRef<'_>) -> Result<&Project> {
        match project {
            ProjectRef::Name(name) => self
                .projects
                .iter()
                .find(|p| p.name == name)
                .ok_or_else(|| CloudError::ProjectNotFound(name.to_string())),
            ProjectRef::Id(id) => self
                .projects
                .iter()
                .find(|p| p.id == id)
                .ok_or_else(|| CloudError::ProjectNotFound(id.to_string())),
        }
    }

    /// Return a new gateway scoped to another project.
    ///
    /// The target is validated against the startup snapshot; an unknown name
    /// or id fails without touching any session state, so failed attempts
    /// are idempotent. On success the underlying control plane is rescoped
    /// and the receiver remains bound to its original project.
    pub async fn change_project(&self, project: ProjectRef<'_>) -> Result<Self> {
        let target = self.resolve_project(project)?;
        let credentials = self.credentials.with_project(&target.name);
        let plane = self.plane.rescope(&credentials).await?;
        tracing::info!(project = %target.name, "switched project scope");

        Ok(Self {
            plane,
            credentials,
            options: self.options.clone(),
            user_data: self.user_data.clone(),
            projects: self.projects.clone(),
        })
    }

    /// Create a VM in `project` and wait until it is ACTIVE.
    ///
    /// Blocks (asynchronously) for the full provisioning duration, polling
    /// at the configured interval up to the configured attempt budget.
    /// Dropping the future abandons the wait but not the remote creation.
    pub async fn create_vm(
        &self,
        project: &str,
        hostname: &str,
        flavor_id: &str,
        image_id: &str,
        networks: &[String],
    ) -> Result<Vm> {
        let scoped = self.change_project(ProjectRef::Name(project)).await?;

        let request = CreateServerRequest {
            name: hostname.to_string(),
            image_id: image_id.to_string(),
            flavor_id: flavor_id.to_string(),
            key_name: Some(scoped.options.key_name.clone()),
            networks: networks.to_vec(),
            user_data: scoped.user_data.clone(),
        };

        let vm = scoped.plane.create_server(&request).await?;
        tracing::info!(vm = %hostname, id = %vm.id, project = %project, "server creation submitted");

        scoped.wait_for_active(&vm.id, hostname).await
    }

    async fn wait_for_active(&self, id: &str, hostname: &str) -> Result<Vm> {
        let policy = self.options.poll;

        for attempt in 1..=policy.max_attempts {
            let vm = self.plane.get_server(id).await?;
            match vm.status {
                VmStatus::Active => {
                    tracing::info!(vm = %hostname, "server is ACTIVE");
                    return Ok(vm);
                }
                VmStatus::Error => {
                    let fault = vm.fault.unwrap_or_default();
                    tracing::warn!(vm = %hostname, %fault, "server entered ERROR state");
                    return Err(CloudError::VmFault(fault));
                }
                status => {
                    tracing::debug!(vm = %hostname, %status, attempt, "waiting for server");
                    tokio::time::sleep(policy.interval).await;
                }
            }
        }

        Err(CloudError::ProvisionTimeout {
            hostname: hostname.to_string(),
            attempts: policy.max_attempts,
        })
    }

    /// Resolve a hostname to the single VM carrying it, across all tenants.
    ///
    /// Zero matches and more than one match both fail; duplicate hostnames
    /// are a hard error with no tie-break.
    pub async fn get_vm(&self, hostname: &str) -> Result<Vm> {
        let servers = self.plane.list_servers(true).await?;
        let mut matches: Vec<Vm> = servers.into_iter().filter(|s| s.name == hostname).collect();

        match matches.len() {
            0 => Err(CloudError::VmNotFound(hostname.to_string())),
            1 => Ok(matches.remove(0)),
            _ => Err(CloudError::AmbiguousHostname(hostname.to_string())),
        }
    }

    /// Delete the VM with the given unique hostname. Deletion completion is
    /// not polled.
    pub async fn delete_vm(&self, hostname: &str) -> Result<()> {
        let vm = self.get_vm(hostname).await?;
        self.plane.delete_server(&vm.id).await?;
        tracing::info!(vm = %hostname, id = %vm.id, "server deletion submitted");
        Ok(())
    }

    /// Bind an unattached floating IP to the VM's first port, allocating one
    /// if the VM's project holds no floating IPs at all.
    ///
    /// The allocate-if-zero check fires only when the project has zero
    /// allocated IPs; if every allocated IP is already attached this fails
    /// rather than allocating another.
    pub async fn attach_floating_ip(&self, vm: &Vm) -> Result<String> {
        let scoped = self.change_project(ProjectRef::Id(&vm.project_id)).await?;

        let mut fips = scoped.plane.list_floating_ips().await?;
        if fips.is_empty() {
            let fip = scoped
                .plane
                .allocate_floating_ip(&scoped.options.external_network_id)
                .await?;
            tracing::info!(address = %fip.address, project = %scoped.project_name(), "allocated floating IP");
            fips.push(fip);
        }

        let free = fips
            .into_iter()
            .find(|f| !f.is_attached())
            .ok_or_else(|| CloudError::NoFloatingIpAvailable(scoped.project_name().to_string()))?;

        let port = scoped.first_port(vm).await?;
        let bound = scoped.plane.bind_floating_ip(&free.id, &port.id).await?;
        tracing::info!(vm = %vm.name, address = %bound.address, "bound floating IP");

        Ok(bound.address)
    }

    /// Unbind the floating IP attached to the VM's first port, keeping the
    /// IP resource allocated so it can be reattached later.
    pub async fn unbind_floating_ip(&self, vm: &Vm) -> Result<FloatingIp> {
        let scoped = self.change_project(ProjectRef::Id(&vm.project_id)).await?;
        let port = scoped.first_port(vm).await?;

        let bound = scoped
            .plane
            .list_floating_ips()
            .await?
            .into_iter()
            .find(|f| f.port_id.as_deref() == Some(port.id.as_str()))
            .ok_or_else(|| CloudError::NoBoundFloatingIp(vm.name.clone()))?;

        let freed = scoped.plane.unbind_floating_ip(&bound.id).await?;
        tracing::info!(vm = %vm.name, address = %freed.address, "unbound floating IP");
        Ok(freed)
    }

    /// Destroy a floating IP by address, unbinding it first if necessary.
    pub async fn release_floating_ip(&self, address: &str) -> Result<()> {
        let fip = self
            .plane
            .list_floating_ips()
            .await?
            .into_iter()
            .find(|f| f.address == address)
            .ok_or_else(|| CloudError::FloatingIpNotFound(address.to_string()))?;

        if fip.is_attached() {
            self.plane.unbind_floating_ip(&fip.id).await?;
        }
        self.plane.release_floating_ip(&fip.id).await?;
        tracing::info!(%address, "released floating IP");
        Ok(())
    }

    /// Unbind and destroy the VM's floating IP in one call.
    ///
    /// This reproduces the legacy destructive detach; callers that want to
    /// reattach the same address should use [`Self::unbind_floating_ip`]
    /// instead.
    pub async fn detach_floating_ip(&self, vm: &Vm) -> Result<()> {
        let scoped = self.change_project(ProjectRef::Id(&vm.project_id)).await?;
        let port = scoped.first_port(vm).await?;

        let bound = scoped
            .plane
            .list_floating_ips()
            .await?
            .into_iter()
            .find(|f| f.port_id.as_deref() == Some(port.id.as_str()))
            .ok_or_else(|| CloudError::NoBoundFloatingIp(vm.name.clone()))?;

        scoped.plane.unbind_floating_ip(&bound.id).await?;
        scoped.plane.release_floating_ip(&bound.id).await?;
        tracing::info!(vm = %vm.name, address = %bound.address, "detached and released floating IP");
        Ok(())
    }

    async fn first_port(&self, vm: &Vm) -> Result<Port> {
        self.plane
            .list_ports(&vm.id)
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| CloudError::NoPort(vm.name.clone()))
    }

    /// Servers in the gateway's current project.
    pub async fn list_vms(&self) -> Result<Vec<Vm>> {
        self.plane.list_servers(false).await
    }

    pub async fn list_images(&self) -> Result<Vec<Image>> {
        self.plane.list_images().await
    }

    pub async fn get_image_by_name(&self, name: &str) -> Result<Image> {
        self.plane
            .list_images()
            .await?
            .into_iter()
            .find(|i| i.name == name)
            .ok_or_else(|| CloudError::ImageNotFound(name.to_string()))
    }

    pub async fn list_flavors(&self) -> Result<Vec<Flavor>> {
        self.plane.list_flavors().await
    }

    pub async fn create_flavor(&self, spec: FlavorSpec) -> Result<Flavor> {
        let flavor = self.plane.create_flavor(&spec).await?;
        tracing::info!(flavor = %flavor.name, "created flavor");
        Ok(flavor)
    }

    pub async fn list_networks(&self) -> Result<Vec<Network>> {
        self.plane.list_networks().await
    }

    pub async fn list_security_groups(&self) -> Result<Vec<SecurityGroup>> {
        self.plane.list_security_groups().await
    }

    /// Network id for a faculty, by case-insensitive name match; falls back
    /// to the configured default id when nothing matches.
    pub async fn network_id_for_faculty(&self, faculty: &str) -> Result<String> {
        for network in self.plane.list_networks().await? {
            if network.name.eq_ignore_ascii_case(faculty) {
                return Ok(network.id);
            }
        }
        Ok(self.options.fallback_network_id.clone())
    }

    /// Find the server holding a floating address, across all tenants.
    pub async fn get_vm_by_floating_ip(&self, address: &str) -> Result<Option<Vm>> {
        let servers = self.plane.list_servers(true).await?;
        Ok(servers.into_iter().find(|s| s.has_floating_address(address)))
    }

    /// Hypervisor host of a server; `None` when the session lacks the
    /// privilege to see it.
    pub async fn get_vm_hypervisor_name(&self, vm_id: &str) -> Result<Option<String>> {
        Ok(self.plane.get_server(vm_id).await?.hypervisor_host)
    }
}
