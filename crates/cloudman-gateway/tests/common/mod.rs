//! In-memory control plane used by the gateway tests.

#![allow(dead_code)]

use async_trait::async_trait;
use cloudman_gateway::{
    CloudCredentials, CloudError, ComputeApi, ControlPlane, CreateServerRequest, Flavor,
    FlavorSpec, FloatingIp, IdentityApi, Image, ImageApi, Network, NetworkApi, Port, Project,
    Result, SecurityGroup, Vm, VmFault, VmStatus,
};
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};

pub fn test_credentials() -> CloudCredentials {
    CloudCredentials {
        auth_url: "https://cloud.example.org:5000/v3".to_string(),
        username: "admin".to_string(),
        password: "secret".to_string(),
        project_name: "Admin".to_string(),
        project_domain_name: "Default".to_string(),
        user_domain_name: "Default".to_string(),
        cacert: None,
    }
}

pub fn test_vm(id: &str, name: &str, project_id: &str) -> Vm {
    Vm {
        id: id.to_string(),
        name: name.to_string(),
        status: VmStatus::Active,
        project_id: project_id.to_string(),
        addresses: HashMap::new(),
        fault: None,
        hypervisor_host: None,
        created: None,
    }
}

#[derive(Debug, Default)]
struct Inner {
    servers: Mutex<Vec<Vm>>,
    /// When non-empty, each `get_server` call pops the front status
    status_script: Mutex<VecDeque<VmStatus>>,
    fault: Mutex<Option<VmFault>>,
    floating_ips: Mutex<Vec<FloatingIp>>,
    ports: Mutex<HashMap<String, Vec<Port>>>,
    networks: Mutex<Vec<Network>>,
    images: Mutex<Vec<Image>>,
    flavors: Mutex<Vec<Flavor>>,
    security_groups: Mutex<Vec<SecurityGroup>>,
    projects: Mutex<Vec<Project>>,
    created_requests: Mutex<Vec<CreateServerRequest>>,
    rescope_log: Mutex<Vec<String>>,
    fip_counter: AtomicUsize,
}

/// Shared-state mock; rescoped clones observe the same cloud.
#[derive(Clone, Debug)]
pub struct MockPlane {
    inner: Arc<Inner>,
    project: String,
}

impl Default for MockPlane {
    fn default() -> Self {
        Self {
            inner: Arc::default(),
            project: "Admin".to_string(),
        }
    }
}

impl MockPlane {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_projects(self, projects: &[(&str, &str)]) -> Self {
        *self.inner.projects.lock().unwrap() = projects
            .iter()
            .map(|(id, name)| Project {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn with_networks(self, networks: &[(&str, &str)]) -> Self {
        *self.inner.networks.lock().unwrap() = networks
            .iter()
            .map(|(id, name)| Network {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn with_images(self, images: &[(&str, &str)]) -> Self {
        *self.inner.images.lock().unwrap() = images
            .iter()
            .map(|(id, name)| Image {
                id: id.to_string(),
                name: name.to_string(),
            })
            .collect();
        self
    }

    pub fn add_server(&self, vm: Vm) {
        self.inner.servers.lock().unwrap().push(vm);
    }

    pub fn add_port(&self, device_id: &str, port_id: &str) {
        self.inner
            .ports
            .lock()
            .unwrap()
            .entry(device_id.to_string())
            .or_default()
            .push(Port {
                id: port_id.to_string(),
                network_id: None,
            });
    }

    pub fn add_floating_ip(&self, id: &str, address: &str, port_id: Option<&str>) {
        self.inner.floating_ips.lock().unwrap().push(FloatingIp {
            id: id.to_string(),
            address: address.to_string(),
            port_id: port_id.map(str::to_string),
        });
    }

    pub fn script_statuses(&self, statuses: &[VmStatus]) {
        *self.inner.status_script.lock().unwrap() = statuses.iter().copied().collect();
    }

    pub fn set_fault(&self, fault: VmFault) {
        *self.inner.fault.lock().unwrap() = Some(fault);
    }

    pub fn floating_ips(&self) -> Vec<FloatingIp> {
        self.inner.floating_ips.lock().unwrap().clone()
    }

    pub fn servers(&self) -> Vec<Vm> {
        self.inner.servers.lock().unwrap().clone()
    }

    pub fn created_requests(&self) -> Vec<CreateServerRequest> {
        self.inner.created_requests.lock().unwrap().clone()
    }

    /// Project names passed to `rescope`, in order.
    pub fn rescope_log(&self) -> Vec<String> {
        self.inner.rescope_log.lock().unwrap().clone()
    }
}

#[async_trait]
impl ComputeApi for MockPlane {
    async fn list_servers(&self, _all_tenants: bool) -> Result<Vec<Vm>> {
        Ok(self.inner.servers.lock().unwrap().clone())
    }

    async fn get_server(&self, id: &str) -> Result<Vm> {
        let mut vm = self
            .inner
            .servers
            .lock()
            .unwrap()
            .iter()
            .find(|s| s.id == id)
            .cloned()
            .ok_or_else(|| CloudError::VmNotFound(id.to_string()))?;

        if let Some(status) = self.inner.status_script.lock().unwrap().pop_front() {
            vm.status = status;
            if status == VmStatus::Error {
                vm.fault = self.inner.fault.lock().unwrap().clone();
            }
        }
        Ok(vm)
    }

    async fn create_server(&self, request: &CreateServerRequest) -> Result<Vm> {
        self.inner
            .created_requests
            .lock()
            .unwrap()
            .push(request.clone());

        let mut servers = self.inner.servers.lock().unwrap();
        let vm = Vm {
            id: format!("vm-{}", servers.len() + 1),
            name: request.name.clone(),
            status: VmStatus::Build,
            project_id: self.project.clone(),
            addresses: HashMap::new(),
            fault: None,
            hypervisor_host: Some("hv-01".to_string()),
            created: None,
        };
        servers.push(vm.clone());
        Ok(vm)
    }

    async fn delete_server(&self, id: &str) -> Result<()> {
        let mut servers = self.inner.servers.lock().unwrap();
        let before = servers.len();
        servers.retain(|s| s.id != id);
        if servers.len() == before {
            return Err(CloudError::VmNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_flavors(&self) -> Result<Vec<Flavor>> {
        Ok(self.inner.flavors.lock().unwrap().clone())
    }

    async fn create_flavor(&self, spec: &FlavorSpec) -> Result<Flavor> {
        let flavor = Flavor {
            id: format!("flavor-{}", spec.flavor_name()),
            name: spec.flavor_name(),
            vcpus: spec.vcpus,
            ram_mb: spec.ram_mb(),
            disk_gb: spec.disk_gb,
        };
        self.inner.flavors.lock().unwrap().push(flavor.clone());
        Ok(flavor)
    }
}

#[async_trait]
impl NetworkApi for MockPlane {
    async fn list_networks(&self) -> Result<Vec<Network>> {
        Ok(self.inner.networks.lock().unwrap().clone())
    }

    async fn list_ports(&self, device_id: &str) -> Result<Vec<Port>> {
        Ok(self
            .inner
            .ports
            .lock()
            .unwrap()
            .get(device_id)
            .cloned()
            .unwrap_or_default())
    }

    async fn list_floating_ips(&self) -> Result<Vec<FloatingIp>> {
        Ok(self.inner.floating_ips.lock().unwrap().clone())
    }

    async fn allocate_floating_ip(&self, _external_network_id: &str) -> Result<FloatingIp> {
        let n = self.inner.fip_counter.fetch_add(1, Ordering::SeqCst) + 1;
        let fip = FloatingIp {
            id: format!("fip-{n}"),
            address: format!("192.0.2.{n}"),
            port_id: None,
        };
        self.inner.floating_ips.lock().unwrap().push(fip.clone());
        Ok(fip)
    }

    async fn bind_floating_ip(&self, id: &str, port_id: &str) -> Result<FloatingIp> {
        let mut fips = self.inner.floating_ips.lock().unwrap();
        let fip = fips
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| CloudError::FloatingIpNotFound(id.to_string()))?;
        fip.port_id = Some(port_id.to_string());
        Ok(fip.clone())
    }

    async fn unbind_floating_ip(&self, id: &str) -> Result<FloatingIp> {
        let mut fips = self.inner.floating_ips.lock().unwrap();
        let fip = fips
            .iter_mut()
            .find(|f| f.id == id)
            .ok_or_else(|| CloudError::FloatingIpNotFound(id.to_string()))?;
        fip.port_id = None;
        Ok(fip.clone())
    }

    async fn release_floating_ip(&self, id: &str) -> Result<()> {
        let mut fips = self.inner.floating_ips.lock().unwrap();
        let before = fips.len();
        fips.retain(|f| f.id != id);
        if fips.len() == before {
            return Err(CloudError::FloatingIpNotFound(id.to_string()));
        }
        Ok(())
    }

    async fn list_security_groups(&self) -> Result<Vec<SecurityGroup>> {
        Ok(self.inner.security_groups.lock().unwrap().clone())
    }
}

#[async_trait]
impl ImageApi for MockPlane {
    async fn list_images(&self) -> Result<Vec<Image>> {
        Ok(self.inner.images.lock().unwrap().clone())
    }
}

#[async_trait]
impl IdentityApi for MockPlane {
    async fn list_projects(&self) -> Result<Vec<Project>> {
        Ok(self.inner.projects.lock().unwrap().clone())
    }
}

#[async_trait]
impl ControlPlane for MockPlane {
    async fn rescope(&self, credentials: &CloudCredentials) -> Result<Self> {
        self.inner
            .rescope_log
            .lock()
            .unwrap()
            .push(credentials.project_name.clone());
        Ok(Self {
            inner: self.inner.clone(),
            project: credentials.project_name.clone(),
        })
    }
}
