//! The Azure Kubernetes stack
//!
//! Shared resources go to the common location. Every entry of `Locations`
//! then gets its own resource group, identity, network, cluster and container
//! app. The whole configuration is validated before anything is registered,
//! so a bad value never leaves a half-declared stack behind.

use tracing::info;
use ummati_common::settings::Settings;
use ummati_common::tags::Tags;
use ummati_common::Result;

use crate::component::{
    CommonResource, ContainerAppResource, IdentityResource, KubernetesResource,
    VirtualNetworkResource,
};
use crate::output::Output;
use crate::provisioner::{Provisioner, RegisteredResource};
use crate::resource::{ResourceGroupSpec, ResourceSpec};
use crate::secret::Secret;

/// Resources deployed to one location
#[derive(Clone, Debug)]
pub struct LocationStack {
    /// Azure location
    pub location: String,
    /// Resource group of the location
    pub resource_group: RegisteredResource,
    /// Cluster identity
    pub identity: IdentityResource,
    /// Virtual network
    pub network: VirtualNetworkResource,
    /// Kubernetes cluster
    pub kubernetes: KubernetesResource,
    /// Container app
    pub container_app: ContainerAppResource,
}

/// Every resource of a deployment run
#[derive(Clone, Debug)]
pub struct AzureKubernetesStack {
    /// Shared resources
    pub common: CommonResource,
    /// Per-location resources, in configured order
    pub locations: Vec<LocationStack>,
}

impl AzureKubernetesStack {
    /// Validate the settings and register the whole stack
    pub fn deploy(settings: &dyn Settings, provisioner: &dyn Provisioner) -> Result<Self> {
        settings.validate_all()?;

        let application = settings.application_name()?;
        let environment = settings.environment()?;
        let common_location = settings.common_location()?;
        let common = CommonResource::new("common", &common_location, settings, provisioner)?;

        let mut locations = Vec::new();
        for location in settings.locations()? {
            let group = ResourceGroupSpec::new(
                &application,
                &location,
                &environment,
                Tags::new(&application, &environment, &location),
            );
            let resource_group = provisioner.create_or_update(ResourceSpec::ResourceGroup(group))?;

            let identity = IdentityResource::new(
                &format!("identity-{location}"),
                &location,
                settings,
                provisioner,
            )?;
            let network = VirtualNetworkResource::new(
                &format!("virtualnetwork-{location}"),
                &location,
                settings,
                &resource_group,
                provisioner,
            )?;
            let kubernetes = KubernetesResource::new(
                &format!("kubernetes-{location}"),
                &location,
                settings,
                &resource_group,
                &identity,
                &network,
                provisioner,
            )?;
            let container_app = ContainerAppResource::new(
                &format!("containerapp-{location}"),
                &location,
                settings,
                &resource_group,
                &common,
                provisioner,
            )?;

            locations.push(LocationStack {
                location,
                resource_group,
                identity,
                network,
                kubernetes,
                container_app,
            });
        }

        info!(
            application = %application,
            environment = %environment,
            locations = locations.len(),
            "stack declared"
        );
        Ok(Self { common, locations })
    }

    /// Decoded kubeconfig of every location's cluster
    pub fn kubeconfigs(&self) -> Vec<(String, Output<Secret>)> {
        self.locations
            .iter()
            .map(|l| (l.location.clone(), l.kubernetes.kubeconfig.clone()))
            .collect()
    }
}
