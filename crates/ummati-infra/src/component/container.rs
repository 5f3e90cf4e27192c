use tracing::info;
use ummati_common::settings::Settings;
use ummati_common::tags::Tags;
use ummati_common::Result;

use super::{require_argument, CommonResource};
use crate::provisioner::{Provisioner, RegisteredResource};
use crate::resource::{ContainerAppSpec, ManagedEnvironmentSpec, ResourceSpec};

/// Container app of one location and the environment it runs in
#[derive(Clone, Debug)]
pub struct ContainerAppResource {
    /// Component name
    pub name: String,
    /// Container Apps environment
    pub environment: RegisteredResource,
    /// The container app
    pub app: RegisteredResource,
}

impl ContainerAppResource {
    /// Register the environment and the app, logging to the shared workspace
    pub fn new(
        name: &str,
        location: &str,
        settings: &dyn Settings,
        resource_group: &RegisteredResource,
        common: &CommonResource,
        provisioner: &dyn Provisioner,
    ) -> Result<Self> {
        require_argument("name", name)?;
        require_argument("location", location)?;

        let environment_name = settings.environment()?;
        let tags = Tags::from_settings(settings, location)?;

        let environment =
            provisioner.create_or_update(ResourceSpec::ManagedEnvironment(ManagedEnvironmentSpec {
                name: format!("managedenvironment-{location}-{environment_name}-"),
                location: location.to_string(),
                resource_group_name: resource_group.name.clone(),
                workspace_customer_id: common.workspace_customer_id(),
                workspace_shared_key: common.workspace_shared_key(),
                tags: tags.clone(),
            }))?;

        let app = provisioner.create_or_update(ResourceSpec::ContainerApp(ContainerAppSpec {
            name: format!("containerapp-{location}-{environment_name}-"),
            location: location.to_string(),
            resource_group_name: resource_group.name.clone(),
            managed_environment_id: environment.id.clone(),
            image: settings.container_image_name()?,
            cpu: settings.container_cpu()?,
            memory: settings.container_memory()?,
            min_replicas: settings.container_min_replicas()?,
            max_replicas: settings.container_max_replicas()?,
            concurrent_requests: settings.container_concurrent_requests()?,
            tags,
        }))?;

        info!(component = %name, location = %location, "registered container app");
        Ok(Self {
            name: name.to_string(),
            environment,
            app,
        })
    }
}
