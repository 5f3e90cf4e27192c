use tracing::info;
use ummati_common::settings::Settings;
use ummati_common::tags::Tags;
use ummati_common::Result;

use super::require_argument;
use crate::output::Output;
use crate::provisioner::{Provisioner, RegisteredResource};
use crate::resource::{LogAnalyticsWorkspaceSpec, ResourceGroupSpec, ResourceSpec};
use crate::secret::Secret;

/// Resources shared by every location, deployed in the common location
#[derive(Clone, Debug)]
pub struct CommonResource {
    /// Component name
    pub name: String,
    /// Common location
    pub location: String,
    /// Shared resource group
    pub resource_group: RegisteredResource,
    /// Shared Log Analytics workspace
    pub workspace: RegisteredResource,
}

impl CommonResource {
    /// Register the shared resource group and workspace
    pub fn new(
        name: &str,
        location: &str,
        settings: &dyn Settings,
        provisioner: &dyn Provisioner,
    ) -> Result<Self> {
        require_argument("name", name)?;
        require_argument("location", location)?;

        let application = settings.application_name()?;
        let environment = settings.environment()?;
        let tags = Tags::new(&application, &environment, location);

        let group = ResourceGroupSpec::named(
            format!("{application}-common-{environment}-"),
            location,
            tags.clone(),
        );
        let resource_group = provisioner.create_or_update(ResourceSpec::ResourceGroup(group))?;

        let workspace = provisioner.create_or_update(ResourceSpec::LogAnalyticsWorkspace(
            LogAnalyticsWorkspaceSpec {
                name: format!("loganalyticsworkspace-{environment}-"),
                location: location.to_string(),
                resource_group_name: resource_group.name.clone(),
                tags,
            },
        ))?;

        info!(component = %name, location = %location, "registered common resources");
        Ok(Self {
            name: name.to_string(),
            location: location.to_string(),
            resource_group,
            workspace,
        })
    }

    /// Customer id of the shared workspace
    pub fn workspace_customer_id(&self) -> Output<String> {
        self.workspace.output("customerId")
    }

    /// Primary shared key of the shared workspace
    pub fn workspace_shared_key(&self) -> Output<Secret> {
        self.workspace.secret_output("primarySharedKey")
    }
}
