use tracing::info;
use ummati_common::settings::Settings;
use ummati_common::tags::Tags;
use ummati_common::Result;

use super::require_argument;
use crate::output::Output;
use crate::provisioner::{Provisioner, RegisteredResource};
use crate::resource::{ResourceSpec, VirtualNetworkSpec};

/// Virtual network and node subnet of one location
#[derive(Clone, Debug)]
pub struct VirtualNetworkResource {
    /// Component name
    pub name: String,
    /// The virtual network
    pub network: RegisteredResource,
    /// Id of the node subnet
    pub subnet_id: Output<String>,
}

impl VirtualNetworkResource {
    /// Register the virtual network in `resource_group`
    pub fn new(
        name: &str,
        location: &str,
        settings: &dyn Settings,
        resource_group: &RegisteredResource,
        provisioner: &dyn Provisioner,
    ) -> Result<Self> {
        require_argument("name", name)?;
        require_argument("location", location)?;

        let environment = settings.environment()?;
        let tags = Tags::from_settings(settings, location)?;

        let network = provisioner.create_or_update(ResourceSpec::VirtualNetwork(VirtualNetworkSpec {
            name: format!("virtualnetwork-{location}-{environment}-"),
            location: location.to_string(),
            resource_group_name: resource_group.name.clone(),
            tags,
        }))?;
        let subnet_id = network.id.map(|id| VirtualNetworkSpec::subnet_id(&id));

        info!(component = %name, location = %location, "registered virtual network");
        Ok(Self {
            name: name.to_string(),
            network,
            subnet_id,
        })
    }
}
