use serde_json::{json, Value};
use ummati_common::tags::Tags;
use ummati_common::Result;

use crate::output::Output;

/// Address space of each location's virtual network
pub const ADDRESS_PREFIX: &str = "10.0.0.0/16";

/// Address range of the node subnet
pub const SUBNET_PREFIX: &str = "10.0.0.0/22";

/// Name of the node subnet
pub const SUBNET_NAME: &str = "kubernetes";

/// Virtual network with a single node subnet
#[derive(Clone, Debug)]
pub struct VirtualNetworkSpec {
    /// Logical name
    pub name: String,
    /// Azure location
    pub location: String,
    /// Resource group holding the network
    pub resource_group_name: Output<String>,
    /// Resource tags
    pub tags: Tags,
}

impl VirtualNetworkSpec {
    /// Subnet id for a network with id `network_id`
    pub fn subnet_id(network_id: &str) -> String {
        format!("{network_id}/subnets/{SUBNET_NAME}")
    }

    pub(crate) async fn properties(&self) -> Result<Value> {
        let resource_group_name = self.resource_group_name.get().await?;
        Ok(json!({
            "addressSpace": { "addressPrefixes": [ADDRESS_PREFIX] },
            "location": self.location,
            "resourceGroupName": resource_group_name,
            "subnets": [{
                "addressPrefix": SUBNET_PREFIX,
                "name": SUBNET_NAME,
            }],
            "tags": self.tags.to_map(),
        }))
    }
}
