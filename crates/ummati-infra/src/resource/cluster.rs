use serde_json::{json, Value};
use ummati_common::settings::{SkuTier, UpgradeChannel};
use ummati_common::tags::Tags;
use ummati_common::Result;

use super::node_pool::NodePoolSpec;
use super::{to_json, ResourceKind};
use crate::output::Output;
use crate::secret::Secret;

/// DNS prefix of the API server
pub const DNS_PREFIX: &str = "AzureNativeprovider";

/// Network plugin
pub const NETWORK_PLUGIN: &str = "azure";

/// Kubernetes service address range
pub const SERVICE_CIDR: &str = "10.0.2.0/24";

/// Cluster DNS service address, inside [`SERVICE_CIDR`]
pub const DNS_SERVICE_IP: &str = "10.0.2.254";

/// Docker bridge address range
pub const DOCKER_BRIDGE_CIDR: &str = "172.17.0.1/16";

/// Load balancer SKU
pub const LOAD_BALANCER_SKU: &str = "standard";

/// Managed cluster SKU name
pub const SKU_NAME: &str = "Basic";

/// AKS managed cluster
#[derive(Clone, Debug)]
pub struct ManagedClusterSpec {
    /// Logical name, `kubernetes-{location}-{env}-`
    pub name: String,
    /// Azure location
    pub location: String,
    /// Resource group holding the cluster
    pub resource_group_name: Output<String>,
    /// Resource group AKS creates for the nodes
    pub node_resource_group: String,
    /// Agent pool profiles, system pool first
    pub node_pools: Vec<NodePoolSpec>,
    /// Automatic upgrade channel
    pub upgrade_channel: UpgradeChannel,
    /// SKU tier
    pub sku_tier: SkuTier,
    /// Service principal client id
    pub client_id: Output<String>,
    /// Service principal client secret
    pub client_secret: Output<Secret>,
    /// Resource tags
    pub tags: Tags,
}

impl ManagedClusterSpec {
    pub(crate) async fn properties(&self) -> Result<Value> {
        let resource_group_name = self.resource_group_name.get().await?;
        let client_id = self.client_id.get().await?;
        let client_secret = self.client_secret.get().await?;

        let mut profiles = Vec::with_capacity(self.node_pools.len());
        for pool in &self.node_pools {
            profiles.push(pool.profile().await?);
        }

        Ok(json!({
            "agentPoolProfiles": profiles,
            "autoUpgradeProfile": {
                "upgradeChannel": to_json(ResourceKind::ManagedCluster, &self.upgrade_channel)?,
            },
            "dnsPrefix": DNS_PREFIX,
            "enableRBAC": true,
            "location": self.location,
            "networkProfile": {
                "dnsServiceIP": DNS_SERVICE_IP,
                "dockerBridgeCidr": DOCKER_BRIDGE_CIDR,
                "loadBalancerSku": LOAD_BALANCER_SKU,
                "networkPlugin": NETWORK_PLUGIN,
                "serviceCidr": SERVICE_CIDR,
            },
            "nodeResourceGroup": self.node_resource_group,
            "resourceGroupName": resource_group_name,
            "servicePrincipalProfile": {
                "clientId": client_id,
                "secret": client_secret,
            },
            "sku": {
                "name": SKU_NAME,
                "tier": to_json(ResourceKind::ManagedCluster, &self.sku_tier)?,
            },
            "tags": self.tags.to_map(),
        }))
    }
}
