//! Node pool assembly
//!
//! A cluster gets exactly one system pool spanning the configured system
//! zones, plus one user pool per configured user zone. Each user pool sits in
//! its own proximity placement group, which is registered with the engine
//! before the pool spec that references it.

use std::collections::BTreeMap;

use serde_json::{json, Value};
use tracing::debug;
use ummati_common::settings::{NodePoolRole, OsDiskType, ScaleSetEvictionPolicy, Settings};
use ummati_common::tags::Tags;
use ummati_common::Result;

use super::{to_json, ResourceKind, ResourceSpec};
use crate::output::Output;
use crate::provisioner::Provisioner;

/// Name of the system node pool
pub const SYSTEM_POOL_NAME: &str = "system";

/// Taint keeping general workloads off system nodes
pub const CRITICAL_ADDONS_ONLY_TAINT: &str = "CriticalAddonsOnly=true:NoSchedule";

/// Node OS SKU
pub const OS_SKU: &str = "Ubuntu";

/// Node OS type
pub const OS_TYPE: &str = "Linux";

/// Agent pool type
pub const AGENT_POOL_TYPE: &str = "VirtualMachineScaleSets";

/// Placement group type for user pools
pub const PROXIMITY_PLACEMENT_GROUP_TYPE: &str = "Standard";

/// Where the node pools of one cluster are placed
#[derive(Clone, Debug)]
pub struct NodePoolTarget {
    /// Azure location of the cluster
    pub location: String,
    /// Resource group holding the cluster and its placement groups
    pub resource_group_name: Output<String>,
    /// Subnet the nodes join
    pub vnet_subnet_id: Output<String>,
}

/// One agent pool profile of a managed cluster
///
/// Built only by [`build_node_pool_specs`] and never changed afterwards.
#[derive(Clone, Debug)]
pub struct NodePoolSpec {
    /// Pool name: `system`, or `user{zone}`
    pub name: String,
    /// System or user pool
    pub role: NodePoolRole,
    /// Zones the pool spans; exactly one for user pools
    pub availability_zones: Vec<String>,
    /// Initial node count, equal to `min_count`
    pub count: i32,
    /// Always true
    pub enable_auto_scaling: bool,
    /// Autoscaler lower bound
    pub min_count: i32,
    /// Autoscaler upper bound
    pub max_count: i32,
    /// Maximum pods per node
    pub max_pods: i32,
    /// `{app}.com/application` and `{app}.com/environment` labels
    pub node_labels: BTreeMap<String, String>,
    /// Taints; only the system pool has one
    pub node_taints: Vec<String>,
    /// OS disk size in GB
    pub os_disk_size_gb: i32,
    /// OS disk type
    pub os_disk_type: OsDiskType,
    /// Scale set eviction policy
    pub scale_set_eviction_policy: ScaleSetEvictionPolicy,
    /// Upgrade max surge, a count or a percentage
    pub max_surge: String,
    /// VM size
    pub vm_size: String,
    /// Resource tags
    pub tags: Tags,
    /// Subnet the nodes join
    pub vnet_subnet_id: Output<String>,
    /// Placement group of a user pool
    pub proximity_placement_group_id: Option<Output<String>>,
}

impl NodePoolSpec {
    fn new(
        settings: &dyn Settings,
        role: NodePoolRole,
        name: String,
        availability_zones: Vec<String>,
        node_labels: BTreeMap<String, String>,
        tags: Tags,
        vnet_subnet_id: Output<String>,
    ) -> Result<Self> {
        let min_count = settings.node_minimum_count(role)?;
        let node_taints = match role {
            NodePoolRole::System => vec![CRITICAL_ADDONS_ONLY_TAINT.to_string()],
            NodePoolRole::User => Vec::new(),
        };
        Ok(Self {
            name,
            role,
            availability_zones,
            count: min_count,
            enable_auto_scaling: true,
            min_count,
            max_count: settings.node_maximum_count(role)?,
            max_pods: settings.node_maximum_pods(role)?,
            node_labels,
            node_taints,
            os_disk_size_gb: settings.node_os_disk_size_gb(role)?,
            os_disk_type: settings.node_os_disk_type(role)?,
            scale_set_eviction_policy: settings.node_scale_set_eviction_policy(role)?,
            max_surge: settings.node_maximum_surge(role)?,
            vm_size: settings.node_vm_size(role)?,
            tags,
            vnet_subnet_id,
            proximity_placement_group_id: None,
        })
    }

    /// Render the agent pool profile once the subnet and placement group ids resolve
    pub async fn profile(&self) -> Result<Value> {
        let vnet_subnet_id = self.vnet_subnet_id.get().await?;
        let mode = match self.role {
            NodePoolRole::System => "System",
            NodePoolRole::User => "User",
        };
        let mut profile = json!({
            "availabilityZones": self.availability_zones,
            "count": self.count,
            "enableAutoScaling": self.enable_auto_scaling,
            "maxCount": self.max_count,
            "maxPods": self.max_pods,
            "minCount": self.min_count,
            "mode": mode,
            "name": self.name,
            "nodeLabels": self.node_labels,
            "osDiskSizeGB": self.os_disk_size_gb,
            "osDiskType": to_json(ResourceKind::ManagedCluster, &self.os_disk_type)?,
            "osSKU": OS_SKU,
            "osType": OS_TYPE,
            "scaleSetEvictionPolicy": to_json(ResourceKind::ManagedCluster, &self.scale_set_eviction_policy)?,
            "tags": self.tags.to_map(),
            "type": AGENT_POOL_TYPE,
            "upgradeSettings": { "maxSurge": self.max_surge },
            "vmSize": self.vm_size,
            "vnetSubnetID": vnet_subnet_id,
        });
        if !self.node_taints.is_empty() {
            profile["nodeTaints"] = json!(self.node_taints);
        }
        if let Some(group) = &self.proximity_placement_group_id {
            profile["proximityPlacementGroupID"] = json!(group.get().await?);
        }
        Ok(profile)
    }
}

/// Proximity placement group pinning one user pool's nodes together
#[derive(Clone, Debug)]
pub struct ProximityPlacementGroupSpec {
    /// Logical name, `proximityplacementgroup{zone}-{location}-{env}-`
    pub name: String,
    /// Azure location
    pub location: String,
    /// Resource group holding the group
    pub resource_group_name: Output<String>,
    /// Resource tags
    pub tags: Tags,
}

impl ProximityPlacementGroupSpec {
    /// Placement group for the user pool in `zone`
    pub fn for_zone(
        zone: &str,
        environment: &str,
        target: &NodePoolTarget,
        tags: Tags,
    ) -> Self {
        Self {
            name: format!(
                "proximityplacementgroup{zone}-{}-{environment}-",
                target.location
            ),
            location: target.location.clone(),
            resource_group_name: target.resource_group_name.clone(),
            tags,
        }
    }

    pub(crate) async fn properties(&self) -> Result<Value> {
        let resource_group_name = self.resource_group_name.get().await?;
        Ok(json!({
            "location": self.location,
            "proximityPlacementGroupType": PROXIMITY_PLACEMENT_GROUP_TYPE,
            "resourceGroupName": resource_group_name,
            "tags": self.tags.to_map(),
        }))
    }
}

/// Node labels shared by every pool
pub fn node_labels(application: &str, environment: &str) -> BTreeMap<String, String> {
    BTreeMap::from([
        (
            format!("{application}.com/application"),
            application.to_string(),
        ),
        (
            format!("{application}.com/environment"),
            environment.to_string(),
        ),
    ])
}

/// Assemble the system pool and one user pool per configured user zone
///
/// User zones are taken in configuration order and duplicates are kept. Each
/// user zone first registers a proximity placement group; the pool references
/// the group's id as a deferred output, so nothing here waits on the engine.
pub fn build_node_pool_specs(
    settings: &dyn Settings,
    target: &NodePoolTarget,
    provisioner: &dyn Provisioner,
) -> Result<Vec<NodePoolSpec>> {
    let application = settings.application_name()?;
    let environment = settings.environment()?;
    let tags = Tags::new(&application, &environment, &target.location);
    let labels = node_labels(&application, &environment);

    let mut pools = vec![NodePoolSpec::new(
        settings,
        NodePoolRole::System,
        SYSTEM_POOL_NAME.to_string(),
        settings.node_availability_zones(NodePoolRole::System)?,
        labels.clone(),
        tags.clone(),
        target.vnet_subnet_id.clone(),
    )?];

    // Every user setting is read before the first placement group is registered
    let user_zones = settings.node_availability_zones(NodePoolRole::User)?;
    let user_template = NodePoolSpec::new(
        settings,
        NodePoolRole::User,
        String::new(),
        Vec::new(),
        labels,
        tags.clone(),
        target.vnet_subnet_id.clone(),
    )?;

    for zone in user_zones {
        let group = ProximityPlacementGroupSpec::for_zone(&zone, &environment, target, tags.clone());
        let registered = provisioner.create_or_update(ResourceSpec::ProximityPlacementGroup(group))?;

        let mut pool = user_template.clone();
        pool.name = format!("user{zone}");
        pool.availability_zones = vec![zone];
        pool.proximity_placement_group_id = Some(registered.id);
        pools.push(pool);
    }

    debug!(
        location = %target.location,
        pools = pools.len(),
        "assembled node pool specs"
    );
    Ok(pools)
}
