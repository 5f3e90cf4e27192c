//! Typed deployment settings
//!
//! [`Settings`] names every value a deployment run needs. [`StackSettings`]
//! implements it over a [`ConfigStore`], validating on every call; nothing is
//! memoized, so a bad value fails each time it is read.
//!
//! Node pool settings are keyed per role: `KubernetesSystemNodes<Name>` for the
//! system pool and `KubernetesUserNodes<Name>` for the per-zone user pools.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config::{Bounds, Config, ConfigStore};
use crate::Result;

/// Configuration keys
pub mod keys {
    /// Application name, used in resource names, labels and tags
    pub const APPLICATION_NAME: &str = "ApplicationName";
    /// Environment name, e.g. development or production
    pub const ENVIRONMENT: &str = "Environment";
    /// Location for shared resources
    pub const COMMON_LOCATION: &str = "CommonLocation";
    /// Locations where per-location resources are duplicated
    pub const LOCATIONS: &str = "Locations";
    /// Days on which cluster maintenance may run
    pub const KUBERNETES_MAINTENANCE_DAYS: &str = "KubernetesMaintenanceDays";
    /// Hours of the day in which cluster maintenance may run
    pub const KUBERNETES_MAINTENANCE_HOUR_SLOTS: &str = "KubernetesMaintenanceHourSlots";
    /// Cluster SKU tier
    pub const KUBERNETES_SKU_TIER: &str = "KubernetesSKUTier";
    /// Automatic upgrade channel
    pub const KUBERNETES_UPGRADE_CHANNEL: &str = "KubernetesUpgradeChannel";

    /// Node pool setting suffixes, prefixed by [`super::NodePoolRole::key_prefix`]
    pub mod node_pool {
        /// Availability zones
        pub const AVAILABILITY_ZONES: &str = "AvailabilityZones";
        /// Maximum pods per node
        pub const MAXIMUM_PODS: &str = "MaximumPods";
        /// Maximum node count
        pub const MAXIMUM_NODE_COUNT: &str = "MaximumNodeCount";
        /// Upgrade max surge
        pub const MAXIMUM_SURGE: &str = "MaximumSurge";
        /// Minimum node count
        pub const MINIMUM_NODE_COUNT: &str = "MinimumNodeCount";
        /// OS disk size in GB
        pub const OS_DISK_SIZE_GB: &str = "OsDiskSizeGB";
        /// OS disk type
        pub const OS_DISK_TYPE: &str = "OSDiskType";
        /// Scale set eviction policy
        pub const SCALE_SET_EVICTION_POLICY: &str = "ScaleSetEvictionPolicy";
        /// VM size
        pub const VM_SIZE: &str = "VmSize";
    }

    /// Container image
    pub const CONTAINER_IMAGE_NAME: &str = "ContainerImageName";
    /// Container CPU cores
    pub const CONTAINER_CPU: &str = "ContainerCpu";
    /// Container memory, e.g. "1Gi"
    pub const CONTAINER_MEMORY: &str = "ContainerMemory";
    /// Maximum container replicas
    pub const CONTAINER_MAX_REPLICAS: &str = "ContainerMaxReplicas";
    /// Minimum container replicas
    pub const CONTAINER_MIN_REPLICAS: &str = "ContainerMinReplicas";
    /// Concurrent requests per replica before scaling out
    pub const CONTAINER_CONCURRENT_REQUESTS: &str = "ContainerConcurrentRequests";
}

/// Inclusive bounds for maintenance hour slots
pub fn maintenance_hour_slot_bounds() -> Bounds<i32> {
    Bounds::between(0, 24)
}

/// Inclusive bounds for maximum pods per node
pub fn maximum_pods_bounds() -> Bounds<i32> {
    Bounds::between(1, 250)
}

/// Inclusive bounds for node counts
pub fn node_count_bounds() -> Bounds<i32> {
    Bounds::between(0, 100)
}

/// Inclusive bounds for OS disk size in GB
pub fn os_disk_size_bounds() -> Bounds<i32> {
    Bounds::at_least(1)
}

/// Pattern for max surge: a count (`10`) or a percentage (`33%`)
pub fn maximum_surge_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"^(\d+)(\%?)$").expect("max surge pattern is valid"))
}

/// An enum that can be read from configuration by name
pub trait ConfigEnum: Copy + Sized + 'static {
    /// Accepted configuration names and the variant each maps to
    const ALLOWED: &'static [(&'static str, Self)];
}

/// Day of the week for maintenance windows
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum WeekDay {
    /// Monday
    Monday,
    /// Tuesday
    Tuesday,
    /// Wednesday
    Wednesday,
    /// Thursday
    Thursday,
    /// Friday
    Friday,
    /// Saturday
    Saturday,
    /// Sunday
    Sunday,
}

impl ConfigEnum for WeekDay {
    const ALLOWED: &'static [(&'static str, Self)] = &[
        ("Monday", WeekDay::Monday),
        ("Tuesday", WeekDay::Tuesday),
        ("Wednesday", WeekDay::Wednesday),
        ("Thursday", WeekDay::Thursday),
        ("Friday", WeekDay::Friday),
        ("Saturday", WeekDay::Saturday),
        ("Sunday", WeekDay::Sunday),
    ];
}

/// Automatic cluster upgrade channel
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(rename_all = "kebab-case")]
pub enum UpgradeChannel {
    /// Upgrade node images only
    NodeImage,
    /// No automatic upgrades
    None,
    /// Latest patch of the current minor version
    Patch,
    /// Latest supported version
    Rapid,
    /// Latest patch of the N-1 minor version
    Stable,
}

impl ConfigEnum for UpgradeChannel {
    const ALLOWED: &'static [(&'static str, Self)] = &[
        ("Node_image", UpgradeChannel::NodeImage),
        ("None", UpgradeChannel::None),
        ("Patch", UpgradeChannel::Patch),
        ("Rapid", UpgradeChannel::Rapid),
        ("Stable", UpgradeChannel::Stable),
    ];
}

/// Scale set eviction policy for a node pool
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum ScaleSetEvictionPolicy {
    /// Delete nodes on scale down; faster to scale back up
    Delete,
    /// Stop and deallocate nodes on scale down; cheaper
    Deallocate,
}

impl ConfigEnum for ScaleSetEvictionPolicy {
    const ALLOWED: &'static [(&'static str, Self)] = &[
        ("Delete", ScaleSetEvictionPolicy::Delete),
        ("Deallocate", ScaleSetEvictionPolicy::Deallocate),
    ];
}

/// Node OS disk type
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum OsDiskType {
    /// Managed disk
    Managed,
    /// Ephemeral disk on the VM's temporary storage
    Ephemeral,
}

impl ConfigEnum for OsDiskType {
    const ALLOWED: &'static [(&'static str, Self)] = &[
        ("Managed", OsDiskType::Managed),
        ("Ephemeral", OsDiskType::Ephemeral),
    ];
}

/// Managed cluster SKU tier
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq)]
pub enum SkuTier {
    /// No uptime SLA
    Free,
    /// Uptime SLA
    Paid,
}

impl ConfigEnum for SkuTier {
    const ALLOWED: &'static [(&'static str, Self)] =
        &[("Free", SkuTier::Free), ("Paid", SkuTier::Paid)];
}

/// Role of a node pool in the cluster
#[derive(Clone, Copy, Debug, Deserialize, Serialize, PartialEq, Eq, Hash)]
pub enum NodePoolRole {
    /// Runs cluster add-ons; tainted against general workloads
    System,
    /// Runs application workloads
    User,
}

impl NodePoolRole {
    /// Prefix of this role's configuration keys
    pub fn key_prefix(self) -> &'static str {
        match self {
            NodePoolRole::System => "KubernetesSystemNodes",
            NodePoolRole::User => "KubernetesUserNodes",
        }
    }

    /// Full configuration key for `suffix` (see [`keys::node_pool`])
    pub fn key(self, suffix: &str) -> String {
        format!("{}{}", self.key_prefix(), suffix)
    }
}

/// Every setting a deployment run reads
///
/// All methods validate on each call and fail with the first configuration
/// error found.
pub trait Settings: Send + Sync {
    /// Application name
    fn application_name(&self) -> Result<String>;
    /// Environment name
    fn environment(&self) -> Result<String>;
    /// Location for shared resources
    fn common_location(&self) -> Result<String>;
    /// Locations where resources are duplicated
    fn locations(&self) -> Result<Vec<String>>;
    /// Days on which maintenance may run, in configured order
    fn kubernetes_maintenance_days(&self) -> Result<Vec<WeekDay>>;
    /// Hours (0-24) in which maintenance may run, in configured order
    fn kubernetes_maintenance_hour_slots(&self) -> Result<Vec<i32>>;
    /// Cluster SKU tier
    fn kubernetes_sku_tier(&self) -> Result<SkuTier>;
    /// Automatic upgrade channel
    fn kubernetes_upgrade_channel(&self) -> Result<UpgradeChannel>;

    /// Availability zones for a node pool role
    fn node_availability_zones(&self, role: NodePoolRole) -> Result<Vec<String>>;
    /// Maximum pods per node (1-250)
    fn node_maximum_pods(&self, role: NodePoolRole) -> Result<i32>;
    /// Maximum node count (0-100)
    fn node_maximum_count(&self, role: NodePoolRole) -> Result<i32>;
    /// Upgrade max surge, a count or a percentage
    fn node_maximum_surge(&self, role: NodePoolRole) -> Result<String>;
    /// Minimum node count (0-100)
    fn node_minimum_count(&self, role: NodePoolRole) -> Result<i32>;
    /// OS disk size in GB (at least 1)
    fn node_os_disk_size_gb(&self, role: NodePoolRole) -> Result<i32>;
    /// OS disk type
    fn node_os_disk_type(&self, role: NodePoolRole) -> Result<OsDiskType>;
    /// Scale set eviction policy
    fn node_scale_set_eviction_policy(&self, role: NodePoolRole) -> Result<ScaleSetEvictionPolicy>;
    /// VM size
    fn node_vm_size(&self, role: NodePoolRole) -> Result<String>;

    /// Container image
    fn container_image_name(&self) -> Result<String>;
    /// Container CPU cores
    fn container_cpu(&self) -> Result<f64>;
    /// Container memory
    fn container_memory(&self) -> Result<String>;
    /// Maximum container replicas
    fn container_max_replicas(&self) -> Result<i32>;
    /// Minimum container replicas
    fn container_min_replicas(&self) -> Result<i32>;
    /// Concurrent requests per replica
    fn container_concurrent_requests(&self) -> Result<i32>;

    /// Read every setting once, returning the first error
    fn validate_all(&self) -> Result<()> {
        self.application_name()?;
        self.environment()?;
        self.common_location()?;
        self.locations()?;
        self.kubernetes_maintenance_days()?;
        self.kubernetes_maintenance_hour_slots()?;
        self.kubernetes_sku_tier()?;
        self.kubernetes_upgrade_channel()?;
        for role in [NodePoolRole::System, NodePoolRole::User] {
            self.node_availability_zones(role)?;
            self.node_maximum_pods(role)?;
            self.node_maximum_count(role)?;
            self.node_maximum_surge(role)?;
            self.node_minimum_count(role)?;
            self.node_os_disk_size_gb(role)?;
            self.node_os_disk_type(role)?;
            self.node_scale_set_eviction_policy(role)?;
            self.node_vm_size(role)?;
        }
        self.container_image_name()?;
        self.container_cpu()?;
        self.container_memory()?;
        self.container_max_replicas()?;
        self.container_min_replicas()?;
        self.container_concurrent_requests()?;
        Ok(())
    }
}

/// [`Settings`] backed by a configuration store
#[derive(Clone, Debug)]
pub struct StackSettings<S> {
    config: Config<S>,
}

impl<S: ConfigStore> StackSettings<S> {
    /// Read settings from `store`
    pub fn new(store: S) -> Self {
        Self {
            config: Config::new(store),
        }
    }

    /// The typed accessor
    pub fn config(&self) -> &Config<S> {
        &self.config
    }

    fn enumeration<T: ConfigEnum>(&self, key: &str) -> Result<T> {
        self.config.enumeration(key, T::ALLOWED)
    }
}

impl<S: ConfigStore> Settings for StackSettings<S> {
    fn application_name(&self) -> Result<String> {
        self.config.string(keys::APPLICATION_NAME, None)
    }

    fn environment(&self) -> Result<String> {
        self.config.string(keys::ENVIRONMENT, None)
    }

    fn common_location(&self) -> Result<String> {
        self.config.string(keys::COMMON_LOCATION, None)
    }

    fn locations(&self) -> Result<Vec<String>> {
        self.config.collection(keys::LOCATIONS)
    }

    fn kubernetes_maintenance_days(&self) -> Result<Vec<WeekDay>> {
        self.config
            .enum_collection(keys::KUBERNETES_MAINTENANCE_DAYS, WeekDay::ALLOWED)
    }

    fn kubernetes_maintenance_hour_slots(&self) -> Result<Vec<i32>> {
        self.config.integer_collection(
            keys::KUBERNETES_MAINTENANCE_HOUR_SLOTS,
            maintenance_hour_slot_bounds(),
        )
    }

    fn kubernetes_sku_tier(&self) -> Result<SkuTier> {
        self.enumeration(keys::KUBERNETES_SKU_TIER)
    }

    fn kubernetes_upgrade_channel(&self) -> Result<UpgradeChannel> {
        self.enumeration(keys::KUBERNETES_UPGRADE_CHANNEL)
    }

    fn node_availability_zones(&self, role: NodePoolRole) -> Result<Vec<String>> {
        self.config
            .collection(&role.key(keys::node_pool::AVAILABILITY_ZONES))
    }

    fn node_maximum_pods(&self, role: NodePoolRole) -> Result<i32> {
        self.config
            .integer(&role.key(keys::node_pool::MAXIMUM_PODS), maximum_pods_bounds())
    }

    fn node_maximum_count(&self, role: NodePoolRole) -> Result<i32> {
        self.config.integer(
            &role.key(keys::node_pool::MAXIMUM_NODE_COUNT),
            node_count_bounds(),
        )
    }

    fn node_maximum_surge(&self, role: NodePoolRole) -> Result<String> {
        self.config.string(
            &role.key(keys::node_pool::MAXIMUM_SURGE),
            Some(maximum_surge_pattern()),
        )
    }

    fn node_minimum_count(&self, role: NodePoolRole) -> Result<i32> {
        self.config.integer(
            &role.key(keys::node_pool::MINIMUM_NODE_COUNT),
            node_count_bounds(),
        )
    }

    fn node_os_disk_size_gb(&self, role: NodePoolRole) -> Result<i32> {
        self.config.integer(
            &role.key(keys::node_pool::OS_DISK_SIZE_GB),
            os_disk_size_bounds(),
        )
    }

    fn node_os_disk_type(&self, role: NodePoolRole) -> Result<OsDiskType> {
        self.enumeration(&role.key(keys::node_pool::OS_DISK_TYPE))
    }

    fn node_scale_set_eviction_policy(&self, role: NodePoolRole) -> Result<ScaleSetEvictionPolicy> {
        self.enumeration(&role.key(keys::node_pool::SCALE_SET_EVICTION_POLICY))
    }

    fn node_vm_size(&self, role: NodePoolRole) -> Result<String> {
        self.config.string(&role.key(keys::node_pool::VM_SIZE), None)
    }

    fn container_image_name(&self) -> Result<String> {
        self.config.string(keys::CONTAINER_IMAGE_NAME, None)
    }

    fn container_cpu(&self) -> Result<f64> {
        self.config.double(keys::CONTAINER_CPU, Bounds::none())
    }

    fn container_memory(&self) -> Result<String> {
        self.config.string(keys::CONTAINER_MEMORY, None)
    }

    fn container_max_replicas(&self) -> Result<i32> {
        self.config.integer(keys::CONTAINER_MAX_REPLICAS, Bounds::none())
    }

    fn container_min_replicas(&self) -> Result<i32> {
        self.config.integer(keys::CONTAINER_MIN_REPLICAS, Bounds::none())
    }

    fn container_concurrent_requests(&self) -> Result<i32> {
        self.config
            .integer(keys::CONTAINER_CONCURRENT_REQUESTS, Bounds::none())
    }
}

/// A complete, valid configuration for tests and local previews
///
/// Uses two locations, zones `1`-`3` for system nodes and zones `1`-`2` for
/// user nodes.
pub fn sample_store() -> crate::config::MemoryStore {
    use crate::config::MemoryStore;

    let mut store = MemoryStore::new()
        .with(keys::APPLICATION_NAME, "ummati")
        .with(keys::ENVIRONMENT, "test")
        .with(keys::COMMON_LOCATION, "northeurope")
        .with_list(keys::LOCATIONS, ["northeurope", "canadacentral"])
        .with_list(keys::KUBERNETES_MAINTENANCE_DAYS, ["Saturday", "Sunday"])
        .with_list(keys::KUBERNETES_MAINTENANCE_HOUR_SLOTS, ["0", "1", "2"])
        .with(keys::KUBERNETES_SKU_TIER, "Free")
        .with(keys::KUBERNETES_UPGRADE_CHANNEL, "Stable")
        .with(keys::CONTAINER_IMAGE_NAME, "ummati/frontend:latest")
        .with(keys::CONTAINER_CPU, "0.5")
        .with(keys::CONTAINER_MEMORY, "1Gi")
        .with(keys::CONTAINER_MAX_REPLICAS, "10")
        .with(keys::CONTAINER_MIN_REPLICAS, "1")
        .with(keys::CONTAINER_CONCURRENT_REQUESTS, "50");

    for (role, zones) in [
        (NodePoolRole::System, vec!["1", "2", "3"]),
        (NodePoolRole::User, vec!["1", "2"]),
    ] {
        store = store
            .with_list(role.key(keys::node_pool::AVAILABILITY_ZONES), zones)
            .with(role.key(keys::node_pool::MAXIMUM_PODS), "30")
            .with(role.key(keys::node_pool::MAXIMUM_NODE_COUNT), "10")
            .with(role.key(keys::node_pool::MAXIMUM_SURGE), "33%")
            .with(role.key(keys::node_pool::MINIMUM_NODE_COUNT), "1")
            .with(role.key(keys::node_pool::OS_DISK_SIZE_GB), "128")
            .with(role.key(keys::node_pool::OS_DISK_TYPE), "Ephemeral")
            .with(role.key(keys::node_pool::SCALE_SET_EVICTION_POLICY), "Delete")
            .with(role.key(keys::node_pool::VM_SIZE), "Standard_DS3_v2");
    }
    store
}
