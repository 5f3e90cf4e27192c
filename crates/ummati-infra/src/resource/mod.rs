//! Resource specs
//!
//! Each Azure (or Azure AD) resource the stack declares is a spec struct
//! wrapped in [`ResourceSpec`]. Specs hold plain values plus [`Output`]
//! handles for anything another resource computes. Rendering awaits those
//! handles and produces the resource's properties as JSON, ready for the
//! engine or for a preview manifest.
//!
//! [`Output`]: crate::output::Output

mod cluster;
mod container;
mod group;
mod identity;
pub mod maintenance;
mod monitoring;
mod network;
pub mod node_pool;

pub use cluster::ManagedClusterSpec;
pub use container::{ContainerAppSpec, ManagedEnvironmentSpec};
pub use group::ResourceGroupSpec;
pub use identity::{ApplicationSpec, ServicePrincipalPasswordSpec, ServicePrincipalSpec};
pub use maintenance::{MaintenanceConfigurationSpec, MaintenanceWindowSpec, TimeInWeek};
pub use monitoring::LogAnalyticsWorkspaceSpec;
pub use network::VirtualNetworkSpec;
pub use node_pool::{NodePoolSpec, NodePoolTarget, ProximityPlacementGroupSpec};

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::output::Output;
use ummati_common::{Error, Result};

/// Kind of resource, identified by its provider type token
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ResourceKind {
    /// Azure resource group
    ResourceGroup,
    /// Log Analytics workspace
    LogAnalyticsWorkspace,
    /// Azure AD application
    Application,
    /// Azure AD service principal
    ServicePrincipal,
    /// Azure AD service principal password
    ServicePrincipalPassword,
    /// Virtual network with its subnet
    VirtualNetwork,
    /// Proximity placement group for a node pool
    ProximityPlacementGroup,
    /// AKS managed cluster
    ManagedCluster,
    /// AKS planned maintenance configuration
    MaintenanceConfiguration,
    /// Container Apps managed environment
    ManagedEnvironment,
    /// Container app
    ContainerApp,
}

impl ResourceKind {
    /// Provider type token
    pub fn type_token(self) -> &'static str {
        match self {
            ResourceKind::ResourceGroup => "azure-native:resources:ResourceGroup",
            ResourceKind::LogAnalyticsWorkspace => "azure-native:operationalinsights:Workspace",
            ResourceKind::Application => "azuread:index/application:Application",
            ResourceKind::ServicePrincipal => "azuread:index/servicePrincipal:ServicePrincipal",
            ResourceKind::ServicePrincipalPassword => {
                "azuread:index/servicePrincipalPassword:ServicePrincipalPassword"
            }
            ResourceKind::VirtualNetwork => "azure-native:network:VirtualNetwork",
            ResourceKind::ProximityPlacementGroup => "azure-native:compute:ProximityPlacementGroup",
            ResourceKind::ManagedCluster => "azure-native:containerservice:ManagedCluster",
            ResourceKind::MaintenanceConfiguration => {
                "azure-native:containerservice:MaintenanceConfiguration"
            }
            ResourceKind::ManagedEnvironment => "azure-native:app:ManagedEnvironment",
            ResourceKind::ContainerApp => "azure-native:app:ContainerApp",
        }
    }

    /// ARM resource type, or `None` for Azure AD objects
    pub fn arm_type(self) -> Option<&'static str> {
        match self {
            ResourceKind::ResourceGroup => Some("Microsoft.Resources/resourceGroups"),
            ResourceKind::LogAnalyticsWorkspace => Some("Microsoft.OperationalInsights/workspaces"),
            ResourceKind::Application
            | ResourceKind::ServicePrincipal
            | ResourceKind::ServicePrincipalPassword => None,
            ResourceKind::VirtualNetwork => Some("Microsoft.Network/virtualNetworks"),
            ResourceKind::ProximityPlacementGroup => {
                Some("Microsoft.Compute/proximityPlacementGroups")
            }
            ResourceKind::ManagedCluster => Some("Microsoft.ContainerService/managedClusters"),
            ResourceKind::MaintenanceConfiguration => {
                Some("Microsoft.ContainerService/managedClusters/maintenanceConfigurations")
            }
            ResourceKind::ManagedEnvironment => Some("Microsoft.App/managedEnvironments"),
            ResourceKind::ContainerApp => Some("Microsoft.App/containerApps"),
        }
    }

    /// Output properties only the engine can compute
    pub fn computed_outputs(self) -> &'static [&'static str] {
        match self {
            ResourceKind::LogAnalyticsWorkspace => &["customerId", "primarySharedKey"],
            ResourceKind::Application => &["applicationId"],
            ResourceKind::ServicePrincipal => &["objectId"],
            ResourceKind::ServicePrincipalPassword => &["value"],
            ResourceKind::ManagedCluster => &["fqdn"],
            ResourceKind::ContainerApp => &["latestRevisionFqdn"],
            _ => &[],
        }
    }

    /// Whether the provider accepts tags as `Name=value` strings rather than a map
    pub fn uses_tag_list(self) -> bool {
        matches!(
            self,
            ResourceKind::Application | ResourceKind::ServicePrincipal
        )
    }
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.type_token())
    }
}

/// A resource to register with the engine
#[derive(Clone, Debug)]
pub enum ResourceSpec {
    /// Resource group
    ResourceGroup(ResourceGroupSpec),
    /// Log Analytics workspace
    LogAnalyticsWorkspace(LogAnalyticsWorkspaceSpec),
    /// Azure AD application
    Application(ApplicationSpec),
    /// Azure AD service principal
    ServicePrincipal(ServicePrincipalSpec),
    /// Azure AD service principal password
    ServicePrincipalPassword(ServicePrincipalPasswordSpec),
    /// Virtual network
    VirtualNetwork(VirtualNetworkSpec),
    /// Proximity placement group
    ProximityPlacementGroup(ProximityPlacementGroupSpec),
    /// Managed cluster
    ManagedCluster(ManagedClusterSpec),
    /// Maintenance configuration
    MaintenanceConfiguration(MaintenanceConfigurationSpec),
    /// Container Apps environment
    ManagedEnvironment(ManagedEnvironmentSpec),
    /// Container app
    ContainerApp(ContainerAppSpec),
}

macro_rules! dispatch {
    ($self:expr, $spec:ident => $body:expr) => {
        match $self {
            ResourceSpec::ResourceGroup($spec) => $body,
            ResourceSpec::LogAnalyticsWorkspace($spec) => $body,
            ResourceSpec::Application($spec) => $body,
            ResourceSpec::ServicePrincipal($spec) => $body,
            ResourceSpec::ServicePrincipalPassword($spec) => $body,
            ResourceSpec::VirtualNetwork($spec) => $body,
            ResourceSpec::ProximityPlacementGroup($spec) => $body,
            ResourceSpec::ManagedCluster($spec) => $body,
            ResourceSpec::MaintenanceConfiguration($spec) => $body,
            ResourceSpec::ManagedEnvironment($spec) => $body,
            ResourceSpec::ContainerApp($spec) => $body,
        }
    };
}

impl ResourceSpec {
    /// Logical name; a trailing `-` asks the engine to append a random suffix
    pub fn name(&self) -> &str {
        dispatch!(self, spec => &spec.name)
    }

    /// Kind of resource
    pub fn kind(&self) -> ResourceKind {
        match self {
            ResourceSpec::ResourceGroup(_) => ResourceKind::ResourceGroup,
            ResourceSpec::LogAnalyticsWorkspace(_) => ResourceKind::LogAnalyticsWorkspace,
            ResourceSpec::Application(_) => ResourceKind::Application,
            ResourceSpec::ServicePrincipal(_) => ResourceKind::ServicePrincipal,
            ResourceSpec::ServicePrincipalPassword(_) => ResourceKind::ServicePrincipalPassword,
            ResourceSpec::VirtualNetwork(_) => ResourceKind::VirtualNetwork,
            ResourceSpec::ProximityPlacementGroup(_) => ResourceKind::ProximityPlacementGroup,
            ResourceSpec::ManagedCluster(_) => ResourceKind::ManagedCluster,
            ResourceSpec::MaintenanceConfiguration(_) => ResourceKind::MaintenanceConfiguration,
            ResourceSpec::ManagedEnvironment(_) => ResourceKind::ManagedEnvironment,
            ResourceSpec::ContainerApp(_) => ResourceKind::ContainerApp,
        }
    }

    /// Resource group the resource lives in, for resources scoped to one
    pub fn resource_group_name(&self) -> Option<&Output<String>> {
        match self {
            ResourceSpec::ResourceGroup(_)
            | ResourceSpec::Application(_)
            | ResourceSpec::ServicePrincipal(_)
            | ResourceSpec::ServicePrincipalPassword(_) => None,
            ResourceSpec::LogAnalyticsWorkspace(spec) => Some(&spec.resource_group_name),
            ResourceSpec::VirtualNetwork(spec) => Some(&spec.resource_group_name),
            ResourceSpec::ProximityPlacementGroup(spec) => Some(&spec.resource_group_name),
            ResourceSpec::ManagedCluster(spec) => Some(&spec.resource_group_name),
            ResourceSpec::MaintenanceConfiguration(spec) => Some(&spec.resource_group_name),
            ResourceSpec::ManagedEnvironment(spec) => Some(&spec.resource_group_name),
            ResourceSpec::ContainerApp(spec) => Some(&spec.resource_group_name),
        }
    }

    /// Wait for every deferred input and render the resource's properties
    pub async fn properties(&self) -> Result<Value> {
        dispatch!(self, spec => spec.properties().await)
    }
}

/// A fully resolved resource, as it would be sent to the engine
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ResourceManifest {
    /// Provider type token
    pub type_token: String,
    /// Logical name
    pub name: String,
    /// Physical name after auto-naming
    pub physical_name: String,
    /// Cloud identifier
    pub id: String,
    /// Resolved properties
    pub properties: Value,
}

impl ResourceManifest {
    /// Serialize the manifest to YAML
    pub fn to_yaml(&self) -> Result<String> {
        serde_yaml::to_string(self)
            .map_err(|e| Error::serialization_for_kind(&self.type_token, e.to_string()))
    }

    /// The `tags` property, if present
    pub fn tags(&self) -> Option<&Value> {
        self.properties.get("tags")
    }
}

/// Convert a serializable value to JSON, tagging failures with the resource kind
pub(crate) fn to_json<T: Serialize>(kind: ResourceKind, value: &T) -> Result<Value> {
    serde_json::to_value(value)
        .map_err(|e| Error::serialization_for_kind(kind.type_token(), e.to_string()))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn directory_objects_have_no_arm_type() {
        for kind in [
            ResourceKind::Application,
            ResourceKind::ServicePrincipal,
            ResourceKind::ServicePrincipalPassword,
        ] {
            assert_eq!(kind.arm_type(), None);
            assert!(kind.type_token().starts_with("azuread:"));
        }
        assert_eq!(
            ResourceKind::ManagedCluster.arm_type(),
            Some("Microsoft.ContainerService/managedClusters")
        );
    }

    #[test]
    fn only_directory_objects_use_tag_lists() {
        assert!(ResourceKind::Application.uses_tag_list());
        assert!(ResourceKind::ServicePrincipal.uses_tag_list());
        assert!(!ResourceKind::ResourceGroup.uses_tag_list());
        assert!(!ResourceKind::ManagedCluster.uses_tag_list());
    }

    #[test]
    fn manifest_renders_yaml_in_camel_case() {
        let manifest = ResourceManifest {
            type_token: ResourceKind::ResourceGroup.type_token().to_string(),
            name: "ummati-northeurope-test-".to_string(),
            physical_name: "ummati-northeurope-test-1a2b3c4d".to_string(),
            id: "/subscriptions/preview/resourceGroups/ummati-northeurope-test-1a2b3c4d".to_string(),
            properties: serde_json::json!({"location": "northeurope"}),
        };
        let yaml = manifest.to_yaml().unwrap();
        assert!(yaml.contains("typeToken: azure-native:resources:ResourceGroup"));
        assert!(yaml.contains("physicalName: ummati-northeurope-test-1a2b3c4d"));
    }
}
