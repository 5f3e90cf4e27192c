use tracing::info;
use ummati_common::settings::Settings;
use ummati_common::tags::Tags;
use ummati_common::Result;

use super::{require_argument, IdentityResource, VirtualNetworkResource};
use crate::kubeconfig::decode_kubeconfig;
use crate::output::Output;
use crate::provisioner::{ListCredentialsRequest, Provisioner, RegisteredResource};
use crate::resource::maintenance::build_maintenance_spec;
use crate::resource::node_pool::build_node_pool_specs;
use crate::resource::{
    MaintenanceConfigurationSpec, ManagedClusterSpec, NodePoolTarget, ResourceSpec,
};
use crate::secret::Secret;

/// AKS cluster of one location, with its node pools and maintenance windows
#[derive(Clone, Debug)]
pub struct KubernetesResource {
    /// Component name
    pub name: String,
    /// Azure location
    pub location: String,
    /// The managed cluster
    pub cluster: RegisteredResource,
    /// Planned maintenance configuration of the cluster
    pub maintenance: RegisteredResource,
    /// Decoded user kubeconfig; empty in disconnected runs
    pub kubeconfig: Output<Secret>,
}

impl KubernetesResource {
    /// Register the cluster and everything it depends on
    ///
    /// Placement groups for the user pools are registered first, then the
    /// cluster, then its maintenance configuration.
    pub fn new(
        name: &str,
        location: &str,
        settings: &dyn Settings,
        resource_group: &RegisteredResource,
        identity: &IdentityResource,
        network: &VirtualNetworkResource,
        provisioner: &dyn Provisioner,
    ) -> Result<Self> {
        require_argument("name", name)?;
        require_argument("location", location)?;

        let application = settings.application_name()?;
        let environment = settings.environment()?;
        let tags = Tags::new(&application, &environment, location);

        let target = NodePoolTarget {
            location: location.to_string(),
            resource_group_name: resource_group.name.clone(),
            vnet_subnet_id: network.subnet_id.clone(),
        };
        let upgrade_channel = settings.kubernetes_upgrade_channel()?;
        let sku_tier = settings.kubernetes_sku_tier()?;
        let window = build_maintenance_spec(settings)?;
        let node_pools = build_node_pool_specs(settings, &target, provisioner)?;
        let pool_count = node_pools.len();

        let cluster = provisioner.create_or_update(ResourceSpec::ManagedCluster(ManagedClusterSpec {
            name: format!("kubernetes-{location}-{environment}-"),
            location: location.to_string(),
            resource_group_name: resource_group.name.clone(),
            node_resource_group: format!("{application}-kubernetesnodes-{location}-{environment}"),
            node_pools,
            upgrade_channel,
            sku_tier,
            client_id: identity.client_id(),
            client_secret: identity.client_secret(),
            tags,
        }))?;

        let maintenance = provisioner.create_or_update(ResourceSpec::MaintenanceConfiguration(
            MaintenanceConfigurationSpec {
                name: format!("maintenanceconfiguration-{location}-{environment}"),
                resource_group_name: resource_group.name.clone(),
                resource_name: cluster.name.clone(),
                window,
            },
        ))?;

        let credentials = provisioner.list_credentials(ListCredentialsRequest {
            resource_group_name: resource_group.name.clone(),
            resource_name: cluster.name.clone(),
        });

        info!(
            component = %name,
            location = %location,
            node_pools = pool_count,
            "registered kubernetes cluster"
        );
        Ok(Self {
            name: name.to_string(),
            location: location.to_string(),
            cluster,
            maintenance,
            kubeconfig: decode_kubeconfig(credentials),
        })
    }
}

#[cfg(test)]
mod tests {
    use base64::engine::general_purpose::STANDARD;
    use base64::Engine;
    use ummati_common::config::MemoryStore;
    use ummati_common::settings::{keys, sample_store, NodePoolRole, StackSettings};
    use ummati_common::Error;

    use super::*;
    use crate::preview::PreviewProvisioner;
    use crate::provisioner::{CredentialList, CredentialResult, MockProvisioner};
    use crate::resource::{ResourceGroupSpec, ResourceKind};

    struct Fixture {
        settings: StackSettings<MemoryStore>,
        resource_group: RegisteredResource,
        identity: IdentityResource,
        network: VirtualNetworkResource,
    }

    fn fixture(provisioner: &PreviewProvisioner) -> Fixture {
        let settings = StackSettings::new(sample_store());
        let resource_group = provisioner
            .create_or_update(ResourceSpec::ResourceGroup(ResourceGroupSpec::new(
                "ummati",
                "northeurope",
                "test",
                Tags::new("ummati", "test", "northeurope"),
            )))
            .unwrap();
        let identity = IdentityResource::new("identity", "northeurope", &settings, provisioner).unwrap();
        let network = VirtualNetworkResource::new(
            "network",
            "northeurope",
            &settings,
            &resource_group,
            provisioner,
        )
        .unwrap();
        Fixture {
            settings,
            resource_group,
            identity,
            network,
        }
    }

    fn kubernetes(
        name: &str,
        location: &str,
        fixture: &Fixture,
        provisioner: &dyn Provisioner,
    ) -> Result<KubernetesResource> {
        KubernetesResource::new(
            name,
            location,
            &fixture.settings,
            &fixture.resource_group,
            &fixture.identity,
            &fixture.network,
            provisioner,
        )
    }

    #[test]
    fn empty_name_or_location_registers_nothing() {
        let provisioner = PreviewProvisioner::default();
        let fixture = fixture(&provisioner);
        let before = provisioner.registrations().len();

        for (name, location, argument) in [("", "northeurope", "name"), ("kubernetes", "", "location")] {
            match kubernetes(name, location, &fixture, &provisioner).unwrap_err() {
                Error::ArgumentInvalid { argument: got, .. } => assert_eq!(got, argument),
                other => panic!("Expected ArgumentInvalid, got {other:?}"),
            }
        }
        assert_eq!(provisioner.registrations().len(), before);
    }

    /// Story: placement groups come first, then the cluster, then maintenance
    #[test]
    fn story_registration_order() {
        let provisioner = PreviewProvisioner::default();
        let fixture = fixture(&provisioner);
        let before = provisioner.registrations().len();

        kubernetes("kubernetes", "northeurope", &fixture, &provisioner).unwrap();

        let added: Vec<_> = provisioner.registrations().into_iter().skip(before).collect();
        let kinds: Vec<_> = added.iter().map(|(_, kind)| *kind).collect();
        assert_eq!(
            kinds,
            vec![
                ResourceKind::ProximityPlacementGroup,
                ResourceKind::ProximityPlacementGroup,
                ResourceKind::ManagedCluster,
                ResourceKind::MaintenanceConfiguration,
            ]
        );
        assert_eq!(added[2].0, "kubernetes-northeurope-test-");
        assert_eq!(added[3].0, "maintenanceconfiguration-northeurope-test");
        assert_eq!(provisioner.credential_requests(), 1);
    }

    #[tokio::test]
    async fn disconnected_kubeconfig_is_empty() {
        let provisioner = PreviewProvisioner::default();
        let fixture = fixture(&provisioner);
        let resource = kubernetes("kubernetes", "northeurope", &fixture, &provisioner).unwrap();
        assert!(resource.kubeconfig.get().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn cluster_manifest_carries_pools_and_node_resource_group() {
        let provisioner = PreviewProvisioner::default();
        let fixture = fixture(&provisioner);
        kubernetes("kubernetes", "northeurope", &fixture, &provisioner).unwrap();

        let manifests = provisioner.finish().await.unwrap();
        let cluster = manifests
            .iter()
            .find(|m| m.type_token == ResourceKind::ManagedCluster.type_token())
            .expect("cluster manifest");
        let pools = cluster.properties["agentPoolProfiles"].as_array().unwrap();
        let names: Vec<_> = pools.iter().map(|p| p["name"].as_str().unwrap()).collect();
        assert_eq!(names, vec!["system", "user1", "user2"]);
        assert_eq!(
            cluster.properties["nodeResourceGroup"],
            "ummati-kubernetesnodes-northeurope-test"
        );
        assert!(pools
            .iter()
            .all(|p| p["vnetSubnetID"].as_str().unwrap().ends_with("/subnets/kubernetes")));
    }

    #[test]
    fn missing_user_zone_setting_fails() {
        let provisioner = PreviewProvisioner::default();
        let mut fixture = fixture(&provisioner);
        let mut store = sample_store();
        store.remove(&NodePoolRole::User.key(keys::node_pool::AVAILABILITY_ZONES));
        fixture.settings = StackSettings::new(store);

        let err = kubernetes("kubernetes", "northeurope", &fixture, &provisioner).unwrap_err();
        assert_eq!(err.key(), Some("KubernetesUserNodesAvailabilityZones"));
    }

    #[test]
    fn bad_maintenance_slot_registers_no_placement_group() {
        let provisioner = PreviewProvisioner::default();
        let mut fixture = fixture(&provisioner);
        fixture.settings = StackSettings::new(
            sample_store().with_list(keys::KUBERNETES_MAINTENANCE_HOUR_SLOTS, ["25"]),
        );
        let before = provisioner.registrations().len();

        let err = kubernetes("kubernetes", "northeurope", &fixture, &provisioner).unwrap_err();
        assert!(matches!(err, Error::ConfigurationOutOfRange { .. }));
        assert_eq!(provisioner.registrations().len(), before);
    }

    #[tokio::test]
    async fn kubeconfig_is_decoded_from_engine_credentials() {
        let preview = PreviewProvisioner::default();
        let fixture = fixture(&preview);

        let mut provisioner = MockProvisioner::new();
        provisioner
            .expect_create_or_update()
            .returning(|spec| {
                Ok(RegisteredResource::known(
                    spec.name(),
                    spec.kind(),
                    format!("/id/{}", spec.name()),
                    spec.name(),
                ))
            });
        provisioner.expect_list_credentials().times(1).returning(|_| {
            Output::known(CredentialList {
                kubeconfigs: Some(vec![CredentialResult {
                    name: "clusterUser".to_string(),
                    value: STANDARD.encode("apiVersion: v1"),
                }]),
            })
        });

        let resource = kubernetes("kubernetes", "northeurope", &fixture, &provisioner).unwrap();
        assert_eq!(resource.kubeconfig.get().await.unwrap().expose(), "apiVersion: v1");
    }
}
