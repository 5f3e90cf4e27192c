//! In-process provisioner for disconnected runs
//!
//! [`PreviewProvisioner`] stands in for the engine when there is no cloud to
//! talk to: it records registrations in order, enforces unique logical names,
//! makes up deterministic names, ids and computed outputs, and answers
//! credential calls with an absent list. [`PreviewProvisioner::finish`]
//! resolves every recorded spec into a [`ResourceManifest`].

use std::collections::BTreeSet;

use futures::future::try_join_all;
use parking_lot::Mutex;
use serde_json::{Map, Value};
use sha2::{Digest, Sha256};
use tracing::{debug, info};
use ummati_common::{Error, Result};

use crate::output::Output;
use crate::provisioner::{CredentialList, ListCredentialsRequest, Provisioner, RegisteredResource};
use crate::resource::{ResourceKind, ResourceManifest, ResourceSpec};

/// Subscription id used in preview resource ids
pub const PREVIEW_SUBSCRIPTION: &str = "preview";

/// Length of the suffix appended to auto-named resources
const AUTO_NAME_SUFFIX_LEN: usize = 8;

/// Compute a deterministic hex digest of `input`
///
/// Uses SHA-256 so names stay stable across toolchains and runs.
fn deterministic_hash(input: &str) -> String {
    hex::encode(Sha256::digest(input.as_bytes()))
}

/// Physical name for a logical name; a trailing `-` gets a suffix
pub fn physical_name(logical_name: &str) -> String {
    if logical_name.ends_with('-') {
        let hash = deterministic_hash(logical_name);
        format!("{logical_name}{}", &hash[..AUTO_NAME_SUFFIX_LEN])
    } else {
        logical_name.to_string()
    }
}

#[derive(Clone, Debug)]
struct Registration {
    physical_name: String,
    id: Output<String>,
    spec: ResourceSpec,
}

#[derive(Debug, Default)]
struct PreviewState {
    names: BTreeSet<String>,
    registrations: Vec<Registration>,
    credential_requests: usize,
}

/// Records registrations and renders them without touching the cloud
#[derive(Debug)]
pub struct PreviewProvisioner {
    subscription_id: String,
    state: Mutex<PreviewState>,
}

impl Default for PreviewProvisioner {
    fn default() -> Self {
        Self::new(PREVIEW_SUBSCRIPTION)
    }
}

impl PreviewProvisioner {
    /// Create a provisioner that places resources in `subscription_id`
    pub fn new(subscription_id: impl Into<String>) -> Self {
        Self {
            subscription_id: subscription_id.into(),
            state: Mutex::new(PreviewState::default()),
        }
    }

    /// Logical names and kinds of every registration, in order
    pub fn registrations(&self) -> Vec<(String, ResourceKind)> {
        self.state
            .lock()
            .registrations
            .iter()
            .map(|r| (r.spec.name().to_string(), r.spec.kind()))
            .collect()
    }

    /// Number of list-credentials calls answered
    pub fn credential_requests(&self) -> usize {
        self.state.lock().credential_requests
    }

    /// Resolve every registered spec into its manifest, in registration order
    pub async fn finish(&self) -> Result<Vec<ResourceManifest>> {
        let registrations = self.state.lock().registrations.clone();
        let manifests = try_join_all(registrations.iter().map(render)).await?;
        info!(resources = manifests.len(), "preview complete");
        Ok(manifests)
    }

    fn id_for(&self, spec: &ResourceSpec, physical_name: &str) -> Output<String> {
        let subscription = self.subscription_id.clone();
        let physical_name = physical_name.to_string();
        let kind = spec.kind();
        match (kind.arm_type(), spec.resource_group_name()) {
            (Some(_), None) => Output::known(format!(
                "/subscriptions/{subscription}/resourceGroups/{physical_name}"
            )),
            (Some(arm_type), Some(resource_group)) => resource_group.map(move |group| {
                format!(
                    "/subscriptions/{subscription}/resourceGroups/{group}/providers/{arm_type}/{physical_name}"
                )
            }),
            (None, _) => Output::known(directory_object_id(&physical_name)),
        }
    }
}

/// A GUID-shaped id for Azure AD objects
fn directory_object_id(physical_name: &str) -> String {
    let hash = deterministic_hash(physical_name);
    format!(
        "{}-{}-{}-{}-{}",
        &hash[0..8],
        &hash[8..12],
        &hash[12..16],
        &hash[16..20],
        &hash[20..32]
    )
}

fn computed_outputs(kind: ResourceKind, physical_name: &str) -> Value {
    let outputs: Map<String, Value> = kind
        .computed_outputs()
        .iter()
        .map(|key| {
            let value = directory_object_id(&format!("{physical_name}/{key}"));
            (key.to_string(), Value::String(value))
        })
        .collect();
    Value::Object(outputs)
}

async fn render(registration: &Registration) -> Result<ResourceManifest> {
    let spec = &registration.spec;
    let id = registration.id.get().await?;
    let properties = spec.properties().await?;
    Ok(ResourceManifest {
        type_token: spec.kind().type_token().to_string(),
        name: spec.name().to_string(),
        physical_name: registration.physical_name.clone(),
        id,
        properties,
    })
}

impl Provisioner for PreviewProvisioner {
    fn create_or_update(&self, spec: ResourceSpec) -> Result<RegisteredResource> {
        let logical_name = spec.name().to_string();
        let kind = spec.kind();
        let physical_name = physical_name(&logical_name);
        let id = self.id_for(&spec, &physical_name);

        let mut state = self.state.lock();
        if !state.names.insert(logical_name.clone()) {
            return Err(Error::duplicate(logical_name));
        }
        state.registrations.push(Registration {
            physical_name: physical_name.clone(),
            id: id.clone(),
            spec,
        });
        drop(state);

        debug!(name = %logical_name, kind = %kind, physical_name = %physical_name, "registered resource");
        Ok(RegisteredResource::new(
            logical_name,
            kind,
            id,
            Output::known(physical_name.clone()),
            Output::known(computed_outputs(kind, &physical_name)),
        ))
    }

    fn list_credentials(&self, _request: ListCredentialsRequest) -> Output<CredentialList> {
        self.state.lock().credential_requests += 1;
        debug!("answering list-credentials with an absent list");
        Output::known(CredentialList::default())
    }
}

#[cfg(test)]
mod tests {
    use ummati_common::tags::Tags;

    use super::*;
    use crate::resource::{ProximityPlacementGroupSpec, ResourceGroupSpec};

    fn group_spec(location: &str) -> ResourceSpec {
        ResourceSpec::ResourceGroup(ResourceGroupSpec::new(
            "ummati",
            location,
            "test",
            Tags::new("ummati", "test", location),
        ))
    }

    #[test]
    fn auto_names_get_a_stable_suffix() {
        let first = physical_name("kubernetes-northeurope-test-");
        assert_eq!(first.len(), "kubernetes-northeurope-test-".len() + 8);
        assert!(first.starts_with("kubernetes-northeurope-test-"));
        assert_eq!(first, physical_name("kubernetes-northeurope-test-"));
        assert_ne!(first, physical_name("kubernetes-canadacentral-test-"));
    }

    #[test]
    fn fixed_names_are_kept() {
        assert_eq!(
            physical_name("maintenanceconfiguration-northeurope-test"),
            "maintenanceconfiguration-northeurope-test"
        );
    }

    #[test]
    fn duplicate_logical_names_are_rejected() {
        let provisioner = PreviewProvisioner::default();
        provisioner.create_or_update(group_spec("northeurope")).unwrap();

        let err = provisioner
            .create_or_update(group_spec("northeurope"))
            .unwrap_err();
        assert_eq!(err, Error::duplicate("ummati-northeurope-test-"));
        assert!(!err.is_retryable());
        assert_eq!(provisioner.registrations().len(), 1);
    }

    #[tokio::test]
    async fn ids_follow_the_arm_layout() {
        let provisioner = PreviewProvisioner::new("sub");
        let group = provisioner.create_or_update(group_spec("northeurope")).unwrap();
        let group_name = group.name.get().await.unwrap();
        assert_eq!(
            group.id.get().await.unwrap(),
            format!("/subscriptions/sub/resourceGroups/{group_name}")
        );

        let placement = provisioner
            .create_or_update(ResourceSpec::ProximityPlacementGroup(
                ProximityPlacementGroupSpec {
                    name: "proximityplacementgroup1-northeurope-test-".to_string(),
                    location: "northeurope".to_string(),
                    resource_group_name: group.name.clone(),
                    tags: Tags::new("ummati", "test", "northeurope"),
                },
            ))
            .unwrap();
        let id = placement.id.get().await.unwrap();
        assert!(id.starts_with(&format!(
            "/subscriptions/sub/resourceGroups/{group_name}/providers/Microsoft.Compute/proximityPlacementGroups/proximityplacementgroup1-northeurope-test-"
        )));
    }

    #[tokio::test]
    async fn credentials_are_absent() {
        let provisioner = PreviewProvisioner::default();
        let list = provisioner
            .list_credentials(ListCredentialsRequest {
                resource_group_name: Output::known("rg".to_string()),
                resource_name: Output::known("cluster".to_string()),
            })
            .get()
            .await
            .unwrap();
        assert_eq!(list.kubeconfigs, None);
        assert_eq!(provisioner.credential_requests(), 1);
    }

    #[tokio::test]
    async fn finish_renders_in_registration_order() {
        let provisioner = PreviewProvisioner::default();
        provisioner.create_or_update(group_spec("northeurope")).unwrap();
        provisioner.create_or_update(group_spec("canadacentral")).unwrap();

        let manifests = provisioner.finish().await.unwrap();
        let names: Vec<_> = manifests.iter().map(|m| m.name.as_str()).collect();
        assert_eq!(names, vec!["ummati-northeurope-test-", "ummati-canadacentral-test-"]);
        assert_eq!(manifests[1].properties["location"], "canadacentral");
        assert_eq!(manifests[0].type_token, "azure-native:resources:ResourceGroup");
    }

    #[test]
    fn computed_outputs_are_filled() {
        let outputs = computed_outputs(ResourceKind::LogAnalyticsWorkspace, "workspace-abc");
        assert!(outputs["customerId"].is_string());
        assert!(outputs["primarySharedKey"].is_string());
        assert_eq!(computed_outputs(ResourceKind::ResourceGroup, "rg"), Value::Object(Map::new()));
    }
}
