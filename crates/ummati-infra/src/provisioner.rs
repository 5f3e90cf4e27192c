//! Boundary to the resource-provisioning engine
//!
//! The engine owns graph construction, diffing and cloud API calls. This crate
//! only hands it resource specs through [`Provisioner`] and gets back deferred
//! handles to the values it will compute.

use std::fmt;

#[cfg(test)]
use mockall::automock;
use serde::Deserialize;
use serde_json::Value;

use crate::output::Output;
use crate::resource::{ResourceKind, ResourceSpec};
use crate::secret::Secret;
use ummati_common::{Error, Result};

/// A resource the engine has accepted
#[derive(Clone, Debug)]
pub struct RegisteredResource {
    /// Logical name the resource was registered under
    pub logical_name: String,
    /// Kind of resource
    pub kind: ResourceKind,
    /// Cloud identifier
    pub id: Output<String>,
    /// Physical (possibly auto-named) name
    pub name: Output<String>,
    /// Values computed by the engine, keyed by property name
    pub outputs: Output<Value>,
}

impl RegisteredResource {
    /// Create a handle from its deferred parts
    pub fn new(
        logical_name: impl Into<String>,
        kind: ResourceKind,
        id: Output<String>,
        name: Output<String>,
        outputs: Output<Value>,
    ) -> Self {
        Self {
            logical_name: logical_name.into(),
            kind,
            id,
            name,
            outputs,
        }
    }

    /// A handle whose values are already known, without computed outputs
    pub fn known(
        logical_name: impl Into<String>,
        kind: ResourceKind,
        id: impl Into<String>,
        name: impl Into<String>,
    ) -> Self {
        Self::new(
            logical_name,
            kind,
            Output::known(id.into()),
            Output::known(name.into()),
            Output::known(Value::Object(Default::default())),
        )
    }

    /// A computed string output
    ///
    /// Resolves to a provisioning error if the engine did not return `key`.
    pub fn output(&self, key: &str) -> Output<String> {
        let key = key.to_string();
        let resource = self.logical_name.clone();
        self.outputs.apply(move |outputs| {
            outputs
                .get(&key)
                .and_then(Value::as_str)
                .map(str::to_string)
                .ok_or_else(|| Error::provisioning(resource, format!("output '{key}' not available")))
        })
    }

    /// A computed output that holds a secret
    pub fn secret_output(&self, key: &str) -> Output<Secret> {
        self.output(key).map(Secret::new)
    }
}

/// Arguments for listing a managed cluster's user credentials
#[derive(Clone, Debug)]
pub struct ListCredentialsRequest {
    /// Resource group holding the cluster
    pub resource_group_name: Output<String>,
    /// Physical name of the cluster
    pub resource_name: Output<String>,
}

/// A cluster's user credentials
///
/// `kubeconfigs` is `None` when the engine runs disconnected (previews and
/// tests) and has nothing to return.
#[derive(Clone, Debug, Default, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct CredentialList {
    /// Base64-encoded kubeconfig files
    #[serde(default)]
    pub kubeconfigs: Option<Vec<CredentialResult>>,
}

/// One named credential
#[derive(Clone, Deserialize, PartialEq, Eq)]
pub struct CredentialResult {
    /// Credential name, e.g. `clusterUser`
    pub name: String,
    /// Base64-encoded value
    pub value: String,
}

impl fmt::Debug for CredentialResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialResult")
            .field("name", &self.name)
            .field("value", &crate::secret::REDACTED)
            .finish()
    }
}

/// The provisioning engine
///
/// Registration is synchronous: the engine records the spec and hands back
/// deferred handles immediately. Values behind those handles resolve later.
#[cfg_attr(test, automock)]
pub trait Provisioner: Send + Sync {
    /// Register (create or update) a resource
    ///
    /// Fails with [`Error::DuplicateResource`] if the logical name was already
    /// registered in this run.
    fn create_or_update(&self, spec: ResourceSpec) -> Result<RegisteredResource>;

    /// Invoke the list-user-credentials function for a managed cluster
    fn list_credentials(&self, request: ListCredentialsRequest) -> Output<CredentialList>;
}
