//! Container Apps resources
//!
//! Each location runs the application image as a container app inside a
//! managed environment that ships logs to the shared workspace.

use serde_json::{json, Value};
use ummati_common::tags::Tags;
use ummati_common::Result;

use crate::output::Output;
use crate::secret::Secret;

/// Port the container listens on
pub const TARGET_PORT: u16 = 80;

/// Name of the HTTP scale rule
pub const HTTP_SCALE_RULE: &str = "http-requests";

/// Container Apps environment
#[derive(Clone, Debug)]
pub struct ManagedEnvironmentSpec {
    /// Logical name
    pub name: String,
    /// Azure location
    pub location: String,
    /// Resource group holding the environment
    pub resource_group_name: Output<String>,
    /// Customer id of the Log Analytics workspace
    pub workspace_customer_id: Output<String>,
    /// Shared key of the Log Analytics workspace
    pub workspace_shared_key: Output<Secret>,
    /// Resource tags
    pub tags: Tags,
}

impl ManagedEnvironmentSpec {
    pub(crate) async fn properties(&self) -> Result<Value> {
        let resource_group_name = self.resource_group_name.get().await?;
        let customer_id = self.workspace_customer_id.get().await?;
        let shared_key = self.workspace_shared_key.get().await?;
        Ok(json!({
            "appLogsConfiguration": {
                "destination": "log-analytics",
                "logAnalyticsConfiguration": {
                    "customerId": customer_id,
                    "sharedKey": shared_key,
                },
            },
            "location": self.location,
            "resourceGroupName": resource_group_name,
            "tags": self.tags.to_map(),
        }))
    }
}

/// Container app running the application image
#[derive(Clone, Debug)]
pub struct ContainerAppSpec {
    /// Logical name
    pub name: String,
    /// Azure location
    pub location: String,
    /// Resource group holding the app
    pub resource_group_name: Output<String>,
    /// Id of the managed environment
    pub managed_environment_id: Output<String>,
    /// Container image
    pub image: String,
    /// CPU cores
    pub cpu: f64,
    /// Memory, e.g. `1Gi`
    pub memory: String,
    /// Minimum replicas
    pub min_replicas: i32,
    /// Maximum replicas
    pub max_replicas: i32,
    /// Concurrent requests per replica before scaling out
    pub concurrent_requests: i32,
    /// Resource tags
    pub tags: Tags,
}

impl ContainerAppSpec {
    pub(crate) async fn properties(&self) -> Result<Value> {
        let resource_group_name = self.resource_group_name.get().await?;
        let managed_environment_id = self.managed_environment_id.get().await?;
        Ok(json!({
            "configuration": {
                "ingress": {
                    "external": true,
                    "targetPort": TARGET_PORT,
                },
            },
            "location": self.location,
            "managedEnvironmentId": managed_environment_id,
            "resourceGroupName": resource_group_name,
            "tags": self.tags.to_map(),
            "template": {
                "containers": [{
                    "image": self.image,
                    "name": "application",
                    "resources": {
                        "cpu": self.cpu,
                        "memory": self.memory,
                    },
                }],
                "scale": {
                    "maxReplicas": self.max_replicas,
                    "minReplicas": self.min_replicas,
                    "rules": [{
                        "custom": {
                            "metadata": {
                                "concurrentRequests": self.concurrent_requests.to_string(),
                            },
                            "type": "http",
                        },
                        "name": HTTP_SCALE_RULE,
                    }],
                },
            },
        }))
    }
}
