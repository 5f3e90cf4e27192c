use serde_json::{json, Value};
use ummati_common::tags::Tags;
use ummati_common::Result;

use crate::output::Output;

/// Pricing tier for the shared workspace
pub const WORKSPACE_SKU: &str = "PerGB2018";

/// Days of log retention
pub const WORKSPACE_RETENTION_DAYS: u32 = 30;

/// Log Analytics workspace shared by every location
#[derive(Clone, Debug)]
pub struct LogAnalyticsWorkspaceSpec {
    /// Logical name
    pub name: String,
    /// Azure location
    pub location: String,
    /// Resource group holding the workspace
    pub resource_group_name: Output<String>,
    /// Resource tags
    pub tags: Tags,
}

impl LogAnalyticsWorkspaceSpec {
    pub(crate) async fn properties(&self) -> Result<Value> {
        let resource_group_name = self.resource_group_name.get().await?;
        Ok(json!({
            "location": self.location,
            "resourceGroupName": resource_group_name,
            "retentionInDays": WORKSPACE_RETENTION_DAYS,
            "sku": { "name": WORKSPACE_SKU },
            "tags": self.tags.to_map(),
        }))
    }
}
