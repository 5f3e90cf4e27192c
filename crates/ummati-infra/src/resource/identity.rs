//! Azure AD objects backing a cluster's service principal
//!
//! Directory objects only take tags as `Name=value` strings.

use serde_json::{json, Value};
use ummati_common::tags::Tags;
use ummati_common::Result;

use crate::output::Output;

/// Azure AD application
#[derive(Clone, Debug)]
pub struct ApplicationSpec {
    /// Logical name
    pub name: String,
    /// Display name shown in the directory
    pub display_name: String,
    /// Resource tags
    pub tags: Tags,
}

impl ApplicationSpec {
    pub(crate) async fn properties(&self) -> Result<Value> {
        Ok(json!({
            "displayName": self.display_name,
            "tags": self.tags.to_list(),
        }))
    }
}

/// Service principal for an application
#[derive(Clone, Debug)]
pub struct ServicePrincipalSpec {
    /// Logical name
    pub name: String,
    /// Client id of the application
    pub application_id: Output<String>,
    /// Resource tags
    pub tags: Tags,
}

impl ServicePrincipalSpec {
    pub(crate) async fn properties(&self) -> Result<Value> {
        let application_id = self.application_id.get().await?;
        Ok(json!({
            "applicationId": application_id,
            "tags": self.tags.to_list(),
        }))
    }
}

/// Client secret for a service principal
#[derive(Clone, Debug)]
pub struct ServicePrincipalPasswordSpec {
    /// Logical name
    pub name: String,
    /// Object id of the service principal
    pub service_principal_id: Output<String>,
    /// RFC 3339 expiry, or `None` for the provider default
    pub end_date: Option<String>,
}

impl ServicePrincipalPasswordSpec {
    pub(crate) async fn properties(&self) -> Result<Value> {
        let service_principal_id = self.service_principal_id.get().await?;
        let mut properties = json!({ "servicePrincipalId": service_principal_id });
        if let Some(end_date) = &self.end_date {
            properties["endDate"] = json!(end_date);
        }
        Ok(properties)
    }
}
