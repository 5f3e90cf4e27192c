//! Resource tags
//!
//! Every resource carries the same three tags. Azure resources take them as a
//! map; directory (identity) resources only accept a list of `Name=value`
//! strings, in the fixed order below.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::settings::Settings;
use crate::Result;

/// Tag naming the application
pub const APPLICATION: &str = "Application";
/// Tag naming the environment
pub const ENVIRONMENT: &str = "Environment";
/// Tag naming the location
pub const LOCATION: &str = "Location";

/// The tags applied to a resource
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct Tags {
    /// Application name
    pub application: String,
    /// Environment name
    pub environment: String,
    /// Location of the tagged resource
    pub location: String,
}

impl Tags {
    /// Create tags from explicit values
    pub fn new(
        application: impl Into<String>,
        environment: impl Into<String>,
        location: impl Into<String>,
    ) -> Self {
        Self {
            application: application.into(),
            environment: environment.into(),
            location: location.into(),
        }
    }

    /// Tags for a resource in `location`, reading application and environment
    pub fn from_settings(settings: &dyn Settings, location: &str) -> Result<Self> {
        Ok(Self::new(
            settings.application_name()?,
            settings.environment()?,
            location,
        ))
    }

    /// Tags as a map, for Azure resources
    pub fn to_map(&self) -> BTreeMap<String, String> {
        self.pairs()
            .into_iter()
            .map(|(name, value)| (name.to_string(), value.to_string()))
            .collect()
    }

    /// Tags as ordered `Name=value` strings, for directory resources
    pub fn to_list(&self) -> Vec<String> {
        self.pairs()
            .into_iter()
            .map(|(name, value)| format!("{name}={value}"))
            .collect()
    }

    fn pairs(&self) -> [(&'static str, &str); 3] {
        [
            (APPLICATION, &self.application),
            (ENVIRONMENT, &self.environment),
            (LOCATION, &self.location),
        ]
    }
}
