use serde_json::{json, Value};
use ummati_common::tags::Tags;
use ummati_common::Result;

/// Resource group holding one location's resources
#[derive(Clone, Debug)]
pub struct ResourceGroupSpec {
    /// Logical name
    pub name: String,
    /// Azure location
    pub location: String,
    /// Resource tags
    pub tags: Tags,
}

impl ResourceGroupSpec {
    /// Resource group named `{app}-{location}-{env}-`
    pub fn new(application: &str, location: &str, environment: &str, tags: Tags) -> Self {
        Self::named(format!("{application}-{location}-{environment}-"), location, tags)
    }

    /// Resource group with an explicit logical name
    pub fn named(name: impl Into<String>, location: &str, tags: Tags) -> Self {
        Self {
            name: name.into(),
            location: location.to_string(),
            tags,
        }
    }

    pub(crate) async fn properties(&self) -> Result<Value> {
        Ok(json!({
            "location": self.location,
            "tags": self.tags.to_map(),
        }))
    }
}
