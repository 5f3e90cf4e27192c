//! CLI commands

use std::path::PathBuf;

use clap::Args;
use tracing::debug;
use ummati_common::config::stack_file::{self, DEFAULT_PROJECT};
use ummati_common::config::MemoryStore;

use crate::Result;

pub mod preview;
pub mod validate;

/// Where configuration is read from
#[derive(Args, Debug, Clone)]
pub struct StackSource {
    /// Pulumi-style stack file; reads UMMATI_CONFIG from the environment if omitted
    #[arg(long)]
    pub stack_file: Option<PathBuf>,

    /// Project namespace of the stack file's configuration keys
    #[arg(long, default_value = DEFAULT_PROJECT)]
    pub project: String,
}

impl StackSource {
    /// Load the configuration store
    pub fn load(&self) -> Result<MemoryStore> {
        let store = match &self.stack_file {
            Some(path) => stack_file::load(path, &self.project)?,
            None => {
                debug!("no stack file given, reading configuration from the environment");
                MemoryStore::from_env()?
            }
        };
        Ok(store)
    }
}

#[cfg(test)]
pub(crate) mod test_support {
    use std::path::{Path, PathBuf};

    use ummati_common::config::ConfigStore;
    use ummati_common::settings::sample_store;

    /// Write the sample configuration as a stack file, with `overrides` applied
    pub fn write_stack_file(dir: &Path, overrides: &[(&str, &str)]) -> PathBuf {
        let mut store = sample_store();
        for (key, value) in overrides {
            store.insert(*key, *value);
        }

        let mut yaml = String::from("config:\n  azure-native:location: northeurope\n");
        for key in store.keys() {
            let value = store.get(key).unwrap_or_default();
            yaml.push_str(&format!("  ummati:{key}: '{value}'\n"));
        }

        let path = dir.join("Pulumi.test.yaml");
        std::fs::write(&path, yaml).unwrap();
        path
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ummati_common::config::ConfigStore;

    #[test]
    fn loads_project_keys_from_stack_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = test_support::write_stack_file(dir.path(), &[]);
        let source = StackSource {
            stack_file: Some(path),
            project: DEFAULT_PROJECT.to_string(),
        };

        let store = source.load().unwrap();
        assert_eq!(store.get("ApplicationName").as_deref(), Some("ummati"));
        assert_eq!(
            store.get("Locations").as_deref(),
            Some(r#"["northeurope","canadacentral"]"#)
        );
        assert_eq!(store.get("location"), None);
    }

    #[test]
    fn missing_stack_file_is_reported() {
        let source = StackSource {
            stack_file: Some(PathBuf::from("/nonexistent/Pulumi.dev.yaml")),
            project: DEFAULT_PROJECT.to_string(),
        };
        let err = source.load().unwrap_err();
        assert!(err.to_string().contains("/nonexistent/Pulumi.dev.yaml"));
    }
}
