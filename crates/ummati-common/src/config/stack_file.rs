//! Pulumi-style stack files
//!
//! A stack file carries a `config:` map whose keys are namespaced by project:
//!
//! ```yaml
//! config:
//!   azure-native:location: northeurope
//!   ummati:ApplicationName: ummati
//!   ummati:Locations:
//!     - northeurope
//!     - canadacentral
//! ```
//!
//! Only keys in the requested project namespace are kept, under their bare
//! name. Keys without a namespace belong to the project. Scalars become
//! strings, sequences become JSON string arrays, and mappings keep their JSON
//! text.

use std::collections::BTreeMap;
use std::path::Path;

use serde::Deserialize;
use tracing::debug;

use super::MemoryStore;
use crate::{Error, Result};

/// Default project namespace for configuration keys
pub const DEFAULT_PROJECT: &str = "ummati";

#[derive(Debug, Default, Deserialize)]
struct StackDocument {
    #[serde(default)]
    config: BTreeMap<String, serde_yaml::Value>,
}

/// Load the project's configuration from a stack file on disk
pub fn load(path: &Path, project: &str) -> Result<MemoryStore> {
    let shown = path.display().to_string();
    let text = std::fs::read_to_string(path).map_err(|e| Error::stack_file(&shown, e.to_string()))?;
    let store = parse(&text, project).map_err(|e| match e {
        Error::Serialization { message, .. } => Error::stack_file(&shown, message),
        other => other,
    })?;
    debug!(path = %shown, keys = store.len(), "loaded stack configuration");
    Ok(store)
}

/// Parse stack file YAML, keeping keys in `project`'s namespace
pub fn parse(yaml: &str, project: &str) -> Result<MemoryStore> {
    let document: StackDocument = serde_yaml::from_str(yaml)
        .map_err(|e| Error::serialization_for_kind("stack file", e.to_string()))?;

    let mut store = MemoryStore::new();
    for (qualified, value) in document.config {
        let key = match qualified.split_once(':') {
            Some((namespace, key)) if namespace == project => key,
            Some(_) => continue,
            None => qualified.as_str(),
        };
        store.insert(key, raw_value(key, value)?);
    }
    Ok(store)
}

fn raw_value(key: &str, value: serde_yaml::Value) -> Result<String> {
    match value {
        serde_yaml::Value::Sequence(items) => {
            let elements = items
                .into_iter()
                .map(|item| scalar(key, item))
                .collect::<Result<Vec<_>>>()?;
            Ok(serde_json::Value::from(elements).to_string())
        }
        serde_yaml::Value::Mapping(_) => serde_json::to_string(&value)
            .map_err(|e| Error::serialization_for_kind(key, e.to_string())),
        other => scalar(key, other),
    }
}

fn scalar(key: &str, value: serde_yaml::Value) -> Result<String> {
    match value {
        serde_yaml::Value::String(s) => Ok(s),
        serde_yaml::Value::Number(n) => Ok(n.to_string()),
        serde_yaml::Value::Bool(b) => Ok(b.to_string()),
        serde_yaml::Value::Null => Ok(String::new()),
        serde_yaml::Value::Tagged(tagged) => scalar(key, tagged.value),
        serde_yaml::Value::Sequence(_) | serde_yaml::Value::Mapping(_) => Err(
            Error::serialization_for_kind(key, "nested collections are not supported"),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConfigStore;

    const STACK: &str = r#"
config:
  azure-native:location: northeurope
  ummati:ApplicationName: ummati
  ummati:ContainerCpu: 0.5
  ummati:KubernetesMaintenanceHourSlots:
    - 1
    - 2
  ummati:Locations:
    - northeurope
    - canadacentral
  Environment: test
"#;

    #[test]
    fn keeps_only_project_keys_under_bare_names() {
        let store = parse(STACK, DEFAULT_PROJECT).expect("stack should parse");
        assert_eq!(store.get("ApplicationName").as_deref(), Some("ummati"));
        assert_eq!(store.get("Environment").as_deref(), Some("test"));
        assert_eq!(store.get("location"), None);
        assert_eq!(store.len(), 5);
    }

    #[test]
    fn sequences_become_json_string_arrays() {
        let store = parse(STACK, DEFAULT_PROJECT).unwrap();
        assert_eq!(
            store.get("Locations").as_deref(),
            Some(r#"["northeurope","canadacentral"]"#)
        );
        assert_eq!(
            store.get("KubernetesMaintenanceHourSlots").as_deref(),
            Some(r#"["1","2"]"#)
        );
    }

    #[test]
    fn numbers_keep_their_text() {
        let store = parse(STACK, DEFAULT_PROJECT).unwrap();
        assert_eq!(store.get("ContainerCpu").as_deref(), Some("0.5"));
    }

    #[test]
    fn other_projects_are_ignored() {
        let store = parse(STACK, "other").unwrap();
        assert_eq!(store.get("ApplicationName"), None);
        assert_eq!(store.get("Environment").as_deref(), Some("test"));
    }

    #[test]
    fn nested_sequences_are_rejected() {
        let yaml = "config:\n  ummati:Zones:\n    - [1, 2]\n";
        let err = parse(yaml, DEFAULT_PROJECT).unwrap_err();
        assert!(matches!(err, Error::Serialization { .. }));
    }

    #[test]
    fn empty_document_has_no_keys() {
        let store = parse("{}", DEFAULT_PROJECT).unwrap();
        assert!(store.is_empty());
    }

    #[test]
    fn load_reads_from_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Pulumi.test.yaml");
        std::fs::write(&path, STACK).unwrap();

        let store = load(&path, DEFAULT_PROJECT).expect("stack file should load");
        assert_eq!(store.get("ApplicationName").as_deref(), Some("ummati"));
    }

    #[test]
    fn load_reports_missing_file_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("missing.yaml");
        match load(&path, DEFAULT_PROJECT).unwrap_err() {
            Error::StackFile { path: reported, .. } => assert!(reported.ends_with("missing.yaml")),
            other => panic!("Expected StackFile error, got {other:?}"),
        }
    }

    #[test]
    fn load_reports_bad_yaml_with_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("Pulumi.bad.yaml");
        std::fs::write(&path, "config: [unclosed").unwrap();
        assert!(matches!(
            load(&path, DEFAULT_PROJECT),
            Err(Error::StackFile { .. })
        ));
    }
}
