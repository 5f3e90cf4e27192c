//! `ummati preview` - declare the stack offline and print its manifests
//!
//! Runs the full stack against the preview provisioner, so ids, generated
//! names and computed outputs are placeholders and kubeconfigs are empty.

use clap::{Args, ValueEnum};
use tracing::info;
use ummati_common::settings::StackSettings;
use ummati_infra::resource::ResourceManifest;
use ummati_infra::{AzureKubernetesStack, PreviewProvisioner};

use super::StackSource;
use crate::Result;

#[derive(Args, Debug)]
pub struct PreviewArgs {
    #[command(flatten)]
    pub source: StackSource,

    /// Output format
    #[arg(long, value_enum, default_value_t = OutputFormat::Yaml)]
    pub format: OutputFormat,

    /// Output file path (default: stdout)
    #[arg(short, long)]
    pub output: Option<std::path::PathBuf>,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// Multi-document YAML
    Yaml,
    /// A JSON array
    Json,
}

pub async fn run(args: PreviewArgs) -> Result<()> {
    let settings = StackSettings::new(args.source.load()?);
    let provisioner = PreviewProvisioner::default();

    let stack = AzureKubernetesStack::deploy(&settings, &provisioner)?;
    for (location, kubeconfig) in stack.kubeconfigs() {
        let kubeconfig = kubeconfig.get().await?;
        info!(location = %location, empty = kubeconfig.is_empty(), "kubeconfig resolved");
    }

    let manifests = provisioner.finish().await?;
    let rendered = render(&manifests, args.format)?;

    match &args.output {
        Some(path) => {
            std::fs::write(path, &rendered)?;
            eprintln!("{} manifests written to {}", manifests.len(), path.display());
        }
        None => print!("{rendered}"),
    }
    Ok(())
}

/// Render manifests in the requested format
pub fn render(manifests: &[ResourceManifest], format: OutputFormat) -> Result<String> {
    match format {
        OutputFormat::Json => {
            let mut json = serde_json::to_string_pretty(manifests)?;
            json.push('\n');
            Ok(json)
        }
        OutputFormat::Yaml => {
            let mut documents = Vec::with_capacity(manifests.len());
            for manifest in manifests {
                documents.push(manifest.to_yaml()?);
            }
            Ok(documents
                .iter()
                .map(|doc| format!("---\n{doc}"))
                .collect::<String>())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::commands::test_support::write_stack_file;
    use crate::Error;
    use ummati_common::config::stack_file::DEFAULT_PROJECT;

    fn args(path: std::path::PathBuf, format: OutputFormat, output: std::path::PathBuf) -> PreviewArgs {
        PreviewArgs {
            source: StackSource {
                stack_file: Some(path),
                project: DEFAULT_PROJECT.to_string(),
            },
            format,
            output: Some(output),
        }
    }

    #[tokio::test]
    async fn writes_json_manifests() {
        let dir = tempfile::tempdir().unwrap();
        let stack = write_stack_file(dir.path(), &[]);
        let output = dir.path().join("preview.json");

        run(args(stack, OutputFormat::Json, output.clone())).await.unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        let manifests: Vec<ResourceManifest> = serde_json::from_str(&text).unwrap();
        assert!(manifests
            .iter()
            .any(|m| m.name == "kubernetes-canadacentral-test-"));
        assert!(text.contains(ummati_infra::secret::REDACTED));
    }

    #[tokio::test]
    async fn writes_yaml_documents() {
        let dir = tempfile::tempdir().unwrap();
        let stack = write_stack_file(dir.path(), &[]);
        let output = dir.path().join("preview.yaml");

        run(args(stack, OutputFormat::Yaml, output.clone())).await.unwrap();

        let text = std::fs::read_to_string(&output).unwrap();
        assert!(text.starts_with("---\n"));
        assert!(text.contains("typeToken: azure-native:containerservice:ManagedCluster"));
    }

    #[tokio::test]
    async fn invalid_configuration_writes_nothing() {
        let dir = tempfile::tempdir().unwrap();
        let stack = write_stack_file(dir.path(), &[("KubernetesSKUTier", "Premium")]);
        let output = dir.path().join("preview.yaml");

        let err = run(args(stack, OutputFormat::Yaml, output.clone()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Infra(_)));
        assert!(!output.exists());
    }

    #[test]
    fn empty_preview_renders_empty_output() {
        assert_eq!(render(&[], OutputFormat::Yaml).unwrap(), "");
        assert_eq!(render(&[], OutputFormat::Json).unwrap(), "[]\n");
    }
}
