//! Ummati CLI library

pub mod commands;
pub mod error;

pub use error::{Error, Result};

use clap::{Parser, Subcommand, ValueEnum};
use ummati_common::telemetry::LogFormat;

/// Ummati - validate and preview Azure Kubernetes stacks
#[derive(Parser, Debug)]
#[command(name = "ummati")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Log line format
    #[arg(long, global = true, value_enum, default_value_t = LogFormatArg::Compact)]
    pub log_format: LogFormatArg,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Read and validate every setting of a stack
    Validate(commands::validate::ValidateArgs),
    /// Declare the stack against an offline provisioner and print the manifests
    Preview(commands::preview::PreviewArgs),
}

/// Log line format flag
#[derive(Clone, Copy, Debug, PartialEq, Eq, ValueEnum)]
pub enum LogFormatArg {
    Json,
    Compact,
}

impl From<LogFormatArg> for LogFormat {
    fn from(arg: LogFormatArg) -> Self {
        match arg {
            LogFormatArg::Json => LogFormat::Json,
            LogFormatArg::Compact => LogFormat::Compact,
        }
    }
}

impl Cli {
    /// Run the CLI command
    pub async fn run(self) -> Result<()> {
        match self.command {
            Commands::Validate(args) => commands::validate::run(args).await,
            Commands::Preview(args) => commands::preview::run(args).await,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_validate_with_stack_file() {
        let cli = Cli::try_parse_from(["ummati", "validate", "--stack-file", "Pulumi.dev.yaml"])
            .unwrap();
        assert_eq!(cli.log_format, LogFormatArg::Compact);
        match cli.command {
            Commands::Validate(args) => {
                assert_eq!(
                    args.source.stack_file.as_deref(),
                    Some(std::path::Path::new("Pulumi.dev.yaml"))
                );
                assert_eq!(args.source.project, "ummati");
            }
            other => panic!("Expected validate, got {other:?}"),
        }
    }

    #[test]
    fn parses_preview_format_and_global_log_format() {
        let cli = Cli::try_parse_from([
            "ummati",
            "preview",
            "--format",
            "json",
            "--log-format",
            "json",
        ])
        .unwrap();
        assert_eq!(cli.log_format, LogFormatArg::Json);
        match cli.command {
            Commands::Preview(args) => {
                assert_eq!(args.format, commands::preview::OutputFormat::Json);
                assert!(args.source.stack_file.is_none());
            }
            other => panic!("Expected preview, got {other:?}"),
        }
    }

    #[test]
    fn rejects_unknown_format() {
        assert!(Cli::try_parse_from(["ummati", "preview", "--format", "toml"]).is_err());
    }
}
