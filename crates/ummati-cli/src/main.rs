//! Ummati CLI
//!
//! Validates stack configuration and previews the Azure resources it declares.

use clap::Parser;

use ummati_cli::{Cli, Result};
use ummati_common::telemetry::{init_telemetry, TelemetryConfig};

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    init_telemetry(TelemetryConfig {
        service_name: "ummati-cli".to_string(),
        format: cli.log_format.into(),
    })?;

    cli.run().await
}
