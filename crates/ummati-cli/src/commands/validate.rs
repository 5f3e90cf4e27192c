//! `ummati validate` - read every setting once and report the first problem

use clap::Args;
use tracing::info;
use ummati_common::settings::{Settings, StackSettings};

use super::StackSource;
use crate::Result;

#[derive(Args, Debug)]
pub struct ValidateArgs {
    #[command(flatten)]
    pub source: StackSource,
}

pub async fn run(args: ValidateArgs) -> Result<()> {
    let settings = StackSettings::new(args.source.load()?);
    settings.validate_all()?;

    info!(
        application = %settings.application_name()?,
        environment = %settings.environment()?,
        "configuration valid"
    );
    println!("configuration valid");
    Ok(())
}
