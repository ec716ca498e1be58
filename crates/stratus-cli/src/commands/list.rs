//! `stratus list`: List the units of a sample application.

use anyhow::Context;
use clap::Args;
use stratus_sdk::apps::SampleApp;

/// Arguments for the `list` command.
#[derive(Args, Debug)]
pub struct ListArgs {
    /// Sample application (ec2, s3, lambda, fargate, network).
    #[arg(short, long)]
    pub app: SampleApp,
}

/// Executes the `list` command.
///
/// Builds the application, which validates every unit, then prints one row
/// per unit in definition order.
///
/// # Errors
///
/// Returns an error if any unit fails validation.
pub fn execute(args: &ListArgs) -> anyhow::Result<()> {
    tracing::info!(app = %args.app, "listing units");
    let root = args
        .app
        .build()
        .with_context(|| format!("failed to build application {}", args.app))?;

    println!("UNIT\tRESOURCES\tOUTPUTS\tIMPORTS");
    for unit in root.units() {
        let imports = if unit.imports().is_empty() {
            "-".to_owned()
        } else {
            unit.imports().join(",")
        };
        println!(
            "{}\t{}\t{}\t{imports}",
            unit.name(),
            unit.resources().len(),
            unit.outputs().len()
        );
    }
    Ok(())
}
