//! `stratus plan`: Display the dependency-ordered plan of each unit.

use clap::Args;
use stratus_sdk::apps::SampleApp;

use crate::output;

/// Arguments for the `plan` command.
#[derive(Args, Debug)]
pub struct PlanArgs {
    /// Sample application (ec2, s3, lambda, fargate, network).
    #[arg(short, long)]
    pub app: SampleApp,

    /// Units to plan; every unit when omitted.
    pub units: Vec<String>,
}

/// Executes the `plan` command.
///
/// Synthesizes the selected units and prints their resources in the order the
/// provisioning engine would create them, with direct dependencies and outputs.
///
/// # Errors
///
/// Returns an error if construction, cycle detection, or synthesis fails.
pub fn execute(args: &PlanArgs) -> anyhow::Result<()> {
    let documents = super::synthesize(args.app, &args.units)?;

    let title = format!("Synthesis Plan for: {}", args.app);
    println!("{title}");
    println!("{}", output::rule(&title));

    let mut total = 0;
    for doc in &documents {
        println!();
        if doc.imports.is_empty() {
            println!("Unit: {}", doc.unit);
        } else {
            println!("Unit: {} (imports {})", doc.unit, doc.imports.join(", "));
        }
        for resource in &doc.resources {
            println!(
                "  + {} ({}){}",
                resource.id,
                resource.kind,
                output::dependency_suffix(&resource.depends_on)
            );
        }
        if !doc.outputs.is_empty() {
            println!("  Outputs:");
            for (name, out) in &doc.outputs {
                println!("    {name} = {}", out.value);
            }
        }
        total += doc.resources.len();
    }

    println!();
    println!(
        "  {} across {} will be synthesized.",
        output::count(total, "resource"),
        output::count(documents.len(), "unit")
    );
    Ok(())
}
