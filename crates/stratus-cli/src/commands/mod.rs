//! CLI command definitions and dispatch.

pub mod list;
pub mod plan;
pub mod synth;

use anyhow::Context;
use clap::{Parser, Subcommand};
use stratus_compose::UnitDocument;
use stratus_sdk::apps::SampleApp;

/// Stratus: declarative cloud-infrastructure composition.
#[derive(Parser, Debug)]
#[command(name = stratus_common::constants::BIN_NAME, version, about, long_about = None)]
pub struct Cli {
    /// Subcommand to execute.
    #[command(subcommand)]
    pub command: Command,
}

/// Available CLI subcommands.
#[derive(Subcommand, Debug)]
pub enum Command {
    /// List the units of a sample application.
    List(list::ListArgs),
    /// Display the dependency-ordered plan of each unit.
    Plan(plan::PlanArgs),
    /// Write unit documents and the manifest.
    Synth(synth::SynthArgs),
}

/// Dispatches the parsed CLI command to its handler.
///
/// # Errors
///
/// Returns an error if the command execution fails.
pub fn execute(cli: Cli) -> anyhow::Result<()> {
    match cli.command {
        Command::List(args) => list::execute(&args),
        Command::Plan(args) => plan::execute(&args),
        Command::Synth(args) => synth::execute(&args),
    }
}

/// Builds `app` and synthesizes the named units, or every unit when `units` is empty.
fn synthesize(app: SampleApp, units: &[String]) -> anyhow::Result<Vec<UnitDocument>> {
    let root = app
        .build()
        .with_context(|| format!("failed to build application {app}"))?;
    let documents = if units.is_empty() {
        root.synth()
    } else {
        root.synth_units(units)
    };
    documents.with_context(|| format!("failed to synthesize application {app}"))
}
