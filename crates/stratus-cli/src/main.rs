//! # stratus
//!
//! Declarative cloud-infrastructure composition.
//! Lists, plans, and synthesizes the bundled sample applications.

mod commands;
mod output;

use clap::Parser;

use crate::commands::Cli;

fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    tracing::debug!(
        app = stratus_common::constants::APP_NAME,
        version = env!("CARGO_PKG_VERSION"),
        "starting"
    );
    let cli = Cli::parse();
    commands::execute(cli)
}
