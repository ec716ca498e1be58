//! `stratus synth`: Write unit documents and the manifest.

use std::path::PathBuf;

use anyhow::Context;
use clap::Args;
use stratus_common::config::{OutputFormat, SynthConfig, TargetEnvironment};
use stratus_common::constants::{ACCOUNT_ENV, DEFAULT_OUTPUT_DIR, REGION_ENV};
use stratus_sdk::apps::SampleApp;

use crate::output;

/// Output path meaning "print to standard output".
const STDOUT: &str = "-";

/// Arguments for the `synth` command.
#[derive(Args, Debug)]
pub struct SynthArgs {
    /// Sample application (ec2, s3, lambda, fargate, network).
    #[arg(short, long)]
    pub app: SampleApp,

    /// Units to synthesize; every unit when omitted.
    pub units: Vec<String>,

    /// Output directory, or `-` to print documents to standard output.
    #[arg(short, long, default_value = DEFAULT_OUTPUT_DIR)]
    pub output: PathBuf,

    /// Document format (json or yaml).
    #[arg(short, long, default_value_t = OutputFormat::Json)]
    pub format: OutputFormat,

    /// Target account, copied into the manifest as-is.
    #[arg(long, env = ACCOUNT_ENV)]
    pub account: Option<String>,

    /// Target region, copied into the manifest as-is.
    #[arg(long, env = REGION_ENV)]
    pub region: Option<String>,
}

impl SynthArgs {
    /// Whether documents go to standard output instead of files.
    #[must_use]
    pub fn writes_to_stdout(&self) -> bool {
        self.output.as_os_str() == STDOUT
    }

    fn config(&self) -> SynthConfig {
        SynthConfig {
            output_dir: self.output.clone(),
            format: self.format,
            environment: TargetEnvironment {
                account: self.account.clone(),
                region: self.region.clone(),
            },
        }
    }
}

/// Executes the `synth` command.
///
/// # Errors
///
/// Returns an error if synthesis fails or a document cannot be written.
pub fn execute(args: &SynthArgs) -> anyhow::Result<()> {
    let documents = super::synthesize(args.app, &args.units)?;

    if args.writes_to_stdout() {
        let rendered = stratus_compose::synth::render_documents(&documents, args.format)?;
        println!("{}", rendered.trim_end());
        return Ok(());
    }

    let config = args.config();
    let manifest = stratus_compose::emit::emit(&documents, &config)
        .with_context(|| format!("failed to write {}", config.output_dir.display()))?;

    for entry in &manifest.units {
        println!(
            "  {} -> {} ({})",
            entry.unit,
            config.output_dir.join(&entry.template).display(),
            output::count(entry.resource_count, "resource")
        );
    }
    println!(
        "Synthesized {} to {}",
        output::count(manifest.units.len(), "unit"),
        config.output_dir.display()
    );
    Ok(())
}
