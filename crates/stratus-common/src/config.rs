//! Synthesis configuration model.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::StratusError;

/// Serialization format of emitted unit documents.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl OutputFormat {
    /// File extension (without the dot) for this format.
    #[must_use]
    pub const fn extension(self) -> &'static str {
        match self {
            Self::Json => "json",
            Self::Yaml => "yaml",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = StratusError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(Self::Json),
            "yaml" | "yml" => Ok(Self::Yaml),
            other => Err(StratusError::Config {
                message: format!("unsupported output format: {other}"),
            }),
        }
    }
}

/// Target environment handed through to the provisioning engine untouched.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TargetEnvironment {
    /// Target account identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
    /// Target region name.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
}

/// Root configuration for a synthesis run.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SynthConfig {
    /// Directory unit documents and the manifest are written to.
    pub output_dir: PathBuf,
    /// Document serialization format.
    pub format: OutputFormat,
    /// Pass-through target environment.
    pub environment: TargetEnvironment,
}

impl Default for SynthConfig {
    fn default() -> Self {
        Self {
            output_dir: PathBuf::from(crate::constants::DEFAULT_OUTPUT_DIR),
            format: OutputFormat::default(),
            environment: TargetEnvironment::default(),
        }
    }
}
