//! Writing synthesized documents to disk.
//!
//! Each unit document lands in its own file under the configured output
//! directory, next to a `manifest.json` describing the whole run.

use std::path::Path;

use serde::{Deserialize, Serialize};
use stratus_common::config::{OutputFormat, SynthConfig, TargetEnvironment};
use stratus_common::constants::{MANIFEST_FILE, MANIFEST_VERSION, TEMPLATE_SUFFIX};
use stratus_common::error::{Result, StratusError};

use crate::synth::UnitDocument;

/// Index of one synthesis run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Manifest {
    /// Manifest format version.
    pub version: String,
    /// Pass-through target environment.
    pub environment: TargetEnvironment,
    /// One entry per emitted unit, in definition order.
    pub units: Vec<ManifestEntry>,
}

/// Manifest entry for one emitted unit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ManifestEntry {
    /// Unit name.
    pub unit: String,
    /// Document file name, relative to the output directory.
    pub template: String,
    /// Units this unit imports.
    pub imports: Vec<String>,
    /// Number of resources in the document.
    pub resource_count: usize,
    /// Output names, sorted.
    pub outputs: Vec<String>,
}

/// File name of the document for `unit`.
#[must_use]
pub fn template_file_name(unit: &str, format: OutputFormat) -> String {
    format!("{unit}{TEMPLATE_SUFFIX}.{}", format.extension())
}

/// Builds the manifest describing `documents` without touching the filesystem.
#[must_use]
pub fn manifest(documents: &[UnitDocument], config: &SynthConfig) -> Manifest {
    Manifest {
        version: MANIFEST_VERSION.to_owned(),
        environment: config.environment.clone(),
        units: documents
            .iter()
            .map(|doc| ManifestEntry {
                unit: doc.unit.clone(),
                template: template_file_name(&doc.unit, config.format),
                imports: doc.imports.clone(),
                resource_count: doc.resources.len(),
                outputs: doc.outputs.keys().cloned().collect(),
            })
            .collect(),
    }
}

/// Writes every document and the manifest under `config.output_dir`.
///
/// The directory is created if missing; existing files with the same names
/// are overwritten.
///
/// # Errors
///
/// Returns an error if serialization fails or a file cannot be written.
pub fn emit(documents: &[UnitDocument], config: &SynthConfig) -> Result<Manifest> {
    let dir = &config.output_dir;
    std::fs::create_dir_all(dir).map_err(|e| io_error(dir, e))?;

    for doc in documents {
        let path = dir.join(template_file_name(&doc.unit, config.format));
        let body = doc.render(config.format)?;
        std::fs::write(&path, body).map_err(|e| io_error(&path, e))?;
        tracing::info!(unit = %doc.unit, path = %path.display(), "wrote unit document");
    }

    let manifest = manifest(documents, config);
    let path = dir.join(MANIFEST_FILE);
    let body = serde_json::to_string_pretty(&manifest)?;
    std::fs::write(&path, body).map_err(|e| io_error(&path, e))?;
    tracing::info!(path = %path.display(), units = manifest.units.len(), "wrote manifest");

    Ok(manifest)
}

fn io_error(path: &Path, source: std::io::Error) -> StratusError {
    StratusError::Io {
        path: path.to_path_buf(),
        source,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::ApplicationRoot;
    use crate::resource::ResourceKind;
    use crate::value::Properties;

    fn documents() -> Vec<UnitDocument> {
        let mut app = ApplicationRoot::new();
        app.define("Storage", |unit| {
            let bucket = unit.declare(ResourceKind::Bucket, "Bucket", Properties::new())?;
            unit.add_output("BucketName", bucket.attr("name")?)?;
            Ok(())
        })
        .expect("define");
        app.synth().expect("synth")
    }

    #[test]
    fn template_file_name_uses_format_extension() {
        assert_eq!(
            template_file_name("Net", OutputFormat::Json),
            "Net.template.json"
        );
        assert_eq!(
            template_file_name("Net", OutputFormat::Yaml),
            "Net.template.yaml"
        );
    }

    #[test]
    fn emit_writes_documents_and_manifest() {
        let tmp = tempfile::tempdir().expect("tempdir");
        let config = SynthConfig {
            output_dir: tmp.path().join("out"),
            environment: TargetEnvironment {
                account: Some("123456789012".into()),
                region: Some("eu-west-1".into()),
            },
            ..SynthConfig::default()
        };

        let manifest = emit(&documents(), &config).expect("emit");
        assert_eq!(manifest.units.len(), 1);
        assert_eq!(manifest.units[0].outputs, vec!["BucketName"]);

        let doc = std::fs::read_to_string(tmp.path().join("out/Storage.template.json"))
            .expect("read document");
        let parsed: UnitDocument = serde_json::from_str(&doc).expect("parse document");
        assert_eq!(parsed.unit, "Storage");

        let raw = std::fs::read_to_string(tmp.path().join("out/manifest.json")).expect("read");
        let back: Manifest = serde_json::from_str(&raw).expect("parse manifest");
        assert_eq!(back, manifest);
        assert_eq!(back.environment.region.as_deref(), Some("eu-west-1"));
    }

    #[test]
    fn emit_into_a_file_path_reports_io_error() {
        let tmp = tempfile::NamedTempFile::new().expect("tempfile");
        let config = SynthConfig {
            output_dir: tmp.path().to_path_buf(),
            ..SynthConfig::default()
        };
        let err = emit(&documents(), &config).unwrap_err();
        assert!(matches!(err, StratusError::Io { .. }), "got: {err}");
    }
}
