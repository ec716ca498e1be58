//! Unified error types for the Stratus workspace.
//!
//! Every validation failure carries the unit and identifier(s) it concerns so
//! that a failed synthesis can be traced back to the offending declaration.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type shared across the workspace.
#[derive(Debug, Error)]
pub enum StratusError {
    /// A resource identifier was declared twice within one unit.
    #[error("duplicate identifier \"{identifier}\" in unit \"{unit}\"")]
    DuplicateIdentifier {
        /// Unit being built.
        unit: String,
        /// Identifier that was already taken.
        identifier: String,
    },

    /// An output name was registered twice within one unit.
    #[error("duplicate output name \"{name}\" in unit \"{unit}\"")]
    DuplicateOutputName {
        /// Unit being built.
        unit: String,
        /// Output name that was already taken.
        name: String,
    },

    /// A unit name was used twice within one application.
    #[error("duplicate unit name \"{name}\" in application")]
    DuplicateUnitName {
        /// Unit name that was already taken.
        name: String,
    },

    /// A reference or dependency targets an identifier that was never declared.
    #[error("unknown identifier \"{identifier}\" in unit \"{unit}\"")]
    UnknownIdentifier {
        /// Unit that was searched.
        unit: String,
        /// Identifier that could not be found.
        identifier: String,
    },

    /// A unit name does not exist in the application, or was not imported.
    #[error("unknown unit \"{name}\"")]
    UnknownUnit {
        /// Unit name that could not be found.
        name: String,
    },

    /// A reference names an attribute the target resource kind does not expose.
    #[error(
        "invalid attribute access \"{identifier}.{attribute}\" in unit \"{unit}\": \
         {kind} does not expose \"{attribute}\""
    )]
    InvalidAttributeAccess {
        /// Unit owning the target resource.
        unit: String,
        /// Identifier of the target resource.
        identifier: String,
        /// Kind of the target resource.
        kind: String,
        /// Attribute that was requested.
        attribute: String,
    },

    /// The reference graph contains at least one cycle.
    #[error(
        "cyclic dependency in unit(s) {}: {}",
        .units.join(", "),
        .identifiers.join(", ")
    )]
    CyclicDependency {
        /// Units owning the participating resources.
        units: Vec<String>,
        /// Qualified identifiers (`unit/identifier`) of every participating resource.
        identifiers: Vec<String>,
    },

    /// A configuration value is invalid.
    #[error("invalid configuration: {message}")]
    Config {
        /// Description of the invalid configuration.
        message: String,
    },

    /// An I/O operation failed.
    #[error("I/O error at {path}: {source}")]
    Io {
        /// Path where the I/O error occurred.
        path: PathBuf,
        /// Underlying I/O error.
        source: std::io::Error,
    },

    /// JSON serialization failed.
    #[error("serialization error: {source}")]
    Serialization {
        /// Underlying serialization error.
        #[from]
        source: serde_json::Error,
    },

    /// YAML serialization failed.
    #[error("YAML serialization error: {source}")]
    Yaml {
        /// Underlying serialization error.
        #[from]
        source: serde_yaml::Error,
    },
}

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, StratusError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_identifier_names_unit_and_identifier() {
        let err = StratusError::DuplicateIdentifier {
            unit: "Net".into(),
            identifier: "vpc1".into(),
        };
        assert_eq!(
            err.to_string(),
            "duplicate identifier \"vpc1\" in unit \"Net\""
        );
    }

    #[test]
    fn cyclic_dependency_lists_participants() {
        let err = StratusError::CyclicDependency {
            units: vec!["App".into()],
            identifiers: vec!["App/a".into(), "App/b".into()],
        };
        let msg = err.to_string();
        assert!(msg.contains("App/a, App/b"), "got: {msg}");
        assert!(msg.starts_with("cyclic dependency in unit(s) App"), "got: {msg}");
    }

    #[test]
    fn invalid_attribute_access_names_kind() {
        let err = StratusError::InvalidAttributeAccess {
            unit: "Net".into(),
            identifier: "vpc1".into(),
            kind: "Vpc".into(),
            attribute: "arn".into(),
        };
        let msg = err.to_string();
        assert!(msg.contains("vpc1.arn"), "got: {msg}");
        assert!(msg.contains("Vpc does not expose \"arn\""), "got: {msg}");
    }
}
