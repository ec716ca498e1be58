//! System-wide constants and default paths.

/// Default directory synthesized documents are written to.
pub const DEFAULT_OUTPUT_DIR: &str = "stratus.out";

/// Name of the manifest written next to the unit documents.
pub const MANIFEST_FILE: &str = "manifest.json";

/// Suffix of a unit document file, before the format extension.
pub const TEMPLATE_SUFFIX: &str = ".template";

/// Version stamped into every manifest.
pub const MANIFEST_VERSION: &str = "1";

/// Environment variable carrying the pass-through target account.
pub const ACCOUNT_ENV: &str = "STRATUS_ACCOUNT";

/// Environment variable carrying the pass-through target region.
pub const REGION_ENV: &str = "STRATUS_REGION";

/// Application name used in CLI output and manifests.
pub const APP_NAME: &str = "stratus";

/// Binary name for the CLI.
pub const BIN_NAME: &str = "stratus";
