//! # stratus-compose
//!
//! Declarative resource composition and synthesis.
//!
//! Handles:
//! - **Value**: Configuration values and lazily-resolved references.
//! - **Resource**: Resource kinds with their attribute, default, and required-key tables.
//! - **Unit**: The builder that assembles one deployable unit and its outputs.
//! - **App**: The application root owning every unit.
//! - **Graph**: Dependency graph construction and topological resolution.
//! - **Synth**: Reference substitution and per-unit document generation.
//! - **Emit**: Writing unit documents and the manifest to disk.

pub mod app;
pub mod emit;
pub mod graph;
pub mod resource;
pub mod synth;
pub mod unit;
pub mod value;

pub use app::{ApplicationRoot, Stack};
pub use resource::{Category, ResourceDescriptor, ResourceKind};
pub use synth::UnitDocument;
pub use unit::{CompositeUnit, Output, ResourceHandle, UnitBuilder};
pub use value::{Properties, Reference, Value};
