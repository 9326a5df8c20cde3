#![deny(missing_docs)]

//! # OpenAPI Ingestion Module
//!
//! - **shims**: Intermediate Deserialization Layer over raw JSON/YAML.
//! - **pointer**: local `$ref` / JSON Pointer helpers.
//! - **resolver**: `$ref` resolution into typed schema nodes.
//! - **builder**: transformation of parsed specs into the document model.

pub mod builder;
pub mod pointer;
pub mod resolver;
pub mod shims;

// Re-export public API to keep call sites short
pub use builder::{BuildOptions, BuildOutput, DocumentBuilder};
pub use resolver::{KeyPlan, ReferenceResolver};
pub use shims::{parse_spec, ShimOpenApi};
