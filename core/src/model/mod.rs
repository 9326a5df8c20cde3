#![deny(missing_docs)]

//! # Document Model Module
//!
//! - **document**: canonical document structures (sections, operations).
//! - **schema**: typed, cycle-safe schema nodes and references.
//! - **registry**: the single owner of named schema identity.
//! - **diagnostics**: structured non-fatal findings.

pub mod diagnostics;
pub mod document;
pub mod registry;
pub mod schema;

// Re-export public API to keep call sites short
pub use diagnostics::Diagnostic;
pub use document::{
    AppendixGroup, BodyContent, Document, HttpMethod, Operation, ParamLocation, ParameterRow,
    ResponseRow, Section, ServerInfo,
};
pub use registry::{SchemaEntry, SchemaRegistry};
pub use schema::{CompositeKind, SchemaKind, SchemaNode, SchemaRef};
