#![deny(missing_docs)]

//! # OASDoc Core
//!
//! Core library turning OpenAPI documents into a paginated reference
//! document: `$ref` resolution, document model construction, and the layout
//! engine driving a pluggable render backend.

/// Shared error types.
pub mod error;

/// Generator facade (two-phase parse/done protocol).
pub mod generator;

/// Layout engine and content blocks.
pub mod layout;

/// Canonical document model.
pub mod model;

/// OpenAPI ingestion: shims, reference resolution, model building.
pub mod oas;

/// Render backend boundary and the plain-text reference backend.
pub mod render;

pub use error::{AppError, AppResult};
pub use generator::{Generator, GeneratorOptions, RunSummary};
pub use layout::{AnchorPos, Block, LayoutEngine, LayoutOptions, LayoutResult, Page, Span};
pub use model::{
    AppendixGroup, BodyContent, CompositeKind, Diagnostic, Document, HttpMethod, Operation,
    ParamLocation, ParameterRow, ResponseRow, SchemaEntry, SchemaKind, SchemaNode, SchemaRef,
    SchemaRegistry, Section, ServerInfo,
};
pub use oas::{BuildOptions, BuildOutput, DocumentBuilder};
pub use render::{RenderBackend, TextRenderer};
