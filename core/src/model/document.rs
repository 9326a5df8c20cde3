#![deny(missing_docs)]

//! # Document Model
//!
//! Definition of the canonical document structures produced by the builder.
//!
//! These structs transport resolved spec data into the layout engine. The
//! whole tree is constructed once per run and read-only afterwards; schema
//! bodies live in the [`super::SchemaRegistry`] and are referenced by key.

use super::registry::SchemaRegistry;
use super::schema::SchemaRef;
use std::fmt;

/// HTTP methods in the fixed iteration order used for cross-run determinism
/// regardless of input key ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum HttpMethod {
    /// GET
    Get,
    /// PUT
    Put,
    /// POST
    Post,
    /// DELETE
    Delete,
    /// OPTIONS
    Options,
    /// HEAD
    Head,
    /// PATCH
    Patch,
    /// TRACE
    Trace,
}

impl HttpMethod {
    /// The fixed method iteration order.
    pub const ORDER: [HttpMethod; 8] = [
        HttpMethod::Get,
        HttpMethod::Put,
        HttpMethod::Post,
        HttpMethod::Delete,
        HttpMethod::Options,
        HttpMethod::Head,
        HttpMethod::Patch,
        HttpMethod::Trace,
    ];

    /// Upper-case wire name.
    pub fn as_str(&self) -> &'static str {
        match self {
            HttpMethod::Get => "GET",
            HttpMethod::Put => "PUT",
            HttpMethod::Post => "POST",
            HttpMethod::Delete => "DELETE",
            HttpMethod::Options => "OPTIONS",
            HttpMethod::Head => "HEAD",
            HttpMethod::Patch => "PATCH",
            HttpMethod::Trace => "TRACE",
        }
    }
}

impl fmt::Display for HttpMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The source location of a parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamLocation {
    /// Path.
    Path,
    /// Query.
    Query,
    /// Header.
    Header,
    /// Cookie.
    Cookie,
}

impl ParamLocation {
    /// Parses the OpenAPI `in` field; unknown values fall back to Query.
    pub fn parse(raw: &str) -> Self {
        match raw {
            "path" => ParamLocation::Path,
            "query" => ParamLocation::Query,
            "header" => ParamLocation::Header,
            "cookie" => ParamLocation::Cookie,
            _ => ParamLocation::Query, // Fallback
        }
    }

    /// The lower-case source keyword.
    pub fn as_str(&self) -> &'static str {
        match self {
            ParamLocation::Path => "path",
            ParamLocation::Query => "query",
            ParamLocation::Header => "header",
            ParamLocation::Cookie => "cookie",
        }
    }
}

impl fmt::Display for ParamLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One row of an operation's parameter table.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterRow {
    /// Parameter name.
    pub name: String,
    /// Location (path, query, header, cookie).
    pub location: ParamLocation,
    /// Whether the parameter is required.
    pub required: bool,
    /// Description.
    pub description: Option<String>,
    /// Parameter schema, when declared.
    pub schema: Option<SchemaRef>,
}

/// One media type of a request or response body.
#[derive(Debug, Clone, PartialEq)]
pub struct BodyContent {
    /// Media type (e.g. "application/json").
    pub media_type: String,
    /// Schema reference, when declared.
    pub schema: Option<SchemaRef>,
}

/// One row of an operation's response table.
#[derive(Debug, Clone, PartialEq)]
pub struct ResponseRow {
    /// Status code or range ("200", "4XX", "default").
    pub status: String,
    /// Response description.
    pub description: Option<String>,
    /// Body content per media type, in declaration order.
    pub content: Vec<BodyContent>,
}

/// A single API operation.
#[derive(Debug, Clone, PartialEq)]
pub struct Operation {
    /// HTTP method.
    pub method: HttpMethod,
    /// Path template (e.g. "/pets/{id}").
    pub path: String,
    /// operationId, when declared.
    pub operation_id: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Deprecation marker.
    pub deprecated: bool,
    /// Parameter rows in source order (path-item parameters first).
    pub parameters: Vec<ParameterRow>,
    /// Request body content per media type.
    pub request_body: Vec<BodyContent>,
    /// Response rows in declaration order.
    pub responses: Vec<ResponseRow>,
}

/// A group of operations under one heading (tag or path grouping).
#[derive(Debug, Clone, PartialEq)]
pub struct Section {
    /// Section heading.
    pub heading: String,
    /// Description (tag description, when declared).
    pub description: Option<String>,
    /// Operations in encounter order.
    pub operations: Vec<Operation>,
}

/// One `servers` entry carried onto the title page.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerInfo {
    /// Server URL template.
    pub url: String,
    /// Optional description.
    pub description: Option<String>,
}

/// One appendix group: all schemas of a scope, in registry order.
///
/// With merged registries there is a single group; otherwise one group per
/// input file, in file order.
#[derive(Debug, Clone, PartialEq)]
pub struct AppendixGroup {
    /// Group heading rendered above the schema entries.
    pub heading: String,
    /// Canonical registry keys belonging to this group.
    pub keys: Vec<String>,
}

/// The canonical document model: built fresh per run, immutable after the
/// builder returns, read-only input to the layout engine.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    /// Document title.
    pub title: String,
    /// Optional subtitle.
    pub subtitle: Option<String>,
    /// API version string (first parsed file wins).
    pub version: Option<String>,
    /// API description (first parsed file wins).
    pub description: Option<String>,
    /// Server list accumulated over all parsed files.
    pub servers: Vec<ServerInfo>,
    /// Sections in first-encounter order.
    pub sections: Vec<Section>,
    /// The shared schema registry.
    pub registry: SchemaRegistry,
    /// Appendix grouping over the registry.
    pub appendix: Vec<AppendixGroup>,
}

impl Document {
    /// Total number of operations across all sections.
    pub fn operation_count(&self) -> usize {
        self.sections.iter().map(|s| s.operations.len()).sum()
    }
}
