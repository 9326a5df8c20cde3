#![deny(missing_docs)]

//! # Spec Shims
//!
//! Generic structures acting as an Intermediate Deserialization Layer.
//! These structs map directly to OpenAPI JSON/YAML objects.
//!
//! Shims deliberately keep schema bodies as raw `serde_json::Value`; typing
//! them into [`crate::model::SchemaNode`] is the resolver's job. Unknown and
//! extension (`x-`) keys are tolerated everywhere, never errors.

use indexmap::IndexMap;
use serde::de::Error as DeError;
use serde::ser::SerializeMap;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;

/// Represents the Paths Object with support for specification extensions.
///
/// Path items are kept in source declaration order; iteration order over
/// `items` is the order the document author wrote them.
#[derive(Clone, Debug, Default)]
pub struct ShimPaths {
    /// Parsed path items keyed by path template.
    pub items: IndexMap<String, ShimPathItem>,
    /// Spec extensions attached to the Paths Object (x-...).
    pub extensions: IndexMap<String, Value>,
}

impl ShimPaths {
    /// Returns true when no concrete path items are present.
    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }
}

impl<'de> Deserialize<'de> for ShimPaths {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = IndexMap::<String, Value>::deserialize(deserializer)?;
        let mut items = IndexMap::new();
        let mut extensions = IndexMap::new();

        for (key, value) in raw {
            if key.starts_with("x-") {
                extensions.insert(key, value);
                continue;
            }
            let path_item = serde_json::from_value::<ShimPathItem>(value).map_err(|e| {
                DeError::custom(format!("Failed to parse path item '{}': {}", key, e))
            })?;
            items.insert(key, path_item);
        }

        Ok(Self { items, extensions })
    }
}

impl Serialize for ShimPaths {
    fn serialize<S>(&self, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        let mut map = serializer.serialize_map(Some(self.items.len() + self.extensions.len()))?;
        for (key, value) in &self.items {
            map.serialize_entry(key, value)?;
        }
        for (key, value) in &self.extensions {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Schema for the root document.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ShimOpenApi {
    /// OpenAPI version (e.g. "3.1.0"). Required in OAS 3.x.
    pub openapi: Option<String>,

    /// Swagger version (e.g. "2.0") for legacy support.
    pub swagger: Option<String>,

    /// Metadata about the API. Required in OAS 3.x.
    pub info: Option<ShimInfo>,

    /// Server list.
    #[serde(default)]
    pub servers: Vec<ShimServer>,

    /// Tag declarations (ordering and descriptions for section grouping).
    #[serde(default)]
    pub tags: Vec<ShimTag>,

    /// Path items.
    pub paths: Option<ShimPaths>,

    /// Components section used for reference resolution.
    pub components: Option<ShimComponents>,
}

/// The `info` object.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShimInfo {
    /// API title.
    pub title: Option<String>,
    /// API version string.
    pub version: Option<String>,
    /// Long-form description.
    pub description: Option<String>,
}

/// A single `servers` entry.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ShimServer {
    /// Server URL template.
    pub url: String,
    /// Optional description.
    pub description: Option<String>,
}

/// A top-level tag declaration.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ShimTag {
    /// Tag name (matched case-sensitively against operation tags).
    pub name: String,
    /// Optional description rendered under the section heading.
    pub description: Option<String>,
}

/// The `components` object. Only `schemas` is typed further; other sections
/// stay raw for on-demand lookups (reusable parameters, responses, bodies).
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShimComponents {
    /// Reusable schema bodies keyed by name, in declaration order.
    pub schemas: Option<IndexMap<String, Value>>,
    /// Reusable parameter definitions.
    pub parameters: Option<IndexMap<String, Value>>,
    /// Reusable response definitions.
    pub responses: Option<IndexMap<String, Value>>,
    /// Reusable request body definitions.
    #[serde(rename = "requestBodies")]
    pub request_bodies: Option<IndexMap<String, Value>>,
    /// Remaining component sections (securitySchemes, headers, ...).
    #[serde(flatten)]
    pub extra: IndexMap<String, Value>,
}

/// A single path item with its fixed method fields.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShimPathItem {
    /// Optional short summary shared by the operations below.
    pub summary: Option<String>,
    /// Optional long description.
    pub description: Option<String>,
    /// Parameters common to every operation of this path item.
    /// Kept raw: entries may be inline objects or `$ref`s.
    pub parameters: Option<Vec<Value>>,
    /// GET operation.
    pub get: Option<ShimOperation>,
    /// PUT operation.
    pub put: Option<ShimOperation>,
    /// POST operation.
    pub post: Option<ShimOperation>,
    /// DELETE operation.
    pub delete: Option<ShimOperation>,
    /// OPTIONS operation.
    pub options: Option<ShimOperation>,
    /// HEAD operation.
    pub head: Option<ShimOperation>,
    /// PATCH operation.
    pub patch: Option<ShimOperation>,
    /// TRACE operation.
    pub trace: Option<ShimOperation>,
}

/// A single operation under a path item.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShimOperation {
    /// The operationId, when declared.
    #[serde(rename = "operationId")]
    pub operation_id: Option<String>,
    /// Short summary.
    pub summary: Option<String>,
    /// Long description.
    pub description: Option<String>,
    /// Grouping tags; the first tag selects the section.
    #[serde(default)]
    pub tags: Vec<String>,
    /// Deprecation marker.
    #[serde(default)]
    pub deprecated: bool,
    /// Operation parameters (inline objects or `$ref`s).
    pub parameters: Option<Vec<Value>>,
    /// Request body (inline or `$ref`).
    #[serde(rename = "requestBody")]
    pub request_body: Option<Value>,
    /// Responses keyed by status code, in declaration order.
    pub responses: Option<IndexMap<String, Value>>,
}

/// A parameter object after `$ref` indirection has been peeled off.
#[derive(Clone, Debug, Deserialize, Serialize)]
pub struct ShimParameter {
    /// Name of the parameter.
    pub name: String,
    /// Location of the parameter (query, path, header, cookie).
    #[serde(rename = "in")]
    pub location: String,
    /// Whether the parameter is required.
    #[serde(default)]
    pub required: bool,
    /// Description.
    pub description: Option<String>,
    /// Raw schema body.
    pub schema: Option<Value>,
}

/// A request body object after `$ref` indirection has been peeled off.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShimRequestBody {
    /// Description.
    pub description: Option<String>,
    /// Media type map (`application/json` etc.), in declaration order.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
    /// Whether the body is required.
    #[serde(default)]
    pub required: bool,
}

/// A response object after `$ref` indirection has been peeled off.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShimResponse {
    /// Description (required by the spec, still tolerated when absent).
    pub description: Option<String>,
    /// Media type map, in declaration order.
    #[serde(default)]
    pub content: IndexMap<String, ShimMediaType>,
}

/// A media type entry carrying a raw schema body.
#[derive(Clone, Debug, Default, Deserialize, Serialize)]
pub struct ShimMediaType {
    /// Raw schema body (inline object or `$ref`).
    pub schema: Option<Value>,
}

/// Parses one raw spec text into the shim root plus its raw JSON value.
///
/// YAML is a superset of JSON for our purposes, so both input formats funnel
/// through `serde_yaml`; the raw value is kept for pointer-based lookups.
pub fn parse_spec(raw_text: &str) -> crate::error::AppResult<(ShimOpenApi, Value)> {
    let raw: Value = serde_yaml::from_str(raw_text)
        .map_err(|e| crate::error::AppError::General(format!("Failed to parse spec: {}", e)))?;
    let shim: ShimOpenApi = serde_json::from_value(raw.clone())
        .map_err(|e| crate::error::AppError::General(format!("Failed to parse spec: {}", e)))?;
    Ok((shim, raw))
}
