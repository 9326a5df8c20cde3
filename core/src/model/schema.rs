#![deny(missing_docs)]

//! # Schema Model
//!
//! Definition of the typed, cycle-safe schema representation.
//!
//! Raw JSON/YAML schema bodies are resolved exactly once (at build time)
//! into [`SchemaNode`] tagged variants; no downstream code re-inspects raw
//! untyped trees. Named schemas live in the registry and are referenced by
//! canonical key; anonymous inline subschemas are owned children.

use indexmap::IndexMap;

/// The discriminator for a resolved schema node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SchemaKind {
    /// An object with named properties.
    Object,
    /// An array with an item schema.
    Array,
    /// A scalar (string, integer, number, boolean, ...).
    Primitive,
    /// An allOf / oneOf / anyOf composition.
    Composite(CompositeKind),
    /// A `$ref` that could not be located; carries the original pointer.
    Unresolved,
}

/// The flavor of a composite schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositeKind {
    /// `allOf`
    AllOf,
    /// `oneOf`
    OneOf,
    /// `anyOf`
    AnyOf,
}

impl CompositeKind {
    /// The keyword as it appears in the source document.
    pub fn keyword(&self) -> &'static str {
        match self {
            CompositeKind::AllOf => "allOf",
            CompositeKind::OneOf => "oneOf",
            CompositeKind::AnyOf => "anyOf",
        }
    }
}

/// A reference to a schema: either a canonical registry key (named schemas,
/// including self- and mutually-recursive ones) or an owned anonymous node.
///
/// Recursion can only travel through `Named`, which is a key lookup rather
/// than an owned subtree, so the model itself can never cycle.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaRef {
    /// A named schema in the registry, by canonical key.
    Named(String),
    /// An anonymous inline schema owned by its parent.
    Inline(Box<SchemaNode>),
}

impl SchemaRef {
    /// Creates an inline reference from a node.
    pub fn inline(node: SchemaNode) -> Self {
        SchemaRef::Inline(Box::new(node))
    }
}

/// A resolved schema node.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaNode {
    /// Discriminator.
    pub kind: SchemaKind,
    /// Description from the source document.
    pub description: Option<String>,
    /// Scalar type name for `Primitive` (e.g. "string", "integer").
    pub primitive_type: Option<String>,
    /// Scalar format for `Primitive` (e.g. "int64", "uuid").
    pub format: Option<String>,
    /// Enumerated values for `Primitive` (rendered, not validated).
    pub enum_values: Vec<String>,
    /// Property map for `Object`, in declaration order.
    pub properties: IndexMap<String, SchemaRef>,
    /// Required property names for `Object`.
    pub required: Vec<String>,
    /// Item schema for `Array`.
    pub items: Option<SchemaRef>,
    /// Composition children for `Composite`.
    pub children: Vec<SchemaRef>,
    /// Original `$ref` pointer for `Unresolved`.
    pub pointer: Option<String>,
    /// Set once resolution of this node has completed.
    pub resolved: bool,
}

impl SchemaNode {
    /// Creates an empty node of the given kind.
    pub fn new(kind: SchemaKind) -> Self {
        Self {
            kind,
            description: None,
            primitive_type: None,
            format: None,
            enum_values: Vec::new(),
            properties: IndexMap::new(),
            required: Vec::new(),
            items: None,
            children: Vec::new(),
            pointer: None,
            resolved: false,
        }
    }

    /// Creates a primitive node for the given scalar type.
    pub fn primitive(ty: impl Into<String>) -> Self {
        let mut node = Self::new(SchemaKind::Primitive);
        node.primitive_type = Some(ty.into());
        node.resolved = true;
        node
    }

    /// Creates an unresolved node carrying the original pointer.
    ///
    /// Resolution never throws the pointer away on failure; it is rendered
    /// later as a "Schema not found" placeholder.
    pub fn unresolved(pointer: impl Into<String>) -> Self {
        let mut node = Self::new(SchemaKind::Unresolved);
        node.pointer = Some(pointer.into());
        node
    }

    /// Whether a property is in the required list.
    pub fn is_required(&self, property: &str) -> bool {
        self.required.iter().any(|r| r == property)
    }

    /// A short, single-row type label (e.g. "object", "string (uuid)",
    /// "array"). Named targets are labeled by the caller, which has the
    /// registry at hand.
    pub fn type_label(&self) -> String {
        match &self.kind {
            SchemaKind::Object => "object".to_string(),
            SchemaKind::Array => "array".to_string(),
            SchemaKind::Composite(kind) => kind.keyword().to_string(),
            SchemaKind::Unresolved => format!(
                "Schema not found: {}",
                self.pointer.as_deref().unwrap_or("?")
            ),
            SchemaKind::Primitive => {
                let ty = self.primitive_type.as_deref().unwrap_or("any");
                let mut label = match &self.format {
                    Some(format) => format!("{} ({})", ty, format),
                    None => ty.to_string(),
                };
                if !self.enum_values.is_empty() {
                    label.push_str(&format!(" [{}]", self.enum_values.join(" | ")));
                }
                label
            }
        }
    }
}
