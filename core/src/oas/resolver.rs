#![deny(missing_docs)]

//! # Reference Resolver
//!
//! Resolves `$ref` pointers into typed [`SchemaNode`] structures, one input
//! file at a time.
//!
//! Handles:
//! - Everything reachable from `components/schemas`, in declaration order.
//! - On-demand resolution of arbitrary local `$ref` strings.
//! - Self- and mutually-recursive schemas: a ref to a schema whose
//!   resolution is still in flight yields a registry key reference to the
//!   node under construction, never a re-entrant expansion.
//! - Unresolvable refs: an `unresolved` node carrying the original pointer,
//!   plus one diagnostic per distinct pointer. Never fatal.

use crate::model::{
    CompositeKind, Diagnostic, SchemaKind, SchemaNode, SchemaRef, SchemaRegistry,
};
use crate::oas::pointer::{extract_component_name, lookup_pointer};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashSet;

/// How a local schema name maps into the shared registry.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum KeyPlan {
    /// Register a new entry under this canonical key and display name.
    New {
        /// Canonical registry key.
        key: String,
        /// Display name rendered in the output.
        display: String,
    },
    /// The body is structurally identical to an already-registered entry;
    /// local references alias that key instead of re-registering.
    Alias {
        /// Canonical key of the existing entry.
        key: String,
    },
}

impl KeyPlan {
    /// The canonical key this plan points at.
    pub fn key(&self) -> &str {
        match self {
            KeyPlan::New { key, .. } | KeyPlan::Alias { key } => key,
        }
    }
}

/// Per-file resolver over a shared registry.
pub struct ReferenceResolver<'a> {
    registry: &'a mut SchemaRegistry,
    diagnostics: &'a mut Vec<Diagnostic>,
    reported: &'a mut HashSet<(String, String)>,
    label: String,
    raw_root: &'a Value,
    raw_schemas: IndexMap<String, Value>,
    key_map: IndexMap<String, KeyPlan>,
    pointer_guard: HashSet<String>,
}

impl<'a> ReferenceResolver<'a> {
    /// Creates a resolver for one input file.
    ///
    /// `key_map` carries the merge/scoping decisions the builder already
    /// made: local component name to canonical registry key.
    pub fn new(
        registry: &'a mut SchemaRegistry,
        diagnostics: &'a mut Vec<Diagnostic>,
        reported: &'a mut HashSet<(String, String)>,
        label: &str,
        raw_root: &'a Value,
        raw_schemas: IndexMap<String, Value>,
        key_map: IndexMap<String, KeyPlan>,
    ) -> Self {
        Self {
            registry,
            diagnostics,
            reported,
            label: label.to_string(),
            raw_root,
            raw_schemas,
            key_map,
            pointer_guard: HashSet::new(),
        }
    }

    /// Resolves every schema declared under `components/schemas`, in
    /// declaration order. Idempotent per name.
    pub fn resolve_components(&mut self) {
        let names: Vec<String> = self.raw_schemas.keys().cloned().collect();
        for name in names {
            self.resolve_named(&name);
        }
    }

    /// Resolves a locally declared schema name to its canonical key,
    /// registering the node if this is its first visit.
    ///
    /// Returns `None` when the name is not declared in this file.
    pub fn resolve_named(&mut self, local_name: &str) -> Option<String> {
        let plan = self.key_map.get(local_name)?.clone();
        let (key, display) = match plan {
            // Deduplicated against an earlier file; nothing to resolve.
            KeyPlan::Alias { key } => return Some(key),
            KeyPlan::New { key, display } => (key, display),
        };

        // Already resolved, or currently resolving (cycle): hand out the
        // key of the node under construction.
        if self.registry.contains(&key) {
            return Some(key);
        }

        let body = self.raw_schemas.get(local_name).cloned()?;
        self.registry.reserve(key.clone(), display, self.label.clone());
        let node = self.node_from_value(&body);
        self.registry.complete(&key, node);
        Some(key)
    }

    /// Resolves an arbitrary `$ref` string to a schema reference.
    ///
    /// Refs outside this file's scope (non-local) and pointers that miss
    /// yield an `unresolved` node carrying the original pointer.
    pub fn resolve_ref(&mut self, ref_str: &str) -> SchemaRef {
        if let Some(name) = extract_component_name(ref_str, "schemas") {
            if let Some(key) = self.resolve_named(&name) {
                return SchemaRef::Named(key);
            }
            return self.unresolved(ref_str);
        }

        // General local pointer: inline whatever the pointer targets.
        if ref_str.starts_with("#/") {
            if self.pointer_guard.contains(ref_str) {
                // Pointer chain re-entered itself; break the cycle with a
                // reference-shaped placeholder instead of recursing.
                return self.unresolved(ref_str);
            }
            if let Some(target) = lookup_pointer(self.raw_root, ref_str) {
                let target = target.clone();
                self.pointer_guard.insert(ref_str.to_string());
                let resolved = self.resolve_value(&target);
                self.pointer_guard.remove(ref_str);
                return resolved;
            }
        }

        self.unresolved(ref_str)
    }

    /// Resolves a raw schema value: a `$ref` wrapper goes through
    /// [`Self::resolve_ref`]; anything else becomes an owned inline node.
    pub fn resolve_value(&mut self, raw: &Value) -> SchemaRef {
        if let Some(ref_str) = raw.get("$ref").and_then(Value::as_str) {
            return self.resolve_ref(ref_str);
        }
        SchemaRef::inline(self.node_from_value(raw))
    }

    fn unresolved(&mut self, pointer: &str) -> SchemaRef {
        let seen_key = (self.label.clone(), pointer.to_string());
        if self.reported.insert(seen_key) {
            self.diagnostics.push(Diagnostic::UnresolvedReference {
                label: self.label.clone(),
                pointer: pointer.to_string(),
            });
        }
        SchemaRef::inline(SchemaNode::unresolved(pointer))
    }

    /// Types one raw schema body into a node, resolving nested refs.
    fn node_from_value(&mut self, raw: &Value) -> SchemaNode {
        let Some(obj) = raw.as_object() else {
            // Boolean schemas (`true` / `false`) and other scalars.
            let mut node = SchemaNode::primitive("any");
            node.resolved = true;
            return node;
        };

        let description = obj
            .get("description")
            .and_then(Value::as_str)
            .map(str::to_string);

        // Compositions take precedence over `type`.
        for (keyword, kind) in [
            ("allOf", CompositeKind::AllOf),
            ("oneOf", CompositeKind::OneOf),
            ("anyOf", CompositeKind::AnyOf),
        ] {
            if let Some(children) = obj.get(keyword).and_then(Value::as_array) {
                let mut node = SchemaNode::new(SchemaKind::Composite(kind));
                node.description = description;
                node.children = children.iter().map(|c| self.resolve_value(c)).collect();
                node.resolved = true;
                return node;
            }
        }

        let type_name = schema_type_name(obj);

        if type_name.as_deref() == Some("object") || obj.contains_key("properties") {
            let mut node = SchemaNode::new(SchemaKind::Object);
            node.description = description;
            if let Some(props) = obj.get("properties").and_then(Value::as_object) {
                for (prop_name, prop_value) in props {
                    let resolved = self.resolve_value(prop_value);
                    node.properties.insert(prop_name.clone(), resolved);
                }
            }
            if let Some(required) = obj.get("required").and_then(Value::as_array) {
                node.required = required
                    .iter()
                    .filter_map(Value::as_str)
                    .map(str::to_string)
                    .collect();
            }
            node.resolved = true;
            return node;
        }

        if type_name.as_deref() == Some("array") || obj.contains_key("items") {
            let mut node = SchemaNode::new(SchemaKind::Array);
            node.description = description;
            node.items = obj.get("items").map(|items| self.resolve_value(items));
            node.resolved = true;
            return node;
        }

        let mut node = SchemaNode::new(SchemaKind::Primitive);
        node.description = description;
        node.primitive_type = Some(type_name.unwrap_or_else(|| "any".to_string()));
        node.format = obj.get("format").and_then(Value::as_str).map(str::to_string);
        if let Some(values) = obj.get("enum").and_then(Value::as_array) {
            node.enum_values = values.iter().map(enum_value_label).collect();
        }
        node.resolved = true;
        node
    }
}

/// Extracts the schema `type`, tolerating OAS 3.1 type arrays by taking the
/// first non-"null" entry.
fn schema_type_name(obj: &serde_json::Map<String, Value>) -> Option<String> {
    match obj.get("type") {
        Some(Value::String(s)) => Some(s.clone()),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(Value::as_str)
            .find(|s| *s != "null")
            .map(str::to_string),
        _ => None,
    }
}

fn enum_value_label(value: &Value) -> String {
    match value {
        Value::String(s) => s.clone(),
        other => other.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn plans(names: &[&str]) -> IndexMap<String, KeyPlan> {
        names
            .iter()
            .map(|n| {
                (
                    n.to_string(),
                    KeyPlan::New {
                        key: n.to_string(),
                        display: n.to_string(),
                    },
                )
            })
            .collect()
    }

    fn schemas(raw: Value) -> IndexMap<String, Value> {
        serde_json::from_value(raw).unwrap()
    }

    #[test]
    fn test_resolves_simple_object() {
        let raw_schemas = schemas(json!({
            "Pet": {"type": "object", "properties": {"name": {"type": "string"}}, "required": ["name"]}
        }));
        let root = json!({});
        let mut registry = SchemaRegistry::new();
        let mut diagnostics = Vec::new();
        let mut reported = HashSet::new();
        let mut resolver = ReferenceResolver::new(
            &mut registry,
            &mut diagnostics,
            &mut reported,
            "a.yaml",
            &root,
            raw_schemas,
            plans(&["Pet"]),
        );
        resolver.resolve_components();

        let entry = registry.get("Pet").unwrap();
        assert_eq!(entry.node.kind, SchemaKind::Object);
        assert!(entry.node.resolved);
        assert_eq!(entry.node.properties.len(), 1);
        assert!(entry.node.is_required("name"));
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_self_referential_schema_terminates() {
        let raw_schemas = schemas(json!({
            "Node": {"type": "object", "properties": {
                "value": {"type": "string"},
                "next": {"$ref": "#/components/schemas/Node"}
            }}
        }));
        let root = json!({});
        let mut registry = SchemaRegistry::new();
        let mut diagnostics = Vec::new();
        let mut reported = HashSet::new();
        let mut resolver = ReferenceResolver::new(
            &mut registry,
            &mut diagnostics,
            &mut reported,
            "a.yaml",
            &root,
            raw_schemas,
            plans(&["Node"]),
        );
        resolver.resolve_components();

        let node = &registry.get("Node").unwrap().node;
        assert_eq!(
            node.properties.get("next"),
            Some(&SchemaRef::Named("Node".to_string()))
        );
        assert!(diagnostics.is_empty());
    }

    #[test]
    fn test_mutually_recursive_schemas_terminate() {
        let raw_schemas = schemas(json!({
            "A": {"type": "object", "properties": {"b": {"$ref": "#/components/schemas/B"}}},
            "B": {"type": "object", "properties": {"a": {"$ref": "#/components/schemas/A"}}}
        }));
        let root = json!({});
        let mut registry = SchemaRegistry::new();
        let mut diagnostics = Vec::new();
        let mut reported = HashSet::new();
        let mut resolver = ReferenceResolver::new(
            &mut registry,
            &mut diagnostics,
            &mut reported,
            "a.yaml",
            &root,
            raw_schemas,
            plans(&["A", "B"]),
        );
        resolver.resolve_components();

        assert_eq!(registry.len(), 2);
        let a = &registry.get("A").unwrap().node;
        let b = &registry.get("B").unwrap().node;
        assert_eq!(a.properties["b"], SchemaRef::Named("B".to_string()));
        assert_eq!(b.properties["a"], SchemaRef::Named("A".to_string()));
    }

    #[test]
    fn test_re_resolution_yields_same_key() {
        let raw_schemas = schemas(json!({"Pet": {"type": "object"}}));
        let root = json!({});
        let mut registry = SchemaRegistry::new();
        let mut diagnostics = Vec::new();
        let mut reported = HashSet::new();
        let mut resolver = ReferenceResolver::new(
            &mut registry,
            &mut diagnostics,
            &mut reported,
            "a.yaml",
            &root,
            raw_schemas,
            plans(&["Pet"]),
        );

        let first = resolver.resolve_ref("#/components/schemas/Pet");
        let second = resolver.resolve_ref("#/components/schemas/Pet");
        assert_eq!(first, second);
        assert_eq!(first, SchemaRef::Named("Pet".to_string()));
        assert_eq!(registry.len(), 1);
    }

    #[test]
    fn test_unresolved_ref_keeps_pointer_and_reports_once() {
        let raw_schemas = schemas(json!({}));
        let root = json!({});
        let mut registry = SchemaRegistry::new();
        let mut diagnostics = Vec::new();
        let mut reported = HashSet::new();
        let mut resolver = ReferenceResolver::new(
            &mut registry,
            &mut diagnostics,
            &mut reported,
            "a.yaml",
            &root,
            raw_schemas,
            IndexMap::new(),
        );

        let first = resolver.resolve_ref("#/components/schemas/Ghost");
        let SchemaRef::Inline(node) = first else {
            panic!("expected inline unresolved node");
        };
        assert_eq!(node.kind, SchemaKind::Unresolved);
        assert_eq!(node.pointer.as_deref(), Some("#/components/schemas/Ghost"));

        // Second hit on the same pointer: substituted again, reported once.
        resolver.resolve_ref("#/components/schemas/Ghost");
        assert_eq!(diagnostics.len(), 1);
    }

    #[test]
    fn test_general_pointer_resolves_inline() {
        let root = json!({
            "paths": {"/pets": {"get": {"responses": {"200": {"content":
                {"application/json": {"schema": {"type": "integer"}}}}}}}}
        });
        let mut registry = SchemaRegistry::new();
        let mut diagnostics = Vec::new();
        let mut reported = HashSet::new();
        let mut resolver = ReferenceResolver::new(
            &mut registry,
            &mut diagnostics,
            &mut reported,
            "a.yaml",
            &root,
            IndexMap::new(),
            IndexMap::new(),
        );

        let hit = resolver.resolve_ref(
            "#/paths/~1pets/get/responses/200/content/application~1json/schema",
        );
        let SchemaRef::Inline(node) = hit else {
            panic!("expected inline node");
        };
        assert_eq!(node.primitive_type.as_deref(), Some("integer"));
    }

    #[test]
    fn test_composite_children_resolved() {
        let raw_schemas = schemas(json!({
            "Base": {"type": "object"},
            "Cat": {"allOf": [
                {"$ref": "#/components/schemas/Base"},
                {"type": "object", "properties": {"meow": {"type": "boolean"}}}
            ]}
        }));
        let root = json!({});
        let mut registry = SchemaRegistry::new();
        let mut diagnostics = Vec::new();
        let mut reported = HashSet::new();
        let mut resolver = ReferenceResolver::new(
            &mut registry,
            &mut diagnostics,
            &mut reported,
            "a.yaml",
            &root,
            raw_schemas,
            plans(&["Base", "Cat"]),
        );
        resolver.resolve_components();

        let cat = &registry.get("Cat").unwrap().node;
        assert_eq!(cat.kind, SchemaKind::Composite(CompositeKind::AllOf));
        assert_eq!(cat.children.len(), 2);
        assert_eq!(cat.children[0], SchemaRef::Named("Base".to_string()));
    }

    #[test]
    fn test_type_array_takes_first_non_null() {
        let raw_schemas = schemas(json!({
            "Maybe": {"type": ["null", "string"]}
        }));
        let root = json!({});
        let mut registry = SchemaRegistry::new();
        let mut diagnostics = Vec::new();
        let mut reported = HashSet::new();
        let mut resolver = ReferenceResolver::new(
            &mut registry,
            &mut diagnostics,
            &mut reported,
            "a.yaml",
            &root,
            raw_schemas,
            plans(&["Maybe"]),
        );
        resolver.resolve_components();

        let node = &registry.get("Maybe").unwrap().node;
        assert_eq!(node.primitive_type.as_deref(), Some("string"));
    }
}
