#![deny(missing_docs)]

//! # Schema Registry
//!
//! The single owner of all named schema identity within a document.
//!
//! Entries are keyed by canonical name and kept in insertion order (file
//! order, then in-file declaration order), which fixes appendix ordering
//! across runs. Operations and other schemas hold [`super::SchemaRef::Named`]
//! key lookups into this registry, never independent copies.

use super::schema::SchemaNode;
use indexmap::IndexMap;

/// One registered named schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaEntry {
    /// Canonical registry key (unique; scope-qualified when not merging).
    pub key: String,
    /// Name rendered in the output (usually the source component name).
    pub display_name: String,
    /// Label of the source file that contributed the body.
    pub source: String,
    /// The resolved node.
    pub node: SchemaNode,
}

/// Mapping from canonical name to [`SchemaEntry`], shared by reference
/// across the whole document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaRegistry {
    entries: IndexMap<String, SchemaEntry>,
}

impl SchemaRegistry {
    /// Creates an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Reserves a key with a placeholder node so that in-flight resolution
    /// can hand out references to the node under construction.
    ///
    /// Returns false (and leaves the registry untouched) if the key exists.
    pub fn reserve(
        &mut self,
        key: impl Into<String>,
        display_name: impl Into<String>,
        source: impl Into<String>,
    ) -> bool {
        let key = key.into();
        if self.entries.contains_key(&key) {
            return false;
        }
        let entry = SchemaEntry {
            key: key.clone(),
            display_name: display_name.into(),
            source: source.into(),
            node: SchemaNode::unresolved(format!("#/components/schemas/{}", key)),
        };
        self.entries.insert(key, entry);
        true
    }

    /// Replaces a reserved placeholder with the fully resolved node.
    pub fn complete(&mut self, key: &str, mut node: SchemaNode) {
        node.resolved = true;
        if let Some(entry) = self.entries.get_mut(key) {
            entry.node = node;
        }
    }

    /// Looks up an entry by canonical key.
    pub fn get(&self, key: &str) -> Option<&SchemaEntry> {
        self.entries.get(key)
    }

    /// Whether a canonical key is present (resolved or under construction).
    pub fn contains(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// The display name for a canonical key, falling back to the key itself.
    pub fn display_name<'a>(&'a self, key: &'a str) -> &'a str {
        self.entries
            .get(key)
            .map(|e| e.display_name.as_str())
            .unwrap_or(key)
    }

    /// Iterates entries in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = &SchemaEntry> {
        self.entries.values()
    }

    /// Canonical keys in insertion order.
    pub fn keys(&self) -> impl Iterator<Item = &String> {
        self.entries.keys()
    }

    /// Number of registered schemas.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
