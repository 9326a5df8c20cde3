#![deny(missing_docs)]

//! # Reference Utilities
//!
//! Shared helpers for interpreting local `$ref` pointers.
//!
//! These utilities are intentionally lightweight: they never fetch external
//! documents. Refs are either local (`#/...`) or implicitly scoped to the
//! file they appear in; anything else is treated as unresolvable by the
//! caller.

use percent_encoding::percent_decode_str;
use serde_json::Value;

/// Decodes a JSON Pointer segment (handles `~1` and `~0`).
pub(crate) fn decode_pointer_segment(segment: &str) -> String {
    let decoded = segment.replace("~1", "/").replace("~0", "~");
    percent_decode_str(&decoded)
        .decode_utf8_lossy()
        .into_owned()
}

/// Extracts a component name from a `$ref` if it points to
/// `#/components/{section}/{name}` within the current document.
pub(crate) fn extract_component_name(ref_str: &str, section: &str) -> Option<String> {
    let pointer = ref_str.strip_prefix('#')?;
    let pointer = pointer.strip_prefix('/')?;
    let segments: Vec<&str> = pointer.split('/').collect();

    if segments.len() != 3 {
        return None;
    }
    if segments[0] != "components" || segments[1] != section {
        return None;
    }

    let name = decode_pointer_segment(segments[2]);
    if name.is_empty() {
        None
    } else {
        Some(name)
    }
}

/// Walks a local JSON Pointer (`#/a/b/0`) through a raw document value.
pub(crate) fn lookup_pointer<'a>(root: &'a Value, ref_str: &str) -> Option<&'a Value> {
    let pointer = ref_str.strip_prefix('#')?;
    if pointer.is_empty() || pointer == "/" {
        return Some(root);
    }

    let mut current = root;
    for segment in pointer.trim_start_matches('/').split('/') {
        let segment = decode_pointer_segment(segment);
        current = match current {
            Value::Object(map) => map.get(&segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}
