//! core::declaration::document
//!
//! Field access on untyped YAML declarations.
//!
//! # Key spelling
//!
//! The Fission CLI writes lowercase keys (`packageref`, `functionref`,
//! `ingressconfig`, `relativeurl`, `buildcmd`) while hand-written specs and
//! the Kubernetes CRDs use camelCase. All lookups here are ASCII
//! case-insensitive, and writes to an existing key keep the spelling found
//! in the file. Only missing keys are created with the caller's spelling.
//!
//! # Ordering
//!
//! `serde_yaml::Mapping` preserves insertion order, so a load/modify/save
//! cycle never reorders keys.

use serde::Deserialize;
use serde_yaml::{Mapping, Value};
use thiserror::Error;

/// A single YAML document.
pub type Document = Value;

/// Errors from structural edits.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum DocumentError {
    /// A field on the path exists but is not a mapping.
    #[error("field '{0}' is not a mapping")]
    NotAMapping(String),
}

/// An empty mapping document.
pub fn empty() -> Document {
    Value::Mapping(Mapping::new())
}

/// True for `null` and for mappings with no keys.
pub fn is_empty(doc: &Document) -> bool {
    match doc {
        Value::Null => true,
        Value::Mapping(map) => map.is_empty(),
        _ => false,
    }
}

/// Find the key in `map` matching `key` case-insensitively.
fn find_key(map: &Mapping, key: &str) -> Option<Value> {
    map.keys()
        .find(|k| k.as_str().is_some_and(|s| s.eq_ignore_ascii_case(key)))
        .cloned()
}

/// Look up a direct child of a mapping document.
pub fn get<'a>(doc: &'a Document, key: &str) -> Option<&'a Value> {
    let map = doc.as_mapping()?;
    let found = find_key(map, key)?;
    map.get(&found)
}

/// Look up a direct child of a mapping document, mutably.
pub fn get_mut<'a>(doc: &'a mut Document, key: &str) -> Option<&'a mut Value> {
    let map = doc.as_mapping_mut()?;
    let found = find_key(map, key)?;
    map.get_mut(&found)
}

/// Check whether a mapping document has `key`.
pub fn contains(doc: &Document, key: &str) -> bool {
    get(doc, key).is_some()
}

/// Follow `path` through nested mappings.
pub fn get_path<'a>(doc: &'a Document, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(doc, |current, key| get(current, key))
}

/// Read a string at `path`.
pub fn get_str<'a>(doc: &'a Document, path: &[&str]) -> Option<&'a str> {
    get_path(doc, path).and_then(Value::as_str)
}

/// Set `value` under `key`, keeping the existing key spelling if present.
///
/// # Errors
///
/// Returns [`DocumentError::NotAMapping`] if `doc` is neither a mapping nor
/// null. A null document becomes a mapping.
pub fn set(doc: &mut Document, key: &str, value: Value) -> Result<(), DocumentError> {
    if doc.is_null() {
        *doc = empty();
    }
    let map = doc
        .as_mapping_mut()
        .ok_or_else(|| DocumentError::NotAMapping(key.to_string()))?;
    let existing = find_key(map, key).unwrap_or_else(|| Value::String(key.to_string()));
    map.insert(existing, value);
    Ok(())
}

/// Set `value` at `path`, creating missing intermediate mappings.
///
/// # Errors
///
/// Returns [`DocumentError::NotAMapping`] naming the first segment that
/// exists but cannot hold children.
pub fn set_path(doc: &mut Document, path: &[&str], value: Value) -> Result<(), DocumentError> {
    let Some((last, parents)) = path.split_last() else {
        *doc = value;
        return Ok(());
    };

    let mut current = doc;
    let mut walked = Vec::with_capacity(parents.len());
    for key in parents {
        walked.push(*key);
        if current.is_null() {
            *current = empty();
        }
        if !current.is_mapping() {
            return Err(DocumentError::NotAMapping(walked[..walked.len() - 1].join(".")));
        }
        if !contains(current, key) {
            set(current, key, empty())?;
        }
        current = get_mut(current, key)
            .ok_or_else(|| DocumentError::NotAMapping(walked.join(".")))?;
    }

    set(current, last, value).map_err(|_| DocumentError::NotAMapping(walked.join(".")))
}

/// Set a string at `path`.
pub fn set_str(doc: &mut Document, path: &[&str], value: &str) -> Result<(), DocumentError> {
    set_path(doc, path, Value::String(value.to_string()))
}

/// Remove `key` (case-insensitively) from a mapping document.
pub fn remove(doc: &mut Document, key: &str) -> Option<Value> {
    let map = doc.as_mapping_mut()?;
    let found = find_key(map, key)?;
    map.remove(&found)
}

/// Parse a YAML stream into its documents, in file order.
pub fn parse_stream(text: &str) -> Result<Vec<Document>, serde_yaml::Error> {
    serde_yaml::Deserializer::from_str(text)
        .map(Value::deserialize)
        .collect()
}

/// Render documents as a YAML stream separated by `---`.
pub fn render_stream(docs: &[Document]) -> Result<String, serde_yaml::Error> {
    let mut out = String::new();
    for (i, doc) in docs.iter().enumerate() {
        if i > 0 {
            out.push_str("---\n");
        }
        out.push_str(&serde_yaml::to_string(doc)?);
    }
    Ok(out)
}
