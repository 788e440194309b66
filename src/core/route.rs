//! core::route
//!
//! Route (HTTP trigger) path rewriting.
//!
//! # Shapes
//!
//! A route declaration stores its path in one of two places:
//!
//! - `spec.ingressConfig.path` ([`RouteShape::Ingress`])
//! - `spec.relativeURL` ([`RouteShape::RelativeUrl`])
//!
//! Real declarations carry one of them, but a declaration carrying both is
//! rewritten in both places ([`RouteShape::Both`]). A declaration carrying
//! neither, or no `spec` at all, is replaced by the built-in template.
//!
//! # Example
//!
//! ```
//! use fizzkit::core::declaration::document;
//! use fizzkit::core::route::{normalize_path, set_route_path};
//!
//! assert_eq!(normalize_path(" hello "), "/hello");
//!
//! let rewrite = set_route_path(document::empty(), "foo");
//! assert!(rewrite.from_template);
//! assert_eq!(rewrite.path, "/foo");
//! ```

use serde_yaml::{Mapping, Value};

use crate::core::declaration::document::{self, Document};

const SPEC: &str = "spec";
const INGRESS: &str = "ingressconfig";
const RELATIVE_URL: &str = "relativeurl";
const PATH: &str = "path";

/// Where a route declaration keeps its path.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RouteShape {
    /// `spec.ingressConfig.path`
    Ingress,
    /// `spec.relativeURL`
    RelativeUrl,
    /// Both fields present
    Both,
}

impl RouteShape {
    /// Detect the shape of `doc`, or `None` if it has no path-bearing field.
    pub fn detect(doc: &Document) -> Option<Self> {
        let spec = document::get(doc, SPEC).filter(|s| s.is_mapping())?;
        match (
            document::contains(spec, INGRESS),
            document::contains(spec, RELATIVE_URL),
        ) {
            (true, true) => Some(RouteShape::Both),
            (true, false) => Some(RouteShape::Ingress),
            (false, true) => Some(RouteShape::RelativeUrl),
            (false, false) => None,
        }
    }
}

/// Result of [`set_route_path`].
#[derive(Debug, Clone, PartialEq)]
pub struct RouteRewrite {
    /// The rewritten declaration.
    pub document: Document,
    /// The normalized path that was written.
    pub path: String,
    /// True if the input was discarded in favour of the built-in template.
    ///
    /// Callers should warn that HTTP methods may need manual review.
    pub from_template: bool,
}

/// Normalize a route path.
///
/// Trims surrounding whitespace and ensures exactly one leading `/`.
pub fn normalize_path(path: &str) -> String {
    let trimmed = path.trim().trim_start_matches('/');
    format!("/{}", trimmed)
}

/// Read the current path of a route declaration.
///
/// Prefers `ingressConfig.path` when both fields exist.
pub fn current_path(doc: &Document) -> Option<&str> {
    match RouteShape::detect(doc)? {
        RouteShape::Ingress | RouteShape::Both => {
            document::get_str(doc, &[SPEC, INGRESS, PATH])
        }
        RouteShape::RelativeUrl => document::get_str(doc, &[SPEC, RELATIVE_URL]),
    }
}

/// Point a route declaration at `new_path`.
///
/// Never fails: a declaration without a usable shape is replaced by the
/// built-in template, and the result says so.
pub fn set_route_path(doc: Document, new_path: &str) -> RouteRewrite {
    let (mut doc, shape, from_template) = match RouteShape::detect(&doc) {
        Some(shape) => (doc, shape, false),
        None => (route_template(), RouteShape::Ingress, true),
    };

    let path = normalize_path(new_path);
    if let Some(spec) = document::get_mut(&mut doc, SPEC) {
        match shape {
            RouteShape::Ingress => set_ingress_path(spec, &path),
            RouteShape::RelativeUrl => set_relative_url(spec, &path),
            RouteShape::Both => {
                set_ingress_path(spec, &path);
                set_relative_url(spec, &path);
            }
        }
    }

    RouteRewrite {
        document: doc,
        path,
        from_template,
    }
}

fn set_ingress_path(spec: &mut Value, path: &str) {
    if let Some(ingress) = document::get_mut(spec, INGRESS) {
        if !ingress.is_mapping() {
            *ingress = document::empty();
        }
    }
    // spec is a mapping and ingress is now a mapping, so neither set can fail.
    let _ = document::set_str(spec, &[INGRESS, PATH], path);
}

fn set_relative_url(spec: &mut Value, path: &str) {
    let _ = document::set(spec, RELATIVE_URL, Value::String(path.to_string()));
}

/// The built-in route declaration used when an existing one is unusable.
///
/// Mirrors what `fission httptrigger create --spec` writes, with a `GET`
/// method and an empty ingress host.
pub fn route_template() -> Document {
    let mut functionref = Mapping::new();
    functionref.insert("functionweights".into(), Value::Null);
    functionref.insert("name".into(), "".into());
    functionref.insert("type".into(), "name".into());

    let mut ingressconfig = Mapping::new();
    ingressconfig.insert("annotations".into(), Value::Null);
    ingressconfig.insert("host".into(), "*".into());
    ingressconfig.insert(PATH.into(), "/".into());
    ingressconfig.insert("tls".into(), "".into());

    let mut spec = Mapping::new();
    spec.insert("createingress".into(), false.into());
    spec.insert("functionref".into(), Value::Mapping(functionref));
    spec.insert("host".into(), "".into());
    spec.insert(INGRESS.into(), Value::Mapping(ingressconfig));
    spec.insert(
        "methods".into(),
        Value::Sequence(vec![Value::String("GET".to_string())]),
    );
    spec.insert("prefix".into(), "".into());

    let mut metadata = Mapping::new();
    metadata.insert("creationTimestamp".into(), Value::Null);
    metadata.insert("name".into(), "".into());
    metadata.insert("namespace".into(), "default".into());

    let mut root = Mapping::new();
    root.insert("apiVersion".into(), "fission.io/v1".into());
    root.insert("kind".into(), "HTTPTrigger".into());
    root.insert("metadata".into(), Value::Mapping(metadata));
    root.insert(SPEC.into(), Value::Mapping(spec));
    Value::Mapping(root)
}
