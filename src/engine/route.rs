//! engine::route
//!
//! Route path changes for a single unit.

use std::path::PathBuf;

use serde::Serialize;
use thiserror::Error;

use super::Propagator;
use crate::core::declaration::document::{self, Document, DocumentError};
use crate::core::declaration::{DeclarationStore, DeleteOutcome, Loaded, StoreError};
use crate::core::route::{self as route_doc, RouteRewrite};
use crate::core::types::{DeclarationKind, UnitName};

/// Errors from route operations.
#[derive(Debug, Error)]
pub enum RouteError {
    /// The route declaration exists but could not be read.
    ///
    /// It is left untouched rather than replaced by the template.
    #[error("route declaration '{}' could not be read: {message}", .path.display())]
    Unreadable { path: PathBuf, message: String },

    /// The declaration has a field of the wrong shape.
    #[error("route declaration: {0}")]
    Document(#[from] DocumentError),

    /// Storage failed.
    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Result of pointing a route at a new path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RouteReport {
    /// Unit whose route changed.
    pub name: UnitName,
    /// Normalized path now in the declaration.
    pub path: String,
    /// The declaration was missing or unusable and was rebuilt from the
    /// built-in template. HTTP methods may need manual review.
    pub from_template: bool,
}

/// Load the route declaration for `name`, or an empty document when it is
/// missing or malformed.
pub(crate) fn load_route(store: &DeclarationStore<'_>, name: &UnitName) -> Result<Document, RouteError> {
    match store.load(DeclarationKind::Route, name) {
        Loaded::Found(doc) => Ok(doc),
        Loaded::Missing | Loaded::Malformed { .. } => Ok(document::empty()),
        Loaded::Unreadable { message } => Err(RouteError::Unreadable {
            path: store.path(DeclarationKind::Route, name),
            message,
        }),
    }
}

/// Point `metadata.name` and `spec.functionRef.name` at `name`.
pub(crate) fn bind_to(doc: &mut Document, name: &UnitName) -> Result<(), DocumentError> {
    document::set_str(doc, &["metadata", "name"], name.as_str())?;
    document::set_str(doc, &["spec", "functionref", "name"], name.as_str())
}

impl Propagator<'_> {
    /// Point the route of `name` at `new_path`, saving under the same name.
    ///
    /// A missing or malformed declaration is replaced by the template, bound
    /// to `name`.
    pub fn rename_route(&self, name: &UnitName, new_path: &str) -> Result<RouteReport, RouteError> {
        let store = self.store();
        let doc = load_route(&store, name)?;

        let RouteRewrite {
            document: mut doc,
            path,
            from_template,
        } = route_doc::set_route_path(doc, new_path);

        if from_template {
            bind_to(&mut doc, name)?;
        }
        store.save(DeclarationKind::Route, name, &doc)?;

        Ok(RouteReport {
            name: name.clone(),
            path,
            from_template,
        })
    }

    /// Delete only the route declaration of `name`.
    pub fn delete_route(&self, name: &UnitName) -> Result<DeleteOutcome, StoreError> {
        self.store().delete_declaration(DeclarationKind::Route, name)
    }
}
