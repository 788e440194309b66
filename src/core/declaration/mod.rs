//! core::declaration
//!
//! Declaration documents and their storage.
//!
//! # Modules
//!
//! - [`document`] - Case-insensitive field access on YAML documents
//! - [`store`] - Read/write of declarations by `(kind, unit-name)`
//!
//! # Declarations
//!
//! A unit owns three declarations:
//!
//! | Kind     | Fields this crate touches                                  |
//! |----------|------------------------------------------------------------|
//! | function | `metadata.name`, `spec.package.packageRef.name`            |
//! | route    | `metadata.name`, `spec.functionRef.name`, path field       |
//! | package  | doc 1: `spec.buildCmd`, `spec.initContainers`, `spec.environment.name` |
//!
//! Everything else in a declaration is carried through untouched.

pub mod document;
pub mod store;

pub use document::{Document, DocumentError};
pub use store::{DeclarationStore, DeleteOutcome, Loaded, StoreError};
