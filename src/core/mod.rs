//! core
//!
//! Core domain types, schemas, and operations for fizz.
//!
//! # Modules
//!
//! - [`types`] - Strong types: UnitName, DeclarationKind
//! - [`config`] - Configuration schema and loading
//! - [`paths`] - Centralized path routing for a project
//! - [`declaration`] - YAML declarations and their storage
//! - [`route`] - Route path rewriting and the built-in route template
//! - [`package`] - Package regeneration and post-processing
//! - [`scripts`] - Packaging script patching and execution
//! - [`process`] - External program execution
//! - [`ops`] - Workspace locking
//!
//! # Design Principles
//!
//! - Strong typing rejects bad unit names at the boundary
//! - Schemas are strict; declarations are edited field by field and
//!   everything else is carried through untouched
//! - Filesystem failures are returned, never swallowed

pub mod config;
pub mod declaration;
pub mod ops;
pub mod package;
pub mod paths;
pub mod process;
pub mod route;
pub mod scripts;
pub mod types;
