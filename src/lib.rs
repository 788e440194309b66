//! fizz - Consistency tooling for Fission function projects
//!
//! A Fission project keeps every function as three YAML declarations
//! (function, route, package) in a specs directory, next to a folder of
//! build sources and two shared packaging scripts. fizz renames, re-routes
//! and deletes units while keeping every cross-reference between those
//! files consistent.
//!
//! # Architecture
//!
//! The codebase follows a layered architecture:
//!
//! - [`cli`] - Command-line interface layer (parses args, delegates to engine)
//! - [`engine`] - Multi-declaration operations: rename, delete, route changes
//! - [`core`] - Domain types, declarations, config, external tools
//! - [`ui`] - Output and prompts
//!
//! # Correctness Invariants
//!
//! 1. For a live unit, every `name` field across its three declarations
//!    equals the unit name
//! 2. A route path always starts with `/`
//! 3. A package spec never holds both `buildcmd` and `initContainers`
//! 4. Mutating commands hold the workspace lock

pub mod cli;
pub mod core;
pub mod engine;
pub mod ui;
