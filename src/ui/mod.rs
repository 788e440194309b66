//! ui
//!
//! User interaction utilities.
//!
//! # Modules
//!
//! - [`prompts`] - Interactive confirmations
//! - [`output`] - Output formatting and display
//!
//! # Design
//!
//! All output and prompts go through this module so quiet, debug and
//! JSON modes behave the same in every command.

pub mod output;
pub mod prompts;
