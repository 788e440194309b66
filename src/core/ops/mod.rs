//! core::ops
//!
//! Operation locking.
//!
//! # Modules
//!
//! - [`lock`] - Advisory exclusive workspace lock
//!
//! # Architecture
//!
//! Every mutating command acquires the workspace lock before touching the
//! specs directory, the packaging scripts or a unit folder, and holds it
//! until the last file operation completes. There is no journal: a failed
//! rename reports which phases completed and leaves the files as they are.
//!
//! # Example
//!
//! ```ignore
//! use fizzkit::core::ops::lock::WorkspaceLock;
//!
//! let lock = WorkspaceLock::acquire(&paths)?;
//! // ... rename declarations ...
//! drop(lock);
//! ```

pub mod lock;

pub use lock::{LockError, WorkspaceLock};
