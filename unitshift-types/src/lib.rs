//! Shared option and pattern types for the unitshift workspace.
//!
//! # Design constraints
//! - Option structs may be deserialized from host configuration files.
//! - Prefer adding optional fields over changing semantics.
//! - Matchers and resolved configs are built once and shared across a whole
//!   run, so everything here is `Send + Sync`.

mod options;
mod pattern;

pub use options::{DocumentInput, ExcludeSpec, RewriteConfig, RewriteOptions, RootValue};
pub use pattern::Pattern;
