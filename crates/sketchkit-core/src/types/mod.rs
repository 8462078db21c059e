//! Shared type definitions.
//!
//! - `ids`: identifiers crossing the store and engine boundaries
//! - `aliases`: shared-state wrappers used by sessions

mod aliases;
mod ids;

pub use aliases::*;
pub use ids::*;
