//! HTTP request handlers organized by domain
//!
//! Each submodule contains handlers for a specific API area.

pub mod reports;
pub mod snapshot;

// Re-export all handlers for use in router
pub use reports::*;
pub use snapshot::*;
