//! Unified error types for cellshift.
//!
//! This module provides the single error type shared by the address model,
//! the parser, the serializer and the shift transform.

// Submodule declarations
pub mod types;

// Re-exports
pub use types::{Error, Result};
