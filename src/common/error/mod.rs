//! Unified error types for deckgen.

// Submodule declarations
pub mod conversions;
pub mod types;

// Re-exports
pub use types::{DeckError, Result};
