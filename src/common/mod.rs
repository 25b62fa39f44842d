//! Common types and utilities shared across the crate.

// Submodule declarations
pub mod error;
pub mod unit;
pub mod xml;

// Re-exports for convenience
pub use error::{DeckError, Result};
pub use unit::{EMUS_PER_INCH, emu_to_inch, inch_to_emu};
