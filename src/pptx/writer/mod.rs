//! In-memory deck model for PPTX writing.

pub mod deck;
pub(crate) mod relmap;
pub mod shape;
pub mod slide;

// Re-export main types
pub use deck::Deck;
pub use shape::{Frame, Shape, ShapeKind};
pub use slide::Slide;
