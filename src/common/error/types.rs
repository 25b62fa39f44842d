//! Unified error type for deckgen.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants map
//! onto the propagation policy of the assembler: missing resources and render
//! failures degrade a single slide, I/O failures on the output are fatal, and
//! thumbnail failures are only ever logged.
use std::path::PathBuf;
use thiserror::Error;

/// Main error type for deckgen operations.
#[derive(Error, Debug)]
pub enum DeckError {
    /// A referenced fragment, image or manifest does not exist
    #[error("Missing resource: {}", .0.display())]
    MissingResource(PathBuf),

    /// Slide content could not be turned into slide elements
    #[error("Render failure: {0}")]
    Render(String),

    /// Image bytes are not in a format a slide can embed
    #[error("Invalid format: {0}")]
    InvalidFormat(String),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Preview thumbnail generation failed
    #[error("Thumbnail failure: {0}")]
    Thumbnail(String),

    /// The content manifest is malformed
    #[error("Manifest error: {0}")]
    Manifest(String),

    /// ZIP container error
    #[error("ZIP error: {0}")]
    Zip(String),

    /// XML generation error
    #[error("XML error: {0}")]
    Xml(String),
}

impl DeckError {
    /// Whether this error only invalidates the slide that raised it.
    ///
    /// The assembler skips the offending slide for these and keeps going.
    pub fn is_slide_local(&self) -> bool {
        matches!(
            self,
            Self::MissingResource(_) | Self::Render(_) | Self::InvalidFormat(_)
        )
    }
}

/// Result type for deckgen operations.
pub type Result<T> = std::result::Result<T, DeckError>;
