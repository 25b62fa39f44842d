//! # deckgen - slide deck assembler
//!
//! Builds a PowerPoint (`.pptx`) deck from a declarative YAML content
//! manifest, then optionally rasterizes wireframe thumbnails of the result.
//!
//! ## Architecture
//!
//! - [`manifest`] - Content manifest and markup fragments
//! - [`assembler`] - Turns slide specifications into a deck, slide by slide
//! - [`pptx`] - In-memory deck model and the OPC package writer
//! - [`preview`] - Thumbnail rendering of written decks
//! - [`config`] - Environment configuration of the binary
//! - [`common`] - Errors, units and XML helpers
//!
//! ## Example
//!
//! ```no_run
//! use deckgen::{DeckAssembler, Manifest, render_previews, write_deck};
//!
//! # fn main() -> deckgen::Result<()> {
//! let manifest = Manifest::load("presentation/deck.yaml")?;
//! let assembler = DeckAssembler::for_manifest(&manifest);
//! let deck = assembler.build_deck(&manifest.slides, &manifest.metadata)?;
//! write_deck(&deck, &manifest.output_path())?;
//! render_previews(&manifest.output_path(), &manifest.preview_dir())?;
//! # Ok(())
//! # }
//! ```

// Core modules
pub mod common;
pub mod config;

// Deck model and serialization
pub mod pptx;

// Content and assembly
pub mod assembler;
pub mod manifest;

pub mod preview;

// Re-export commonly used types for convenience
pub use common::{DeckError, Result};

pub use assembler::{BuildReport, DeckAssembler, write_deck};
pub use config::Config;
pub use manifest::{DeckMetadata, ElementDirective, ImageBlock, Manifest, SlideSpec, TextBlock, TextItem};
pub use pptx::{Deck, PackageWriter};
pub use preview::render_previews;

// Version information
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
