//! PowerPoint (.pptx) deck model and package writer.
//!
//! A [`Deck`] is built in memory slide by slide and serialized once by the
//! [`PackageWriter`] into an Office Open XML package.
//!
//! # Example
//!
//! ```no_run
//! use deckgen::common::unit::inch_to_emu;
//! use deckgen::pptx::{Deck, Frame, PackageWriter, Paragraph, Slide, TextFormat};
//!
//! let mut deck = Deck::default();
//! let mut slide = Slide::new();
//! slide.add_text_box(
//!     Frame::new(inch_to_emu(0.5), inch_to_emu(0.5), inch_to_emu(9.0), inch_to_emu(1.0)),
//!     vec![Paragraph::plain("Hello")],
//!     TextFormat::default(),
//! );
//! deck.push_slide(slide);
//! PackageWriter::write("hello.pptx", &deck)?;
//! # Ok::<(), deckgen::DeckError>(())
//! ```

pub mod constants;
pub mod format;
pub mod layout;
pub mod package;
pub mod properties;
pub mod rels;
pub(crate) mod template;
pub mod writer;

pub use format::{BulletKind, ImageFormat, Paragraph, TextAlign, TextFormat, VerticalAnchor, normalize_color};
pub use layout::SlideLayout;
pub use package::PackageWriter;
pub use properties::DeckProperties;
pub use writer::{Deck, Frame, Shape, ShapeKind, Slide};
