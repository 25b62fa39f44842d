//! Preview thumbnails of written decks.
//!
//! Thumbnails are wireframes, not faithful renderings: backgrounds, filled
//! boxes and pictures are painted, text is drawn as one bar per paragraph.
//! They exist for a quick visual check of layout and ordering.

mod raster;
mod reader;

pub use raster::{Viewport, render_slide};
pub use reader::{PreviewDeck, PreviewShape, PreviewSlide, read_deck};

use crate::common::error::{DeckError, Result};
use log::debug;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

/// Thumbnail width used by [`render_previews`].
pub const DEFAULT_WIDTH: u32 = 960;

/// Rasterize every slide of the deck at `path` into `output_dir`.
///
/// Writes `slide-01.png`, `slide-02.png`, ... and returns their paths in
/// slide order. Every failure is reported as a thumbnail error.
pub fn render_previews(path: &Path, output_dir: &Path) -> Result<Vec<PathBuf>> {
    render_previews_with_width(path, output_dir, DEFAULT_WIDTH)
}

/// [`render_previews`] with an explicit thumbnail width in pixels.
pub fn render_previews_with_width(path: &Path, output_dir: &Path, width: u32) -> Result<Vec<PathBuf>> {
    render(path, output_dir, width).map_err(|e| match e {
        DeckError::Thumbnail(_) => e,
        other => DeckError::Thumbnail(format!("{}: {}", path.display(), other)),
    })
}

fn render(path: &Path, output_dir: &Path, width: u32) -> Result<Vec<PathBuf>> {
    let file = File::open(path)?;
    let deck = read_deck(BufReader::new(file))?;
    let viewport = Viewport::fit_width(width, deck.width_emu, deck.height_emu);

    std::fs::create_dir_all(output_dir)?;

    let mut written = Vec::with_capacity(deck.slides.len());
    for (index, slide) in deck.slides.iter().enumerate() {
        let img = render_slide(slide, &viewport)?;
        let target = output_dir.join(format!("slide-{:02}.png", index + 1));
        img.save_with_format(&target, image::ImageFormat::Png)?;
        debug!("Wrote thumbnail {}", target.display());
        written.push(target);
    }

    Ok(written)
}
