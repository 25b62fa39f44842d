//! Wireframe rasterization of slides.

use super::reader::{PreviewShape, PreviewSlide, Rgb};
use crate::common::error::Result;
use crate::common::unit::emu_to_px_scaled;
use crate::pptx::Frame;
use image::{ImageBuffer, Rgba, RgbaImage};

const WHITE: Rgb = [0xFF, 0xFF, 0xFF];
const OUTLINE: Rgba<u8> = Rgba([0xC8, 0xC8, 0xC8, 0xFF]);
const DEFAULT_TEXT: Rgb = [0x33, 0x33, 0x33];

/// Rasterization target size and the slide extent it maps.
#[derive(Debug, Clone, Copy)]
pub struct Viewport {
    pub width_px: u32,
    pub height_px: u32,
    pub width_emu: i64,
    pub height_emu: i64,
}

impl Viewport {
    /// A viewport `width_px` wide keeping the slide's aspect ratio.
    pub fn fit_width(width_px: u32, width_emu: i64, height_emu: i64) -> Self {
        let width_px = width_px.max(1);
        let height_px = if width_emu > 0 {
            ((width_px as f64) * height_emu as f64 / width_emu as f64).round().max(1.0) as u32
        } else {
            width_px
        };
        Self {
            width_px,
            height_px,
            width_emu,
            height_emu,
        }
    }

    /// Pixel rectangle of a frame, clipped to the canvas. `None` when nothing
    /// of it is visible.
    fn rect(&self, frame: &Frame) -> Option<(u32, u32, u32, u32)> {
        let x0 = emu_to_px_scaled(frame.x, self.width_emu, self.width_px);
        let y0 = emu_to_px_scaled(frame.y, self.height_emu, self.height_px);
        let x1 = emu_to_px_scaled(frame.x + frame.width, self.width_emu, self.width_px);
        let y1 = emu_to_px_scaled(frame.y + frame.height, self.height_emu, self.height_px);

        let x0 = x0.clamp(0, self.width_px as i64) as u32;
        let y0 = y0.clamp(0, self.height_px as i64) as u32;
        let x1 = x1.clamp(0, self.width_px as i64) as u32;
        let y1 = y1.clamp(0, self.height_px as i64) as u32;

        if x1 <= x0 || y1 <= y0 {
            return None;
        }
        Some((x0, y0, x1 - x0, y1 - y0))
    }
}

fn rgba(color: Rgb) -> Rgba<u8> {
    Rgba([color[0], color[1], color[2], 0xFF])
}

fn fill_rect(img: &mut RgbaImage, (x, y, w, h): (u32, u32, u32, u32), color: Rgba<u8>) {
    for py in y..y + h {
        for px in x..x + w {
            img.put_pixel(px, py, color);
        }
    }
}

fn outline_rect(img: &mut RgbaImage, (x, y, w, h): (u32, u32, u32, u32), color: Rgba<u8>) {
    for px in x..x + w {
        img.put_pixel(px, y, color);
        img.put_pixel(px, y + h - 1, color);
    }
    for py in y..y + h {
        img.put_pixel(x, py, color);
        img.put_pixel(x + w - 1, py, color);
    }
}

/// Draw one bar per paragraph, stacked from the top of the box.
fn draw_text_bars(
    img: &mut RgbaImage,
    (x, y, w, h): (u32, u32, u32, u32),
    paragraphs: &[Option<Rgb>],
    color: Rgb,
) {
    if paragraphs.is_empty() || w < 4 || h < 4 {
        return;
    }
    let inset = (w / 40).max(2);
    let line = (h / paragraphs.len() as u32).max(1);
    let bar_height = (line / 2).max(1);
    let bar_width = w.saturating_sub(inset * 2).max(1);

    for (i, paragraph) in paragraphs.iter().enumerate() {
        let top = y + i as u32 * line + (line - bar_height) / 2;
        if top + bar_height > y + h {
            break;
        }
        let bar = (x + inset, top, bar_width, bar_height);
        fill_rect(img, bar, rgba(paragraph.unwrap_or(color)));
    }
}

/// Paint one slide.
pub fn render_slide(slide: &PreviewSlide, viewport: &Viewport) -> Result<RgbaImage> {
    let background = rgba(slide.background.unwrap_or(WHITE));
    let mut img: RgbaImage = ImageBuffer::from_pixel(viewport.width_px, viewport.height_px, background);

    for shape in &slide.shapes {
        match shape {
            PreviewShape::Text {
                frame,
                fill,
                paragraphs,
                color,
            } => {
                let Some(rect) = viewport.rect(frame) else {
                    continue;
                };
                match fill {
                    Some(fill) => fill_rect(&mut img, rect, rgba(*fill)),
                    None => outline_rect(&mut img, rect, OUTLINE),
                }
                draw_text_bars(&mut img, rect, paragraphs, color.unwrap_or(DEFAULT_TEXT));
            },
            PreviewShape::Picture { frame, data } => {
                let Some((x, y, w, h)) = viewport.rect(frame) else {
                    continue;
                };
                let picture = image::load_from_memory(data)?;
                let resized = image::imageops::resize(
                    &picture.to_rgba8(),
                    w,
                    h,
                    image::imageops::FilterType::Triangle,
                );
                image::imageops::overlay(&mut img, &resized, x as i64, y as i64);
            },
        }
    }

    Ok(img)
}
