/// Slide type and XML generation.
use crate::common::error::{DeckError, Result};
use std::fmt::Write as FmtWrite;
use std::path::Path;

use super::super::format::{ImageFormat, Paragraph, TextFormat};
use super::shape::{Frame, Shape};

/// One slide of a deck.
///
/// Slides are built up shape by shape and then appended to a
/// [`Deck`](super::Deck), which assigns the final slide ID.
#[derive(Debug, Clone, Default)]
pub struct Slide {
    /// Slide ID, assigned when the slide is appended to a deck
    pub(crate) slide_id: u32,
    /// Solid background color in hex RGB
    pub(crate) background: Option<String>,
    /// Shapes in z-order
    pub(crate) shapes: Vec<Shape>,
}

impl Slide {
    /// Create a new empty slide.
    pub fn new() -> Self {
        Self::default()
    }

    /// Get the slide ID.
    pub fn slide_id(&self) -> u32 {
        self.slide_id
    }

    /// Set a solid background color (hex RGB).
    pub fn set_background(&mut self, color: impl Into<String>) {
        self.background = Some(color.into());
    }

    pub fn background(&self) -> Option<&str> {
        self.background.as_deref()
    }

    // ID 1 is the shape tree itself
    fn next_shape_id(&self) -> u32 {
        (self.shapes.len() + 2) as u32
    }

    /// Add a text box to the slide.
    pub fn add_text_box(
        &mut self,
        frame: Frame,
        paragraphs: Vec<Paragraph>,
        format: TextFormat,
    ) -> &mut Shape {
        let shape = Shape::new_text_box(self.next_shape_id(), frame, paragraphs, format);
        self.shapes.push(shape);
        let last = self.shapes.len() - 1;
        &mut self.shapes[last]
    }

    /// Add a picture to the slide from a file.
    ///
    /// A file that does not exist is reported as a missing resource.
    pub fn add_picture(&mut self, image_path: &Path, frame: Frame, description: Option<String>) -> Result<()> {
        if !image_path.is_file() {
            return Err(DeckError::MissingResource(image_path.to_path_buf()));
        }
        let data = std::fs::read(image_path)?;
        let description = description.unwrap_or_else(|| {
            image_path
                .file_name()
                .map(|name| name.to_string_lossy().into_owned())
                .unwrap_or_else(|| "Picture".to_string())
        });
        self.add_picture_from_bytes(data, frame, Some(description))
    }

    /// Add a picture to the slide from bytes.
    pub fn add_picture_from_bytes(
        &mut self,
        data: Vec<u8>,
        frame: Frame,
        description: Option<String>,
    ) -> Result<()> {
        let format = ImageFormat::detect_from_bytes(&data)
            .ok_or_else(|| DeckError::InvalidFormat("Unknown image format".to_string()))?;

        let desc = description.unwrap_or_else(|| "Picture".to_string());
        let shape = Shape::new_picture(self.next_shape_id(), frame, data, format, desc);
        self.shapes.push(shape);
        Ok(())
    }

    /// Get the number of shapes on the slide.
    pub fn shape_count(&self) -> usize {
        self.shapes.len()
    }

    pub fn shapes(&self) -> &[Shape] {
        &self.shapes
    }

    /// Text boxes on the slide, in z-order.
    pub fn text_boxes(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(|s| !s.is_picture())
    }

    /// Pictures on the slide, in z-order.
    pub fn pictures(&self) -> impl Iterator<Item = &Shape> {
        self.shapes.iter().filter(|s| s.is_picture())
    }

    /// Collect image payloads in z-order.
    pub(crate) fn collect_images(&self) -> Vec<(&[u8], ImageFormat)> {
        self.shapes.iter().filter_map(|s| s.image_data()).collect()
    }

    /// Generate the slide XML.
    ///
    /// `image_rel_ids` holds one relationship ID per picture, in the order
    /// returned by [`Slide::pictures`].
    pub(crate) fn to_xml(&self, lang: &str, image_rel_ids: &[String]) -> Result<String> {
        let mut xml = String::with_capacity(4096);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<p:sld xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main">"#);
        xml.push_str("<p:cSld>");

        if let Some(ref color) = self.background {
            xml.push_str("<p:bg><p:bgPr>");
            write!(xml, r#"<a:solidFill><a:srgbClr val="{}"/></a:solidFill>"#, color)?;
            xml.push_str("<a:effectLst/>");
            xml.push_str("</p:bgPr></p:bg>");
        }

        xml.push_str("<p:spTree>");
        xml.push_str("<p:nvGrpSpPr>");
        xml.push_str(r#"<p:cNvPr id="1" name=""/>"#);
        xml.push_str("<p:cNvGrpSpPr/>");
        xml.push_str("<p:nvPr/>");
        xml.push_str("</p:nvGrpSpPr>");
        xml.push_str("<p:grpSpPr>");
        xml.push_str(r#"<a:xfrm><a:off x="0" y="0"/><a:ext cx="0" cy="0"/><a:chOff x="0" y="0"/><a:chExt cx="0" cy="0"/></a:xfrm>"#);
        xml.push_str("</p:grpSpPr>");

        let mut picture_index = 0;
        for shape in &self.shapes {
            if shape.is_picture() {
                let rel_id = image_rel_ids.get(picture_index).ok_or_else(|| {
                    DeckError::Xml(format!(
                        "No relationship ID for picture {} on slide {}",
                        picture_index, self.slide_id
                    ))
                })?;
                shape.to_xml(&mut xml, lang, Some(rel_id))?;
                picture_index += 1;
            } else {
                shape.to_xml(&mut xml, lang, None)?;
            }
        }

        xml.push_str("</p:spTree>");
        xml.push_str("</p:cSld>");
        xml.push_str("<p:clrMapOvr><a:masterClrMapping/></p:clrMapOvr>");
        xml.push_str("</p:sld>");

        Ok(xml)
    }
}
