/// Deck writer for PPTX.
use crate::common::error::{DeckError, Result};
use std::fmt::Write as FmtWrite;

use super::super::format::ImageFormat;
use super::super::layout::SlideLayout;
use super::super::properties::DeckProperties;
use super::slide::Slide;

// First ID PowerPoint accepts in p:sldIdLst
const FIRST_SLIDE_ID: u32 = 256;

/// An in-memory slide deck.
///
/// Slides are appended in order and never reordered. The deck is serialized
/// once by [`PackageWriter`](crate::pptx::PackageWriter).
#[derive(Debug, Clone)]
pub struct Deck {
    /// Slides in presentation order
    pub(crate) slides: Vec<Slide>,
    layout: SlideLayout,
    properties: DeckProperties,
}

impl Deck {
    /// Create a new empty deck.
    pub fn new(layout: SlideLayout, properties: DeckProperties) -> Self {
        Self {
            slides: Vec::new(),
            layout,
            properties,
        }
    }

    /// Append a slide, assigning its slide ID. Returns the slide index.
    pub fn push_slide(&mut self, mut slide: Slide) -> usize {
        let index = self.slides.len();
        slide.slide_id = FIRST_SLIDE_ID + index as u32;
        self.slides.push(slide);
        index
    }

    /// Get the number of slides.
    pub fn slide_count(&self) -> usize {
        self.slides.len()
    }

    pub fn slides(&self) -> &[Slide] {
        &self.slides
    }

    pub fn slide(&self, index: usize) -> Option<&Slide> {
        self.slides.get(index)
    }

    /// Get a mutable reference to a slide by index (0-based).
    pub fn slide_mut(&mut self, index: usize) -> Option<&mut Slide> {
        self.slides.get_mut(index)
    }

    pub fn layout(&self) -> SlideLayout {
        self.layout
    }

    pub fn properties(&self) -> &DeckProperties {
        &self.properties
    }

    /// Collect all images from all slides in the deck.
    pub(crate) fn collect_all_images(&self) -> Vec<(usize, &[u8], ImageFormat)> {
        let mut all_images = Vec::new();

        for (slide_index, slide) in self.slides.iter().enumerate() {
            for (image_data, image_format) in slide.collect_images() {
                all_images.push((slide_index, image_data, image_format));
            }
        }

        all_images
    }

    /// Generate presentation.xml content.
    ///
    /// `slide_rel_ids` holds the relationship ID of every slide as seen from
    /// the presentation part, in slide order.
    pub(crate) fn generate_presentation_xml(
        &self,
        master_rel_id: &str,
        slide_rel_ids: &[String],
    ) -> Result<String> {
        if slide_rel_ids.len() != self.slides.len() {
            return Err(DeckError::Xml(format!(
                "Expected {} slide relationship IDs, got {}",
                self.slides.len(),
                slide_rel_ids.len()
            )));
        }

        let mut xml = String::with_capacity(2048);

        xml.push_str(r#"<?xml version="1.0" encoding="UTF-8" standalone="yes"?>"#);
        xml.push_str(r#"<p:presentation xmlns:a="http://schemas.openxmlformats.org/drawingml/2006/main" xmlns:r="http://schemas.openxmlformats.org/officeDocument/2006/relationships" xmlns:p="http://schemas.openxmlformats.org/presentationml/2006/main" saveSubsetFonts="1">"#);

        xml.push_str("<p:sldMasterIdLst>");
        write!(xml, r#"<p:sldMasterId id="2147483648" r:id="{}"/>"#, master_rel_id)?;
        xml.push_str("</p:sldMasterIdLst>");

        if !self.slides.is_empty() {
            xml.push_str("<p:sldIdLst>");
            for (slide, rel_id) in self.slides.iter().zip(slide_rel_ids) {
                write!(
                    xml,
                    r#"<p:sldId id="{}" r:id="{}"/>"#,
                    slide.slide_id(),
                    rel_id
                )?;
            }
            xml.push_str("</p:sldIdLst>");
        }

        write!(
            xml,
            r#"<p:sldSz cx="{}" cy="{}""#,
            self.layout.width, self.layout.height
        )?;
        if let Some(size_type) = self.layout.size_type {
            write!(xml, r#" type="{}""#, size_type)?;
        }
        xml.push_str("/>");

        xml.push_str(r#"<p:notesSz cx="6858000" cy="9144000"/>"#);
        xml.push_str(r#"<p:defaultTextStyle><a:defPPr><a:defRPr lang="en-US"/></a:defPPr></p:defaultTextStyle>"#);
        xml.push_str("</p:presentation>");

        Ok(xml)
    }
}

impl Default for Deck {
    fn default() -> Self {
        Self::new(SlideLayout::default(), DeckProperties::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pptx::format::{Paragraph, TextFormat};
    use crate::pptx::writer::shape::Frame;

    #[test]
    fn test_create_deck() {
        let deck = Deck::default();
        assert_eq!(deck.slide_count(), 0);
        assert_eq!(deck.layout().width, 9_144_000);
        assert_eq!(deck.layout().height, 5_143_500);
    }

    #[test]
    fn test_push_assigns_sequential_ids() {
        let mut deck = Deck::default();
        assert_eq!(deck.push_slide(Slide::new()), 0);
        assert_eq!(deck.push_slide(Slide::new()), 1);
        let ids: Vec<u32> = deck.slides().iter().map(|s| s.slide_id()).collect();
        assert_eq!(ids, vec![256, 257]);
    }

    #[test]
    fn test_presentation_xml() {
        let mut deck = Deck::default();
        let mut slide = Slide::new();
        slide.add_text_box(Frame::default(), vec![Paragraph::plain("Test")], TextFormat::default());
        deck.push_slide(slide);

        let xml = deck
            .generate_presentation_xml("rId1", &["rId2".to_string()])
            .unwrap();
        assert!(xml.contains("<p:presentation"));
        assert!(xml.contains(r#"<p:sldId id="256" r:id="rId2"/>"#));
        assert!(xml.contains(r#"<p:sldSz cx="9144000" cy="5143500" type="screen16x9"/>"#));

        assert!(deck.generate_presentation_xml("rId1", &[]).is_err());
    }
}
